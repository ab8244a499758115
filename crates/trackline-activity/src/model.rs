// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! From wire activities to display groups.

use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use trackline_api::RawActivity;
use trackline_config::model::{ActivityConfig, SortOrder};

use crate::category::{ActivitySource, category_ids};
use crate::group::{ActivityGroup, group_records};
use crate::reaction::fold_reactions;
use crate::record::ActivityRecord;

/// Knobs for building the display model.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityOptions {
    pub merge_window: Duration,
    pub order: SortOrder,
    /// Sources shown in the stream.
    pub sources: Vec<ActivitySource>,
}

impl Default for ActivityOptions {
    fn default() -> Self {
        Self {
            merge_window: Duration::from_secs(60),
            order: SortOrder::OldestFirst,
            sources: vec![
                ActivitySource::Comment,
                ActivitySource::History,
                ActivitySource::WorkItem,
                ActivitySource::Vcs,
            ],
        }
    }
}

impl ActivityOptions {
    pub fn from_config(config: &ActivityConfig) -> Self {
        let sources = config
            .sources
            .iter()
            .filter_map(|name| match ActivitySource::from_str(name) {
                Ok(source) => Some(source),
                Err(_) => {
                    warn!(source = %name, "ignoring unknown activity source");
                    None
                }
            })
            .collect();
        Self {
            merge_window: Duration::from_secs(config.merge_window_secs),
            order: config.sort,
            sources,
        }
    }

    /// Category ids to request from the server.
    pub fn category_ids(&self) -> Vec<&'static str> {
        category_ids(&self.sources)
    }

    pub fn shows(&self, record: &ActivityRecord) -> bool {
        self.sources.contains(&record.source())
    }
}

/// Interprets wire activities and drops the ones hidden by `options`.
pub fn records_from_raw(raw: Vec<RawActivity>, options: &ActivityOptions) -> Vec<ActivityRecord> {
    let total = raw.len();
    let records: Vec<ActivityRecord> = raw
        .into_iter()
        .filter_map(ActivityRecord::from_raw)
        .filter(|r| options.shows(r))
        .collect();
    debug!(total, kept = records.len(), "interpreted activity page");
    fold_reactions(records)
}

/// Full pipeline: records are grouped and ordered for display.
pub fn build_groups(records: Vec<ActivityRecord>, options: &ActivityOptions) -> Vec<ActivityGroup> {
    group_records(records, options.merge_window, options.order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_config() {
        let config = ActivityConfig {
            merge_window_secs: 120,
            sort: SortOrder::NewestFirst,
            sources: vec!["comment".into(), "vcs".into(), "bogus".into()],
            page_size: 50,
        };
        let options = ActivityOptions::from_config(&config);
        assert_eq!(options.merge_window, Duration::from_secs(120));
        assert_eq!(options.order, SortOrder::NewestFirst);
        assert_eq!(options.sources, vec![ActivitySource::Comment, ActivitySource::Vcs]);
        assert!(options.category_ids().contains(&"CommentsCategory"));
        assert!(!options.category_ids().contains(&"WorkItemCategory"));
    }

    #[test]
    fn default_matches_default_config() {
        assert_eq!(
            ActivityOptions::from_config(&ActivityConfig::default()),
            ActivityOptions::default()
        );
    }
}
