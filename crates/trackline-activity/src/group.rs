// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Author/time grouping of activity records.

use std::time::Duration;

use trackline_api::User;
use trackline_config::model::SortOrder;

use crate::merge::collapse_field_changes;
use crate::record::ActivityRecord;

/// A run of records by one author with no gap wider than the merge window.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityGroup {
    pub author: Option<User>,
    /// Records in display order.
    pub records: Vec<ActivityRecord>,
}

impl ActivityGroup {
    /// Timestamp of the earliest record.
    pub fn started_at(&self) -> i64 {
        self.records.iter().map(|r| r.timestamp).min().unwrap_or_default()
    }

    /// Timestamp of the latest record.
    pub fn ended_at(&self) -> i64 {
        self.records.iter().map(|r| r.timestamp).max().unwrap_or_default()
    }

    pub fn is_vcs(&self) -> bool {
        self.records.first().is_some_and(ActivityRecord::is_vcs)
    }

    /// Whether any record in the group is about the given comment.
    pub fn contains_comment(&self, comment_id: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.as_comment().is_some_and(|c| c.id == comment_id))
    }
}

/// Groups records for display.
///
/// Records are stably sorted by timestamp and grouped in chronological
/// order. A record joins the current group when it has the same author, its
/// gap to the previous record is within `window`, and both are VCS changes
/// or both are not. Field changes are then collapsed per group. For
/// [`SortOrder::NewestFirst`] groups and their records are reversed.
pub fn group_records(
    mut records: Vec<ActivityRecord>,
    window: Duration,
    order: SortOrder,
) -> Vec<ActivityGroup> {
    records.sort_by_key(|r| r.timestamp);
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);

    let mut runs: Vec<Vec<ActivityRecord>> = Vec::new();
    for record in records {
        let joins = runs
            .last()
            .and_then(|run| run.last())
            .is_some_and(|prev| {
                prev.author_id() == record.author_id()
                    && record.timestamp - prev.timestamp <= window_ms
                    && prev.is_vcs() == record.is_vcs()
            });
        match runs.last_mut() {
            Some(run) if joins => run.push(record),
            _ => runs.push(vec![record]),
        }
    }

    let mut groups: Vec<ActivityGroup> = runs
        .into_iter()
        .map(collapse_field_changes)
        .filter(|records| !records.is_empty())
        .map(|records| ActivityGroup {
            author: records.first().and_then(|r| r.author.clone()),
            records,
        })
        .collect();

    if order == SortOrder::NewestFirst {
        groups.reverse();
        for group in &mut groups {
            group.records.reverse();
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;
    use trackline_api::Comment;

    use super::*;
    use crate::record::{ActivityKind, FieldChange};

    const WINDOW: Duration = Duration::from_secs(60);

    fn comment(id: &str, author: &str, ts: i64) -> ActivityRecord {
        ActivityRecord::comment(Comment {
            id: id.into(),
            created: ts,
            author: Some(User {
                id: author.into(),
                ..User::default()
            }),
            ..Comment::default()
        })
    }

    fn vcs(id: &str, author: &str, ts: i64) -> ActivityRecord {
        ActivityRecord {
            id: id.into(),
            timestamp: ts,
            author: Some(User {
                id: author.into(),
                ..User::default()
            }),
            target_id: None,
            kind: ActivityKind::VcsChange {
                pull_request: false,
                payload: json!([]),
            },
        }
    }

    fn ids(group: &ActivityGroup) -> Vec<&str> {
        group.records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn same_author_within_window_merges() {
        let groups = group_records(
            vec![comment("c-1", "u-1", 0), comment("c-2", "u-1", 30_000)],
            WINDOW,
            SortOrder::OldestFirst,
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["c-1", "c-2"]);
    }

    #[test]
    fn gap_is_measured_between_neighbours() {
        let groups = group_records(
            vec![
                comment("c-1", "u-1", 0),
                comment("c-2", "u-1", 50_000),
                comment("c-3", "u-1", 100_000),
                comment("c-4", "u-1", 161_000),
            ],
            WINDOW,
            SortOrder::OldestFirst,
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(ids(&groups[0]), vec!["c-1", "c-2", "c-3"]);
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let groups = group_records(
            vec![comment("c-1", "u-1", 0), comment("c-2", "u-1", 60_000)],
            WINDOW,
            SortOrder::OldestFirst,
        );
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn vcs_never_merges_with_comments() {
        let groups = group_records(
            vec![comment("c-1", "u-1", 0), vcs("v-1", "u-1", 1_000), vcs("v-2", "u-1", 2_000)],
            WINDOW,
            SortOrder::OldestFirst,
        );
        assert_eq!(groups.len(), 2);
        assert!(groups[1].is_vcs());
        assert_eq!(ids(&groups[1]), vec!["v-1", "v-2"]);
    }

    #[test]
    fn newest_first_reverses_groups_and_records() {
        let groups = group_records(
            vec![
                comment("c-1", "u-1", 0),
                comment("c-2", "u-1", 1_000),
                comment("c-3", "u-2", 2_000),
            ],
            WINDOW,
            SortOrder::NewestFirst,
        );
        assert_eq!(ids(&groups[0]), vec!["c-3"]);
        assert_eq!(ids(&groups[1]), vec!["c-2", "c-1"]);
    }

    #[test]
    fn unsorted_input_is_ordered_stably() {
        let groups = group_records(
            vec![
                comment("c-2", "u-1", 1_000),
                comment("c-1", "u-1", 0),
                comment("c-3", "u-1", 1_000),
            ],
            WINDOW,
            SortOrder::OldestFirst,
        );
        assert_eq!(ids(&groups[0]), vec!["c-1", "c-2", "c-3"]);
    }

    #[test]
    fn groups_that_collapse_to_nothing_are_dropped() {
        let change = |id: &str, ts: i64, added: &str, removed: &str| ActivityRecord {
            id: id.into(),
            timestamp: ts,
            author: None,
            target_id: Some("i-1".into()),
            kind: ActivityKind::FieldChanged(FieldChange {
                category: "SummaryCategory".into(),
                member: None,
                added: json!(added),
                removed: json!(removed),
            }),
        };
        let groups = group_records(
            vec![change("a-1", 0, "b", "a"), change("a-2", 1, "a", "b")],
            WINDOW,
            SortOrder::OldestFirst,
        );
        assert!(groups.is_empty());
    }

    /// Records with strictly increasing timestamps from (author, gap, vcs).
    fn timeline() -> impl Strategy<Value = Vec<ActivityRecord>> {
        prop::collection::vec((0..3usize, 1..120_000i64, any::<bool>()), 0..24).prop_map(|steps| {
            let mut ts = 0;
            steps
                .into_iter()
                .enumerate()
                .map(|(i, (author, gap, is_vcs))| {
                    ts += gap;
                    let id = format!("r-{i}");
                    let author = format!("u-{author}");
                    if is_vcs {
                        vcs(&id, &author, ts)
                    } else {
                        comment(&id, &author, ts)
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn grouping_ignores_input_order(records in timeline()) {
            let mut reversed = records.clone();
            reversed.reverse();
            prop_assert_eq!(
                group_records(records, WINDOW, SortOrder::OldestFirst),
                group_records(reversed, WINDOW, SortOrder::OldestFirst)
            );
        }

        #[test]
        fn newest_first_mirrors_oldest_first(records in timeline()) {
            let mut mirrored = group_records(records.clone(), WINDOW, SortOrder::OldestFirst);
            mirrored.reverse();
            for group in &mut mirrored {
                group.records.reverse();
            }
            prop_assert_eq!(group_records(records, WINDOW, SortOrder::NewestFirst), mirrored);
        }

        #[test]
        fn groups_hold_one_author_within_the_window(records in timeline()) {
            let total = records.len();
            let groups = group_records(records, WINDOW, SortOrder::OldestFirst);
            prop_assert_eq!(groups.iter().map(|g| g.records.len()).sum::<usize>(), total);
            for group in &groups {
                for pair in group.records.windows(2) {
                    prop_assert_eq!(pair[0].author_id(), pair[1].author_id());
                    prop_assert_eq!(pair[0].is_vcs(), pair[1].is_vcs());
                    prop_assert!(pair[1].timestamp - pair[0].timestamp <= 60_000);
                }
            }
        }
    }
}
