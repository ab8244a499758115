// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use trackline_actions::{ActionContext, ActivityLoader, ActivityTarget, IssueListActions};
use trackline_activity::{ActivityGroup, ActivityKind, ActivityOptions, ActivityRecord, ActivityStream, SortOrder};
use trackline_config::TracklineConfig;
use trackline_core::TracklineError;

/// Prints one issue.
pub async fn show_issue(ctx: &ActionContext, issue_id: &str) -> Result<(), TracklineError> {
    let issue = ctx.api.issue().get_issue(issue_id).await?;
    println!("{} {}", issue.id_readable.as_deref().unwrap_or(&issue.id), issue.summary);
    if let Some(reporter) = &issue.reporter {
        println!("reported by {} on {}", reporter.display_name(), format_time(issue.created));
    }
    if !issue.tags.is_empty() {
        let tags: Vec<&str> = issue.tags.iter().map(|t| t.name.as_str()).collect();
        println!("tags: {}", tags.join(", "));
    }
    if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
        println!();
        println!("{description}");
    }
    Ok(())
}

/// Prints the number of matching issues. Returns whether a count was shown.
pub async fn count_issues(ctx: Arc<ActionContext>, query: Option<&str>) -> bool {
    let list = IssueListActions::new(ctx);
    match list.load_issues_count(query, None).await {
        Some(count) => {
            println!("{count}");
            true
        }
        None => {
            eprintln!("count is not available yet");
            false
        }
    }
}

/// Prints the grouped activity stream of an issue.
pub async fn show_activity(
    ctx: Arc<ActionContext>,
    config: &TracklineConfig,
    issue_id: &str,
    newest_first: bool,
) -> bool {
    let mut options = ActivityOptions::from_config(&config.activity);
    if newest_first {
        options.order = SortOrder::NewestFirst;
    }
    let mut stream = ActivityStream::new(options);
    let loader = ActivityLoader::new(ctx, ActivityTarget::Issue(issue_id.to_string()));
    if !loader.load(&mut stream).await {
        return false;
    }
    for group in stream.groups() {
        print_group(group);
    }
    true
}

/// Prints the resolved configuration with secrets masked.
pub fn show_config(config: &TracklineConfig) -> Result<(), TracklineError> {
    let rendered = toml::to_string_pretty(&masked(config))
        .map_err(|e| TracklineError::Internal(format!("cannot render configuration: {e}")))?;
    print!("{rendered}");
    Ok(())
}

fn masked(config: &TracklineConfig) -> TracklineConfig {
    let mut shown = config.clone();
    for secret in [&mut shown.auth.permanent_token, &mut shown.auth.client_secret] {
        if secret.is_some() {
            *secret = Some("********".to_string());
        }
    }
    shown
}

fn print_group(group: &ActivityGroup) {
    let author = group.author.as_ref().map_or("unknown", |a| a.display_name());
    println!("{author}, {}", format_time(group.started_at()));
    for record in &group.records {
        println!("  {}", describe(record));
    }
}

fn describe(record: &ActivityRecord) -> String {
    match &record.kind {
        ActivityKind::CommentAdded(c) | ActivityKind::CommentUpdated(c) if c.deleted => {
            "comment deleted".to_string()
        }
        ActivityKind::CommentAdded(c) | ActivityKind::CommentUpdated(c) => {
            let reactions = if c.reactions.is_empty() {
                String::new()
            } else {
                format!(" ({} reactions)", c.reactions.len())
            };
            format!("commented: {}{reactions}", first_line(&c.text))
        }
        ActivityKind::CommentDeleted(_) => "comment deleted".to_string(),
        ActivityKind::FieldChanged(change) => {
            let field = change.member.as_deref().unwrap_or(&change.category);
            format!("{field}: {} -> {}", value_text(&change.removed), value_text(&change.added))
        }
        ActivityKind::WorkItemAdded(item) => format!("spent {}", duration_text(item)),
        ActivityKind::WorkItemUpdated { after, .. } => format!("updated spent time to {}", duration_text(after)),
        ActivityKind::WorkItemDeleted(item) => format!("removed spent time {}", duration_text(item)),
        ActivityKind::ReactionAdded(r) => format!("reacted {}", r.reaction),
        ActivityKind::ReactionRemoved(r) => format!("removed reaction {}", r.reaction),
        ActivityKind::VcsChange { pull_request: true, .. } => "pull request".to_string(),
        ActivityKind::VcsChange { .. } => "commit".to_string(),
        ActivityKind::IssueCreated => "created the issue".to_string(),
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

fn duration_text(item: &trackline_api::WorkItem) -> String {
    item.duration
        .presentation
        .clone()
        .unwrap_or_else(|| format!("{}m", item.duration.minutes))
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "none".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => {
            let names: Vec<String> = items.iter().map(value_text).collect();
            format!("[{}]", names.join(", "))
        }
        serde_json::Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("presentation"))
            .or_else(|| map.get("id"))
            .map_or_else(|| value.to_string(), value_text),
        other => other.to_string(),
    }
}

fn format_time(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map_or_else(|| millis.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn field_values_use_their_names() {
        assert_eq!(value_text(&json!({"name": "Critical", "id": "p-1"})), "Critical");
        assert_eq!(value_text(&json!([{"name": "a"}, {"name": "b"}])), "[a, b]");
        assert_eq!(value_text(&json!(null)), "none");
    }

    #[test]
    fn times_render_in_utc() {
        assert_eq!(format_time(0), "1970-01-01 00:00");
    }

    #[test]
    fn config_output_masks_secrets() {
        let mut config = TracklineConfig::default();
        config.auth.permanent_token = Some("perm:secret".into());
        let rendered = toml::to_string_pretty(&masked(&config)).unwrap();
        assert!(!rendered.contains("perm:secret"));
        assert!(rendered.contains("********"));
        assert!(masked(&TracklineConfig::default()).auth.client_secret.is_none());
    }
}
