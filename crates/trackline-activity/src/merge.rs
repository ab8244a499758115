// SPDX-FileCopyrightText: 2026 Trackline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collapsing of repeated field changes.
//!
//! Within one group, several changes of the same field of the same entity
//! are folded into one: scalar fields keep the first `removed` and the last
//! `added` value, multi-value fields reconcile their added/removed sets by
//! element id. Changes that cancel out are dropped.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::record::{ActivityKind, ActivityRecord, FieldChange};

/// Folds field changes sharing target and member. Other records pass
/// through untouched and the relative order of first occurrences is kept.
pub fn collapse_field_changes(records: Vec<ActivityRecord>) -> Vec<ActivityRecord> {
    if records.len() < 2 {
        return records;
    }

    let mut out: Vec<ActivityRecord> = Vec::with_capacity(records.len());
    let mut slots: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = match &record.kind {
            ActivityKind::FieldChanged(change) => Some(format!(
                "{}{}",
                record.target_id.as_deref().unwrap_or_default(),
                change.member.as_deref().unwrap_or_default()
            )),
            _ => None,
        };
        let Some(key) = key else {
            out.push(record);
            continue;
        };
        if let Some(&slot) = slots.get(&key) {
            fold_into(&mut out[slot], record);
        } else {
            slots.insert(key, out.len());
            out.push(record);
        }
    }

    out.retain(has_effect);
    out
}

fn fold_into(merged: &mut ActivityRecord, next: ActivityRecord) {
    let (ActivityKind::FieldChanged(acc), ActivityKind::FieldChanged(change)) =
        (&mut merged.kind, next.kind)
    else {
        return;
    };

    if acc.is_multi_value() || change.is_multi_value() {
        let (acc_added, next_removed) = disjoint(items(&acc.added), items(&change.removed));
        let (acc_removed, next_added) = disjoint(items(&acc.removed), items(&change.added));
        acc.added = Value::Array(union(acc_added, next_added));
        acc.removed = Value::Array(union(acc_removed, next_removed));
    } else if next.timestamp >= merged.timestamp {
        acc.added = change.added;
    }

    if next.timestamp >= merged.timestamp {
        merged.timestamp = next.timestamp;
        merged.id = next.id;
    }
}

fn has_effect(record: &ActivityRecord) -> bool {
    let ActivityKind::FieldChanged(change) = &record.kind else {
        return true;
    };
    if change.added == change.removed {
        return false;
    }
    if change.is_multi_value() {
        return !items(&change.added).is_empty() || !items(&change.removed).is_empty();
    }
    match (element_id(&change.added), element_id(&change.removed)) {
        (Some(added), Some(removed)) => added != removed,
        _ => true,
    }
}

fn items(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn element_id(value: &Value) -> Option<&str> {
    value.get("id").and_then(Value::as_str)
}

/// Removes elements present in both lists, matched by id.
fn disjoint(a: Vec<Value>, b: Vec<Value>) -> (Vec<Value>, Vec<Value>) {
    let b_ids: HashSet<String> = b.iter().filter_map(element_id).map(str::to_string).collect();
    let a_ids: HashSet<String> = a.iter().filter_map(element_id).map(str::to_string).collect();
    let a = a
        .into_iter()
        .filter(|v| element_id(v).is_none_or(|id| !b_ids.contains(id)))
        .collect();
    let b = b
        .into_iter()
        .filter(|v| element_id(v).is_none_or(|id| !a_ids.contains(id)))
        .collect();
    (a, b)
}

fn union(a: Vec<Value>, b: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    a.into_iter()
        .chain(b)
        .filter(|v| match element_id(v) {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn change(id: &str, ts: i64, member: &str, added: Value, removed: Value) -> ActivityRecord {
        ActivityRecord {
            id: id.into(),
            timestamp: ts,
            author: None,
            target_id: Some("issue-1".into()),
            kind: ActivityKind::FieldChanged(FieldChange {
                category: "CustomFieldCategory".into(),
                member: Some(member.into()),
                added,
                removed,
            }),
        }
    }

    fn field(record: &ActivityRecord) -> &FieldChange {
        match &record.kind {
            ActivityKind::FieldChanged(c) => c,
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn scalar_changes_keep_first_removed_and_last_added() {
        let out = collapse_field_changes(vec![
            change("a-1", 1, "priority", json!("Major"), json!("Normal")),
            change("a-2", 2, "priority", json!("Critical"), json!("Major")),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a-2");
        assert_eq!(field(&out[0]).added, json!("Critical"));
        assert_eq!(field(&out[0]).removed, json!("Normal"));
    }

    #[test]
    fn scalar_round_trip_disappears() {
        let out = collapse_field_changes(vec![
            change("a-1", 1, "priority", json!("Major"), json!("Normal")),
            change("a-2", 2, "priority", json!("Normal"), json!("Major")),
        ]);
        assert!(out.is_empty());
    }

    #[test]
    fn multi_value_sets_reconcile_by_id() {
        let out = collapse_field_changes(vec![
            change("a-1", 1, "tags", json!([{"id": "t-1"}, {"id": "t-2"}]), json!([])),
            change("a-2", 2, "tags", json!([]), json!([{"id": "t-1"}])),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(field(&out[0]).added, json!([{"id": "t-2"}]));
        assert_eq!(field(&out[0]).removed, json!([]));
    }

    #[test]
    fn multi_value_add_then_remove_disappears() {
        let out = collapse_field_changes(vec![
            change("a-1", 1, "tags", json!([{"id": "t-1"}]), json!([])),
            change("a-2", 2, "tags", json!([]), json!([{"id": "t-1"}])),
        ]);
        assert!(out.is_empty());
    }

    #[test]
    fn different_members_stay_apart() {
        let out = collapse_field_changes(vec![
            change("a-1", 1, "priority", json!("Major"), json!("Normal")),
            change("a-2", 2, "state", json!("Fixed"), json!("Open")),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn object_values_with_same_id_are_no_ops() {
        let out = collapse_field_changes(vec![change(
            "a-1",
            1,
            "assignee",
            json!({"id": "u-1", "login": "new"}),
            json!({"id": "u-1", "login": "old"}),
        )]);
        // single records are returned as-is
        assert_eq!(out.len(), 1);

        let out = collapse_field_changes(vec![
            change("a-1", 1, "assignee", json!({"id": "u-2"}), json!({"id": "u-1"})),
            change("a-2", 2, "assignee", json!({"id": "u-1", "login": "x"}), json!({"id": "u-2"})),
        ]);
        assert!(out.is_empty());
    }
}
