//! Field-by-field merge of a partial update into the current task.
//!
//! - `title` / `status`: replaced only by a non-empty value.
//! - `description`: replaced whenever the key is present; `null` or `""` clears it.
//! - `changes`: patch entries appended after the current ones, nothing removed.
//! - `context`: shallow merge, patch keys win, no key is ever deleted.

use crate::records::{Task, TaskFields};
use crate::requests::TaskPatch;

/// Compute the fields to persist for `current` after applying `patch`.
///
/// Pure: no I/O and no timestamps. Entries in `changes` and values in
/// `context` are carried through without inspection.
pub fn merge_update(current: &Task, patch: &TaskPatch) -> TaskFields {
    let title = non_empty(patch.title.as_deref()).unwrap_or(current.title.as_str());
    let status = non_empty(patch.status.as_deref()).unwrap_or(current.status.as_str());

    let description = match &patch.description {
        Some(value) => value.clone().filter(|d| !d.is_empty()),
        None => current.description.clone(),
    };

    let mut changes = current.changes.clone();
    if let Some(extra) = &patch.changes {
        changes.extend(extra.iter().cloned());
    }

    let mut context = current.context.clone();
    if let Some(overlay) = &patch.context {
        for (key, value) in overlay {
            context.insert(key.clone(), value.clone());
        }
    }

    TaskFields {
        title: title.to_owned(),
        description,
        status: status.to_owned(),
        changes,
        context,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::TaskId;
    use crate::records::Context;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn task(changes: Vec<Value>, context: Value) -> Task {
        Task {
            id: TaskId::new(),
            title: "Refactor auth".into(),
            description: Some("split the module".into()),
            status: "pending".into(),
            changes,
            context: serde_json::from_value(context).unwrap(),
            created_at: "2026-01-01T00:00:00.000000Z".into(),
            updated_at: "2026-01-01T00:00:00.000000Z".into(),
        }
    }

    fn patch(value: Value) -> TaskPatch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_patch_keeps_everything() {
        let current = task(vec![json!("a")], json!({"k": 1}));
        let merged = merge_update(&current, &TaskPatch::default());
        assert_eq!(merged.title, current.title);
        assert_eq!(merged.description, current.description);
        assert_eq!(merged.status, current.status);
        assert_eq!(merged.changes, current.changes);
        assert_eq!(merged.context, current.context);
    }

    #[test]
    fn empty_title_and_status_are_ignored() {
        let current = task(vec![], json!({}));
        let merged = merge_update(&current, &patch(json!({"title": "", "status": ""})));
        assert_eq!(merged.title, "Refactor auth");
        assert_eq!(merged.status, "pending");
    }

    #[test]
    fn description_cleared_by_null_or_empty() {
        let current = task(vec![], json!({}));
        assert_eq!(
            merge_update(&current, &patch(json!({"description": null}))).description,
            None
        );
        assert_eq!(
            merge_update(&current, &patch(json!({"description": ""}))).description,
            None
        );
        assert_eq!(
            merge_update(&current, &patch(json!({"description": "new"}))).description,
            Some("new".into())
        );
    }

    #[test]
    fn changes_append_in_patch_order() {
        let current = task(vec![json!("renamed module")], json!({}));
        let merged =
            merge_update(&current, &patch(json!({"changes": ["added tests", {"file": "a.rs"}]})));
        assert_eq!(
            merged.changes,
            vec![json!("renamed module"), json!("added tests"), json!({"file": "a.rs"})]
        );
    }

    #[test]
    fn same_patch_twice_appends_twice() {
        let current = task(vec![], json!({}));
        let p = patch(json!({"changes": ["x"]}));
        let once = merge_update(&current, &p);
        let mut after_once = current.clone();
        after_once.changes = once.changes;
        let twice = merge_update(&after_once, &p);
        assert_eq!(twice.changes, vec![json!("x"), json!("x")]);
    }

    #[test]
    fn context_merge_is_shallow() {
        let current = task(vec![], json!({"risk": "low", "nested": {"a": 1, "b": 2}}));
        let merged = merge_update(&current, &patch(json!({"context": {"nested": {"a": 9}}})));
        assert_eq!(merged.context["risk"], json!("low"));
        assert_eq!(merged.context["nested"], json!({"a": 9}));
    }

    #[test]
    fn context_null_value_is_kept_as_null() {
        let current = task(vec![], json!({"owner": "alice"}));
        let merged = merge_update(&current, &patch(json!({"context": {"owner": null}})));
        assert_eq!(merged.context.get("owner"), Some(&Value::Null));
    }

    fn arb_changes() -> impl Strategy<Value = Vec<Value>> {
        proptest::collection::vec(any::<i64>().prop_map(Value::from), 0..8)
    }

    fn arb_context() -> impl Strategy<Value = Context> {
        proptest::collection::btree_map("[a-f]{1,3}", any::<i64>(), 0..6)
            .prop_map(|m| m.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
    }

    proptest! {
        #[test]
        fn changes_are_concatenated(existing in arb_changes(), extra in arb_changes()) {
            let current = task(existing.clone(), json!({}));
            let p = TaskPatch { changes: Some(extra.clone()), ..Default::default() };
            let merged = merge_update(&current, &p);
            let mut expected = existing;
            expected.extend(extra);
            prop_assert_eq!(merged.changes, expected);
        }

        #[test]
        fn context_keys_never_removed(existing in arb_context(), overlay in arb_context()) {
            let mut current = task(vec![], json!({}));
            current.context = existing.clone();
            let p = TaskPatch { context: Some(overlay.clone()), ..Default::default() };
            let merged = merge_update(&current, &p);

            for (k, v) in &overlay {
                prop_assert_eq!(merged.context.get(k), Some(v));
            }
            for (k, v) in &existing {
                if !overlay.contains_key(k) {
                    prop_assert_eq!(merged.context.get(k), Some(v));
                }
            }
            prop_assert!(merged.context.len() >= existing.len());
        }
    }
}
