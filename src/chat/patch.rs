// src/chat/patch.rs
//! Turning assistant update objects into store actions

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::store::ResumeAction;
use crate::types::resume::{ResumeData, ResumeSettingsPatch};

/// Drop null-valued keys at the top level of an update object, and one level
/// down inside `personalInfo`. Anything that is not an object passes through.
pub fn strip_nulls(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };

    let stripped: Map<String, Value> = map
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(key, v)| {
            let v = match v {
                Value::Object(info) if key == "personalInfo" => {
                    Value::Object(info.into_iter().filter(|(_, v)| !v.is_null()).collect())
                }
                other => other,
            };
            (key, v)
        })
        .collect();
    Value::Object(stripped)
}

fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}

/// Merge actions for the non-empty update objects of one assistant reply
pub fn updates_to_actions(
    resume_updates: Option<Value>,
    settings_updates: Option<Value>,
) -> Result<Vec<ResumeAction>> {
    let mut actions = Vec::new();

    if let Some(updates) = resume_updates.map(strip_nulls) {
        if !is_empty_object(&updates) {
            let data: ResumeData =
                serde_json::from_value(updates).context("Invalid resumeUpdates from assistant")?;
            if !data.is_empty() {
                actions.push(ResumeAction::ResumeData(data));
            }
        }
    }

    if let Some(updates) = settings_updates.map(strip_nulls) {
        if !is_empty_object(&updates) {
            let patch: ResumeSettingsPatch = serde_json::from_value(updates)
                .context("Invalid settingsUpdates from assistant")?;
            if !patch.is_empty() {
                actions.push(ResumeAction::ResumeSettings(patch));
            }
        }
    }

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_strip_nulls_top_level_and_personal_info() {
        let stripped = strip_nulls(json!({
            "personalInfo": {"name": "Alex", "email": null, "links": {"x": null}},
            "skills": null,
            "interests": ["Chess"]
        }));
        assert_eq!(
            stripped,
            json!({
                "personalInfo": {"name": "Alex", "links": {"x": null}},
                "interests": ["Chess"]
            })
        );
    }

    #[test]
    fn test_strip_nulls_passes_non_objects() {
        assert_eq!(strip_nulls(json!([1, null])), json!([1, null]));
        assert_eq!(strip_nulls(Value::Null), Value::Null);
    }

    #[test]
    fn test_empty_updates_produce_no_actions() {
        let actions =
            updates_to_actions(Some(json!({"skills": null})), Some(json!({}))).unwrap();
        assert!(actions.is_empty());
        assert!(updates_to_actions(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_updates_become_merge_actions() {
        let actions = updates_to_actions(
            Some(json!({"interests": ["Go", "Sailing"]})),
            Some(json!({"template": "modern", "fontSize": null})),
        )
        .unwrap();

        assert_eq!(
            actions,
            vec![
                ResumeAction::ResumeData(ResumeData {
                    interests: Some(vec!["Go".into(), "Sailing".into()]),
                    ..Default::default()
                }),
                ResumeAction::ResumeSettings(ResumeSettingsPatch {
                    template: Some("modern".into()),
                    ..Default::default()
                }),
            ]
        );
    }

    #[test]
    fn test_malformed_updates_are_errors() {
        assert!(updates_to_actions(Some(json!({"skills": "lots"})), None).is_err());
    }
}
