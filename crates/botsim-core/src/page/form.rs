//! Pending form field values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::block::TextObject;

/// A chosen option, as reported back in `view.state.values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextObject>,
}

/// The submitted value of one field.
///
/// Serializes to the platform's per-field state shape, e.g.
/// `{"value": "..."}` or `{"selected_users": ["U1"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text { value: String },
    SelectedOption { selected_option: SelectedOption },
    SelectedOptions { selected_options: Vec<SelectedOption> },
    SelectedUser { selected_user: String },
    SelectedUsers { selected_users: Vec<String> },
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }
}

/// Block id → action id → value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState(BTreeMap<String, BTreeMap<String, FieldValue>>);

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value, replacing whatever the block held before.
    pub fn record(&mut self, block_id: &str, action_id: &str, value: FieldValue) {
        let fields = self.0.entry(block_id.to_string()).or_default();
        fields.clear();
        fields.insert(action_id.to_string(), value);
    }

    pub fn get(&self, block_id: &str, action_id: &str) -> Option<&FieldValue> {
        self.0.get(block_id).and_then(|fields| fields.get(action_id))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of blocks with a recorded value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Hands the accumulated values over, leaving the form empty.
    pub fn take(&mut self) -> FormState {
        std::mem::take(self)
    }

    pub fn values(&self) -> &BTreeMap<String, BTreeMap<String, FieldValue>> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_serializes_in_platform_shape() {
        let mut form = FormState::new();
        form.record("title_block", "title", FieldValue::text("Q3 review"));
        form.record(
            "grade_block",
            "grade",
            FieldValue::SelectedOption {
                selected_option: SelectedOption {
                    value: "4".into(),
                    text: None,
                },
            },
        );
        form.record(
            "peers_block",
            "peers",
            FieldValue::SelectedUsers {
                selected_users: vec!["U1".into(), "U2".into()],
            },
        );

        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            json!({
                "title_block": {"title": {"value": "Q3 review"}},
                "grade_block": {"grade": {"selected_option": {"value": "4"}}},
                "peers_block": {"peers": {"selected_users": ["U1", "U2"]}}
            })
        );
    }

    #[test]
    fn test_record_replaces_previous_value() {
        let mut form = FormState::new();
        form.record("b", "a", FieldValue::text("first"));
        form.record("b", "a", FieldValue::text("second"));

        assert_eq!(form.len(), 1);
        assert_eq!(form.get("b", "a"), Some(&FieldValue::text("second")));
    }

    #[test]
    fn test_take_empties_the_form() {
        let mut form = FormState::new();
        form.record("b", "a", FieldValue::text("x"));

        let taken = form.take();
        assert!(form.is_empty());
        assert_eq!(taken.len(), 1);
    }

    #[test]
    fn test_decode_untagged_values() {
        let form: FormState = serde_json::from_value(json!({
            "b1": {"a": {"selected_user": "U9"}},
            "b2": {"a": {"value": "hello"}}
        }))
        .unwrap();

        assert_eq!(
            form.get("b1", "a"),
            Some(&FieldValue::SelectedUser {
                selected_user: "U9".into()
            })
        );
        assert_eq!(form.get("b2", "a"), Some(&FieldValue::text("hello")));
    }
}
