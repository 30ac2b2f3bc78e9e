//! Form-error tree
//!
//! Binding failures form a tree mirroring the submitted payload: one
//! message per invalid field, with nested groups for embedded objects.
//! [`FormErrors::flatten`] turns the tree into the ordered single-level
//! list the 422 problem response carries.

use std::collections::BTreeMap;

/// One node in the error tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNode {
    /// A single message for a scalar field.
    Message(String),
    /// Errors of a nested object.
    Group(FormErrors),
}

/// Errors collected while binding one form level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    /// Errors attached to the form itself rather than a field.
    errors: Vec<String>,
    children: BTreeMap<String, FormNode>,
}

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an error to the form level.
    pub fn add(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Attach a message to a field, replacing any previous one.
    pub fn add_field(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.children
            .insert(field.into(), FormNode::Message(message.into()));
    }

    /// The error group of a nested field, created on first use. A scalar
    /// message already present under the name is replaced by the group.
    pub fn nested(&mut self, field: impl Into<String>) -> &mut FormErrors {
        let entry = self
            .children
            .entry(field.into())
            .or_insert_with(|| FormNode::Group(FormErrors::new()));
        if let FormNode::Message(_) = entry {
            *entry = FormNode::Group(FormErrors::new());
        }
        match entry {
            FormNode::Group(group) => group,
            FormNode::Message(_) => unreachable!("message replaced above"),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.children.is_empty()
    }

    /// Flatten into ordered `(key, message)` pairs. Nested keys are joined
    /// with `separator`; form-level errors are keyed by their index. An
    /// optional prefix (the form name) roots every key. Identical messages
    /// on different fields are kept.
    #[must_use]
    pub fn flatten(&self, separator: &str, prefix: Option<&str>) -> Vec<(String, String)> {
        let mut flat = Vec::new();
        self.flatten_into(separator, prefix.unwrap_or(""), &mut flat);
        flat
    }

    fn flatten_into(&self, separator: &str, key: &str, flat: &mut Vec<(String, String)>) {
        let child_key = |name: &str| {
            if key.is_empty() {
                name.to_string()
            } else {
                format!("{key}{separator}{name}")
            }
        };
        for (i, message) in self.errors.iter().enumerate() {
            flat.push((child_key(&i.to_string()), message.clone()));
        }
        for (name, node) in &self.children {
            match node {
                FormNode::Message(message) => flat.push((child_key(name), message.clone())),
                FormNode::Group(group) => group.flatten_into(separator, &child_key(name), flat),
            }
        }
    }

    /// The flattened messages only, each prefixed with its key path under
    /// the given form name. This is the 422 problem payload.
    #[must_use]
    pub fn messages(&self, separator: &str, form_name: Option<&str>) -> Vec<String> {
        self.flatten(separator, form_name)
            .into_iter()
            .map(|(key, message)| format!("{key}{separator}{message}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_message_overwrites() {
        let mut errors = FormErrors::new();
        errors.add_field("email", "invalid");
        errors.add_field("email", "taken");
        assert_eq!(
            errors.flatten("_", None),
            vec![("email".to_string(), "taken".to_string())]
        );
    }

    #[test]
    fn test_nested_keys_join_with_separator() {
        let mut errors = FormErrors::new();
        errors.add_field("name", "required");
        errors.nested("address").add_field("city", "required");
        assert_eq!(
            errors.flatten("_", Some("user")),
            vec![
                ("user_address_city".to_string(), "required".to_string()),
                ("user_name".to_string(), "required".to_string()),
            ]
        );
    }

    #[test]
    fn test_form_level_errors_keyed_by_index() {
        let mut errors = FormErrors::new();
        errors.add("passwords.must.match");
        errors.add("terms.not.accepted");
        assert_eq!(
            errors.flatten("_", Some("user")),
            vec![
                ("user_0".to_string(), "passwords.must.match".to_string()),
                ("user_1".to_string(), "terms.not.accepted".to_string()),
            ]
        );
    }

    #[test]
    fn test_duplicate_messages_kept() {
        let mut errors = FormErrors::new();
        errors.add_field("first_name", "required");
        errors.add_field("last_name", "required");
        let messages = errors.messages("_", Some("user"));
        assert_eq!(messages, ["user_first_name_required", "user_last_name_required"]);
    }

    #[test]
    fn test_nested_replaces_scalar_message() {
        let mut errors = FormErrors::new();
        errors.add_field("address", "invalid");
        errors.nested("address").add_field("zip", "required");
        assert_eq!(
            errors.flatten("_", None),
            vec![("address_zip".to_string(), "required".to_string())]
        );
    }

    #[test]
    fn test_empty() {
        assert!(FormErrors::new().is_empty());
        let mut errors = FormErrors::new();
        errors.add_field("x", "bad");
        assert!(!errors.is_empty());
    }
}
