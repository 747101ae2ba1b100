use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored document.
///
/// `content` is opaque to the store. `entity_type` is the partition tag the
/// mapper stamps on element documents so type-scoped queries can skip
/// everything else.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
}

impl Document {
    /// A document with no partition tag.
    pub fn new(content: Value) -> Self {
        Self {
            content,
            entity_type: None,
        }
    }

    /// A document tagged with the partition it belongs to.
    pub fn tagged(content: Value, entity_type: impl Into<String>) -> Self {
        Self {
            content,
            entity_type: Some(entity_type.into()),
        }
    }

    /// Look up a field of the content by a dot-separated path.
    ///
    /// Returns `None` if any segment is missing or the content is not an
    /// object at that level.
    pub fn field(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.content, |value, segment| value.get(segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_walks_nested_objects() {
        let doc = Document::new(json!({"user": {"name": "ada", "age": 36}}));
        assert_eq!(doc.field("user.name"), Some(&json!("ada")));
        assert_eq!(doc.field("user.missing"), None);
        assert_eq!(doc.field("user.name.first"), None);
    }

    #[test]
    fn untagged_document_omits_entity_type() {
        let encoded = serde_json::to_value(Document::new(json!([1, 2]))).unwrap();
        assert_eq!(encoded, json!({"content": [1, 2]}));

        let tagged = Document::tagged(json!({}), "session");
        assert_eq!(tagged.entity_type.as_deref(), Some("session"));
    }
}
