use indexmap::IndexMap;
use serde_json::Value;

use crate::{error::SchemaError, kind::MessageKind, source::SchemaSource};

/// Sections of a document root that hold named definitions.
pub const DEFINITION_SECTIONS: [&str; 2] = ["definitions", "$defs"];

/// What a document describes within its contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentRole {
    /// The payload of one message kind.
    Message(MessageKind),
    /// The response of the query variant with this tag.
    Response(String),
    /// Definitions shared by every other document of the contract.
    Shared,
}

impl DocumentRole {
    /// Prefix used to disambiguate colliding definition names.
    pub fn qualifier(&self) -> String {
        match self {
            DocumentRole::Message(kind) => kind.qualifier().to_string(),
            DocumentRole::Response(_)   => "Response".to_string(),
            DocumentRole::Shared        => "Shared".to_string(),
        }
    }

    /// Root type name used when the document has no `title`.
    pub fn default_title(&self) -> String {
        match self {
            DocumentRole::Message(kind) => kind.default_title().to_string(),
            DocumentRole::Response(tag) => format!("{}Response", capitalize_words(tag)),
            DocumentRole::Shared        => "Definitions".to_string(),
        }
    }
}

/// `my_game_list` -> `MyGameList`
fn capitalize_words(tag: &str) -> String {
    tag.split(|c: char| c == '_' || c == '-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None        => String::new(),
                Some(first) => first.to_uppercase().to_string() + chars.as_str(),
            }
        })
        .collect()
}

/// A parsed JSON Schema document. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    pub label:   String,
    pub role:    DocumentRole,
    pub title:   Option<String>,
    pub version: Option<String>,
    root:        Value,
    definitions: IndexMap<String, Value>,
}

impl SchemaDocument {
    pub fn parse(label: &str, role: DocumentRole, source: &SchemaSource) -> Result<Self, SchemaError> {
        let value = match source {
            SchemaSource::Bytes(bytes) => {
                serde_json::from_slice(bytes).map_err(|source| SchemaError::Parse {
                    label: label.to_string(),
                    source,
                })?
            }
            SchemaSource::Value(value) => value.clone(),
        };
        Self::from_value(label, role, value)
    }

    pub fn from_value(label: &str, role: DocumentRole, value: Value) -> Result<Self, SchemaError> {
        let root = match value {
            Value::Object(map) => map,
            other => {
                return Err(SchemaError::malformed(
                    label,
                    format!("expected an object at the document root, found {}", json_kind(&other)),
                ))
            }
        };

        let title   = string_key(&root, "title", label)?;
        let version = string_key(&root, "$schema", label)?;

        let mut definitions = IndexMap::new();
        for section in DEFINITION_SECTIONS {
            let Some(table) = root.get(section) else {
                continue;
            };
            let Value::Object(table) = table else {
                return Err(SchemaError::malformed(
                    label,
                    format!("\"{}\" must be an object, found {}", section, json_kind(table)),
                ));
            };
            for (name, definition) in table {
                if !definition.is_object() && !definition.is_boolean() {
                    return Err(SchemaError::malformed(
                        label,
                        format!("definition \"{}\" is not a schema", name),
                    ));
                }
                if definitions.insert(name.clone(), definition.clone()).is_some() {
                    return Err(SchemaError::malformed(
                        label,
                        format!("definition \"{}\" is declared twice", name),
                    ));
                }
            }
        }

        Ok(SchemaDocument {
            label: label.to_string(),
            role,
            title,
            version,
            root: Value::Object(root),
            definitions,
        })
    }

    /// The document's title, or the conventional name for its role.
    pub fn name(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.role.default_title())
    }

    /// The root schema object, definitions section included.
    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn description(&self) -> Option<&str> {
        self.root.get("description").and_then(Value::as_str)
    }

    pub fn definition(&self, name: &str) -> Option<&Value> {
        self.definitions.get(name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.definitions.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Whether `name` addresses this document in a cross-document reference:
    /// its label, the label's file name or stem, or its message kind.
    pub fn answers_to(&self, name: &str) -> bool {
        if self.label == name {
            return true;
        }
        let file_name = self.label.rsplit(['/', '\\']).next().unwrap_or(&self.label);
        let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
        if file_name == name || stem == name {
            return true;
        }
        match &self.role {
            DocumentRole::Message(kind) => kind.as_str() == name || kind.file_stem() == name,
            DocumentRole::Response(tag) => format!("response_to_{}", tag) == name,
            DocumentRole::Shared        => name == "definitions",
        }
    }
}

fn string_key(
    root: &serde_json::Map<String, Value>,
    key: &str,
    label: &str,
) -> Result<Option<String>, SchemaError> {
    match root.get(key) {
        None                    => Ok(None),
        Some(Value::String(s))  => Ok(Some(s.clone())),
        Some(other) => Err(SchemaError::malformed(
            label,
            format!("\"{}\" must be a string, found {}", key, json_kind(other)),
        )),
    }
}

/// Human readable name of a JSON value's type, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_)  => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bytes() {
        let bytes = br##"{
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": "ExecuteMsg",
            "oneOf": [],
            "definitions": { "Uint128": { "type": "string" }, "Addr": { "type": "string" } }
        }"##;
        let doc = SchemaDocument::parse(
            "execute_msg.json",
            DocumentRole::Message(MessageKind::Execute),
            &SchemaSource::Bytes(bytes.to_vec()),
        )
        .unwrap();

        assert_eq!(doc.name(), "ExecuteMsg");
        assert_eq!(doc.version.as_deref(), Some("http://json-schema.org/draft-07/schema#"));
        let names: Vec<&str> = doc.definitions().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Uint128", "Addr"]);
        assert_eq!(doc.definition("Addr"), Some(&json!({ "type": "string" })));
    }

    #[test]
    fn test_default_title() {
        let doc = SchemaDocument::from_value(
            "response",
            DocumentRole::Response("my_game_list".into()),
            json!({ "type": "object" }),
        )
        .unwrap();
        assert_eq!(doc.name(), "MyGameListResponse");
    }

    #[test]
    fn test_rejects_invalid_json() {
        let err = SchemaDocument::parse(
            "broken.json",
            DocumentRole::Shared,
            &SchemaSource::Bytes(b"{ not json".to_vec()),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Parse { label, .. } if label == "broken.json"));
    }

    #[test]
    fn test_rejects_non_object_root() {
        let err = SchemaDocument::from_value("list", DocumentRole::Shared, json!([1, 2])).unwrap_err();
        assert!(matches!(err, SchemaError::Malformed { .. }));
    }

    #[test]
    fn test_rejects_bad_definitions() {
        let err = SchemaDocument::from_value(
            "doc",
            DocumentRole::Shared,
            json!({ "definitions": ["Uint128"] }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("\"definitions\" must be an object"));

        let err = SchemaDocument::from_value(
            "doc",
            DocumentRole::Shared,
            json!({ "definitions": { "A": { "type": "string" } }, "$defs": { "A": { "type": "string" } } }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_answers_to() {
        let doc = SchemaDocument::from_value(
            "schema/raw/query_msg.json",
            DocumentRole::Message(MessageKind::Query),
            json!({}),
        )
        .unwrap();
        assert!(doc.answers_to("query_msg.json"));
        assert!(doc.answers_to("query_msg"));
        assert!(doc.answers_to("query"));
        assert!(!doc.answers_to("execute"));
    }
}
