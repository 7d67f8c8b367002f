use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{
    document::{DocumentRole, SchemaDocument},
    error::SchemaError,
    kind::MessageKind,
};

lazy_static! {
    static ref RESPONSE_FILE: Regex =
        Regex::new(r"^(?:response_to_(?P<prefixed>\w+)|(?P<suffixed>\w+)_response)$").unwrap();
}

/// Raw content of one schema document.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    Bytes(Vec<u8>),
    Value(Value),
}

impl From<Vec<u8>> for SchemaSource {
    fn from(bytes: Vec<u8>) -> Self {
        SchemaSource::Bytes(bytes)
    }
}

impl From<&[u8]> for SchemaSource {
    fn from(bytes: &[u8]) -> Self {
        SchemaSource::Bytes(bytes.to_vec())
    }
}

impl From<&str> for SchemaSource {
    fn from(text: &str) -> Self {
        SchemaSource::Bytes(text.as_bytes().to_vec())
    }
}

impl From<Value> for SchemaSource {
    fn from(value: Value) -> Self {
        SchemaSource::Value(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntry {
    pub label:  String,
    pub source: SchemaSource,
}

/// Every schema document supplied for one contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaSources {
    messages:  IndexMap<MessageKind, SourceEntry>,
    responses: IndexMap<String, SourceEntry>,
    shared:    Option<SourceEntry>,
}

impl SchemaSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, kind: MessageKind, source: impl Into<SchemaSource>) -> Self {
        self.insert_message(kind, format!("{}.json", kind.file_stem()), source);
        self
    }

    pub fn with_response(mut self, tag: impl Into<String>, source: impl Into<SchemaSource>) -> Self {
        let tag = tag.into();
        let label = format!("response_to_{}.json", tag);
        self.insert_response(tag, label, source);
        self
    }

    pub fn with_shared(mut self, source: impl Into<SchemaSource>) -> Self {
        self.set_shared("definitions.json", source);
        self
    }

    /// Replaces any previous source for `kind`.
    pub fn insert_message(
        &mut self,
        kind: MessageKind,
        label: impl Into<String>,
        source: impl Into<SchemaSource>,
    ) -> Option<SourceEntry> {
        let entry = SourceEntry { label: label.into(), source: source.into() };
        self.messages.insert(kind, entry)
    }

    pub fn insert_response(
        &mut self,
        tag: impl Into<String>,
        label: impl Into<String>,
        source: impl Into<SchemaSource>,
    ) -> Option<SourceEntry> {
        let entry = SourceEntry { label: label.into(), source: source.into() };
        self.responses.insert(tag.into(), entry)
    }

    pub fn set_shared(&mut self, label: impl Into<String>, source: impl Into<SchemaSource>) {
        self.shared = Some(SourceEntry { label: label.into(), source: source.into() });
    }

    pub fn message(&self, kind: MessageKind) -> Option<&SourceEntry> {
        self.messages.get(&kind)
    }

    /// Message sources in [`MessageKind::ALL`] order, whatever order they were added in.
    pub fn messages(&self) -> impl Iterator<Item = (MessageKind, &SourceEntry)> {
        MessageKind::ALL
            .into_iter()
            .filter_map(move |kind| self.messages.get(&kind).map(|entry| (kind, entry)))
    }

    pub fn response(&self, tag: &str) -> Option<&SourceEntry> {
        self.responses.get(tag)
    }

    pub fn responses(&self) -> impl Iterator<Item = (&str, &SourceEntry)> {
        self.responses.iter().map(|(tag, entry)| (tag.as_str(), entry))
    }

    pub fn shared(&self) -> Option<&SourceEntry> {
        self.shared.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.responses.is_empty() && self.shared.is_none()
    }

    /// Parses every source: shared definitions first, then messages, then responses.
    pub fn documents(&self) -> Result<Vec<SchemaDocument>, SchemaError> {
        let mut documents = Vec::new();
        if let Some(entry) = &self.shared {
            documents.push(SchemaDocument::parse(&entry.label, DocumentRole::Shared, &entry.source)?);
        }
        for (kind, entry) in self.messages() {
            documents.push(SchemaDocument::parse(
                &entry.label,
                DocumentRole::Message(kind),
                &entry.source,
            )?);
        }
        for (tag, entry) in self.responses() {
            documents.push(SchemaDocument::parse(
                &entry.label,
                DocumentRole::Response(tag.to_string()),
                &entry.source,
            )?);
        }
        Ok(documents)
    }

    /// Splits a combined IDL document (`cosmwasm-schema` >= 1.1) into sources.
    pub fn from_idl(label: &str, idl: &Value) -> Result<Self, SchemaError> {
        let Value::Object(root) = idl else {
            return Err(SchemaError::malformed(label, "an IDL document must be an object"));
        };

        let mut sources = SchemaSources::new();
        for kind in MessageKind::ALL {
            match root.get(kind.as_str()) {
                None | Some(Value::Null) => {}
                Some(schema) => {
                    sources.insert_message(kind, format!("{}#/{}", label, kind), schema.clone());
                }
            }
        }

        match root.get("responses") {
            None | Some(Value::Null) => {}
            Some(Value::Object(responses)) => {
                for (tag, schema) in responses {
                    if schema.is_null() {
                        continue;
                    }
                    sources.insert_response(tag, format!("{}#/responses/{}", label, tag), schema.clone());
                }
            }
            Some(_) => {
                return Err(SchemaError::malformed(label, "\"responses\" must be an object"));
            }
        }

        Ok(sources)
    }

    /// Reads a `cosmwasm-schema` output directory.
    ///
    /// Recognizes per-kind files (`execute_msg.json`), responses
    /// (`response_to_<tag>.json`, `<tag>_response.json`), shared definitions
    /// (`definitions.json`) and combined IDL files, at the top level and under
    /// `raw/`. A combined IDL file takes precedence over loose files; among
    /// loose files the first one in path order wins.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        enum Slot {
            Message(MessageKind),
            Response(String),
            Shared,
        }

        let dir = dir.as_ref();
        let mut files = json_files(dir)?;
        let raw = dir.join("raw");
        if raw.is_dir() {
            files.extend(json_files(&raw)?);
        }

        let mut sources = SchemaSources::new();
        let mut loose: Vec<(Slot, PathBuf)> = Vec::new();

        for path in files {
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default()
                .to_string();

            if let Some(kind) = MessageKind::from_file_stem(&stem) {
                loose.push((Slot::Message(kind), path));
            } else if stem == "definitions" {
                loose.push((Slot::Shared, path));
            } else if let Some(caps) = RESPONSE_FILE.captures(&stem) {
                let tag = caps
                    .name("prefixed")
                    .or_else(|| caps.name("suffixed"))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                loose.push((Slot::Response(tag), path));
            } else {
                let label = path.display().to_string();
                let bytes = fs::read(&path).map_err(|e| SchemaError::io(&path, e))?;
                let value: Value = serde_json::from_slice(&bytes)
                    .map_err(|source| SchemaError::Parse { label: label.clone(), source })?;
                if is_idl(&value) {
                    debug!(path = %label, "found combined contract schema");
                    sources.merge_missing(SchemaSources::from_idl(&label, &value)?);
                } else {
                    debug!(path = %label, "skipping schema file without a message role");
                }
            }
        }

        for (slot, path) in loose {
            let label = path.display().to_string();
            let taken = match &slot {
                Slot::Message(kind)  => sources.messages.contains_key(kind),
                Slot::Response(tag)  => sources.responses.contains_key(tag),
                Slot::Shared         => sources.shared.is_some(),
            };
            if taken {
                debug!(path = %label, "schema already provided, skipping");
                continue;
            }
            let bytes = fs::read(&path).map_err(|e| SchemaError::io(&path, e))?;
            match slot {
                Slot::Message(kind) => {
                    sources.insert_message(kind, label, bytes);
                }
                Slot::Response(tag) => {
                    sources.insert_response(tag, label, bytes);
                }
                Slot::Shared => sources.set_shared(label, bytes),
            }
        }

        Ok(sources)
    }

    fn merge_missing(&mut self, other: SchemaSources) {
        for (kind, entry) in other.messages {
            self.messages.entry(kind).or_insert(entry);
        }
        for (tag, entry) in other.responses {
            self.responses.entry(tag).or_insert(entry);
        }
        if self.shared.is_none() {
            self.shared = other.shared;
        }
    }
}

fn is_idl(value: &Value) -> bool {
    value.get("contract_name").is_some() && value.get("instantiate").is_some()
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>, SchemaError> {
    let entries = fs::read_dir(dir).map_err(|e| SchemaError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SchemaError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
