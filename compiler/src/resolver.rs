use cw_bindgen_schema::{DocumentRole, SchemaDocument};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::error::CompileError;

lazy_static! {
    static ref REFERENCE: Regex =
        Regex::new(r"^(?P<document>[^#]*)#(?:/(?:definitions|\$defs)/(?P<name>[^/]+))?$").unwrap();
}

/// A `$ref` split into its document and definition parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReference {
    /// `None` for a reference into the current document.
    pub document: Option<String>,
    /// `None` for a reference to the document root (`#`).
    pub name:     Option<String>,
}

/// Parses `#`, `#/definitions/Name`, `#/$defs/Name` and
/// `other.json#/definitions/Name`. Deeper JSON pointers are not supported.
pub fn parse_reference(reference: &str) -> Option<ParsedReference> {
    let caps = REFERENCE.captures(reference)?;
    let document = caps
        .name("document")
        .map(|m| m.as_str())
        .filter(|doc| !doc.is_empty())
        .map(str::to_string);
    let name = caps.name("name").map(|m| unescape_pointer(m.as_str()));
    Some(ParsedReference { document, name })
}

fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

pub fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Where a reference landed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Target<'d> {
    pub document: usize,
    pub name:     Option<&'d str>,
    pub schema:   &'d Value,
}

/// Resolves `reference` as seen from `documents[from]`.
///
/// A local name the document does not define falls back to the shared
/// definitions document, if there is one.
pub(crate) fn resolve<'d>(
    documents: &'d [SchemaDocument],
    from: usize,
    reference: &str,
) -> Result<Target<'d>, CompileError> {
    let label = &documents[from].label;
    let unresolved = |what: &str| CompileError::UnresolvedReference {
        document:  label.clone(),
        reference: what.to_string(),
    };

    let parsed = parse_reference(reference).ok_or_else(|| unresolved(reference))?;

    let scope = match &parsed.document {
        None => from,
        Some(doc_name) => documents
            .iter()
            .position(|doc| doc.answers_to(doc_name))
            .ok_or_else(|| unresolved(reference))?,
    };

    let Some(name) = parsed.name.as_deref() else {
        return Ok(Target {
            document: scope,
            name:     None,
            schema:   documents[scope].root(),
        });
    };

    if let Some((key, schema)) = lookup(&documents[scope], name) {
        return Ok(Target { document: scope, name: Some(key), schema });
    }

    if parsed.document.is_none() {
        let shared = documents
            .iter()
            .enumerate()
            .filter(|(_, doc)| doc.role == DocumentRole::Shared)
            .find_map(|(index, doc)| lookup(doc, name).map(|found| (index, found)));
        if let Some((index, (key, schema))) = shared {
            return Ok(Target { document: index, name: Some(key), schema });
        }
    }

    Err(unresolved(name))
}

fn lookup<'d>(document: &'d SchemaDocument, name: &str) -> Option<(&'d str, &'d Value)> {
    document.definitions().find(|(key, _)| *key == name)
}
