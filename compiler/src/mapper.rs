//! Lowers JSON Schema nodes into [`TypeNode`]s.
//!
//! Named definitions are interned: the first `$ref` to a name reserves a
//! slot in the table before its body is lowered, so re-entrant and cyclic
//! references resolve to the same [`DefId`] instead of recursing.

use cw_bindgen_schema::{json_kind, DocumentRole, SchemaDocument};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::{
    error::CompileError,
    resolver::{escape_pointer, resolve},
    types::{DefId, Definition, DefinitionTable, Field, Primitive, TypeNode, Variant},
    utils::quote,
};

/// Keywords that shape the lowered type.
const STRUCTURAL_KEYWORDS: [&str; 11] = [
    "$ref", "type", "properties", "required", "additionalProperties", "items",
    "enum", "oneOf", "anyOf", "allOf", "format",
];

/// Keywords that are validation or documentation only.
const ANNOTATION_KEYWORDS: [&str; 21] = [
    "title", "description", "$schema", "$id", "$comment", "default", "examples",
    "minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum",
    "minItems", "maxItems", "uniqueItems", "minLength", "maxLength", "pattern",
    "deprecated", "readOnly", "writeOnly", "contentEncoding",
];

/// Keys that only make sense at a document root.
const ROOT_KEYWORDS: [&str; 2] = ["definitions", "$defs"];

/// Root keys ignored when deciding whether two same-named definitions agree.
const IDENTITY_IGNORED: [&str; 4] = ["$schema", "title", "definitions", "$defs"];

/// (document, definition name or `None` for the root)
type SlotKey = (usize, Option<String>);

struct Slot<'d> {
    name:        String,
    owner:       DocumentRole,
    description: Option<String>,
    key:         SlotKey,
    schema:      &'d Value,
    node:        Option<TypeNode>,
}

pub(crate) struct Mapper<'d> {
    documents: &'d [SchemaDocument],
    slots:     Vec<Slot<'d>>,
    by_name:   IndexMap<String, DefId>,
    interned:  HashMap<SlotKey, DefId>,
}

impl<'d> Mapper<'d> {
    pub(crate) fn new(documents: &'d [SchemaDocument]) -> Self {
        Mapper {
            documents,
            slots:    Vec::new(),
            by_name:  IndexMap::new(),
            interned: HashMap::new(),
        }
    }

    /// Interns the root of `documents[document]` under the document's name.
    pub(crate) fn intern_root(&mut self, document: usize) -> Result<DefId, CompileError> {
        let documents = self.documents;
        self.intern(document, None, documents[document].root())
    }

    pub(crate) fn finish(self) -> Result<DefinitionTable, CompileError> {
        let mut definitions = Vec::with_capacity(self.slots.len());
        for slot in self.slots {
            let node = slot.node.ok_or_else(|| {
                CompileError::malformed(&slot.name, "definition was never completed")
            })?;
            definitions.push(Definition {
                name:        slot.name,
                owner:       slot.owner,
                description: slot.description,
                node,
            });
        }
        Ok(DefinitionTable::from_definitions(definitions))
    }

    fn label(&self, document: usize) -> &str {
        &self.documents[document].label
    }

    fn unsupported(&self, document: usize, path: &str, construct: &str) -> CompileError {
        CompileError::UnsupportedSchemaConstruct {
            document:  self.label(document).to_string(),
            path:      path.to_string(),
            construct: construct.to_string(),
        }
    }

    fn malformed(&self, document: usize, path: &str, message: &str) -> CompileError {
        let at = if path.is_empty() { "/" } else { path };
        CompileError::malformed(self.label(document), format!("{} (at {})", message, at))
    }

    fn intern(
        &mut self,
        document: usize,
        name: Option<&str>,
        schema: &'d Value,
    ) -> Result<DefId, CompileError> {
        let key: SlotKey = (document, name.map(str::to_string));
        if let Some(id) = self.interned.get(&key) {
            return Ok(*id);
        }

        let documents = self.documents;
        let doc = &documents[document];
        let base = name.map(str::to_string).unwrap_or_else(|| doc.name());

        let mut chosen = base.clone();
        if let Some(existing) = self.by_name.get(&base).copied() {
            if self.same_definition(existing, &key, schema) {
                self.interned.insert(key, existing);
                return Ok(existing);
            }
            let qualified = format!("{}{}", doc.role.qualifier(), base);
            if let Some(other) = self.by_name.get(&qualified).copied() {
                if self.same_definition(other, &key, schema) {
                    self.interned.insert(key, other);
                    return Ok(other);
                }
                return Err(CompileError::conflict(
                    &qualified,
                    format!(
                        "{} in {} differs from an existing definition and its qualified name is taken",
                        quote(&base),
                        doc.label
                    ),
                ));
            }
            debug!(name = %base, qualified = %qualified, "qualifying colliding definition");
            chosen = qualified;
        }

        let id = DefId(self.slots.len());
        self.slots.push(Slot {
            name:        chosen.clone(),
            owner:       doc.role.clone(),
            description: description_of(schema),
            key:         key.clone(),
            schema,
            node:        None,
        });
        self.by_name.insert(chosen, id);
        self.interned.insert(key, id);

        let path = match name {
            Some(name) => format!("/definitions/{}", escape_pointer(name)),
            None       => String::new(),
        };
        let node = self.lower(document, schema, &path)?;
        self.slots[id.0].node = Some(node);
        Ok(id)
    }

    /// True if `schema`, found at `key`, lowers to the same type as the
    /// interned definition `existing`. The raw JSON alone is not enough: a
    /// `$ref` is resolved per document, so both sides must also land on the
    /// same definitions.
    fn same_definition(&self, existing: DefId, key: &SlotKey, schema: &'d Value) -> bool {
        let slot = &self.slots[existing.0];
        let mut assumed = HashSet::new();
        assumed.insert((slot.key.clone(), key.clone()));
        self.same_schema((slot.key.0, slot.schema), (key.0, schema), true, &mut assumed)
    }

    fn same_schema(
        &self,
        (left_doc, left): (usize, &'d Value),
        (right_doc, right): (usize, &'d Value),
        root: bool,
        assumed: &mut HashSet<(SlotKey, SlotKey)>,
    ) -> bool {
        match (left, right) {
            (Value::Object(left), Value::Object(right)) => {
                let shaping = |object: &'d Map<String, Value>| {
                    object
                        .iter()
                        .filter(move |(key, _)| !(root && IDENTITY_IGNORED.contains(&key.as_str())))
                };
                if shaping(left).count() != shaping(right).count() {
                    return false;
                }
                for (key, left_value) in shaping(left) {
                    let Some(right_value) = right.get(key) else {
                        return false;
                    };
                    let same = if key == "$ref" {
                        self.same_target((left_doc, left_value), (right_doc, right_value), assumed)
                    } else {
                        self.same_schema((left_doc, left_value), (right_doc, right_value), false, assumed)
                    };
                    if !same {
                        return false;
                    }
                }
                true
            }
            (Value::Array(left), Value::Array(right)) => {
                left.len() == right.len()
                    && left.iter().zip(right).all(|(l, r)| {
                        self.same_schema((left_doc, l), (right_doc, r), false, assumed)
                    })
            }
            _ => left == right,
        }
    }

    fn same_target(
        &self,
        (left_doc, left): (usize, &'d Value),
        (right_doc, right): (usize, &'d Value),
        assumed: &mut HashSet<(SlotKey, SlotKey)>,
    ) -> bool {
        let (Value::String(left_ref), Value::String(right_ref)) = (left, right) else {
            return self.same_schema((left_doc, left), (right_doc, right), false, assumed);
        };
        let (Ok(left), Ok(right)) = (
            resolve(self.documents, left_doc, left_ref),
            resolve(self.documents, right_doc, right_ref),
        ) else {
            return left_ref == right_ref;
        };

        let base = |document: usize, name: Option<&str>| {
            name.map(str::to_string).unwrap_or_else(|| self.documents[document].name())
        };
        let left_base = base(left.document, left.name);
        if left_base != base(right.document, right.name) {
            return false;
        }

        let left_key: SlotKey = (left.document, left.name.map(str::to_string));
        let right_key: SlotKey = (right.document, right.name.map(str::to_string));
        if left_key == right_key {
            return true;
        }
        match (self.interned.get(&left_key), self.interned.get(&right_key)) {
            (Some(left_id), Some(right_id)) => return left_id == right_id,
            // The other side will intern against whatever holds the plain name.
            (Some(id), None) | (None, Some(id)) if self.by_name.get(&left_base) != Some(id) => return false,
            _ => {}
        }
        if !assumed.insert((left_key, right_key)) {
            return true;
        }
        self.same_schema((left.document, left.schema), (right.document, right.schema), true, assumed)
    }

    /// Lowers one schema node. `path` is its JSON pointer within the document.
    pub(crate) fn lower(
        &mut self,
        document: usize,
        schema: &'d Value,
        path: &str,
    ) -> Result<TypeNode, CompileError> {
        let object = match schema {
            Value::Object(object) => object,
            Value::Bool(_)        => return Err(self.unsupported(document, path, "boolean schema")),
            other => {
                return Err(self.malformed(
                    document,
                    path,
                    &format!("expected a schema object, found {}", json_kind(other)),
                ))
            }
        };
        self.check_keywords(document, object, path)?;

        if let Some(reference) = object.get("$ref") {
            let Value::String(reference) = reference else {
                return Err(self.malformed(document, path, "\"$ref\" must be a string"));
            };
            if let Some(sibling) = object
                .keys()
                .find(|key| key.as_str() != "$ref" && STRUCTURAL_KEYWORDS.contains(&key.as_str()))
            {
                return Err(self.unsupported(document, path, sibling));
            }
            let target = resolve(self.documents, document, reference)?;
            let id = self.intern(target.document, target.name, target.schema)?;
            return Ok(TypeNode::Reference(id));
        }

        if let Some(members) = object.get("allOf") {
            let members = self.array(document, path, "allOf", members)?;
            if members.len() != 1 {
                return Err(self.unsupported(document, path, "allOf"));
            }
            return self.lower(document, &members[0], &format!("{}/allOf/0", path));
        }

        for keyword in ["oneOf", "anyOf"] {
            if let Some(alternatives) = object.get(keyword) {
                if object.contains_key("properties") || object.contains_key("enum") {
                    return Err(self.unsupported(document, path, keyword));
                }
                return self.lower_alternatives(document, keyword, alternatives, path);
            }
        }

        if let Some(values) = object.get("enum") {
            return self.lower_enum(document, object, values, path);
        }

        match object.get("type") {
            Some(Value::String(ty)) => self.lower_typed(document, ty, object, path),
            Some(Value::Array(types)) => {
                let mut names = Vec::with_capacity(types.len());
                for ty in types {
                    match ty.as_str() {
                        Some(name) => names.push(name),
                        None => return Err(self.malformed(document, path, "\"type\" entries must be strings")),
                    }
                }
                let nullable = names.contains(&"null");
                let concrete: Vec<&str> = names.iter().copied().filter(|ty| *ty != "null").collect();
                match concrete.as_slice() {
                    [] if nullable => Ok(TypeNode::Primitive(Primitive::Unit)),
                    [] => Err(self.malformed(document, path, "\"type\" must not be empty")),
                    [single] => {
                        let inner = self.lower_typed(document, single, object, path)?;
                        Ok(if nullable { TypeNode::optional(inner) } else { inner })
                    }
                    _ => Err(self.unsupported(document, path, "type")),
                }
            }
            Some(other) => Err(self.malformed(
                document,
                path,
                &format!("\"type\" must be a string or an array, found {}", json_kind(other)),
            )),
            None if object.contains_key("properties") || object.contains_key("additionalProperties") => {
                self.lower_typed(document, "object", object, path)
            }
            None => Err(self.unsupported(document, path, "untyped schema")),
        }
    }

    fn check_keywords(
        &self,
        document: usize,
        object: &Map<String, Value>,
        path: &str,
    ) -> Result<(), CompileError> {
        for keyword in object.keys() {
            let keyword = keyword.as_str();
            let known = STRUCTURAL_KEYWORDS.contains(&keyword)
                || ANNOTATION_KEYWORDS.contains(&keyword)
                || (path.is_empty() && ROOT_KEYWORDS.contains(&keyword));
            if !known {
                return Err(self.unsupported(document, path, keyword));
            }
        }
        Ok(())
    }

    fn array(
        &self,
        document: usize,
        path: &str,
        keyword: &str,
        value: &'d Value,
    ) -> Result<&'d Vec<Value>, CompileError> {
        match value {
            Value::Array(items) => Ok(items),
            other => Err(self.malformed(
                document,
                path,
                &format!("{} must be an array, found {}", quote(keyword), json_kind(other)),
            )),
        }
    }

    fn lower_alternatives(
        &mut self,
        document: usize,
        keyword: &str,
        alternatives: &'d Value,
        path: &str,
    ) -> Result<TypeNode, CompileError> {
        let alternatives = self.array(document, path, keyword, alternatives)?;

        let concrete: Vec<(usize, &'d Value)> = alternatives
            .iter()
            .enumerate()
            .filter(|(_, alt)| !is_null_schema(alt))
            .collect();
        if concrete.len() != alternatives.len() {
            return match concrete.as_slice() {
                [(index, single)] => {
                    let inner = self.lower(document, *single, &format!("{}/{}/{}", path, keyword, index))?;
                    Ok(TypeNode::optional(inner))
                }
                _ => Err(self.unsupported(document, path, keyword)),
            };
        }

        let mut variants: Vec<Variant> = Vec::new();
        for (index, alternative) in alternatives.iter().enumerate() {
            let alt_path = format!("{}/{}/{}", path, keyword, index);
            let Value::Object(alt) = alternative else {
                return Err(self.unsupported(document, &alt_path, keyword));
            };
            self.check_keywords(document, alt, &alt_path)?;
            let description = alt.get("description").and_then(Value::as_str).map(str::to_string);

            if let Some(values) = alt.get("enum") {
                for tag in self.enum_tags(document, alt, values, &alt_path)? {
                    variants.push(Variant { tag, payload: None, description: description.clone() });
                }
            } else if let Some((tag, payload)) = single_property(alt) {
                let payload_path = format!("{}/properties/{}", alt_path, escape_pointer(tag));
                let payload = self.lower(document, payload, &payload_path)?;
                variants.push(Variant {
                    tag: tag.to_string(),
                    payload: Some(payload),
                    description,
                });
            } else {
                return Err(self.unsupported(document, &alt_path, keyword));
            }
        }

        for (index, variant) in variants.iter().enumerate() {
            if variants[..index].iter().any(|earlier| earlier.tag == variant.tag) {
                return Err(self.malformed(
                    document,
                    path,
                    &format!("variant {} appears twice", quote(&variant.tag)),
                ));
            }
        }

        Ok(TypeNode::Union(variants))
    }

    fn lower_enum(
        &mut self,
        document: usize,
        object: &'d Map<String, Value>,
        values: &'d Value,
        path: &str,
    ) -> Result<TypeNode, CompileError> {
        let variants = self
            .enum_tags(document, object, values, path)?
            .into_iter()
            .map(|tag| Variant { tag, payload: None, description: None })
            .collect();
        Ok(TypeNode::Union(variants))
    }

    fn enum_tags(
        &self,
        document: usize,
        object: &Map<String, Value>,
        values: &'d Value,
        path: &str,
    ) -> Result<Vec<String>, CompileError> {
        if object.get("type").is_some_and(|ty| ty != "string")
            || object.contains_key("properties")
        {
            return Err(self.unsupported(document, path, "enum"));
        }
        let values = self.array(document, path, "enum", values)?;
        let mut tags: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            let Value::String(tag) = value else {
                return Err(self.unsupported(document, path, "enum"));
            };
            if tags.contains(tag) {
                return Err(self.malformed(
                    document,
                    path,
                    &format!("enum value {} appears twice", quote(tag)),
                ));
            }
            tags.push(tag.clone());
        }
        Ok(tags)
    }

    fn lower_typed(
        &mut self,
        document: usize,
        ty: &str,
        object: &'d Map<String, Value>,
        path: &str,
    ) -> Result<TypeNode, CompileError> {
        let format = object.get("format").and_then(Value::as_str);
        match ty {
            "object" => self.lower_object(document, object, path),
            "array" => match object.get("items") {
                None => Err(self.malformed(document, path, "array schema has no \"items\"")),
                Some(Value::Array(elements)) => {
                    let mut lowered = Vec::with_capacity(elements.len());
                    for (index, element) in elements.iter().enumerate() {
                        lowered.push(self.lower(document, element, &format!("{}/items/{}", path, index))?);
                    }
                    Ok(TypeNode::Tuple(lowered))
                }
                Some(items) => {
                    let element = self.lower(document, items, &format!("{}/items", path))?;
                    Ok(TypeNode::Array(Box::new(element)))
                }
            },
            "string" => {
                let base64 = object.get("contentEncoding").and_then(Value::as_str) == Some("base64");
                let primitive = match format {
                    _ if base64                     => Primitive::Binary,
                    Some("byte") | Some("binary")   => Primitive::Binary,
                    Some("decimal")                 => Primitive::Decimal,
                    _                               => Primitive::String,
                };
                Ok(TypeNode::Primitive(primitive))
            }
            "integer" => {
                let (bits, signed) = match format {
                    None | Some("int64") | Some("int") => (64, true),
                    Some("int8")    => (8, true),
                    Some("int16")   => (16, true),
                    Some("int32")   => (32, true),
                    Some("int128")  => (128, true),
                    Some("uint8")   => (8, false),
                    Some("uint16")  => (16, false),
                    Some("uint32")  => (32, false),
                    Some("uint64") | Some("uint") => (64, false),
                    Some("uint128") => (128, false),
                    Some(other) => {
                        return Err(self.unsupported(document, path, &format!("format {}", quote(other))))
                    }
                };
                Ok(TypeNode::Primitive(Primitive::Integer { bits, signed }))
            }
            "number" => {
                let bits = match format {
                    None | Some("double") => 64,
                    Some("float")         => 32,
                    Some(other) => {
                        return Err(self.unsupported(document, path, &format!("format {}", quote(other))))
                    }
                };
                Ok(TypeNode::Primitive(Primitive::Float { bits }))
            }
            "boolean" => Ok(TypeNode::Primitive(Primitive::Boolean)),
            "null"    => Ok(TypeNode::Primitive(Primitive::Unit)),
            other => Err(self.malformed(
                document,
                path,
                &format!("unrecognized type {}", quote(other)),
            )),
        }
    }

    fn lower_object(
        &mut self,
        document: usize,
        object: &'d Map<String, Value>,
        path: &str,
    ) -> Result<TypeNode, CompileError> {
        let additional = object.get("additionalProperties");
        match additional {
            None | Some(Value::Bool(false)) | Some(Value::Object(_)) => {}
            Some(Value::Bool(true)) => return Err(self.unsupported(document, path, "additionalProperties")),
            Some(other) => {
                return Err(self.malformed(
                    document,
                    path,
                    &format!("\"additionalProperties\" must be a schema or a boolean, found {}", json_kind(other)),
                ))
            }
        }
        let Some(properties) = object.get("properties") else {
            if let Some(schema) = additional.filter(|value| value.is_object()) {
                let value = self.lower(document, schema, &format!("{}/additionalProperties", path))?;
                return Ok(TypeNode::Map(Box::new(value)));
            }
            if self.required(document, object, path)?.is_empty() {
                return Ok(TypeNode::Struct(Vec::new()));
            }
            return Err(self.malformed(document, path, "\"required\" lists properties that are not declared"));
        };

        if matches!(additional, Some(Value::Object(_))) {
            return Err(self.unsupported(document, path, "additionalProperties"));
        }
        let Value::Object(properties) = properties else {
            return Err(self.malformed(document, path, "\"properties\" must be an object"));
        };

        let required = self.required(document, object, path)?;
        if let Some(missing) = required.iter().find(|name| !properties.contains_key(**name)) {
            return Err(self.malformed(
                document,
                path,
                &format!("required property {} is not declared", quote(missing)),
            ));
        }

        let mut fields = Vec::with_capacity(properties.len());
        for (name, property) in properties {
            let property_path = format!("{}/properties/{}", path, escape_pointer(name));
            let lowered = self.lower(document, property, &property_path)?;
            let is_required = required.contains(&name.as_str());
            fields.push(Field {
                name:        name.clone(),
                ty:          if is_required { lowered } else { TypeNode::optional(lowered) },
                required:    is_required,
                description: description_of(property),
            });
        }
        Ok(TypeNode::Struct(fields))
    }

    fn required(
        &self,
        document: usize,
        object: &'d Map<String, Value>,
        path: &str,
    ) -> Result<Vec<&'d str>, CompileError> {
        let Some(required) = object.get("required") else {
            return Ok(Vec::new());
        };
        let items = self.array(document, path, "required", required)?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| self.malformed(document, path, "\"required\" entries must be strings"))
            })
            .collect()
    }
}

/// `{"type": "null"}`, possibly with annotations.
fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

/// The `(tag, payload)` of a `{"required": [tag], "properties": {tag: payload}}` alternative.
fn single_property(alternative: &Map<String, Value>) -> Option<(&str, &Value)> {
    let required = alternative.get("required")?.as_array()?;
    let properties = alternative.get("properties")?.as_object()?;
    match (required.as_slice(), properties.len()) {
        ([Value::String(tag)], 1) => properties.get(tag).map(|payload| (tag.as_str(), payload)),
        _ => None,
    }
}

fn description_of(schema: &Value) -> Option<String> {
    schema.get("description").and_then(Value::as_str).map(str::to_string)
}
