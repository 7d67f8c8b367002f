//! Renders a [`ContractInterface`] as Rust type declarations.
//!
//! Declarations come out dependencies first. Inline object and union schemas
//! are hoisted into their own named declarations, and a field that would
//! hold its own definition by value is boxed.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::{
    compiler::{Declaration, DeclarationKind},
    error::CompileError,
    types::{ContractInterface, DefId, Field, Primitive, TypeNode, Variant},
    utils::{doc_comment, escape_rust_keyword, is_identifier, quote, to_pascal_case, to_snake_case},
    verifier::{reachable_order, DirectGraph, NameRegistry},
};

const DERIVES: &str = "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]";
const UNIT_ENUM_DERIVES: &str = "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]";
const SKIP_NONE: &str = "#[serde(default, skip_serializing_if = \"Option::is_none\")]";

/// Everything the client generator needs from the type pass.
pub(crate) struct EmittedTypes {
    pub declarations: Vec<Declaration>,
    pub names:        NameRegistry,
    /// (enum name, variant tag) -> constructor argument type, `None` for unit variants.
    pub payloads:     HashMap<(String, String), Option<String>>,
}

/// The constructor generated for a union variant.
pub(crate) fn variant_constructor(tag: &str) -> String {
    escape_rust_keyword(&to_snake_case(tag))
}

pub(crate) fn emit_types(iface: &ContractInterface) -> Result<EmittedTypes, CompileError> {
    let order = reachable_order(iface);
    let mut names = NameRegistry::new(iface.definitions().len());
    for id in &order {
        let def = iface.definition(*id);
        names.claim_definition(*id, &to_pascal_case(&def.name), &def.owner.qualifier())?;
    }

    let mut emitter = RustEmitter {
        iface,
        graph:        DirectGraph::new(iface),
        names,
        declarations: Vec::new(),
        payloads:     HashMap::new(),
    };
    for id in order {
        emitter.emit_definition(id)?;
    }

    debug!(
        contract = %iface.contract,
        declarations = emitter.declarations.len(),
        "emitted type declarations"
    );
    Ok(EmittedTypes {
        declarations: emitter.declarations,
        names:        emitter.names,
        payloads:     emitter.payloads,
    })
}

fn primitive_type(primitive: Primitive) -> String {
    match primitive {
        Primitive::String | Primitive::Binary | Primitive::Decimal => "String".to_string(),
        Primitive::Integer { bits, signed } => format!("{}{}", if signed { "i" } else { "u" }, bits),
        Primitive::Float { bits } => format!("f{}", bits),
        Primitive::Boolean => "bool".to_string(),
        Primitive::Unit    => "()".to_string(),
    }
}

/// True if writing `id` as a `pub type` would expand back into `id` through
/// other aliases. Such definitions are emitted as transparent newtypes.
fn expands_to_itself(iface: &ContractInterface, id: DefId) -> bool {
    let is_alias = |id: DefId| !matches!(iface.definition(id).node, TypeNode::Struct(_) | TypeNode::Union(_));
    let mut stack = Vec::new();
    iface.definition(id).node.references(&mut stack);
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == id {
            return true;
        }
        if seen.insert(current) && is_alias(current) {
            iface.definition(current).node.references(&mut stack);
        }
    }
    false
}

struct RustEmitter<'a> {
    iface:        &'a ContractInterface,
    graph:        DirectGraph,
    names:        NameRegistry,
    declarations: Vec<Declaration>,
    payloads:     HashMap<(String, String), Option<String>>,
}

impl<'a> RustEmitter<'a> {
    fn push(&mut self, name: &str, kind: DeclarationKind, text: String) {
        self.declarations.push(Declaration { name: name.to_string(), kind, text });
    }

    fn emit_definition(&mut self, id: DefId) -> Result<(), CompileError> {
        let iface = self.iface;
        let def = iface.definition(id);
        let name = self.names.definition(id)?.to_string();
        let description = def.description.as_deref();
        match &def.node {
            TypeNode::Struct(fields) => self.emit_struct(&name, description, fields, id, false),
            TypeNode::Union(variants) => self.emit_union(&name, description, variants, id, false),
            other if expands_to_itself(iface, id) => {
                let inner = self.type_expr(other, id, &name, false)?;
                let text = format!(
                    "{}{}\n#[serde(transparent)]\npub struct {}(pub {});\n",
                    doc_comment(description, ""),
                    DERIVES,
                    name,
                    inner
                );
                self.push(&name, DeclarationKind::Struct, text);
                Ok(())
            }
            other => {
                let target = self.type_expr(other, id, &name, false)?;
                let text = format!("{}pub type {} = {};\n", doc_comment(description, ""), name, target);
                self.push(&name, DeclarationKind::Alias, text);
                Ok(())
            }
        }
    }

    /// `behind` is set once the expression sits inside a `Vec` or `BTreeMap`,
    /// where holding the owner again does not need a box.
    fn type_expr(
        &mut self,
        node: &TypeNode,
        owner: DefId,
        hint: &str,
        behind: bool,
    ) -> Result<String, CompileError> {
        let expr = match node {
            TypeNode::Primitive(primitive) => primitive_type(*primitive),
            TypeNode::Reference(target) => {
                let name = self.names.definition(*target)?;
                if !behind && self.graph.closes_cycle(owner, *target) {
                    format!("Box<{}>", name)
                } else {
                    name.to_string()
                }
            }
            TypeNode::Optional(inner) => format!("Option<{}>", self.type_expr(inner, owner, hint, behind)?),
            TypeNode::Array(inner) => {
                format!("Vec<{}>", self.type_expr(inner, owner, &format!("{}Item", hint), true)?)
            }
            TypeNode::Map(inner) => {
                format!("BTreeMap<String, {}>", self.type_expr(inner, owner, &format!("{}Value", hint), true)?)
            }
            TypeNode::Tuple(elements) => {
                let mut parts = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    parts.push(self.type_expr(element, owner, &format!("{}{}", hint, index), behind)?);
                }
                if parts.len() == 1 {
                    format!("({},)", parts[0])
                } else {
                    format!("({})", parts.join(", "))
                }
            }
            TypeNode::Struct(fields) => {
                let name = self.hoist(owner, hint)?;
                self.emit_struct(&name, None, fields, owner, behind)?;
                name
            }
            TypeNode::Union(variants) => {
                let name = self.hoist(owner, hint)?;
                self.emit_union(&name, None, variants, owner, behind)?;
                name
            }
        };
        Ok(expr)
    }

    fn hoist(&mut self, owner: DefId, hint: &str) -> Result<String, CompileError> {
        let qualifier = self.iface.definition(owner).owner.qualifier();
        self.names.claim_hoisted(hint, &qualifier)
    }

    fn emit_struct(
        &mut self,
        name: &str,
        description: Option<&str>,
        fields: &[Field],
        owner: DefId,
        behind: bool,
    ) -> Result<(), CompileError> {
        let mut seen: Vec<String> = Vec::with_capacity(fields.len());
        let mut body = String::new();
        for field in fields {
            let ident = escape_rust_keyword(&to_snake_case(&field.name));
            if ident == "_" || !is_identifier(&ident) {
                return Err(CompileError::conflict(
                    &format!("{}.{}", name, field.name),
                    format!("property {} has no usable field name", quote(&field.name)),
                ));
            }
            if seen.contains(&ident) {
                return Err(CompileError::conflict(
                    &format!("{}.{}", name, ident),
                    format!("two properties of {} map to the field name {}", name, quote(&ident)),
                ));
            }

            let hint = format!("{}{}", name, to_pascal_case(&field.name));
            let ty = self.type_expr(&field.ty, owner, &hint, behind)?;
            body.push_str(&doc_comment(field.description.as_deref(), "    "));
            if ident != field.name {
                body.push_str(&format!("    #[serde(rename = {})]\n", quote(&field.name)));
            }
            if !field.required && field.ty.is_optional() {
                body.push_str(&format!("    {}\n", SKIP_NONE));
            }
            body.push_str(&format!("    pub {}: {},\n", ident, ty));
            seen.push(ident);
        }

        let text = format!(
            "{}{}\npub struct {} {{\n{}}}\n",
            doc_comment(description, ""),
            DERIVES,
            name,
            body
        );
        self.push(name, DeclarationKind::Struct, text);
        Ok(())
    }

    fn emit_union(
        &mut self,
        name: &str,
        description: Option<&str>,
        variants: &[Variant],
        owner: DefId,
        behind: bool,
    ) -> Result<(), CompileError> {
        let mut idents: Vec<String> = Vec::with_capacity(variants.len());
        let mut constructor_names: Vec<String> = Vec::with_capacity(variants.len());
        let mut body = String::new();
        let mut constructors: Vec<String> = Vec::with_capacity(variants.len());

        for variant in variants {
            let ident = escape_rust_keyword(&to_pascal_case(&variant.tag));
            let constructor = variant_constructor(&variant.tag);
            if ident == "_" || !is_identifier(&ident) || constructor == "_" || !is_identifier(&constructor) {
                return Err(CompileError::conflict(
                    &format!("{}::{}", name, variant.tag),
                    format!("variant {} has no usable Rust name", quote(&variant.tag)),
                ));
            }
            if idents.contains(&ident) || constructor_names.contains(&constructor) {
                return Err(CompileError::conflict(
                    &format!("{}::{}", name, ident),
                    format!("variant {} collides with an earlier variant of {}", quote(&variant.tag), name),
                ));
            }

            body.push_str(&doc_comment(variant.description.as_deref(), "    "));
            if ident != variant.tag {
                body.push_str(&format!("    #[serde(rename = {})]\n", quote(&variant.tag)));
            }

            let key = (name.to_string(), variant.tag.clone());
            let doc = format!("    /// Builds [`{}::{}`].\n", name, ident);
            match &variant.payload {
                None => {
                    body.push_str(&format!("    {},\n", ident));
                    constructors.push(format!(
                        "{}    pub fn {}() -> Self {{\n        Self::{}\n    }}\n",
                        doc, constructor, ident
                    ));
                    self.payloads.insert(key, None);
                }
                Some(payload) => {
                    let (argument, stored, value) = match payload {
                        TypeNode::Reference(target) if !behind && self.graph.closes_cycle(owner, *target) => {
                            let target = self.names.definition(*target)?.to_string();
                            (target.clone(), format!("Box<{}>", target), "Box::new(payload)")
                        }
                        other => {
                            let hint = format!("{}{}", name, to_pascal_case(&variant.tag));
                            let ty = self.type_expr(other, owner, &hint, behind)?;
                            (ty.clone(), ty, "payload")
                        }
                    };
                    body.push_str(&format!("    {}({}),\n", ident, stored));
                    constructors.push(format!(
                        "{}    pub fn {}(payload: {}) -> Self {{\n        Self::{}({})\n    }}\n",
                        doc, constructor, argument, ident, value
                    ));
                    self.payloads.insert(key, Some(argument));
                }
            }
            idents.push(ident);
            constructor_names.push(constructor);
        }

        let all_unit = !variants.is_empty() && variants.iter().all(|v| v.payload.is_none());
        let mut text = format!(
            "{}{}\npub enum {} {{\n{}}}\n",
            doc_comment(description, ""),
            if all_unit { UNIT_ENUM_DERIVES } else { DERIVES },
            name,
            body
        );
        if !constructors.is_empty() {
            text.push_str(&format!("\nimpl {} {{\n{}}}\n", name, constructors.join("\n")));
        }
        self.push(name, DeclarationKind::Enum, text);
        Ok(())
    }
}
