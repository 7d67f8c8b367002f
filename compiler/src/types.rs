use cw_bindgen_schema::{DocumentRole, MessageKind};
use indexmap::IndexMap;

/// Index of a [`Definition`] in the [`DefinitionTable`] of one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub(crate) usize);

impl DefId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Integer { bits: u16, signed: bool },
    Float { bits: u16 },
    Boolean,
    Binary,
    Decimal,
    Unit,
}

/// Target-neutral type algebra produced by the mapper.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Primitive(Primitive),
    Struct(Vec<Field>),
    /// Variants in source order. The order is part of the output.
    Union(Vec<Variant>),
    Array(Box<TypeNode>),
    Tuple(Vec<TypeNode>),
    Map(Box<TypeNode>),
    Optional(Box<TypeNode>),
    Reference(DefId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name:        String,
    pub ty:          TypeNode,
    pub required:    bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub tag:         String,
    /// `None` for unit cases coming from string enums.
    pub payload:     Option<TypeNode>,
    pub description: Option<String>,
}

impl TypeNode {
    /// Wraps in `Optional` unless already optional.
    pub fn optional(inner: TypeNode) -> TypeNode {
        match inner {
            TypeNode::Optional(_) => inner,
            other                 => TypeNode::Optional(Box::new(other)),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeNode::Optional(_))
    }

    /// Every definition this node points at, in traversal order.
    pub fn references(&self, out: &mut Vec<DefId>) {
        self.walk_references(true, out);
    }

    /// Definitions held by value: not behind an `Array` or `Map`.
    pub fn direct_references(&self, out: &mut Vec<DefId>) {
        self.walk_references(false, out);
    }

    fn walk_references(&self, through_containers: bool, out: &mut Vec<DefId>) {
        match self {
            TypeNode::Primitive(_) => {}
            TypeNode::Reference(id) => out.push(*id),
            TypeNode::Struct(fields) => {
                for field in fields {
                    field.ty.walk_references(through_containers, out);
                }
            }
            TypeNode::Union(variants) => {
                for payload in variants.iter().filter_map(|v| v.payload.as_ref()) {
                    payload.walk_references(through_containers, out);
                }
            }
            TypeNode::Tuple(elements) => {
                for element in elements {
                    element.walk_references(through_containers, out);
                }
            }
            TypeNode::Optional(inner) => inner.walk_references(through_containers, out),
            TypeNode::Array(inner) | TypeNode::Map(inner) => {
                if through_containers {
                    inner.walk_references(through_containers, out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name:        String,
    /// The document that introduced this definition.
    pub owner:       DocumentRole,
    pub description: Option<String>,
    pub node:        TypeNode,
}

/// Arena of every named type of one contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionTable {
    definitions: Vec<Definition>,
    by_name:     IndexMap<String, DefId>,
}

impl DefinitionTable {
    pub(crate) fn from_definitions(definitions: Vec<Definition>) -> Self {
        let by_name = definitions
            .iter()
            .enumerate()
            .map(|(index, def)| (def.name.clone(), DefId(index)))
            .collect();
        DefinitionTable { definitions, by_name }
    }

    /// Panics if `id` was not issued for this table.
    pub fn get(&self, id: DefId) -> &Definition {
        &self.definitions[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<DefId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DefId, &Definition)> {
        self.definitions.iter().enumerate().map(|(index, def)| (DefId(index), def))
    }
}

/// The typed message surface of one contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractInterface {
    pub contract:           String,
    pub(crate) messages:    IndexMap<MessageKind, DefId>,
    pub(crate) responses:   IndexMap<String, DefId>,
    pub(crate) definitions: DefinitionTable,
}

impl ContractInterface {
    pub fn root(&self, kind: MessageKind) -> Option<DefId> {
        self.messages.get(&kind).copied()
    }

    pub fn roots(&self) -> impl Iterator<Item = (MessageKind, DefId)> + '_ {
        self.messages.iter().map(|(kind, id)| (*kind, *id))
    }

    pub fn response(&self, tag: &str) -> Option<DefId> {
        self.responses.get(tag).copied()
    }

    pub fn responses(&self) -> impl Iterator<Item = (&str, DefId)> {
        self.responses.iter().map(|(tag, id)| (tag.as_str(), *id))
    }

    pub fn definitions(&self) -> &DefinitionTable {
        &self.definitions
    }

    pub fn definition(&self, id: DefId) -> &Definition {
        self.definitions.get(id)
    }

    /// The union definition behind `id` and its variants, following aliases.
    pub fn union_of(&self, id: DefId) -> Option<(DefId, &[Variant])> {
        let mut current = id;
        for _ in 0..=self.definitions.len() {
            match &self.definitions.get(current).node {
                TypeNode::Union(variants) => return Some((current, variants)),
                TypeNode::Reference(next) => current = *next,
                _ => return None,
            }
        }
        None
    }
}
