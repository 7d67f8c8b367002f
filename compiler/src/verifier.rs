use indexmap::IndexMap;
use std::collections::HashSet;

use crate::{
    error::CompileError,
    types::{ContractInterface, DefId},
    utils::quote,
};

/// Names the generated module imports, relies on from the prelude, or uses
/// as client generics. A schema type with one of these names is qualified
/// like any other clash.
pub const RESERVED_NAMES: [&str; 16] = [
    "Box", "BTreeMap", "Deserialize", "DeserializeOwned", "Option", "Result", "Self",
    "Serialize", "String", "Transport", "TransportError", "Vec", "Some", "None",
    "T", "R",
];

/// Who owns a generated type name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Claim {
    Reserved,
    Definition(DefId),
    Hoisted,
    Client,
}

/// Assigns every generated declaration a unique Rust name.
#[derive(Debug)]
pub(crate) struct NameRegistry {
    taken:       IndexMap<String, Claim>,
    definitions: Vec<Option<String>>,
}

impl NameRegistry {
    pub(crate) fn new(definition_count: usize) -> Self {
        let taken = RESERVED_NAMES
            .iter()
            .map(|name| (name.to_string(), Claim::Reserved))
            .collect();
        NameRegistry { taken, definitions: vec![None; definition_count] }
    }

    /// Claims `preferred`, falling back to `qualifier + preferred`.
    fn claim(&mut self, preferred: &str, qualifier: &str, claim: Claim) -> Result<String, CompileError> {
        if !self.taken.contains_key(preferred) {
            self.taken.insert(preferred.to_string(), claim);
            return Ok(preferred.to_string());
        }
        let qualified = format!("{}{}", qualifier, preferred);
        if !self.taken.contains_key(&qualified) {
            self.taken.insert(qualified.clone(), claim);
            return Ok(qualified);
        }
        Err(CompileError::conflict(
            preferred,
            format!(
                "both {} and its qualified form {} are already in use",
                quote(preferred),
                quote(&qualified)
            ),
        ))
    }

    pub(crate) fn claim_definition(
        &mut self,
        id: DefId,
        preferred: &str,
        qualifier: &str,
    ) -> Result<String, CompileError> {
        let name = self.claim(preferred, qualifier, Claim::Definition(id))?;
        self.definitions[id.index()] = Some(name.clone());
        Ok(name)
    }

    pub(crate) fn claim_hoisted(&mut self, preferred: &str, qualifier: &str) -> Result<String, CompileError> {
        self.claim(preferred, qualifier, Claim::Hoisted)
    }

    /// The client name is never qualified.
    pub(crate) fn claim_client(&mut self, name: &str) -> Result<String, CompileError> {
        if let Some(owner) = self.taken.get(name) {
            let owner = match owner {
                Claim::Reserved        => "a reserved name".to_string(),
                Claim::Definition(id)  => format!("schema definition #{}", id.index()),
                Claim::Hoisted         => "an inline type".to_string(),
                Claim::Client          => "another client".to_string(),
            };
            return Err(CompileError::conflict(
                name,
                format!("the client name is already used by {}", owner),
            ));
        }
        self.taken.insert(name.to_string(), Claim::Client);
        Ok(name.to_string())
    }

    /// The name assigned to a reachable definition.
    pub(crate) fn definition(&self, id: DefId) -> Result<&str, CompileError> {
        self.definitions
            .get(id.index())
            .and_then(|name| name.as_deref())
            .ok_or_else(|| CompileError::conflict(&format!("#{}", id.index()), "definition was never named"))
    }
}

/// Definitions reachable from the message roots and declared responses, with
/// every definition placed after the definitions it refers to.
pub(crate) fn reachable_order(iface: &ContractInterface) -> Vec<DefId> {
    fn visit(iface: &ContractInterface, id: DefId, seen: &mut HashSet<DefId>, order: &mut Vec<DefId>) {
        if !seen.insert(id) {
            return;
        }
        let mut edges = Vec::new();
        iface.definition(id).node.references(&mut edges);
        for next in edges {
            visit(iface, next, seen, order);
        }
        order.push(id);
    }

    let mut seen = HashSet::new();
    let mut order = Vec::new();
    for (_, root) in iface.roots() {
        visit(iface, root, &mut seen, &mut order);
    }
    for (_, response) in iface.responses() {
        visit(iface, response, &mut seen, &mut order);
    }
    order
}

/// Definition-to-definition edges that hold the target by value.
#[derive(Debug)]
pub(crate) struct DirectGraph {
    edges: Vec<Vec<DefId>>,
}

impl DirectGraph {
    pub(crate) fn new(iface: &ContractInterface) -> Self {
        let edges = iface
            .definitions()
            .iter()
            .map(|(_, def)| {
                let mut out = Vec::new();
                def.node.direct_references(&mut out);
                out
            })
            .collect();
        DirectGraph { edges }
    }

    /// True if holding `target` by value inside `owner` would make `owner`
    /// infinitely sized, so the field must be boxed.
    pub(crate) fn closes_cycle(&self, owner: DefId, target: DefId) -> bool {
        let mut stack = vec![target];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == owner {
                return true;
            }
            if seen.insert(current) {
                stack.extend(self.edges[current.index()].iter().copied());
            }
        }
        false
    }
}
