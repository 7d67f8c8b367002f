use cw_bindgen_schema::{DocumentRole, MessageKind, SchemaSources};
use indexmap::IndexMap;
use tracing::debug;

use crate::{error::CompileError, mapper::Mapper, types::ContractInterface};

/// Parses every document of one contract and lowers it into a [`ContractInterface`].
///
/// `contract_id` names the contract in generated code and diagnostics. It is
/// independent of where the schemas were read from.
pub fn load_interface(
    contract_id: &str,
    sources: &SchemaSources,
) -> Result<ContractInterface, CompileError> {
    if contract_id.trim().is_empty() {
        return Err(CompileError::malformed("<contract>", "contract identity must not be empty"));
    }

    let documents = sources.documents()?;
    let has_instantiate = documents
        .iter()
        .any(|doc| doc.role == DocumentRole::Message(MessageKind::Instantiate));
    if !has_instantiate {
        return Err(CompileError::malformed(
            contract_id,
            "no instantiate message schema was provided",
        ));
    }

    let mut mapper = Mapper::new(&documents);
    let mut messages = IndexMap::new();
    let mut responses = IndexMap::new();
    for (index, document) in documents.iter().enumerate() {
        match &document.role {
            DocumentRole::Message(kind) => {
                messages.insert(*kind, mapper.intern_root(index)?);
            }
            DocumentRole::Response(tag) => {
                responses.insert(tag.clone(), mapper.intern_root(index)?);
            }
            // Shared definitions are only reachable through references.
            DocumentRole::Shared => {}
        }
    }
    let definitions = mapper.finish()?;
    messages.sort_keys();

    debug!(
        contract = %contract_id,
        messages = messages.len(),
        responses = responses.len(),
        definitions = definitions.len(),
        "loaded contract interface"
    );

    Ok(ContractInterface {
        contract: contract_id.to_string(),
        messages,
        responses,
        definitions,
    })
}
