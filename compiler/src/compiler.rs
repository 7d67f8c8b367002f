use cw_bindgen_schema::SchemaSources;
use serde::Serialize;
use tracing::debug;

use crate::{
    error::CompileError,
    gen_client::generate_client,
    gen_rust::emit_types,
    loader::load_interface,
    types::ContractInterface,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Struct,
    Enum,
    Alias,
    Client,
}

/// One top-level item of the generated file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    #[serde(skip_serializing)]
    pub text: String,
}

/// The generated Rust module of one contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedModule {
    pub contract:       String,
    pub client:         String,
    /// Types first, dependencies before dependents, then the client.
    pub declarations:   Vec<Declaration>,
    pub type_names:     Vec<String>,
    pub client_methods: Vec<String>,
}

impl GeneratedModule {
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|decl| decl.name == name)
    }

    /// The complete text of the generated file.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "// @generated by cw-bindgen from the `{}` contract schema. Do not edit by hand.\n\n",
            self.contract
        ));
        out.push_str("#[allow(unused_imports)]\nuse cw_bindgen::{Transport, TransportError};\n");
        out.push_str("#[allow(unused_imports)]\nuse serde::{Deserialize, Serialize};\n");
        out.push_str("#[allow(unused_imports)]\nuse std::collections::BTreeMap;\n");
        for decl in &self.declarations {
            out.push('\n');
            out.push_str(&decl.text);
        }
        out
    }
}

/// Generates the type declarations and client for an already loaded interface.
pub fn emit_module(iface: &ContractInterface) -> Result<GeneratedModule, CompileError> {
    let mut types = emit_types(iface)?;
    let (client, client_methods) = generate_client(iface, &mut types)?;

    let mut declarations = types.declarations;
    let type_names = declarations.iter().map(|decl| decl.name.clone()).collect();
    let client_name = client.name.clone();
    declarations.push(client);

    Ok(GeneratedModule {
        contract: iface.contract.clone(),
        client: client_name,
        declarations,
        type_names,
        client_methods,
    })
}

/// Compiles the schemas of one contract into a [`GeneratedModule`].
/// Returns the first error; nothing partial is produced.
pub fn compile(contract_id: &str, sources: &SchemaSources) -> Result<GeneratedModule, CompileError> {
    let iface = load_interface(contract_id, sources)?;
    let module = emit_module(&iface)?;
    debug!(
        contract = %contract_id,
        types = module.type_names.len(),
        methods = module.client_methods.len(),
        "compiled contract"
    );
    Ok(module)
}
