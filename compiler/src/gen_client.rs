use cw_bindgen_schema::MessageKind;
use tracing::debug;

use crate::{
    compiler::{Declaration, DeclarationKind},
    error::CompileError,
    gen_rust::{variant_constructor, EmittedTypes},
    types::ContractInterface,
    utils::{doc_comment, quote, to_pascal_case},
};

/// Methods every generated client already has.
const CLIENT_METHODS: [&str; 3] = ["new", "contract_address", "transport"];

/// One generated method, before rendering.
struct Method {
    name:     String,
    tag:      String,
    doc:      Option<String>,
    enum_:    String,
    argument: Option<String>,
    returns:  Returns,
}

enum Returns {
    TxHandle,
    Response(String),
    Generic,
}

/// Builds the typed client for the execute and query roots.
///
/// Returns the client declaration and its method names, in order.
pub(crate) fn generate_client(
    iface: &ContractInterface,
    types: &mut EmittedTypes,
) -> Result<(Declaration, Vec<String>), CompileError> {
    let client = types
        .names
        .claim_client(&format!("{}Client", to_pascal_case(&iface.contract)))?;
    let mut methods: Vec<Method> = Vec::new();

    for kind in [MessageKind::Execute, MessageKind::Query] {
        let Some(root) = iface.root(kind) else { continue };
        let Some((union, variants)) = iface.union_of(root) else {
            debug!(contract = %iface.contract, kind = %kind, "message root is not a union, no client methods");
            continue;
        };
        let enum_ = types.names.definition(union)?.to_string();

        for variant in variants {
            let mut name = variant_constructor(&variant.tag);
            let taken = |name: &str, methods: &[Method]| {
                CLIENT_METHODS.contains(&name) || methods.iter().any(|m| m.name == name)
            };
            if taken(name.as_str(), methods.as_slice()) {
                name = format!("{}_{}", kind.as_str(), name);
                if taken(name.as_str(), methods.as_slice()) {
                    return Err(CompileError::conflict(
                        &format!("{}::{}", client, name),
                        format!("client method for {} {} collides with another method", kind, quote(&variant.tag)),
                    ));
                }
            }

            let argument = types
                .payloads
                .get(&(enum_.clone(), variant.tag.clone()))
                .cloned()
                .flatten();
            let returns = match kind {
                MessageKind::Query => match iface.response(&variant.tag) {
                    Some(response) => Returns::Response(types.names.definition(response)?.to_string()),
                    None => Returns::Generic,
                },
                _ => Returns::TxHandle,
            };
            methods.push(Method {
                name,
                tag: variant.tag.clone(),
                doc: variant.description.clone(),
                enum_: enum_.clone(),
                argument,
                returns,
            });
        }
    }

    let text = render_client(&iface.contract, &client, &methods);
    let names = methods.into_iter().map(|m| m.name).collect();
    Ok((
        Declaration { name: client, kind: DeclarationKind::Client, text },
        names,
    ))
}

fn render_client(contract: &str, client: &str, methods: &[Method]) -> String {
    let mut out = String::new();
    out.push_str(&format!("/// Typed client for the `{}` contract.\n", contract));
    out.push_str("///\n");
    out.push_str("/// Messages are encoded as JSON and handed to the [`Transport`], which owns\n");
    out.push_str("/// signing, broadcasting and querying.\n");
    out.push_str(&format!("pub struct {}<T: Transport> {{\n", client));
    out.push_str("    transport:        T,\n");
    out.push_str("    contract_address: String,\n");
    out.push_str("}\n\n");

    out.push_str(&format!("impl<T: Transport> {}<T> {{\n", client));
    out.push_str("    pub fn new(transport: T, contract_address: impl Into<String>) -> Self {\n");
    out.push_str("        Self {\n");
    out.push_str("            transport,\n");
    out.push_str("            contract_address: contract_address.into(),\n");
    out.push_str("        }\n");
    out.push_str("    }\n\n");
    out.push_str("    pub fn contract_address(&self) -> &str {\n");
    out.push_str("        &self.contract_address\n");
    out.push_str("    }\n\n");
    out.push_str("    pub fn transport(&self) -> &T {\n");
    out.push_str("        &self.transport\n");
    out.push_str("    }\n");

    for method in methods {
        out.push('\n');
        out.push_str(&render_method(method));
    }
    out.push_str("}\n");
    out
}

fn render_method(method: &Method) -> String {
    let doc = match &method.doc {
        Some(description) => doc_comment(Some(description), "    "),
        None => match method.returns {
            Returns::TxHandle => format!("    /// Executes `{}`.\n", method.tag),
            _ => format!("    /// Queries `{}`.\n", method.tag),
        },
    };
    let (parameter, argument) = match &method.argument {
        Some(ty) => (format!(", payload: {}", ty), "payload"),
        None     => (String::new(), ""),
    };
    let message = format!(
        "        let msg = {}::{}({});\n",
        method.enum_,
        variant_constructor(&method.tag),
        argument
    );

    match &method.returns {
        Returns::TxHandle => format!(
            "{doc}    pub fn {name}(&self{parameter}) -> Result<T::TxHandle, TransportError> {{\n\
             {message}        self.transport.execute(&self.contract_address, &cw_bindgen::encode_msg(&msg)?)\n    }}\n",
            doc = doc,
            name = method.name,
            parameter = parameter,
            message = message,
        ),
        Returns::Response(response) => format!(
            "{doc}    pub fn {name}(&self{parameter}) -> Result<{response}, TransportError> {{\n\
             {message}        let response = self.transport.query(&self.contract_address, &cw_bindgen::encode_msg(&msg)?)?;\n        \
             cw_bindgen::decode_response(&response)\n    }}\n",
            doc = doc,
            name = method.name,
            parameter = parameter,
            response = response,
            message = message,
        ),
        Returns::Generic => format!(
            "{doc}    pub fn {name}<R: serde::de::DeserializeOwned>(&self{parameter}) -> Result<R, TransportError> {{\n\
             {message}        let response = self.transport.query(&self.contract_address, &cw_bindgen::encode_msg(&msg)?)?;\n        \
             cw_bindgen::decode_response(&response)\n    }}\n",
            doc = doc,
            name = method.name,
            parameter = parameter,
            message = message,
        ),
    }
}
