#![cfg(test)]

use cw_bindgen_compiler::{
    compile, load_interface, CompileError, DeclarationKind, GeneratedModule, TypeNode,
};
use cw_bindgen_schema::{MessageKind, SchemaSources};
use serde_json::{json, Value};
use std::fs;

fn instantiate() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "InstantiateMsg",
        "type": "object",
        "required": ["owner"],
        "properties": { "owner": { "type": "string" } },
        "additionalProperties": false
    })
}

fn amount_payload() -> Value {
    json!({
        "type": "object",
        "required": ["amount"],
        "properties": {
            "amount": { "type": "integer", "format": "uint64", "minimum": 0.0 }
        },
        "additionalProperties": false
    })
}

fn vault_execute() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "ExecuteMsg",
        "oneOf": [
            {
                "type": "object",
                "required": ["deposit"],
                "properties": { "deposit": amount_payload() },
                "additionalProperties": false
            },
            {
                "type": "object",
                "required": ["withdraw"],
                "properties": { "withdraw": amount_payload() },
                "additionalProperties": false
            }
        ]
    })
}

fn with_execute(execute: Value) -> SchemaSources {
    SchemaSources::new()
        .with_message(MessageKind::Instantiate, instantiate())
        .with_message(MessageKind::Execute, execute)
}

fn text<'a>(module: &'a GeneratedModule, name: &str) -> &'a str {
    &module
        .declaration(name)
        .unwrap_or_else(|| panic!("missing declaration {}", name))
        .text
}

#[test]
fn test_deposit_withdraw_end_to_end() {
    let sources = with_execute(vault_execute());

    let iface = load_interface("vault", &sources).expect("load_interface failed");
    let root = iface.root(MessageKind::Execute).expect("no execute root");
    let (_, variants) = iface.union_of(root).expect("execute root is not a union");
    let tags: Vec<&str> = variants.iter().map(|v| v.tag.as_str()).collect();
    assert_eq!(tags, vec!["deposit", "withdraw"]);
    for variant in variants {
        let Some(TypeNode::Struct(fields)) = &variant.payload else {
            panic!("{} carries no struct", variant.tag)
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "amount");
        assert!(fields[0].required);
        assert!(matches!(fields[0].ty, TypeNode::Primitive(_)));
    }

    let module = compile("vault", &sources).expect("compile failed");
    assert_eq!(module.client_methods, vec!["deposit", "withdraw"]);
    assert_eq!(
        module.type_names,
        vec!["InstantiateMsg", "ExecuteMsgDeposit", "ExecuteMsgWithdraw", "ExecuteMsg"]
    );

    let execute = text(&module, "ExecuteMsg");
    assert!(execute.contains("    Deposit(ExecuteMsgDeposit),\n"));
    assert!(execute.contains("    Withdraw(ExecuteMsgWithdraw),\n"));
    assert!(text(&module, "ExecuteMsgDeposit").contains("    pub amount: u64,\n"));

    let client = module.declaration("VaultClient").expect("no client");
    assert_eq!(client.kind, DeclarationKind::Client);
    assert!(client.text.contains("pub fn deposit(&self, payload: ExecuteMsgDeposit)"));
    assert!(client.text.contains("pub fn withdraw(&self, payload: ExecuteMsgWithdraw)"));
}

#[test]
fn test_compile_is_idempotent() {
    let sources = with_execute(vault_execute())
        .with_message(
            MessageKind::Query,
            json!({ "title": "QueryMsg", "type": "string", "enum": ["config", "balance"] }),
        )
        .with_response("config", json!({ "title": "Config", "type": "object", "properties": {} }));

    let first = compile("vault", &sources).expect("compile failed").render();
    let second = compile("vault", &sources).expect("compile failed").render();
    assert_eq!(first, second);
}

#[test]
fn test_references_share_one_definition() {
    let sources = with_execute(json!({
        "title": "ExecuteMsg",
        "type": "object",
        "required": ["bid", "ask"],
        "properties": {
            "bid": { "$ref": "#/definitions/Uint128" },
            "ask": { "$ref": "#/definitions/Uint128" }
        },
        "definitions": { "Uint128": { "type": "string" } }
    }));

    let iface = load_interface("market", &sources).expect("load_interface failed");
    let root = iface.root(MessageKind::Execute).unwrap();
    let TypeNode::Struct(fields) = &iface.definition(root).node else { panic!("expected a struct") };
    let (TypeNode::Reference(bid), TypeNode::Reference(ask)) = (&fields[0].ty, &fields[1].ty) else {
        panic!("expected references")
    };
    assert_eq!(bid, ask);
    assert!(std::ptr::eq(iface.definition(*bid), iface.definition(*ask)));

    let module = compile("market", &sources).expect("compile failed");
    let aliases = module
        .declarations
        .iter()
        .filter(|decl| decl.name == "Uint128")
        .count();
    assert_eq!(aliases, 1);
}

#[test]
fn test_shared_definitions_are_interned_once() {
    let sources = with_execute(json!({
        "title": "ExecuteMsg",
        "type": "object",
        "required": ["to"],
        "properties": { "to": { "$ref": "#/definitions/Addr" } }
    }))
    .with_message(
        MessageKind::Query,
        json!({
            "title": "QueryMsg",
            "oneOf": [{
                "type": "object",
                "required": ["balance"],
                "properties": {
                    "balance": {
                        "type": "object",
                        "required": ["address"],
                        "properties": { "address": { "$ref": "#/definitions/Addr" } }
                    }
                }
            }]
        }),
    )
    .with_shared(json!({ "definitions": { "Addr": { "type": "string" } } }));

    let module = compile("bank", &sources).expect("compile failed");
    assert_eq!(module.type_names.iter().filter(|name| *name == "Addr").count(), 1);
    assert!(text(&module, "QueryMsgBalance").contains("    pub address: Addr,\n"));
    assert!(text(&module, "ExecuteMsg").contains("    pub to: Addr,\n"));
}

fn wrapped(title: &str, inner: Value) -> Value {
    json!({
        "title": title,
        "type": "object",
        "required": ["w"],
        "properties": { "w": { "$ref": "#/definitions/Wrapper" } },
        "definitions": {
            "Wrapper": { "$ref": "#/definitions/Inner" },
            "Inner": inner
        }
    })
}

#[test]
fn test_same_name_with_different_targets_is_qualified() {
    let text_inner = json!({ "type": "object", "required": ["a"], "properties": { "a": { "type": "string" } } });
    let flag_inner = json!({ "type": "object", "required": ["b"], "properties": { "b": { "type": "boolean" } } });

    let sources = with_execute(wrapped("ExecuteMsg", text_inner.clone()))
        .with_message(MessageKind::Query, wrapped("QueryMsg", flag_inner));
    let module = compile("wrapped", &sources).expect("compile failed");
    assert_eq!(
        module.type_names,
        vec!["InstantiateMsg", "Inner", "Wrapper", "ExecuteMsg", "QueryInner", "QueryWrapper", "QueryMsg"]
    );
    assert!(text(&module, "Wrapper").contains("pub type Wrapper = Inner;"));
    assert!(text(&module, "QueryWrapper").contains("pub type QueryWrapper = QueryInner;"));
    assert!(text(&module, "QueryInner").contains("    pub b: bool,\n"));
    assert!(text(&module, "QueryMsg").contains("    pub w: QueryWrapper,\n"));

    // identical targets still share one definition
    let sources = with_execute(wrapped("ExecuteMsg", text_inner.clone()))
        .with_message(MessageKind::Query, wrapped("QueryMsg", text_inner));
    let module = compile("wrapped", &sources).expect("compile failed");
    assert_eq!(module.type_names, vec!["InstantiateMsg", "Inner", "Wrapper", "ExecuteMsg", "QueryMsg"]);
    assert!(text(&module, "QueryMsg").contains("    pub w: Wrapper,\n"));
}

#[test]
fn test_union_order_is_preserved() {
    let sources = with_execute(json!({
        "title": "ExecuteMsg",
        "oneOf": [
            { "type": "object", "required": ["zeta"], "properties": { "zeta": { "type": "object", "properties": {} } } },
            { "type": "object", "required": ["alpha"], "properties": { "alpha": { "type": "object", "properties": {} } } },
            { "type": "string", "enum": ["mid"] }
        ]
    }));

    let module = compile("ordered", &sources).expect("compile failed");
    assert_eq!(module.client_methods, vec!["zeta", "alpha", "mid"]);

    let execute = text(&module, "ExecuteMsg");
    let zeta = execute.find("Zeta(").unwrap();
    let alpha = execute.find("Alpha(").unwrap();
    let mid = execute.find("    Mid,").unwrap();
    assert!(zeta < alpha && alpha < mid);
}

#[test]
fn test_optional_and_required_fields() {
    let sources = with_execute(json!({
        "title": "ExecuteMsg",
        "type": "object",
        "required": ["round", "winner"],
        "properties": {
            "round": { "type": "integer", "format": "uint32" },
            "winner": { "type": ["string", "null"] },
            "limit": { "type": "integer", "format": "uint32" }
        }
    }));

    let module = compile("rounds", &sources).expect("compile failed");
    let execute = text(&module, "ExecuteMsg");
    assert!(execute.contains("    pub round: u32,\n"));
    // required but nullable: present on the wire, may be null
    assert!(execute.contains("    pub winner: Option<String>,\n"));
    assert!(!execute.contains("skip_serializing_if = \"Option::is_none\")]\n    pub winner"));
    assert!(execute.contains(
        "    #[serde(default, skip_serializing_if = \"Option::is_none\")]\n    pub limit: Option<u32>,\n"
    ));
}

#[test]
fn test_mutual_recursion_is_boxed() {
    let sources = with_execute(json!({
        "title": "ExecuteMsg",
        "type": "object",
        "required": ["x"],
        "properties": { "x": { "$ref": "#/definitions/X" } },
        "definitions": {
            "X": {
                "type": "object",
                "properties": { "y": { "$ref": "#/definitions/Y" } }
            },
            "Y": {
                "type": "object",
                "required": ["xs"],
                "properties": {
                    "x": { "$ref": "#/definitions/X" },
                    "xs": { "type": "array", "items": { "$ref": "#/definitions/X" } }
                }
            }
        }
    }));

    let module = compile("cyclic", &sources).expect("compile failed");
    assert_eq!(module.type_names, vec!["InstantiateMsg", "Y", "X", "ExecuteMsg"]);
    assert!(text(&module, "X").contains("    pub y: Option<Box<Y>>,\n"));
    assert!(text(&module, "Y").contains("    pub x: Option<Box<X>>,\n"));
    assert!(text(&module, "Y").contains("    pub xs: Vec<X>,\n"));
    assert!(text(&module, "ExecuteMsg").contains("    pub x: X,\n"));
}

#[test]
fn test_dangling_reference_is_named() {
    let sources = with_execute(json!({
        "title": "ExecuteMsg",
        "type": "object",
        "properties": { "thing": { "$ref": "#/definitions/Missing" } }
    }));

    let err = compile("broken", &sources).unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnresolvedReference { ref reference, .. } if reference == "Missing"
    ));
    assert!(err.to_string().contains("Missing"));
}

#[test]
fn test_unknown_keyword_is_named() {
    let sources = with_execute(json!({
        "title": "ExecuteMsg",
        "type": "object",
        "properties": { "note": { "type": "string", "xAnnotation": "custom" } }
    }));

    let err = compile("annotated", &sources).unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnsupportedSchemaConstruct { ref construct, ref path, .. }
            if construct == "xAnnotation" && path == "/properties/note"
    ));
}

#[test]
fn test_colliding_variants_conflict() {
    let sources = with_execute(json!({
        "title": "ExecuteMsg",
        "type": "string",
        "enum": ["fooBar", "foo_bar"]
    }));

    let err = compile("clash", &sources).unwrap_err();
    assert!(matches!(err, CompileError::EmissionConflict { ref name, .. } if name == "ExecuteMsg::FooBar"));
}

#[test]
fn test_compile_from_schema_directory() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let write = |name: &str, value: Value| {
        fs::write(dir.path().join(name), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    };
    write("instantiate_msg.json", instantiate());
    write("execute_msg.json", vault_execute());
    write(
        "query_msg.json",
        json!({
            "title": "QueryMsg",
            "oneOf": [
                { "type": "string", "enum": ["config"] },
                {
                    "type": "object",
                    "required": ["balance"],
                    "properties": {
                        "balance": {
                            "type": "object",
                            "required": ["address"],
                            "properties": { "address": { "type": "string" } }
                        }
                    }
                }
            ]
        }),
    );
    write(
        "config_response.json",
        json!({
            "title": "ConfigResponse",
            "type": "object",
            "required": ["owner"],
            "properties": { "owner": { "type": "string" } }
        }),
    );

    let sources = SchemaSources::from_dir(dir.path()).expect("from_dir failed");
    let module = compile("vault", &sources).expect("compile failed");
    assert_eq!(module.client_methods, vec!["deposit", "withdraw", "config", "balance"]);

    let client = text(&module, "VaultClient");
    assert!(client.contains("pub fn config(&self) -> Result<ConfigResponse, TransportError>"));
    assert!(client.contains(
        "pub fn balance<R: serde::de::DeserializeOwned>(&self, payload: QueryMsgBalance) -> Result<R, TransportError>"
    ));
}

#[test]
fn test_missing_instantiate_is_malformed() {
    let sources = SchemaSources::new().with_message(MessageKind::Execute, vault_execute());
    let err = compile("vault", &sources).unwrap_err();
    assert!(matches!(err, CompileError::MalformedSchema { .. }));
}
