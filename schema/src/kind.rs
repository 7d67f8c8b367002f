use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// One entry point of a contract's interface.
///
/// The declaration order is the order in which kinds are loaded, emitted and
/// reported everywhere else in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Instantiate,
    Execute,
    Query,
    Migrate,
    Sudo,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        MessageKind::Instantiate,
        MessageKind::Execute,
        MessageKind::Query,
        MessageKind::Migrate,
        MessageKind::Sudo,
    ];

    /// Key used by the combined IDL document (`"execute"`).
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Instantiate => "instantiate",
            MessageKind::Execute     => "execute",
            MessageKind::Query       => "query",
            MessageKind::Migrate     => "migrate",
            MessageKind::Sudo        => "sudo",
        }
    }

    /// File stem written by `cosmwasm-schema` (`"execute_msg"`).
    pub fn file_stem(self) -> &'static str {
        match self {
            MessageKind::Instantiate => "instantiate_msg",
            MessageKind::Execute     => "execute_msg",
            MessageKind::Query       => "query_msg",
            MessageKind::Migrate     => "migrate_msg",
            MessageKind::Sudo        => "sudo_msg",
        }
    }

    /// Root type name used when a document has no `title`.
    pub fn default_title(self) -> &'static str {
        match self {
            MessageKind::Instantiate => "InstantiateMsg",
            MessageKind::Execute     => "ExecuteMsg",
            MessageKind::Query       => "QueryMsg",
            MessageKind::Migrate     => "MigrateMsg",
            MessageKind::Sudo        => "SudoMsg",
        }
    }

    /// Prefix used to disambiguate colliding definition names.
    pub fn qualifier(self) -> &'static str {
        match self {
            MessageKind::Instantiate => "Instantiate",
            MessageKind::Execute     => "Execute",
            MessageKind::Query       => "Query",
            MessageKind::Migrate     => "Migrate",
            MessageKind::Sudo        => "Sudo",
        }
    }

    pub fn from_file_stem(stem: &str) -> Option<MessageKind> {
        MessageKind::ALL.into_iter().find(|kind| kind.file_stem() == stem)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.file_stem() == s)
            .ok_or_else(|| SchemaError::UnknownKind(s.to_string()))
    }
}
