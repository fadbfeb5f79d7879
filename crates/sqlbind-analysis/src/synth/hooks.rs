//! Backend-specific command setup, applied once after the command object is
//! created.
//!
//! Hooks live in a table keyed by backend tag. The tag is resolved once per
//! artifact at synthesis time; the shape-agnostic binder and reader never
//! see backend details.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sqlbind_core::symbols::TypeRef;
use sqlbind_core::types::collections::FxHashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendTag {
    #[default]
    Generic,
    SqlServer,
    Postgres,
    Oracle,
    Sqlite,
    MySql,
}

impl BackendTag {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::SqlServer => "sqlserver",
            Self::Postgres => "postgres",
            Self::Oracle => "oracle",
            Self::Sqlite => "sqlite",
            Self::MySql => "mysql",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
            "generic" => Some(Self::Generic),
            "sqlserver" | "mssql" => Some(Self::SqlServer),
            "postgres" | "postgresql" | "npgsql" => Some(Self::Postgres),
            "oracle" => Some(Self::Oracle),
            "sqlite" => Some(Self::Sqlite),
            "mysql" | "mariadb" => Some(Self::MySql),
            _ => None,
        }
    }

    /// Infer the backend from the connection's concrete type name.
    pub fn from_connection_type(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        // MySqlConnection and SqliteConnection also end in "sqlconnection".
        if lower.contains("npgsql") {
            Self::Postgres
        } else if lower.contains("oracle") {
            Self::Oracle
        } else if lower.contains("sqlite") {
            Self::Sqlite
        } else if lower.contains("mysql") {
            Self::MySql
        } else if lower.contains("sqlclient") || lower.ends_with("sqlconnection") {
            Self::SqlServer
        } else {
            Self::Generic
        }
    }

    /// An explicit backend option wins over inference from the connection.
    pub fn resolve(option: Option<&str>, connection: Option<&TypeRef>) -> Self {
        if let Some(tag) = option.and_then(Self::parse_str) {
            return tag;
        }
        connection.map_or(Self::Generic, |ty| Self::from_connection_type(ty.as_str()))
    }
}

impl fmt::Display for BackendTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum HookKind {
    /// Bind parameters by name instead of by position.
    BindByName,
    InitialLongFetchSize { size: i32 },
    SetFlag { name: String, value: String },
}

impl HookKind {
    pub fn apply(&self, command: &mut CommandState) {
        match self {
            Self::BindByName => {
                command.flags.insert("BindByName".to_string(), "true".to_string());
            }
            Self::InitialLongFetchSize { size } => {
                command.flags.insert("InitialLONGFetchSize".to_string(), size.to_string());
            }
            Self::SetFlag { name, value } => {
                command.flags.insert(name.clone(), value.clone());
            }
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindByName => f.write_str("bind_by_name"),
            Self::InitialLongFetchSize { size } => write!(f, "initial_long_fetch_size={size}"),
            Self::SetFlag { name, value } => write!(f, "{name}={value}"),
        }
    }
}

/// Stand-in for the backend's native command object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandState {
    pub flags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    table: FxHashMap<BackendTag, Vec<HookKind>>,
}

impl HookRegistry {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in hooks.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register(BackendTag::Oracle, HookKind::BindByName)
            .register(BackendTag::Oracle, HookKind::InitialLongFetchSize { size: -1 });
        registry
    }

    pub fn register(&mut self, backend: BackendTag, hook: HookKind) -> &mut Self {
        let hooks = self.table.entry(backend).or_default();
        if !hooks.contains(&hook) {
            hooks.push(hook);
        }
        self
    }

    pub fn hooks_for(&self, backend: BackendTag) -> Vec<HookKind> {
        self.table.get(&backend).cloned().unwrap_or_default()
    }
}
