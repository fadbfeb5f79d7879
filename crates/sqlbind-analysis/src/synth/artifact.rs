//! The generated artifact for one canonical shape.

use std::fmt;

use serde::Serialize;
use sqlbind_core::errors::BindError;
use sqlbind_core::ArtifactId;

use super::binder::ParameterBinder;
use super::hooks::{CommandState, HookKind};
use super::reader::ReaderPlan;
use crate::canonical::CanonicalOptions;
use crate::shapes::ResultKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedArtifact {
    pub id: ArtifactId,
    /// Entry point the redirected call sites invoke.
    pub method_name: String,
    pub binder: ParameterBinder,
    pub reader: Option<ReaderPlan>,
    pub hooks: Vec<HookKind>,
    pub options: CanonicalOptions,
}

impl GeneratedArtifact {
    pub fn reader(&self) -> Result<&ReaderPlan, BindError> {
        self.reader.as_ref().ok_or_else(|| BindError::NoReader {
            artifact: self.id.to_string(),
        })
    }

    /// A fresh command with every backend hook applied.
    pub fn prepare_command(&self) -> CommandState {
        let mut command = CommandState::default();
        for hook in &self.hooks {
            hook.apply(&mut command);
        }
        command
    }

    /// Stable text listing of the artifact. Same shape, same text.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GeneratedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.options;
        writeln!(f, "artifact {} ({})", self.id, self.method_name)?;
        writeln!(
            f,
            "  options: command_type={:?} cache_command={} strict_types={} batch_size={} row_limit={} row_capacity={}",
            o.command_type,
            o.cache_command,
            o.strict_types,
            o.batch_size,
            o.row_limit.map_or_else(|| "-".to_string(), |n| n.to_string()),
            o.row_capacity.map_or_else(|| "-".to_string(), |n| n.to_string()),
        )?;
        for hook in &self.hooks {
            writeln!(f, "  hook {hook}")?;
        }

        writeln!(f, "  parameters: {:?}", self.binder.category())?;
        for b in self.binder.bindings() {
            write!(f, "    {} <- .{} {} {}", b.name, b.source_member, b.db_type, b.direction.name())?;
            if let Some(size) = b.size {
                write!(f, " size={size}")?;
            }
            if let Some(converter) = &b.converter {
                write!(f, " via {converter}")?;
            }
            if b.participates_in_batch {
                f.write_str(" batch")?;
            }
            writeln!(f)?;
        }

        let Some(reader) = &self.reader else {
            return writeln!(f, "  reader: none");
        };
        match reader.kind() {
            ResultKind::NoRows => writeln!(f, "  reader: none")?,
            ResultKind::Scalar { kind, nullable } => writeln!(
                f,
                "  reader: scalar {}{}",
                kind.map_or("object", |k| k.name()),
                if *nullable { "?" } else { "" }
            )?,
            ResultKind::UntypedRow => writeln!(f, "  reader: untyped row")?,
            ResultKind::Tuple { arity } => writeln!(f, "  reader: tuple/{arity} {:?}", reader.matching())?,
            ResultKind::Constructed {
                type_name,
                strategy,
                factory,
                constructor,
                arity,
            } => {
                write!(f, "  reader: {type_name} via {}", strategy.name())?;
                if let Some(factory) = factory {
                    write!(f, " {factory}")?;
                }
                if let Some(index) = constructor {
                    write!(f, " ctor#{index}")?;
                }
                writeln!(f, "/{arity} {:?}", reader.matching())?;
            }
        }
        for c in reader.columns() {
            write!(f, "    {} -> {}", c.column_name, c.target)?;
            if let Some(converter) = &c.converter {
                write!(f, " via {converter}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
