//! Parameter binder: the add, update, batch, and read-back paths of one
//! parameter shape. Every path walks the bindings in the same fixed order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlbind_core::errors::BindError;

use super::value::Value;
use crate::canonical::CanonicalParameters;
use crate::shapes::{DbType, ParameterBinding, ParameterCategory, ParameterDirection};

/// A parameter as handed to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbParameter {
    pub name: String,
    pub db_type: DbType,
    pub direction: ParameterDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i32>,
    pub value: Value,
    /// Converter the host applies before sending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converter: Option<String>,
}

/// Member values of a parameter argument.
pub trait ValueSource {
    fn get(&self, member: &str) -> Option<Value>;
}

/// Receives output values after execution.
pub trait ValueTarget {
    fn set(&mut self, member: &str, value: Value);
}

impl ValueSource for BTreeMap<String, Value> {
    fn get(&self, member: &str) -> Option<Value> {
        BTreeMap::get(self, member).cloned()
    }
}

impl ValueTarget for BTreeMap<String, Value> {
    fn set(&mut self, member: &str, value: Value) {
        self.insert(member.to_string(), value);
    }
}

/// Parameter sets for one command execution group.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCommand {
    pub parameter_sets: Vec<Vec<DbParameter>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterBinder {
    category: ParameterCategory,
    bindings: Vec<ParameterBinding>,
    /// Elements per command group; 0 = one group.
    batch_size: u32,
}

impl ParameterBinder {
    pub fn new(parameters: &CanonicalParameters, batch_size: u32) -> Self {
        Self {
            category: parameters.category,
            bindings: parameters.bindings.clone(),
            batch_size,
        }
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    pub fn category(&self) -> ParameterCategory {
        self.category
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Build the parameter list of a fresh command.
    pub fn add(&self, source: &dyn ValueSource) -> Vec<DbParameter> {
        self.bindings
            .iter()
            .map(|b| DbParameter {
                name: b.name.clone(),
                db_type: b.db_type,
                direction: b.direction,
                size: b.size,
                value: outgoing_value(b, source),
                converter: b.converter.clone(),
            })
            .collect()
    }

    /// Rebind values into parameters created earlier by [`add`](Self::add).
    pub fn update(&self, existing: &mut [DbParameter], source: &dyn ValueSource) -> Result<(), BindError> {
        self.update_where(existing, source, |_| true)
    }

    /// One parameter set per element. The first set is added; later sets
    /// update a copy of the previous one, rebinding only batch members.
    pub fn add_batch<S: ValueSource>(&self, rows: &[S]) -> Result<Vec<BatchCommand>, BindError> {
        let group = match self.batch_size {
            0 => rows.len().max(1),
            n => n as usize,
        };
        let mut commands = Vec::new();
        for chunk in rows.chunks(group) {
            let mut sets: Vec<Vec<DbParameter>> = Vec::with_capacity(chunk.len());
            for row in chunk {
                let set = match sets.last() {
                    None => self.add(row),
                    Some(previous) => {
                        let mut set = previous.clone();
                        self.update_where(&mut set, row, |b| b.participates_in_batch)?;
                        set
                    }
                };
                sets.push(set);
            }
            commands.push(BatchCommand { parameter_sets: sets });
        }
        Ok(commands)
    }

    /// Copy output, in-out, and return values back into the argument.
    /// Returns how many members were written.
    pub fn read_back(&self, executed: &[DbParameter], target: &mut dyn ValueTarget) -> Result<usize, BindError> {
        self.check_layout(executed)?;
        let mut written = 0;
        for (binding, param) in self.bindings.iter().zip(executed) {
            if binding.direction.receives_value() {
                target.set(&binding.source_member, param.value.clone());
                written += 1;
            }
        }
        Ok(written)
    }

    fn update_where(
        &self,
        existing: &mut [DbParameter],
        source: &dyn ValueSource,
        rebind: impl Fn(&ParameterBinding) -> bool,
    ) -> Result<(), BindError> {
        self.check_layout(existing)?;
        for (binding, param) in self.bindings.iter().zip(existing.iter_mut()) {
            if binding.direction.sends_value() && rebind(binding) {
                param.value = outgoing_value(binding, source);
            }
        }
        Ok(())
    }

    fn check_layout(&self, params: &[DbParameter]) -> Result<(), BindError> {
        if params.len() != self.bindings.len() {
            return Err(BindError::ParameterCountMismatch {
                expected: self.bindings.len(),
                actual: params.len(),
            });
        }
        for (index, (binding, param)) in self.bindings.iter().zip(params).enumerate() {
            if binding.name != param.name {
                return Err(BindError::ParameterOrderMismatch {
                    index,
                    expected: binding.name.clone(),
                    actual: param.name.clone(),
                });
            }
        }
        Ok(())
    }
}

fn outgoing_value(binding: &ParameterBinding, source: &dyn ValueSource) -> Value {
    if binding.direction.sends_value() {
        source.get(&binding.source_member).unwrap_or(Value::Null)
    } else {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlbind_core::symbols::ScalarKind;

    fn binding(name: &str, direction: ParameterDirection, batch: bool) -> ParameterBinding {
        ParameterBinding {
            name: name.to_lowercase(),
            source_member: name.into(),
            db_type: DbType::Int32,
            direction,
            participates_in_batch: batch,
            value_kind: Some(ScalarKind::Int32),
            nullable: false,
            size: None,
            converter: None,
        }
    }

    fn row(pairs: &[(&str, i64)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), Value::Int(*v))).collect()
    }

    fn binder(bindings: Vec<ParameterBinding>, category: ParameterCategory, batch_size: u32) -> ParameterBinder {
        ParameterBinder::new(&CanonicalParameters { category, bindings }, batch_size)
    }

    #[test]
    fn test_add_and_update_share_order() {
        let b = binder(
            vec![
                binding("B", ParameterDirection::Input, false),
                binding("A", ParameterDirection::Input, false),
            ],
            ParameterCategory::Single,
            0,
        );
        let mut params = b.add(&row(&[("A", 1), ("B", 2)]));
        let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);

        b.update(&mut params, &row(&[("A", 10), ("B", 20)])).unwrap();
        assert_eq!(params[0].value, Value::Int(20));
        assert_eq!(params[1].value, Value::Int(10));
    }

    #[test]
    fn test_update_rejects_foreign_layout() {
        let b = binder(vec![binding("A", ParameterDirection::Input, false)], ParameterCategory::Single, 0);
        let mut wrong: Vec<DbParameter> = Vec::new();
        assert!(matches!(
            b.update(&mut wrong, &row(&[])),
            Err(BindError::ParameterCountMismatch { expected: 1, actual: 0 })
        ));
        let mut renamed = b.add(&row(&[("A", 1)]));
        renamed[0].name = "z".into();
        assert!(matches!(
            b.update(&mut renamed, &row(&[])),
            Err(BindError::ParameterOrderMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_batch_groups_and_replays() {
        let b = binder(
            vec![
                binding("A", ParameterDirection::Input, true),
                binding("Out", ParameterDirection::Output, false),
            ],
            ParameterCategory::Batch,
            2,
        );
        let rows = vec![row(&[("A", 1)]), row(&[("A", 2)]), row(&[("A", 3)])];
        let commands = b.add_batch(&rows).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].parameter_sets.len(), 2);
        assert_eq!(commands[0].parameter_sets[1][0].value, Value::Int(2));
        assert_eq!(commands[1].parameter_sets[0][0].value, Value::Int(3));
        assert_eq!(commands[0].parameter_sets[1][1].value, Value::Null);
    }

    #[test]
    fn test_read_back_writes_outputs_only() {
        let b = binder(
            vec![
                binding("A", ParameterDirection::Input, false),
                binding("Total", ParameterDirection::Output, false),
                binding("Rc", ParameterDirection::ReturnValue, false),
            ],
            ParameterCategory::Single,
            0,
        );
        let mut executed = b.add(&row(&[("A", 1)]));
        executed[1].value = Value::Int(99);
        executed[2].value = Value::Int(0);

        let mut target = row(&[("A", 1)]);
        assert_eq!(b.read_back(&executed, &mut target).unwrap(), 2);
        assert_eq!(target.get("Total"), Some(&Value::Int(99)));
        assert_eq!(target.get("A"), Some(&Value::Int(1)));
    }
}
