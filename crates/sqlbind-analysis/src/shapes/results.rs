//! Result shape modeling: how each row becomes an instance of the requested
//! result type.
//!
//! Strategy selection, first match wins:
//!
//! 1. an opted-in factory method whose parameters match members
//! 2. the single opted-in constructor
//! 3. the single non-default constructor, when no constructor is opted out
//! 4. a parameterless constructor plus settable members
//! 5. a primary (positional) constructor
//!
//! More than one opt-in, or several equally eligible constructors with no
//! parameterless fallback, is ambiguous.

use rustc_hash::FxHashMap;
use sqlbind_core::callsite::{CallSite, EffectiveOptions, OperationKind, TupleBinding};
use sqlbind_core::symbols::{
    ConstructorInfo, FactoryInfo, MarkerKind, MemberInfo, ParamInfo, SymbolOracle, SymbolRef, TypeInfo,
    TypeKind, TypeRef,
};

use super::members::MemberOptions;
use super::scalars::{resolve_type, scalar_of};
use super::types::{BindTarget, ColumnBinding, ColumnMatch, ConstructionStrategy, ResultKind, ResultShape};
use crate::diagnostics::{DiagnosticBag, DiagnosticCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultOutcome {
    Shape(ResultShape),
    Rejected,
}

/// How the instance gets created, before columns are laid out.
#[derive(Debug, Clone, Copy)]
enum Construction<'t> {
    Factory(&'t FactoryInfo),
    Constructor(usize, &'t ConstructorInfo, ConstructionStrategy),
    Setters,
}

pub struct ResultShapeModeler<'a> {
    oracle: &'a dyn SymbolOracle,
}

impl<'a> ResultShapeModeler<'a> {
    pub fn new(oracle: &'a dyn SymbolOracle) -> Self {
        Self { oracle }
    }

    pub fn model(&self, site: &CallSite, options: &EffectiveOptions, bag: &mut DiagnosticBag) -> ResultOutcome {
        if !site.operation.reads_typed_rows() {
            return ResultOutcome::Shape(ResultShape::none());
        }
        let is_scalar_op = site.operation == OperationKind::Scalar;

        let Some(ty) = site.result_type() else {
            return ResultOutcome::Shape(if is_scalar_op {
                ResultShape::scalar(None, true)
            } else {
                ResultShape::untyped_row()
            });
        };
        let Some(info) = resolve_type(self.oracle, ty) else {
            bag.report(
                DiagnosticCode::UnresolvedResultType,
                format!("result type `{ty}` could not be resolved"),
            );
            return ResultOutcome::Rejected;
        };

        match &info.kind {
            TypeKind::Scalar { scalar, nullable } => {
                ResultOutcome::Shape(ResultShape::scalar(Some(*scalar), *nullable))
            }
            TypeKind::Enum { underlying } => ResultOutcome::Shape(ResultShape::scalar(Some(*underlying), false)),
            TypeKind::UntypedRow if !is_scalar_op => ResultOutcome::Shape(ResultShape::untyped_row()),
            TypeKind::UntypedRow => ResultOutcome::Shape(ResultShape::scalar(None, true)),
            TypeKind::GenericParameter { name } => {
                bag.report(
                    DiagnosticCode::UnresolvedResultType,
                    format!("result type is the generic parameter `{name}`"),
                );
                ResultOutcome::Rejected
            }
            _ if is_scalar_op => {
                bag.report(
                    DiagnosticCode::ScalarResultNotScalar,
                    format!("scalar operation cannot produce `{ty}`"),
                );
                ResultOutcome::Rejected
            }
            TypeKind::Tuple { elements } => {
                let Some(binding) = options.tuple_binding else {
                    bag.report(
                        DiagnosticCode::TupleWithoutOptIn,
                        format!("tuple result `{ty}` requires an explicit by-name or by-position binding mode"),
                    );
                    return ResultOutcome::Rejected;
                };
                let mut columns = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    let Some((kind, nullable)) = scalar_of(self.oracle, &element.ty) else {
                        bag.report(
                            DiagnosticCode::UnsupportedResultType,
                            format!("tuple element {} of `{ty}` has non-scalar type `{}`", index + 1, element.ty),
                        );
                        return ResultOutcome::Rejected;
                    };
                    columns.push(ColumnBinding {
                        column_name: element.name.clone().unwrap_or_else(|| format!("Item{}", index + 1)),
                        target: BindTarget::ConstructorArg { index },
                        value_kind: Some(kind),
                        nullable,
                        strict: options.strict_types,
                        converter: None,
                    });
                }
                ResultOutcome::Shape(ResultShape {
                    kind: ResultKind::Tuple { arity: elements.len() },
                    matching: matching_for(options, Some(binding)),
                    columns,
                })
            }
            TypeKind::Object => self.model_object(&info, options, bag),
            TypeKind::Sequence { .. } | TypeKind::DynamicBag => {
                bag.report(
                    DiagnosticCode::UnsupportedResultType,
                    format!("`{ty}` cannot be materialized from a row"),
                );
                ResultOutcome::Rejected
            }
        }
    }

    fn model_object(&self, info: &TypeInfo, options: &EffectiveOptions, bag: &mut DiagnosticBag) -> ResultOutcome {
        let accessibility = info.effective_accessibility();
        if !accessibility.is_reachable_from_generated() {
            bag.report(
                DiagnosticCode::InaccessibleResultType,
                format!("result type `{}` is {accessibility:?} and cannot be constructed by generated code", info.name),
            );
            return ResultOutcome::Rejected;
        }
        if info.is_abstract {
            bag.report(
                DiagnosticCode::NoConstructionStrategy,
                format!("result type `{}` is abstract", info.name),
            );
            return ResultOutcome::Rejected;
        }

        let members = self.oracle.members_of(&info.name);
        let Some(construction) = self.choose_construction(info, &members, bag) else {
            return ResultOutcome::Rejected;
        };

        let mut failed = false;
        let mut columns = Vec::new();
        let mut covered: Vec<String> = Vec::new();

        let (strategy, factory, constructor, arguments): (_, _, _, &[ParamInfo]) = match construction {
            Construction::Factory(f) => (
                ConstructionStrategy::FactoryMethod,
                Some(f.name.clone()),
                None,
                f.parameters.as_slice(),
            ),
            Construction::Constructor(index, ctor, strategy) => (strategy, None, Some(index), ctor.parameters.as_slice()),
            Construction::Setters => (ConstructionStrategy::DefaultConstructorWithSetters, None, None, &[] as &[ParamInfo]),
        };

        for (index, param) in arguments.iter().enumerate() {
            let member = members.iter().find(|m| m.name.eq_ignore_ascii_case(&param.name));
            let member_name = member.map_or(param.name.as_str(), |m| m.name.as_str());
            let (member_opts, invalid) = MemberOptions::lookup(self.oracle, &info.name, member_name);
            for message in invalid {
                bag.report(DiagnosticCode::InvalidMarker, message);
            }
            let converter = converter_for(&member_opts, options, member_name);
            let scalar = scalar_of(self.oracle, &param.ty);
            if scalar.is_none() && converter.is_none() {
                bag.report(
                    DiagnosticCode::UnsupportedResultType,
                    format!(
                        "argument `{}` of `{}` has type `{}` which cannot be read from a column",
                        param.name, info.name, param.ty
                    ),
                );
                failed = true;
                continue;
            }
            covered.push(member_name.to_lowercase());
            columns.push(ColumnBinding {
                column_name: column_name_for(&member_opts, options, member_name),
                target: BindTarget::ConstructorArg { index },
                value_kind: if converter.is_some() { None } else { scalar.map(|(k, _)| k) },
                nullable: scalar.map_or(true, |(_, n)| n),
                strict: options.strict_types,
                converter,
            });
        }

        // Factories receive every value as an argument.
        if !matches!(construction, Construction::Factory(_)) {
            for member in &members {
                if !member.is_writable()
                    || !member.accessibility.is_reachable_from_generated()
                    || covered.contains(&member.name.to_lowercase())
                {
                    continue;
                }
                let (member_opts, invalid) = MemberOptions::lookup(self.oracle, &info.name, &member.name);
                for message in invalid {
                    bag.report(DiagnosticCode::InvalidMarker, message);
                }
                if member_opts.include == Some(false) {
                    continue;
                }
                let converter = converter_for(&member_opts, options, &member.name);
                let scalar = scalar_of(self.oracle, &member.ty);
                if scalar.is_none() && converter.is_none() {
                    continue;
                }
                columns.push(ColumnBinding {
                    column_name: column_name_for(&member_opts, options, &member.name),
                    target: BindTarget::Member {
                        name: member.name.clone(),
                    },
                    value_kind: if converter.is_some() { None } else { scalar.map(|(k, _)| k) },
                    nullable: scalar.map_or(true, |(_, n)| n),
                    strict: options.strict_types,
                    converter,
                });
            }
        }

        let mut seen: FxHashMap<String, &BindTarget> = FxHashMap::default();
        for column in &columns {
            if let Some(first) = seen.insert(column.column_name.to_lowercase(), &column.target) {
                bag.report(
                    DiagnosticCode::DuplicateColumnName,
                    format!(
                        "column `{}` of `{}` is read by both {first} and {}",
                        column.column_name, info.name, column.target
                    ),
                );
                failed = true;
            }
        }

        if failed {
            return ResultOutcome::Rejected;
        }
        tracing::trace!(ty = %info.name, strategy = strategy.name(), columns = columns.len(), "result shape");
        ResultOutcome::Shape(ResultShape {
            kind: ResultKind::Constructed {
                type_name: info.name.clone(),
                strategy,
                factory,
                constructor,
                arity: arguments.len(),
            },
            matching: matching_for(options, options.tuple_binding),
            columns,
        })
    }

    fn choose_construction<'t>(
        &self,
        info: &'t TypeInfo,
        members: &[MemberInfo],
        bag: &mut DiagnosticBag,
    ) -> Option<Construction<'t>> {
        let owner = &info.name;
        let opted_factories: Vec<&FactoryInfo> = info
            .factories
            .iter()
            .filter(|f| {
                self.explicit_flag(
                    SymbolRef::Factory {
                        owner: owner.clone(),
                        name: f.name.clone(),
                    },
                    bag,
                ) == Some(true)
            })
            .collect();
        let ctor_flags: Vec<Option<bool>> = (0..info.constructors.len())
            .map(|index| {
                self.explicit_flag(
                    SymbolRef::Constructor {
                        owner: owner.clone(),
                        index,
                    },
                    bag,
                )
            })
            .collect();
        let opted_ctors: Vec<usize> = (0..ctor_flags.len()).filter(|i| ctor_flags[*i] == Some(true)).collect();

        if opted_factories.len() + opted_ctors.len() > 1 {
            let mut candidates: Vec<String> = opted_factories.iter().map(|f| format!("factory `{}`", f.name)).collect();
            candidates.extend(opted_ctors.iter().map(|i| format!("constructor #{i}")));
            bag.report(
                DiagnosticCode::AmbiguousConstruction,
                format!(
                    "`{owner}` opts in more than one construction path: {}",
                    candidates.join(", ")
                ),
            );
            return None;
        }

        if let [factory] = opted_factories.as_slice() {
            return self
                .check_factory(owner, factory, members, bag)
                .then_some(Construction::Factory(*factory));
        }

        let reachable = |c: &ConstructorInfo| c.accessibility.is_reachable_from_generated();
        if let [index] = opted_ctors.as_slice() {
            let ctor = &info.constructors[*index];
            if !reachable(ctor) {
                bag.report(
                    DiagnosticCode::NoConstructionStrategy,
                    format!("the opted-in constructor of `{owner}` is not accessible"),
                );
                return None;
            }
            return Some(Construction::Constructor(
                *index,
                ctor,
                ConstructionStrategy::SingleOptedConstructor,
            ));
        }

        let any_opt_out = ctor_flags.contains(&Some(false));
        let eligible = |i: usize| ctor_flags[i] != Some(false) && reachable(&info.constructors[i]);
        let non_default: Vec<usize> = (0..info.constructors.len())
            .filter(|i| eligible(*i))
            .filter(|i| !info.constructors[*i].is_parameterless() && !info.constructors[*i].is_primary)
            .collect();
        let has_default = info.constructors.is_empty()
            || (0..info.constructors.len()).any(|i| eligible(i) && info.constructors[i].is_parameterless());
        let primary = (0..info.constructors.len()).find(|i| eligible(*i) && info.constructors[*i].is_primary);

        if let ([index], false) = (non_default.as_slice(), any_opt_out) {
            return Some(Construction::Constructor(
                *index,
                &info.constructors[*index],
                ConstructionStrategy::UniqueNonDefaultConstructor,
            ));
        }
        if has_default {
            return Some(Construction::Setters);
        }
        if let Some(index) = primary {
            return Some(Construction::Constructor(
                index,
                &info.constructors[index],
                ConstructionStrategy::PositionalRecord,
            ));
        }
        if non_default.len() > 1 {
            bag.report(
                DiagnosticCode::AmbiguousConstruction,
                format!(
                    "`{owner}` has {} equally eligible constructors; mark one as explicit",
                    non_default.len()
                ),
            );
        } else {
            bag.report(
                DiagnosticCode::NoConstructionStrategy,
                format!("`{owner}` has no accessible constructor the generated reader can use"),
            );
        }
        None
    }

    /// Every factory parameter must name a member of the same type.
    fn check_factory(&self, owner: &TypeRef, factory: &FactoryInfo, members: &[MemberInfo], bag: &mut DiagnosticBag) -> bool {
        if !factory.accessibility.is_reachable_from_generated() {
            bag.report(
                DiagnosticCode::NoConstructionStrategy,
                format!("factory `{owner}.{}` is not accessible", factory.name),
            );
            return false;
        }
        let mut ok = true;
        for param in &factory.parameters {
            let matched = members
                .iter()
                .find(|m| m.name.eq_ignore_ascii_case(&param.name))
                .is_some_and(|m| m.ty == param.ty);
            if !matched {
                bag.report(
                    DiagnosticCode::FactorySignatureMismatch,
                    format!(
                        "parameter `{} {}` of factory `{owner}.{}` matches no member of that type",
                        param.ty, param.name, factory.name
                    ),
                );
                ok = false;
            }
        }
        ok
    }

    fn explicit_flag(&self, symbol: SymbolRef, bag: &mut DiagnosticBag) -> Option<bool> {
        let value = self.oracle.marker(&symbol, MarkerKind::ExplicitConstructor)?;
        let flag = value.as_flag();
        if flag.is_none() {
            bag.report(
                DiagnosticCode::InvalidMarker,
                format!("{symbol:?}: explicit-constructor marker value {value:?} is not a flag"),
            );
        }
        flag
    }
}

fn matching_for(options: &EffectiveOptions, binding: Option<TupleBinding>) -> ColumnMatch {
    match binding {
        Some(TupleBinding::ByPosition) => ColumnMatch::ByPosition,
        _ => ColumnMatch::ByName {
            underscores: options.match_names_with_underscores,
        },
    }
}

/// Call-site overrides win over member markers.
fn column_name_for(member_opts: &MemberOptions, options: &EffectiveOptions, member: &str) -> String {
    options
        .column_overrides
        .get(member)
        .or(member_opts.column_name.as_ref())
        .cloned()
        .unwrap_or_else(|| member.to_string())
}

fn converter_for(member_opts: &MemberOptions, options: &EffectiveOptions, member: &str) -> Option<String> {
    member_opts
        .converter
        .clone()
        .or_else(|| options.converters.get(member).cloned())
}
