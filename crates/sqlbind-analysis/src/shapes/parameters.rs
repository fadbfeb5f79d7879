//! Parameter shape modeling: which members of the parameter argument bind to
//! which command parameters, in which order.

use rustc_hash::FxHashMap;
use sqlbind_core::callsite::{CallSite, EffectiveOptions, OperationKind};
use sqlbind_core::symbols::{SymbolOracle, TypeInfo, TypeKind, TypeRef};

use super::members::MemberOptions;
use super::scalars::{resolve_type, scalar_of};
use super::types::{DbType, ParameterBinding, ParameterCategory, ParameterShape};
use crate::diagnostics::{DiagnosticBag, DiagnosticCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterOutcome {
    Shape(ParameterShape),
    /// Left to the runtime path; not an error.
    Deferred,
    /// An error was reported.
    Rejected,
}

pub struct ParameterShapeModeler<'a> {
    oracle: &'a dyn SymbolOracle,
}

impl<'a> ParameterShapeModeler<'a> {
    pub fn new(oracle: &'a dyn SymbolOracle) -> Self {
        Self { oracle }
    }

    pub fn model(&self, site: &CallSite, options: &EffectiveOptions, bag: &mut DiagnosticBag) -> ParameterOutcome {
        let Some(arg) = &site.parameters else {
            return ParameterOutcome::Shape(ParameterShape::empty());
        };

        let Some(ty) = self.oracle.static_type_of(arg) else {
            bag.report_at(
                DiagnosticCode::UnresolvedParameterType,
                Some(arg.at.clone()),
                "the type of the parameter argument could not be resolved",
            );
            return ParameterOutcome::Deferred;
        };
        let Some(info) = resolve_type(self.oracle, &ty) else {
            bag.report_at(
                DiagnosticCode::UnresolvedParameterType,
                Some(arg.at.clone()),
                format!("parameter type `{ty}` could not be resolved"),
            );
            return ParameterOutcome::Deferred;
        };

        match &info.kind {
            TypeKind::Object => self.model_object(&info, ParameterCategory::Single, options, bag),
            TypeKind::Sequence { element } => {
                if site.operation != OperationKind::Execute {
                    bag.report_at(
                        DiagnosticCode::BatchRequiresExecute,
                        Some(arg.at.clone()),
                        format!(
                            "sequence parameter `{ty}` is only supported by execute, not {}",
                            site.operation
                        ),
                    );
                    return ParameterOutcome::Rejected;
                }
                self.model_batch(&ty, element, options, bag, site)
            }
            TypeKind::GenericParameter { name } => {
                bag.report_at(
                    DiagnosticCode::UnresolvedParameterType,
                    Some(arg.at.clone()),
                    format!("parameter type is the generic parameter `{name}`"),
                );
                ParameterOutcome::Deferred
            }
            TypeKind::DynamicBag => {
                bag.report_at(
                    DiagnosticCode::DynamicParameterBag,
                    Some(arg.at.clone()),
                    format!("`{ty}` is bound at runtime"),
                );
                ParameterOutcome::Deferred
            }
            TypeKind::Scalar { .. } | TypeKind::Enum { .. } | TypeKind::Tuple { .. } | TypeKind::UntypedRow => {
                bag.report_at(
                    DiagnosticCode::UnsupportedParameterType,
                    Some(arg.at.clone()),
                    format!("`{ty}` cannot supply named parameters"),
                );
                ParameterOutcome::Rejected
            }
        }
    }

    fn model_batch(
        &self,
        sequence: &TypeRef,
        element: &TypeRef,
        options: &EffectiveOptions,
        bag: &mut DiagnosticBag,
        site: &CallSite,
    ) -> ParameterOutcome {
        let at = site.parameters.as_ref().map(|a| a.at.clone());
        match resolve_type(self.oracle, element) {
            Some(info) if info.kind == TypeKind::Object => {
                self.model_object(&info, ParameterCategory::Batch, options, bag)
            }
            Some(TypeInfo {
                kind: TypeKind::GenericParameter { name },
                ..
            }) => {
                bag.report_at(
                    DiagnosticCode::UnresolvedParameterType,
                    at,
                    format!("element type of `{sequence}` is the generic parameter `{name}`"),
                );
                ParameterOutcome::Deferred
            }
            Some(_) => {
                bag.report_at(
                    DiagnosticCode::UnsupportedParameterType,
                    at,
                    format!("elements of `{sequence}` cannot supply named parameters"),
                );
                ParameterOutcome::Rejected
            }
            None => {
                bag.report_at(
                    DiagnosticCode::UnresolvedParameterType,
                    at,
                    format!("element type `{element}` could not be resolved"),
                );
                ParameterOutcome::Deferred
            }
        }
    }

    fn model_object(
        &self,
        info: &TypeInfo,
        category: ParameterCategory,
        options: &EffectiveOptions,
        bag: &mut DiagnosticBag,
    ) -> ParameterOutcome {
        if !info.effective_accessibility().is_reachable_from_generated() {
            bag.report(
                DiagnosticCode::InaccessibleParameterType,
                format!(
                    "parameter type `{}` is {:?} and cannot be read by generated code",
                    info.name,
                    info.effective_accessibility()
                ),
            );
            return ParameterOutcome::Rejected;
        }

        let mut failed = false;
        let mut bindings = Vec::new();

        for member in self.oracle.members_of(&info.name) {
            let (member_opts, invalid) = MemberOptions::lookup(self.oracle, &info.name, &member.name);
            for message in invalid {
                bag.report(DiagnosticCode::InvalidMarker, message);
            }
            if member_opts.include == Some(false) {
                continue;
            }
            let insisted = member_opts.include == Some(true);

            if !member.accessibility.is_reachable_from_generated() {
                if insisted {
                    bag.report(
                        DiagnosticCode::InaccessibleMember,
                        format!("`{}.{}` is marked for binding but is not accessible", info.name, member.name),
                    );
                    failed = true;
                }
                continue;
            }

            let direction = member_opts.effective_direction();
            if direction.sends_value() && !member.readable {
                continue;
            }
            if direction.receives_value() && !member.is_writable() {
                bag.report(
                    DiagnosticCode::NonWritableOutputMember,
                    format!(
                        "`{}.{}` receives a {} parameter but cannot be written",
                        info.name,
                        member.name,
                        direction.name()
                    ),
                );
                failed = true;
                continue;
            }

            let converter = member_opts
                .converter
                .clone()
                .or_else(|| options.converters.get(&member.name).cloned());
            let scalar = scalar_of(self.oracle, &member.ty);
            if scalar.is_none() && converter.is_none() {
                if insisted {
                    bag.report(
                        DiagnosticCode::UnsupportedParameterType,
                        format!("`{}.{}` has type `{}` which cannot bind as a value", info.name, member.name, member.ty),
                    );
                    failed = true;
                }
                continue;
            }

            let db_type = member_opts.db_type.unwrap_or(match (scalar, &converter) {
                (_, Some(_)) | (None, None) => DbType::Object,
                (Some((kind, _)), None) => DbType::for_scalar(kind),
            });

            bindings.push(ParameterBinding {
                name: member_opts.bind_name.clone().unwrap_or_else(|| member.name.clone()),
                source_member: member.name.clone(),
                db_type,
                direction,
                participates_in_batch: category == ParameterCategory::Batch && direction.sends_value(),
                value_kind: if converter.is_some() { None } else { scalar.map(|(k, _)| k) },
                nullable: scalar.map_or(true, |(_, n)| n),
                size: member_opts.size,
                converter,
            });
        }

        let mut seen: FxHashMap<String, &str> = FxHashMap::default();
        for binding in &bindings {
            if let Some(first) = seen.insert(binding.name.to_lowercase(), &binding.source_member) {
                bag.report(
                    DiagnosticCode::DuplicateBindName,
                    format!(
                        "`{}` and `{}` both bind to parameter `{}`",
                        first, binding.source_member, binding.name
                    ),
                );
                failed = true;
            }
        }

        if failed {
            return ParameterOutcome::Rejected;
        }
        tracing::trace!(ty = %info.name, bindings = bindings.len(), "parameter shape");
        ParameterOutcome::Shape(ParameterShape {
            category,
            source_type: Some(info.name.clone()),
            bindings,
        })
    }
}
