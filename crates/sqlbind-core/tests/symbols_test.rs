//! Symbol model, oracle, and event dispatch tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use smallvec::smallvec;
use sqlbind_core::callsite::{ArgExpr, CommandType, OptionSet, TupleBinding};
use sqlbind_core::events::{AnalysisEventHandler, AnalysisStartedEvent, EventDispatcher};
use sqlbind_core::symbols::{
    Accessibility, MapOracle, MarkerKind, MarkerValue, MemberInfo, MemberKind, SymbolOracle,
    SymbolRef, TypeInfo, TypeKind, TypeRef, WriteAccess,
};
use sqlbind_core::Location;

fn member(name: &str, ty: &str) -> MemberInfo {
    MemberInfo {
        name: name.to_string(),
        ty: TypeRef::from(ty),
        kind: MemberKind::Property,
        accessibility: Accessibility::Public,
        readable: true,
        write: WriteAccess::Settable,
    }
}

#[test]
fn test_effective_accessibility_takes_least_visible() {
    let mut info = TypeInfo::new("App.Outer.Inner", TypeKind::Object);
    info.containing = smallvec![Accessibility::Public, Accessibility::Private];
    assert_eq!(info.effective_accessibility(), Accessibility::Private);
    assert!(!info.effective_accessibility().is_reachable_from_generated());

    let plain = TypeInfo::new("App.Plain", TypeKind::Object);
    assert!(plain.effective_accessibility().is_reachable_from_generated());
}

#[test]
fn test_map_oracle_round_trip() {
    let ty = TypeRef::from("App.Customer");
    let mut oracle = MapOracle::new();
    oracle
        .add_type(
            TypeInfo::new(ty.clone(), TypeKind::Object),
            vec![member("Id", "int"), member("Name", "string")],
        )
        .set_expr_type("args#1", ty.clone())
        .set_marker(
            SymbolRef::member(&ty, "Name"),
            MarkerKind::ColumnName,
            MarkerValue::Text("full_name".into()),
        );

    let expr = ArgExpr::new("args#1", Location::new("a.cs", 1, 1));
    assert_eq!(oracle.static_type_of(&expr), Some(ty.clone()));
    assert_eq!(oracle.members_of(&ty).len(), 2);
    assert_eq!(
        oracle.marker(&SymbolRef::member(&ty, "Name"), MarkerKind::ColumnName),
        Some(MarkerValue::Text("full_name".into()))
    );

    oracle.remove_member(&ty, "Name");
    assert_eq!(oracle.members_of(&ty).len(), 1);
    assert_eq!(ty.short_name(), "Customer");
}

#[test]
fn test_scope_chain_inner_scope_wins() {
    let mut oracle = MapOracle::new();
    let method = SymbolRef::scope("App.Repo.Load");
    let class = SymbolRef::scope("App.Repo");
    oracle
        .set_marker(class.clone(), MarkerKind::StrictTypes, MarkerValue::Flag(true))
        .set_marker(class.clone(), MarkerKind::BatchSize, MarkerValue::Number(100))
        .set_marker(method.clone(), MarkerKind::StrictTypes, MarkerValue::Flag(false))
        .set_marker(method.clone(), MarkerKind::CommandType, MarkerValue::Text("StoredProcedure".into()))
        .set_marker(method.clone(), MarkerKind::TupleBinding, MarkerValue::Text("by_name".into()));

    let (options, invalid) = OptionSet::from_scope_chain(&oracle, &[method, class]);
    assert!(invalid.is_empty());
    assert_eq!(options.strict_types, Some(false));
    assert_eq!(options.batch_size, Some(100));
    assert_eq!(options.command_type, Some(CommandType::StoredProcedure));
    assert_eq!(options.tuple_binding, Some(TupleBinding::ByName));
}

#[test]
fn test_negative_batch_marker_reported() {
    let mut oracle = MapOracle::new();
    let scope = SymbolRef::scope("App");
    oracle.set_marker(scope.clone(), MarkerKind::BatchSize, MarkerValue::Number(-1));
    let (options, invalid) = OptionSet::from_markers(&oracle, &scope);
    assert_eq!(options.batch_size, None);
    assert_eq!(invalid.len(), 1);
    assert!(invalid[0].starts_with("App: BatchSize"));
}

#[test]
fn test_text_batch_marker_reported_with_scope() {
    let mut oracle = MapOracle::new();
    let method = SymbolRef::scope("App.Repo.Load");
    let class = SymbolRef::scope("App.Repo");
    oracle
        .set_marker(class.clone(), MarkerKind::BatchSize, MarkerValue::Text("lots".into()))
        .set_marker(class.clone(), MarkerKind::CacheCommand, MarkerValue::Flag(true))
        .set_marker(method.clone(), MarkerKind::CommandType, MarkerValue::Text("Macro".into()));

    let (options, invalid) = OptionSet::from_scope_chain(&oracle, &[method, class]);
    assert_eq!(options.batch_size, None);
    assert_eq!(options.command_type, None);
    assert_eq!(options.cache_command, Some(true));
    assert_eq!(
        invalid,
        vec![
            "App.Repo: BatchSize marker value Text(\"lots\") is not valid".to_string(),
            "App.Repo.Load: CommandType marker value Text(\"Macro\") is not valid".to_string(),
        ]
    );
}

struct Counter(AtomicUsize);

impl AnalysisEventHandler for Counter {
    fn on_analysis_started(&self, event: &AnalysisStartedEvent) {
        self.0.fetch_add(event.call_sites, Ordering::SeqCst);
    }
}

#[test]
fn test_dispatcher_fans_out() {
    let a = Arc::new(Counter(AtomicUsize::new(0)));
    let b = Arc::new(Counter(AtomicUsize::new(0)));
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(a.clone());
    dispatcher.register(b.clone());
    assert_eq!(dispatcher.len(), 2);

    dispatcher.on_analysis_started(&AnalysisStartedEvent { call_sites: 3 });
    assert_eq!(a.0.load(Ordering::SeqCst), 3);
    assert_eq!(b.0.load(Ordering::SeqCst), 3);
}
