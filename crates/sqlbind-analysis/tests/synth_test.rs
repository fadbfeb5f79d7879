//! Generated binders and readers, exercised through a full analysis run.

mod support;

use std::collections::BTreeMap;

use sqlbind_analysis::synth::{GeneratedArtifact, Materialized, Value};
use sqlbind_analysis::{AnalysisEngine, AnalysisOutput};
use sqlbind_core::callsite::{CallSite, OperationKind, OptionSet, QueryCardinality};
use sqlbind_core::errors::BindError;
use sqlbind_core::AnalysisConfig;
use support::{execute, loc, oracle, query};

fn run(sites: &[CallSite]) -> AnalysisOutput {
    AnalysisEngine::new(AnalysisConfig::default())
        .expect("default config is valid")
        .analyze(sites, &oracle())
        .expect("analysis runs")
}

fn artifact_at<'a>(output: &'a AnalysisOutput, line: u32) -> &'a GeneratedArtifact {
    output
        .artifact_for(&loc(line, 9))
        .unwrap_or_else(|| panic!("site on line {line} was not specialized: {:?}", output.diagnostics))
}

fn values(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn test_add_then_update_keeps_parameter_order() {
    let output = run(&[execute(
        3,
        "update orders set total = @Total, note = @Note where id = @OrderId",
        "order",
    )]);
    let binder = &artifact_at(&output, 3).binder;

    let first = values(&[("OrderId", Value::Int(1)), ("Total", Value::Float(9.5))]);
    let mut params = binder.add(&first);
    let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["OrderId", "Total", "Note"]);
    assert_eq!(params[2].value, Value::Null);

    let second = values(&[
        ("OrderId", Value::Int(2)),
        ("Total", Value::Float(1.25)),
        ("Note", Value::from("gift")),
    ]);
    binder.update(&mut params, &second).expect("same layout");
    assert_eq!(params[0].value, Value::Int(2));
    assert_eq!(params[2].value, Value::from("gift"));

    params.swap(0, 1);
    assert!(matches!(
        binder.update(&mut params, &second),
        Err(BindError::ParameterOrderMismatch { index: 0, .. })
    ));
    params.pop();
    assert!(matches!(
        binder.update(&mut params, &second),
        Err(BindError::ParameterCountMismatch { expected: 3, actual: 2 })
    ));
}

#[test]
fn test_batch_groups_follow_batch_size() {
    let site = execute(4, "insert into orders values (@OrderId, @Total, @Note)", "orders").with_local_options(OptionSet {
        batch_size: Some(2),
        ..OptionSet::default()
    });
    let output = run(&[site]);
    let binder = &artifact_at(&output, 4).binder;
    assert_eq!(binder.batch_size(), 2);

    let rows: Vec<BTreeMap<String, Value>> = (1..=5)
        .map(|i| values(&[("OrderId", Value::Int(i)), ("Total", Value::Float(i as f64))]))
        .collect();
    let commands = binder.add_batch(&rows).expect("uniform rows");
    let sizes: Vec<usize> = commands.iter().map(|c| c.parameter_sets.len()).collect();
    assert_eq!(sizes, [2, 2, 1]);
    assert_eq!(commands[1].parameter_sets[1][0].value, Value::Int(4));
    assert_eq!(commands[2].parameter_sets[0][1].value, Value::Float(5.0));
}

#[test]
fn test_reader_tokenizes_once_per_schema() {
    let output = run(&[query(5, "select Name, Id from customers", "App.Customer")]);
    let reader = artifact_at(&output, 5).reader().expect("query has a reader");
    let mut session = reader.session();

    let schema = ["name", "ID"];
    for (id, name) in [(1, "Ann"), (2, "Bo"), (3, "Cy")] {
        let row = [Value::from(name), Value::Int(id)];
        let item = session.read_row(&schema, &row).expect("row reads").expect("no limit");
        match item {
            Materialized::Instance { members, arguments, .. } => {
                assert!(arguments.is_empty());
                assert_eq!(members, vec![("Id".to_string(), Value::Int(id)), ("Name".to_string(), Value::from(name))]);
            }
            other => panic!("expected an instance, got {other:?}"),
        }
    }
    assert_eq!(session.tokenization_count(), 1);

    // A second result set with another layout.
    let reordered = ["Id", "Name", "Extra"];
    session
        .read_row(&reordered, &[Value::Int(4), Value::from("Di"), Value::Null])
        .expect("row reads");
    assert_eq!(session.tokenization_count(), 2);
    assert_eq!(session.rows_read(), 4);
}

#[test]
fn test_row_width_must_match_schema() {
    let output = run(&[query(6, "select Id, Name from customers", "App.Customer")]);
    let reader = artifact_at(&output, 6).reader().expect("query has a reader");
    let tokens = reader.tokenize(&["Id", "Name"]);
    assert!(matches!(
        reader.materialize(&tokens, &[Value::Int(1)]),
        Err(BindError::RowWidthMismatch { expected: 2, actual: 1 })
    ));
}

#[test]
fn test_strict_types_reject_coercion() {
    let lenient = query(7, "select Id, Name from customers", "App.Customer");
    let strict = query(8, "select Id, Name from customers", "App.Customer").with_local_options(OptionSet {
        strict_types: Some(true),
        ..OptionSet::default()
    });
    let output = run(&[lenient, strict]);
    let schema = ["Id", "Name"];
    let row = [Value::from("42"), Value::from("Ann")];

    let lenient_reader = artifact_at(&output, 7).reader().expect("reader");
    let tokens = lenient_reader.tokenize(&schema);
    match lenient_reader.materialize(&tokens, &row).expect("text coerces to int") {
        Materialized::Instance { members, .. } => assert_eq!(members[0], ("Id".to_string(), Value::Int(42))),
        other => panic!("expected an instance, got {other:?}"),
    }

    let strict_reader = artifact_at(&output, 8).reader().expect("reader");
    let tokens = strict_reader.tokenize(&schema);
    assert!(matches!(
        strict_reader.materialize(&tokens, &row),
        Err(BindError::StrictTypeMismatch { .. })
    ));
}

#[test]
fn test_first_reads_one_row() {
    let site = support::site(
        9,
        OperationKind::Query {
            cardinality: QueryCardinality::First,
        },
        "select Id, Name from customers",
    )
    .with_result_type("App.Customer");
    let output = run(&[site]);
    let reader = artifact_at(&output, 9).reader().expect("reader");
    assert_eq!(reader.row_limit(), Some(1));

    let mut session = reader.session();
    let schema = ["Id", "Name"];
    assert!(session.read_row(&schema, &[Value::Int(1), Value::from("a")]).expect("reads").is_some());
    assert!(session.read_row(&schema, &[Value::Int(2), Value::from("b")]).expect("reads").is_none());
}

#[test]
fn test_declared_row_hint_does_not_truncate() {
    let hinted = OptionSet {
        row_count_hint: Some(2),
        ..OptionSet::default()
    };
    let buffered = query(11, "select Id, Name from customers", "App.Customer").with_local_options(hinted);
    let single = support::site(
        12,
        OperationKind::Query {
            cardinality: QueryCardinality::Single,
        },
        "select Id, Name from customers where Id = 1",
    )
    .with_result_type("App.Customer")
    .with_local_options(OptionSet {
        row_count_hint: Some(50),
        ..OptionSet::default()
    });
    let output = run(&[buffered, single]);

    let schema = ["Id", "Name"];
    let rows: Vec<Vec<Value>> = (0..5).map(|i| vec![Value::Int(i), Value::from("n")]).collect();

    let reader = artifact_at(&output, 11).reader().expect("reader");
    assert_eq!(reader.row_limit(), None);
    assert_eq!(reader.capacity_hint(), Some(2));
    assert_eq!(reader.read_all(&schema, &rows).expect("reads").len(), 5);

    // Single still stops after the row that proves there is more than one.
    let reader = artifact_at(&output, 12).reader().expect("reader");
    assert_eq!(reader.row_limit(), Some(2));
    assert_eq!(reader.capacity_hint(), Some(50));
    assert_eq!(reader.read_all(&schema, &rows).expect("reads").len(), 2);
}

#[test]
fn test_scalar_reads_first_column() {
    let site = support::site(10, OperationKind::Scalar, "select count(*) from customers").with_result_type("int");
    let output = run(&[site]);
    let reader = artifact_at(&output, 10).reader().expect("reader");
    let tokens = reader.tokenize(&["count"]);
    assert_eq!(
        reader.materialize(&tokens, &[Value::Float(3.0)]).expect("coerces"),
        Materialized::Scalar(Value::Int(3))
    );
}

#[test]
fn test_execute_artifact_has_no_reader() {
    let output = run(&[execute(11, "delete from customers where id = @Id and name = @Name", "customer")]);
    let artifact = artifact_at(&output, 11);
    assert!(matches!(artifact.reader(), Err(BindError::NoReader { .. })));
}

#[test]
fn test_oracle_command_gets_hooks() {
    let site = query(12, "select Id, Name from customers", "App.Customer")
        .with_connection("Oracle.ManagedDataAccess.Client.OracleConnection");
    let output = run(&[site]);
    let command = artifact_at(&output, 12).prepare_command();
    assert_eq!(command.flags.get("BindByName").map(String::as_str), Some("true"));
    assert_eq!(command.flags.get("InitialLONGFetchSize").map(String::as_str), Some("-1"));
}
