use rowshape::RowshapeError;
use rowshape::construct::{Record, SCHEMA_KEY, Schema};
use rowshape::datatype::Value;
use tracing_subscriber::EnvFilter;

fn setup() -> (Schema, Record) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let schema = Schema::with_fields(["a", "b", "c", "d"]).unwrap();
    let record = Record::from_values(&schema, [1, 2, 3, 4]).unwrap();
    (schema, record)
}

#[test]
fn add_appends_only_new_names() {
    let (schema, _) = setup();
    let added = schema.add(["e", "b", "f", "e"]).unwrap();
    assert_eq!(added, 2, "b was already declared and e is only added once");
    assert_eq!(schema.names(), vec!["a", "b", "c", "d", "e", "f"]);
    assert_eq!(schema.add(["a"]).unwrap(), 0);
    assert_eq!(schema.count(), 6);
    assert_eq!(schema.index_of("f"), Some(6));
    assert_eq!(schema.index_of("missing"), None);
}

#[test]
fn added_fields_read_empty_until_written() {
    let (schema, mut record) = setup();
    schema.add(["e"]).unwrap();
    assert!(record.has("e"));
    assert_eq!(record.get("e"), &Value::Empty);
    record.set("e", 5).unwrap();
    assert_eq!(record.get("e"), &Value::Integer(5));
}

#[test]
fn reserved_key_cannot_be_declared() {
    let (schema, _) = setup();
    assert!(matches!(schema.add([SCHEMA_KEY]), Err(RowshapeError::Forbidden(_))));
    assert!(matches!(schema.rename([("a", SCHEMA_KEY)]), Err(RowshapeError::Forbidden(_))));
    assert_eq!(schema.count(), 4);
}

#[test]
fn delete_keeps_values_with_their_names() {
    let (schema, mut record) = setup();
    let mutator = schema.delete(["b", "unknown", "d"]);
    assert_eq!(schema.names(), vec!["a", "c"]);
    assert_eq!(schema.index_of("c"), Some(2));
    mutator.apply(&mut record).unwrap();
    assert!(!record.has("b"));
    assert!(!record.has("d"));
    assert_eq!(record.get("a"), &Value::Integer(1));
    assert_eq!(record.get("c"), &Value::Integer(3));
    assert_eq!(record.values(), vec![Value::Integer(1), Value::Integer(3)]);
}

#[test]
fn delete_of_unknown_names_changes_nothing() {
    let (schema, mut record) = setup();
    let mutator = schema.delete(["x", "y"]);
    mutator.apply(&mut record).unwrap();
    assert_eq!(schema.count(), 4);
    assert_eq!(record.get("d"), &Value::Integer(4));
}

#[test]
fn reorder_preserves_every_value() {
    let (schema, mut record) = setup();
    let mutator = schema.reorder(["d", "b"]).unwrap();
    assert_eq!(schema.names(), vec!["d", "b", "a", "c"]);
    mutator.apply(&mut record).unwrap();
    for (name, expected) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
        assert_eq!(record.get(name), &Value::Integer(expected), "field {name}");
    }
    assert_eq!(record.values()[0], Value::Integer(4));
}

#[test]
fn reorder_of_unknown_name_fails_before_mutating() {
    let (schema, _) = setup();
    let err = schema.reorder(["c", "nope"]).unwrap_err();
    assert!(matches!(err, RowshapeError::UnknownField(ref name) if name == "nope"));
    assert_eq!(schema.names(), vec!["a", "b", "c", "d"]);
}

#[test]
fn mutators_pad_lazily_grown_records() {
    let (schema, _) = setup();
    let mut sparse = Record::from_values(&schema, [10]).unwrap();
    let mutator = schema.reorder(["c", "a"]).unwrap();
    mutator.apply(&mut sparse).unwrap();
    assert_eq!(sparse.get("a"), &Value::Integer(10));
    assert_eq!(sparse.get("c"), &Value::Empty);
}

#[test]
fn mutators_refuse_records_of_other_schemas() {
    let (schema, _) = setup();
    let other = schema.deep_clone();
    let mut foreign = Record::from_values(&other, [1, 2, 3, 4]).unwrap();
    let mutator = schema.delete(["a"]);
    assert!(matches!(mutator.apply(&mut foreign), Err(RowshapeError::SchemaMismatch(_))));
}

#[test]
fn apply_all_updates_every_record() {
    let (schema, record) = setup();
    let mut records = vec![record.clone(), record];
    schema.delete(["a"]).apply_all(&mut records).unwrap();
    for record in &records {
        assert_eq!(record.get("b"), &Value::Integer(2));
        assert_eq!(record.values().len(), 3);
    }
}

#[test]
fn rename_moves_value_to_new_name() {
    let (schema, record) = setup();
    schema.rename([("a", "x")]).unwrap();
    assert_eq!(record.get("x"), &Value::Integer(1));
    assert!(!record.has("a"));
    assert_eq!(schema.names(), vec!["x", "b", "c", "d"]);
}

#[test]
fn rename_swap_is_allowed() {
    let (schema, record) = setup();
    schema.rename([("a", "b"), ("b", "a")]).unwrap();
    assert_eq!(record.get("b"), &Value::Integer(1));
    assert_eq!(record.get("a"), &Value::Integer(2));
}

#[test]
fn rename_collision_leaves_schema_untouched() {
    let (schema, _) = setup();
    let err = schema.rename([("a", "z"), ("b", "c")]).unwrap_err();
    assert!(matches!(err, RowshapeError::NameConflict(_)));
    assert_eq!(schema.names(), vec!["a", "b", "c", "d"]);
    let err = schema.rename([("a", "z"), ("nope", "y")]).unwrap_err();
    assert!(matches!(err, RowshapeError::UnknownField(_)));
    assert_eq!(schema.names(), vec!["a", "b", "c", "d"]);
}

#[test]
fn deep_clone_is_independent() {
    let (schema, record) = setup();
    let copy = schema.deep_clone();
    copy.add(["e"]).unwrap();
    copy.rename([("a", "first")]).unwrap();
    let _ = copy.delete(["d"]);
    assert_eq!(schema.names(), vec!["a", "b", "c", "d"]);
    assert!(!schema.same(&copy));
    assert!(schema.same(record.schema()));
}
