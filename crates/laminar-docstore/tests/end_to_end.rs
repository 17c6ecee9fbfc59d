//! End-to-end read and write splits against in-memory transports.

use std::sync::Arc;
use std::thread;

use laminar_docstore::config::{NODES, PORT, RESOURCE, TARGET_FIELDS};
use laminar_docstore::runtime::{SinkSplit, SourceSplit};
use laminar_docstore::testing::{document, MemoryCollector, MemoryCursor};
use laminar_docstore::{
    DocumentScheme, FieldSet, JobConf, Scheme, SchemeError, SourceCall, SplitState, Tuple,
};
use serde_json::json;

fn books_scheme(fields: Option<FieldSet>) -> Arc<DocumentScheme> {
    Arc::new(DocumentScheme::new("es1,es2", 9200, "books/book", fields))
}

#[test]
fn test_read_three_records_by_field_name() {
    let conf = JobConf::new().into_shared();
    let cursor = MemoryCursor::new(vec![
        document(json!({"name": "ada", "id": 1, "extra": true})),
        document(json!({"id": 2, "name": "grace"})),
        document(json!({"id": 3})),
    ]);

    let mut split = SourceSplit::open(
        books_scheme(Some(FieldSet::defined(["id", "name"]))),
        &conf,
        cursor,
    )
    .unwrap();

    let tuples = split.read_all().unwrap();
    let values: Vec<_> = tuples.iter().map(|t| t.values().to_vec()).collect();
    assert_eq!(
        values,
        vec![
            vec![json!(1), json!("ada")],
            vec![json!(2), json!("grace")],
            vec![json!(3), serde_json::Value::Null],
        ]
    );
    assert_eq!(split.state(), SplitState::Cleaned);

    let settings = split.settings();
    assert_eq!(settings.get(NODES), Some("es1,es2"));
    assert_eq!(settings.get(PORT), Some("9200"));
    assert_eq!(settings.get(RESOURCE), Some("books/book"));
    assert_eq!(settings.get(TARGET_FIELDS), Some("id,name"));
}

#[test]
fn test_write_uses_registered_writer() {
    let conf = JobConf::new().into_shared();
    let scheme = books_scheme(Some(FieldSet::defined(["id", "name"])));

    // The collector builds documents with whatever writer the job registered.
    let settings = scheme.sink_conf_init(&conf).unwrap();
    let writer = settings.value_writer().unwrap();
    assert_eq!(writer.name(), "tuple");

    let mut split = SinkSplit::open(
        Arc::clone(&scheme),
        &conf,
        MemoryCollector::with_writer(writer),
        FieldSet::Unknown,
    )
    .unwrap();
    split
        .write(Tuple::from(vec![json!(1), json!("ada")]))
        .unwrap();
    split.write(Tuple::from(vec![json!(2)])).unwrap();

    let collector = split.close().unwrap();
    let docs: Vec<_> = collector
        .documents()
        .iter()
        .cloned()
        .map(serde_json::Value::Object)
        .collect();
    assert_eq!(
        docs,
        vec![
            json!({"id": 1, "name": "ada"}),
            json!({"id": 2, "name": null}),
        ]
    );

    let conf = conf.read();
    assert_eq!(conf.output_dir.as_deref(), Some("books/book"));
}

#[test]
fn test_round_trip_through_writer_and_reader() {
    let conf = JobConf::new().into_shared();
    let scheme = books_scheme(Some(FieldSet::defined(["id", "name"])));

    let mut sink = SinkSplit::open(
        Arc::clone(&scheme),
        &conf,
        MemoryCollector::new(),
        FieldSet::Unknown,
    )
    .unwrap();
    sink.write(Tuple::from(vec![json!(10), json!("x")])).unwrap();
    let written = sink.close().unwrap().documents().to_vec();

    // Bytes go through the registered reader on the way back in.
    let settings = scheme.source_conf_init(&conf).unwrap();
    let reader = settings.value_reader().unwrap();
    let writer = settings.value_writer().unwrap();
    let entry = laminar_docstore::TupleEntry::with_tuple(
        FieldSet::defined(["id", "name"]),
        Tuple::from(vec![json!(10), json!("x")]),
    );
    let bytes = writer
        .write_bytes(&entry, &["id".to_string(), "name".to_string()])
        .unwrap();
    let mut decoded = laminar_docstore::Document::new();
    reader.read(&bytes, &mut decoded).unwrap();
    assert_eq!(decoded, written[0]);

    let mut source = SourceSplit::open(scheme, &conf, MemoryCursor::new(written)).unwrap();
    assert_eq!(
        source.next().unwrap().unwrap().values(),
        &[json!(10), json!("x")]
    );
}

#[test]
fn test_init_from_many_splits_is_idempotent() {
    let conf = JobConf::new().into_shared();
    let scheme = books_scheme(Some(FieldSet::defined(["id"])));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let conf = Arc::clone(&conf);
            let scheme = Arc::clone(&scheme);
            thread::spawn(move || {
                let cursor = MemoryCursor::new(vec![document(json!({"id": i}))]);
                let mut split = SourceSplit::open(scheme, &conf, cursor).unwrap();
                split.read_all().unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().len(), 1);
    }

    let conf = conf.read();
    assert_eq!(conf.settings.value_reader_name(), Some("json"));
    assert_eq!(conf.settings.value_writer_name(), Some("tuple"));
    assert_eq!(conf.settings.target_fields(), vec!["id"]);
}

#[test]
fn test_engine_drives_scheme_directly() {
    let conf = JobConf::new().into_shared();
    let scheme = DocumentScheme::new("localhost", 9200, "books", None);
    let settings = scheme.source_conf_init(&conf).unwrap();

    let cursor = MemoryCursor::new(vec![document(json!({"a": 1}))]);
    let mut call = SourceCall::new(cursor, FieldSet::Unknown, settings);

    assert!(matches!(
        scheme.source(&mut call),
        Err(SchemeError::InvalidState { .. })
    ));
    scheme.source_prepare(&mut call).unwrap();
    assert!(scheme.source(&mut call).unwrap());
    assert!(!scheme.source(&mut call).unwrap());
    scheme.source_cleanup(&mut call).unwrap();
    assert_eq!(call.state(), SplitState::Cleaned);
}
