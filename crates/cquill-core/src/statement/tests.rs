use crate::{
    keys::{ClusteringOrderColumn, Keys},
    modifier::Modifier,
    relation::Relation,
    statement::{
        is_clustering_sentinel, render_where, strip_sentinel, substitute_if_empty,
        substitute_relations, DeleteStatement, InsertStatement, SelectStatement, SetMap,
        Statement, UpdateStatement, CLUSTERING_SENTINEL, CLUSTERING_SENTINEL_TIMESTAMP,
    },
    types::{Duration, Timestamp},
    value::Value,
};

fn partition_a() -> Keys {
    Keys {
        partition_keys: vec!["a".into()],
        clustering_columns: vec![],
    }
}

fn keys_a_b() -> Keys {
    Keys {
        partition_keys: vec!["a".into()],
        clustering_columns: vec!["b".into()],
    }
}

#[test]
fn select_statement() {
    let fields = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let stmt = SelectStatement::new("ks1", "tbl1", fields, vec![], partition_a()).unwrap();
    let rendered = stmt.render();
    assert_eq!(rendered.query(), "SELECT a, b, c FROM ks1.tbl1");
    assert_eq!(rendered.values(), &[]);
    assert_eq!(rendered.field_names(), &["a", "b", "c"]);

    let stmt = stmt.with_limit(10);
    let rendered = stmt.render();
    assert_eq!(rendered.query(), "SELECT a, b, c FROM ks1.tbl1 LIMIT ?");
    assert_eq!(rendered.values(), &[Value::Int(10)]);

    let stmt = stmt.with_order_by(vec![ClusteringOrderColumn::asc("a")]);
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "SELECT a, b, c FROM ks1.tbl1 ORDER BY a ASC LIMIT ?"
    );
    assert_eq!(rendered.values(), &[Value::Int(10)]);

    let stmt = stmt.with_relations(vec![
        Relation::eq("foo", "bar"),
        Relation::is_in("baz", ["bing"]),
    ]);
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "SELECT a, b, c FROM ks1.tbl1 WHERE foo = ? AND baz IN ? ORDER BY a ASC LIMIT ?"
    );
    assert_eq!(
        rendered.values(),
        &[
            Value::Text("bar".into()),
            Value::from_slice(&["bing"]),
            Value::Int(10),
        ]
    );

    let stmt = stmt.with_allow_filtering(true);
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "SELECT a, b, c FROM ks1.tbl1 WHERE foo = ? AND baz IN ? ORDER BY a ASC LIMIT ? ALLOW FILTERING"
    );
}

#[test]
fn select_statement_validation() {
    assert!(SelectStatement::new("", "tbl1", vec!["a".into()], vec![], partition_a()).is_err());
    assert!(SelectStatement::new("ks1", "", vec!["a".into()], vec![], partition_a()).is_err());
    assert!(SelectStatement::new("ks1", "tbl1", vec![], vec![], partition_a()).is_err());
    assert!(
        SelectStatement::new("ks1", "tbl1", vec!["a".into()], vec![], Keys::default()).is_err()
    );
}

#[test]
fn insert_statement() {
    let stmt = InsertStatement::new(
        "ks1",
        "tbl1",
        vec![("a".into(), Value::Text("b".into()))],
        partition_a(),
    )
    .unwrap();
    let rendered = stmt.render();
    assert_eq!(rendered.query(), "INSERT INTO ks1.tbl1 (a) VALUES (?)");
    assert_eq!(rendered.values(), &[Value::Text("b".into())]);

    let stmt = InsertStatement::new(
        "ks1",
        "tbl1",
        vec![
            ("c".into(), Value::Text("d".into())),
            ("a".into(), Value::Text("b".into())),
        ],
        partition_a(),
    )
    .unwrap();
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "INSERT INTO ks1.tbl1 (a, c) VALUES (?, ?)"
    );
    assert_eq!(
        rendered.values(),
        &[Value::Text("b".into()), Value::Text("d".into())]
    );

    let stmt = stmt.with_ttl(Duration::from_hours(1));
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "INSERT INTO ks1.tbl1 (a, c) VALUES (?, ?) USING TTL ?"
    );
    assert_eq!(
        rendered.values(),
        &[
            Value::Text("b".into()),
            Value::Text("d".into()),
            Value::Int(3600),
        ]
    );
}

#[test]
fn insert_statement_column_case_folds_into_sort() {
    let stmt = InsertStatement::new(
        "ks1",
        "tbl1",
        vec![
            ("Pk1".into(), Value::Int(1)),
            ("Name".into(), Value::Text("x".into())),
        ],
        Keys {
            partition_keys: vec!["Pk1".into()],
            clustering_columns: vec![],
        },
    )
    .unwrap();
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "INSERT INTO ks1.tbl1 (name, pk1) VALUES (?, ?)"
    );
    assert_eq!(
        rendered.values(),
        &[Value::Text("x".into()), Value::Int(1)]
    );
}

#[test]
fn update_statement() {
    let keys = Keys {
        partition_keys: vec!["foo".into()],
        clustering_columns: vec![],
    };
    let mut fields = SetMap::new();
    fields.insert("a".into(), "b".into());
    let relations = vec![Relation::eq("foo", "bar")];

    let stmt =
        UpdateStatement::new("ks1", "tbl1", fields.clone(), relations.clone(), keys.clone())
            .unwrap();
    let rendered = stmt.render();
    assert_eq!(rendered.query(), "UPDATE ks1.tbl1 SET a = ? WHERE foo = ?");
    assert_eq!(
        rendered.values(),
        &[Value::Text("b".into()), Value::Text("bar".into())]
    );

    fields.insert("c".into(), Modifier::list_append("d").into());
    let stmt =
        UpdateStatement::new("ks1", "tbl1", fields.clone(), relations.clone(), keys.clone())
            .unwrap();
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "UPDATE ks1.tbl1 SET a = ?, c = c + ? WHERE foo = ?"
    );
    assert_eq!(
        rendered.values(),
        &[
            Value::Text("b".into()),
            Value::from_slice(&["d"]),
            Value::Text("bar".into()),
        ]
    );

    fields.insert("c".into(), "d".into());
    let relations = vec![
        Relation::eq("foo", "bar"),
        Relation::is_in("baz", ["a", "b", "c"]),
    ];
    let stmt =
        UpdateStatement::new("ks1", "tbl1", fields.clone(), relations.clone(), keys.clone())
            .unwrap();
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "UPDATE ks1.tbl1 SET a = ?, c = ? WHERE foo = ? AND baz IN ?"
    );
    assert_eq!(
        rendered.values(),
        &[
            Value::Text("b".into()),
            Value::Text("d".into()),
            Value::Text("bar".into()),
            Value::from_slice(&["a", "b", "c"]),
        ]
    );

    let stmt = stmt.with_ttl(Duration::from_hours(1));
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "UPDATE ks1.tbl1 USING TTL ? SET a = ?, c = ? WHERE foo = ? AND baz IN ?"
    );
    assert_eq!(
        rendered.values(),
        &[
            Value::Int(3600),
            Value::Text("b".into()),
            Value::Text("d".into()),
            Value::Text("bar".into()),
            Value::from_slice(&["a", "b", "c"]),
        ]
    );
}

#[test]
fn update_statement_modifier_multi_bind() {
    let keys = Keys {
        partition_keys: vec!["foo".into()],
        clustering_columns: vec![],
    };
    let mut fields = SetMap::new();
    fields.insert("c".into(), Modifier::list_set_at_index(1, "x").into());

    let stmt = UpdateStatement::new(
        "ks1",
        "tbl1",
        fields,
        vec![Relation::eq("foo", "bar")],
        keys,
    )
    .unwrap();
    let rendered = stmt.render();
    assert_eq!(rendered.query(), "UPDATE ks1.tbl1 SET c[?] = ? WHERE foo = ?");
    assert_eq!(
        rendered.values(),
        &[
            Value::Int(1),
            Value::Text("x".into()),
            Value::Text("bar".into()),
        ]
    );
}

#[test]
fn update_statement_validation() {
    let keys = partition_a();
    let mut fields = SetMap::new();
    fields.insert("a".into(), "b".into());

    assert!(UpdateStatement::new("ks1", "tbl1", SetMap::new(),
        vec![Relation::eq("a", 1)], keys.clone())
    .is_err());
    assert!(UpdateStatement::new("ks1", "tbl1", fields, vec![], keys).is_err());
}

#[test]
fn delete_statement() {
    let keys = Keys {
        partition_keys: vec!["foo".into()],
        clustering_columns: vec![],
    };
    let stmt = DeleteStatement::new(
        "ks1",
        "tbl1",
        vec![Relation::eq("foo", "bar")],
        keys.clone(),
    )
    .unwrap();
    let rendered = stmt.render();
    assert_eq!(rendered.query(), "DELETE FROM ks1.tbl1 WHERE foo = ?");
    assert_eq!(rendered.values(), &[Value::Text("bar".into())]);

    let stmt = DeleteStatement::new(
        "ks1",
        "tbl1",
        vec![
            Relation::eq("foo", "bar"),
            Relation::is_in("baz", ["a", "b", "c"]),
        ],
        keys.clone(),
    )
    .unwrap();
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "DELETE FROM ks1.tbl1 WHERE foo = ? AND baz IN ?"
    );
    assert_eq!(
        rendered.values(),
        &[Value::Text("bar".into()), Value::from_slice(&["a", "b", "c"])]
    );

    assert!(DeleteStatement::new("ks1", "tbl1", vec![], keys).is_err());
}

#[test]
fn select_statement_with_sentinel() {
    let fields = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let stmt = SelectStatement::new("ks1", "tbl1", fields, vec![], keys_a_b()).unwrap();

    let stmt = stmt.with_relations(vec![Relation::eq("a", "hello"), Relation::eq("b", "")]);
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "SELECT a, b, c FROM ks1.tbl1 WHERE a = ? AND b = ?"
    );
    assert_eq!(
        rendered.values(),
        &[Value::Text("hello".into()), Value::Text("".into())]
    );

    let stmt = stmt
        .with_relations(vec![Relation::eq("a", ""), Relation::eq("b", "")])
        .with_clustering_sentinel(true);
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "SELECT a, b, c FROM ks1.tbl1 WHERE a = ? AND b = ?"
    );
    assert_eq!(
        rendered.values(),
        &[
            Value::Text("".into()),
            Value::Text(CLUSTERING_SENTINEL.into()),
        ]
    );
}

#[test]
fn insert_statement_with_sentinel() {
    let field_map = vec![
        ("a".to_string(), Value::Text("".into())),
        ("b".to_string(), Value::Text("".into())),
        ("c".to_string(), Value::Text("".into())),
    ];

    let stmt = InsertStatement::new("ks1", "tbl1", field_map, keys_a_b()).unwrap();
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "INSERT INTO ks1.tbl1 (a, b, c) VALUES (?, ?, ?)"
    );
    assert_eq!(
        rendered.values(),
        &[
            Value::Text("".into()),
            Value::Text("".into()),
            Value::Text("".into()),
        ]
    );

    let stmt = stmt.with_clustering_sentinel(true);
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "INSERT INTO ks1.tbl1 (a, b, c) VALUES (?, ?, ?)"
    );
    assert_eq!(
        rendered.values(),
        &[
            Value::Text("".into()),
            Value::Text(CLUSTERING_SENTINEL.into()),
            Value::Text("".into()),
        ]
    );
}

#[test]
fn update_statement_with_sentinel() {
    let mut fields = SetMap::new();
    fields.insert("c".into(), "".into());
    let relations = vec![Relation::eq("a", ""), Relation::eq("b", "")];

    let stmt =
        UpdateStatement::new("ks1", "tbl1", fields, relations, keys_a_b()).unwrap();
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "UPDATE ks1.tbl1 SET c = ? WHERE a = ? AND b = ?"
    );
    assert_eq!(
        rendered.values(),
        &[
            Value::Text("".into()),
            Value::Text("".into()),
            Value::Text("".into()),
        ]
    );

    let stmt = stmt.with_clustering_sentinel(true);
    let rendered = stmt.render();
    assert_eq!(
        rendered.values(),
        &[
            Value::Text("".into()),
            Value::Text("".into()),
            Value::Text(CLUSTERING_SENTINEL.into()),
        ]
    );
}

#[test]
fn delete_statement_with_sentinel() {
    let relations = vec![Relation::eq("a", ""), Relation::eq("b", "")];
    let stmt = DeleteStatement::new("ks1", "tbl1", relations, keys_a_b()).unwrap();
    let rendered = stmt.render();
    assert_eq!(
        rendered.query(),
        "DELETE FROM ks1.tbl1 WHERE a = ? AND b = ?"
    );
    assert_eq!(
        rendered.values(),
        &[Value::Text("".into()), Value::Text("".into())]
    );

    let stmt = stmt.with_clustering_sentinel(true);
    let rendered = stmt.render();
    assert_eq!(
        rendered.values(),
        &[
            Value::Text("".into()),
            Value::Text(CLUSTERING_SENTINEL.into()),
        ]
    );
}

#[test]
fn where_rendering() {
    let (body, values) = render_where(&[Relation::eq("foo", "bar")]);
    assert_eq!(body, "foo = ?");
    assert_eq!(values, vec![Value::Text("bar".into())]);

    let (body, values) = render_where(&[
        Relation::eq("foo", "bar"),
        Relation::is_in("baz", ["a", "b", "c"]),
    ]);
    assert_eq!(body, "foo = ? AND baz IN ?");
    assert_eq!(
        values,
        vec![Value::Text("bar".into()), Value::from_slice(&["a", "b", "c"])]
    );
}

#[test]
fn where_substitution_only_hits_clustering_equality() {
    let clustering_foo = Keys {
        partition_keys: vec!["p".into()],
        clustering_columns: vec!["foo".into()],
    };

    // non-empty value passes through
    let relations = substitute_relations(&[Relation::eq("foo", "bar")], &clustering_foo, true);
    assert_eq!(relations[0].terms(), &[Value::Text("bar".into())]);

    // empty value on a clustering column becomes the sentinel
    let relations = substitute_relations(&[Relation::eq("foo", "")], &clustering_foo, true);
    assert_eq!(
        relations[0].terms(),
        &[Value::Text(CLUSTERING_SENTINEL.into())]
    );

    // case-insensitive column match
    let relations = substitute_relations(&[Relation::eq("FoO", "")], &clustering_foo, true);
    assert_eq!(
        relations[0].terms(),
        &[Value::Text(CLUSTERING_SENTINEL.into())]
    );

    // non-clustering column is never substituted
    let relations = substitute_relations(&[Relation::eq("bar", "")], &clustering_foo, true);
    assert_eq!(relations[0].terms(), &[Value::Text("".into())]);

    // numeric zero is not an empty value
    let relations = substitute_relations(&[Relation::eq("foo", 0)], &clustering_foo, true);
    assert_eq!(relations[0].terms(), &[Value::Int(0)]);

    // disabled flag passes everything through
    let relations = substitute_relations(&[Relation::eq("foo", "")], &clustering_foo, false);
    assert_eq!(relations[0].terms(), &[Value::Text("".into())]);
}

#[test]
fn sentinel_substitution() {
    assert_eq!(
        substitute_if_empty(&Value::Text("".into())),
        Value::Text(CLUSTERING_SENTINEL.into())
    );
    assert_eq!(
        substitute_if_empty(&Value::Text("foo".into())),
        Value::Text("foo".into())
    );

    assert_eq!(
        substitute_if_empty(&Value::Blob(vec![])),
        Value::Blob(CLUSTERING_SENTINEL.as_bytes().to_vec())
    );
    assert_eq!(
        substitute_if_empty(&Value::Blob(vec![0x00])),
        Value::Blob(vec![0x00])
    );

    assert_eq!(
        substitute_if_empty(&Value::Timestamp(Timestamp::ZERO)),
        Value::Timestamp(CLUSTERING_SENTINEL_TIMESTAMP)
    );

    assert_eq!(substitute_if_empty(&Value::Int(0)), Value::Int(0));
    assert_eq!(substitute_if_empty(&Value::Int(42)), Value::Int(42));
}

#[test]
fn sentinel_round_trip() {
    let cases = vec![
        Value::Text("".into()),
        Value::Text("foo".into()),
        Value::Blob(vec![]),
        Value::Blob(vec![0x00]),
        Value::Timestamp(Timestamp::ZERO),
        Value::Timestamp(Timestamp::from_secs(1)),
    ];
    for value in cases {
        assert_eq!(strip_sentinel(&substitute_if_empty(&value)), value);
    }
}

#[test]
fn sentinel_detection() {
    assert!(is_clustering_sentinel(&Value::Text(
        CLUSTERING_SENTINEL.into()
    )));
    assert!(is_clustering_sentinel(&Value::Blob(
        CLUSTERING_SENTINEL.as_bytes().to_vec()
    )));
    assert!(is_clustering_sentinel(&Value::Timestamp(
        CLUSTERING_SENTINEL_TIMESTAMP
    )));

    assert!(!is_clustering_sentinel(&Value::Text("".into())));
    assert!(!is_clustering_sentinel(&Value::Blob(vec![])));
    assert!(!is_clustering_sentinel(&Value::Timestamp(Timestamp::ZERO)));
    assert!(!is_clustering_sentinel(&Value::Int(0)));
}

#[test]
fn noop_statement_renders_empty() {
    let rendered = Statement::Noop.render();
    assert_eq!(rendered.query(), "");
    assert_eq!(rendered.values(), &[]);
}

#[test]
fn sentinel_timestamp_constant() {
    assert_eq!(CLUSTERING_SENTINEL_TIMESTAMP.secs(), -6_847_804_725);
}
