//! End-to-end tests of the recipe surface against the in-memory
//! executor, covering CRUD over every recipe, clustering order, TTL
//! expiry, modifiers, batching, and error injection.

use cquill::context::{Context, ErrorInjector};
use cquill::error::Error;
use cquill::mock::{FailOnEachOperation, FailOnNthOperation, MockKeySpace, NeverFail};
use cquill::prelude::*;
use cquill::recipes::{noop, KeySpace};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct User {
    pk1: i32,
    pk2: i32,
    ck1: i32,
    ck2: i32,
    name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct UserWithMap {
    id: String,
    map: BTreeMap<String, Value>,
    other_map: BTreeMap<i64, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct Point {
    time: Timestamp,
    id: i32,
    user: String,
    x: f64,
    y: f64,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, ColumnValue)]
struct PostalCode(String);

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct Address {
    time: Timestamp,
    id: String,
    county: String,
    location_price: BTreeMap<String, i64>,
    location_history: BTreeMap<Timestamp, String>,
    post_code: PostalCode,
    town_id: String,
}

fn mock() -> (MockKeySpace, KeySpace) {
    let mock = MockKeySpace::new("test_ks");
    let ks = mock.keyspace();
    (mock, ks)
}

fn user_keys() -> Keys {
    Keys {
        partition_keys: vec!["pk1".into(), "pk2".into()],
        clustering_columns: vec!["ck1".into(), "ck2".into()],
    }
}

fn insert_users(tbl: &cquill::recipes::Table<User>) -> (User, User, User, User) {
    let u1 = User { pk1: 1, pk2: 1, ck1: 1, ck2: 1, name: "John".into() };
    let u2 = User { pk1: 1, pk2: 2, ck1: 1, ck2: 1, name: "Joe".into() };
    let u3 = User { pk1: 1, pk2: 1, ck1: 2, ck2: 1, name: "Josh".into() };
    let u4 = User { pk1: 1, pk2: 1, ck1: 1, ck2: 2, name: "Jane".into() };
    let u5 = User { pk1: 2, pk2: 1, ck1: 1, ck2: 1, name: "Jill".into() };

    for user in [&u1, &u2, &u3, &u4, &u5] {
        tbl.set(user).run().unwrap();
    }
    (u1, u2, u3, u4)
}

fn insert_points(
    ts: &cquill::recipes::TimeSeriesTable<Point>,
    mts: &cquill::recipes::MultiTimeSeriesTable<Point>,
    mkts: &cquill::recipes::MultiKeyTimeSeriesTable<Point>,
) -> Vec<Point> {
    let points = vec![
        Point {
            time: Timestamp::from_secs(1000),
            id: 1,
            user: "John".into(),
            x: 1.1,
            y: 1.2,
        },
        Point {
            time: Timestamp::from_secs(1005),
            id: 2,
            user: "Jane".into(),
            x: 5.1,
            y: 5.2,
        },
        Point {
            time: Timestamp::from_secs(1010),
            id: 3,
            user: "John".into(),
            x: 1.1,
            y: 1.3,
        },
    ];

    for point in &points {
        ts.set(point).run().unwrap();
        mts.set(point).run().unwrap();
        mkts.set(point).run().unwrap();
    }
    points
}

fn field_map(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

// ---- raw table ---------------------------------------------------------

#[test]
fn table_empty() {
    let (_mock, ks) = mock();
    let tbl = ks.table::<User>("users", user_keys());

    let mut result: Vec<User> = Vec::new();
    tbl.where_(vec![
        Relation::eq("pk1", 1),
        Relation::eq("pk2", 1),
        Relation::eq("ck1", 1),
        Relation::eq("ck2", 1),
    ])
    .read(&mut result)
    .run()
    .unwrap();
    assert!(result.is_empty());
}

#[test]
fn table_read() {
    let (_mock, ks) = mock();
    let tbl = ks.table::<User>("users", user_keys());
    let (u1, u2, u3, u4) = insert_users(&tbl);

    let mut users: Vec<User> = Vec::new();
    tbl.where_(vec![Relation::eq("pk1", 1), Relation::eq("pk2", 1)])
        .read(&mut users)
        .run()
        .unwrap();
    assert_eq!(users, vec![u1.clone(), u4.clone(), u3.clone()]);

    tbl.where_(vec![Relation::eq("pk1", 1), Relation::eq("pk2", 2)])
        .read(&mut users)
        .run()
        .unwrap();
    assert_eq!(users, vec![u2.clone()]);

    tbl.where_(vec![Relation::eq("pk1", 1), Relation::is_in("pk2", [1, 2])])
        .read(&mut users)
        .run()
        .unwrap();
    assert_eq!(users, vec![u1.clone(), u4.clone(), u3.clone(), u2.clone()]);

    tbl.where_(vec![
        Relation::eq("pk1", 1),
        Relation::eq("pk2", 1),
        Relation::eq("ck1", 1),
    ])
    .read(&mut users)
    .run()
    .unwrap();
    assert_eq!(users, vec![u1.clone(), u4.clone()]);

    tbl.where_(vec![
        Relation::eq("pk1", 1),
        Relation::eq("pk2", 1),
        Relation::eq("ck1", 1),
        Relation::eq("ck2", 1),
    ])
    .read(&mut users)
    .run()
    .unwrap();
    assert_eq!(users, vec![u1.clone()]);

    tbl.where_(vec![
        Relation::eq("pk1", 1),
        Relation::eq("pk2", 1),
        Relation::gt("ck1", 1),
    ])
    .read(&mut users)
    .run()
    .unwrap();
    assert_eq!(users, vec![u3.clone()]);

    tbl.where_(vec![
        Relation::eq("pk1", 1),
        Relation::eq("pk2", 1),
        Relation::eq("ck1", 1),
        Relation::lt("ck2", 2),
    ])
    .read(&mut users)
    .run()
    .unwrap();
    assert_eq!(users, vec![u1.clone()]);

    let mut user = User::default();
    tbl.where_(vec![
        Relation::eq("pk1", 1),
        Relation::eq("pk2", 1),
        Relation::eq("ck1", 1),
        Relation::eq("ck2", 1),
    ])
    .read_one(&mut user)
    .run()
    .unwrap();
    assert_eq!(user, u1);

    tbl.where_(vec![
        Relation::eq("pk1", 1),
        Relation::eq("pk2", 1),
        Relation::eq("ck1", 1),
        Relation::eq("ck2", 2),
    ])
    .read_one(&mut user)
    .run()
    .unwrap();
    assert_eq!(user, u4);
}

#[test]
fn table_read_with_projection() {
    let (_mock, ks) = mock();
    let tbl = ks.table::<User>("users", user_keys());
    insert_users(&tbl);

    let mut users: Vec<User> = Vec::new();
    tbl.where_(vec![Relation::eq("pk1", 1), Relation::eq("pk2", 2)])
        .read(&mut users)
        .with_options(Options {
            select: vec!["pk1".into(), "name".into()],
            ..Options::default()
        })
        .run()
        .unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].pk1, 1);
    assert_eq!(users[0].name, "Joe");
    // unselected columns stay at their zero values
    assert_eq!(users[0].pk2, 0);
    assert_eq!(users[0].ck1, 0);
}

#[test]
fn table_read_one_batch() {
    let (_mock, ks) = mock();
    let tbl = ks.table::<User>("users", user_keys());
    let (u1, _, _, u4) = insert_users(&tbl);

    let mut a = User::default();
    let mut b = User::default();
    let op1 = tbl
        .where_(vec![
            Relation::eq("pk1", 1),
            Relation::eq("pk2", 1),
            Relation::eq("ck1", 1),
            Relation::eq("ck2", 1),
        ])
        .read_one(&mut a);
    let op2 = tbl
        .where_(vec![
            Relation::eq("pk1", 1),
            Relation::eq("pk2", 1),
            Relation::eq("ck1", 1),
            Relation::eq("ck2", 2),
        ])
        .read_one(&mut b);

    op1.add(op2).run_logged_batch_with_context(Context::new()).unwrap();
    assert_eq!(a, u1);
    assert_eq!(b, u4);
}

#[test]
fn table_update() {
    let (_mock, ks) = mock();
    let tbl = ks.table::<User>("users", user_keys());
    insert_users(&tbl);

    let relations = vec![
        Relation::eq("pk1", 1),
        Relation::eq("pk2", 1),
        Relation::eq("ck1", 1),
        Relation::eq("ck2", 2),
    ];

    let mut set = SetMap::new();
    set.insert("name".into(), "x".into());
    tbl.where_(relations.clone()).update(set).run().unwrap();

    let mut user = User::default();
    tbl.where_(relations).read_one(&mut user).run().unwrap();
    assert_eq!(user.name, "x");
}

#[test]
fn table_update_requires_equality_on_keys() {
    let (_mock, ks) = mock();
    let tbl = ks.table::<User>("users", user_keys());
    insert_users(&tbl);

    let mut set = SetMap::new();
    set.insert("name".into(), "y".into());
    let err = tbl
        .where_(vec![
            Relation::eq("pk1", 1),
            Relation::is_in("pk2", [1, 2]),
            Relation::eq("ck1", 1),
            Relation::eq("ck2", 1),
        ])
        .update(set)
        .run()
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn table_update_upserts_missing_row() {
    let (_mock, ks) = mock();
    let tbl = ks.table::<User>("users", user_keys());

    let relations = vec![
        Relation::eq("pk1", 9),
        Relation::eq("pk2", 9),
        Relation::eq("ck1", 9),
        Relation::eq("ck2", 9),
    ];
    let mut set = SetMap::new();
    set.insert("name".into(), "created".into());
    tbl.where_(relations.clone()).update(set).run().unwrap();

    let mut user = User::default();
    tbl.where_(relations).read_one(&mut user).run().unwrap();
    assert_eq!(user.name, "created");
    assert_eq!(user.pk1, 9);
    assert_eq!(user.ck2, 9);
}

#[test]
fn table_delete_one() {
    let (_mock, ks) = mock();
    let tbl = ks.table::<User>("users", user_keys());
    insert_users(&tbl);

    let relations = vec![
        Relation::eq("pk1", 1),
        Relation::eq("pk2", 1),
        Relation::eq("ck1", 1),
        Relation::eq("ck2", 2),
    ];
    tbl.where_(relations.clone()).delete().run().unwrap();

    let mut users: Vec<User> = Vec::new();
    tbl.where_(relations).read(&mut users).run().unwrap();
    assert!(users.is_empty());
}

#[test]
fn table_delete_with_in() {
    let (_mock, ks) = mock();
    let tbl = ks.table::<User>("users", user_keys());
    insert_users(&tbl);

    let relations = vec![
        Relation::eq("pk1", 1),
        Relation::is_in("pk2", [1, 2]),
        Relation::eq("ck1", 1),
        Relation::eq("ck2", 1),
    ];
    tbl.where_(relations.clone()).delete().run().unwrap();

    let mut users: Vec<User> = Vec::new();
    tbl.where_(relations).read(&mut users).run().unwrap();
    assert!(users.is_empty());
}

// ---- map table ---------------------------------------------------------

#[test]
fn map_table_read() {
    let (_mock, ks) = mock();
    let tbl = ks.table::<User>("users", user_keys());
    let map_tbl = ks.map_table::<User>("users", "pk1");
    insert_users(&tbl);
    for user in [
        User { pk1: 1, pk2: 1, ck1: 1, ck2: 2, name: "Jane".into() },
        User { pk1: 2, pk2: 1, ck1: 1, ck2: 1, name: "Jill".into() },
    ] {
        map_tbl.set(&user).run().unwrap();
    }

    let mut user = User::default();
    map_tbl.read(1, &mut user).run().unwrap();
    assert_eq!(user.name, "Jane");

    let err = map_tbl.read(42, &mut user).run().unwrap_err();
    assert!(err.is_row_not_found());
}

#[test]
fn map_table_multi_read() {
    let (_mock, ks) = mock();
    let map_tbl = ks.map_table::<User>("users", "pk1");
    map_tbl
        .set(&User { pk1: 1, pk2: 1, ck1: 1, ck2: 2, name: "Jane".into() })
        .run()
        .unwrap();
    map_tbl
        .set(&User { pk1: 2, pk2: 1, ck1: 1, ck2: 1, name: "Jill".into() })
        .run()
        .unwrap();

    let mut users: Vec<User> = Vec::new();
    map_tbl.multi_read([1, 2], &mut users).run().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Jane");
    assert_eq!(users[1].name, "Jill");
}

#[test]
fn map_table_update_and_delete() {
    let (_mock, ks) = mock();
    let map_tbl = ks.map_table::<User>("users", "pk1");
    map_tbl
        .set(&User { pk1: 1, pk2: 1, ck1: 1, ck2: 2, name: "Jane".into() })
        .run()
        .unwrap();

    let mut set = SetMap::new();
    set.insert("name".into(), "foo".into());
    map_tbl.update(1, set).run().unwrap();

    let mut user = User::default();
    map_tbl.read(1, &mut user).run().unwrap();
    assert_eq!(user.name, "foo");

    map_tbl.delete(1).run().unwrap();
    let err = map_tbl.read(1, &mut user).run().unwrap_err();
    assert_eq!(err, Error::RowNotFound);
}

#[test]
fn map_modifiers() {
    let (_mock, ks) = mock();
    let tbl = ks.map_table::<UserWithMap>("user_mods", "id");

    let record = UserWithMap {
        id: "1".into(),
        map: field_map(&[
            ("3", Value::Text("Is Odd".into())),
            ("6", Value::Text("Is Even".into())),
        ]),
        other_map: BTreeMap::new(),
    };
    tbl.set(&record).run().unwrap();

    // MapSetField accumulates keys across updates
    let mut set = SetMap::new();
    set.insert("other_map".into(), Modifier::map_set_field(1, "One").into());
    tbl.update("1", set).run().unwrap();

    let mut set = SetMap::new();
    set.insert("other_map".into(), Modifier::map_set_field(2, "Two").into());
    tbl.update("1", set).run().unwrap();

    // MapSetFields merges without erasing prior keys
    let mut updates = BTreeMap::new();
    updates.insert("2", "Two");
    updates.insert("4", "Four");
    let mut set = SetMap::new();
    set.insert("map".into(), Modifier::map_set_fields(updates).into());
    tbl.update("1", set).run().unwrap();

    let mut read_back = UserWithMap::default();
    tbl.read("1", &mut read_back).run().unwrap();

    assert_eq!(
        read_back.map,
        field_map(&[
            ("2", Value::Text("Two".into())),
            ("3", Value::Text("Is Odd".into())),
            ("4", Value::Text("Four".into())),
            ("6", Value::Text("Is Even".into())),
        ])
    );

    let mut expected_other: BTreeMap<i64, Value> = BTreeMap::new();
    expected_other.insert(1, Value::Text("One".into()));
    expected_other.insert(2, Value::Text("Two".into()));
    assert_eq!(read_back.other_map, expected_other);
}

// ---- multimap table ----------------------------------------------------

#[test]
fn multimap_table_read() {
    let (_mock, ks) = mock();
    let mm = ks.multimap_table::<User>("users", "pk1", "pk2");
    let tbl = ks.table::<User>("users", user_keys());
    for user in [
        User { pk1: 1, pk2: 1, ck1: 1, ck2: 2, name: "Jane".into() },
        User { pk1: 1, pk2: 2, ck1: 1, ck2: 1, name: "Joe".into() },
        User { pk1: 2, pk2: 1, ck1: 1, ck2: 1, name: "Jill".into() },
    ] {
        mm.set(&user).run().unwrap();
        tbl.set(&user).run().unwrap();
    }

    let mut user = User::default();
    mm.read(1, 1, &mut user).run().unwrap();
    assert_eq!(user.name, "Jane");
    mm.read(1, 2, &mut user).run().unwrap();
    assert_eq!(user.name, "Joe");
}

#[test]
fn multimap_table_list() {
    let (_mock, ks) = mock();
    let mm = ks.multimap_table::<User>("users", "pk1", "pk2");
    for user in [
        User { pk1: 1, pk2: 1, ck1: 1, ck2: 2, name: "Jane".into() },
        User { pk1: 1, pk2: 2, ck1: 1, ck2: 1, name: "Joe".into() },
        User { pk1: 2, pk2: 1, ck1: 1, ck2: 1, name: "Jill".into() },
    ] {
        mm.set(&user).run().unwrap();
    }

    let mut users: Vec<User> = Vec::new();
    mm.list(1, 0, 10, &mut users).run().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Jane");
    assert_eq!(users[1].name, "Joe");

    mm.list(1, 1, 1, &mut users).run().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Jane");

    mm.list(1, 2, 1, &mut users).run().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "Joe");
}

#[test]
fn multimap_table_update_delete_delete_all() {
    let (_mock, ks) = mock();
    let mm = ks.multimap_table::<User>("users", "pk1", "pk2");
    for user in [
        User { pk1: 1, pk2: 1, ck1: 1, ck2: 2, name: "Jane".into() },
        User { pk1: 1, pk2: 2, ck1: 1, ck2: 1, name: "Joe".into() },
    ] {
        mm.set(&user).run().unwrap();
    }

    let mut set = SetMap::new();
    set.insert("name".into(), "foo".into());
    mm.update(1, 2, set).run().unwrap();
    let mut user = User::default();
    mm.read(1, 2, &mut user).run().unwrap();
    assert_eq!(user.name, "foo");

    mm.delete(1, 2).run().unwrap();
    assert_eq!(mm.read(1, 2, &mut user).run().unwrap_err(), Error::RowNotFound);

    mm.delete_all(1).run().unwrap();
    let mut users: Vec<User> = Vec::new();
    mm.list(1, 0, 10, &mut users).run().unwrap();
    assert!(users.is_empty());
}

// ---- time series -------------------------------------------------------

#[test]
fn time_series_read_and_list() {
    let (_mock, ks) = mock();
    let ts = ks.time_series_table::<Point>("points", "time", "id", Duration::from_mins(1));
    let mts = ks.multi_time_series_table::<Point>(
        "points", "user", "time", "id", Duration::from_mins(1));
    let mkts = ks.multi_key_time_series_table::<Point>(
        "points",
        vec!["x".into(), "y".into()],
        "time",
        vec!["id".into()],
        Duration::from_mins(1),
    );
    let points = insert_points(&ts, &mts, &mkts);

    let mut point = Point::default();
    ts.read(points[0].time, points[0].id, &mut point).run().unwrap();
    assert_eq!(point, points[0]);

    // first two points, inclusive of both endpoints
    let mut list: Vec<Point> = Vec::new();
    ts.list(points[0].time, points[1].time, &mut list).run().unwrap();
    assert_eq!(list, vec![points[0].clone(), points[1].clone()]);

    // last two points
    ts.list(points[1].time, points[2].time, &mut list).run().unwrap();
    assert_eq!(list, vec![points[1].clone(), points[2].clone()]);
}

#[test]
fn time_series_with_limit_option() {
    let (_mock, ks) = mock();
    let ts = ks.time_series_table::<Point>("points", "time", "id", Duration::from_mins(1));
    let mts = ks.multi_time_series_table::<Point>(
        "points", "user", "time", "id", Duration::from_mins(1));
    let mkts = ks.multi_key_time_series_table::<Point>(
        "points",
        vec!["x".into(), "y".into()],
        "time",
        vec!["id".into()],
        Duration::from_mins(1),
    );
    let points = insert_points(&ts, &mts, &mkts);

    let mut list: Vec<Point> = Vec::new();
    ts.list(points[0].time, points[1].time, &mut list)
        .with_options(Options {
            limit: 1,
            ..Options::default()
        })
        .run()
        .unwrap();
    assert_eq!(list, vec![points[0].clone()]);

    // same, through run_with_context
    ts.list(points[0].time, points[1].time, &mut list)
        .with_options(Options {
            limit: 1,
            ..Options::default()
        })
        .run_with_context(Context::new())
        .unwrap();
    assert_eq!(list, vec![points[0].clone()]);
}

#[test]
fn time_series_update_and_delete() {
    let (_mock, ks) = mock();
    let ts = ks.time_series_table::<Point>("points", "time", "id", Duration::from_mins(1));
    let mts = ks.multi_time_series_table::<Point>(
        "points", "user", "time", "id", Duration::from_mins(1));
    let mkts = ks.multi_key_time_series_table::<Point>(
        "points",
        vec!["x".into(), "y".into()],
        "time",
        vec!["id".into()],
        Duration::from_mins(1),
    );
    let points = insert_points(&ts, &mts, &mkts);

    let mut set = SetMap::new();
    set.insert("x".into(), 42.0.into());
    set.insert("y".into(), 43.0.into());
    ts.update(points[0].time, points[0].id, set).run().unwrap();

    let mut point = Point::default();
    ts.read(points[0].time, points[0].id, &mut point).run().unwrap();
    assert_eq!(point.x, 42.0);
    assert_eq!(point.y, 43.0);

    ts.delete(points[0].time, points[0].id).run().unwrap();
    assert_eq!(
        ts.read(points[0].time, points[0].id, &mut point).run().unwrap_err(),
        Error::RowNotFound
    );
}

#[test]
fn multi_time_series() {
    let (_mock, ks) = mock();
    let ts = ks.time_series_table::<Point>("points", "time", "id", Duration::from_mins(1));
    let mts = ks.multi_time_series_table::<Point>(
        "points", "user", "time", "id", Duration::from_mins(1));
    let mkts = ks.multi_key_time_series_table::<Point>(
        "points",
        vec!["x".into(), "y".into()],
        "time",
        vec!["id".into()],
        Duration::from_mins(1),
    );
    let points = insert_points(&ts, &mts, &mkts);

    let mut point = Point::default();
    mts.read("John", points[0].time, points[0].id, &mut point).run().unwrap();
    assert_eq!(point, points[0]);

    let mut list: Vec<Point> = Vec::new();
    mts.list("John", points[0].time, points[2].time, &mut list).run().unwrap();
    assert_eq!(list, vec![points[0].clone(), points[2].clone()]);

    mts.list("Jane", points[0].time, points[2].time, &mut list).run().unwrap();
    assert_eq!(list, vec![points[1].clone()]);

    let mut set = SetMap::new();
    set.insert("x".into(), 42.0.into());
    mts.update("John", points[0].time, points[0].id, set).run().unwrap();
    mts.read("John", points[0].time, points[0].id, &mut point).run().unwrap();
    assert_eq!(point.x, 42.0);

    mts.delete("John", points[0].time, points[0].id).run().unwrap();
    assert_eq!(
        mts.read("John", points[0].time, points[0].id, &mut point)
            .run()
            .unwrap_err(),
        Error::RowNotFound
    );
}

#[test]
fn multi_key_time_series() {
    let (_mock, ks) = mock();
    let ts = ks.time_series_table::<Point>("points", "time", "id", Duration::from_mins(1));
    let mts = ks.multi_time_series_table::<Point>(
        "points", "user", "time", "id", Duration::from_mins(1));
    let mkts = ks.multi_key_time_series_table::<Point>(
        "points",
        vec!["x".into(), "y".into()],
        "time",
        vec!["id".into()],
        Duration::from_mins(1),
    );
    let points = insert_points(&ts, &mts, &mkts);

    let mut point = Point::default();
    mkts.read(
        field_map(&[("x", Value::Double(points[0].x)), ("y", Value::Double(points[0].y))]),
        points[0].time,
        field_map(&[("id", Value::Int(i64::from(points[0].id)))]),
        &mut point,
    )
    .run()
    .unwrap();
    assert_eq!(point, points[0]);

    let mut list: Vec<Point> = Vec::new();
    mkts.list(
        field_map(&[("x", Value::Double(1.1)), ("y", Value::Double(1.2))]),
        points[0].time,
        points[2].time,
        &mut list,
    )
    .run()
    .unwrap();
    assert_eq!(list, vec![points[0].clone()]);

    mkts.list(
        field_map(&[("x", Value::Double(5.1)), ("y", Value::Double(5.2))]),
        points[0].time,
        points[2].time,
        &mut list,
    )
    .run()
    .unwrap();
    assert_eq!(list, vec![points[1].clone()]);
}

// ---- multimap multikey -------------------------------------------------

#[test]
fn multimap_mk_table() {
    let (_mock, ks) = mock();
    let mm = ks.multimap_multikey_table::<Address>(
        "addresses_by_id_and_town",
        vec!["id".into(), "town_id".into()],
        vec!["county".into()],
    );

    let address = Address {
        time: Timestamp::from_secs(100),
        id: "id1".into(),
        county: "Kent".into(),
        town_id: "t1".into(),
        post_code: PostalCode("ABC".into()),
        ..Address::default()
    };
    mm.set(&address).run().unwrap();

    let fields = field_map(&[
        ("id", Value::Text("id1".into())),
        ("town_id", Value::Text("t1".into())),
    ]);
    let ids = field_map(&[("county", Value::Text("Kent".into()))]);

    let mut read_back = Address::default();
    mm.read(fields.clone(), ids.clone(), &mut read_back).run().unwrap();
    assert_eq!(read_back, address);

    let mut set = SetMap::new();
    set.insert("post_code".into(), "XYZ".into());
    mm.update(fields.clone(), ids.clone(), set).run().unwrap();
    mm.read(fields.clone(), ids.clone(), &mut read_back).run().unwrap();
    assert_eq!(read_back.post_code, PostalCode("XYZ".into()));

    let mut list: Vec<Address> = Vec::new();
    mm.list(fields.clone(), BTreeMap::new(), 10, &mut list).run().unwrap();
    assert_eq!(list.len(), 1);

    mm.delete_all(fields.clone()).run().unwrap();
    mm.list(fields, BTreeMap::new(), 10, &mut list).run().unwrap();
    assert!(list.is_empty());
}

// ---- primary-key emptiness ---------------------------------------------

#[test]
fn empty_primary_key_rules() {
    let (_mock, ks) = mock();
    let by_id = ks.map_table::<Address>("addresses", "id");
    let by_county = ks.multimap_table::<Address>("address_by_county", "county", "id");
    let composite = ks.multimap_multikey_table::<Address>(
        "addresses_by_id_and_town",
        vec!["id".into(), "town_id".into()],
        vec!["county".into()],
    );

    let mut address = Address {
        id: "".into(),
        county: "".into(),
        town_id: "".into(),
        time: Timestamp::from_secs(100),
        post_code: PostalCode("ABC".into()),
        ..Address::default()
    };

    // single-column partition key must be non-empty
    assert!(matches!(
        by_id.set(&address).run().unwrap_err(),
        Error::EmptyPrimaryKey { .. }
    ));
    assert!(by_county.set(&address).run().is_err());
    // composite key with every part empty is rejected as well
    assert!(composite.set(&address).run().is_err());

    // one non-empty part is enough for the composite layouts
    address.county = "London".into();
    assert!(by_id.set(&address).run().is_err());
    by_county.set(&address).run().unwrap();
    composite.set(&address).run().unwrap();

    address.id = "someID".into();
    by_id.set(&address).run().unwrap();
    by_county.set(&address).run().unwrap();
}

// ---- embedded records --------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct Audit {
    created: Timestamp,
    author: String,
}

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct Document {
    id: String,
    author: String,
    #[cql(flatten)]
    audit: Audit,
}

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct Tagged {
    id: String,
    #[cql(flatten)]
    audit: Option<Audit>,
}

#[test]
fn embedded_columns_flatten_with_outer_shadowing() {
    let columns = Document::column_names();
    // author appears once, owned by the outer field
    assert_eq!(columns, vec!["id", "author", "created"]);

    let doc = Document {
        id: "d1".into(),
        author: "outer".into(),
        audit: Audit {
            created: Timestamp::from_secs(5),
            author: "inner".into(),
        },
    };
    let cells = doc.to_cells();
    let author_cells: Vec<_> = cells
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case("author"))
        .collect();
    assert_eq!(author_cells.len(), 1);
    assert_eq!(author_cells[0].1, Value::Text("outer".into()));
}

#[test]
fn embedded_round_trip_through_mock() {
    let (_mock, ks) = mock();
    let tbl = ks.map_table::<Document>("documents", "id");

    let doc = Document {
        id: "d1".into(),
        author: "ann".into(),
        audit: Audit {
            created: Timestamp::from_secs(7),
            author: String::new(),
        },
    };
    tbl.set(&doc).run().unwrap();

    let mut read_back = Document::default();
    tbl.read("d1", &mut read_back).run().unwrap();
    assert_eq!(read_back.id, "d1");
    assert_eq!(read_back.author, "ann");
    assert_eq!(read_back.audit.created, Timestamp::from_secs(7));
    // the embedded author column is shadowed and never written
    assert_eq!(read_back.audit.author, "");
}

#[test]
fn absent_optional_embed_is_not_allocated() {
    let mut tagged = Tagged::default();
    assert!(tagged.audit.is_none());

    // cells for the embed are swallowed while the embed is None
    let stored = tagged
        .put("created", &Value::Timestamp(Timestamp::from_secs(1)))
        .unwrap();
    assert!(!stored);
    assert!(tagged.audit.is_none());

    tagged.audit = Some(Audit::default());
    let stored = tagged
        .put("created", &Value::Timestamp(Timestamp::from_secs(1)))
        .unwrap();
    assert!(stored);
    assert_eq!(
        tagged.audit.as_ref().unwrap().created,
        Timestamp::from_secs(1)
    );
}

// ---- batching, noop, injection ----------------------------------------

#[test]
fn noop_add_builds_batches() {
    let (_mock, ks) = mock();
    let map_tbl = ks.map_table::<User>("users", "pk1");
    map_tbl
        .set(&User { pk1: 1, pk2: 1, ck1: 1, ck2: 2, name: "Jane".into() })
        .run()
        .unwrap();
    map_tbl
        .set(&User { pk1: 2, pk2: 1, ck1: 1, ck2: 1, name: "Jill".into() })
        .run()
        .unwrap();

    let mut users: Vec<User> = Vec::new();
    let op = noop().add(map_tbl.multi_read([1, 2], &mut users));
    op.run().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "Jane");
    assert_eq!(users[1].name, "Jill");
}

#[test]
fn empty_noop_in_a_chain() {
    let (_mock, ks) = mock();
    let map_tbl = ks.map_table::<User>("users", "pk1");

    let user = User { pk1: 1, pk2: 1, ck1: 1, ck2: 2, name: "Jane".into() };
    let op = map_tbl.set(&user).add(noop());
    op.run().unwrap();

    let mut read_back = User::default();
    map_tbl.read(1, &mut read_back).run().unwrap();
    assert_eq!(read_back.name, "Jane");
}

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct Thing {
    id: String,
    field: String,
}

fn things() -> Vec<Thing> {
    vec![
        Thing { id: "1".into(), field: "one".into() },
        Thing { id: "2".into(), field: "two".into() },
        Thing { id: "3".into(), field: "three".into() },
    ]
}

#[test]
fn injector_never_fail() {
    let (_mock, ks) = mock();
    let table = ks.map_table::<Thing>("table_name", "id");

    let mut op = noop();
    let rows = things();
    for thing in &rows {
        op = op.add(table.set(thing));
    }
    let ctx = Context::new().with_error_injector(Arc::new(NeverFail));
    op.run_with_context(ctx).unwrap();

    for thing in &rows {
        let mut read_back = Thing::default();
        table.read(thing.id.clone(), &mut read_back).run().unwrap();
        assert_eq!(&read_back, thing);
    }
}

#[test]
fn injector_fail_on_nth_operation() {
    let (_mock, ks) = mock();
    let table = ks.map_table::<Thing>("table_name", "id");
    let injected = Error::Injected("injected error".into());

    let mut op = noop();
    let rows = things();
    for thing in &rows {
        op = op.add(table.set(thing));
    }
    let ctx = Context::new()
        .with_error_injector(Arc::new(FailOnNthOperation::new(2, injected.clone())));
    let err = op.run_with_context(ctx).unwrap_err();
    assert_eq!(err, injected);

    // the first op ran, the failed one and everything after did not
    let mut read_back = Thing::default();
    table.read("1", &mut read_back).run().unwrap();
    assert!(table.read("2", &mut read_back).run().unwrap_err().is_row_not_found());
    assert!(table.read("3", &mut read_back).run().unwrap_err().is_row_not_found());
}

#[test]
fn injector_fail_on_each_operation() {
    let (_mock, ks) = mock();
    let table = ks.map_table::<Thing>("table_name", "id");
    let injected = Error::Injected("injected error".into());
    let rows = things();

    let injector = Arc::new(FailOnEachOperation::new(injected.clone()));
    let ctx = Context::new().with_error_injector(Arc::clone(&injector) as Arc<dyn ErrorInjector>);

    for i in 0..rows.len() {
        let mut op = noop();
        for thing in &rows {
            op = op.add(table.set(thing));
        }
        let err = op.run_with_context(ctx.clone()).unwrap_err();
        assert_eq!(err, injected);
        assert!(injector.should_continue());
        assert_eq!(injector.last_injected_index(), Some(i));
    }

    // every position has failed once; the next run goes through clean
    let mut op = noop();
    for thing in &rows {
        op = op.add(table.set(thing));
    }
    op.run_with_context(ctx).unwrap();
    assert!(!injector.should_continue());
    assert_eq!(injector.last_injected_index(), None);

    for thing in &rows {
        let mut read_back = Thing::default();
        table.read(thing.id.clone(), &mut read_back).run().unwrap();
        assert_eq!(&read_back, thing);
    }
}

#[test]
fn cancelled_context_aborts_before_execution() {
    let (_mock, ks) = mock();
    let table = ks.map_table::<Thing>("table_name", "id");

    let (ctx, handle) = Context::cancellable();
    handle.cancel();
    let err = table
        .set(&things()[0])
        .run_with_context(ctx)
        .unwrap_err();
    assert_eq!(err, Error::Cancelled);

    let mut read_back = Thing::default();
    assert!(table.read("1", &mut read_back).run().unwrap_err().is_row_not_found());
}

// ---- clustering order --------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct OrderedThing {
    id: String,
    created: Timestamp,
    count: i32,
}

#[test]
fn clustering_order_declared_desc_asc() {
    let (_mock, ks) = mock();
    let table = ks
        .table::<OrderedThing>(
            "thing_table",
            Keys {
                partition_keys: vec!["id".into()],
                clustering_columns: vec!["created".into(), "count".into()],
            },
        )
        .with_options(Options {
            clustering_order: vec![
                ClusteringOrderColumn::desc("created"),
                ClusteringOrderColumn::asc("count"),
            ],
            ..Options::default()
        });

    let id = "1".to_string();
    // expected order: created DESC, then count ASC
    let expected = vec![
        OrderedThing { id: id.clone(), created: Timestamp::from_secs(300), count: 1 },
        OrderedThing { id: id.clone(), created: Timestamp::from_secs(200), count: 1 },
        OrderedThing { id: id.clone(), created: Timestamp::from_secs(100), count: 1 },
        OrderedThing { id: id.clone(), created: Timestamp::from_secs(100), count: 2 },
        OrderedThing { id: id.clone(), created: Timestamp::from_secs(100), count: 3 },
    ];

    // insert shuffled
    for idx in [3, 0, 4, 2, 1] {
        table.set(&expected[idx]).run().unwrap();
    }

    let mut read_back: Vec<OrderedThing> = Vec::new();
    table
        .where_(vec![Relation::eq("id", id)])
        .read(&mut read_back)
        .run()
        .unwrap();
    assert_eq!(read_back, expected);
}

// ---- TTL ---------------------------------------------------------------

#[test]
fn ttl_expires_rows_under_frozen_clock() {
    let (mock, ks) = mock();
    let table = ks.map_table::<Thing>("things", "id");

    mock.freeze_time(Timestamp::from_secs(1_000));
    table
        .set(&Thing { id: "1".into(), field: "v".into() })
        .with_options(Options {
            ttl: Some(Duration::from_secs(60)),
            ..Options::default()
        })
        .run()
        .unwrap();

    let mut read_back = Thing::default();
    table.read("1", &mut read_back).run().unwrap();
    assert_eq!(read_back.field, "v");

    // not yet expired
    mock.freeze_time(Timestamp::from_secs(1_059));
    table.read("1", &mut read_back).run().unwrap();

    // past the deadline the row is purged on the next touch
    mock.freeze_time(Timestamp::from_secs(1_061));
    assert!(table.read("1", &mut read_back).run().unwrap_err().is_row_not_found());
}

#[test]
fn rows_without_ttl_do_not_expire() {
    let (mock, ks) = mock();
    let table = ks.map_table::<Thing>("things", "id");

    mock.freeze_time(Timestamp::from_secs(1_000));
    table
        .set(&Thing { id: "1".into(), field: "v".into() })
        .run()
        .unwrap();

    mock.advance_time(Duration::from_hours(1_000));
    let mut read_back = Thing::default();
    table.read("1", &mut read_back).run().unwrap();
    assert_eq!(read_back.field, "v");
}

// ---- clustering sentinels end-to-end ----------------------------------

#[derive(Clone, Debug, Default, PartialEq, Record)]
struct Membership {
    group: String,
    member: String,
    role: String,
}

#[test]
fn sentinel_round_trip_through_mock() {
    let (_mock, ks) = mock();
    let table = ks
        .table::<Membership>(
            "memberships",
            Keys {
                partition_keys: vec!["group".into()],
                clustering_columns: vec!["member".into()],
            },
        )
        .with_clustering_sentinel(true);

    // empty clustering value is storable once sentinels are on
    let row = Membership {
        group: "g1".into(),
        member: String::new(),
        role: "owner".into(),
    };
    table.set(&row).run().unwrap();

    let mut read_back = Membership::default();
    table
        .where_(vec![Relation::eq("group", "g1"), Relation::eq("member", "")])
        .read_one(&mut read_back)
        .run()
        .unwrap();

    // the scanner strips the sentinel back to the empty value
    assert_eq!(read_back, row);
}
