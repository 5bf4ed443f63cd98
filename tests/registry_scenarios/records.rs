//! Current-value semantics of insert, update and read

use crate::test_utils::*;
use population::{Error, Person};
use proptest::prelude::*;

#[test]
fn never_inserted_id_is_absent() {
    let db = registry();
    for id in ["1", "", "unknown", "ünïcode"] {
        assert!(!db.person_exists(id).unwrap());
        assert!(db.get_person_history(id).unwrap().is_empty());
    }
}

#[test]
fn insert_then_get_returns_same_record() {
    let db = registry();
    db.add_person(ann()).unwrap();
    assert_eq!(db.get_person("1").unwrap(), ann());
}

#[test]
fn second_insert_fails_and_keeps_first() {
    let db = registry();
    db.add_person(ann()).unwrap();

    let err = db.add_person(person("1", "other")).unwrap_err();
    assert_eq!(err, Error::AlreadyExists { id: "1".into() });
    assert_eq!(db.get_person("1").unwrap(), ann());
}

#[test]
fn update_of_missing_id_changes_nothing() {
    let db = registry();
    db.add_person(person("2", "active")).unwrap();
    let version = db.database().version();

    let err = db.change_person_data(ann()).unwrap_err();
    assert_eq!(err, Error::NotFound { id: "1".into() });
    assert!(!db.person_exists("1").unwrap());
    assert_eq!(db.database().version(), version);
}

#[test]
fn ann_lee_scenario() {
    let db = registry();
    db.add_person(ann()).unwrap();
    assert_eq!(db.get_person("1").unwrap(), ann());

    db.change_person_data(person("1", "inactive")).unwrap();
    assert_eq!(db.get_person("1").unwrap().status, "inactive");

    let history = db.get_person_history("1").unwrap();
    let statuses: Vec<_> = history.iter().map(|h| h.data.status.as_str()).collect();
    assert_eq!(statuses, vec!["active", "inactive"]);
}

#[test]
fn records_are_independent() {
    let db = registry();
    db.add_person(person("1", "a")).unwrap();
    db.add_person(person("2", "b")).unwrap();
    db.change_person_data(person("2", "c")).unwrap();

    assert_eq!(db.get_person("1").unwrap().status, "a");
    assert_eq!(db.get_person_history("1").unwrap().len(), 1);
    assert_eq!(db.get_person_history("2").unwrap().len(), 2);
}

fn any_person() -> impl Strategy<Value = Person> {
    prop::collection::vec(".{0,12}", 7).prop_map(|f| Person::from_fields(&f).unwrap())
}

proptest! {
    #[test]
    fn stored_record_reads_back_unchanged(mut p in any_person()) {
        p.id = "p".to_string();
        let db = registry();
        db.add_person(p.clone()).unwrap();
        prop_assert_eq!(db.get_person("p").unwrap(), p);
    }
}
