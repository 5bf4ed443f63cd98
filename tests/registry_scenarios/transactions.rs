//! Named transactions with positional string arguments

use crate::test_utils::*;
use population::{Error, HistoryEntry, Person};

#[test]
fn submit_and_read_back_payloads() {
    let db = registry();
    let executor = db.executor();

    assert!(executor.submit_transaction("AddPerson", &ANN).unwrap().is_empty());

    let payload = executor.submit_transaction("GetPerson", &["1"]).unwrap();
    assert_eq!(
        String::from_utf8(payload).unwrap(),
        r#"{"Address":"X","City":"Y","Id":"1","Name":"Ann","Status":"active","Surname":"Lee","TelephoneNumber":"555"}"#
    );

    let payload = executor.submit_transaction("PersonExists", &["1"]).unwrap();
    assert_eq!(payload, b"true");
}

#[test]
fn history_payload_is_data_and_time_objects() {
    let db = registry();
    let executor = db.executor();
    executor.submit_transaction("AddPerson", &ANN).unwrap();

    let payload = executor
        .submit_transaction("GetPersonHistory", &["1"])
        .unwrap();
    let entries: Vec<HistoryEntry> = serde_json::from_slice(&payload).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].data, Person::from_fields(&ANN).unwrap());

    let text = String::from_utf8(payload).unwrap();
    assert!(text.starts_with(r#"[{"Data":{"Address""#));
    assert!(text.contains(r#""Time":""#));
}

#[test]
fn malformed_calls_are_rejected() {
    let db = registry();
    let executor = db.executor();

    assert!(matches!(
        executor.submit_transaction("AddPerson", &["1"]).unwrap_err(),
        Error::InvalidInput { .. }
    ));
    assert!(matches!(
        executor.submit_transaction("GetPerson", &["1", "2"]).unwrap_err(),
        Error::InvalidInput { .. }
    ));
    assert_eq!(
        executor.submit_transaction("DeletePerson", &["1"]).unwrap_err(),
        Error::UnknownTransaction {
            name: "DeletePerson".into()
        }
    );
}

#[test]
fn evaluate_refuses_writes() {
    let db = registry();
    let executor = db.executor();

    assert!(executor.evaluate_transaction("AddPerson", &ANN).is_err());
    assert!(!db.person_exists("1").unwrap());
    assert_eq!(
        executor.evaluate_transaction("PersonExists", &["1"]).unwrap(),
        b"false"
    );
}
