//! Change events and the notification policy

use std::sync::Arc;

use crate::test_utils::*;
use population::{Error, NotificationPolicy, Person, PopulationConfig, Population, CHANGE_EVENT};

#[test]
fn every_write_emits_one_change_event() {
    let db = registry();
    let sink = Arc::new(RecordingSink::default());
    db.database().add_sink(sink.clone());

    db.add_person(ann()).unwrap();
    db.change_person_data(person("1", "inactive")).unwrap();
    db.get_person("1").unwrap();
    db.get_person_history("1").unwrap();

    let events = sink.events.lock();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.name == CHANGE_EVENT));
    assert_eq!(Person::from_bytes(&events[0].payload).unwrap(), ann());
    assert_eq!(Person::from_bytes(&events[1].payload).unwrap().status, "inactive");
    assert!(events[0].version < events[1].version);
}

#[test]
fn subscriber_sees_committed_versions() {
    let db = registry();
    let rx = db.subscribe();
    db.add_person(ann()).unwrap();

    let event = rx.try_recv().unwrap();
    assert_eq!(event.version, db.database().version());
}

#[test]
fn strict_policy_blocks_write_when_observer_is_down() {
    let db = registry();
    db.database().add_sink(Arc::new(OfflineSink));

    let err = db.add_person(ann()).unwrap_err();
    assert!(matches!(err, Error::NotificationFailed { ref event, .. } if event == CHANGE_EVENT));
    assert!(!db.person_exists("1").unwrap());
    assert!(db.get_person_history("1").unwrap().is_empty());
    assert_eq!(db.database().version(), 0);
}

#[test]
fn best_effort_policy_keeps_write_when_observer_is_down() {
    let db = Population::cache_with_config(PopulationConfig {
        notification_policy: NotificationPolicy::BestEffort,
        ..Default::default()
    })
    .unwrap();
    db.database().add_sink(Arc::new(OfflineSink));

    db.add_person(ann()).unwrap();
    db.change_person_data(person("1", "inactive")).unwrap();
    assert_eq!(db.get_person_history("1").unwrap().len(), 2);
}

#[test]
fn policy_can_switch_at_runtime() {
    let db = registry();
    let id = db.database().add_sink(Arc::new(OfflineSink));
    assert!(db.add_person(ann()).is_err());

    db.update_config(|cfg| cfg.notification_policy = NotificationPolicy::BestEffort)
        .unwrap();
    db.add_person(ann()).unwrap();

    db.update_config(|cfg| cfg.notification_policy = NotificationPolicy::Strict)
        .unwrap();
    assert!(db.change_person_data(person("1", "x")).is_err());

    assert!(db.database().remove_sink(id));
    db.change_person_data(person("1", "x")).unwrap();
    assert_eq!(db.get_person("1").unwrap().status, "x");
}
