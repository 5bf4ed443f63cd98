//! History log ordering and rendering

use crate::test_utils::*;
use population::TimeFormat;

#[test]
fn history_has_one_entry_per_write_in_order() {
    let db = registry();
    db.add_person(person("1", "s0")).unwrap();
    for i in 1..10 {
        db.change_person_data(person("1", &format!("s{}", i))).unwrap();
    }

    let history = db.get_person_history("1").unwrap();
    assert_eq!(history.len(), 10);
    for (i, entry) in history.iter().enumerate() {
        assert_eq!(entry.data.status, format!("s{}", i));
    }
}

#[test]
fn identical_update_still_adds_entry() {
    let db = registry();
    db.add_person(ann()).unwrap();
    db.change_person_data(ann()).unwrap();

    let history = db.get_person_history("1").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].data, history[1].data);
}

#[test]
fn failed_writes_leave_no_history() {
    let db = registry();
    db.add_person(ann()).unwrap();
    let _ = db.add_person(person("1", "dup"));
    let _ = db.change_person_data(person("9", "ghost"));

    assert_eq!(db.get_person_history("1").unwrap().len(), 1);
    assert!(db.get_person_history("9").unwrap().is_empty());
}

#[test]
fn time_format_is_configurable() {
    let db = registry();
    db.add_person(ann()).unwrap();
    assert!(db.get_person_history("1").unwrap()[0].time.contains("UTC"));

    db.update_config(|cfg| cfg.time_format = TimeFormat::Rfc3339).unwrap();
    let time = db.get_person_history("1").unwrap()[0].time.clone();
    assert!(time.ends_with('Z'));
}
