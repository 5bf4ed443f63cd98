//! Records and history across close and reopen

use crate::test_utils::*;
use population::{DurabilityMode, Error, Population, PopulationConfig};
use tempfile::TempDir;

#[test]
fn history_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let times = {
        let db = Population::open(temp_dir.path()).unwrap();
        db.add_person(ann()).unwrap();
        db.change_person_data(person("1", "inactive")).unwrap();
        db.get_person_history("1").unwrap()
    };

    let db = Population::open(temp_dir.path()).unwrap();
    assert_eq!(db.get_person("1").unwrap().status, "inactive");
    assert_eq!(db.get_person_history("1").unwrap(), times);

    db.change_person_data(person("1", "active")).unwrap();
    assert_eq!(db.get_person_history("1").unwrap().len(), 3);
}

#[test]
fn second_open_of_same_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    let _first = Population::open(temp_dir.path()).unwrap();

    let err = Population::open(temp_dir.path()).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn buffered_durability_survives_clean_close() {
    let temp_dir = TempDir::new().unwrap();
    let config = PopulationConfig {
        durability: DurabilityMode::Buffered,
        ..Default::default()
    };

    {
        let db = Population::open_with_config(temp_dir.path(), config.clone()).unwrap();
        for i in 0..100 {
            db.add_person(person(&i.to_string(), "active")).unwrap();
        }
    }

    let db = Population::open_with_config(temp_dir.path(), config).unwrap();
    assert!(db.person_exists("0").unwrap());
    assert!(db.person_exists("99").unwrap());
}

#[test]
fn cache_keeps_nothing() {
    let db = Population::cache().unwrap();
    assert!(db.database().is_ephemeral());
    assert!(db.database().path().is_none());
    db.add_person(ann()).unwrap();
    db.flush().unwrap();
}
