//! Concurrent writers on the same and different Ids

use std::sync::Barrier;
use std::thread;

use crate::test_utils::*;
use population::Error;

const WRITERS: usize = 8;

#[test]
fn concurrent_inserts_of_one_id_have_one_winner() {
    for _ in 0..20 {
        let db = registry();
        let barrier = Barrier::new(WRITERS);

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..WRITERS)
                .map(|i| {
                    let db = db.clone();
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        db.add_person(person("1", &format!("writer-{}", i)))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(
                err,
                Error::AlreadyExists { .. } | Error::Conflict { .. }
            ));
        }
        assert_eq!(db.get_person_history("1").unwrap().len(), 1);
    }
}

#[test]
fn concurrent_updates_never_lose_history() {
    let db = registry();
    db.add_person(ann()).unwrap();

    let succeeded: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..WRITERS)
            .map(|i| {
                let db = db.clone();
                s.spawn(move || {
                    let mut ok = 0;
                    for j in 0..25 {
                        if db
                            .change_person_data(person("1", &format!("{}-{}", i, j)))
                            .is_ok()
                        {
                            ok += 1;
                        }
                    }
                    ok
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    let history = db.get_person_history("1").unwrap();
    assert_eq!(history.len(), succeeded + 1);
    assert_eq!(
        history.last().unwrap().data,
        db.get_person("1").unwrap()
    );
}

#[test]
fn writers_on_distinct_ids_all_succeed() {
    let db = registry();
    thread::scope(|s| {
        for i in 0..WRITERS {
            let db = db.clone();
            s.spawn(move || {
                for j in 0..50 {
                    db.add_person(person(&format!("{}-{}", i, j), "active"))
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(db.database().version(), (WRITERS * 50) as u64);
    assert!(db.person_exists("7-49").unwrap());
}
