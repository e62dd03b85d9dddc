//! Session and frame id lifecycle tests

use std::collections::BTreeMap;

use proptest::prelude::*;
use tuio_core::{FrameManager, SessionManager, UNUSED_SESSION_ID};

#[test]
fn test_auto_session_ids_increase() {
    let mut sessions = SessionManager::new();
    let a = sessions.get_auto_session_id();
    let b = sessions.get_auto_session_id();
    assert_eq!(a, 1);
    assert_eq!(b, 2);
    assert_eq!(sessions.registered(), vec![1, 2]);
}

#[test]
fn test_next_session_id_is_pure_peek() {
    let mut sessions = SessionManager::new();
    sessions.register_session_id(10);
    assert_eq!(sessions.get_next_session_id(), 11);
    assert_eq!(sessions.get_next_session_id(), 11);
    assert_eq!(sessions.len(), 1);
}

#[test]
fn test_next_session_id_wraps_past_zero() {
    let mut sessions = SessionManager::new();
    sessions.register_session_id(u32::MAX);
    let next = sessions.get_next_session_id();
    assert_ne!(next, UNUSED_SESSION_ID);
    assert_eq!(next, 1);

    sessions.register_session_id(1);
    let next = sessions.get_next_session_id();
    assert!(!sessions.is_registered(next));
    assert_eq!(next, 2);
}

#[test]
fn test_clear_registry() {
    let mut sessions = SessionManager::new();
    sessions.register_session_id(3);
    sessions.register_session_id(3);
    sessions.clear_session_registry();
    assert!(sessions.is_empty());
    assert_eq!(sessions.refcount(3), 0);
    assert_eq!(sessions.get_next_session_id(), 1);
}

#[derive(Debug, Clone)]
enum Op {
    Register(u32),
    Unregister(u32),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..6).prop_map(Op::Register),
        (1u32..6).prop_map(Op::Unregister),
    ]
}

proptest! {
    #[test]
    fn prop_refcount_matches_model(ops in prop::collection::vec(arb_op(), 0..60)) {
        let mut sessions = SessionManager::new();
        let mut model: BTreeMap<u32, u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Register(id) => {
                    let count = model.entry(id).or_insert(0);
                    *count += 1;
                    prop_assert_eq!(sessions.register_session_id(id), *count);
                }
                Op::Unregister(id) => {
                    let expected = match model.get_mut(&id) {
                        Some(count) => {
                            *count -= 1;
                            *count
                        }
                        None => 0,
                    };
                    if expected == 0 {
                        model.remove(&id);
                    }
                    prop_assert_eq!(sessions.unregister_session_id(id), expected);
                }
            }
            // an id is present exactly while its count is positive
            for id in 1u32..6 {
                prop_assert_eq!(sessions.is_registered(id), model.contains_key(&id));
                prop_assert_eq!(sessions.refcount(id), model.get(&id).copied().unwrap_or(0));
            }
        }
    }

    #[test]
    fn prop_frame_ids_never_zero(start in 0u32..8, steps in 1usize..20) {
        let mut frames = FrameManager::new();
        for _ in 0..start {
            frames.get_next_frame_id();
        }
        for _ in 0..steps {
            prop_assert_ne!(frames.get_next_frame_id(), 0);
        }
    }
}
