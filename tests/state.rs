use prop_rx::*;
use test_log::test;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn recorder<T: 'static>() -> (Rc<RefCell<Vec<T>>>, impl Fn(T) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen2 = seen.clone();
    (seen, move |value| seen2.borrow_mut().push(value))
}

#[test]
fn test_state() {
    let state = State::new(1);
    let (seen, record) = recorder();
    let _sub = state.subscribe(record);
    assert_eq!(state.get(), 1);

    state.set(2).unwrap();
    assert_eq!(state.get(), 2);
    assert_eq!(*seen.borrow(), vec![2]);

    state.modify(|x| x * 10).unwrap();
    assert_eq!(state.get(), 20);
    assert_eq!(*seen.borrow(), vec![2, 20]);
}

#[test]
fn test_equal_set_is_silent() {
    let state = State::new(String::from("a"));
    let calls = Rc::new(Cell::new(0));
    let calls2 = calls.clone();
    let _sub = state.subscribe(move |_| calls2.set(calls2.get() + 1));

    state.set(String::from("a")).unwrap();
    assert_eq!(calls.get(), 0);
    state.set(String::from("b")).unwrap();
    state.set(String::from("b")).unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_clones_share_value() {
    let state = State::new(vec![1, 2]);
    let clone = state.clone();
    clone.set(vec![3]).unwrap();
    assert_eq!(state.get(), vec![3]);
    assert!(format!("{:?}", state).starts_with("State<"));
}

#[test]
fn test_disconnect_is_idempotent() {
    let state = State::new(0);
    let calls = Rc::new(Cell::new(0));
    let calls2 = calls.clone();
    let sub = state.subscribe(move |_| calls2.set(calls2.get() + 1));
    assert_eq!(state.subscriber_count(), 1);

    state.set(1).unwrap();
    sub.disconnect();
    assert!(!sub.is_connected());
    sub.disconnect();
    sub.clone().disconnect();
    state.set(2).unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(state.subscriber_count(), 0);
}

#[test]
fn test_dropping_handle_keeps_subscription() {
    let state = State::new(0);
    let calls = Rc::new(Cell::new(0));
    let calls2 = calls.clone();
    drop(state.subscribe(move |_| calls2.set(calls2.get() + 1)));
    state.set(1).unwrap();
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_scoped_subscription() {
    let state = State::new(0);
    let owner = DestroyNotify::new();
    let (seen, record) = recorder();
    let sub = state.subscribe_scoped(&owner, record).unwrap();

    state.set(1).unwrap();
    owner.fire();
    assert!(!sub.is_connected());
    state.set(2).unwrap();
    assert_eq!(*seen.borrow(), vec![1]);
    assert_eq!(state.subscriber_count(), 0);
    // Disconnecting after the lifetime ended does nothing
    sub.disconnect();

    let error = state.subscribe_scoped(&owner, |_| {}).unwrap_err();
    assert!(matches!(error, Error::InvalidUsage(_)));
}

#[test]
fn test_disconnect_during_notification() {
    let state = State::new(0);
    let calls = Rc::new(Cell::new(0));
    let handle: Rc<RefCell<Option<Disconnect>>> = Rc::new(RefCell::new(None));
    let (calls2, handle2) = (calls.clone(), handle.clone());
    let sub = state.subscribe(move |_| {
        calls2.set(calls2.get() + 1);
        if let Some(sub) = handle2.borrow().as_ref() {
            sub.disconnect();
        }
    });
    *handle.borrow_mut() = Some(sub);
    let (seen, record) = recorder();
    let _other = state.subscribe(record);

    state.set(1).unwrap();
    state.set(2).unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(*seen.borrow(), vec![1, 2]);
}

#[test]
fn test_set_inside_subscriber() {
    let source = State::new(0);
    let mirror = State::new(0);
    let mirror2 = mirror.clone();
    let _sub = source.subscribe(move |x| mirror2.set(x * 2).unwrap());
    source.set(4).unwrap();
    assert_eq!(mirror.get(), 8);
}

#[test]
fn test_dropped_lifetime_ends_subscription() {
    let state = State::new(0);
    let owner = DestroyNotify::new();
    let calls = Rc::new(Cell::new(0));
    let calls2 = calls.clone();
    let sub = state.subscribe_scoped(&owner, move |_| calls2.set(calls2.get() + 1)).unwrap();
    drop(owner);
    state.set(1).unwrap();
    assert_eq!(calls.get(), 0);
    assert!(!sub.is_connected());
    assert_eq!(state.subscriber_count(), 0);
}

#[test]
fn test_dropped_state_releases_lifetime_entry() {
    let owner = DestroyNotify::new();
    for i in 0..100 {
        let state = State::new(i);
        state.subscribe_scoped(&owner, |_| {}).unwrap();
    }
    assert_eq!(owner.pending(), 0);
}
