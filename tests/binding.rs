use prop_rx::*;
use test_log::test;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn label() -> Rc<Object> {
    Object::builder("Label")
        .property("label", "")
        .property("iconName", "none")
        .read_only("id", 7)
        .signal("activate")
        .build()
}

#[test]
fn test_mapped_state() {
    let state = State::new(1);
    let doubled = state.map(|x| x * 2);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen2 = seen.clone();
    let _sub = doubled.subscribe(move |x| seen2.borrow_mut().push(x)).unwrap();
    assert_eq!(doubled.get().unwrap(), 2);

    state.set(3).unwrap();
    assert_eq!(*seen.borrow(), vec![6]);
    assert_eq!(doubled.get().unwrap(), 6);

    state.set(3).unwrap();
    assert_eq!(*seen.borrow(), vec![6]);
}

#[test]
fn test_transform_chain() {
    let state = State::new(5);
    let base = state.binding();
    let chained = base.map(|x| x + 1).map(|x| x * 3);
    let fused = base.map(|x| (x + 1) * 3);
    assert_eq!(chained.get().unwrap(), fused.get().unwrap());
    state.set(-2).unwrap();
    assert_eq!(chained.get().unwrap(), -3);
    assert_eq!(fused.get().unwrap(), -3);
    // Mapping doesn't change the original
    assert_eq!(base.get().unwrap(), -2);
}

#[test]
fn test_failing_transform() {
    let state = State::new(String::from("12"));
    let parsed = state.binding().try_map(|text: String| text.parse::<i32>());
    assert_eq!(parsed.get().unwrap(), 12);

    state.set(String::from("twelve")).unwrap();
    assert!(matches!(parsed.get(), Err(Error::Transform(_))));
}

#[test]
fn test_bind_object_property() {
    let label = label();
    let icon = Binding::<String>::bind(&label, "icon_name").unwrap();
    assert_eq!(icon.property(), "icon-name");
    assert_eq!(icon.signal(), "notify::icon-name");
    assert_eq!(icon.kind(), EmitterKind::Object);
    assert_eq!(icon.get().unwrap(), "none");

    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen2 = seen.clone();
    let _sub = icon.map(|name| name.len()).subscribe(move |len| seen2.borrow_mut().push(len)).unwrap();
    label.set("iconName", "edit-copy").unwrap();
    label.set("label", "unrelated").unwrap();
    label.set("icon-name", "edit-copy").unwrap();
    assert_eq!(*seen.borrow(), vec![9]);
    assert!(format!("{:?}", icon).ends_with("(Label.icon-name)"));
}

#[test]
fn test_missing_property_fails_at_bind() {
    let label = label();
    let error = Binding::<String>::bind(&label, "tooltip").unwrap_err();
    assert!(matches!(error, Error::Capability { .. }));
    assert_eq!(error.to_string(), "Label does not support property \"tooltip\"");
}

#[test]
fn test_wrong_type_fails_at_read() {
    let label = label();
    let id = Binding::<String>::bind(&label, "id").unwrap();
    assert!(matches!(id.get(), Err(Error::Type { .. })));
    assert_eq!(Binding::<i64>::bind(&label, "id").unwrap().get().unwrap(), 7);
}

#[test]
fn test_getter_preferred() {
    let shouting = Object::builder("Shouting")
        .property("text", "hi")
        .method("get_text", |object, _| {
            let text = String::from_value(object.field("text")?)?;
            Ok(Value::from(text.to_uppercase()))
        })
        .build();
    let text = Binding::<String>::bind(&shouting, "text").unwrap();
    assert_eq!(text.get().unwrap(), "HI");
    assert_eq!(shouting.get::<String>("text").unwrap(), "HI");
    assert_eq!(shouting.field("text").unwrap(), Value::from("hi"));
    assert_eq!(read_property(&*shouting, "text").unwrap(), Value::from("HI"));
}

#[test]
fn test_read_only_property() {
    let label = label();
    assert!(matches!(label.set("id", 8), Err(Error::InvalidUsage(_))));
    label.set_internal("id", Value::from(8)).unwrap();
    assert_eq!(label.get::<i64>("id").unwrap(), 8);
}

#[test]
fn test_binding_does_not_keep_emitter_alive() {
    let label = label();
    let weak = Rc::downgrade(&label);
    let calls = Rc::new(Cell::new(0));
    let calls2 = calls.clone();
    {
        let binding = Binding::<String>::bind(&label, "label").unwrap();
        binding.subscribe(move |_| calls2.set(calls2.get() + 1)).unwrap();
    }
    label.set("label", "x").unwrap();
    assert_eq!(calls.get(), 1);
    drop(label);
    assert!(weak.upgrade().is_none());
}

#[test]
fn test_scoped_binding_subscription() {
    let label = label();
    let owner = Object::builder("Owner").build();
    let calls = Rc::new(Cell::new(0));
    let calls2 = calls.clone();
    let sub = Binding::<String>::bind(&label, "label").unwrap()
        .subscribe_scoped(&*owner, move |_| calls2.set(calls2.get() + 1))
        .unwrap();
    label.set("label", "a").unwrap();
    drop(owner);
    label.set("label", "b").unwrap();
    assert_eq!(calls.get(), 1);
    assert!(!sub.is_connected());
    assert_eq!(label.handler_count(), 0);
}

#[test]
fn test_generated_accessors() {
    let entry = Object::builder("Entry")
        .property_with_accessors("placeholderText", "")
        .build();
    let placeholder = Binding::<String>::bind(&entry, "placeholder-text").unwrap();
    let calls = Rc::new(Cell::new(0));
    let calls2 = calls.clone();
    let _sub = placeholder.subscribe(move |_| calls2.set(calls2.get() + 1)).unwrap();

    write_property(&*entry, "placeholder_text", Value::from("Search")).unwrap();
    entry.set("placeholderText", "Search").unwrap();
    assert_eq!(placeholder.get().unwrap(), "Search");
    assert_eq!(calls.get(), 1);
    assert!(entry.method("get_placeholder_text").is_some());
}
