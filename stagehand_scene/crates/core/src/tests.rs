use super::*;
use std::cell::RefCell;
use std::rc::Rc;

fn recorder(log: &Rc<RefCell<Vec<EventType>>>) -> EventHandler {
    let log = log.clone();
    Box::new(move |e: &Event, _q: &mut EventQueue| {
        log.borrow_mut().push(e.event_type.clone());
        Ok(())
    })
}

#[test]
fn events_dispatch_only_to_handled_types() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut events = EventSystem::new();
    events
        .create_event_component([EventType::Quit], recorder(&seen), "quitter")
        .unwrap();
    events.enqueue(Event::new(EventType::SetScene, vec![]));
    events.enqueue(Event::new(EventType::Quit, vec![]));
    assert_eq!(events.update().unwrap(), 2);
    assert_eq!(*seen.borrow(), vec![EventType::Quit]);
    assert_eq!(events.pending(), 0);
}

#[test]
fn handler_enqueues_are_deferred_one_tick() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut events = EventSystem::new();
    let log = seen.clone();
    events
        .create_event_component(
            [EventType::PlayMusic, EventType::StopMusic],
            Box::new(move |e: &Event, q: &mut EventQueue| {
                log.borrow_mut().push(e.event_type.clone());
                if e.event_type == EventType::PlayMusic {
                    q.push(Event::new(EventType::StopMusic, vec![]));
                }
                Ok(())
            }),
            "jukebox",
        )
        .unwrap();
    events.enqueue(Event::new(EventType::PlayMusic, vec![]));
    events.update().unwrap();
    assert_eq!(*seen.borrow(), vec![EventType::PlayMusic]);
    assert_eq!(events.pending(), 1);
    events.update().unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![EventType::PlayMusic, EventType::StopMusic]
    );
}

#[test]
fn duplicate_component_is_rejected_and_destroy_is_idempotent() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut events = EventSystem::new();
    events
        .create_event_component([EventType::Quit], recorder(&seen), "a")
        .unwrap();
    let err = events
        .create_event_component([EventType::Quit], recorder(&seen), "a")
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
    events.destroy_event_component("a");
    events.destroy_event_component("a");
    events.destroy_event_component("never-registered");
    assert_eq!(events.component_count(), 0);
    events
        .create_event_component([EventType::Quit], recorder(&seen), "a")
        .unwrap();
}

#[test]
fn destroy_keeps_remaining_components_addressable() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut events = EventSystem::new();
    for id in ["a", "b", "c"] {
        events
            .create_event_component([EventType::Quit], recorder(&seen), id)
            .unwrap();
    }
    events.destroy_event_component("a");
    assert!(events.has_component("c"));
    events.destroy_event_component("c");
    assert!(events.has_component("b"));
    assert_eq!(events.component_count(), 1);
}

#[test]
fn handler_error_stops_dispatch() {
    let mut events = EventSystem::new();
    events
        .create_event_component(
            [EventType::SetScene],
            Box::new(|e: &Event, _q: &mut EventQueue| e.arg_str(0).map(|_| ())),
            "scenes",
        )
        .unwrap();
    events.enqueue(Event::new(EventType::SetScene, vec![EventArg::Int(3)]));
    assert!(matches!(events.update(), Err(Error::UnexpectedValue(_))));
}

#[test]
fn event_type_names() {
    assert_eq!(EventType::from_name("SetScene"), EventType::SetScene);
    assert_eq!(
        EventType::from_name("OpenShop"),
        EventType::Custom("OpenShop".to_string())
    );
    assert_eq!(EventType::Custom("OpenShop".into()).to_string(), "OpenShop");
    assert_eq!(EventType::Quit.to_string(), "Quit");
}

#[test]
fn frame_clock_advances() {
    let mut clock = FrameClock::default();
    clock.tick(0.5);
    clock.tick(0.25);
    assert_eq!(clock.frame, FrameNumber(2));
    assert!((clock.time.elapsed_seconds - 0.75).abs() < 1e-6);
    assert!((clock.time.delta_seconds - 0.25).abs() < 1e-6);
}
