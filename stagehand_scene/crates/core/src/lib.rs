#![forbid(unsafe_code)]

use ahash::{AHashMap, AHashSet};
use log::{debug, trace};
use stagehand_engine::{Error, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    pub delta_seconds: f32,
    pub elapsed_seconds: f64,
}

// Frame counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameNumber(pub u64);

/// Frame clock advanced once per update tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    pub time: Time,
    pub frame: FrameNumber,
}

impl FrameClock {
    pub fn tick(&mut self, delta_seconds: f32) {
        self.time.delta_seconds = delta_seconds;
        self.time.elapsed_seconds += delta_seconds as f64;
        self.frame.0 = self.frame.0.wrapping_add(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Quit,
    SetScene,
    PlayMusic,
    StopMusic,
    RadioToggled,
    Custom(String),
}

impl EventType {
    /// Parses the name used in scene documents. Unknown names become `Custom`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Quit" => EventType::Quit,
            "SetScene" => EventType::SetScene,
            "PlayMusic" => EventType::PlayMusic,
            "StopMusic" => EventType::StopMusic,
            "RadioToggled" => EventType::RadioToggled,
            other => EventType::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Custom(name) => f.write_str(name),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventArg {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    pub args: Vec<EventArg>,
}

impl Event {
    pub fn new(event_type: EventType, args: Vec<EventArg>) -> Self {
        Self { event_type, args }
    }

    pub fn arg_str(&self, index: usize) -> Result<&str> {
        match self.args.get(index) {
            Some(EventArg::String(s)) => Ok(s),
            other => Err(Error::UnexpectedValue(format!(
                "{} event expects a string argument at {index}, found {other:?}",
                self.event_type
            ))),
        }
    }
}

/// Pending events. Handlers receive it mutably; anything they push lands in
/// the next tick's snapshot.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

pub type EventHandler = Box<dyn FnMut(&Event, &mut EventQueue) -> Result<()>>;

struct EventComponent {
    widget_id: String,
    handled: AHashSet<EventType>,
    handler: EventHandler,
}

#[derive(Default)]
pub struct EventSystem {
    queue: EventQueue,
    // registration order is dispatch order
    components: Vec<EventComponent>,
    index: AHashMap<String, usize>,
}

impl EventSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, event: Event) {
        trace!("enqueue {}", event.event_type);
        self.queue.push(event);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn create_event_component(
        &mut self,
        handled: impl IntoIterator<Item = EventType>,
        handler: EventHandler,
        widget_id: &str,
    ) -> Result<()> {
        if self.index.contains_key(widget_id) {
            return Err(Error::InvalidConfiguration(format!(
                "event component for '{widget_id}' already exists"
            )));
        }
        self.index
            .insert(widget_id.to_string(), self.components.len());
        self.components.push(EventComponent {
            widget_id: widget_id.to_string(),
            handled: handled.into_iter().collect(),
            handler,
        });
        debug!("created event component '{widget_id}'");
        Ok(())
    }

    /// Unknown ids are ignored.
    pub fn destroy_event_component(&mut self, widget_id: &str) {
        let Some(pos) = self.index.remove(widget_id) else {
            return;
        };
        self.components.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        debug!("destroyed event component '{widget_id}'");
    }

    pub fn has_component(&self, widget_id: &str) -> bool {
        self.index.contains_key(widget_id)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Dispatches the events queued before this call, in order, to every
    /// component handling their type. Returns the number of events drained.
    /// Stops at the first handler error.
    pub fn update(&mut self) -> Result<usize> {
        let snapshot = self.queue.take();
        let count = snapshot.len();
        for event in &snapshot {
            for component in self.components.iter_mut() {
                if component.handled.contains(&event.event_type) {
                    trace!("dispatch {} to '{}'", event.event_type, component.widget_id);
                    (component.handler)(event, &mut self.queue)?;
                }
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests;
