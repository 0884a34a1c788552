#![allow(dead_code)]
//! Recording host shared by the integration tests.
//!
//! Both backends append to one event log so tests can assert ordering across
//! layers. Completion callbacks are parked until a test calls `finish`, which
//! stands in for the backend reaching the end of its animations.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use vizij_animation_schedule::{
    AnimationHost, AnimationSchedule, CompletionCallback, CompositionBackend,
    KeyframeAnimationSpec, Result, ScheduleError, TimelineBackend,
};

pub type Schedule = AnimationSchedule<MockHost>;

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockObject {
    Visual(String),
    Clip(String),
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NativeAnimation {
    pub id: usize,
    pub property: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineChild {
    pub target: String,
    pub property: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CreateComposition(String),
    BeginBatch,
    Start { object: MockObject, property: String },
    EndBatch,
    Stop { object: MockObject, property: String },
    CreateChild { target: String, property: String },
    AddChild { timeline: usize, property: String },
    Begin { timeline: usize, observed: bool },
    StopTimeline(usize),
}

type EventLog = Rc<RefCell<Vec<Event>>>;

fn finish_all(pending: &RefCell<Vec<CompletionCallback>>) -> usize {
    let callbacks = std::mem::take(&mut *pending.borrow_mut());
    let count = callbacks.len();
    for callback in callbacks {
        callback();
    }
    count
}

pub struct MockComposition {
    log: EventLog,
    pub specs: RefCell<Vec<KeyframeAnimationSpec>>,
    pending: RefCell<Vec<CompletionCallback>>,
    next_id: Cell<usize>,
    pub clips_created: Cell<usize>,
    /// Property whose start fails
    pub fail_start: RefCell<Option<String>>,
    /// Fire pending batches when an animation is stopped
    pub complete_on_stop: Cell<bool>,
}

impl MockComposition {
    fn new(log: EventLog) -> Self {
        Self {
            log,
            specs: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            clips_created: Cell::new(0),
            fail_start: RefCell::new(None),
            complete_on_stop: Cell::new(false),
        }
    }

    /// Complete every closed batch; returns how many fired
    pub fn finish(&self) -> usize {
        finish_all(&self.pending)
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl CompositionBackend for MockComposition {
    type Target = str;
    type Object = MockObject;
    type Animation = NativeAnimation;
    type Batch = ();

    fn visual(&self, target: &str) -> Result<MockObject> {
        Ok(MockObject::Visual(target.to_string()))
    }

    fn clip(&self, target: &str) -> Result<MockObject> {
        self.clips_created.set(self.clips_created.get() + 1);
        Ok(MockObject::Clip(target.to_string()))
    }

    fn create_animation(&self, spec: &KeyframeAnimationSpec) -> Result<NativeAnimation> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.specs.borrow_mut().push(spec.clone());
        self.log
            .borrow_mut()
            .push(Event::CreateComposition(spec.property.clone()));
        Ok(NativeAnimation {
            id,
            property: spec.property.clone(),
        })
    }

    fn begin_batch(&self) {
        self.log.borrow_mut().push(Event::BeginBatch);
    }

    fn start_animation(
        &self,
        object: &MockObject,
        property_path: &str,
        _animation: &NativeAnimation,
    ) -> Result<()> {
        if self.fail_start.borrow().as_deref() == Some(property_path) {
            return Err(ScheduleError::backend(format!(
                "cannot start '{property_path}'"
            )));
        }
        self.log.borrow_mut().push(Event::Start {
            object: object.clone(),
            property: property_path.to_string(),
        });
        Ok(())
    }

    fn end_batch(&self, _batch: (), on_completed: CompletionCallback) {
        self.log.borrow_mut().push(Event::EndBatch);
        self.pending.borrow_mut().push(on_completed);
    }

    fn stop_animation(&self, object: &MockObject, property_path: &str) {
        self.log.borrow_mut().push(Event::Stop {
            object: object.clone(),
            property: property_path.to_string(),
        });
        if self.complete_on_stop.get() {
            self.finish();
        }
    }
}

pub struct MockTimeline {
    log: EventLog,
    pub specs: RefCell<Vec<KeyframeAnimationSpec>>,
    pending: RefCell<Vec<CompletionCallback>>,
    next_timeline: Cell<usize>,
    /// Fail every `begin`
    pub fail_begin: Cell<bool>,
    pub complete_on_stop: Cell<bool>,
}

impl MockTimeline {
    fn new(log: EventLog) -> Self {
        Self {
            log,
            specs: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
            next_timeline: Cell::new(0),
            fail_begin: Cell::new(false),
            complete_on_stop: Cell::new(false),
        }
    }

    pub fn finish(&self) -> usize {
        finish_all(&self.pending)
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl TimelineBackend for MockTimeline {
    type Target = str;
    type Timeline = usize;
    type Animation = TimelineChild;

    fn create_animation(
        &self,
        target: &str,
        spec: &KeyframeAnimationSpec,
    ) -> Result<TimelineChild> {
        self.specs.borrow_mut().push(spec.clone());
        self.log.borrow_mut().push(Event::CreateChild {
            target: target.to_string(),
            property: spec.property.clone(),
        });
        Ok(TimelineChild {
            target: target.to_string(),
            property: spec.property.clone(),
        })
    }

    fn create_timeline(&self) -> usize {
        let id = self.next_timeline.get();
        self.next_timeline.set(id + 1);
        id
    }

    fn add_child(&self, timeline: &usize, animation: TimelineChild) {
        self.log.borrow_mut().push(Event::AddChild {
            timeline: *timeline,
            property: animation.property,
        });
    }

    fn begin(&self, timeline: &usize, on_completed: Option<CompletionCallback>) -> Result<()> {
        if self.fail_begin.get() {
            return Err(ScheduleError::backend("timeline refused to begin"));
        }
        self.log.borrow_mut().push(Event::Begin {
            timeline: *timeline,
            observed: on_completed.is_some(),
        });
        if let Some(callback) = on_completed {
            self.pending.borrow_mut().push(callback);
        }
        Ok(())
    }

    fn stop(&self, timeline: &usize) {
        self.log.borrow_mut().push(Event::StopTimeline(*timeline));
        if self.complete_on_stop.get() {
            self.finish();
        }
    }
}

pub struct MockHost {
    log: EventLog,
    pub composition: MockComposition,
    pub timeline: MockTimeline,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    pub fn new() -> Self {
        let log: EventLog = Rc::default();
        Self {
            composition: MockComposition::new(Rc::clone(&log)),
            timeline: MockTimeline::new(Rc::clone(&log)),
            log,
        }
    }

    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.log.borrow_mut().clear();
    }

    /// `(object, property)` of every composition start, in order
    pub fn starts(&self) -> Vec<(MockObject, String)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Start { object, property } => Some((object.clone(), property.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn stops(&self) -> Vec<(MockObject, String)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Stop { object, property } => Some((object.clone(), property.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn timeline_children(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::AddChild { property, .. } => Some(property.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.log.borrow().iter().filter(|event| predicate(event)).count()
    }
}

impl AnimationHost for MockHost {
    type Target = str;
    type Composition = MockComposition;
    type Timeline = MockTimeline;

    fn composition(&self) -> &MockComposition {
        &self.composition
    }

    fn timeline(&self) -> &MockTimeline {
        &self.timeline
    }
}
