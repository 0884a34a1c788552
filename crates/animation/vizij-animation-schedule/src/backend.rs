//! Backend collaborator traits.
//!
//! A schedule never talks to a renderer directly. Adapters implement
//! [`CompositionBackend`] (retained, expression-capable animations started per
//! object and property path) and [`TimelineBackend`] (animations grouped as
//! children of one aggregate timeline), then bundle them in an
//! [`AnimationHost`] that is passed to every `start` call.
//!
//! Completion callbacks must be invoked on the thread that issued the start,
//! and at most once each.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::descriptor::KeyframeAnimationSpec;
use crate::value::ValueKind;
use crate::Result;

/// Callback fired once when a backend group finishes
pub type CompletionCallback = Box<dyn FnOnce() + 'static>;

/// Which backend a descriptor runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Compositor-style backend
    Composition,
    /// Property-system timeline backend
    Timeline,
}

impl Layer {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Composition => "composition",
            Self::Timeline => "timeline",
        }
    }

    /// Whether values of `kind` can be animated on this layer
    pub fn supports_kind(&self, kind: ValueKind) -> bool {
        match self {
            Self::Composition => true,
            Self::Timeline => matches!(kind, ValueKind::Float | ValueKind::Vec2 | ValueKind::Color),
        }
    }

    /// Whether keyframes on this layer may hold expressions
    #[inline]
    pub fn supports_expressions(&self) -> bool {
        matches!(self, Self::Composition)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compositor-style backend: animations are started on an object + property
/// path and observed through batches.
pub trait CompositionBackend {
    /// The visual element a schedule is started against
    type Target: ?Sized;
    /// A backend object that can host animations (a visual, a clip, ...)
    type Object: Clone + fmt::Debug + 'static;
    /// A native animation, reusable across starts
    type Animation: Clone + fmt::Debug;
    /// Group of animations observed together
    type Batch;

    /// Backend object of the target itself
    fn visual(&self, target: &Self::Target) -> Result<Self::Object>;

    /// Clip object attached to the target's visual, created on first use
    fn clip(&self, target: &Self::Target) -> Result<Self::Object>;

    fn create_animation(&self, spec: &KeyframeAnimationSpec) -> Result<Self::Animation>;

    /// Open a batch; animations started until [`end_batch`](Self::end_batch) belong to it
    fn begin_batch(&self) -> Self::Batch;

    fn start_animation(
        &self,
        object: &Self::Object,
        property_path: &str,
        animation: &Self::Animation,
    ) -> Result<()>;

    /// Close a batch; `on_completed` fires once every member has finished
    fn end_batch(&self, batch: Self::Batch, on_completed: CompletionCallback);

    fn stop_animation(&self, object: &Self::Object, property_path: &str);
}

/// Timeline-style backend: animations are children of one aggregate timeline
/// that is started and stopped as a unit.
pub trait TimelineBackend {
    type Target: ?Sized;
    /// Aggregate timeline handle
    type Timeline: Clone + fmt::Debug + 'static;
    /// A child animation, already bound to its element and property
    type Animation: Clone + fmt::Debug;

    fn create_animation(
        &self,
        target: &Self::Target,
        spec: &KeyframeAnimationSpec,
    ) -> Result<Self::Animation>;

    fn create_timeline(&self) -> Self::Timeline;

    fn add_child(&self, timeline: &Self::Timeline, animation: Self::Animation);

    /// Start the timeline; `on_completed` fires once all children finish
    fn begin(
        &self,
        timeline: &Self::Timeline,
        on_completed: Option<CompletionCallback>,
    ) -> Result<()>;

    fn stop(&self, timeline: &Self::Timeline);
}

/// Both backends for one kind of target.
pub trait AnimationHost {
    type Target: ?Sized;
    type Composition: CompositionBackend<Target = Self::Target>;
    type Timeline: TimelineBackend<Target = Self::Target>;

    fn composition(&self) -> &Self::Composition;

    fn timeline(&self) -> &Self::Timeline;
}

/// Object type of a host's composition backend
pub type CompositionObject<H> =
    <<H as AnimationHost>::Composition as CompositionBackend>::Object;
/// Native animation type of a host's composition backend
pub type CompositionAnimation<H> =
    <<H as AnimationHost>::Composition as CompositionBackend>::Animation;
/// Aggregate timeline type of a host's timeline backend
pub type TimelineHandle<H> = <<H as AnimationHost>::Timeline as TimelineBackend>::Timeline;
/// Child animation type of a host's timeline backend
pub type TimelineAnimation<H> = <<H as AnimationHost>::Timeline as TimelineBackend>::Animation;
