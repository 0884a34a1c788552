//! Vizij Animation Schedule (backend-agnostic)
//!
//! Declarative, reusable animation schedules. A schedule collects property
//! animations, keyframe sets, clip and transform animations, and caller-built
//! native animations on two layers: a composition backend and a timeline
//! backend. Starting a schedule compiles every descriptor, creates the native
//! animations on the host's backends, starts them, and optionally reports
//! completion through a callback, a cancellation token or a future.
//!
//! Rendering is out of scope; adapters implement the traits in [`backend`].

pub mod backend;
pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod descriptor;
pub mod easing;
pub mod error;
pub mod keyframes;
pub mod property;
pub mod schedule;
pub mod value;

// Re-exports for consumers (adapters)
pub use backend::{AnimationHost, CompletionCallback, CompositionBackend, Layer, TimelineBackend};
pub use cancel::{CancellationRegistration, CancellationToken};
pub use config::{AnimationOptions, ScheduleDefaults, Timing};
pub use coordinator::{Completion, ExecutionCoordinator, RunId, RunOutcome};
pub use descriptor::{
    decompose, validate_spec, Compiled, Descriptor, KeyframeAnimationSpec, Matrix4, TargetHint,
};
pub use easing::{Easing, EasingMode, EasingType, RepeatOption};
pub use error::{MatrixRole, ScheduleError};
pub use keyframes::{
    KeyframeEntry, KeyframePayload, NormalizedKeyframe, NormalizedKeyframeBuilder, TimedKeyframe,
    TimedKeyframeBuilder,
};
pub use property::{paths, Axis, ClipSide, PropertyBuilder, Thickness};
pub use schedule::{AnimationSchedule, ExternalComposition};
pub use value::{Color, KeyframeValue, Value, ValueKind};

pub type Result<T> = core::result::Result<T, ScheduleError>;
