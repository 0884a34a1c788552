//! Keyframe builders.
//!
//! A builder accumulates `(position, payload, easing)` entries for a single
//! property. [`NormalizedKeyframeBuilder`] positions entries by progress in
//! `[0, 1]`; [`TimedKeyframeBuilder`] positions them by absolute offset and is
//! normalized against its last entry when the schedule is started.

pub mod normalized;
pub mod timed;

pub use normalized::NormalizedKeyframeBuilder;
pub use timed::{normalize_timed, TimedKeyframeBuilder};

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::value::Value;

/// What a keyframe resolves to: a literal value or a backend expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum KeyframePayload {
    Value(Value),
    /// Expression string evaluated by the composition backend
    Expression(String),
}

impl KeyframePayload {
    #[inline]
    pub fn is_expression(&self) -> bool {
        matches!(self, Self::Expression(_))
    }
}

/// One keyframe positioned by `P` (normalized progress or absolute time).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyframeEntry<P> {
    pub position: P,
    pub payload: KeyframePayload,
    pub easing: Easing,
}

/// Keyframe positioned by progress in `[0, 1]`
pub type NormalizedKeyframe = KeyframeEntry<f32>;

/// Keyframe positioned by an offset from the animation start
pub type TimedKeyframe = KeyframeEntry<Duration>;
