use std::marker::PhantomData;
use std::time::Duration;

use crate::easing::Easing;
use crate::keyframes::{KeyframeEntry, KeyframePayload, NormalizedKeyframe, TimedKeyframe};
use crate::value::KeyframeValue;

/// Builds keyframes positioned by absolute offsets from the animation start.
#[derive(Debug, Clone)]
pub struct TimedKeyframeBuilder<T> {
    entries: Vec<TimedKeyframe>,
    _kind: PhantomData<T>,
}

impl<T: KeyframeValue> Default for TimedKeyframeBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: KeyframeValue> TimedKeyframeBuilder<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Add a keyframe holding `value` at `time`
    pub fn append(&mut self, time: Duration, value: T, easing: Easing) -> &mut Self {
        self.entries.push(KeyframeEntry {
            position: time,
            payload: KeyframePayload::Value(value.into_value()),
            easing,
        });
        self
    }

    /// Add an expression keyframe at `time` (composition backend only)
    pub fn append_expression(
        &mut self,
        time: Duration,
        expression: impl Into<String>,
        easing: Easing,
    ) -> &mut Self {
        self.entries.push(KeyframeEntry {
            position: time,
            payload: KeyframePayload::Expression(expression.into()),
            easing,
        });
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<TimedKeyframe> {
        self.entries
    }
}

/// Convert timed keyframes into a duration plus normalized keyframes.
///
/// The duration is the position of the *last appended* entry, not the largest
/// one. Each progress is `position / duration` clamped to `[0, 1]`; with a zero
/// duration every progress is 0.
pub fn normalize_timed(entries: &[TimedKeyframe]) -> (Duration, Vec<NormalizedKeyframe>) {
    let duration = entries.last().map(|e| e.position).unwrap_or(Duration::ZERO);
    let total = duration.as_secs_f64();
    let normalized = entries
        .iter()
        .map(|entry| {
            let progress = if total > 0.0 {
                (entry.position.as_secs_f64() / total).clamp(0.0, 1.0)
            } else {
                0.0
            };
            KeyframeEntry {
                position: progress as f32,
                payload: entry.payload.clone(),
                easing: entry.easing,
            }
        })
        .collect();
    (duration, normalized)
}
