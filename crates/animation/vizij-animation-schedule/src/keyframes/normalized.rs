use std::marker::PhantomData;

use crate::easing::Easing;
use crate::keyframes::{KeyframeEntry, KeyframePayload, NormalizedKeyframe};
use crate::value::KeyframeValue;

/// Builds keyframes positioned by normalized progress.
///
/// Entries keep insertion order; positions are not sorted or validated, and
/// values outside `[0, 1]` are left for the backend to clamp.
#[derive(Debug, Clone)]
pub struct NormalizedKeyframeBuilder<T> {
    entries: Vec<NormalizedKeyframe>,
    _kind: PhantomData<T>,
}

impl<T: KeyframeValue> Default for NormalizedKeyframeBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: KeyframeValue> NormalizedKeyframeBuilder<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Add a keyframe holding `value` at `progress`
    pub fn append(&mut self, progress: f32, value: T, easing: Easing) -> &mut Self {
        self.entries.push(KeyframeEntry {
            position: progress,
            payload: KeyframePayload::Value(value.into_value()),
            easing,
        });
        self
    }

    /// Add a keyframe whose value is an expression.
    ///
    /// Only the composition backend evaluates expressions; starting a
    /// timeline animation that contains one fails with a configuration error.
    pub fn append_expression(
        &mut self,
        progress: f32,
        expression: impl Into<String>,
        easing: Easing,
    ) -> &mut Self {
        self.entries.push(KeyframeEntry {
            position: progress,
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

    pub fn into_entries(self) -> Vec<NormalizedKeyframe> {
        self.entries
    }
}
