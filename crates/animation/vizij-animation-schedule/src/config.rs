//! Defaults and per-call options for schedule builders.
//!
//! Every timing parameter resolves in the same order: the explicit value in
//! [`AnimationOptions`], else the schedule's [`ScheduleDefaults`], whose own
//! `Default` is the fixed global constants below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::Layer;
use crate::easing::{Easing, EasingMode, EasingType, RepeatOption};
use crate::error::ScheduleError;

pub const DEFAULT_DELAY: Duration = Duration::ZERO;
pub const DEFAULT_DURATION: Duration = Duration::from_millis(400);
pub const DEFAULT_EASING: Easing = Easing::new(EasingType::Cubic, EasingMode::EaseOut);
pub const DEFAULT_REPEAT: RepeatOption = RepeatOption::ONCE;
pub const DEFAULT_LAYER: Layer = Layer::Composition;

/// Schedule-level defaults applied to every append that leaves a value unset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleDefaults {
    pub delay: Duration,
    pub duration: Duration,
    pub easing: Easing,
    pub repeat: RepeatOption,
    pub layer: Layer,
}

impl Default for ScheduleDefaults {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            duration: DEFAULT_DURATION,
            easing: DEFAULT_EASING,
            repeat: DEFAULT_REPEAT,
            layer: DEFAULT_LAYER,
        }
    }
}

impl ScheduleDefaults {
    /// Parse defaults from JSON; missing fields keep their global defaults.
    pub fn from_json(json: &str) -> Result<Self, ScheduleError> {
        let defaults: Self = serde_json::from_str(json)?;
        defaults.validate()?;
        Ok(defaults)
    }

    /// Validate the defaults
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.duration.is_zero() {
            return Err(ScheduleError::invalid_argument(
                "duration",
                "default duration must be greater than 0",
            ));
        }
        if self.repeat == RepeatOption::Count(0) {
            return Err(ScheduleError::invalid_argument(
                "repeat",
                "default repeat count must be greater than 0",
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[inline]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[inline]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[inline]
    pub fn with_repeat(mut self, repeat: RepeatOption) -> Self {
        self.repeat = repeat;
        self
    }

    #[inline]
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }
}

/// Explicit per-call arguments. Unset fields fall back to [`ScheduleDefaults`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationOptions {
    pub delay: Option<Duration>,
    pub duration: Option<Duration>,
    pub repeat: Option<RepeatOption>,
    pub easing_type: Option<EasingType>,
    pub easing_mode: Option<EasingMode>,
    pub layer: Option<Layer>,
}

impl AnimationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn repeat(mut self, repeat: RepeatOption) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn easing_type(mut self, ty: EasingType) -> Self {
        self.easing_type = Some(ty);
        self
    }

    pub fn easing_mode(mut self, mode: EasingMode) -> Self {
        self.easing_mode = Some(mode);
        self
    }

    pub fn easing(self, easing: Easing) -> Self {
        self.easing_type(easing.ty).easing_mode(easing.mode)
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Fill every unset field from `defaults`.
    pub fn resolve(&self, defaults: &ScheduleDefaults) -> Timing {
        Timing {
            delay: self.delay.unwrap_or(defaults.delay),
            duration: self.duration.unwrap_or(defaults.duration),
            repeat: self.repeat.unwrap_or(defaults.repeat),
            easing: Easing::new(
                self.easing_type.unwrap_or(defaults.easing.ty),
                self.easing_mode.unwrap_or(defaults.easing.mode),
            ),
        }
    }

    pub fn resolve_layer(&self, defaults: &ScheduleDefaults) -> Layer {
        self.layer.unwrap_or(defaults.layer)
    }
}

/// Fully resolved timing stored on a descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub delay: Duration,
    pub duration: Duration,
    pub repeat: RepeatOption,
    pub easing: Easing,
}

impl Default for Timing {
    fn default() -> Self {
        AnimationOptions::default().resolve(&ScheduleDefaults::default())
    }
}
