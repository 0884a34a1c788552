//! Property names, axis and clip selectors, and the property-bound builder.
//!
//! Property paths are semantic names such as `"Scale.X"`. The composition
//! backend uses them as-is; timeline backends map them to their own property
//! system.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::backend::{AnimationHost, Layer};
use crate::config::AnimationOptions;
use crate::error::ScheduleError;
use crate::keyframes::{NormalizedKeyframeBuilder, TimedKeyframeBuilder};
use crate::schedule::AnimationSchedule;
use crate::value::KeyframeValue;

/// Semantic property paths understood by both backends
pub mod paths {
    pub const OPACITY: &str = "Opacity";
    pub const TRANSLATION: &str = "Translation";
    pub const OFFSET: &str = "Offset";
    pub const SCALE: &str = "Scale";
    pub const CENTER_POINT: &str = "CenterPoint";
    pub const ANCHOR_POINT: &str = "AnchorPoint";
    pub const ROTATION: &str = "RotationAngle";
    pub const ROTATION_IN_DEGREES: &str = "RotationAngleInDegrees";
    pub const ROTATION_AXIS: &str = "RotationAxis";
    pub const ORIENTATION: &str = "Orientation";
    pub const SIZE: &str = "Size";
}

/// Vector component selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Z => "Z",
        }
    }

    /// `"Translation"` + `Axis::Y` -> `"Translation.Y"`
    pub fn path(&self, property: &str) -> String {
        format!("{property}.{}", self.name())
    }
}

impl TryFrom<&str> for Axis {
    type Error = ScheduleError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "x" | "X" => Ok(Self::X),
            "y" | "Y" => Ok(Self::Y),
            "z" | "Z" => Ok(Self::Z),
            other => Err(ScheduleError::invalid_argument(
                "axis",
                format!("expected X, Y or Z, got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Edge of the clip object attached to a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipSide {
    Left,
    Top,
    Right,
    Bottom,
}

impl ClipSide {
    pub const ALL: [ClipSide; 4] = [Self::Left, Self::Top, Self::Right, Self::Bottom];

    /// Property path on the clip object
    #[inline]
    pub fn property_path(&self) -> &'static str {
        match self {
            Self::Left => "LeftInset",
            Self::Top => "TopInset",
            Self::Right => "RightInset",
            Self::Bottom => "BottomInset",
        }
    }
}

impl TryFrom<&str> for ClipSide {
    type Error = ScheduleError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "top" => Ok(Self::Top),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            _ => Err(ScheduleError::invalid_argument(
                "side",
                format!("expected left, top, right or bottom, got '{s}'"),
            )),
        }
    }
}

/// Inset of each clip edge
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Thickness {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Thickness {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    #[inline]
    pub fn side(&self, side: ClipSide) -> f32 {
        match side {
            ClipSide::Left => self.left,
            ClipSide::Top => self.top,
            ClipSide::Right => self.right,
            ClipSide::Bottom => self.bottom,
        }
    }
}

/// A property name and layer bound once, forwarding to the keyframe API.
pub struct PropertyBuilder<'s, H: AnimationHost, T> {
    schedule: &'s mut AnimationSchedule<H>,
    property: String,
    layer: Layer,
    _kind: PhantomData<T>,
}

impl<'s, H: AnimationHost, T: KeyframeValue> PropertyBuilder<'s, H, T> {
    pub(crate) fn new(
        schedule: &'s mut AnimationSchedule<H>,
        property: impl Into<String>,
        layer: Layer,
    ) -> Self {
        Self {
            schedule,
            property: property.into(),
            layer,
            _kind: PhantomData,
        }
    }

    #[inline]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[inline]
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Append normalized keyframes for the bound property
    pub fn normalized_keyframes<F>(
        self,
        build: F,
        options: AnimationOptions,
    ) -> &'s mut AnimationSchedule<H>
    where
        F: FnOnce(&mut NormalizedKeyframeBuilder<T>),
    {
        self.schedule
            .normalized_keyframes(self.property, build, options.layer(self.layer))
    }

    /// Append timed keyframes for the bound property
    pub fn timed_keyframes<F>(
        self,
        build: F,
        options: AnimationOptions,
    ) -> &'s mut AnimationSchedule<H>
    where
        F: FnOnce(&mut TimedKeyframeBuilder<T>),
    {
        self.schedule
            .timed_keyframes(self.property, build, options.layer(self.layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_paths_and_parsing() {
        assert_eq!(Axis::X.path(paths::SCALE), "Scale.X");
        assert_eq!(Axis::try_from("z").unwrap(), Axis::Z);
        assert!(matches!(
            Axis::try_from("w"),
            Err(ScheduleError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn clip_sides() {
        assert_eq!(ClipSide::try_from("Bottom").unwrap(), ClipSide::Bottom);
        assert!(ClipSide::try_from("middle").is_err());
        let inset = Thickness::new(1.0, 2.0, 3.0, 4.0);
        let values: Vec<f32> = ClipSide::ALL.iter().map(|s| inset.side(*s)).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
