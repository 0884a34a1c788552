//! Easing curves and repeat behavior shared by every descriptor.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Family of an easing curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EasingType {
    Linear,
    Sine,
    Quadratic,
    Cubic,
    Quartic,
    Quintic,
    Exponential,
    Circle,
    Back,
    Bounce,
    Elastic,
}

impl EasingType {
    /// Get the name of this easing type
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Sine => "sine",
            Self::Quadratic => "quadratic",
            Self::Cubic => "cubic",
            Self::Quartic => "quartic",
            Self::Quintic => "quintic",
            Self::Exponential => "exponential",
            Self::Circle => "circle",
            Self::Back => "back",
            Self::Bounce => "bounce",
            Self::Elastic => "elastic",
        }
    }
}

impl TryFrom<&str> for EasingType {
    type Error = ScheduleError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Ok(match s.to_lowercase().as_str() {
            "linear" => Self::Linear,
            "sine" => Self::Sine,
            "quadratic" => Self::Quadratic,
            "cubic" => Self::Cubic,
            "quartic" => Self::Quartic,
            "quintic" => Self::Quintic,
            "exponential" => Self::Exponential,
            "circle" => Self::Circle,
            "back" => Self::Back,
            "bounce" => Self::Bounce,
            "elastic" => Self::Elastic,
            other => {
                return Err(ScheduleError::invalid_argument(
                    "easing_type",
                    format!("unknown easing type '{other}'"),
                ))
            }
        })
    }
}

/// Which end(s) of the curve the easing applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EasingMode {
    EaseOut,
    EaseIn,
    EaseInOut,
}

/// Control points `(x1, y1, x2, y2)` of a cubic bezier timing curve.
pub type BezierControlPoints = [f32; 4];

/// An easing curve: a type plus a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Easing {
    pub ty: EasingType,
    pub mode: EasingMode,
}

impl Default for Easing {
    fn default() -> Self {
        crate::config::DEFAULT_EASING
    }
}

impl Easing {
    pub const LINEAR: Easing = Easing::new(EasingType::Linear, EasingMode::EaseOut);

    #[inline]
    pub const fn new(ty: EasingType, mode: EasingMode) -> Self {
        Self { ty, mode }
    }

    #[inline]
    pub fn is_linear(&self) -> bool {
        self.ty == EasingType::Linear
    }

    /// Cubic bezier approximation used by curve-only backends.
    ///
    /// Returns `None` for linear easing (no curve needed) and for the
    /// oscillating families, which have no bezier form.
    pub fn cubic_bezier(&self) -> Option<BezierControlPoints> {
        use EasingMode::*;
        use EasingType::*;
        let points = match (self.ty, self.mode) {
            (Linear, _) | (Bounce, _) | (Elastic, _) => return None,
            (Sine, EaseIn) => [0.12, 0.0, 0.39, 0.0],
            (Sine, EaseOut) => [0.61, 1.0, 0.88, 1.0],
            (Sine, EaseInOut) => [0.37, 0.0, 0.63, 1.0],
            (Quadratic, EaseIn) => [0.11, 0.0, 0.5, 0.0],
            (Quadratic, EaseOut) => [0.5, 1.0, 0.89, 1.0],
            (Quadratic, EaseInOut) => [0.45, 0.0, 0.55, 1.0],
            (Cubic, EaseIn) => [0.32, 0.0, 0.67, 0.0],
            (Cubic, EaseOut) => [0.33, 1.0, 0.68, 1.0],
            (Cubic, EaseInOut) => [0.65, 0.0, 0.35, 1.0],
            (Quartic, EaseIn) => [0.5, 0.0, 0.75, 0.0],
            (Quartic, EaseOut) => [0.25, 1.0, 0.5, 1.0],
            (Quartic, EaseInOut) => [0.76, 0.0, 0.24, 1.0],
            (Quintic, EaseIn) => [0.64, 0.0, 0.78, 0.0],
            (Quintic, EaseOut) => [0.22, 1.0, 0.36, 1.0],
            (Quintic, EaseInOut) => [0.83, 0.0, 0.17, 1.0],
            (Exponential, EaseIn) => [0.7, 0.0, 0.84, 0.0],
            (Exponential, EaseOut) => [0.16, 1.0, 0.3, 1.0],
            (Exponential, EaseInOut) => [0.87, 0.0, 0.13, 1.0],
            (Circle, EaseIn) => [0.55, 0.0, 1.0, 0.45],
            (Circle, EaseOut) => [0.0, 0.55, 0.45, 1.0],
            (Circle, EaseInOut) => [0.85, 0.0, 0.15, 1.0],
            (Back, EaseIn) => [0.36, 0.0, 0.66, -0.56],
            (Back, EaseOut) => [0.34, 1.56, 0.64, 1.0],
            (Back, EaseInOut) => [0.68, -0.6, 0.32, 1.6],
        };
        Some(points)
    }
}

/// How many times an animation plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepeatOption {
    /// Play a fixed number of times (at least one)
    Count(u32),
    /// Loop until stopped
    Forever,
}

impl Default for RepeatOption {
    fn default() -> Self {
        Self::ONCE
    }
}

impl RepeatOption {
    pub const ONCE: RepeatOption = RepeatOption::Count(1);

    /// Repeat `count` times; zero iterations is rejected.
    pub fn count(count: u32) -> Result<Self, ScheduleError> {
        if count == 0 {
            return Err(ScheduleError::invalid_argument(
                "repeat",
                "repeat count must be greater than 0",
            ));
        }
        Ok(Self::Count(count))
    }

    #[inline]
    pub fn is_forever(&self) -> bool {
        matches!(self, Self::Forever)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bezier_points_exist_for_curve_families() {
        let ease = Easing::new(EasingType::Cubic, EasingMode::EaseOut);
        assert_eq!(ease.cubic_bezier(), Some([0.33, 1.0, 0.68, 1.0]));
        assert_eq!(Easing::LINEAR.cubic_bezier(), None);
        assert_eq!(
            Easing::new(EasingType::Bounce, EasingMode::EaseIn).cubic_bezier(),
            None
        );
    }

    #[test]
    fn easing_type_parsing() {
        assert_eq!(EasingType::try_from("Quintic").unwrap(), EasingType::Quintic);
        assert!(EasingType::try_from("wobble").is_err());
    }

    #[test]
    fn repeat_count_rejects_zero() {
        assert_eq!(RepeatOption::count(3).unwrap(), RepeatOption::Count(3));
        assert!(matches!(
            RepeatOption::count(0),
            Err(ScheduleError::InvalidArgument { .. })
        ));
        assert_eq!(RepeatOption::default(), RepeatOption::ONCE);
    }
}
