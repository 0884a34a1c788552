//! Value: the closed set of shapes an animation can interpolate.
//! All numeric components use f32; colors are 8-bit RGBA.

use nalgebra::{UnitQuaternion, Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScheduleError;

/// Coarse kind of a [`Value`]. A descriptor and all of its keyframes share one kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Bool,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Color,
    Quat,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Bool => "Bool",
            ValueKind::Float => "Float",
            ValueKind::Vec2 => "Vec2",
            ValueKind::Vec3 => "Vec3",
            ValueKind::Vec4 => "Vec4",
            ValueKind::Color => "Color",
            ValueKind::Quat => "Quat",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 8-bit RGBA color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Result<Self, ScheduleError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(ScheduleError::invalid_argument(
                "color",
                format!("expected #RRGGBB or #RRGGBBAA, got '{hex}'"),
            ));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| {
                ScheduleError::invalid_argument("color", format!("invalid hex digits in '{hex}'"))
            })
        };
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

/// A single animatable value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// Boolean (step)
    Bool(bool),
    /// Scalar float
    Float(f32),
    /// 2D vector
    Vec2([f32; 2]),
    /// 3D vector
    Vec3([f32; 3]),
    /// 4D vector
    Vec4([f32; 4]),
    /// RGBA color
    Color(Color),
    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Float(_) => ValueKind::Float,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Color(_) => ValueKind::Color,
            Value::Quat(_) => ValueKind::Quat,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        if let Value::Float(v) = self {
            Some(*v)
        } else {
            None
        }
    }
}

/// Rust types that map onto exactly one [`ValueKind`].
///
/// Keyframe builders and typed schedule methods are generic over this trait, so
/// the kind of a descriptor is fixed by the type it was built with.
pub trait KeyframeValue: Copy {
    const KIND: ValueKind;

    fn into_value(self) -> Value;
}

impl KeyframeValue for bool {
    const KIND: ValueKind = ValueKind::Bool;
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl KeyframeValue for f32 {
    const KIND: ValueKind = ValueKind::Float;
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl KeyframeValue for [f32; 2] {
    const KIND: ValueKind = ValueKind::Vec2;
    fn into_value(self) -> Value {
        Value::Vec2(self)
    }
}

impl KeyframeValue for [f32; 3] {
    const KIND: ValueKind = ValueKind::Vec3;
    fn into_value(self) -> Value {
        Value::Vec3(self)
    }
}

impl KeyframeValue for [f32; 4] {
    const KIND: ValueKind = ValueKind::Vec4;
    fn into_value(self) -> Value {
        Value::Vec4(self)
    }
}

impl KeyframeValue for Vector2<f32> {
    const KIND: ValueKind = ValueKind::Vec2;
    fn into_value(self) -> Value {
        Value::Vec2([self.x, self.y])
    }
}

impl KeyframeValue for Vector3<f32> {
    const KIND: ValueKind = ValueKind::Vec3;
    fn into_value(self) -> Value {
        Value::Vec3([self.x, self.y, self.z])
    }
}

impl KeyframeValue for Vector4<f32> {
    const KIND: ValueKind = ValueKind::Vec4;
    fn into_value(self) -> Value {
        Value::Vec4([self.x, self.y, self.z, self.w])
    }
}

impl KeyframeValue for Color {
    const KIND: ValueKind = ValueKind::Color;
    fn into_value(self) -> Value {
        Value::Color(self)
    }
}

impl KeyframeValue for UnitQuaternion<f32> {
    const KIND: ValueKind = ValueKind::Quat;
    fn into_value(self) -> Value {
        Value::Quat([self.i, self.j, self.k, self.w])
    }
}
