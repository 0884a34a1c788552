//! Animation descriptors and their compilation into backend-neutral specs.
//!
//! A [`Descriptor`] is what a schedule stores for every append. It is compiled
//! once per `start`, against the layer it was appended to, into one or more
//! [`Compiled`] entries: either a [`KeyframeAnimationSpec`] that the backend turns
//! into a native animation, or a caller-supplied native animation passed
//! through untouched.

pub mod transform;

use std::convert::Infallible;
use std::time::Duration;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::backend::Layer;
use crate::config::Timing;
use crate::easing::{Easing, RepeatOption};
use crate::error::{MatrixRole, ScheduleError};
use crate::keyframes::{
    normalize_timed, KeyframeEntry, KeyframePayload, NormalizedKeyframe, TimedKeyframe,
};
use crate::property::{paths, ClipSide};
use crate::value::{KeyframeValue, Value, ValueKind};
use crate::Result;

pub use transform::{decompose, Decomposed, Matrix4};

/// One declarative animation held by a schedule.
///
/// `X` is the payload of [`Descriptor::External`], which differs per backend.
#[derive(Debug, Clone)]
pub enum Descriptor<X> {
    /// Animate `property` towards `to`, optionally starting from `from`
    SimpleValue {
        property: String,
        to: Value,
        from: Option<Value>,
        timing: Timing,
    },
    /// Keyframes positioned by normalized progress
    NormalizedKeyframes {
        property: String,
        kind: ValueKind,
        entries: Vec<NormalizedKeyframe>,
        delay: Duration,
        duration: Duration,
        repeat: RepeatOption,
    },
    /// Keyframes positioned by absolute time; the duration is derived
    TimedKeyframes {
        property: String,
        kind: ValueKind,
        entries: Vec<TimedKeyframe>,
        delay: Duration,
        repeat: RepeatOption,
    },
    /// One inset of the clip object attached to the target
    ClipScalar {
        side: ClipSide,
        to: f32,
        from: Option<f32>,
        timing: Timing,
    },
    /// A full transform, split into scale, orientation and translation
    TransformComposite {
        to: Matrix4,
        from: Option<Matrix4>,
        timing: Timing,
    },
    /// A native animation supplied by the caller
    External(X),
}

/// Object a compiled animation must be started on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetHint {
    /// The target's own visual
    Visual,
    /// The clip object attached to the target's visual
    Clip,
}

/// Backend-neutral description of a keyframe animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeAnimationSpec {
    /// Property path on the object the animation is started on
    pub property: String,
    pub kind: ValueKind,
    pub keyframes: Vec<NormalizedKeyframe>,
    pub delay: Duration,
    pub duration: Duration,
    pub repeat: RepeatOption,
}

/// Result of compiling a descriptor
#[derive(Debug)]
pub enum Compiled<'a, X> {
    Keyframes {
        target: TargetHint,
        spec: KeyframeAnimationSpec,
    },
    External(&'a X),
}

impl<X> Descriptor<X> {
    /// Build a [`Descriptor::SimpleValue`] from typed endpoints
    pub fn simple<T: KeyframeValue>(
        property: impl Into<String>,
        to: T,
        from: Option<T>,
        timing: Timing,
    ) -> Self {
        Self::SimpleValue {
            property: property.into(),
            to: to.into_value(),
            from: from.map(KeyframeValue::into_value),
            timing,
        }
    }

    /// Short label used in logs and error messages
    pub fn label(&self) -> String {
        match self {
            Self::SimpleValue { property, .. }
            | Self::NormalizedKeyframes { property, .. }
            | Self::TimedKeyframes { property, .. } => property.clone(),
            Self::ClipScalar { side, .. } => format!("Clip.{}", side.property_path()),
            Self::TransformComposite { .. } => "Transform".to_string(),
            Self::External(_) => "external".to_string(),
        }
    }

    /// Compile this descriptor for `layer`.
    ///
    /// Nothing is created on any backend here; every capability check happens
    /// before the coordinator starts anything.
    pub fn compile(&self, layer: Layer) -> Result<Vec<Compiled<'_, X>>> {
        let compiled = match self {
            Self::SimpleValue {
                property,
                to,
                from,
                timing,
            } => {
                if let Some(from) = from {
                    if from.kind() != to.kind() {
                        return Err(ScheduleError::configuration(format!(
                            "'{property}' mixes {} and {} values",
                            from.kind(),
                            to.kind()
                        )));
                    }
                }
                vec![keyframes(
                    TargetHint::Visual,
                    simple_spec(property, to.clone(), from.clone(), timing),
                    layer,
                )?]
            }
            Self::NormalizedKeyframes {
                property,
                kind,
                entries,
                delay,
                duration,
                repeat,
            } => {
                let spec = KeyframeAnimationSpec {
                    property: property.clone(),
                    kind: *kind,
                    keyframes: entries.clone(),
                    delay: *delay,
                    duration: *duration,
                    repeat: *repeat,
                };
                vec![keyframes(TargetHint::Visual, spec, layer)?]
            }
            Self::TimedKeyframes {
                property,
                kind,
                entries,
                delay,
                repeat,
            } => {
                let (duration, keyframes_normalized) = normalize_timed(entries);
                let spec = KeyframeAnimationSpec {
                    property: property.clone(),
                    kind: *kind,
                    keyframes: keyframes_normalized,
                    delay: *delay,
                    duration,
                    repeat: *repeat,
                };
                vec![keyframes(TargetHint::Visual, spec, layer)?]
            }
            Self::ClipScalar {
                side,
                to,
                from,
                timing,
            } => {
                require_composition(layer, "clip")?;
                let spec = simple_spec(
                    side.property_path(),
                    Value::Float(*to),
                    from.map(Value::Float),
                    timing,
                );
                vec![keyframes(TargetHint::Clip, spec, layer)?]
            }
            Self::TransformComposite { to, from, timing } => {
                require_composition(layer, "transform")?;
                let to = decompose(to).ok_or(ScheduleError::Decomposition {
                    matrix: MatrixRole::To,
                })?;
                let from = match from {
                    Some(matrix) => Some(decompose(matrix).ok_or(ScheduleError::Decomposition {
                        matrix: MatrixRole::From,
                    })?),
                    None => None,
                };
                let vec3 = |v: Vector3<f32>| Value::Vec3([v.x, v.y, v.z]);
                let parts = [
                    (paths::SCALE, vec3(to.scale), from.map(|f| vec3(f.scale))),
                    (
                        paths::ORIENTATION,
                        to.rotation.into_value(),
                        from.map(|f| f.rotation.into_value()),
                    ),
                    (
                        paths::TRANSLATION,
                        vec3(to.translation),
                        from.map(|f| vec3(f.translation)),
                    ),
                ];
                parts
                    .into_iter()
                    .map(|(path, to, from)| {
                        keyframes(TargetHint::Visual, simple_spec(path, to, from, timing), layer)
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            Self::External(handle) => vec![Compiled::External(handle)],
        };
        Ok(compiled)
    }
}

impl Descriptor<Infallible> {
    /// Re-type a descriptor that cannot hold an external payload
    pub fn into_external<X>(self) -> Descriptor<X> {
        match self {
            Self::SimpleValue {
                property,
                to,
                from,
                timing,
            } => Descriptor::SimpleValue {
                property,
                to,
                from,
                timing,
            },
            Self::NormalizedKeyframes {
                property,
                kind,
                entries,
                delay,
                duration,
                repeat,
            } => Descriptor::NormalizedKeyframes {
                property,
                kind,
                entries,
                delay,
                duration,
                repeat,
            },
            Self::TimedKeyframes {
                property,
                kind,
                entries,
                delay,
                repeat,
            } => Descriptor::TimedKeyframes {
                property,
                kind,
                entries,
                delay,
                repeat,
            },
            Self::ClipScalar {
                side,
                to,
                from,
                timing,
            } => Descriptor::ClipScalar {
                side,
                to,
                from,
                timing,
            },
            Self::TransformComposite { to, from, timing } => {
                Descriptor::TransformComposite { to, from, timing }
            }
            Self::External(never) => match never {},
        }
    }
}

fn simple_spec(
    property: &str,
    to: Value,
    from: Option<Value>,
    timing: &Timing,
) -> KeyframeAnimationSpec {
    let kind = to.kind();
    let mut keyframes = Vec::with_capacity(2);
    if let Some(from) = from {
        keyframes.push(KeyframeEntry {
            position: 0.0,
            payload: KeyframePayload::Value(from),
            easing: timing.easing,
        });
    }
    keyframes.push(KeyframeEntry {
        position: 1.0,
        payload: KeyframePayload::Value(to),
        easing: timing.easing,
    });
    KeyframeAnimationSpec {
        property: property.to_string(),
        kind,
        keyframes,
        delay: timing.delay,
        duration: timing.duration,
        repeat: timing.repeat,
    }
}

fn require_composition(layer: Layer, what: &str) -> Result<()> {
    if layer != Layer::Composition {
        return Err(ScheduleError::configuration(format!(
            "{what} animations require the composition layer, not {layer}"
        )));
    }
    Ok(())
}

fn keyframes<'a, X>(
    target: TargetHint,
    spec: KeyframeAnimationSpec,
    layer: Layer,
) -> Result<Compiled<'a, X>> {
    validate_spec(&spec, layer)?;
    Ok(Compiled::Keyframes { target, spec })
}

/// Check that `layer` can run `spec` as written.
pub fn validate_spec(spec: &KeyframeAnimationSpec, layer: Layer) -> Result<()> {
    let property = &spec.property;
    if !layer.supports_kind(spec.kind) {
        return Err(ScheduleError::configuration(format!(
            "{} values are not supported on the {layer} layer ('{property}')",
            spec.kind
        )));
    }
    for keyframe in &spec.keyframes {
        match &keyframe.payload {
            KeyframePayload::Value(value) if value.kind() != spec.kind => {
                return Err(ScheduleError::configuration(format!(
                    "'{property}' keyframe holds a {} value in a {} animation",
                    value.kind(),
                    spec.kind
                )));
            }
            KeyframePayload::Expression(_) if !layer.supports_expressions() => {
                return Err(ScheduleError::configuration(format!(
                    "expression keyframes are not supported on the {layer} layer ('{property}')"
                )));
            }
            _ => {}
        }
        if layer == Layer::Composition && !bezier_compatible(&keyframe.easing) {
            return Err(ScheduleError::configuration(format!(
                "{} easing has no curve form on the {layer} layer ('{property}')",
                keyframe.easing.ty.name()
            )));
        }
    }
    Ok(())
}

#[inline]
fn bezier_compatible(easing: &Easing) -> bool {
    easing.is_linear() || easing.cubic_bezier().is_some()
}
