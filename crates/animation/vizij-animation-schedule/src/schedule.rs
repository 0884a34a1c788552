//! The animation schedule: a reusable, append-only list of descriptors per layer.

use std::convert::Infallible;
use std::fmt;
use std::rc::Rc;

use nalgebra::UnitQuaternion;

use crate::backend::{AnimationHost, CompositionBackend, Layer, TimelineAnimation};
use crate::cancel::CancellationToken;
use crate::config::{AnimationOptions, ScheduleDefaults};
use crate::coordinator::{Completion, ExecutionCoordinator};
use crate::descriptor::{Descriptor, Matrix4};
use crate::error::ScheduleError;
use crate::keyframes::{NormalizedKeyframeBuilder, TimedKeyframeBuilder};
use crate::property::{paths, Axis, ClipSide, PropertyBuilder, Thickness};
use crate::value::{Color, KeyframeValue};
use crate::Result;

/// A native composition animation supplied by the caller.
pub struct ExternalComposition<C: CompositionBackend> {
    pub animation: C::Animation,
    /// Property path the animation is started on
    pub property: String,
    /// Object to start on; the target's visual when `None`
    pub target: Option<C::Object>,
}

impl<C: CompositionBackend> Clone for ExternalComposition<C> {
    fn clone(&self) -> Self {
        Self {
            animation: self.animation.clone(),
            property: self.property.clone(),
            target: self.target.clone(),
        }
    }
}

impl<C: CompositionBackend> fmt::Debug for ExternalComposition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalComposition")
            .field("animation", &self.animation)
            .field("property", &self.property)
            .field("target", &self.target)
            .finish()
    }
}

/// Descriptor stored on the composition layer of a schedule for host `H`
pub type CompositionDescriptor<H> =
    Descriptor<ExternalComposition<<H as AnimationHost>::Composition>>;
/// Descriptor stored on the timeline layer of a schedule for host `H`
pub type TimelineDescriptor<H> = Descriptor<TimelineAnimation<H>>;

/// Declarative set of animations that can be started on any number of targets.
///
/// Builder methods append descriptors and return `&mut Self` for chaining.
/// Nothing is validated against a backend until one of the `start` methods
/// runs; the schedule itself is never modified by starting it.
///
/// ```ignore
/// let mut schedule = AnimationSchedule::new();
/// schedule
///     .opacity(1.0, Some(0.0), AnimationOptions::new())
///     .translation_axis(Axis::Y, 0.0, Some(24.0), AnimationOptions::new().delay(ms(50)));
/// let done = schedule.start_async(&host, &element)?;
/// ```
pub struct AnimationSchedule<H: AnimationHost> {
    defaults: ScheduleDefaults,
    composition: Vec<CompositionDescriptor<H>>,
    timeline: Vec<TimelineDescriptor<H>>,
    /// First invalid argument seen while appending; reported by `start`.
    pending_error: Option<ScheduleError>,
}

impl<H: AnimationHost> Default for AnimationSchedule<H> {
    fn default() -> Self {
        Self::with_defaults(ScheduleDefaults::default())
    }
}

impl<H: AnimationHost> fmt::Debug for AnimationSchedule<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationSchedule")
            .field("defaults", &self.defaults)
            .field("composition", &self.composition.len())
            .field("timeline", &self.timeline.len())
            .field("pending_error", &self.pending_error)
            .finish()
    }
}

impl<H: AnimationHost> AnimationSchedule<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalid defaults are recorded and reported by every `start`.
    pub fn with_defaults(defaults: ScheduleDefaults) -> Self {
        let mut schedule = Self {
            defaults: ScheduleDefaults::default(),
            composition: Vec::new(),
            timeline: Vec::new(),
            pending_error: None,
        };
        schedule.set_defaults(defaults);
        schedule
    }

    #[inline]
    pub fn defaults(&self) -> &ScheduleDefaults {
        &self.defaults
    }

    /// Replace the defaults used by subsequent appends
    pub fn set_defaults(&mut self, defaults: ScheduleDefaults) -> &mut Self {
        if let Err(err) = defaults.validate() {
            self.reject(err);
        }
        self.defaults = defaults;
        self
    }

    #[inline]
    pub fn composition_descriptors(&self) -> &[CompositionDescriptor<H>] {
        &self.composition
    }

    #[inline]
    pub fn timeline_descriptors(&self) -> &[TimelineDescriptor<H>] {
        &self.timeline
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.composition.is_empty() && self.timeline.is_empty()
    }

    /// Argument error recorded while appending, if any
    #[inline]
    pub fn pending_error(&self) -> Option<&ScheduleError> {
        self.pending_error.as_ref()
    }

    fn push(&mut self, layer: Layer, descriptor: Descriptor<Infallible>) -> &mut Self {
        match layer {
            Layer::Composition => self.composition.push(descriptor.into_external()),
            Layer::Timeline => self.timeline.push(descriptor.into_external()),
        }
        self
    }

    fn reject(&mut self, error: ScheduleError) -> &mut Self {
        log::warn!("schedule append rejected: {error}");
        self.pending_error.get_or_insert(error);
        self
    }

    /// Animate any property with a typed value
    pub fn animate<T: KeyframeValue>(
        &mut self,
        property: impl Into<String>,
        to: T,
        from: Option<T>,
        options: AnimationOptions,
    ) -> &mut Self {
        let layer = options.resolve_layer(&self.defaults);
        let timing = options.resolve(&self.defaults);
        self.push(layer, Descriptor::simple(property, to, from, timing))
    }

    pub fn opacity(&mut self, to: f32, from: Option<f32>, options: AnimationOptions) -> &mut Self {
        self.animate(paths::OPACITY, to, from, options)
    }

    pub fn translation(
        &mut self,
        to: [f32; 3],
        from: Option<[f32; 3]>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(paths::TRANSLATION, to, from, options)
    }

    /// Animate the X and Y components of the translation together
    pub fn translation_xy(
        &mut self,
        to: [f32; 2],
        from: Option<[f32; 2]>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(format!("{}.XY", paths::TRANSLATION), to, from, options)
    }

    pub fn translation_axis(
        &mut self,
        axis: Axis,
        to: f32,
        from: Option<f32>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(axis.path(paths::TRANSLATION), to, from, options)
    }

    pub fn offset(
        &mut self,
        to: [f32; 3],
        from: Option<[f32; 3]>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(paths::OFFSET, to, from, options)
    }

    pub fn offset_axis(
        &mut self,
        axis: Axis,
        to: f32,
        from: Option<f32>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(axis.path(paths::OFFSET), to, from, options)
    }

    /// Uniform 2D scale.
    ///
    /// On the composition layer this animates `Scale` as `(s, s, 1)`; the
    /// timeline layer has no 3-component values, so it animates `Scale.X` and
    /// `Scale.Y` as two scalar animations.
    pub fn scale(&mut self, to: f32, from: Option<f32>, options: AnimationOptions) -> &mut Self {
        match options.resolve_layer(&self.defaults) {
            Layer::Composition => self.animate(
                paths::SCALE,
                [to, to, 1.0],
                from.map(|f| [f, f, 1.0]),
                options,
            ),
            Layer::Timeline => self
                .animate(Axis::X.path(paths::SCALE), to, from, options)
                .animate(Axis::Y.path(paths::SCALE), to, from, options),
        }
    }

    pub fn scale_xyz(
        &mut self,
        to: [f32; 3],
        from: Option<[f32; 3]>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(paths::SCALE, to, from, options)
    }

    pub fn scale_axis(
        &mut self,
        axis: Axis,
        to: f32,
        from: Option<f32>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(axis.path(paths::SCALE), to, from, options)
    }

    pub fn center_point(
        &mut self,
        to: [f32; 3],
        from: Option<[f32; 3]>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(paths::CENTER_POINT, to, from, options)
    }

    pub fn anchor_point(
        &mut self,
        to: [f32; 2],
        from: Option<[f32; 2]>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(paths::ANCHOR_POINT, to, from, options)
    }

    /// Rotation around the rotation axis, in radians
    pub fn rotation(&mut self, to: f32, from: Option<f32>, options: AnimationOptions) -> &mut Self {
        self.animate(paths::ROTATION, to, from, options)
    }

    pub fn rotation_in_degrees(
        &mut self,
        to: f32,
        from: Option<f32>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(paths::ROTATION_IN_DEGREES, to, from, options)
    }

    pub fn rotation_axis(
        &mut self,
        to: [f32; 3],
        from: Option<[f32; 3]>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(paths::ROTATION_AXIS, to, from, options)
    }

    pub fn orientation(
        &mut self,
        to: UnitQuaternion<f32>,
        from: Option<UnitQuaternion<f32>>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(paths::ORIENTATION, to, from, options)
    }

    pub fn size(
        &mut self,
        to: [f32; 2],
        from: Option<[f32; 2]>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(paths::SIZE, to, from, options)
    }

    /// Size is two-dimensional; [`Axis::Z`] is recorded as an invalid argument.
    pub fn size_axis(
        &mut self,
        axis: Axis,
        to: f32,
        from: Option<f32>,
        options: AnimationOptions,
    ) -> &mut Self {
        if axis == Axis::Z {
            return self.reject(ScheduleError::invalid_argument(
                "axis",
                "Size has no Z component",
            ));
        }
        self.animate(axis.path(paths::SIZE), to, from, options)
    }

    pub fn color(
        &mut self,
        property: impl Into<String>,
        to: Color,
        from: Option<Color>,
        options: AnimationOptions,
    ) -> &mut Self {
        self.animate(property, to, from, options)
    }

    /// Animate a full transform; split into scale, orientation and translation
    /// when the schedule is started.
    pub fn transform(
        &mut self,
        to: Matrix4,
        from: Option<Matrix4>,
        options: AnimationOptions,
    ) -> &mut Self {
        let layer = options.resolve_layer(&self.defaults);
        let timing = options.resolve(&self.defaults);
        self.push(layer, Descriptor::TransformComposite { to, from, timing })
    }

    /// Animate all four insets of the target's clip
    pub fn clip(
        &mut self,
        to: Thickness,
        from: Option<Thickness>,
        options: AnimationOptions,
    ) -> &mut Self {
        for side in ClipSide::ALL {
            self.clip_side(side, to.side(side), from.map(|f| f.side(side)), options);
        }
        self
    }

    pub fn clip_side(
        &mut self,
        side: ClipSide,
        to: f32,
        from: Option<f32>,
        options: AnimationOptions,
    ) -> &mut Self {
        let layer = options.resolve_layer(&self.defaults);
        let timing = options.resolve(&self.defaults);
        self.push(
            layer,
            Descriptor::ClipScalar {
                side,
                to,
                from,
                timing,
            },
        )
    }

    /// Append keyframes positioned by normalized progress.
    ///
    /// `options` supplies delay, duration, repeat and layer; easing is set per
    /// keyframe.
    pub fn normalized_keyframes<T, F>(
        &mut self,
        property: impl Into<String>,
        build: F,
        options: AnimationOptions,
    ) -> &mut Self
    where
        T: KeyframeValue,
        F: FnOnce(&mut NormalizedKeyframeBuilder<T>),
    {
        let mut builder = NormalizedKeyframeBuilder::<T>::new();
        build(&mut builder);
        let layer = options.resolve_layer(&self.defaults);
        let timing = options.resolve(&self.defaults);
        self.push(
            layer,
            Descriptor::NormalizedKeyframes {
                property: property.into(),
                kind: T::KIND,
                entries: builder.into_entries(),
                delay: timing.delay,
                duration: timing.duration,
                repeat: timing.repeat,
            },
        )
    }

    /// Append keyframes positioned by absolute time. The animation lasts
    /// until the last appended keyframe; `options.duration` is ignored.
    pub fn timed_keyframes<T, F>(
        &mut self,
        property: impl Into<String>,
        build: F,
        options: AnimationOptions,
    ) -> &mut Self
    where
        T: KeyframeValue,
        F: FnOnce(&mut TimedKeyframeBuilder<T>),
    {
        let mut builder = TimedKeyframeBuilder::<T>::new();
        build(&mut builder);
        let layer = options.resolve_layer(&self.defaults);
        let timing = options.resolve(&self.defaults);
        self.push(
            layer,
            Descriptor::TimedKeyframes {
                property: property.into(),
                kind: T::KIND,
                entries: builder.into_entries(),
                delay: timing.delay,
                repeat: timing.repeat,
            },
        )
    }

    /// Bind a property and layer once, then append keyframes through it
    pub fn property<T: KeyframeValue>(
        &mut self,
        property: impl Into<String>,
        layer: Layer,
    ) -> PropertyBuilder<'_, H, T> {
        PropertyBuilder::new(self, property, layer)
    }

    pub fn opacity_property(&mut self, layer: Layer) -> PropertyBuilder<'_, H, f32> {
        self.property(paths::OPACITY, layer)
    }

    pub fn translation_property(&mut self, layer: Layer) -> PropertyBuilder<'_, H, [f32; 3]> {
        self.property(paths::TRANSLATION, layer)
    }

    pub fn scale_property(&mut self, layer: Layer) -> PropertyBuilder<'_, H, [f32; 3]> {
        self.property(paths::SCALE, layer)
    }

    /// Start a caller-built composition animation along with the schedule
    pub fn external_composition(
        &mut self,
        animation: <H::Composition as CompositionBackend>::Animation,
        property: impl Into<String>,
        target: Option<<H::Composition as CompositionBackend>::Object>,
    ) -> &mut Self {
        self.composition.push(Descriptor::External(ExternalComposition {
            animation,
            property: property.into(),
            target,
        }));
        self
    }

    /// Add a caller-built timeline animation to the schedule's timeline
    pub fn external_timeline(&mut self, animation: TimelineAnimation<H>) -> &mut Self {
        self.timeline.push(Descriptor::External(animation));
        self
    }

    /// Start every animation on `target` without observing completion
    pub fn start(&self, host: &H, target: &H::Target) -> Result<()> {
        ExecutionCoordinator::new(self).start(host, target)
    }

    /// Start on `target` and invoke `on_complete` once every backend has finished
    pub fn start_with_callback(
        &self,
        host: &H,
        target: &H::Target,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<()> {
        ExecutionCoordinator::new(self).start_with_callback(host, target, Box::new(on_complete))
    }

    /// Start on `target`; cancelling `token` stops every animation of this run
    pub fn start_cancellable(
        &self,
        host: &Rc<H>,
        target: &H::Target,
        token: &CancellationToken,
    ) -> Result<()>
    where
        H: 'static,
    {
        ExecutionCoordinator::new(self).start_cancellable(host, target, token)
    }

    /// Start on `target` and return a future resolving when every backend has finished
    pub fn start_async(&self, host: &H, target: &H::Target) -> Result<Completion> {
        ExecutionCoordinator::new(self).start_async(host, target)
    }

    /// Like [`start_async`](Self::start_async), resolving to
    /// [`RunOutcome::Cancelled`](crate::RunOutcome::Cancelled) if `token` fires first
    pub fn start_async_cancellable(
        &self,
        host: &Rc<H>,
        target: &H::Target,
        token: &CancellationToken,
    ) -> Result<Completion>
    where
        H: 'static,
    {
        ExecutionCoordinator::new(self).start_async_cancellable(host, target, token)
    }
}
