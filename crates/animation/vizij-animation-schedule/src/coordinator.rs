//! Starting a schedule on a target.
//!
//! Every start runs in two phases. `prepare` compiles every descriptor of
//! both layers and creates the native animations, without starting anything,
//! so a configuration error leaves the target untouched. `launch` then starts
//! the composition animations in append order (inside a batch when completion
//! is observed) and begins the timeline.
//!
//! Completion is joined across the backends that actually have work: a
//! schedule that only uses one layer completes when that layer does.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, Either, FutureExt, LocalBoxFuture};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::{
    AnimationHost, CompletionCallback, CompositionAnimation, CompositionBackend,
    CompositionObject, Layer, TimelineBackend, TimelineHandle,
};
use crate::cancel::{CancellationRegistration, CancellationToken};
use crate::descriptor::{Compiled, Descriptor, TargetHint};
use crate::schedule::AnimationSchedule;
use crate::Result;

/// Identifier of a single start, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[inline]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of one start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    NotStarted,
    Running { active_backends: usize },
    Completed,
    Cancelled,
}

/// How an awaited start ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

/// Future returned by the awaitable start modes.
///
/// The animations run whether or not this is polled; dropping it only stops
/// observing them.
pub struct Completion {
    inner: LocalBoxFuture<'static, RunOutcome>,
}

impl Completion {
    fn new(inner: LocalBoxFuture<'static, RunOutcome>) -> Self {
        Self { inner }
    }

    fn ready(outcome: RunOutcome) -> Self {
        Self::new(future::ready(outcome).boxed_local())
    }
}

impl Future for Completion {
    type Output = RunOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<RunOutcome> {
        self.inner.poll_unpin(cx)
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").finish_non_exhaustive()
    }
}

/// Invokes its callback once every expected backend has signalled.
struct CompletionJoin {
    remaining: Cell<usize>,
    on_complete: RefCell<Option<CompletionCallback>>,
}

impl CompletionJoin {
    fn new(expected: usize, on_complete: CompletionCallback) -> Rc<Self> {
        Rc::new(Self {
            remaining: Cell::new(expected),
            on_complete: RefCell::new(Some(on_complete)),
        })
    }

    fn signal(&self) {
        let remaining = self.remaining.get().saturating_sub(1);
        self.remaining.set(remaining);
        if remaining == 0 {
            let callback = self.on_complete.borrow_mut().take();
            if let Some(callback) = callback {
                callback();
            }
        }
    }

    fn callback(join: &Rc<Self>) -> CompletionCallback {
        let join = Rc::clone(join);
        Box::new(move || join.signal())
    }
}

/// Per-backend completion callbacks handed to `launch`
#[derive(Default)]
struct Completions {
    composition: Option<CompletionCallback>,
    timeline: Option<CompletionCallback>,
}

/// What a started run needs to be stopped again.
pub(crate) struct ExecutionHandle<H: AnimationHost> {
    id: RunId,
    started: RefCell<Vec<(CompositionObject<H>, String)>>,
    timeline: RefCell<Option<TimelineHandle<H>>>,
    state: Cell<RunState>,
}

impl<H: AnimationHost> ExecutionHandle<H> {
    fn new(id: RunId) -> Self {
        Self {
            id,
            started: RefCell::new(Vec::new()),
            timeline: RefCell::new(None),
            state: Cell::new(RunState::NotStarted),
        }
    }

    #[inline]
    pub(crate) fn state(&self) -> RunState {
        self.state.get()
    }

    #[inline]
    fn is_running(&self) -> bool {
        matches!(self.state.get(), RunState::Running { .. })
    }

    fn complete(&self) {
        if self.is_running() {
            self.state.set(RunState::Completed);
            debug!("run {} completed", self.id);
        }
    }

    /// Stop everything this run started. Does nothing unless the run is still running.
    fn cancel(&self, host: &H) {
        let RunState::Running { active_backends } = self.state.get() else {
            return;
        };
        self.state.set(RunState::Cancelled);
        let composition = host.composition();
        for (object, property) in self.started.borrow().iter() {
            trace!("run {}: stopping '{property}' on {object:?}", self.id);
            composition.stop_animation(object, property);
        }
        if let Some(timeline) = self.timeline.borrow().as_ref() {
            host.timeline().stop(timeline);
        }
        debug!("run {} cancelled; {active_backends} backend(s) stopped", self.id);
    }
}

struct PreparedAnimation<H: AnimationHost> {
    object: CompositionObject<H>,
    property: String,
    animation: CompositionAnimation<H>,
}

/// A run whose native animations exist but have not been started.
struct PreparedRun<H: AnimationHost> {
    id: RunId,
    composition: Vec<PreparedAnimation<H>>,
    timeline: Option<TimelineHandle<H>>,
}

fn compile_all<X>(descriptors: &[Descriptor<X>], layer: Layer) -> Result<Vec<Compiled<'_, X>>> {
    let mut compiled = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let parts = descriptor.compile(layer).map_err(|err| {
            warn!("'{}' on the {layer} layer: {err}", descriptor.label());
            err
        })?;
        compiled.extend(parts);
    }
    Ok(compiled)
}

fn resolve_object<O: Clone>(slot: &mut Option<O>, create: impl FnOnce() -> Result<O>) -> Result<O> {
    if let Some(object) = slot {
        return Ok(object.clone());
    }
    let object = create()?;
    *slot = Some(object.clone());
    Ok(object)
}

impl<H: AnimationHost> PreparedRun<H> {
    fn prepare(schedule: &AnimationSchedule<H>, host: &H, target: &H::Target) -> Result<Self> {
        if let Some(err) = schedule.pending_error() {
            return Err(err.clone());
        }
        let composition_compiled =
            compile_all(schedule.composition_descriptors(), Layer::Composition)?;
        let timeline_compiled = compile_all(schedule.timeline_descriptors(), Layer::Timeline)?;

        let id = RunId::new();
        let backend = host.composition();
        let mut visual = None;
        let mut clip = None;
        let mut composition = Vec::with_capacity(composition_compiled.len());
        for compiled in composition_compiled {
            let prepared = match compiled {
                Compiled::Keyframes { target: hint, spec } => {
                    let object = match hint {
                        TargetHint::Visual => {
                            resolve_object(&mut visual, || backend.visual(target))?
                        }
                        TargetHint::Clip => resolve_object(&mut clip, || backend.clip(target))?,
                    };
                    let animation = backend.create_animation(&spec)?;
                    PreparedAnimation {
                        object,
                        property: spec.property,
                        animation,
                    }
                }
                Compiled::External(external) => {
                    let object = match &external.target {
                        Some(object) => object.clone(),
                        None => resolve_object(&mut visual, || backend.visual(target))?,
                    };
                    PreparedAnimation {
                        object,
                        property: external.property.clone(),
                        animation: external.animation.clone(),
                    }
                }
            };
            composition.push(prepared);
        }

        let timeline = if timeline_compiled.is_empty() {
            None
        } else {
            let backend = host.timeline();
            let mut children = Vec::with_capacity(timeline_compiled.len());
            for compiled in timeline_compiled {
                let child = match compiled {
                    Compiled::Keyframes { spec, .. } => backend.create_animation(target, &spec)?,
                    Compiled::External(animation) => animation.clone(),
                };
                children.push(child);
            }
            let timeline = backend.create_timeline();
            for child in children {
                backend.add_child(&timeline, child);
            }
            Some(timeline)
        };

        debug!(
            "run {id} prepared: {} composition animation(s), timeline {}",
            composition.len(),
            if timeline.is_some() { "used" } else { "unused" }
        );
        Ok(Self {
            id,
            composition,
            timeline,
        })
    }

    /// Number of backends that have work in this run
    fn active_backends(&self) -> usize {
        usize::from(!self.composition.is_empty()) + usize::from(self.timeline.is_some())
    }

    /// Build one completion callback per active backend
    fn completions(&self, mut make: impl FnMut(Layer) -> CompletionCallback) -> Completions {
        let mut completions = Completions::default();
        if !self.composition.is_empty() {
            completions.composition = Some(make(Layer::Composition));
        }
        if self.timeline.is_some() {
            completions.timeline = Some(make(Layer::Timeline));
        }
        completions
    }

    /// Start everything. On a backend error, whatever was already started is
    /// stopped again before the error is returned.
    fn launch(self, host: &H, completions: Completions, handle: &ExecutionHandle<H>) -> Result<()> {
        let id = self.id;
        self.start_all(host, completions, handle).map_err(|err| {
            warn!("run {id}: rolling back after start failure");
            handle.cancel(host);
            err
        })
    }

    fn start_all(
        self,
        host: &H,
        completions: Completions,
        handle: &ExecutionHandle<H>,
    ) -> Result<()> {
        let Completions {
            composition: composition_done,
            timeline: timeline_done,
        } = completions;
        handle.state.set(RunState::Running {
            active_backends: self.active_backends(),
        });

        if !self.composition.is_empty() {
            let backend = host.composition();
            let batch = composition_done.as_ref().map(|_| backend.begin_batch());
            for prepared in self.composition {
                backend
                    .start_animation(&prepared.object, &prepared.property, &prepared.animation)
                    .map_err(|err| {
                        warn!(
                            "run {}: starting '{}' failed: {err}",
                            self.id, prepared.property
                        );
                        err
                    })?;
                trace!(
                    "run {}: started '{}' on {:?}",
                    self.id,
                    prepared.property,
                    prepared.object
                );
                handle
                    .started
                    .borrow_mut()
                    .push((prepared.object, prepared.property));
            }
            if let (Some(batch), Some(done)) = (batch, composition_done) {
                backend.end_batch(batch, done);
            }
        }

        if let Some(timeline) = self.timeline {
            host.timeline().begin(&timeline, timeline_done).map_err(|err| {
                warn!("run {}: beginning timeline failed: {err}", self.id);
                err
            })?;
            trace!("run {}: timeline begun", self.id);
            *handle.timeline.borrow_mut() = Some(timeline);
        }
        Ok(())
    }
}

/// One oneshot channel per active backend, joined into a single future
struct CompletionChannels {
    composition: Option<oneshot::Sender<()>>,
    timeline: Option<oneshot::Sender<()>>,
}

impl CompletionChannels {
    fn open<H: AnimationHost>(run: &PreparedRun<H>) -> (Self, LocalBoxFuture<'static, RunOutcome>) {
        fn channel(used: bool) -> (Option<oneshot::Sender<()>>, LocalBoxFuture<'static, bool>) {
            if used {
                let (tx, rx) = oneshot::channel();
                (Some(tx), rx.map(|received| received.is_ok()).boxed_local())
            } else {
                (None, future::ready(true).boxed_local())
            }
        }
        let (composition, composition_rx) = channel(!run.composition.is_empty());
        let (timeline, timeline_rx) = channel(run.timeline.is_some());
        // A backend that drops its callback without calling it never completes.
        let joined = future::join(composition_rx, timeline_rx)
            .map(|(composition, timeline)| {
                if composition && timeline {
                    RunOutcome::Completed
                } else {
                    RunOutcome::Cancelled
                }
            })
            .boxed_local();
        (
            Self {
                composition,
                timeline,
            },
            joined,
        )
    }

    fn take(&mut self, layer: Layer) -> Option<oneshot::Sender<()>> {
        match layer {
            Layer::Composition => self.composition.take(),
            Layer::Timeline => self.timeline.take(),
        }
    }

    fn callback(&mut self, layer: Layer) -> CompletionCallback {
        let sender = self.take(layer);
        Box::new(move || {
            if let Some(sender) = sender {
                let _ = sender.send(());
            }
        })
    }
}

/// Starts a schedule against a host in one of four observation modes.
pub struct ExecutionCoordinator<'s, H: AnimationHost> {
    schedule: &'s AnimationSchedule<H>,
}

impl<'s, H: AnimationHost> ExecutionCoordinator<'s, H> {
    pub fn new(schedule: &'s AnimationSchedule<H>) -> Self {
        Self { schedule }
    }

    /// Fire and forget
    pub fn start(&self, host: &H, target: &H::Target) -> Result<()> {
        let run = PreparedRun::prepare(self.schedule, host, target)?;
        let handle = ExecutionHandle::new(run.id);
        run.launch(host, Completions::default(), &handle)?;
        debug!("run {} started without observation", handle.id);
        Ok(())
    }

    /// `on_complete` runs exactly once, after every active backend has finished.
    /// An empty schedule completes immediately.
    pub fn start_with_callback(
        &self,
        host: &H,
        target: &H::Target,
        on_complete: CompletionCallback,
    ) -> Result<()> {
        let run = PreparedRun::prepare(self.schedule, host, target)?;
        let active = run.active_backends();
        if active == 0 {
            debug!("run {} has nothing to animate", run.id);
            on_complete();
            return Ok(());
        }
        let handle = ExecutionHandle::new(run.id);
        let join = CompletionJoin::new(active, on_complete);
        let completions = run.completions(|_| CompletionJoin::callback(&join));
        run.launch(host, completions, &handle)?;
        debug!("run {} started on {active} backend(s)", handle.id);
        Ok(())
    }

    /// Start on `target`; cancelling `token` before completion stops the run
    pub fn start_cancellable(
        &self,
        host: &Rc<H>,
        target: &H::Target,
        token: &CancellationToken,
    ) -> Result<()>
    where
        H: 'static,
    {
        if token.is_cancelled() {
            debug!("token already cancelled; nothing started");
            return Ok(());
        }
        let run = PreparedRun::prepare(self.schedule, host, target)?;
        launch_cancellable(run, host, token, |_| None, None)?;
        Ok(())
    }

    pub fn start_async(&self, host: &H, target: &H::Target) -> Result<Completion> {
        let run = PreparedRun::prepare(self.schedule, host, target)?;
        if run.active_backends() == 0 {
            debug!("run {} has nothing to animate", run.id);
            return Ok(Completion::ready(RunOutcome::Completed));
        }
        let handle = ExecutionHandle::new(run.id);
        let (mut channels, joined) = CompletionChannels::open(&run);
        let completions = run.completions(|layer| channels.callback(layer));
        run.launch(host, completions, &handle)?;
        debug!("run {} started; awaiting completion", handle.id);
        Ok(Completion::new(joined))
    }

    pub fn start_async_cancellable(
        &self,
        host: &Rc<H>,
        target: &H::Target,
        token: &CancellationToken,
    ) -> Result<Completion>
    where
        H: 'static,
    {
        if token.is_cancelled() {
            debug!("token already cancelled; nothing started");
            return Ok(Completion::ready(RunOutcome::Cancelled));
        }
        let run = PreparedRun::prepare(self.schedule, host, target)?;
        if run.active_backends() == 0 {
            debug!("run {} has nothing to animate", run.id);
            return Ok(Completion::ready(RunOutcome::Completed));
        }
        let (mut channels, joined) = CompletionChannels::open(&run);
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let on_cancel: Box<dyn FnOnce()> = Box::new(move || {
            let _ = cancel_tx.send(());
        });
        let handle = launch_cancellable(
            run,
            host,
            token,
            |layer| Some(channels.callback(layer)),
            Some(on_cancel),
        )?;

        let outcome = async move {
            let outcome = match future::select(joined, cancel_rx).await {
                Either::Left((outcome, _)) => outcome,
                Either::Right((Ok(()), _)) => RunOutcome::Cancelled,
                // Token dropped without cancelling.
                Either::Right((Err(_), joined)) => joined.await,
            };
            // Stopping may complete the backends before the cancel signal is seen.
            if handle.state() == RunState::Cancelled {
                RunOutcome::Cancelled
            } else {
                outcome
            }
        };
        Ok(Completion::new(outcome.boxed_local()))
    }
}

/// Launch `run` and wire `token` to stop it until it completes.
///
/// `extra` supplies an additional callback per backend that fires alongside
/// the completion join; `on_cancel` runs after the run has been stopped.
fn launch_cancellable<H>(
    run: PreparedRun<H>,
    host: &Rc<H>,
    token: &CancellationToken,
    mut extra: impl FnMut(Layer) -> Option<CompletionCallback>,
    on_cancel: Option<Box<dyn FnOnce()>>,
) -> Result<Rc<ExecutionHandle<H>>>
where
    H: AnimationHost + 'static,
{
    let handle = Rc::new(ExecutionHandle::new(run.id));
    let active = run.active_backends();
    if active == 0 {
        debug!("run {} has nothing to animate", run.id);
        return Ok(handle);
    }

    let registration: Rc<RefCell<Option<CancellationRegistration>>> = Rc::default();
    let join = {
        let handle = Rc::clone(&handle);
        let registration = Rc::clone(&registration);
        CompletionJoin::new(
            active,
            Box::new(move || {
                handle.complete();
                let registration = registration.borrow_mut().take();
                drop(registration);
            }),
        )
    };
    let completions = run.completions(|layer| {
        let joined = CompletionJoin::callback(&join);
        match extra(layer) {
            Some(extra) => {
                let both: CompletionCallback = Box::new(move || {
                    joined();
                    extra();
                });
                both
            }
            None => joined,
        }
    });
    run.launch(host, completions, &handle)?;

    let listener = {
        let handle = Rc::clone(&handle);
        let host = Rc::clone(host);
        move || {
            handle.cancel(&host);
            if let Some(on_cancel) = on_cancel {
                on_cancel();
            }
        }
    };
    let registered = token.register(listener);
    if handle.is_running() {
        *registration.borrow_mut() = Some(registered);
    }
    debug!("run {} started on {active} backend(s), cancellable", handle.id);
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_fires_once_after_all_signals() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let join = CompletionJoin::new(2, Box::new(move || counter.set(counter.get() + 1)));

        join.signal();
        assert_eq!(hits.get(), 0);
        join.signal();
        assert_eq!(hits.get(), 1);
        join.signal();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn ready_completion_resolves() {
        let outcome = futures::executor::block_on(Completion::ready(RunOutcome::Cancelled));
        assert_eq!(outcome, RunOutcome::Cancelled);
    }
}
