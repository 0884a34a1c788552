mod common;

use std::cell::Cell;
use std::rc::Rc;

use futures::executor::block_on;
use futures::FutureExt;
use vizij_animation_schedule::{
    AnimationOptions, Axis, CancellationToken, ClipSide, Layer, RunOutcome, ScheduleError,
};

use common::{init_logging, ms, Event, MockHost, MockObject, Schedule};

/// Opacity and a Y translation on the composition layer, plus opacity on the
/// timeline delayed by 80 ms
fn mixed_schedule() -> Schedule {
    let mut schedule = Schedule::new();
    schedule
        .opacity(1.0, Some(0.0), AnimationOptions::new())
        .translation_axis(Axis::Y, 0.0, Some(16.0), AnimationOptions::new())
        .opacity(
            1.0,
            None,
            AnimationOptions::new().delay(ms(80)).layer(Layer::Timeline),
        );
    schedule
}

fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
    let hits = Rc::new(Cell::new(0));
    let inner = Rc::clone(&hits);
    (hits, move || inner.set(inner.get() + 1))
}

#[test]
fn callback_fires_once_after_both_backends() {
    init_logging();
    let host = MockHost::new();
    let (hits, on_complete) = counter();
    mixed_schedule()
        .start_with_callback(&host, "card", on_complete)
        .unwrap();

    let events = host.events();
    let begin = events.iter().position(|e| *e == Event::BeginBatch).unwrap();
    let end = events.iter().position(|e| *e == Event::EndBatch).unwrap();
    assert!(begin < end);
    assert!(events.contains(&Event::Begin {
        timeline: 0,
        observed: true
    }));

    // Composition finishes first; the delayed timeline finishes at t=80.
    assert_eq!(host.composition.finish(), 1);
    assert_eq!(hits.get(), 0);
    assert_eq!(host.timeline.finish(), 1);
    assert_eq!(hits.get(), 1);
}

#[test]
fn callback_waits_only_for_used_backends() {
    let host = MockHost::new();
    let mut schedule = Schedule::new();
    schedule.opacity(0.0, None, AnimationOptions::new().layer(Layer::Timeline));
    let (hits, on_complete) = counter();
    schedule.start_with_callback(&host, "card", on_complete).unwrap();

    assert_eq!(host.composition.pending(), 0);
    host.timeline.finish();
    assert_eq!(hits.get(), 1);
}

#[test]
fn empty_schedule_completes_immediately() {
    let host = MockHost::new();
    let (hits, on_complete) = counter();
    Schedule::new()
        .start_with_callback(&host, "card", on_complete)
        .unwrap();
    assert_eq!(hits.get(), 1);
    assert!(host.events().is_empty());

    let outcome = block_on(Schedule::new().start_async(&host, "card").unwrap());
    assert_eq!(outcome, RunOutcome::Completed);
}

#[test]
fn backend_start_failure_propagates() {
    let host = MockHost::new();
    *host.composition.fail_start.borrow_mut() = Some("Translation.Y".into());
    let err = mixed_schedule().start(&host, "card").unwrap_err();
    assert!(matches!(err, ScheduleError::Backend { .. }));
    assert_eq!(err.category(), "backend");
    // The animation started before the failure is stopped again.
    assert_eq!(host.starts().len(), 1);
    assert_eq!(
        host.stops(),
        vec![(MockObject::Visual("card".into()), "Opacity".to_string())]
    );
    assert_eq!(host.count(|e| matches!(e, Event::Begin { .. })), 0);
}

#[test]
fn failed_cancellable_start_leaves_nothing_running() {
    let host = MockHost::shared();
    *host.composition.fail_start.borrow_mut() = Some("Translation.Y".into());
    let token = CancellationToken::new();

    let err = mixed_schedule()
        .start_cancellable(&host, "card", &token)
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Backend { .. }));
    assert_eq!(
        host.stops(),
        vec![(MockObject::Visual("card".into()), "Opacity".to_string())]
    );
    assert_eq!(token.listener_count(), 0);

    // Nothing is left for the token to stop.
    token.cancel();
    assert_eq!(host.stops().len(), 1);
}

#[test]
fn timeline_begin_failure_stops_the_composition() {
    let host = MockHost::new();
    host.timeline.fail_begin.set(true);
    let (hits, on_complete) = counter();

    let err = mixed_schedule()
        .start_with_callback(&host, "card", on_complete)
        .unwrap_err();
    assert!(matches!(err, ScheduleError::Backend { .. }));
    assert_eq!(
        host.stops(),
        vec![
            (MockObject::Visual("card".into()), "Opacity".to_string()),
            (MockObject::Visual("card".into()), "Translation.Y".to_string()),
        ]
    );
    // The timeline never began, so it is not stopped.
    assert_eq!(host.count(|e| matches!(e, Event::StopTimeline(_))), 0);

    host.composition.finish();
    assert_eq!(hits.get(), 0);
}

#[test]
fn cancellation_stops_every_started_animation_once() {
    let host = MockHost::shared();
    let token = CancellationToken::new();
    let mut schedule = mixed_schedule();
    schedule.clip_side(
        ClipSide::Left,
        0.0,
        Some(20.0),
        AnimationOptions::new(),
    );
    schedule.start_cancellable(&host, "card", &token).unwrap();
    assert_eq!(token.listener_count(), 1);

    token.cancel();
    token.cancel();

    assert_eq!(
        host.stops(),
        vec![
            (MockObject::Visual("card".into()), "Opacity".to_string()),
            (MockObject::Visual("card".into()), "Translation.Y".to_string()),
            (MockObject::Clip("card".into()), "LeftInset".to_string()),
        ]
    );
    assert_eq!(host.count(|e| matches!(e, Event::StopTimeline(_))), 1);
}

#[test]
fn cancelling_after_completion_does_nothing() {
    let host = MockHost::shared();
    let token = CancellationToken::new();
    mixed_schedule()
        .start_cancellable(&host, "card", &token)
        .unwrap();

    host.composition.finish();
    host.timeline.finish();
    assert_eq!(token.listener_count(), 0);

    token.cancel();
    assert!(host.stops().is_empty());
    assert_eq!(host.count(|e| matches!(e, Event::StopTimeline(_))), 0);
}

#[test]
fn already_cancelled_token_starts_nothing() {
    let host = MockHost::shared();
    let token = CancellationToken::new();
    token.cancel();

    mixed_schedule()
        .start_cancellable(&host, "card", &token)
        .unwrap();
    let outcome = block_on(
        mixed_schedule()
            .start_async_cancellable(&host, "card", &token)
            .unwrap(),
    );

    assert_eq!(outcome, RunOutcome::Cancelled);
    assert!(host.events().is_empty());
}

#[test]
fn one_token_cancels_runs_on_many_targets() {
    let host = MockHost::shared();
    let token = CancellationToken::new();
    let mut schedule = Schedule::new();
    schedule.opacity(0.0, None, AnimationOptions::new());
    schedule.start_cancellable(&host, "a", &token).unwrap();
    schedule.start_cancellable(&host, "b", &token).unwrap();

    token.cancel();

    let objects: Vec<MockObject> = host.stops().into_iter().map(|(o, _)| o).collect();
    assert_eq!(
        objects,
        vec![MockObject::Visual("a".into()), MockObject::Visual("b".into())]
    );
}

#[test]
fn separate_tokens_cancel_only_their_own_run() {
    let host = MockHost::shared();
    let token_a = CancellationToken::new();
    let token_b = CancellationToken::new();
    let mut schedule = Schedule::new();
    schedule.opacity(0.0, None, AnimationOptions::new());
    schedule.start_cancellable(&host, "a", &token_a).unwrap();
    schedule.start_cancellable(&host, "b", &token_b).unwrap();

    token_a.cancel();

    assert_eq!(
        host.stops(),
        vec![(MockObject::Visual("a".into()), "Opacity".to_string())]
    );
    assert_eq!(token_a.listener_count(), 0);
    assert_eq!(token_b.listener_count(), 1);

    token_b.cancel();
    assert_eq!(host.stops().len(), 2);
}

#[test]
fn awaitable_run_resolves_after_all_backends() {
    let host = MockHost::new();
    let mut completion = mixed_schedule().start_async(&host, "card").unwrap();

    assert!((&mut completion).now_or_never().is_none());
    host.composition.finish();
    assert!((&mut completion).now_or_never().is_none());
    host.timeline.finish();
    assert_eq!(block_on(completion), RunOutcome::Completed);
}

#[test]
fn awaitable_run_resolves_cancelled() {
    let host = MockHost::shared();
    let token = CancellationToken::new();
    let completion = mixed_schedule()
        .start_async_cancellable(&host, "card", &token)
        .unwrap();

    host.composition.finish();
    token.cancel();

    assert_eq!(block_on(completion), RunOutcome::Cancelled);
    assert_eq!(host.stops().len(), 2);
    assert_eq!(host.count(|e| matches!(e, Event::StopTimeline(_))), 1);
}

#[test]
fn stop_completing_the_backends_still_reports_cancelled() {
    let host = MockHost::shared();
    host.composition.complete_on_stop.set(true);
    host.timeline.complete_on_stop.set(true);
    let token = CancellationToken::new();
    let completion = mixed_schedule()
        .start_async_cancellable(&host, "card", &token)
        .unwrap();

    token.cancel();

    assert_eq!(block_on(completion), RunOutcome::Cancelled);
}

#[test]
fn awaitable_run_completes_when_not_cancelled() {
    let host = MockHost::shared();
    let token = CancellationToken::new();
    let completion = mixed_schedule()
        .start_async_cancellable(&host, "card", &token)
        .unwrap();

    host.composition.finish();
    host.timeline.finish();
    assert_eq!(block_on(completion), RunOutcome::Completed);
    assert_eq!(token.listener_count(), 0);

    token.cancel();
    assert!(host.stops().is_empty());
}

#[test]
fn fire_and_forget_does_not_observe_completion() {
    let host = MockHost::new();
    mixed_schedule().start(&host, "card").unwrap();
    assert_eq!(host.composition.pending(), 0);
    assert_eq!(host.timeline.pending(), 0);
    assert!(host.events().contains(&Event::Begin {
        timeline: 0,
        observed: false
    }));
}
