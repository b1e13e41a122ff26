use progress_core::{JobTimer, ProgressError, RunState};

#[test]
fn non_positive_duration_is_rejected() {
    for duration in [0, -1, i64::MIN] {
        let err = JobTimer::start(duration, 0).unwrap_err();
        assert!(matches!(
            err,
            ProgressError::InvalidDuration { duration_ms } if duration_ms == duration
        ));
    }
}

#[test]
fn percent_is_floored_and_clamped() {
    let mut timer = JobTimer::start(3000, 1_000).unwrap();
    assert_eq!(timer.tick(1_000), 0);
    assert_eq!(timer.tick(1_029), 0);
    assert_eq!(timer.tick(1_030), 1);
    assert_eq!(timer.tick(2_999), 66);
    assert_eq!(timer.tick(10_000), 100);
    assert_eq!(timer.state(), RunState::Completed);
}

#[test]
fn ticks_before_start_read_as_zero() {
    let mut timer = JobTimer::start(1000, 500).unwrap();
    assert_eq!(timer.tick(100), 0);
}

#[test]
fn progress_never_decreases_while_running() {
    let mut timer = JobTimer::start(1000, 0).unwrap();
    let mut previous = 0;
    for now in [0, 50, 120, 90, 300, 299, 301, 700, 10, 999] {
        let percent = timer.tick(now);
        assert!(percent >= previous, "{percent} < {previous} at {now}");
        previous = percent;
    }
}

#[test]
fn pause_freezes_progress() {
    let mut timer = JobTimer::start(1000, 0).unwrap();
    assert_eq!(timer.tick(400), 40);
    assert!(timer.pause(400));
    assert_eq!(timer.tick(900), 40);
    assert_eq!(timer.tick(5_000), 40);
    assert_eq!(timer.state(), RunState::Paused);
}

#[test]
fn paused_time_is_excluded_from_elapsed() {
    let mut timer = JobTimer::start(1000, 0).unwrap();
    assert_eq!(timer.tick(300), 30);
    timer.pause(300);
    timer.resume(2_300);
    assert_eq!(timer.paused_accumulated_ms(), 2_000);
    assert_eq!(timer.tick(2_300), 30);
    assert_eq!(timer.tick(2_999), 99);
    assert_eq!(timer.state(), RunState::Running);
    assert_eq!(timer.tick(3_000), 100);
}

#[test]
fn repeated_pause_and_stray_resume_are_noops() {
    let mut timer = JobTimer::start(1000, 0).unwrap();
    assert!(!timer.resume(50));
    assert_eq!(timer.paused_accumulated_ms(), 0);

    assert!(timer.pause(100));
    assert!(!timer.pause(200));
    assert!(timer.resume(300));
    assert!(!timer.resume(400));
    assert_eq!(timer.paused_accumulated_ms(), 200);
}

#[test]
fn stop_freezes_and_is_terminal() {
    let mut timer = JobTimer::start(1000, 0).unwrap();
    timer.tick(500);
    assert!(timer.stop());
    assert_eq!(timer.tick(2_000), 50);
    assert!(!timer.resume(2_000));
    assert!(!timer.pause(2_000));
    assert!(!timer.stop());
    assert_eq!(timer.state(), RunState::Stopped);
}

#[test]
fn stopping_a_paused_timer_keeps_its_percent() {
    let mut timer = JobTimer::start(1000, 0).unwrap();
    timer.tick(250);
    timer.pause(250);
    assert!(timer.stop());
    assert_eq!(timer.tick(9_000), 25);
}

#[test]
fn completed_timer_cannot_be_stopped_or_paused() {
    let mut timer = JobTimer::start(10, 0).unwrap();
    assert_eq!(timer.tick(10), 100);
    assert!(!timer.stop());
    assert!(!timer.pause(11));
    assert_eq!(timer.state(), RunState::Completed);
}
