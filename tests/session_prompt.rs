//! End-to-end scenarios: a session prompt mounted on a real idle monitor,
//! driven on tokio's paused clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use idle_prompt::activity::{ActivityKind, ActivitySender, ChannelSource};
use idle_prompt::config::{Config, ConfigError};
use idle_prompt::idle::IdleMonitor;
use idle_prompt::prompt::{Logout, NoopLogout, PromptAction, SessionPrompt, Status};
use tokio::time::sleep;

#[derive(Clone, Default)]
struct CountingLogout(Arc<AtomicUsize>);

impl Logout for CountingLogout {
    fn end_session(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn mount(idle_time_seconds: f64) -> (SessionPrompt<IdleMonitor>, ActivitySender, CountingLogout) {
    let config = Config {
        idle_time_seconds,
        ..Default::default()
    };
    let (activity, source) = ChannelSource::new(16);
    let logout = CountingLogout::default();
    let view = SessionPrompt::mount(&config, source, logout.clone()).unwrap();
    (view, activity, logout)
}

#[tokio::test(start_paused = true)]
async fn quiet_period_shows_prompt() {
    let (view, _activity, _) = mount(5.0);
    assert_eq!(view.status(), Status::Active);
    assert!(!view.prompt_visible());

    sleep(Duration::from_millis(5001)).await;

    assert!(view.timer().is_idle());
    assert!(view.prompt_visible());
    assert_eq!(view.status().as_str(), "inactive");
    assert!(view.render().to_string().contains("You will be logged out soon"));
}

#[tokio::test(start_paused = true)]
async fn stay_returns_to_active() {
    let (view, _activity, logout) = mount(5.0);
    sleep(Duration::from_millis(5001)).await;
    assert!(view.prompt_visible());

    view.stay();

    assert!(!view.prompt_visible());
    assert!(!view.timer().is_idle());
    assert_eq!(view.status().as_str(), "active");
    assert_eq!(logout.0.load(Ordering::SeqCst), 0);

    // The window was rearmed, so the prompt comes back after another quiet period
    sleep(Duration::from_millis(4900)).await;
    assert!(!view.prompt_visible());
    sleep(Duration::from_millis(200)).await;
    assert!(view.prompt_visible());
}

#[tokio::test(start_paused = true)]
async fn logout_hides_prompt_but_stays_inactive() {
    let (view, _activity, logout) = mount(5.0);
    sleep(Duration::from_millis(5001)).await;

    view.logout();

    assert!(!view.prompt_visible());
    assert!(view.timer().is_idle());
    assert_eq!(view.status().as_str(), "inactive");
    assert_eq!(logout.0.load(Ordering::SeqCst), 1);

    // No new idle episode without a reset
    sleep(Duration::from_secs(30)).await;
    assert!(!view.prompt_visible());
}

#[tokio::test(start_paused = true)]
async fn activity_keeps_prompt_away() {
    let (view, activity, _) = mount(2.0);

    for kind in [
        ActivityKind::PointerMove,
        ActivityKind::KeyPress,
        ActivityKind::Click,
        ActivityKind::Scroll,
    ]
    .into_iter()
    .cycle()
    .take(12)
    {
        sleep(Duration::from_millis(1500)).await;
        activity.signal(kind).await.unwrap();
    }

    assert!(!view.prompt_visible());
    assert_eq!(view.status(), Status::Active);
}

#[tokio::test(start_paused = true)]
async fn answers_without_prompt_are_ignored() {
    let (view, _activity, logout) = mount(5.0);

    assert!(!view.respond(PromptAction::Logout));
    assert!(!view.respond(PromptAction::Stay));
    assert_eq!(logout.0.load(Ordering::SeqCst), 0);

    sleep(Duration::from_millis(5001)).await;
    assert!(view.respond(PromptAction::Stay));
    assert_eq!(view.status(), Status::Active);
}

#[tokio::test(start_paused = true)]
async fn unmount_stops_monitoring() {
    let (view, _activity, _) = mount(1.0);
    let mut prompt_rx = view.watch_prompt();

    view.unmount();
    sleep(Duration::from_secs(10)).await;

    // The sender is gone with the view and nothing was ever shown
    assert!(!*prompt_rx.borrow_and_update());
}

#[tokio::test(start_paused = true)]
async fn invalid_idle_time_is_rejected() {
    let config = Config {
        idle_time_seconds: 0.0,
        ..Default::default()
    };
    let (_activity, source) = ChannelSource::new(1);

    let result = SessionPrompt::mount(&config, source, NoopLogout);
    assert!(matches!(result, Err(ConfigError::NonPositiveIdleTime(_))));
}

#[tokio::test(start_paused = true)]
async fn closed_source_after_idle_keeps_prompt_consistent() {
    let (view, activity, _) = mount(1.0);
    let idle_rx = view.timer().subscribe();

    sleep(Duration::from_millis(1100)).await;
    drop(activity);
    sleep(Duration::from_millis(10)).await;

    assert!(!view.timer().is_enabled());
    assert_eq!(view.status(), Status::Inactive);
    assert!(view.prompt_visible());
    assert!(*idle_rx.borrow());

    // Answering still works; detection stays off afterwards
    view.stay();
    assert_eq!(view.status(), Status::Active);
    assert!(!view.prompt_visible());

    sleep(Duration::from_secs(10)).await;
    assert_eq!(view.status(), Status::Active);
    assert!(!view.prompt_visible());
}
