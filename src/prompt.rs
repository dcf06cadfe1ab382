//! Session prompt view.
//!
//! Shows an "are you still there?" prompt when the idle timer reports that
//! the user went idle, and routes the user's answer back to the timer.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::activity::ActivitySource;
use crate::config::{Config, ConfigError};
use crate::idle::{IdleMonitor, IdleTimer};

/// Callback handed to the idle timer; shows the prompt when invoked.
pub type ShowPrompt = Box<dyn FnMut() + Send + 'static>;

/// Activity status shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two answers the prompt offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    Logout,
    Stay,
}

impl PromptAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Logout => "Logout",
            Self::Stay => "Stay",
        }
    }
}

/// A visible prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub message: String,
    pub actions: [PromptAction; 2],
}

/// Everything the view shows at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub status: Status,
    pub prompt: Option<Prompt>,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status: {}", self.status)?;
        if let Some(ref prompt) = self.prompt {
            write!(f, "\n> {}\n>", prompt.message)?;
            for action in prompt.actions {
                write!(f, " [{}]", action.label())?;
            }
        }
        Ok(())
    }
}

/// External collaborator that ends the user's session.
///
/// The view itself never terminates anything; a real deployment plugs its
/// auth service in here.
pub trait Logout: Send + Sync {
    fn end_session(&self);
}

/// Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogout;

impl Logout for NoopLogout {
    fn end_session(&self) {}
}

/// Records the logout in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogLogout;

impl Logout for LogLogout {
    fn end_session(&self) {
        info!("User is logged out");
    }
}

/// Stay-or-logout prompt driven by an idle timer.
pub struct SessionPrompt<T: IdleTimer> {
    timer: T,
    prompt_tx: Arc<watch::Sender<bool>>,
    message: String,
    logout: Box<dyn Logout>,
}

impl SessionPrompt<IdleMonitor> {
    /// Mount the view on a new [`IdleMonitor`] reading `source`.
    pub fn mount<S, L>(config: &Config, source: S, logout: L) -> Result<Self, ConfigError>
    where
        S: ActivitySource + 'static,
        L: Logout + 'static,
    {
        let monitor_config = config.monitor()?;

        Ok(Self::with_timer(
            |show_prompt| IdleMonitor::spawn(monitor_config, source, show_prompt),
            config.prompt_message.clone(),
            logout,
        ))
    }
}

impl<T: IdleTimer> SessionPrompt<T> {
    /// Mount the view on any idle timer.
    ///
    /// `build` receives the callback that shows the prompt and must arrange
    /// for the timer to invoke it when the user goes idle.
    pub fn with_timer<B, L>(build: B, message: impl Into<String>, logout: L) -> Self
    where
        B: FnOnce(ShowPrompt) -> T,
        L: Logout + 'static,
    {
        let (prompt_tx, _) = watch::channel(false);
        let prompt_tx = Arc::new(prompt_tx);

        let show = prompt_tx.clone();
        let timer = build(Box::new(move || {
            info!("Showing session prompt");
            show.send_replace(true);
        }));

        Self {
            timer,
            prompt_tx,
            message: message.into(),
            logout: Box::new(logout),
        }
    }

    /// Current activity status.
    pub fn status(&self) -> Status {
        if self.timer.is_idle() {
            Status::Inactive
        } else {
            Status::Active
        }
    }

    /// Whether the prompt is shown.
    pub fn prompt_visible(&self) -> bool {
        *self.prompt_tx.borrow()
    }

    /// Watch prompt visibility.
    pub fn watch_prompt(&self) -> watch::Receiver<bool> {
        self.prompt_tx.subscribe()
    }

    /// The underlying idle timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Snapshot of what should be on screen.
    pub fn render(&self) -> Frame {
        let prompt = self.prompt_visible().then(|| Prompt {
            message: self.message.clone(),
            actions: [PromptAction::Logout, PromptAction::Stay],
        });

        Frame {
            status: self.status(),
            prompt,
        }
    }

    /// Keep the session: hide the prompt and reset the idle timer.
    pub fn stay(&self) {
        info!("User chose to stay");
        self.prompt_tx.send_replace(false);
        self.timer.reset();
    }

    /// End the session: hide the prompt and hand over to the logout
    /// collaborator. The idle flag is left as is.
    pub fn logout(&self) {
        info!("User chose to log out");
        self.prompt_tx.send_replace(false);
        self.logout.end_session();
    }

    /// Apply an answer. Returns false (and does nothing) when no prompt is shown.
    pub fn respond(&self, action: PromptAction) -> bool {
        if !self.prompt_visible() {
            debug!("Ignoring {:?}: no prompt is shown", action);
            return false;
        }

        match action {
            PromptAction::Stay => self.stay(),
            PromptAction::Logout => self.logout(),
        }
        true
    }

    /// Tear the view down, stopping its idle timer.
    pub fn unmount(self) {
        debug!("Unmounting session prompt");
        drop(self);
    }
}
