//! idle-prompt - idle detection with a stay-or-logout session prompt.
//!
//! An [`IdleMonitor`](idle::IdleMonitor) watches a stream of user activity and
//! fires a one-shot notification after a quiet period; a
//! [`SessionPrompt`](prompt::SessionPrompt) turns that notification into a
//! prompt asking the user to stay or log out.
//!
//! Idle detection fails open: if the activity source breaks, the user is
//! never reported idle.

pub mod activity;
pub mod config;
pub mod debounce;
pub mod idle;
pub mod prompt;
