//! Operator-facing notifications
//!
//! Success and info messages go to the status bar and fade out; errors queue
//! up and are shown one at a time in the error dialog until dismissed.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a status message stays visible
const STATUS_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: Instant,
}

#[derive(Debug, Default)]
pub struct Notifications {
    status: Option<Notice>,
    errors: VecDeque<String>,
}

impl Notifications {
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Error => {
                tracing::warn!("{message}");
                self.errors.push_back(message);
            }
            _ => {
                tracing::info!("{message}");
                self.status = Some(Notice {
                    level,
                    message,
                    created_at: Instant::now(),
                });
            }
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    /// Status message still within its display window
    pub fn status(&self) -> Option<&Notice> {
        self.status
            .as_ref()
            .filter(|n| n.created_at.elapsed() < STATUS_TTL)
    }

    /// Oldest undismissed error
    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
