//! One notification capability for every front end: informational notes,
//! errors, and yes/no confirmations.

use log::{error, info};
use std::cell::RefCell;

pub trait Notifier {
    fn info(&self, title: &str, message: &str);
    fn error(&self, title: &str, message: &str);
    /// Asks a yes/no question; `true` means the affirmative choice.
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Routes notifications to the log. Confirmations resolve to `auto_confirm`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier {
    pub auto_confirm: bool,
}

impl Notifier for LogNotifier {
    fn info(&self, title: &str, message: &str) {
        info!("{}: {}", title, message);
    }

    fn error(&self, title: &str, message: &str) {
        error!("{}: {}", title, message);
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        info!("{}: {} -> {}", title, message, self.auto_confirm);
        self.auto_confirm
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info { title: String, message: String },
    Error { title: String, message: String },
    Confirm { title: String, message: String },
}

/// Keeps every notification for later inspection, for headless front ends.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub answer: bool,
    notices: RefCell<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            notices: RefCell::default(),
        }
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.notices.borrow().iter().rev().find_map(|n| match n {
            Notice::Error { message, .. } => Some(message.clone()),
            _ => None,
        })
    }

    pub fn last_info(&self) -> Option<String> {
        self.notices.borrow().iter().rev().find_map(|n| match n {
            Notice::Info { message, .. } => Some(message.clone()),
            _ => None,
        })
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, title: &str, message: &str) {
        self.notices.borrow_mut().push(Notice::Info {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn error(&self, title: &str, message: &str) {
        self.notices.borrow_mut().push(Notice::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        self.notices.borrow_mut().push(Notice::Confirm {
            title: title.to_string(),
            message: message.to_string(),
        });
        self.answer
    }
}
