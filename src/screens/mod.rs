//! UI-free state machines for each screen of the registration front end.
//! Every backend call marks the screen busy for its duration.

use crate::client::{notify::Notifier, ClientError};

pub mod admin_manage;
pub mod admin_registrations;
pub mod admin_setup;
pub mod registration_form;
pub mod registrations_list;

/// Text handed to the platform's share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub message: String,
}

fn surface(notifier: &dyn Notifier, err: &ClientError, fallback: &str) {
    let title = if err.is_validation() {
        "Validation Error"
    } else {
        "Error"
    };
    notifier.error(title, &err.user_message(fallback));
}
