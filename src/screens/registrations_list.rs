use chrono::NaiveDate;

use crate::client::{notify::Notifier, ApiClient, ClientError};
use crate::export::{format_all_registrations, format_registration};
use crate::models::registration::Registration;
use crate::screens::{surface, SharePayload};

/// Read-only list of registrations with expandable cards and text export.
#[derive(Debug, Default)]
pub struct RegistrationsList {
    registrations: Vec<Registration>,
    loading: bool,
    expanded: Option<String>,
}

impl RegistrationsList {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn load(
        &mut self,
        client: &ApiClient,
        notifier: &dyn Notifier,
    ) -> Result<(), ClientError> {
        self.loading = true;
        let result = client.list_registrations().await;
        self.loading = false;

        match result {
            Ok(registrations) => {
                self.registrations = registrations;
                Ok(())
            }
            Err(err) => {
                surface(notifier, &err, "Failed to fetch registrations");
                Err(err)
            }
        }
    }

    /// Expands the card, or collapses it if it was already open.
    pub fn toggle_expand(&mut self, id: &str) {
        if self.expanded.as_deref() == Some(id) {
            self.expanded = None;
        } else {
            self.expanded = Some(id.to_string());
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.as_deref() == Some(id)
    }

    pub fn export_single(
        &self,
        id: &str,
        today: NaiveDate,
        notifier: &dyn Notifier,
    ) -> Option<SharePayload> {
        let reg = self.registrations.iter().find(|reg| reg.id == id)?;
        match format_registration(reg, today) {
            Ok(message) => Some(SharePayload {
                title: "Health Registration Details".to_string(),
                message,
            }),
            Err(e) => {
                notifier.error("Error", &format!("Could not prepare export: {}", e));
                None
            }
        }
    }

    /// Refuses with a notice when there is nothing to export.
    pub fn export_all(&self, today: NaiveDate, notifier: &dyn Notifier) -> Option<SharePayload> {
        if self.registrations.is_empty() {
            notifier.info("No Data", "No registrations available to export");
            return None;
        }
        match format_all_registrations(&self.registrations, today) {
            Ok(message) => Some(SharePayload {
                title: "All Health Registrations".to_string(),
                message,
            }),
            Err(e) => {
                notifier.error("Error", &format!("Could not prepare export: {}", e));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::notify::RecordingNotifier;

    #[test]
    fn toggling_the_same_card_collapses_it() {
        let mut list = RegistrationsList::new();
        assert!(list.is_loading());
        list.toggle_expand("a");
        assert!(list.is_expanded("a"));
        list.toggle_expand("b");
        assert!(!list.is_expanded("a"));
        assert!(list.is_expanded("b"));
        list.toggle_expand("b");
        assert!(!list.is_expanded("b"));
    }

    #[test]
    fn empty_list_refuses_bulk_export() {
        let list = RegistrationsList::new();
        let notifier = RecordingNotifier::default();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(list.export_all(today, &notifier).is_none());
        assert_eq!(
            notifier.last_info().as_deref(),
            Some("No registrations available to export")
        );
        assert!(list.export_single("missing", today, &notifier).is_none());
    }
}
