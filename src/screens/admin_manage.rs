use crate::client::{notify::Notifier, ApiClient, ClientError};
use crate::models::admin::{filter_blank_emails, Admin, MAX_ADDITIONAL_EMAILS};
use crate::screens::surface;

#[derive(Debug, Clone, PartialEq)]
pub enum ManageState {
    Loading,
    NoAdmin,
    /// An admin exists but its details stay hidden until the password is verified.
    PasswordGate,
    Authenticated(Admin),
}

#[derive(Debug)]
pub struct AdminManageScreen {
    state: ManageState,
    pending_admin: Option<Admin>,
    pub password_input: String,
    email_drafts: Vec<String>,
    busy: bool,
}

impl Default for AdminManageScreen {
    fn default() -> Self {
        Self {
            state: ManageState::Loading,
            pending_admin: None,
            password_input: String::new(),
            email_drafts: Vec::new(),
            busy: false,
        }
    }
}

impl AdminManageScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ManageState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Admin details, only once the password gate has been passed.
    pub fn admin(&self) -> Option<&Admin> {
        match &self.state {
            ManageState::Authenticated(admin) => Some(admin),
            _ => None,
        }
    }

    pub async fn load(
        &mut self,
        client: &ApiClient,
        notifier: &dyn Notifier,
    ) -> Result<(), ClientError> {
        self.state = ManageState::Loading;
        self.busy = true;
        let result = client.get_admin().await;
        self.busy = false;

        match result {
            Ok(Some(admin)) => {
                self.pending_admin = Some(admin);
                self.state = ManageState::PasswordGate;
                Ok(())
            }
            Ok(None) => {
                self.pending_admin = None;
                self.state = ManageState::NoAdmin;
                Ok(())
            }
            Err(err) => {
                self.state = ManageState::NoAdmin;
                surface(notifier, &err, "Failed to load admin data");
                Err(err)
            }
        }
    }

    pub async fn submit_password(
        &mut self,
        client: &ApiClient,
        notifier: &dyn Notifier,
    ) -> Result<(), ClientError> {
        if self.password_input.trim().is_empty() {
            let err = ClientError::validation("password", "Please enter your admin password");
            surface(notifier, &err, "");
            return Err(err);
        }

        self.busy = true;
        let result = client.verify_password(&self.password_input).await;
        self.busy = false;
        self.password_input.clear();

        match result {
            Ok(()) => {
                if let Some(admin) = self.pending_admin.take() {
                    self.email_drafts = admin.additional_emails.clone();
                    self.state = ManageState::Authenticated(admin);
                }
                Ok(())
            }
            Err(err) => {
                surface(notifier, &err, "Invalid password");
                Err(err)
            }
        }
    }

    pub fn email_drafts(&self) -> &[String] {
        &self.email_drafts
    }

    /// Adds an empty draft slot; refused at the limit.
    pub fn add_email_draft(&mut self) -> bool {
        if self.email_drafts.len() >= MAX_ADDITIONAL_EMAILS {
            return false;
        }
        self.email_drafts.push(String::new());
        true
    }

    pub fn remove_email_draft(&mut self, index: usize) -> bool {
        if index >= self.email_drafts.len() {
            return false;
        }
        self.email_drafts.remove(index);
        true
    }

    pub fn set_email_draft(&mut self, index: usize, value: &str) -> bool {
        match self.email_drafts.get_mut(index) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Saves the non-blank drafts. Without a password the session's recent
    /// verification has to cover the call.
    pub async fn save_additional_emails(
        &mut self,
        client: &ApiClient,
        notifier: &dyn Notifier,
        password: Option<&str>,
    ) -> Result<Admin, ClientError> {
        let emails = filter_blank_emails(&self.email_drafts);
        if emails.len() > MAX_ADDITIONAL_EMAILS {
            let err = ClientError::validation(
                "additionalEmails",
                "Maximum 2 additional emails allowed",
            );
            surface(notifier, &err, "");
            return Err(err);
        }

        self.busy = true;
        let result = client.update_additional_emails(&emails, password).await;
        self.busy = false;

        match result {
            Ok(admin) => {
                self.email_drafts = admin.additional_emails.clone();
                self.state = ManageState::Authenticated(admin.clone());
                notifier.info("Success", "Additional emails updated successfully");
                Ok(admin)
            }
            Err(err) => {
                surface(notifier, &err, "Failed to update emails");
                Err(err)
            }
        }
    }

    pub async fn delete_admin(
        &mut self,
        client: &ApiClient,
        notifier: &dyn Notifier,
        confirm_email: &str,
        password: Option<&str>,
    ) -> Result<(), ClientError> {
        let matches = self
            .admin()
            .map(|admin| admin.email_matches(confirm_email))
            .unwrap_or(false);
        if !matches {
            let err = ClientError::validation(
                "email",
                "Email does not match. Please enter the correct admin email.",
            );
            surface(notifier, &err, "");
            return Err(err);
        }

        self.busy = true;
        let result = client.delete_admin(confirm_email.trim(), password).await;
        self.busy = false;

        match result {
            Ok(()) => {
                self.state = ManageState::NoAdmin;
                self.pending_admin = None;
                self.email_drafts.clear();
                notifier.info("Success", "Admin account deleted successfully");
                Ok(())
            }
            Err(err) => {
                surface(notifier, &err, "Failed to delete admin");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Admin {
        Admin {
            id: "admin-1".to_string(),
            name: "Test Admin".to_string(),
            phone: "+1234567890".to_string(),
            email: "admin@test.com".to_string(),
            additional_emails: vec!["ops@test.com".to_string()],
            created_at: chrono::Utc::now(),
        }
    }

    fn authenticated() -> AdminManageScreen {
        let admin = admin();
        AdminManageScreen {
            email_drafts: admin.additional_emails.clone(),
            state: ManageState::Authenticated(admin),
            ..AdminManageScreen::default()
        }
    }

    #[test]
    fn details_hidden_behind_the_gate() {
        let screen = AdminManageScreen {
            state: ManageState::PasswordGate,
            pending_admin: Some(admin()),
            ..AdminManageScreen::default()
        };
        assert!(screen.admin().is_none());
        assert_eq!(authenticated().admin().map(|a| a.name.as_str()), Some("Test Admin"));
    }

    #[test]
    fn email_drafts_capped_at_two() {
        let mut screen = authenticated();
        assert!(screen.add_email_draft());
        assert!(!screen.add_email_draft());
        assert!(screen.set_email_draft(1, "second@test.com"));
        assert!(!screen.set_email_draft(5, "x@test.com"));
        assert!(screen.remove_email_draft(0));
        assert_eq!(screen.email_drafts(), ["second@test.com".to_string()]);
        assert!(!screen.remove_email_draft(3));
    }
}
