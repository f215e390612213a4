use crate::client::{notify::Notifier, ApiClient, ClientError};
use crate::models::registration::{
    Buddy, NextOfKin, Registration, RegistrationPayload, MAX_NEXT_OF_KIN, MIN_NEXT_OF_KIN,
    REQUIRED_BUDDIES,
};
use crate::screens::surface;

/// The action waiting behind the password prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Edit(String),
    Delete(String),
}

impl PendingAction {
    pub fn registration_id(&self) -> &str {
        match self {
            PendingAction::Edit(id) | PendingAction::Delete(id) => id,
        }
    }
}

/// An open edit of one registration. The password confirmed at the prompt is
/// sent again with the save.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub registration_id: String,
    pub draft: RegistrationPayload,
    password: String,
}

impl EditSession {
    fn open(registration: &Registration, password: String) -> Self {
        Self {
            registration_id: registration.id.clone(),
            draft: registration.payload(),
            password,
        }
    }

    pub fn add_buddy(&mut self) -> bool {
        if self.draft.buddies.len() >= REQUIRED_BUDDIES {
            return false;
        }
        self.draft.buddies.push(Buddy::default());
        true
    }

    pub fn remove_buddy(&mut self, index: usize) -> bool {
        if self.draft.buddies.len() <= 1 || index >= self.draft.buddies.len() {
            return false;
        }
        self.draft.buddies.remove(index);
        true
    }

    pub fn add_next_of_kin(&mut self) -> bool {
        if self.draft.next_of_kin.len() >= MAX_NEXT_OF_KIN {
            return false;
        }
        self.draft.next_of_kin.push(NextOfKin::default());
        true
    }

    pub fn remove_next_of_kin(&mut self, index: usize) -> bool {
        if self.draft.next_of_kin.len() <= MIN_NEXT_OF_KIN || index >= self.draft.next_of_kin.len()
        {
            return false;
        }
        self.draft.next_of_kin.remove(index);
        true
    }
}

#[derive(Debug, Default)]
pub struct AdminRegistrationsScreen {
    registrations: Vec<Registration>,
    pending: Option<PendingAction>,
    pub password_input: String,
    editing: Option<EditSession>,
    busy: bool,
}

impl AdminRegistrationsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditSession> {
        self.editing.as_mut()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub async fn load(
        &mut self,
        client: &ApiClient,
        notifier: &dyn Notifier,
    ) -> Result<(), ClientError> {
        self.busy = true;
        let result = client.list_registrations().await;
        self.busy = false;

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

    /// Opens the password prompt for an edit.
    pub fn request_edit(&mut self, id: &str) {
        self.password_input.clear();
        self.pending = Some(PendingAction::Edit(id.to_string()));
    }

    /// Opens the password prompt for a delete.
    pub fn request_delete(&mut self, id: &str) {
        self.password_input.clear();
        self.pending = Some(PendingAction::Delete(id.to_string()));
    }

    pub fn cancel_pending(&mut self) {
        self.pending = None;
        self.password_input.clear();
    }

    /// Runs the pending action with the entered password. A delete goes to
    /// the backend right away; an edit opens the form for the record.
    pub async fn confirm_password(
        &mut self,
        client: &ApiClient,
        notifier: &dyn Notifier,
    ) -> Result<(), ClientError> {
        if self.password_input.trim().is_empty() {
            let err = ClientError::validation("password", "Please enter your admin password");
            surface(notifier, &err, "");
            return Err(err);
        }
        let Some(action) = self.pending.take() else {
            return Ok(());
        };
        let password = std::mem::take(&mut self.password_input);

        match action {
            PendingAction::Delete(id) => {
                self.busy = true;
                let result = client.delete_registration(&id, Some(&password)).await;
                self.busy = false;

                match result {
                    Ok(_) => {
                        notifier.info("Success", "Registration deleted successfully");
                        self.load(client, notifier).await
                    }
                    Err(err) => {
                        surface(notifier, &err, "Failed to delete registration");
                        Err(err)
                    }
                }
            }
            PendingAction::Edit(id) => {
                match self.registrations.iter().find(|reg| reg.id == id) {
                    Some(registration) => {
                        self.editing = Some(EditSession::open(registration, password));
                        Ok(())
                    }
                    None => {
                        let err = ClientError::Server {
                            status: 404,
                            detail: Some("Registration not found".to_string()),
                        };
                        surface(notifier, &err, "Failed to update registration");
                        Err(err)
                    }
                }
            }
        }
    }

    /// Validates the draft and sends it. The form stays open on failure.
    pub async fn save_edit(
        &mut self,
        client: &ApiClient,
        notifier: &dyn Notifier,
    ) -> Result<Registration, ClientError> {
        let Some(session) = self.editing.as_ref() else {
            let err = ClientError::validation("registration", "No registration is being edited");
            surface(notifier, &err, "");
            return Err(err);
        };

        if let Err(v) = session.draft.validate_for_update() {
            let err = ClientError::from(v);
            surface(notifier, &err, "Failed to update registration");
            return Err(err);
        }

        self.busy = true;
        let result = client
            .update_registration(
                &session.registration_id,
                Some(&session.password),
                &session.draft,
            )
            .await;
        self.busy = false;

        match result {
            Ok(registration) => {
                self.editing = None;
                notifier.info("Success", "Registration updated successfully");
                self.load(client, notifier).await?;
                Ok(registration)
            }
            Err(err) => {
                surface(notifier, &err, "Failed to update registration");
                Err(err)
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }
}
