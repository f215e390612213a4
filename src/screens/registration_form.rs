use crate::client::{notify::Notifier, ApiClient, ClientError};
use crate::models::registration::{
    Buddy, NextOfKin, PersonalInfo, Registration, RegistrationPayload, MAX_NEXT_OF_KIN,
    MIN_NEXT_OF_KIN, REQUIRED_BUDDIES,
};
use crate::screens::surface;

/// What the user chose after a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    ViewRegistrations(Registration),
    /// The form has been reset to blank defaults.
    SubmitAnother(Registration),
}

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub personal_info: PersonalInfo,
    pub buddies: [Buddy; REQUIRED_BUDDIES],
    next_of_kin: Vec<NextOfKin>,
    busy: bool,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            buddies: Default::default(),
            next_of_kin: vec![NextOfKin::default(); MIN_NEXT_OF_KIN],
            busy: false,
        }
    }
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn next_of_kin(&self) -> &[NextOfKin] {
        &self.next_of_kin
    }

    pub fn next_of_kin_mut(&mut self, index: usize) -> Option<&mut NextOfKin> {
        self.next_of_kin.get_mut(index)
    }

    /// Adds a blank contact; refused once three exist.
    pub fn add_next_of_kin(&mut self) -> bool {
        if self.next_of_kin.len() >= MAX_NEXT_OF_KIN {
            return false;
        }
        self.next_of_kin.push(NextOfKin::default());
        true
    }

    /// Removes a contact; the last one cannot be removed.
    pub fn remove_next_of_kin(&mut self, index: usize) -> bool {
        if self.next_of_kin.len() <= MIN_NEXT_OF_KIN || index >= self.next_of_kin.len() {
            return false;
        }
        self.next_of_kin.remove(index);
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn payload(&self) -> RegistrationPayload {
        RegistrationPayload {
            personal_info: self.personal_info.clone(),
            buddies: self.buddies.to_vec(),
            next_of_kin: self.next_of_kin.clone(),
        }
    }

    pub fn validate(&self) -> Result<RegistrationPayload, ClientError> {
        let payload = self.payload();
        payload.validate_fields()?;
        Ok(payload)
    }

    /// Validates, then posts. A blocked submission makes no request.
    pub async fn submit(
        &mut self,
        client: &ApiClient,
        notifier: &dyn Notifier,
    ) -> Result<SubmitOutcome, ClientError> {
        let payload = match self.validate() {
            Ok(payload) => payload,
            Err(err) => {
                surface(notifier, &err, "Failed to submit registration");
                return Err(err);
            }
        };

        self.busy = true;
        let result = client.create_registration(&payload).await;
        self.busy = false;

        match result {
            Ok(registration) => {
                if notifier.confirm(
                    "Success",
                    "Registration submitted successfully! View registrations?",
                ) {
                    Ok(SubmitOutcome::ViewRegistrations(registration))
                } else {
                    self.reset();
                    Ok(SubmitOutcome::SubmitAnother(registration))
                }
            }
            Err(err) => {
                surface(notifier, &err, "Failed to submit registration");
                Err(err)
            }
        }
    }
}
