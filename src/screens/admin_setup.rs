use log::warn;

use crate::client::{notify::Notifier, ApiClient, ClientError};
use crate::models::admin::{Admin, AdminRegisterRequest, MIN_PASSWORD_LEN};
use crate::screens::surface;
use crate::utils::is_valid_email;

#[derive(Debug, Clone, PartialEq)]
pub enum SetupState {
    Checking,
    /// Setup is blocked; the screen only offers navigation home.
    AdminExists,
    Ready,
    Registered(Admin),
}

#[derive(Debug)]
pub struct AdminSetupScreen {
    state: SetupState,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    busy: bool,
}

impl Default for AdminSetupScreen {
    fn default() -> Self {
        Self {
            state: SetupState::Checking,
            name: String::new(),
            phone: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            busy: false,
        }
    }
}

impl AdminSetupScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SetupState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Checks for an existing admin. A failed check leaves the form usable;
    /// the backend still refuses a second admin.
    pub async fn load(&mut self, client: &ApiClient) {
        self.state = match client.get_admin().await {
            Ok(Some(_)) => SetupState::AdminExists,
            Ok(None) => SetupState::Ready,
            Err(err) => {
                warn!("Error checking admin: {}", err);
                SetupState::Ready
            }
        };
    }

    pub fn validate(&self) -> Result<AdminRegisterRequest, ClientError> {
        let name = self.name.trim();
        let phone = self.phone.trim();
        let email = self.email.trim();
        if name.is_empty() || phone.is_empty() || email.is_empty() {
            return Err(ClientError::validation("name", "Please fill in all fields"));
        }
        if !is_valid_email(email) {
            return Err(ClientError::validation(
                "email",
                "Please enter a valid email address",
            ));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::validation(
                "password",
                "Password must be at least 8 characters",
            ));
        }
        if self.password != self.confirm_password {
            return Err(ClientError::validation(
                "confirmPassword",
                "Passwords do not match",
            ));
        }
        Ok(AdminRegisterRequest {
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }

    pub async fn register(
        &mut self,
        client: &ApiClient,
        notifier: &dyn Notifier,
    ) -> Result<Admin, ClientError> {
        if self.state == SetupState::AdminExists {
            let err = ClientError::validation("admin", "An admin is already registered");
            surface(notifier, &err, "");
            return Err(err);
        }

        let request = match self.validate() {
            Ok(request) => request,
            Err(err) => {
                surface(notifier, &err, "Failed to register admin");
                return Err(err);
            }
        };

        self.busy = true;
        let result = client.register_admin(&request).await;
        self.busy = false;

        match result {
            Ok(admin) => {
                self.password.clear();
                self.confirm_password.clear();
                self.state = SetupState::Registered(admin.clone());
                notifier.info(
                    "Success",
                    "Admin registered successfully! You can now start collecting registrations.",
                );
                Ok(admin)
            }
            Err(err) => {
                if matches!(err, ClientError::Server { status: 409, .. }) {
                    self.state = SetupState::AdminExists;
                }
                surface(notifier, &err, "Failed to register admin");
                Err(err)
            }
        }
    }
}
