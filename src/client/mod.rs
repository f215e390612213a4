//! Typed HTTP client for the registration API.

use log::debug;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::errors::ErrorResponse;
use crate::models::{
    admin::{
        AdditionalEmailsRequest, Admin, AdminRegisterRequest, DeleteAdminRequest,
        VerifyPasswordRequest,
    },
    registration::{PasswordRequest, Registration, RegistrationPayload, RegistrationUpdateRequest},
    response::{DeleteResponse, MessageResponse, VerifyResponse},
};

pub mod error;
pub mod notify;

pub use error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Builds a client with a cookie store, so a `verify-password` session
    /// carries over to later admin calls.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Non-2xx: surface the backend's `detail` if it sent one.
        let detail = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .map(|body| body.detail);
        debug!("Request failed with {}: {:?}", status, detail);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::Authorization(
                detail.unwrap_or_else(|| "Not authorized".to_string()),
            )),
            _ => Err(ClientError::Server {
                status: status.as_u16(),
                detail,
            }),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        self.execute(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn api_root(&self) -> Result<MessageResponse, ClientError> {
        self.send_json(self.http.get(self.url("/api/"))).await
    }

    pub async fn get_admin(&self) -> Result<Option<Admin>, ClientError> {
        self.send_json(self.http.get(self.url("/api/admin"))).await
    }

    pub async fn register_admin(&self, request: &AdminRegisterRequest) -> Result<Admin, ClientError> {
        self.send_json(self.http.post(self.url("/api/admin/register")).json(request))
            .await
    }

    pub async fn verify_password(&self, password: &str) -> Result<(), ClientError> {
        let body = VerifyPasswordRequest {
            password: password.to_string(),
        };
        let _: VerifyResponse = self
            .send_json(
                self.http
                    .post(self.url("/api/admin/verify-password"))
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    pub async fn update_additional_emails(
        &self,
        emails: &[String],
        password: Option<&str>,
    ) -> Result<Admin, ClientError> {
        let body = AdditionalEmailsRequest {
            additional_emails: emails.to_vec(),
            password: password.map(str::to_string),
        };
        self.send_json(
            self.http
                .put(self.url("/api/admin/additional-emails"))
                .json(&body),
        )
        .await
    }

    pub async fn delete_admin(&self, email: &str, password: Option<&str>) -> Result<(), ClientError> {
        let body = DeleteAdminRequest {
            email: email.to_string(),
            password: password.map(str::to_string),
        };
        let _: MessageResponse = self
            .send_json(self.http.delete(self.url("/api/admin/delete")).json(&body))
            .await?;
        Ok(())
    }

    pub async fn list_registrations(&self) -> Result<Vec<Registration>, ClientError> {
        self.send_json(self.http.get(self.url("/api/registrations")))
            .await
    }

    pub async fn get_registration(&self, id: &str) -> Result<Registration, ClientError> {
        self.send_json(self.http.get(self.url(&format!("/api/registrations/{}", id))))
            .await
    }

    pub async fn create_registration(
        &self,
        payload: &RegistrationPayload,
    ) -> Result<Registration, ClientError> {
        self.send_json(self.http.post(self.url("/api/registrations")).json(payload))
            .await
    }

    pub async fn update_registration(
        &self,
        id: &str,
        password: Option<&str>,
        payload: &RegistrationPayload,
    ) -> Result<Registration, ClientError> {
        let body = RegistrationUpdateRequest {
            password: password.map(str::to_string),
            payload: payload.clone(),
        };
        self.send_json(
            self.http
                .put(self.url(&format!("/api/registrations/{}", id)))
                .json(&body),
        )
        .await
    }

    pub async fn delete_registration(
        &self,
        id: &str,
        password: Option<&str>,
    ) -> Result<DeleteResponse, ClientError> {
        let body = PasswordRequest {
            password: password.map(str::to_string),
        };
        self.send_json(
            self.http
                .delete(self.url(&format!("/api/registrations/{}", id)))
                .json(&body),
        )
        .await
    }

    /// Server-rendered text of every registration.
    pub async fn export_all_text(&self) -> Result<String, ClientError> {
        self.execute(self.http.get(self.url("/api/registrations/export")))
            .await?
            .text()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}
