use clinic_core::{ClinicError, Storage};
use serde_json::{json, Value};
use tracing::info;

use crate::models::{CurrentUser, LoginRequest, LoginResponse, Pong, RegisterRequest};
use crate::schema::Resource;
use crate::transport::{ApiRequest, Transport};
use crate::{ApiClient, Navigator};

impl<S: Storage, T: Transport, N: Navigator> ApiClient<S, T, N> {
    /// Signs in and stores the token with the returned profile.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClinicError> {
        let body = serde_json::to_value(LoginRequest { email, password })?;
        let response: LoginResponse = self
            .fetch(ApiRequest::post("/auth/login").json(body), Resource::Login)
            .await?;

        if response.token.is_empty() {
            return Err(ClinicError::MissingData);
        }

        self.session().save(&response.token, &response.profile())?;
        info!(email = %response.email, role = ?response.role, "signed in");
        Ok(response)
    }

    /// Creates a user account. Returns the API's reply as-is.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Value, ClinicError> {
        let body = serde_json::to_value(request)?;
        let response = self.send(ApiRequest::post("/auth/register").json(body)).await?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(json!({}));
        }
        let value: Value = serde_json::from_slice(&response.body)?;
        Ok(self.schema().normalize(Resource::Generic, value))
    }

    pub async fn current_user(&self) -> Result<CurrentUser, ClinicError> {
        self.fetch(ApiRequest::get("/auth/me"), Resource::CurrentUser)
            .await
    }

    /// Forgets the stored session. The API keeps no server-side session.
    pub fn logout(&self) {
        self.session().clear();
        info!("signed out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    /// Connectivity check; the API answers `{ ok: true, msg: "pong" }`.
    pub async fn ping(&self) -> Result<Pong, ClinicError> {
        self.fetch(ApiRequest::get("/ping"), Resource::Generic).await
    }
}
