//! The single HTTP entry point for every view.
//!
//! Each request carries the stored bearer token. A 401 from any endpoint
//! signs the user out on the spot: the session is cleared and the app is sent
//! to the login view, whatever the route guard decided earlier.

use std::rc::Rc;

use clinic_core::{normalize_path, ClinicConfig, ClinicError, SessionStore, Storage};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::schema::{Resource, ResponseSchema};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use crate::Navigator;

pub struct ApiClient<S, T, N> {
    session: Rc<SessionStore<S>>,
    transport: T,
    navigator: N,
    config: ClinicConfig,
    schema: ResponseSchema,
}

impl<S: Storage, T: Transport, N: Navigator> ApiClient<S, T, N> {
    pub fn new(
        session: Rc<SessionStore<S>>,
        transport: T,
        navigator: N,
        config: &ClinicConfig,
    ) -> Self {
        Self {
            session,
            transport,
            navigator,
            config: config.clone(),
            schema: ResponseSchema::default(),
        }
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    pub fn schema(&self) -> &ResponseSchema {
        &self.schema
    }

    /// Absolute URL for links the browser opens directly (PDF downloads).
    pub fn url(&self, path: &str) -> String {
        self.config.api_url(path)
    }

    /// Sends `request` with the bearer token attached when one is stored and
    /// the caller did not set `Authorization` itself.
    ///
    /// 401 clears the session, redirects to login unless already there, and
    /// returns [`ClinicError::Unauthorized`]. Other non-2xx statuses return
    /// [`ClinicError::Http`] untouched.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ClinicError> {
        if request.header_value("Authorization").is_none() {
            if let Some(token) = self.session.token() {
                request
                    .headers
                    .push(("Authorization".to_string(), format!("Bearer {token}")));
            }
        }

        let method = request.method.clone();
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        debug!(%method, %path, status = response.status, "response received");

        if response.status == 401 {
            self.force_logout();
            return Err(ClinicError::Unauthorized);
        }

        if !response.is_success() {
            return Err(ClinicError::Http {
                status: response.status,
                body: response.text(),
            });
        }

        Ok(response)
    }

    fn force_logout(&self) {
        self.session.clear();
        let current = normalize_path(&self.navigator.current_path());
        let login = normalize_path(&self.config.login_path);
        if current != login {
            info!(from = %current, "session rejected by API; redirecting to login");
            self.navigator.redirect(&self.config.login_path);
        } else {
            info!("session rejected by API on the login view");
        }
    }

    pub(crate) async fn fetch<D: DeserializeOwned>(
        &self,
        request: ApiRequest,
        resource: Resource,
    ) -> Result<D, ClinicError> {
        let response = self.send(request).await?;
        self.schema.decode(resource, &response.body)
    }

    pub(crate) async fn fetch_list<D: DeserializeOwned>(
        &self,
        request: ApiRequest,
        resource: Resource,
    ) -> Result<Vec<D>, ClinicError> {
        let response = self.send(request).await?;
        self.schema.decode_list(resource, &response.body)
    }

    /// Sends `request` and discards the body.
    pub(crate) async fn execute(&self, request: ApiRequest) -> Result<(), ClinicError> {
        self.send(request).await.map(|_| ())
    }

    pub(crate) async fn fetch_bytes(&self, request: ApiRequest) -> Result<Vec<u8>, ClinicError> {
        self.send(request).await.map(|response| response.body)
    }
}
