//! HTTP client for the clinic REST API.
//!
//! [`ApiClient`] shares the session store with the route guard, attaches the
//! bearer token to every request, and turns a 401 into an immediate sign-out.
//! Responses are normalized once by [`schema::ResponseSchema`] before they
//! reach the typed models.

mod appointments;
mod auth;
mod billing;
pub mod cep;
mod client;
pub mod dates;
mod doctors;
pub mod models;
mod navigator;
mod patients;
mod prescriptions;
mod records;
pub mod schema;
pub mod transport;

pub use client::ApiClient;
pub use models::*;
pub use navigator::Navigator;
pub use prescriptions::sanitize_prescription_items;
pub use schema::{Resource, ResponseSchema, SchemaVersion};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
