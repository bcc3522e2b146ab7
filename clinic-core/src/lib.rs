//! Session gating core for the clinic front end: stored session, token
//! inspection, route guard and the navigation table.
//!
//! Everything here is advisory. The REST API is the only authorization
//! boundary; these types decide where to send the user, never what the user
//! is allowed to read or change.

pub mod config;
pub mod error;
pub mod guard;
pub mod lenient;
pub mod routes;
pub mod session;
pub mod storage;
pub mod token;

pub use config::{ClinicConfig, MissingTokenPolicy};
pub use error::ClinicError;
pub use guard::{GuardDecision, RouteGuard};
pub use routes::{navigate, normalize_path, Navigation, RouteMatch, RouteSpec, RouteTable};
pub use session::{Session, SessionStore, UserProfile};
pub use storage::{MemoryStorage, Storage};
pub use token::{decode, is_expired, is_expired_at, resolve_role, Claims};

/// Role names issued by the clinic API that routes check against.
pub mod roles {
    pub const ADMIN: &str = "Admin";
}
