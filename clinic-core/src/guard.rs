//! Per-navigation access decision for protected views.
//!
//! The guard is UX only. It keeps signed-out or under-privileged users away
//! from screens that would fail anyway; the API enforces the real rules and a
//! session can still be revoked by a 401 right after the guard allowed a view.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{token, ClinicConfig, MissingTokenPolicy, SessionStore, Storage};

/// Outcome of evaluating one navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Render the nested view unchanged.
    Allow,
    /// Go to the login view; `from` is where to return after signing in.
    RedirectLogin { from: String },
    /// Role check failed; go to the home view.
    RedirectHome,
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    /// Path to navigate to, or `None` when the view may render.
    pub fn redirect_target<'a>(&self, config: &'a ClinicConfig) -> Option<&'a str> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::RedirectLogin { .. } => Some(config.login_path.as_str()),
            GuardDecision::RedirectHome => Some(config.home_path.as_str()),
        }
    }
}

/// Stateless guard over a shared session store.
pub struct RouteGuard<S> {
    session: Rc<SessionStore<S>>,
    missing_token: MissingTokenPolicy,
}

impl<S: Storage> RouteGuard<S> {
    pub fn new(session: Rc<SessionStore<S>>, config: &ClinicConfig) -> Self {
        Self {
            session,
            missing_token: config.missing_token,
        }
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    pub fn evaluate(&self, path: &str, required_roles: &[String]) -> GuardDecision {
        self.evaluate_at(path, required_roles, Utc::now())
    }

    /// Token presence, then expiry, then roles. An expired token clears the
    /// stored session before redirecting.
    pub fn evaluate_at(
        &self,
        path: &str,
        required_roles: &[String],
        now: DateTime<Utc>,
    ) -> GuardDecision {
        let session = self.session.load();

        let token = match (session.token.as_deref(), self.missing_token) {
            (Some(token), _) => Some(token),
            (None, MissingTokenPolicy::Redirect) => {
                debug!(path, "no session token; redirecting to login");
                return GuardDecision::RedirectLogin {
                    from: path.to_string(),
                };
            }
            (None, MissingTokenPolicy::AllowWithWarning) => {
                warn!(path, "no session token; allowing navigation (permissive mode)");
                None
            }
        };

        if token.is_some_and(|token| token::is_expired_at(token, now)) {
            debug!(path, "session token expired; clearing session");
            self.session.clear();
            return GuardDecision::RedirectLogin {
                from: path.to_string(),
            };
        }

        if required_roles.is_empty() {
            return GuardDecision::Allow;
        }

        match token::resolve_role(session.user.as_ref(), token) {
            Some(role) if required_roles.iter().any(|required| *required == role) => {
                GuardDecision::Allow
            }
            role => {
                debug!(path, ?role, ?required_roles, "role not permitted; redirecting home");
                GuardDecision::RedirectHome
            }
        }
    }
}
