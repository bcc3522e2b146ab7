//! Navigation tree: one public login view, everything else behind the guard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{roles, ClinicConfig, GuardDecision, RouteGuard, Storage};

/// A view reachable by path. Patterns use `:name` for captured segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub pattern: String,
    pub title: String,
    #[serde(default)]
    pub public: bool,
    /// Roles allowed to open the view; empty means any signed-in user.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl RouteSpec {
    pub fn public(pattern: &str, title: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            title: title.to_string(),
            public: true,
            roles: Vec::new(),
        }
    }

    pub fn protected(pattern: &str, title: &str) -> Self {
        Self {
            public: false,
            ..Self::public(pattern, title)
        }
    }

    pub fn with_roles(mut self, roles: &[&str]) -> Self {
        self.roles = roles.iter().map(|role| role.to_string()).collect();
        self
    }

    fn capture(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let expected: Vec<&str> = segments(&self.pattern).collect();
        let actual: Vec<&str> = segments(path).collect();
        if expected.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (pattern, value) in expected.iter().zip(actual.iter()) {
            if let Some(name) = pattern.strip_prefix(':') {
                params.insert(name.to_string(), (*value).to_string());
            } else if pattern != value {
                return None;
            }
        }
        Some(params)
    }
}

/// A resolved route with its captured parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch {
    pub route: RouteSpec,
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Ordered route list; the first matching pattern wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<RouteSpec>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(vec![
            RouteSpec::public("/login", "Login"),
            RouteSpec::protected("/", "Dashboard"),
            RouteSpec::protected("/agenda", "Agenda"),
            RouteSpec::protected("/pacientes", "Pacientes"),
            RouteSpec::protected("/pacientes/novo", "Novo paciente"),
            RouteSpec::protected("/pacientes/:id", "Paciente"),
            RouteSpec::protected("/pacientes/:id/editar", "Editar paciente"),
            RouteSpec::protected("/medicos", "Médicos"),
            RouteSpec::protected("/medicos/novo", "Novo médico"),
            RouteSpec::protected("/medicos/:id", "Médico"),
            RouteSpec::protected("/medicos/:id/editar", "Editar médico"),
            RouteSpec::protected("/consultas", "Consultas"),
            RouteSpec::protected("/consultas/nova", "Nova consulta"),
            RouteSpec::protected("/consultas/:id", "Consulta"),
            RouteSpec::protected("/financeiro", "Financeiro"),
            RouteSpec::protected("/financeiro/:id", "Lançamento"),
            RouteSpec::protected("/me", "Usuário logado"),
            RouteSpec::protected("/usuarios/novo", "Cadastro de usuário").with_roles(&[roles::ADMIN]),
        ])
    }
}

impl RouteTable {
    pub fn new(routes: Vec<RouteSpec>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[RouteSpec] {
        &self.routes
    }

    /// Matches `path`, ignoring any query string, fragment or trailing slash.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let path = normalize_path(path);
        self.routes.iter().find_map(|route| {
            route.capture(&path).map(|params| RouteMatch {
                route: route.clone(),
                path: path.clone(),
                params,
            })
        })
    }
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Navigation {
    Render(RouteMatch),
    Redirect { to: String, from: Option<String> },
    NotFound { path: String },
}

/// Resolves `path` and, for protected views, runs the guard.
pub fn navigate<S: Storage>(
    table: &RouteTable,
    guard: &RouteGuard<S>,
    config: &ClinicConfig,
    path: &str,
) -> Navigation {
    let Some(matched) = table.resolve(path) else {
        return Navigation::NotFound {
            path: normalize_path(path),
        };
    };

    if matched.route.public {
        return Navigation::Render(matched);
    }

    let decision = guard.evaluate(&matched.path, &matched.route.roles);
    match (decision.redirect_target(config), decision) {
        (None, _) => Navigation::Render(matched),
        (Some(to), GuardDecision::RedirectLogin { from }) => Navigation::Redirect {
            to: to.to_string(),
            from: Some(from),
        },
        (Some(to), _) => Navigation::Redirect {
            to: to.to_string(),
            from: None,
        },
    }
}

/// `/pacientes/?q=1#top` becomes `/pacientes`; empty becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let joined = segments(path).collect::<Vec<_>>().join("/");
    format!("/{joined}")
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
