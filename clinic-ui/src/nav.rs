//! Sidebar and header helpers shared by the shell. Target independent.

use chrono::{DateTime, Utc};
use clinic_api::dates;
use clinic_core::{ClinicError, RouteTable};

/// Entries shown in the sidebar, in display order.
const SIDEBAR_PATHS: [&str; 8] = [
    "/",
    "/agenda",
    "/pacientes",
    "/medicos",
    "/consultas",
    "/financeiro",
    "/me",
    "/usuarios/novo",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub path: String,
    pub title: String,
}

/// Sidebar links the given role may open. Role-restricted views are hidden
/// from everyone else; the guard still rejects them if typed in directly.
pub fn sidebar_links(table: &RouteTable, role: Option<&str>) -> Vec<NavLink> {
    SIDEBAR_PATHS
        .iter()
        .filter_map(|path| table.resolve(path))
        .filter(|matched| {
            matched.route.roles.is_empty()
                || role.is_some_and(|role| matched.route.roles.iter().any(|allowed| allowed == role))
        })
        .map(|matched| NavLink {
            path: matched.path,
            title: matched.route.title,
        })
        .collect()
}

/// `/pacientes/12` keeps the "Pacientes" link highlighted; `/` only matches itself.
pub fn is_active(current: &str, link: &str) -> bool {
    if link == "/" {
        return current == "/";
    }
    current == link
        || current
            .strip_prefix(link)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn format_expiry(expires_at: Option<&str>) -> Option<String> {
    expires_at
        .and_then(dates::parse_datetime)
        .map(|instant: DateTime<Utc>| instant.format("%d/%m/%Y %H:%M UTC").to_string())
}

pub fn login_error_message(err: &ClinicError) -> String {
    match err {
        ClinicError::Unauthorized => "E-mail ou senha inválidos.".to_string(),
        ClinicError::MissingData => "O servidor não retornou um token.".to_string(),
        ClinicError::Http { status, .. } => format!("Falha no login (HTTP {status})."),
        other => format!("Não foi possível entrar: {other}"),
    }
}
