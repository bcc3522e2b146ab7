//! Typed payloads. Field names on the wire are the API's (Portuguese,
//! camelCase after normalization); Rust names describe the meaning.

use chrono::{DateTime, Utc};
use clinic_core::UserProfile;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::dates;
use crate::schema::lenient;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "lenient::text")]
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub full_name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl LoginResponse {
    /// Profile cached alongside the token.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            expires_at: self.expires_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
}

/// `GET /auth/me`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub roles: Vec<String>,
}

/// `GET /ping`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pong {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(rename = "nome", default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(rename = "dataNascimento", default, deserialize_with = "lenient::opt_datetime")]
    pub birth_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "endereco", default)]
    pub address: Option<String>,
    #[serde(rename = "cidade", default)]
    pub city: Option<String>,
    #[serde(rename = "estado", default)]
    pub state: Option<String>,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
}

/// Form data for creating or updating a patient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientInput {
    pub name: String,
    /// `YYYY-MM-DD` or any ISO date-time.
    pub birth_date: String,
    pub cpf: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub notes: String,
}

impl PatientInput {
    /// Body for `POST`/`PUT /pacientes`: trimmed name, ISO birth date, blank
    /// optional fields sent as `null`.
    pub fn to_payload(&self) -> Value {
        json!({
            "nome": self.name.trim(),
            "dataNascimento": dates::to_iso(&self.birth_date),
            "cpf": blank_to_null(&self.cpf),
            "telefone": blank_to_null(&self.phone),
            "email": blank_to_null(&self.email),
            "endereco": blank_to_null(&self.address),
            "observacoes": blank_to_null(&self.notes),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Doctor {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(rename = "nome", default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default)]
    pub crm: Option<String>,
    #[serde(rename = "especialidade", default)]
    pub specialty: Option<String>,
    /// State where the CRM registration is held.
    #[serde(rename = "uf", default)]
    pub state: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorInput {
    #[serde(rename = "nome")]
    pub name: String,
    pub crm: String,
    #[serde(rename = "uf")]
    pub state: String,
    #[serde(rename = "especialidade")]
    pub specialty: String,
    pub cpf: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    /// Only sent when creating the doctor's login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    #[serde(rename = "Agendada")]
    Scheduled,
    #[serde(rename = "EmAndamento")]
    InProgress,
    #[serde(rename = "Concluida")]
    Completed,
    #[serde(rename = "Cancelada")]
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl AppointmentStatus {
    /// Value the API expects in status updates.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Agendada",
            AppointmentStatus::InProgress => "EmAndamento",
            AppointmentStatus::Completed => "Concluida",
            AppointmentStatus::Cancelled => "Cancelada",
            AppointmentStatus::Unknown => "Desconhecido",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(rename = "pacienteId", default, deserialize_with = "lenient::opt_id")]
    pub patient_id: Option<String>,
    #[serde(rename = "medicoId", default, deserialize_with = "lenient::opt_id")]
    pub doctor_id: Option<String>,
    #[serde(rename = "pacienteNome", default)]
    pub patient_name: Option<String>,
    #[serde(rename = "medicoNome", default)]
    pub doctor_name: Option<String>,
    #[serde(rename = "inicio", default, deserialize_with = "lenient::opt_datetime")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(rename = "fim", default, deserialize_with = "lenient::opt_datetime")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
}

/// `GET /consultas/{id}`: the appointment with its record and prescriptions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(rename = "prontuario", default)]
    pub medical_record: Option<MedicalRecord>,
    #[serde(rename = "prescricoes", default, deserialize_with = "lenient::list")]
    pub prescriptions: Vec<PrescriptionItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAppointment {
    pub patient_id: String,
    pub doctor_id: String,
    pub starts_at: String,
    pub ends_at: String,
}

impl NewAppointment {
    pub fn to_payload(&self) -> Value {
        json!({
            "pacienteId": id_value(&self.patient_id),
            "medicoId": id_value(&self.doctor_id),
            "inicio": dates::to_iso(&self.starts_at),
            "fim": dates::to_iso(&self.ends_at),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrescriptionItem {
    #[serde(default, deserialize_with = "lenient::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "medicamento", default, deserialize_with = "lenient::text")]
    pub medication: String,
    #[serde(rename = "posologia", default, deserialize_with = "lenient::text")]
    pub dosage: String,
    #[serde(rename = "orientacoes", default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicalRecord {
    #[serde(default, deserialize_with = "lenient::opt_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "queixaPrincipal", default, deserialize_with = "lenient::text")]
    pub chief_complaint: String,
    /// History of present illness.
    #[serde(rename = "hda", default, deserialize_with = "lenient::text")]
    pub present_illness: String,
    #[serde(rename = "antecedentes", default, deserialize_with = "lenient::text")]
    pub history: String,
    #[serde(rename = "exameFisico", default, deserialize_with = "lenient::text")]
    pub physical_exam: String,
    #[serde(rename = "hipotesesDiagnosticas", default, deserialize_with = "lenient::text")]
    pub diagnostic_hypotheses: String,
    #[serde(rename = "conduta", default, deserialize_with = "lenient::text")]
    pub plan: String,
}

/// Billing entry from `/controlefinanceiro`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FinancialEntry {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(rename = "data", default, deserialize_with = "lenient::opt_datetime")]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "valor", default, deserialize_with = "lenient::amount")]
    pub amount: f64,
    #[serde(rename = "pacienteNome", default)]
    pub patient_name: Option<String>,
    #[serde(rename = "medicoId", default, deserialize_with = "lenient::opt_id")]
    pub doctor_id: Option<String>,
    #[serde(rename = "medicoNome", default)]
    pub doctor_name: Option<String>,
}

/// Sum of entry amounts.
pub fn total_amount(entries: &[FinancialEntry]) -> f64 {
    entries.iter().map(|entry| entry.amount).sum()
}

fn blank_to_null(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

/// Numeric identifiers go out as numbers, anything else as a string.
fn id_value(id: &str) -> Value {
    id.trim()
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(id.to_string()))
}
