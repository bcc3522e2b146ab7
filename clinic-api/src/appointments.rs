use clinic_core::{ClinicError, Storage};
use serde_json::json;

use crate::dates;
use crate::models::{Appointment, AppointmentDetail, AppointmentStatus, NewAppointment};
use crate::schema::Resource;
use crate::transport::{ApiRequest, Transport};
use crate::{ApiClient, Navigator};

impl<S: Storage, T: Transport, N: Navigator> ApiClient<S, T, N> {
    /// `filters` are passed through as query parameters.
    pub async fn list_appointments(
        &self,
        filters: &[(&str, &str)],
    ) -> Result<Vec<Appointment>, ClinicError> {
        let request = filters
            .iter()
            .fold(ApiRequest::get("/consultas"), |request, (key, value)| {
                request.query(key, value)
            });
        self.fetch_list(request, Resource::Appointment).await
    }

    pub async fn get_appointment(&self, id: &str) -> Result<AppointmentDetail, ClinicError> {
        self.fetch(ApiRequest::get(format!("/consultas/{id}")), Resource::Appointment)
            .await
    }

    pub async fn create_appointment(&self, input: &NewAppointment) -> Result<(), ClinicError> {
        self.execute(ApiRequest::post("/consultas").json(input.to_payload()))
            .await
    }

    pub async fn update_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<(), ClinicError> {
        if status == AppointmentStatus::Unknown {
            return Err(ClinicError::Validation(
                "status must be one of Agendada, EmAndamento, Concluida, Cancelada".to_string(),
            ));
        }
        let body = json!({ "Status": status.as_api_str() });
        self.execute(ApiRequest::patch(format!("/consultas/{id}/status")).json(body))
            .await
    }

    pub async fn reschedule_appointment(
        &self,
        id: &str,
        starts_at: &str,
        ends_at: &str,
    ) -> Result<(), ClinicError> {
        let body = json!({
            "inicio": dates::to_iso(starts_at),
            "fim": dates::to_iso(ends_at),
        });
        self.execute(ApiRequest::put(format!("/consultas/{id}/horario")).json(body))
            .await
    }

    pub async fn delete_appointment(&self, id: &str) -> Result<(), ClinicError> {
        self.execute(ApiRequest::delete(format!("/consultas/{id}")))
            .await
    }
}
