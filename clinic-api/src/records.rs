use clinic_core::{ClinicError, Storage};
use serde_json::json;

use crate::models::MedicalRecord;
use crate::schema::Resource;
use crate::transport::{ApiRequest, Transport};
use crate::{ApiClient, Navigator};

impl<S: Storage, T: Transport, N: Navigator> ApiClient<S, T, N> {
    /// Creates or replaces the medical record of an appointment. Chief
    /// complaint and history of present illness are required.
    pub async fn upsert_medical_record(
        &self,
        appointment_id: &str,
        record: &MedicalRecord,
    ) -> Result<(), ClinicError> {
        if record.chief_complaint.trim().is_empty() || record.present_illness.trim().is_empty() {
            return Err(ClinicError::Validation(
                "chief complaint and history of present illness are required".to_string(),
            ));
        }

        let body = json!({
            "queixaPrincipal": record.chief_complaint,
            "hda": record.present_illness,
            "antecedentes": record.history,
            "exameFisico": record.physical_exam,
            "hipotesesDiagnosticas": record.diagnostic_hypotheses,
            "conduta": record.plan,
        });
        self.execute(ApiRequest::post(format!("/prontuarios/{appointment_id}")).json(body))
            .await
    }

    pub async fn get_medical_record(&self, appointment_id: &str) -> Result<MedicalRecord, ClinicError> {
        self.fetch(
            ApiRequest::get(format!("/prontuarios/{appointment_id}")),
            Resource::MedicalRecord,
        )
        .await
    }

    pub fn medical_record_pdf_url(&self, appointment_id: &str) -> String {
        self.url(&format!("/prontuarios/{appointment_id}/pdf"))
    }

    pub async fn download_medical_record_pdf(
        &self,
        appointment_id: &str,
    ) -> Result<Vec<u8>, ClinicError> {
        self.fetch_bytes(ApiRequest::get(format!("/prontuarios/{appointment_id}/pdf")))
            .await
    }
}
