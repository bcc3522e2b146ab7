use clinic_core::{ClinicError, Storage};
use serde_json::{json, Value};

use crate::models::PrescriptionItem;
use crate::transport::{ApiRequest, Transport};
use crate::{ApiClient, Navigator};

/// Trims every item and drops the ones missing a medication or a dosage.
pub fn sanitize_prescription_items(items: &[PrescriptionItem]) -> Vec<PrescriptionItem> {
    items
        .iter()
        .map(|item| PrescriptionItem {
            id: item.id.clone(),
            medication: item.medication.trim().to_string(),
            dosage: item.dosage.trim().to_string(),
            instructions: item
                .instructions
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        })
        .filter(|item| !item.medication.is_empty() && !item.dosage.is_empty())
        .collect()
}

impl<S: Storage, T: Transport, N: Navigator> ApiClient<S, T, N> {
    /// Replaces the prescription list of an appointment.
    pub async fn upsert_prescriptions(
        &self,
        appointment_id: &str,
        items: &[PrescriptionItem],
    ) -> Result<(), ClinicError> {
        let items = sanitize_prescription_items(items);
        if items.is_empty() {
            return Err(ClinicError::Validation(
                "add at least one prescription item with medication and dosage".to_string(),
            ));
        }

        let itens: Vec<Value> = items
            .iter()
            .map(|item| {
                json!({
                    "medicamento": item.medication,
                    "posologia": item.dosage,
                    "orientacoes": item.instructions,
                })
            })
            .collect();

        self.execute(
            ApiRequest::post(format!("/prescricoes/{appointment_id}")).json(json!({ "itens": itens })),
        )
        .await
    }

    pub async fn delete_prescription(&self, prescription_id: &str) -> Result<(), ClinicError> {
        self.execute(ApiRequest::delete(format!("/prescricoes/{prescription_id}")))
            .await
    }

    /// Direct link to the PDF of one prescription item.
    pub fn prescription_pdf_url(&self, appointment_id: &str, item_id: &str) -> String {
        self.url(&format!("/prescricoes/{appointment_id}/pdf/{item_id}"))
    }

    pub async fn download_prescription_pdf(
        &self,
        appointment_id: &str,
        item_id: &str,
    ) -> Result<Vec<u8>, ClinicError> {
        self.fetch_bytes(ApiRequest::get(format!(
            "/prescricoes/{appointment_id}/pdf/{item_id}"
        )))
        .await
    }
}
