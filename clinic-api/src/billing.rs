use clinic_core::{ClinicError, Storage};

use crate::models::FinancialEntry;
use crate::schema::Resource;
use crate::transport::{ApiRequest, Transport};
use crate::{ApiClient, Navigator};

impl<S: Storage, T: Transport, N: Navigator> ApiClient<S, T, N> {
    pub async fn list_financial_entries(&self) -> Result<Vec<FinancialEntry>, ClinicError> {
        self.fetch_list(ApiRequest::get("/controlefinanceiro"), Resource::FinancialEntry)
            .await
    }

    pub async fn get_financial_entry(&self, id: &str) -> Result<FinancialEntry, ClinicError> {
        self.fetch(
            ApiRequest::get(format!("/controlefinanceiro/{id}")),
            Resource::FinancialEntry,
        )
        .await
    }

    pub async fn list_financial_entries_by_doctor(
        &self,
        doctor_id: &str,
    ) -> Result<Vec<FinancialEntry>, ClinicError> {
        self.fetch_list(
            ApiRequest::get(format!("/controlefinanceiro/medico/{doctor_id}")),
            Resource::FinancialEntry,
        )
        .await
    }
}
