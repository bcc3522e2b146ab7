use clinic_core::{ClinicError, Storage};

use crate::models::{Patient, PatientInput};
use crate::schema::Resource;
use crate::transport::{ApiRequest, Transport};
use crate::{ApiClient, Navigator};

impl<S: Storage, T: Transport, N: Navigator> ApiClient<S, T, N> {
    pub async fn list_patients(&self) -> Result<Vec<Patient>, ClinicError> {
        self.fetch_list(ApiRequest::get("/pacientes"), Resource::Patient)
            .await
    }

    pub async fn get_patient(&self, id: &str) -> Result<Patient, ClinicError> {
        self.fetch(ApiRequest::get(format!("/pacientes/{id}")), Resource::Patient)
            .await
    }

    pub async fn create_patient(&self, input: &PatientInput) -> Result<(), ClinicError> {
        validate_name(&input.name)?;
        self.execute(ApiRequest::post("/pacientes").json(input.to_payload()))
            .await
    }

    pub async fn update_patient(&self, id: &str, input: &PatientInput) -> Result<(), ClinicError> {
        validate_name(&input.name)?;
        self.execute(ApiRequest::put(format!("/pacientes/{id}")).json(input.to_payload()))
            .await
    }

    pub async fn delete_patient(&self, id: &str) -> Result<(), ClinicError> {
        self.execute(ApiRequest::delete(format!("/pacientes/{id}")))
            .await
    }
}

fn validate_name(name: &str) -> Result<(), ClinicError> {
    if name.trim().is_empty() {
        return Err(ClinicError::Validation("patient name is required".to_string()));
    }
    Ok(())
}
