use clinic_core::{ClinicError, Storage};

use crate::models::{Doctor, DoctorInput};
use crate::schema::Resource;
use crate::transport::{ApiRequest, Transport};
use crate::{ApiClient, Navigator};

impl<S: Storage, T: Transport, N: Navigator> ApiClient<S, T, N> {
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, ClinicError> {
        self.fetch_list(ApiRequest::get("/medicos"), Resource::Doctor)
            .await
    }

    pub async fn get_doctor(&self, id: &str) -> Result<Doctor, ClinicError> {
        self.fetch(ApiRequest::get(format!("/medicos/{id}")), Resource::Doctor)
            .await
    }

    pub async fn create_doctor(&self, input: &DoctorInput) -> Result<(), ClinicError> {
        let body = serde_json::to_value(input)?;
        self.execute(ApiRequest::post("/medicos").json(body)).await
    }

    pub async fn update_doctor(&self, id: &str, input: &DoctorInput) -> Result<(), ClinicError> {
        let body = serde_json::to_value(input)?;
        self.execute(ApiRequest::put(format!("/medicos/{id}")).json(body))
            .await
    }

    pub async fn delete_doctor(&self, id: &str) -> Result<(), ClinicError> {
        self.execute(ApiRequest::delete(format!("/medicos/{id}")))
            .await
    }
}
