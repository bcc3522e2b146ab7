use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use clinic_api::cep::lookup_address;
use chrono::{Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use clinic_api::{
    ApiClient, ApiRequest, ApiResponse, AppointmentStatus, DoctorInput, MedicalRecord, Navigator,
    NewAppointment, PatientInput, PrescriptionItem, RegisterRequest, Transport,
};
use clinic_core::{ClinicConfig, ClinicError, MemoryStorage, SessionStore, UserProfile};
use serde_json::{json, Value};

#[derive(Default)]
struct ScriptedTransport {
    responses: RefCell<VecDeque<ApiResponse>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn replying(responses: Vec<ApiResponse>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requests: RefCell::default(),
        }
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClinicError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ClinicError::Transport("no scripted response left".to_string()))
    }
}

struct RecordingNavigator {
    current: RefCell<String>,
    redirects: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    fn at(path: &str) -> Self {
        Self {
            current: RefCell::new(path.to_string()),
            redirects: RefCell::default(),
        }
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.current.borrow().clone()
    }

    fn redirect(&self, path: &str) {
        self.redirects.borrow_mut().push(path.to_string());
        *self.current.borrow_mut() = path.to_string();
    }
}

type TestClient = ApiClient<MemoryStorage, ScriptedTransport, Rc<RecordingNavigator>>;

fn client(
    responses: Vec<ApiResponse>,
    path: &str,
    token: Option<&str>,
) -> (TestClient, Rc<RecordingNavigator>) {
    let config = ClinicConfig {
        api_base_url: "https://clinic.test/api".to_string(),
        ..ClinicConfig::default()
    };
    let session = SessionStore::new(MemoryStorage::new(), &config);
    if let Some(token) = token {
        let profile = UserProfile {
            full_name: "Rita".to_string(),
            email: "rita@clinic.test".to_string(),
            role: Some("Medico".to_string()),
            expires_at: None,
        };
        session.save(token, &profile).expect("save session");
    }
    let navigator = Rc::new(RecordingNavigator::at(path));
    let client = ApiClient::new(
        Rc::new(session),
        ScriptedTransport::replying(responses),
        Rc::clone(&navigator),
        &config,
    );
    (client, navigator)
}

fn json_response(status: u16, body: Value) -> ApiResponse {
    ApiResponse::new(status, body.to_string())
}

/// What a browser in this machine's zone would send for a form value.
fn local_iso(input: &str) -> String {
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M").expect("form datetime");
    Local
        .from_local_datetime(&naive)
        .earliest()
        .expect("unambiguous local time")
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn sample_token() -> String {
    format!(
        "h.{}.s",
        URL_SAFE_NO_PAD.encode(json!({"exp": 4_000_000_000u64, "role": "Admin"}).to_string())
    )
}

#[tokio::test]
async fn bearer_header_is_attached_when_token_is_stored() {
    let (client, _) = client(vec![json_response(200, json!([]))], "/pacientes", Some("abc.def.ghi"));

    client.list_patients().await.expect("list patients");

    let requests = client.transport().requests();
    assert_eq!(requests[0].header_value("Authorization"), Some("Bearer abc.def.ghi"));
}

#[tokio::test]
async fn bearer_header_is_omitted_without_token() {
    let (client, _) = client(vec![json_response(200, json!({"ok": true, "msg": "pong"}))], "/", None);

    let pong = client.ping().await.expect("ping");
    assert!(pong.ok);
    assert_eq!(pong.msg.as_deref(), Some("pong"));
    assert_eq!(client.transport().requests()[0].header_value("Authorization"), None);
}

#[tokio::test]
async fn unauthorized_response_clears_session_and_redirects_to_login() {
    let (client, navigator) = client(vec![ApiResponse::new(401, "")], "/pacientes", Some("abc.def.ghi"));

    let result = client.list_patients().await;

    assert!(matches!(result, Err(ClinicError::Unauthorized)));
    assert!(client.session().load().token.is_none());
    assert!(client.session().load().user.is_none());
    assert_eq!(*navigator.redirects.borrow(), vec!["/login".to_string()]);
    assert_eq!(navigator.current_path(), "/login");
}

#[tokio::test]
async fn unauthorized_on_login_view_does_not_redirect_again() {
    let (client, navigator) = client(vec![ApiResponse::new(401, "")], "/login/", None);

    let result = client.login("rita@clinic.test", "wrong").await;

    assert!(matches!(result, Err(ClinicError::Unauthorized)));
    assert!(navigator.redirects.borrow().is_empty());
}

#[tokio::test]
async fn other_errors_surface_without_touching_session() {
    let (client, navigator) = client(
        vec![ApiResponse::new(500, "database offline")],
        "/consultas",
        Some("abc.def.ghi"),
    );

    let err = client.get_appointment("3").await.expect_err("server error");

    match err {
        ClinicError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database offline");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(client.is_authenticated());
    assert!(navigator.redirects.borrow().is_empty());
}

#[tokio::test]
async fn login_stores_session_used_by_later_requests() {
    let token = sample_token();
    let (client, _) = client(
        vec![
            json_response(
                200,
                json!({
                    "Token": token,
                    "ExpiresAt": "2096-10-02T07:06:40Z",
                    "FullName": "Rita Alves",
                    "Email": "rita@clinic.test",
                    "Role": "Admin"
                }),
            ),
            json_response(200, json!({"Name": "Rita Alves", "Roles": ["Admin"]})),
        ],
        "/login",
        None,
    );

    let response = client.login("rita@clinic.test", "secret").await.expect("login");
    assert_eq!(response.full_name, "Rita Alves");

    let session = client.session().load();
    assert_eq!(session.token.as_deref(), Some(token.as_str()));
    let user = session.user.expect("profile stored");
    assert_eq!(user.role.as_deref(), Some("Admin"));
    assert_eq!(user.expires_at.as_deref(), Some("2096-10-02T07:06:40Z"));

    let me = client.current_user().await.expect("current user");
    assert_eq!(me.name.as_deref(), Some("Rita Alves"));
    assert_eq!(me.roles, vec!["Admin".to_string()]);

    let requests = client.transport().requests();
    assert_eq!(requests[0].body, Some(json!({"email": "rita@clinic.test", "password": "secret"})));
    assert_eq!(requests[0].header_value("Authorization"), None);
    assert_eq!(
        requests[1].header_value("Authorization"),
        Some(format!("Bearer {token}").as_str())
    );
}

#[tokio::test]
async fn login_without_token_in_reply_is_missing_data() {
    let (client, _) = client(vec![json_response(200, json!({"email": "x@clinic.test"}))], "/login", None);

    let result = client.login("x@clinic.test", "pw").await;
    assert!(matches!(result, Err(ClinicError::MissingData)));
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn logout_clears_session() {
    let (client, _) = client(Vec::new(), "/", Some("abc.def.ghi"));
    client.logout();
    assert!(!client.is_authenticated());
    assert!(client.session().profile().is_none());
}

#[tokio::test]
async fn doctors_are_normalized_across_name_fields() {
    let (client, _) = client(
        vec![json_response(
            200,
            json!([
                {"Id": 1, "Nome": "Dr. Paulo", "Crm": "1234", "Uf": "SP"},
                {"id": 2, "fullName": "Dra. Rita", "especialidade": "Cardiologia"}
            ]),
        )],
        "/medicos",
        Some("abc.def.ghi"),
    );

    let doctors = client.list_doctors().await.expect("doctors");
    assert_eq!(doctors[0].name, "Dr. Paulo");
    assert_eq!(doctors[0].crm.as_deref(), Some("1234"));
    assert_eq!(doctors[0].state.as_deref(), Some("SP"));
    assert_eq!(doctors[1].id, "2");
    assert_eq!(doctors[1].name, "Dra. Rita");
    assert_eq!(doctors[1].specialty.as_deref(), Some("Cardiologia"));
}

#[tokio::test]
async fn appointment_filters_and_status_update_use_api_shapes() {
    let (client, _) = client(
        vec![json_response(200, Value::Null), ApiResponse::new(204, "")],
        "/consultas",
        Some("abc.def.ghi"),
    );

    let appointments = client
        .list_appointments(&[("medicoId", "7")])
        .await
        .expect("appointments");
    assert!(appointments.is_empty());

    client
        .update_appointment_status("12", AppointmentStatus::InProgress)
        .await
        .expect("status update");

    let requests = client.transport().requests();
    assert_eq!(requests[0].query, vec![("medicoId".to_string(), "7".to_string())]);
    assert_eq!(requests[1].method, reqwest::Method::PATCH);
    assert_eq!(requests[1].path, "/consultas/12/status");
    assert_eq!(requests[1].body, Some(json!({"Status": "EmAndamento"})));
}

#[tokio::test]
async fn rescheduling_sends_iso_instants() {
    let (client, _) = client(vec![ApiResponse::new(204, "")], "/consultas/4", Some("abc.def.ghi"));

    client
        .reschedule_appointment("4", "2025-11-03T10:00", "2025-11-03T10:30")
        .await
        .expect("reschedule");

    let request = &client.transport().requests()[0];
    assert_eq!(request.path, "/consultas/4/horario");
    assert_eq!(
        request.body,
        Some(json!({
            "inicio": local_iso("2025-11-03T10:00"),
            "fim": local_iso("2025-11-03T10:30"),
        }))
    );
}

#[tokio::test]
async fn empty_prescription_is_rejected_before_sending() {
    let (client, _) = client(Vec::new(), "/consultas/4", Some("abc.def.ghi"));
    let items = vec![PrescriptionItem {
        medication: "  ".to_string(),
        dosage: "1x".to_string(),
        ..PrescriptionItem::default()
    }];

    let result = client.upsert_prescriptions("4", &items).await;

    assert!(matches!(result, Err(ClinicError::Validation(_))));
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn prescriptions_are_posted_as_itens() {
    let (client, _) = client(vec![ApiResponse::new(200, "")], "/consultas/4", Some("abc.def.ghi"));
    let items = vec![PrescriptionItem {
        id: Some("99".to_string()),
        medication: " Dipirona ".to_string(),
        dosage: "500mg 6/6h".to_string(),
        instructions: None,
    }];

    client.upsert_prescriptions("4", &items).await.expect("upsert");

    let request = &client.transport().requests()[0];
    assert_eq!(request.path, "/prescricoes/4");
    assert_eq!(
        request.body,
        Some(json!({"itens": [{"medicamento": "Dipirona", "posologia": "500mg 6/6h", "orientacoes": null}]}))
    );
}

#[tokio::test]
async fn medical_record_requires_complaint_and_history() {
    let (client, _) = client(vec![ApiResponse::new(200, "")], "/consultas/4", Some("abc.def.ghi"));

    let incomplete = MedicalRecord {
        chief_complaint: "Dor torácica".to_string(),
        ..MedicalRecord::default()
    };
    let result = client.upsert_medical_record("4", &incomplete).await;
    assert!(matches!(result, Err(ClinicError::Validation(_))));

    let complete = MedicalRecord {
        present_illness: "Início há 2h".to_string(),
        ..incomplete
    };
    client.upsert_medical_record("4", &complete).await.expect("upsert");

    let requests = client.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body.as_ref().expect("body")["hda"], "Início há 2h");
    assert_eq!(requests[0].body.as_ref().expect("body")["conduta"], "");
}

#[tokio::test]
async fn pdf_links_and_downloads() {
    let (client, _) = client(vec![ApiResponse::new(200, b"%PDF-1.7".to_vec())], "/consultas/4", Some("abc.def.ghi"));

    assert_eq!(
        client.prescription_pdf_url("4", "2"),
        "https://clinic.test/api/prescricoes/4/pdf/2"
    );
    assert_eq!(
        client.medical_record_pdf_url("4"),
        "https://clinic.test/api/prontuarios/4/pdf"
    );

    let bytes = client.download_medical_record_pdf("4").await.expect("pdf");
    assert_eq!(bytes, b"%PDF-1.7".to_vec());
}

#[tokio::test]
async fn billing_by_doctor_hits_doctor_path() {
    let (client, _) = client(
        vec![json_response(200, json!([{"id": 1, "valor": 200, "medicoId": 7, "medicoNome": "Dr. Paulo"}]))],
        "/financeiro",
        Some("abc.def.ghi"),
    );

    let entries = client
        .list_financial_entries_by_doctor("7")
        .await
        .expect("entries");
    assert_eq!(entries[0].doctor_id.as_deref(), Some("7"));
    assert_eq!(entries[0].amount, 200.0);
    assert_eq!(client.transport().requests()[0].path, "/controlefinanceiro/medico/7");
}

#[tokio::test]
async fn cep_lookup_maps_viacep_fields() {
    let transport = ScriptedTransport::replying(vec![
        json_response(
            200,
            json!({
                "cep": "01310-100",
                "logradouro": "Avenida Paulista",
                "complemento": "de 612 a 1510 - lado par",
                "bairro": "Bela Vista",
                "localidade": "São Paulo",
                "uf": "SP"
            }),
        ),
        json_response(200, json!({"erro": "true"})),
    ]);

    let address = lookup_address(&transport, "01310-100")
        .await
        .expect("lookup")
        .expect("address");
    assert_eq!(address.street, "Avenida Paulista");
    assert_eq!(address.city, "São Paulo");
    assert_eq!(address.state, "SP");

    assert_eq!(lookup_address(&transport, "99999-999").await.expect("lookup"), None);
    assert_eq!(lookup_address(&transport, "123").await.expect("lookup"), None);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/ws/01310100/json/");
    assert_eq!(requests[0].header_value("Authorization"), None);
}

#[tokio::test]
async fn caller_authorization_header_is_not_duplicated() {
    let (client, _) = client(vec![json_response(200, json!({}))], "/", Some("abc.def.ghi"));

    client
        .send(ApiRequest::get("/auth/me").header("Authorization", "Bearer other"))
        .await
        .expect("send");

    let request = &client.transport().requests()[0];
    let authorization: Vec<&str> = request
        .headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case("authorization"))
        .map(|(_, value)| value.as_str())
        .collect();
    assert_eq!(authorization, vec!["Bearer other"]);
}

#[tokio::test]
async fn register_posts_account_and_tolerates_empty_reply() {
    let (client, _) = client(
        vec![
            json_response(201, json!({"Id": 5, "Email": "novo@clinic.test"})),
            ApiResponse::new(204, ""),
        ],
        "/usuarios/novo",
        Some("abc.def.ghi"),
    );
    let request = RegisterRequest {
        email: "novo@clinic.test".to_string(),
        password: "Senha@123".to_string(),
        full_name: "Novo Usuário".to_string(),
        role: "Recepcao".to_string(),
    };

    let created = client.register(&request).await.expect("register");
    assert_eq!(created, json!({"id": 5, "email": "novo@clinic.test"}));

    let empty = client.register(&request).await.expect("register");
    assert_eq!(empty, json!({}));

    let requests = client.transport().requests();
    assert_eq!(requests[0].method, reqwest::Method::POST);
    assert_eq!(requests[0].path, "/auth/register");
    assert_eq!(
        requests[0].body,
        Some(json!({
            "email": "novo@clinic.test",
            "password": "Senha@123",
            "fullName": "Novo Usuário",
            "role": "Recepcao"
        }))
    );
}

#[tokio::test]
async fn patient_writes_send_form_payload() {
    let (client, _) = client(
        vec![ApiResponse::new(201, ""), ApiResponse::new(204, "")],
        "/pacientes/novo",
        Some("abc.def.ghi"),
    );
    let input = PatientInput {
        name: " Maria Clara ".to_string(),
        cpf: "123.456.789-00".to_string(),
        ..PatientInput::default()
    };

    client.create_patient(&input).await.expect("create");
    client.update_patient("8", &input).await.expect("update");

    let requests = client.transport().requests();
    assert_eq!(requests[0].method, reqwest::Method::POST);
    assert_eq!(requests[0].path, "/pacientes");
    assert_eq!(requests[1].method, reqwest::Method::PUT);
    assert_eq!(requests[1].path, "/pacientes/8");
    for request in &requests {
        let body = request.body.as_ref().expect("body");
        assert_eq!(body["nome"], "Maria Clara");
        assert_eq!(body["cpf"], "123.456.789-00");
        assert_eq!(body["dataNascimento"], Value::Null);
        assert_eq!(body["email"], Value::Null);
    }
}

#[tokio::test]
async fn blank_patient_name_is_rejected_before_sending() {
    let (client, _) = client(Vec::new(), "/pacientes/novo", Some("abc.def.ghi"));
    let input = PatientInput {
        name: "   ".to_string(),
        ..PatientInput::default()
    };

    let created = client.create_patient(&input).await;
    let updated = client.update_patient("8", &input).await;

    assert!(matches!(created, Err(ClinicError::Validation(_))));
    assert!(matches!(updated, Err(ClinicError::Validation(_))));
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn unknown_status_is_rejected_before_sending() {
    let (client, _) = client(Vec::new(), "/consultas/12", Some("abc.def.ghi"));

    let result = client
        .update_appointment_status("12", AppointmentStatus::Unknown)
        .await;

    assert!(matches!(result, Err(ClinicError::Validation(_))));
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn new_appointment_is_posted_with_local_times() {
    let (client, _) = client(vec![ApiResponse::new(201, "")], "/consultas/nova", Some("abc.def.ghi"));
    let input = NewAppointment {
        patient_id: "4".to_string(),
        doctor_id: "7".to_string(),
        starts_at: "2025-10-01T09:00".to_string(),
        ends_at: "2025-10-01T09:30".to_string(),
    };

    client.create_appointment(&input).await.expect("create");

    let request = &client.transport().requests()[0];
    assert_eq!(request.method, reqwest::Method::POST);
    assert_eq!(request.path, "/consultas");
    assert_eq!(
        request.body,
        Some(json!({
            "pacienteId": 4,
            "medicoId": 7,
            "inicio": local_iso("2025-10-01T09:00"),
            "fim": local_iso("2025-10-01T09:30"),
        }))
    );
}

#[tokio::test]
async fn deletes_target_resource_paths() {
    let (client, _) = client(
        (0..4).map(|_| ApiResponse::new(204, "")).collect(),
        "/",
        Some("abc.def.ghi"),
    );

    client.delete_patient("1").await.expect("delete patient");
    client.delete_doctor("2").await.expect("delete doctor");
    client.delete_appointment("3").await.expect("delete appointment");
    client.delete_prescription("4").await.expect("delete prescription");

    let requests = client.transport().requests();
    assert!(requests
        .iter()
        .all(|request| request.method == reqwest::Method::DELETE && request.body.is_none()));
    let paths: Vec<&str> = requests.iter().map(|request| request.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/pacientes/1", "/medicos/2", "/consultas/3", "/prescricoes/4"]
    );
}

#[tokio::test]
async fn doctor_writes_use_portuguese_fields() {
    let (client, _) = client(vec![ApiResponse::new(201, "")], "/medicos/novo", Some("abc.def.ghi"));
    let input = DoctorInput {
        name: "Dr. Paulo".to_string(),
        crm: "1234".to_string(),
        state: "SP".to_string(),
        ..DoctorInput::default()
    };

    client.create_doctor(&input).await.expect("create");

    let request = &client.transport().requests()[0];
    assert_eq!(request.path, "/medicos");
    let body = request.body.as_ref().expect("body");
    assert_eq!(body["nome"], "Dr. Paulo");
    assert_eq!(body["uf"], "SP");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn financial_entry_is_fetched_by_id() {
    let (client, _) = client(
        vec![json_response(
            200,
            json!({"Id": 3, "Valor": "150,50", "Data": "2025-08-01T10:00:00", "PacienteNome": "Joao"}),
        )],
        "/financeiro/3",
        Some("abc.def.ghi"),
    );

    let entry = client.get_financial_entry("3").await.expect("entry");

    assert_eq!(entry.id, "3");
    assert_eq!(entry.amount, 150.5);
    assert_eq!(entry.patient_name.as_deref(), Some("Joao"));
    assert_eq!(
        entry.date.map(|date| date.to_rfc3339_opts(SecondsFormat::Secs, true)),
        Some("2025-08-01T10:00:00Z".to_string())
    );
    assert_eq!(client.transport().requests()[0].path, "/controlefinanceiro/3");
}

#[tokio::test]
async fn prescription_pdf_is_downloaded_with_bearer() {
    let (client, _) = client(vec![ApiResponse::new(200, b"%PDF-1.4".to_vec())], "/consultas/4", Some("abc.def.ghi"));

    let bytes = client.download_prescription_pdf("4", "2").await.expect("pdf");

    assert_eq!(bytes, b"%PDF-1.4".to_vec());
    let request = &client.transport().requests()[0];
    assert_eq!(request.method, reqwest::Method::GET);
    assert_eq!(request.path, "/prescricoes/4/pdf/2");
    assert_eq!(request.header_value("Authorization"), Some("Bearer abc.def.ghi"));
}
