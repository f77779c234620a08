#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, HttpServer, web};
use serde_json::Value;

use backend::auth::{AuthMiddleware, AuthSettings, JwtService};
use backend::catalog::Catalog;
use backend::db::{InMemoryUserRepository, UserRepository};
use backend::predictor::{Estimator, EstimatorSettings, PredictionService};
use backend::routes::configure_routes;
use backend::upstream::{ChatbotClient, MlClient};
use shared::InstitutionRecord;

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Nothing listens on the discard port locally, so connections are refused.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

/// Everything the application shares between workers.
#[derive(Clone)]
pub struct TestState {
    pub prediction_service: PredictionService,
    pub chatbot_client: ChatbotClient,
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_service: JwtService,
    pub auth_settings: AuthSettings,
}

pub struct TestStateBuilder {
    catalog: Catalog,
    settings: EstimatorSettings,
    ml_service_url: Option<String>,
    chatbot_url: String,
    seed: u64,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::builtin(),
            settings: EstimatorSettings::default(),
            ml_service_url: None,
            chatbot_url: UNREACHABLE_URL.to_string(),
            seed: 42,
        }
    }

    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn settings(mut self, settings: EstimatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn ml_service(mut self, url: &str) -> Self {
        self.ml_service_url = Some(url.to_string());
        self
    }

    pub fn chatbot(mut self, url: &str) -> Self {
        self.chatbot_url = url.to_string();
        self
    }

    pub fn build(self) -> TestState {
        let timeout = Duration::from_secs(2);
        let estimator = Estimator::with_seed(Arc::new(self.catalog), self.settings, self.seed);
        let ml_client = self
            .ml_service_url
            .map(|url| MlClient::new(&url, timeout).expect("valid ML service url"));

        TestState {
            prediction_service: PredictionService::new(estimator, ml_client),
            chatbot_client: ChatbotClient::new(&self.chatbot_url, timeout)
                .expect("valid chatbot url"),
            user_repo: Arc::new(InMemoryUserRepository::new()),
            jwt_service: JwtService::new(TEST_JWT_SECRET, 1),
            auth_settings: AuthSettings {
                min_password_length: 8,
            },
        }
    }
}

/// Build the application the same way `main.rs` does, minus CORS and the
/// request logger.
pub fn build_test_app(
    state: &TestState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let auth_middleware = AuthMiddleware::new(state.jwt_service.clone());

    App::new()
        .app_data(web::Data::new(state.prediction_service.clone()))
        .app_data(web::Data::new(state.chatbot_client.clone()))
        .app_data(web::Data::from(state.user_repo.clone()))
        .app_data(web::Data::new(state.jwt_service.clone()))
        .app_data(web::Data::new(state.auth_settings))
        .configure(|cfg| configure_routes(cfg, auth_middleware))
}

/// A catalog holding only IIT Madras.
pub fn single_institution_catalog() -> Catalog {
    Catalog::new(vec![InstitutionRecord {
        id: 1,
        name: "IIT Madras".into(),
        course: "Computer Science".into(),
        location: "Chennai".into(),
        category: "General".into(),
        cutoff: 150.0,
    }])
    .expect("valid catalog")
}

/// Start a throwaway HTTP server on an ephemeral port that answers every
/// POST to `/{path}` with `body`. Returns the base URL.
pub fn spawn_json_service(path: &str, body: Value) -> String {
    spawn_service(path, StatusCode::OK, body)
}

/// Like [`spawn_json_service`] but with a chosen status code.
pub fn spawn_service(path: &str, status: StatusCode, body: Value) -> String {
    let route = format!("/{}", path);
    let server = HttpServer::new(move || {
        let body = body.clone();
        App::new().route(
            &route,
            web::post().to(move || {
                let body = body.clone();
                async move { HttpResponse::build(status).json(body) }
            }),
        )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind ephemeral port");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}
