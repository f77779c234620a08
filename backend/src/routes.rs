use actix_web::{HttpResponse, web};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use shared::{ChatRequest, PredictionRequest};

use crate::auth::middleware::AuthMiddleware;
use crate::auth::routes as auth_routes;
use crate::errors::{ApiError, json_error_handler, method_not_allowed};
use crate::predictor::PredictionService;
use crate::predictor::normalizer;
use crate::upstream::ChatbotClient;

pub const PREDICTION_SOURCE_HEADER: &str = "X-Prediction-Source";

const CHATBOT_APOLOGY: &str =
    "Sorry, the chatbot service is currently unavailable. Please try again later.";

pub fn configure_routes(cfg: &mut web::ServiceConfig, auth_middleware: AuthMiddleware) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(
                web::resource("/predict")
                    .route(web::post().to(predict))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/colleges")
                    .route(web::get().to(list_colleges))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/chatbot")
                    .route(web::post().to(chatbot))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::scope("/auth")
                    .service(
                        web::resource("/register")
                            .route(web::post().to(auth_routes::register))
                            .default_service(web::to(method_not_allowed)),
                    )
                    .service(
                        web::resource("/login")
                            .route(web::post().to(auth_routes::login))
                            .default_service(web::to(method_not_allowed)),
                    )
                    .service(
                        web::resource("/logout")
                            .route(web::post().to(auth_routes::logout))
                            .default_service(web::to(method_not_allowed)),
                    )
                    .service(
                        web::resource("/me")
                            .route(web::get().to(auth_routes::me))
                            .default_service(web::to(method_not_allowed))
                            .wrap(auth_middleware),
                    ),
            ),
    );
}

async fn predict(
    body: web::Json<PredictionRequest>,
    service: web::Data<PredictionService>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate().map_err(ApiError::Validation)?;

    info!(
        "Prediction request: rank={}, course={:?}, category={:?}, location={:?}",
        request.rank, request.course, request.category, request.location
    );

    let prediction = service.predict(&request).await.map_err(|e| {
        error!("Prediction failed: {}", e);
        ApiError::Internal("Failed to compute predictions".to_string())
    })?;

    info!(
        "Returning {} predictions ({})",
        prediction.results.len(),
        prediction.source
    );

    Ok(HttpResponse::Ok()
        .insert_header((PREDICTION_SOURCE_HEADER, prediction.source.as_ref()))
        .json(prediction.results))
}

#[derive(Debug, Deserialize)]
struct CollegeFilter {
    course: Option<String>,
    category: Option<String>,
}

/// Optional `course` / `category` query parameters are normalized the same
/// way prediction requests are, so `?course=Electrical` finds EEE colleges.
async fn list_colleges(
    query: web::Query<CollegeFilter>,
    service: web::Data<PredictionService>,
) -> HttpResponse {
    let course = query
        .course
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(normalizer::normalize_course);
    let category = query
        .category
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .map(normalizer::normalize_category);

    HttpResponse::Ok().json(service.catalog().filter(course, category))
}

async fn chatbot(
    body: web::Json<ChatRequest>,
    client: web::Data<ChatbotClient>,
) -> Result<HttpResponse, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::Validation("Message is required".to_string()));
    }

    match client.chat(message).await {
        Ok(reply) => Ok(HttpResponse::Ok().json(reply)),
        Err(e) => {
            warn!("Chatbot service unavailable: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({
                "response": CHATBOT_APOLOGY
            })))
        }
    }
}
