use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use std::env;
use std::io;
use std::sync::Arc;

use backend::auth::{AuthMiddleware, AuthSettings, JwtService};
use backend::catalog::Catalog;
use backend::config::AppConfig;
use backend::db::{DynamoDbUserRepository, InMemoryUserRepository, UserRepository};
use backend::predictor::matcher::MatchPolicy;
use backend::predictor::{Estimator, EstimatorSettings, PredictionService};
use backend::routes::configure_routes;
use backend::upstream::{ChatbotClient, MlClient};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    log::error!("{}: {}", context, err);
    io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let config = AppConfig::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    let catalog = match &config.catalog_path {
        Some(path) => {
            Catalog::load(path).map_err(|e| startup_error("Failed to load catalog", e))?
        }
        None => {
            log::info!("COLLEGE_CATALOG_PATH not set, using built-in catalog");
            Catalog::builtin()
        }
    };
    let catalog = Arc::new(catalog);

    let settings = EstimatorSettings {
        match_policy: MatchPolicy {
            allow_fallback_match: config.allow_fallback_match,
            ..MatchPolicy::default()
        },
        assign_tiers: config.assign_tiers,
    };
    let estimator = match config.predictor_seed {
        Some(seed) => {
            log::info!("Predictor jitter seeded with {}", seed);
            Estimator::with_seed(catalog, settings, seed)
        }
        None => Estimator::new(catalog, settings),
    };

    let ml_client = match &config.ml_service_url {
        Some(url) => {
            let client = MlClient::new(url, config.upstream_timeout)
                .map_err(|e| startup_error("Invalid ML_SERVICE_URL", e))?;
            log::info!("Recommendation service: {}", client.predict_url());
            Some(client)
        }
        None => {
            log::info!("ML_SERVICE_URL not set, predictions are computed locally");
            None
        }
    };
    let prediction_service = PredictionService::new(estimator, ml_client);

    let chatbot_client = ChatbotClient::new(&config.chatbot_service_url, config.upstream_timeout)
        .map_err(|e| startup_error("Invalid CHATBOT_API_URL", e))?;

    let user_repo: Arc<dyn UserRepository> = match &config.users_table {
        Some(users_table) => {
            let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
            let dynamodb_client = DynamoDbClient::new(&aws_config);
            log::info!("Using DynamoDB user table {}", users_table);
            Arc::new(DynamoDbUserRepository::new(
                dynamodb_client,
                users_table.clone(),
            ))
        }
        None => {
            log::warn!("DYNAMODB_USERS_TABLE not set, accounts are kept in memory only");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_ttl_hours);
    let auth_middleware = AuthMiddleware::new(jwt_service.clone());
    let auth_settings = AuthSettings {
        min_password_length: config.min_password_length,
    };

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(prediction_service.clone()))
            .app_data(web::Data::new(chatbot_client.clone()))
            .app_data(web::Data::from(user_repo.clone()))
            .app_data(web::Data::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_settings))
            .configure(|cfg| configure_routes(cfg, auth_middleware.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
