use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{HttpResponse, web};
use log::{error, info};
use serde_json::json;

use crate::db::{NewUser, UserRepository};
use crate::errors::{ApiError, ErrorResponse};

use super::jwt::JwtService;
use super::middleware::{AuthenticatedUser, TOKEN_COOKIE};
use super::models::{AuthResponse, AuthUser, LoginRequest, RegisterRequest, RegisterResponse};
use super::password;

/// Registration policy shared with the handlers.
#[derive(Debug, Clone, Copy)]
pub struct AuthSettings {
    pub min_password_length: usize,
}

pub async fn register(
    body: web::Json<RegisterRequest>,
    users: web::Data<dyn UserRepository>,
    settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let name = body.name.trim();
    let email = body.email.trim();

    if name.is_empty() || email.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation(
            "Name, email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    password::validate_password_strength(&body.password, settings.min_password_length)
        .map_err(ApiError::Validation)?;

    let password_hash = password::hash_password(&body.password).map_err(|e| {
        error!("Password hashing failed: {}", e);
        ApiError::Internal("Internal server error".to_string())
    })?;

    let user = users
        .insert(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    info!("User registered successfully: {} ({})", user.email, user.id);

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "User created successfully".to_string(),
        user: user.profile(),
    }))
}

pub async fn login(
    body: web::Json<LoginRequest>,
    users: web::Data<dyn UserRepository>,
    jwt_service: web::Data<JwtService>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let user = users
        .authenticate(&body.email, &body.password)
        .await?
        .ok_or_else(|| {
            info!("Failed login attempt for {}", body.email.trim());
            ApiError::InvalidCredentials
        })?;

    let token = jwt_service
        .generate_token(&AuthUser::from(&user))
        .map_err(|e| {
            error!("Failed to generate JWT token: {:?}", e);
            ApiError::Internal("Failed to generate authentication token".to_string())
        })?;

    let cookie = Cookie::build(TOKEN_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(CookieDuration::seconds(jwt_service.ttl().num_seconds()))
        .finish();

    info!("User logged in: {}", user.email);

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: user.profile(),
    }))
}

pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).json(json!({
        "message": "Logged out successfully"
    }))
}

pub async fn me(
    user: AuthenticatedUser,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, ApiError> {
    info!("/api/auth/me called for user ID: {}", user.0);

    match users.find_by_id(user.0).await? {
        Some(user_data) => Ok(HttpResponse::Ok().json(user_data.profile())),
        None => {
            log::warn!("Token refers to unknown user ID: {}", user.0);
            Ok(HttpResponse::Unauthorized().json(ErrorResponse::new("Unknown user")))
        }
    }
}
