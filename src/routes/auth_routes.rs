// teamline-service/src/routes/auth_routes.rs
use crate::models::{LoginResponse, RegisterRequest, ServiceError, User, UserCredentials};
use crate::utils::{get_user_id_from_request, is_valid_email, jwt, password, user_storage};
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{error, info};
use serde_json::json;
use uuid::Uuid;

// Register a new user
#[post("/auth/register")]
async fn register(data: web::Json<RegisterRequest>) -> Result<HttpResponse, ServiceError> {
    info!("📝 Register request for email: {}", data.email);

    if !is_valid_email(&data.email) {
        return Err(ServiceError::BadRequest(format!(
            "'{}' is not a valid email address.",
            data.email
        )));
    }
    if data.username.len() < 2 {
        return Err(ServiceError::BadRequest(
            "Username must be at least 2 characters.".to_string(),
        ));
    }

    if user_storage::find_user_by_email(&data.email)?.is_some() {
        error!("❌ Email already registered: {}", data.email);
        return Err(ServiceError::Conflict("Email already registered.".to_string()));
    }
    if user_storage::find_user_by_username(&data.username)?.is_some() {
        error!("❌ Username already taken: {}", data.username);
        return Err(ServiceError::Conflict("Username already taken.".to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: data.username.clone(),
        email: data.email.clone(),
        full_name: data.full_name.clone(),
        password_hash: password::hash_password(&data.password)?,
        created_at: Utc::now(),
    };

    user_storage::save_user(&user)?;

    info!("✅ User registered successfully: {}", user.id);

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully",
        "user_id": user.id
    })))
}

// Login and get JWT token
#[post("/auth/login")]
async fn login(credentials: web::Json<UserCredentials>) -> Result<HttpResponse, ServiceError> {
    info!("🔑 Login request for email: {}", credentials.email);

    let user = match user_storage::find_user_by_email(&credentials.email)? {
        Some(user) => user,
        None => {
            error!("❌ User not found: {}", credentials.email);
            return Err(ServiceError::Unauthorized);
        }
    };

    if !password::verify_password(&credentials.password, &user.password_hash)? {
        error!("❌ Invalid password for user: {}", credentials.email);
        return Err(ServiceError::Unauthorized);
    }

    let token = jwt::generate_token(&user)?;

    info!("✅ User logged in successfully: {}", user.id);

    let response = LoginResponse {
        token: token.clone(),
        user_id: user.id,
        username: user.username,
        email: user.email,
    };

    Ok(HttpResponse::Ok()
        .append_header(("Authorization", format!("Bearer {}", token)))
        .json(response))
}

// Get current user info (requires authentication)
#[get("/auth/me")]
async fn me(req: HttpRequest) -> Result<HttpResponse, ServiceError> {
    let user_id = get_user_id_from_request(&req)?;

    let user = user_storage::find_user_by_id(&user_id)?.ok_or(ServiceError::Unauthorized)?;

    Ok(HttpResponse::Ok().json(json!({
        "user_id": user.id,
        "username": user.username,
        "email": user.email,
        "full_name": user.full_name,
        "created_at": user.created_at.timestamp(),
    })))
}

// Register all auth routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register).service(login).service(me);
}
