// teamline-service/src/utils/mod.rs
use crate::models::{Claims, ServiceError, User};
use actix_web::http::header;
use actix_web::HttpRequest;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use regex::Regex;
use std::env;

pub mod friend_storage;
pub mod notify;
pub mod project_storage;
pub mod team_storage;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex");
}

// Cheap shape check; actual deliverability is the mail provider's problem
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

// Resolve the calling user from the bearer token
pub fn get_user_id_from_request(req: &HttpRequest) -> Result<String, ServiceError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ServiceError::Unauthorized)?;

    let token = jwt::extract_token_from_header(auth_header)?;
    let claims = jwt::decode_token(&token)?;

    Ok(claims.sub)
}

// JWT utility functions
pub mod jwt {
    use super::*;

    // Get JWT secret from environment or use default
    fn get_jwt_secret() -> String {
        env::var("JWT_SECRET").unwrap_or_else(|_| "teamline_super_secret_key".to_string())
    }

    // Generate a new JWT token for a user
    pub fn generate_token(user: &User) -> Result<String, ServiceError> {
        let secret = get_jwt_secret();
        let expiration = Utc::now()
            .checked_add_signed(Duration::days(7))
            .expect("Valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: expiration,
            iat: Utc::now().timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .map_err(|_| ServiceError::InternalServerError)
    }

    // Validate and decode a JWT token
    pub fn decode_token(token: &str) -> Result<Claims, ServiceError> {
        let secret = get_jwt_secret();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| ServiceError::Unauthorized)
    }

    // Extract JWT from Authorization header
    pub fn extract_token_from_header(auth_header: &str) -> Result<String, ServiceError> {
        if !auth_header.starts_with("Bearer ") {
            return Err(ServiceError::Unauthorized);
        }

        Ok(auth_header.trim_start_matches("Bearer ").to_string())
    }
}

// Password utility functions
pub mod password {
    use super::*;

    // Hash a password using bcrypt
    pub fn hash_password(password: &str) -> Result<String, ServiceError> {
        hash(password, DEFAULT_COST).map_err(|_| ServiceError::InternalServerError)
    }

    // Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
        verify(password, hash).map_err(|_| ServiceError::InternalServerError)
    }
}

// Shared JSON-document storage primitives. Every ledger keeps one JSON
// file per record; natural-key file names double as the uniqueness
// constraint, and create-if-absent is the concurrency race-breaker.
pub mod storage {
    use super::*;
    use log::{error, warn};
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    lazy_static! {
        static ref STORAGE_ROOT: String =
            env::var("STORAGE_ROOT").unwrap_or_else(|_| "./storage".to_string());
    }

    pub fn dir(name: &str) -> PathBuf {
        Path::new(STORAGE_ROOT.as_str()).join(name)
    }

    // Create every ledger directory up front so request paths never race
    // over mkdir.
    pub fn ensure_storage_dirs() -> std::io::Result<()> {
        for name in [
            "users",
            "teams",
            "memberships",
            "friendships",
            "projects",
            "milestones",
            "tasks",
        ] {
            fs::create_dir_all(dir(name))?;
        }
        Ok(())
    }

    pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ServiceError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read {}: {:?}", path.display(), e);
            ServiceError::InternalServerError
        })?;

        let value = serde_json::from_str(&content).map_err(|e| {
            error!("Failed to parse {}: {:?}", path.display(), e);
            ServiceError::InternalServerError
        })?;

        Ok(Some(value))
    }

    pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ServiceError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            error!("Failed to serialize {}: {:?}", path.display(), e);
            ServiceError::InternalServerError
        })?;

        fs::write(path, json).map_err(|e| {
            error!("Failed to write {}: {:?}", path.display(), e);
            ServiceError::InternalServerError
        })
    }

    // Atomic create-if-absent: returns false when a record already holds
    // this natural key. This is what breaks ties between concurrent writers.
    pub fn create_json<T: Serialize>(path: &Path, value: &T) -> Result<bool, ServiceError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| {
            error!("Failed to serialize {}: {:?}", path.display(), e);
            ServiceError::InternalServerError
        })?;

        let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => {
                error!("Failed to create {}: {:?}", path.display(), e);
                return Err(ServiceError::InternalServerError);
            }
        };

        file.write_all(json.as_bytes()).map_err(|e| {
            error!("Failed to write {}: {:?}", path.display(), e);
            ServiceError::InternalServerError
        })?;

        Ok(true)
    }

    // Returns false if the record was already gone
    pub fn remove_json(path: &Path) -> Result<bool, ServiceError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                error!("Failed to delete {}: {:?}", path.display(), e);
                Err(ServiceError::InternalServerError)
            }
        }
    }

    pub fn scan<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, ServiceError> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();

        for entry in fs::read_dir(dir).map_err(|e| {
            error!("Failed to read directory {}: {:?}", dir.display(), e);
            ServiceError::InternalServerError
        })? {
            let entry = entry.map_err(|e| {
                error!("Failed to read directory entry: {:?}", e);
                ServiceError::InternalServerError
            })?;

            let path = entry.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let content = fs::read_to_string(&path).map_err(|e| {
                error!("Failed to read {}: {:?}", path.display(), e);
                ServiceError::InternalServerError
            })?;

            match serde_json::from_str(&content) {
                Ok(record) => records.push(record),
                Err(e) => {
                    // A torn record must not take the whole listing down
                    warn!("Skipping unparsable record {}: {:?}", path.display(), e);
                }
            }
        }

        Ok(records)
    }
}

// User storage utilities
pub mod user_storage {
    use super::*;
    use std::path::PathBuf;

    fn user_path(user_id: &str) -> PathBuf {
        storage::dir("users").join(format!("{}.json", user_id))
    }

    // Save a user to storage
    pub fn save_user(user: &User) -> Result<(), ServiceError> {
        storage::write_json(&user_path(&user.id), user)
    }

    // Find a user by ID
    pub fn find_user_by_id(id: &str) -> Result<Option<User>, ServiceError> {
        storage::read_json(&user_path(id))
    }

    // Find a user by email (case-insensitive)
    pub fn find_user_by_email(email: &str) -> Result<Option<User>, ServiceError> {
        let users: Vec<User> = storage::scan(&storage::dir("users"))?;
        Ok(users
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email)))
    }

    // Find a user by username (exact match)
    pub fn find_user_by_username(username: &str) -> Result<Option<User>, ServiceError> {
        let users: Vec<User> = storage::scan(&storage::dir("users"))?;
        Ok(users.into_iter().find(|user| user.username == username))
    }

    // Substring search over usernames, excluding the caller
    pub fn search_by_username(
        query: &str,
        exclude_user_id: &str,
        limit: usize,
    ) -> Result<Vec<User>, ServiceError> {
        let needle = query.to_lowercase();
        let users: Vec<User> = storage::scan(&storage::dir("users"))?;

        Ok(users
            .into_iter()
            .filter(|user| {
                user.id != exclude_user_id && user.username.to_lowercase().contains(&needle)
            })
            .take(limit)
            .collect())
    }
}
