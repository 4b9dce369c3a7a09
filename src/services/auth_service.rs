use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use serde_json::Value;

use crate::{
    dto::auth::{Claims, LoginRequest, LoginResponse, RegisterRequest},
    error::{AppError, AppResult, FieldError},
    models::{Account, UserProfile},
    remote::{self, ACCOUNTS},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::is_email,
};

const MIN_PASSWORD_LEN: usize = 6;
const TOKEN_TTL_HOURS: i64 = 24;

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<UserProfile>> {
    let RegisterRequest {
        full_name,
        email,
        password,
        phone,
    } = payload;
    let email = email.trim().to_lowercase();

    let mut errors = Vec::new();
    if full_name.trim().is_empty() {
        errors.push(FieldError::new("full_name", "Full name is required"));
    }
    if !is_email(&email) {
        errors.push(FieldError::new("email", "Enter a valid email address"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    if find_account(state, &email).await?.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();

    let account = Account {
        id: String::new(),
        email: email.clone(),
        password_hash,
    };
    let user_id = state
        .remote
        .add(ACCOUNTS, remote::encode(&account)?)
        .await?;

    let profile = UserProfile {
        id: user_id,
        full_name: full_name.trim().to_string(),
        email,
        phone: phone.trim().to_string(),
        image_path: None,
    };
    let profile = state.profiles.save_profile(profile).await?;
    tracing::info!(user_id = %profile.id, "user registered");

    Ok(ApiResponse::success("User created", profile, None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let email = email.trim().to_lowercase();

    let account = match find_account(state, &email).await? {
        Some(account) => account,
        None => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&account.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let token = issue_token(&account.id, &account.email, &state.jwt_secret)?;
    let profile = state.profiles.get_profile(&account.id).await?;
    tracing::info!(user_id = %account.id, "user logged in");

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token, profile },
        Some(Meta::empty()),
    ))
}

pub fn issue_token(user_id: &str, email: &str, secret: &str) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

async fn find_account(state: &AppState, email: &str) -> AppResult<Option<Account>> {
    let docs = state
        .remote
        .find_by_field(ACCOUNTS, "email", &Value::String(email.to_string()))
        .await?;
    docs.into_iter().next().map(|doc| doc.decode()).transpose()
}
