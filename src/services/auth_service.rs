use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::dto::auth::{
    Claims, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    UpdatePasswordRequest, UserProfile,
};
use crate::{
    audit::log_audit,
    error::{AppError, AppResult},
    mailer,
    middleware::auth::{AuthUser, ensure_admin},
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

const MIN_PASSWORD_LENGTH: usize = 8;

const TOKEN_PURPOSE_VERIFY: &str = "verify";
const TOKEN_PURPOSE_RESET: &str = "reset";

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let RegisterRequest {
        name,
        email,
        password,
    } = payload;
    let name = name.trim().to_string();
    let email = email.trim().to_string();

    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }
    if password.trim().len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;
    let id = Uuid::new_v4();
    let token = one_time_token();

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, token, token_purpose)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name.as_str())
    .bind(email.as_str())
    .bind(password_hash)
    .bind(token.as_str())
    .bind(TOKEN_PURPOSE_VERIFY)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = state
        .mailer
        .send(mailer::account_verification(&user.name, &user.email, &token))
        .await
    {
        tracing::warn!(error = %err, "verification email failed");
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_register",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::message(
        "User created, check your email to confirm your account",
    ))
}

pub async fn verify_account(
    state: &AppState,
    token: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let updated: Option<(Uuid,)> = sqlx::query_as(
        r#"
        UPDATE users
        SET verified = TRUE, token = NULL, token_purpose = NULL
        WHERE token = $1 AND token_purpose = $2
        RETURNING id
        "#,
    )
    .bind(token)
    .bind(TOKEN_PURPOSE_VERIFY)
    .fetch_optional(&state.pool)
    .await?;

    if updated.is_none() {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::message("Account confirmed"))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, password } = payload;
    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::Unauthorized("Invalid email or password".into())),
    };

    if !user.verified {
        return Err(AppError::Unauthorized(
            "Account has not been confirmed yet".into(),
        ));
    }

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    let argon2 = Argon2::default();
    if argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role.clone(),
        exp: expiration.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "user_login",
        Some("users"),
        Some(serde_json::json!({ "user_id": user.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse { token },
        Some(Meta::empty()),
    ))
}

pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(&state.pool)
        .await?;

    let user = match user {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let token = one_time_token();
    sqlx::query("UPDATE users SET token = $2, token_purpose = $3 WHERE id = $1")
        .bind(user.id)
        .bind(token.as_str())
        .bind(TOKEN_PURPOSE_RESET)
        .execute(&state.pool)
        .await?;

    if let Err(err) = state
        .mailer
        .send(mailer::password_reset(&user.name, &user.email, &token))
        .await
    {
        tracing::warn!(error = %err, "password reset email failed");
    }

    Ok(ApiResponse::message("We sent an email with instructions"))
}

pub async fn verify_reset_token(
    state: &AppState,
    token: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let exist: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM users WHERE token = $1 AND token_purpose = $2")
            .bind(token)
            .bind(TOKEN_PURPOSE_RESET)
            .fetch_optional(&state.pool)
            .await?;

    if exist.is_none() {
        return Err(AppError::BadRequest("Invalid token".to_string()));
    }

    Ok(ApiResponse::message("Token is valid"))
}

pub async fn update_password(
    state: &AppState,
    token: &str,
    payload: UpdatePasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    if payload.password.trim().len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    let password_hash = hash_password(&payload.password)?;
    let updated: Option<(Uuid,)> = sqlx::query_as(
        r#"
        UPDATE users
        SET password_hash = $2, token = NULL, token_purpose = NULL
        WHERE token = $1 AND token_purpose = $3
        RETURNING id
        "#,
    )
    .bind(token)
    .bind(password_hash)
    .bind(TOKEN_PURPOSE_RESET)
    .fetch_optional(&state.pool)
    .await?;

    let user_id = match updated {
        Some((id,)) => id,
        None => return Err(AppError::BadRequest("Invalid token".to_string())),
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user_id),
        "password_update",
        Some("users"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::message("Password updated"))
}

pub async fn get_profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<UserProfile>> {
    let profile: Option<UserProfile> =
        sqlx::query_as("SELECT id, name, email, role FROM users WHERE id = $1")
            .bind(user.user_id)
            .fetch_optional(&state.pool)
            .await?;

    let profile = match profile {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success("Profile", profile, None))
}

pub async fn admin_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<UserProfile>> {
    ensure_admin(user)?;
    get_profile(state, user).await
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn one_time_token() -> String {
    Uuid::new_v4().simple().to_string()
}
