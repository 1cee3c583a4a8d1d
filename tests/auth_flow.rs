use axum_booking_api::{
    dto::auth::{ForgotPasswordRequest, LoginRequest, RegisterRequest, UpdatePasswordRequest},
    error::AppError,
    services::auth_service,
};

mod common;

// Registration, email verification, login and password reset against a real
// database; self-skips when none is configured.
#[tokio::test]
async fn register_verify_login_and_reset_flow() -> anyhow::Result<()> {
    unsafe { std::env::set_var("JWT_SECRET", "integration-test-secret") };

    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    // Short password is rejected and nothing is persisted.
    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            password: "short".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let count: (i64,) = sqlx::query_as("SELECT count(*) FROM users")
        .fetch_one(&state.pool)
        .await?;
    assert_eq!(count.0, 0);

    // Blank fields are rejected too.
    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "   ".into(),
            email: "ann@example.com".into(),
            password: "password1".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Successful registration acknowledges without returning the account.
    auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            password: "password1".into(),
        },
    )
    .await?;

    // Duplicate email is rejected.
    let err = auth_service::register_user(
        &state,
        RegisterRequest {
            name: "Ann Again".into(),
            email: "ann@example.com".into(),
            password: "password2".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Login is rejected until the account is verified, even with the right
    // password.
    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: "ann@example.com".into(),
            password: "password1".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // A wrong verification token is a 404.
    let err = auth_service::verify_account(&state, "not-a-token")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let (token,): (Option<String>,) =
        sqlx::query_as("SELECT token FROM users WHERE email = $1")
            .bind("ann@example.com")
            .fetch_one(&state.pool)
            .await?;
    let token = token.expect("verification token set at registration");

    auth_service::verify_account(&state, &token).await?;

    // The one-time token is cleared by verification.
    let err = auth_service::verify_account(&state, &token)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Verified account logs in and receives a credential.
    let resp = auth_service::login_user(
        &state,
        LoginRequest {
            email: "ann@example.com".into(),
            password: "password1".into(),
        },
    )
    .await?;
    assert!(!resp.data.unwrap().token.is_empty());

    // Wrong password is still rejected.
    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: "ann@example.com".into(),
            password: "password9".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // Password reset: unknown email is a 404.
    let err = auth_service::forgot_password(
        &state,
        ForgotPasswordRequest {
            email: "nobody@example.com".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    auth_service::forgot_password(
        &state,
        ForgotPasswordRequest {
            email: "ann@example.com".into(),
        },
    )
    .await?;

    let (reset_token, purpose): (Option<String>, Option<String>) =
        sqlx::query_as("SELECT token, token_purpose FROM users WHERE email = $1")
            .bind("ann@example.com")
            .fetch_one(&state.pool)
            .await?;
    let reset_token = reset_token.expect("reset token set");
    assert_eq!(purpose.as_deref(), Some("reset"));

    auth_service::verify_reset_token(&state, &reset_token).await?;
    let err = auth_service::verify_reset_token(&state, "bogus")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // The reset path enforces the same password minimum.
    let err = auth_service::update_password(
        &state,
        &reset_token,
        UpdatePasswordRequest {
            password: "tiny".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    auth_service::update_password(
        &state,
        &reset_token,
        UpdatePasswordRequest {
            password: "fresh-password".into(),
        },
    )
    .await?;

    // New password works, the old one does not, and the token is spent.
    auth_service::login_user(
        &state,
        LoginRequest {
            email: "ann@example.com".into(),
            password: "fresh-password".into(),
        },
    )
    .await?;
    let err = auth_service::login_user(
        &state,
        LoginRequest {
            email: "ann@example.com".into(),
            password: "password1".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
    let err = auth_service::update_password(
        &state,
        &reset_token,
        UpdatePasswordRequest {
            password: "another-password".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}
