#![allow(dead_code)]

use std::sync::Arc;

use axum_booking_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    entity::users::ActiveModel as UserActive,
    mailer::NoopMailer,
    state::AppState,
    storage::NoopStorage,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use uuid::Uuid;

/// Connect, migrate and truncate. Returns `None` (and prints a notice) when
/// no database is configured so the flow tests self-skip.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE appointment_services, appointments, comments, service_images, audit_logs, services, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(AppState {
        pool,
        orm,
        storage: Arc::new(NoopStorage::new()),
        mailer: Arc::new(NoopMailer),
    }))
}

pub async fn create_user(
    state: &AppState,
    name: &str,
    email: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        role: Set(role.into()),
        verified: Set(true),
        token: Set(None),
        token_purpose: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
