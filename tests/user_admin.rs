mod common;

use travel_booking_api::{
    dto::users::{CreateUserRequest, UpdateUserRequest},
    error::AppError,
    models::Role,
    services::user_service,
};
use uuid::Uuid;

use common::{Outcome, create_property, create_user, database_url, setup_state};

#[tokio::test]
async fn hosts_with_properties_cannot_be_demoted() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Success).await?;

    let admin = create_user(&state, Role::Admin).await?;
    let host = create_user(&state, Role::Host).await?;
    let idle_host = create_user(&state, Role::Host).await?;
    create_property(&state, &host, 12_000).await?;

    let demote = || UpdateUserRequest {
        role: Some(Role::Guest),
        ..Default::default()
    };

    let err = user_service::update_user(&state, &admin, host.user_id, demote())
        .await
        .expect_err("owner demoted");
    assert!(matches!(err, AppError::Validation { field: "role", .. }));

    let demoted = user_service::update_user(&state, &admin, idle_host.user_id, demote())
        .await?
        .data
        .expect("user");
    assert_eq!(demoted.role, Role::Guest);

    Ok(())
}

#[tokio::test]
async fn admins_create_any_role_with_valid_credentials() -> anyhow::Result<()> {
    let Some(url) = database_url() else {
        return Ok(());
    };
    let state = setup_state(&url, Outcome::Success).await?;
    let admin = create_user(&state, Role::Admin).await?;

    let request = |email: String, password: &str| CreateUserRequest {
        first_name: "Abebe".into(),
        last_name: "Kebede".into(),
        email,
        phone_number: None,
        role: Role::Admin,
        password: password.into(),
    };

    let err = user_service::create_user(
        &state,
        &admin,
        request(format!("ops-{}@example.test", Uuid::new_v4()), "short"),
    )
    .await
    .expect_err("short password");
    assert!(matches!(err, AppError::Validation { field: "password", .. }));

    let created = user_service::create_user(
        &state,
        &admin,
        request(format!("ops-{}@example.test", Uuid::new_v4()), "longenough"),
    )
    .await?
    .data
    .expect("user");
    assert_eq!(created.role, Role::Admin);

    Ok(())
}
