#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::{NotSet, Set};
use travel_booking_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{properties::ActiveModel as PropertyActive, users::ActiveModel as UserActive},
    gateway::{
        Checkout, CheckoutRequest, GatewayError, PaymentGateway, TransactionState, Verification,
    },
    middleware::auth::AuthUser,
    models::Role,
    state::AppState,
};
use uuid::Uuid;

/// Returns `None` when no database is configured so callers can skip.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Success,
    Failed,
    Down,
}

/// In-process gateway that answers every verification with a fixed outcome.
pub struct StubGateway {
    pub outcome: Outcome,
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn initialize(&self, request: &CheckoutRequest) -> Result<Checkout, GatewayError> {
        match self.outcome {
            Outcome::Down => Err(GatewayError::Unavailable("connection refused".into())),
            _ => Ok(Checkout {
                checkout_url: format!("https://checkout.test/{}", request.tx_ref),
                transaction_id: Some(format!("chapa-{}", request.tx_ref)),
            }),
        }
    }

    async fn verify(&self, tx_ref: &str) -> Result<Verification, GatewayError> {
        match self.outcome {
            Outcome::Success => Ok(Verification {
                state: TransactionState::Success,
                transaction_id: Some(format!("chapa-{tx_ref}")),
            }),
            Outcome::Failed => Ok(Verification {
                state: TransactionState::Failed,
                transaction_id: None,
            }),
            Outcome::Down => Err(GatewayError::Unavailable("operation timed out".into())),
        }
    }
}

pub async fn setup_state(database_url: &str, outcome: Outcome) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    Ok(AppState {
        pool,
        orm,
        gateway: Arc::new(StubGateway { outcome }),
        default_return_url: "http://localhost:3000/payment/success".into(),
    })
}

/// Users get unique emails so runs never collide with existing rows.
pub async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        first_name: Set("Test".into()),
        last_name: Set(role.as_str().to_string()),
        email: Set(format!("{}-{}@example.test", role.as_str(), Uuid::new_v4())),
        phone_number: Set(None),
        role: Set(role),
        password_hash: Set("dummy".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

pub async fn create_property(
    state: &AppState,
    host: &AuthUser,
    price_per_night: i64,
) -> anyhow::Result<Uuid> {
    let property = PropertyActive {
        id: Set(Uuid::new_v4()),
        host_id: Set(host.user_id),
        name: Set(format!("Test Villa {}", Uuid::new_v4())),
        description: Set("Integration test property".into()),
        location: Set("Hawassa".into()),
        price_per_night: Set(price_per_night),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(property.id)
}

/// Today shifted by `offset` days.
pub fn day(offset: i64) -> NaiveDate {
    let today = Utc::now().date_naive();
    if offset >= 0 {
        today + Days::new(offset as u64)
    } else {
        today - Days::new(offset.unsigned_abs())
    }
}
