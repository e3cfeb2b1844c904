use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    db::is_unique_violation,
    dto::auth::RegisterRequest,
    entity::{
        Users,
        users::{ActiveModel as UserActive, Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    models::{Role, User},
    response::ApiResponse,
    services::user_service::user_from_entity,
    state::AppState,
    validation,
};

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    validation::registration(
        &payload.email,
        &payload.password,
        &payload.password_confirm,
        payload.role,
    )?;
    validation::required_text("first_name", &payload.first_name)?;
    validation::required_text("last_name", &payload.last_name)?;

    let user = insert_user(
        state,
        NewUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            phone_number: payload.phone_number,
            role: payload.role,
            password: payload.password,
        },
    )
    .await?;

    audit::record(
        &state.pool,
        user.id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "role": user.role.as_str() }),
    )
    .await;

    Ok(ApiResponse::success("User created", user_from_entity(user), None))
}

pub(crate) struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub password: String,
}

/// Shared by self-registration and admin-created accounts.
pub(crate) async fn insert_user(state: &AppState, new: NewUser) -> AppResult<UserModel> {
    let email = new.email.trim().to_lowercase();
    let taken = Users::find()
        .filter(UserCol::Email.eq(email.as_str()))
        .count(&state.orm)
        .await?;
    if taken > 0 {
        return Err(AppError::validation("email", "Email is already taken"));
    }

    let password_hash = hash_password(&new.password)?;

    UserActive {
        id: Set(Uuid::new_v4()),
        first_name: Set(new.first_name),
        last_name: Set(new.last_name),
        email: Set(email),
        phone_number: Set(new.phone_number),
        role: Set(new.role),
        password_hash: Set(password_hash),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            AppError::Conflict("Email is already taken".into())
        } else {
            err.into()
        }
    })
}

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    #[test]
    fn hashes_verify_against_the_original_password() {
        let hash = hash_password("correct horse").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"correct horse", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong horse", &parsed).is_err());
    }
}
