//! Pre-write rules. Each function is pure; callers gather the facts
//! (existing review, qualifying stay, ...) from the store first.

use crate::{
    error::{AppError, AppResult},
    models::Role,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn booking_creator(role: Role) -> AppResult<()> {
    match role {
        Role::Guest | Role::Admin => Ok(()),
        Role::Host => Err(AppError::validation(
            "user_id",
            "Only guests can make bookings.",
        )),
    }
}

pub fn property_creator(role: Role) -> AppResult<()> {
    match role {
        Role::Host | Role::Admin => Ok(()),
        Role::Guest => Err(AppError::validation(
            "host_id",
            "User must be a host or admin to create properties.",
        )),
    }
}

pub fn price_per_night(price: i64) -> AppResult<()> {
    if price <= 0 {
        return Err(AppError::validation(
            "price_per_night",
            "Price per night must be greater than zero.",
        ));
    }
    Ok(())
}

pub fn required_text(field: &'static str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field, format!("{field} may not be blank.")));
    }
    Ok(())
}

pub fn rating(rating: i32) -> AppResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::validation(
            "rating",
            "Rating must be between 1 and 5.",
        ));
    }
    Ok(())
}

/// `has_completed_stay`: a confirmed booking on the property that ended before today.
pub fn review_eligibility(has_completed_stay: bool, already_reviewed: bool) -> AppResult<()> {
    if !has_completed_stay {
        return Err(AppError::validation(
            "non_field_errors",
            "You can only review properties you have stayed at. You have not stayed here yet.",
        ));
    }
    if already_reviewed {
        return Err(already_reviewed_error());
    }
    Ok(())
}

pub fn already_reviewed_error() -> AppError {
    AppError::validation("non_field_errors", "You have already reviewed this property.")
}

pub fn payment_amount(amount: i64) -> AppResult<()> {
    if amount <= 0 {
        return Err(AppError::validation(
            "amount",
            "Amount must be greater than zero.",
        ));
    }
    Ok(())
}

pub fn payment_absent(booking_has_payment: bool) -> AppResult<()> {
    if booking_has_payment {
        return Err(payment_exists_error());
    }
    Ok(())
}

pub fn payment_exists_error() -> AppError {
    AppError::validation("booking_id", "Payment already exists for this booking.")
}

/// Email shape and password length, for any account.
pub fn credentials(email: &str, password: &str) -> AppResult<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("email", "Enter a valid email address."));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters."),
        ));
    }
    Ok(())
}

/// Self-registration: credentials, matching confirmation, and no admin role.
pub fn registration(email: &str, password: &str, password_confirm: &str, role: Role) -> AppResult<()> {
    credentials(email, password)?;
    if password != password_confirm {
        return Err(AppError::validation(
            "password_confirm",
            "Passwords do not match.",
        ));
    }
    if role == Role::Admin {
        return Err(AppError::validation(
            "role",
            "Admin accounts are granted by an existing admin.",
        ));
    }
    Ok(())
}

/// Property owners must stay hosts or admins.
pub fn role_change(new_role: Role, owns_properties: bool) -> AppResult<()> {
    if new_role == Role::Guest && owns_properties {
        return Err(AppError::validation(
            "role",
            "Users who own properties must remain hosts or admins.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: AppError) -> &'static str {
        match err {
            AppError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn hosts_cannot_book() {
        assert!(booking_creator(Role::Guest).is_ok());
        assert!(booking_creator(Role::Admin).is_ok());
        assert_eq!(field_of(booking_creator(Role::Host).unwrap_err()), "user_id");
    }

    #[test]
    fn guests_cannot_list_properties() {
        assert!(property_creator(Role::Host).is_ok());
        assert!(property_creator(Role::Guest).is_err());
    }

    #[test]
    fn review_requires_a_finished_stay() {
        let err = review_eligibility(false, false).unwrap_err();
        assert!(err.to_string().contains("have not stayed"));
        assert!(review_eligibility(true, false).is_ok());
    }

    #[test]
    fn second_review_is_rejected() {
        let err = review_eligibility(true, true).unwrap_err();
        assert!(err.to_string().contains("already reviewed"));
    }

    #[test]
    fn rating_bounds() {
        assert!(rating(1).is_ok());
        assert!(rating(5).is_ok());
        assert!(rating(0).is_err());
        assert!(rating(6).is_err());
    }

    #[test]
    fn payment_rules() {
        assert_eq!(field_of(payment_amount(0).unwrap_err()), "amount");
        assert!(payment_amount(-5).is_err());
        assert!(payment_amount(1).is_ok());
        assert_eq!(field_of(payment_absent(true).unwrap_err()), "booking_id");
        assert!(payment_absent(false).is_ok());
    }

    #[test]
    fn registration_rules() {
        assert!(registration("a@b.co", "longenough", "longenough", Role::Guest).is_ok());
        assert_eq!(
            field_of(registration("nope", "longenough", "longenough", Role::Guest).unwrap_err()),
            "email"
        );
        assert_eq!(
            field_of(registration("a@b.co", "short", "short", Role::Host).unwrap_err()),
            "password"
        );
        assert_eq!(
            field_of(registration("a@b.co", "longenough", "different", Role::Host).unwrap_err()),
            "password_confirm"
        );
        assert_eq!(
            field_of(registration("a@b.co", "longenough", "longenough", Role::Admin).unwrap_err()),
            "role"
        );
    }

    #[test]
    fn admin_created_accounts_only_need_credentials() {
        assert!(credentials("ops@b.co", "longenough").is_ok());
        assert_eq!(field_of(credentials("ops", "longenough").unwrap_err()), "email");
        assert_eq!(field_of(credentials("ops@b.co", "short").unwrap_err()), "password");
    }

    #[test]
    fn owners_cannot_become_guests() {
        assert_eq!(field_of(role_change(Role::Guest, true).unwrap_err()), "role");
        assert!(role_change(Role::Guest, false).is_ok());
        assert!(role_change(Role::Admin, true).is_ok());
        assert!(role_change(Role::Host, true).is_ok());
    }

    #[test]
    fn price_and_text() {
        assert!(price_per_night(0).is_err());
        assert!(price_per_night(15_000).is_ok());
        assert_eq!(field_of(required_text("name", "  ").unwrap_err()), "name");
    }
}
