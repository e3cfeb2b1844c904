use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use travel_booking_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&pool, ("Ada", "Admin"), "admin@example.com", "admin12345", "admin").await?;
    let host_id = ensure_user(&pool, ("Hana", "Host"), "host@example.com", "host12345", "host").await?;
    let guest_id = ensure_user(&pool, ("Gebre", "Guest"), "guest@example.com", "guest12345", "guest").await?;
    seed_properties(&pool, host_id).await?;

    println!("Seed completed. Admin: {admin_id}, Host: {host_id}, Guest: {guest_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    (first_name, last_name): (&str, &str),
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, first_name, last_name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_properties(pool: &sqlx::PgPool, host_id: Uuid) -> anyhow::Result<()> {
    let properties = vec![
        ("Lakeside Cabin", "Quiet cabin on the shore of Lake Tana", "Bahir Dar", 450_000_i64),
        ("City Loft", "Top floor loft near Meskel Square", "Addis Ababa", 320_000),
        ("Castle View Guesthouse", "Rooms overlooking Fasil Ghebbi", "Gondar", 180_000),
        ("Rift Valley Lodge", "Bungalows by the hot springs", "Langano", 520_000),
    ];

    for (name, description, location, price_per_night) in properties {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM properties WHERE host_id = $1 AND name = $2")
                .bind(host_id)
                .bind(name)
                .fetch_optional(pool)
                .await?;
        if exists.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO properties (id, host_id, name, description, location, price_per_night)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(host_id)
        .bind(name)
        .bind(description)
        .bind(location)
        .bind(price_per_night)
        .execute(pool)
        .await?;
    }

    println!("Seeded properties");
    Ok(())
}
