use restaurant_hub_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(
        &pool,
        "admin@restauranthub.gh",
        "admin123",
        "Hub",
        "Admin",
        "admin",
    )
    .await?;
    let owner_id = ensure_user(
        &pool,
        "owner@restauranthub.gh",
        "owner123",
        "Akosua",
        "Boateng",
        "restaurant_owner",
    )
    .await?;
    let customer_id = ensure_user(
        &pool,
        "customer@restauranthub.gh",
        "customer123",
        "Kwame",
        "Mensah",
        "customer",
    )
    .await?;

    let restaurant_id = ensure_restaurant(&pool, owner_id).await?;
    seed_menu(&pool, restaurant_id).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Owner ID: {owner_id}, Customer ID: {customer_id}, Restaurant ID: {restaurant_id}"
    );
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, first_name, last_name, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(id)
}

async fn ensure_restaurant(pool: &DbPool, owner_id: Uuid) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM restaurants WHERE name = $1 AND owner_id = $2")
            .bind("Sika Kitchen")
            .bind(owner_id)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO restaurants
            (id, owner_id, name, description, cuisine_type, address, phone, whatsapp, opening_hours)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind("Sika Kitchen")
    .bind("Home-style Ghanaian dishes cooked fresh every day")
    .bind("Ghanaian")
    .bind("14 Oxford Street, Osu, Accra")
    .bind("+233201234567")
    .bind("+233201234567")
    .bind(serde_json::json!({ "mon-sat": "09:00-22:00", "sun": "12:00-20:00" }))
    .fetch_one(pool)
    .await?;

    println!("Seeded restaurant Sika Kitchen");
    Ok(id)
}

async fn seed_menu(pool: &DbPool, restaurant_id: Uuid) -> anyhow::Result<()> {
    let menu: [(&str, i32, &[(&str, &str, i64, bool)]); 3] = [
        (
            "Mains",
            0,
            &[
                ("Jollof Rice with Chicken", "Smoky party jollof with grilled chicken", 4500, false),
                ("Waakye Special", "Rice and beans with shito, gari and egg", 3500, false),
                ("Red Red", "Bean stew with fried plantain", 2500, true),
            ],
        ),
        (
            "Sides",
            1,
            &[
                ("Kelewele", "Spiced fried plantain", 1500, true),
                ("Fried Yam", "Crispy yam chips with pepper sauce", 1200, true),
            ],
        ),
        (
            "Drinks",
            2,
            &[("Sobolo", "Chilled hibiscus drink", 800, true)],
        ),
    ];

    for (category, order, items) in menu {
        let (category_id,): (Uuid,) = match sqlx::query_as(
            "SELECT id FROM menu_categories WHERE restaurant_id = $1 AND name = $2",
        )
        .bind(restaurant_id)
        .bind(category)
        .fetch_optional(pool)
        .await?
        {
            Some(row) => row,
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO menu_categories (id, restaurant_id, name, display_order)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(restaurant_id)
                .bind(category)
                .bind(order)
                .fetch_one(pool)
                .await?
            }
        };

        for (name, description, price, vegetarian) in items {
            sqlx::query(
                r#"
                INSERT INTO menu_items
                    (id, restaurant_id, category_id, name, description, price, is_vegetarian)
                SELECT $1, $2, $3, $4, $5, $6, $7
                WHERE NOT EXISTS (
                    SELECT 1 FROM menu_items WHERE restaurant_id = $2 AND name = $4
                )
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(restaurant_id)
            .bind(category_id)
            .bind(*name)
            .bind(*description)
            .bind(*price)
            .bind(*vegetarian)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded menu");
    Ok(())
}
