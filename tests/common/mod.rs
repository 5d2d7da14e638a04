use stockbay::utils::password::hash_password;
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

/// Create a test user with the given role ("user" or "admin"),
/// bypassing the register endpoint.
pub async fn create_test_user(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    role: &str,
) -> TestUser {
    let hashed = hash_password(password).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (name, email, password, role)
         VALUES ($1, $2, $3, $4::user_role)
         RETURNING id",
    )
    .bind("Test User")
    .bind(email)
    .bind(&hashed)
    .bind(role)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestUser {
        id,
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

#[allow(dead_code)]
pub fn generate_unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4())
}

#[allow(dead_code)]
pub async fn create_test_category(tx: &mut Transaction<'_, Postgres>, name: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO categories (name, description)
         VALUES ($1, $2)
         RETURNING id",
    )
    .bind(name)
    .bind(Some("Test category description"))
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_sub_category(
    tx: &mut Transaction<'_, Postgres>,
    category_id: Uuid,
    name: &str,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO sub_categories (name, category_id)
         VALUES ($1, $2)
         RETURNING id",
    )
    .bind(name)
    .bind(category_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_product(
    tx: &mut Transaction<'_, Postgres>,
    category_id: Uuid,
    name: &str,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO products (name, category_id)
         VALUES ($1, $2)
         RETURNING id",
    )
    .bind(name)
    .bind(category_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_exchange_rate(
    tx: &mut Transaction<'_, Postgres>,
    rate: f64,
    is_active: bool,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO exchange_rates (rate, is_active)
         VALUES ($1, $2)
         RETURNING id",
    )
    .bind(rate)
    .bind(is_active)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_purchase(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    quantity: i32,
    price_rmb: f64,
    exchange_rate: f64,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO purchases (product_id, quantity, price_rmb, exchange_rate, total_cost_mga)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(price_rmb)
    .bind(exchange_rate)
    .bind(price_rmb * exchange_rate * f64::from(quantity))
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_order(
    tx: &mut Transaction<'_, Postgres>,
    product_name: &str,
    quantity: i32,
    price_rmb: f64,
    exchange_rate: f64,
    status: &str,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO orders (product_name, quantity, price_rmb, exchange_rate, total_cost_mga, status)
         VALUES ($1, $2, $3, $4, $5, $6::order_status)
         RETURNING id",
    )
    .bind(product_name)
    .bind(quantity)
    .bind(price_rmb)
    .bind(exchange_rate)
    .bind(price_rmb * exchange_rate * f64::from(quantity))
    .bind(status)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_sale(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
    quantity: i32,
    price_mga: f64,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO sales (product_id, quantity, price_mga, total_revenue)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(price_mga)
    .bind(price_mga * f64::from(quantity))
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}
