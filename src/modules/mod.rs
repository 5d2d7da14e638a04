pub mod auth;
pub mod categories;
pub mod exchange_rates;
pub mod orders;
pub mod products;
pub mod purchases;
pub mod sales;
pub mod sub_categories;
pub mod users;

pub use self::users::model::User;
