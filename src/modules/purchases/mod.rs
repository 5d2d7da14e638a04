pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::{Purchase, PurchaseWithProduct};
pub use router::init_purchases_router;
