pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::{Sale, SaleWithProduct};
pub use router::init_sales_router;
