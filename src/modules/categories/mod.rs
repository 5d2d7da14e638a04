pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::{Category, CategoryWithChildren};
pub use router::init_categories_router;
