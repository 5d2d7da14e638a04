pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::{SubCategory, SubCategoryWithContext};
pub use router::init_sub_categories_router;
