pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::ExchangeRate;
pub use router::init_exchange_rates_router;
pub use service::ExchangeRateService;
