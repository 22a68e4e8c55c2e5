pub mod day;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod nutrition;
pub mod query;
pub mod report;
pub mod series;
pub mod service;
pub mod session;
pub mod store;
pub mod units;

pub use error::ShredError;
pub use service::ShredService;
