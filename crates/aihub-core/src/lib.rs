pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod runtime;
pub mod seed;
pub mod storage;
pub mod store;

pub use config::CoreConfig;
pub use error::{HubError, StorageError};
pub use runtime::HubRuntime;
