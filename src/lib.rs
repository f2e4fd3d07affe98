pub mod args;
pub mod backup;
pub mod balance;
pub mod commands;
mod config;
pub mod error;
pub mod export;
pub mod lock;
pub mod model;
pub mod repository;
pub mod store;
mod utils;


pub use config::Config;
pub use error::{Error, LedgerError, Result};
pub use lock::Mode;
pub use model::Amount;
pub use repository::TransactionRepository;
