//! Back-office core for a small bank: users, bank accounts, deposits and
//! account-to-account transfers over a relational store.
//!
//! Business outcomes come back as `(Option<T>, Status)` pairs; only store and
//! configuration faults surface as [`error::CustomError`].

pub mod account;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod repo;
pub mod transaction;
pub mod user;
pub mod utils;

pub use account::model::{Account, AccountStatus, DeleteStatus};
pub use account::service::AccountService;
pub use error::CustomError;
pub use transaction::model::{
    TransactionRecord, TransactionStatus, TransactionType, TransferReceipt,
};
pub use transaction::service::TransactionService;
pub use user::model::{User, UserValidationStatus};
pub use user::service::UserService;
