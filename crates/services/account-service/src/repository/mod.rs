//! Repository layer for data access.

pub mod entities;
mod account_repository;

pub use account_repository::{AccountRepository, AccountStore, StorageError};

#[cfg(any(test, feature = "test-utils"))]
pub use account_repository::MockAccountRepository;
