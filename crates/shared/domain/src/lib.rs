//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! account types, the closed role set, credential hashing and the error
//! taxonomy every other crate translates into.

pub mod account;
pub mod constants;
pub mod error;
pub mod password;
pub mod role;

pub use account::{
    Account, AccountChanges, AccountResponse, CreateAccount, NewAccount, UpdateAccount,
};
pub use constants::*;
pub use error::{AccountRef, DomainError, DomainResult, ErrorKind, StatusClass};
pub use password::{Argon2Hasher, CredentialHasher, HashError};
pub use role::Role;

#[cfg(any(test, feature = "test-utils"))]
pub use password::MockCredentialHasher;
