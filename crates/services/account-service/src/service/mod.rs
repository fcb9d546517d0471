//! Business logic layer.

mod account_service;

pub use account_service::{
    AccountManager, AccountPage, AccountQuery, AccountService, PasswordChange, Session,
};
