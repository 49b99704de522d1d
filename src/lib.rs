pub mod error;
pub mod form;
pub mod ledger;
pub mod notify;
pub mod service;
pub mod store;
pub mod transfer;
pub mod validators;
pub mod wire;
pub mod wizard;
