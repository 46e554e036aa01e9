pub mod account;
pub mod artifacts;
pub mod chain;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod contracts;
pub mod deploy;
pub mod error;
pub mod interact;
pub mod logging;
pub mod mocks;
pub mod network;
pub mod price_feed;
pub mod registry;
pub mod verify;

pub use error::Error;
