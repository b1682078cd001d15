pub mod catalog;
pub mod config;
pub mod distribution;
pub mod inventory;
pub mod logging;
pub mod transfer;
