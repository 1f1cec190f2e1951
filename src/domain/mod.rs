//! Core domain types and logic.

pub mod ohlcv;
pub mod portfolio;
pub mod params;
pub mod strategy;
pub mod simulation;
pub mod daily;
pub mod summary;
pub mod request;
pub mod config_validation;
pub mod error;
