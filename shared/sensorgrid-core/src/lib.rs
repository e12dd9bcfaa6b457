//! SensorGrid Core - Shared domain types and service infrastructure
//!
//! This crate provides:
//! - The Reading/descriptor domain types shared by the whole pipeline
//! - Error taxonomy and `Result` alias
//! - Environment-based configuration for the bus and the store
//! - Standard service trait and runtime all microservices run under

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::{BusConfig, StoreConfig};
pub use domain::*;
pub use error::{Error, Result};
pub use service::{Service, ServiceRuntime};
