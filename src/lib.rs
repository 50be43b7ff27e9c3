pub mod configuration;
pub mod constant;
pub mod controller;
pub mod domain;
pub mod error;
pub mod startup;
pub mod store;
pub mod telemetry;
pub mod validation;
