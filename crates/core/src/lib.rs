//! Core business logic for recipehaven.

pub mod services;

pub use services::*;
