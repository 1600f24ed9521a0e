//! Infrastructure Layer
//!
//! Seed data for the credential store. Persistence itself is the platform
//! repository.

pub mod seed;

pub use seed::{SeedReport, seed};
