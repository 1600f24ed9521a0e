//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Signed session tokens (JWT, HS256)
//! - Client identification from request headers
//! - Database bootstrap with bounded retry
//! - The generic repository and its Postgres / in-memory backends

pub mod client;
pub mod db;
pub mod password;
pub mod repository;
pub mod token;
