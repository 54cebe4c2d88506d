//! CaseBench Server library.
//!
//! Core functionality for the test case management server: database
//! operations, versioning, test runs and the HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
