//! # Taskdeck
//!
//! A small team task manager: form-style CRUD over tasks with user accounts,
//! password authentication, and role-based visibility.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, session middleware
//! - `auth`: Password hashing, session tokens, authorization policy
//! - `config`: Configuration management
//! - `db`: Connection pool and startup schema
//! - `error`: Error handling and HTTP response mapping
//! - `models`: User, Task and Session records
//! - `routes`: Route handlers

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
