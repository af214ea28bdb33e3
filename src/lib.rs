//! Dispatch - role-based news publishing core
//!
//! This library provides the core of the Dispatch news platform: the
//! role model, the article approval workflow, reader subscriptions, and
//! the post-approval notification fan-out. Transport layers (HTTP API,
//! web UI) live outside this crate and call into the services here.

pub mod config;
pub mod db;
pub mod models;
pub mod services;
