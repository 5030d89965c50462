//! API route modules
//!
//! # Structure
//!
//! - [`health`] — liveness check
//! - [`auth`] — login, current user, password change
//! - [`hierarchy`] — full Church/Group/PCF/Cell tree
//! - [`users`] — safe user listing for leader pickers
//! - [`members`] — member directory (scope-filtered) and account conversion
//! - [`services`] — service schedule
//! - [`attendance`] — check-ins and per-service aggregates
//! - [`structure`] — admin management of groups, PCFs and cells

pub mod attendance;
pub mod auth;
pub mod health;
pub mod hierarchy;
pub mod members;
pub mod services;
pub mod structure;
pub mod users;
