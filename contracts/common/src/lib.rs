//! Shared building blocks for the staking contract suite.
//!
//! This crate provides:
//! - [`access_control`]: the role registry ([`Role`]) used to gate
//!   privileged entry points, with per-role admin roles.
//!
//! The registry reports outcomes as plain values; each contract maps a
//! denial onto its own error enum.

#![no_std]

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod access_control;

pub use access_control::{Role, RoleChange};
