//! Public API module.
//!
//! This module contains the user-facing types, the collaborator traits and
//! the [`Finder`](finder::Finder) facade.

pub mod adapters;
pub mod finder;
pub mod models;
