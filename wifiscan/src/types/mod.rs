//! Type definitions and constants.
//!
//! This module contains NetworkManager codes and scan parameters.

pub(crate) mod constants;
