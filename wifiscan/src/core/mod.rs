//! Core internal logic for negotiation, connection workflows and scanning.
//!
//! Everything here is written against the collaborator traits in
//! [`crate::api::adapters`]; nothing in this module touches D-Bus or sockets.

pub(crate) mod discovery;
pub(crate) mod negotiator;
pub(crate) mod orchestrator;
pub(crate) mod scanner;
pub(crate) mod subnet;
