//! Collaborator-facing components
//!
//! - `history`: graph plus refs, the boundary graph viewers consume
//! - `listing`: text listing of a materialized history, read by the CLI
//! - `viewer`: a loaded history bound to an output writer

pub mod history;
pub mod listing;
pub mod viewer;
