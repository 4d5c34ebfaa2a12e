//! CKAN action operations
//!
//! Every catalog call is described as an [`Operation`] before it is sent,
//! so the HTTP client has a single execution path for all actions.

pub mod operation;

pub use operation::Operation;
