//! CKAN catalog API module
//!
//! Typed dataset models, the [`Catalog`] trait the synchronizer depends on,
//! and an HTTP implementation speaking the CKAN action API.

pub mod catalog;
pub mod client;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod operations;

pub use catalog::Catalog;
pub use client::CkanClient;
pub use error::CatalogError;
pub use models::{Dataset, GroupRef, Lookup, Package, Resource, Tag};
