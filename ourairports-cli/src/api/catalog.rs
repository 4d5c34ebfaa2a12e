//! The catalog seam used by the synchronizer

use async_trait::async_trait;
use serde_json::Value;

use super::error::CatalogError;
use super::models::{Lookup, Package};

/// Operations the synchronizer needs from an open-data catalog.
///
/// Lookups return `Ok(Lookup::NotFound)` for a missing record and reserve
/// `Err` for failures, so callers can decide how to treat each.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn package_show(&self, name: &str) -> Result<Lookup<Package>, CatalogError>;

    async fn package_create(&self, package: &Package) -> Result<Package, CatalogError>;

    async fn package_update(&self, package: &Package) -> Result<Package, CatalogError>;

    async fn group_show(&self, id: &str) -> Result<Lookup<Value>, CatalogError>;
}
