//! Create-or-update reconciliation against the catalog

use clap::ValueEnum;
use log::{debug, warn};

use crate::api::{Catalog, CatalogError, Dataset, Lookup, Package};

/// Which call is attempted first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum UpsertMode {
    /// Look the package up; update it if found, otherwise create it
    #[default]
    UpdateFirst,
    /// Create the package; update it if the catalog reports a conflict
    CreateFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Created,
    Updated,
}

/// Make the catalog hold exactly one package named `dataset.name`
pub async fn upsert(
    catalog: &dyn Catalog,
    dataset: &Dataset,
    mode: UpsertMode,
) -> Result<UpsertAction, CatalogError> {
    match mode {
        UpsertMode::UpdateFirst => update_first(catalog, dataset).await,
        UpsertMode::CreateFirst => create_first(catalog, dataset).await,
    }
}

async fn update_first(catalog: &dyn Catalog, dataset: &Dataset) -> Result<UpsertAction, CatalogError> {
    match catalog.package_show(&dataset.name).await {
        Ok(Lookup::Found(mut existing)) => {
            existing.overlay(dataset)?;
            catalog.package_update(&existing).await?;
            Ok(UpsertAction::Updated)
        }
        Ok(Lookup::NotFound) => {
            debug!("{} not found, creating", dataset.name);
            create(catalog, dataset).await
        }
        Err(e) => {
            warn!("Lookup of {} failed, treating as absent: {}", dataset.name, e);
            create(catalog, dataset).await
        }
    }
}

async fn create_first(catalog: &dyn Catalog, dataset: &Dataset) -> Result<UpsertAction, CatalogError> {
    let package = Package::from_dataset(dataset)?;
    match catalog.package_create(&package).await {
        Ok(_) => Ok(UpsertAction::Created),
        Err(e) if e.is_conflict() => {
            debug!("{} already exists ({}), updating", dataset.name, e.message);
            match catalog.package_update(&package).await {
                Ok(_) => Ok(UpsertAction::Updated),
                // The create rejection may not have been a name clash at all
                Err(update_err) => Err(CatalogError::new(
                    update_err.kind,
                    update_err.status,
                    format!(
                        "create rejected ({}); fallback update failed: {}",
                        e.message, update_err.message
                    ),
                )),
            }
        }
        Err(e) => Err(e),
    }
}

async fn create(catalog: &dyn Catalog, dataset: &Dataset) -> Result<UpsertAction, CatalogError> {
    let package = Package::from_dataset(dataset)?;
    catalog.package_create(&package).await?;
    Ok(UpsertAction::Created)
}
