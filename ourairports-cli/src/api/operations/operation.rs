//! Core Operation types for CKAN action calls

use serde_json::{Value, json};

use crate::api::models::Package;

/// Represents a single action that can be executed against the catalog
#[derive(Debug, Clone)]
pub enum Operation {
    /// Read a package by name or id
    ShowPackage {
        /// Package name (e.g., "ourairports-250")
        name: String,
    },
    /// Create a new package
    CreatePackage {
        /// Full package body
        package: Package,
    },
    /// Replace an existing package
    UpdatePackage {
        /// Full package body, including any fields kept from the catalog
        package: Package,
    },
    /// Read a group by name or id
    ShowGroup {
        /// Group id (the M49 code for country groups)
        id: String,
    },
}

impl Operation {
    /// Create a new ShowPackage operation
    pub fn show_package(name: impl Into<String>) -> Self {
        Self::ShowPackage { name: name.into() }
    }

    /// Create a new CreatePackage operation
    pub fn create_package(package: Package) -> Self {
        Self::CreatePackage { package }
    }

    /// Create a new UpdatePackage operation
    pub fn update_package(package: Package) -> Self {
        Self::UpdatePackage { package }
    }

    /// Create a new ShowGroup operation
    pub fn show_group(id: impl Into<String>) -> Self {
        Self::ShowGroup { id: id.into() }
    }

    /// CKAN action name, appended to `/api/3/action/`
    pub fn action(&self) -> &'static str {
        match self {
            Self::ShowPackage { .. } => "package_show",
            Self::CreatePackage { .. } => "package_create",
            Self::UpdatePackage { .. } => "package_update",
            Self::ShowGroup { .. } => "group_show",
        }
    }

    /// Whether the action modifies catalog state
    pub fn is_write(&self) -> bool {
        matches!(self, Self::CreatePackage { .. } | Self::UpdatePackage { .. })
    }

    /// Name or id of the record this operation targets, for log lines
    pub fn target(&self) -> &str {
        match self {
            Self::ShowPackage { name } => name,
            Self::CreatePackage { package } | Self::UpdatePackage { package } => {
                package.name().unwrap_or("<unnamed>")
            }
            Self::ShowGroup { id } => id,
        }
    }

    /// JSON body posted to the action endpoint
    pub fn body(&self) -> Value {
        match self {
            Self::ShowPackage { name } => json!({ "id": name }),
            Self::CreatePackage { package } | Self::UpdatePackage { package } => {
                Value::Object(package.0.clone())
            }
            Self::ShowGroup { id } => json!({ "id": id, "include_datasets": false }),
        }
    }
}
