//! Catalog data models
//!
//! [`Dataset`] is the strongly-typed record we build from a spreadsheet row.
//! [`Package`] is what actually travels to and from CKAN: an open JSON object
//! that keeps every field the catalog returned, so an update can layer our
//! fields over whatever else the record already carries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{CatalogError, CatalogErrorKind};

/// Result of a lookup that distinguishes absence from failure
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

/// One country's airport dataset as we want it to look in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub title: String,
    pub notes: String,
    pub dataset_source: String,
    pub private: bool,
    pub subnational: bool,
    pub owner_org: String,
    pub package_creator: String,
    pub license_id: String,
    pub methodology: String,
    pub methodology_other: String,
    pub data_update_frequency: String,
    pub dataset_date: String,
    pub caveats: String,
    pub groups: Vec<GroupRef>,
    pub tags: Vec<Tag>,
    pub resources: Vec<Resource>,
}

/// Reference to a catalog group, either by id or by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupRef {
    Id { id: String },
    Name { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A downloadable file attached to a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub description: String,
    pub url: String,
    pub format: String,
}

/// Wire representation of a CKAN package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Package(pub Map<String, Value>);

impl Package {
    /// Serialize a dataset into a fresh package (create semantics)
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, CatalogError> {
        match serde_json::to_value(dataset)? {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(CatalogError::new(
                CatalogErrorKind::Serialization,
                None,
                format!("dataset serialized to a non-object value: {}", other),
            )),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Replace every top-level field the dataset sets, leaving the rest alone
    pub fn overlay(&mut self, dataset: &Dataset) -> Result<(), CatalogError> {
        let Package(fields) = Package::from_dataset(dataset)?;
        for (key, value) in fields {
            self.0.insert(key, value);
        }
        Ok(())
    }
}
