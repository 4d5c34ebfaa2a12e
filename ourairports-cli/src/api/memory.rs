//! In-memory catalog used by tests in place of a live CKAN instance

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::catalog::Catalog;
use super::error::{CatalogError, CatalogErrorKind};
use super::models::{Lookup, Package};

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    packages: Mutex<BTreeMap<String, Package>>,
    groups: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    failing_writes: Mutex<HashSet<String>>,
    failing_lookups: Mutex<bool>,
    rejected_creates: Mutex<Option<String>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let catalog = Self::new();
        catalog
            .groups
            .lock()
            .unwrap()
            .extend(groups.into_iter().map(Into::into));
        catalog
    }

    /// Seed a package as if it had been created by an earlier run
    pub fn insert(&self, package: Package) {
        let name = package.name().unwrap_or_default().to_string();
        self.packages.lock().unwrap().insert(name, package);
    }

    /// Make every create/update for `name` fail with a server error
    pub fn fail_writes_for(&self, name: &str) {
        self.failing_writes.lock().unwrap().insert(name.to_string());
    }

    /// Make every package lookup fail with a transport error
    pub fn fail_lookups(&self) {
        *self.failing_lookups.lock().unwrap() = true;
    }

    /// Make every create fail with a validation error carrying `message`
    pub fn reject_creates(&self, message: &str) {
        *self.rejected_creates.lock().unwrap() = Some(message.to_string());
    }

    pub fn get(&self, name: &str) -> Option<Package> {
        self.packages.lock().unwrap().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.packages.lock().unwrap().len()
    }

    /// Recorded calls as `action:target`, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, action: &str, target: &str) {
        self.calls.lock().unwrap().push(format!("{}:{}", action, target));
    }

    fn check_write(&self, name: &str) -> Result<(), CatalogError> {
        if self.failing_writes.lock().unwrap().contains(name) {
            return Err(CatalogError::new(
                CatalogErrorKind::Server,
                Some(500),
                format!("simulated failure for {}", name),
            ));
        }
        Ok(())
    }
}

fn package_name(package: &Package) -> Result<String, CatalogError> {
    package
        .name()
        .map(str::to_string)
        .ok_or_else(|| CatalogError::new(CatalogErrorKind::Conflict, Some(409), "name: Missing value"))
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn package_show(&self, name: &str) -> Result<Lookup<Package>, CatalogError> {
        self.record("package_show", name);
        if *self.failing_lookups.lock().unwrap() {
            return Err(CatalogError::new(
                CatalogErrorKind::Transport,
                None,
                "connection reset by peer",
            ));
        }
        Ok(match self.get(name) {
            Some(package) => Lookup::Found(package),
            None => Lookup::NotFound,
        })
    }

    async fn package_create(&self, package: &Package) -> Result<Package, CatalogError> {
        let name = package_name(package)?;
        self.record("package_create", &name);
        self.check_write(&name)?;
        if let Some(message) = self.rejected_creates.lock().unwrap().clone() {
            return Err(CatalogError::new(CatalogErrorKind::Conflict, Some(409), message));
        }

        let mut packages = self.packages.lock().unwrap();
        if packages.contains_key(&name) {
            return Err(CatalogError::new(
                CatalogErrorKind::Conflict,
                Some(409),
                "name: That URL is already in use.",
            ));
        }
        let mut stored = package.clone();
        stored
            .0
            .insert("id".to_string(), json!(format!("id-{}", name)));
        packages.insert(name, stored.clone());
        Ok(stored)
    }

    async fn package_update(&self, package: &Package) -> Result<Package, CatalogError> {
        let name = package_name(package)?;
        self.record("package_update", &name);
        self.check_write(&name)?;

        let mut packages = self.packages.lock().unwrap();
        if !packages.contains_key(&name) {
            return Err(CatalogError::new(CatalogErrorKind::NotFound, Some(404), "Not found"));
        }
        packages.insert(name, package.clone());
        Ok(package.clone())
    }

    async fn group_show(&self, id: &str) -> Result<Lookup<Value>, CatalogError> {
        self.record("group_show", id);
        if self.groups.lock().unwrap().contains(id) {
            Ok(Lookup::Found(json!({ "id": id, "name": id })))
        } else {
            Ok(Lookup::NotFound)
        }
    }
}
