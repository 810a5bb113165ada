use thiserror::Error;
use tracing::{info, warn};

use crate::models::Target;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("host must not be empty")]
    EmptyHost,
    #[error("port must not be zero")]
    InvalidPort,
    #[error("{0} is already in the list")]
    Duplicate(Target),
    #[error("{0} is not in the list")]
    NotFound(Target),
}

/// The authoritative, insertion-ordered list of monitored targets.
/// Only reachable through `add`/`remove`/`list`; callers never hold a
/// reference into the underlying sequence.
#[derive(Debug, Default)]
pub struct Registry {
    targets: Vec<Target>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry from persisted targets. The store may have been
    /// edited by hand, so entries are re-validated and duplicates dropped.
    pub fn from_saved(saved: Vec<Target>) -> Self {
        let mut registry = Self::new();
        for target in saved {
            if let Err(e) = registry.add(target) {
                warn!("skipping saved target: {}", e);
            }
        }
        info!("registry seeded with {} targets", registry.len());
        registry
    }

    /// Appends a new target. An existing identical tuple is an error, not
    /// an update; the registry is left unchanged.
    pub fn add(&mut self, target: Target) -> Result<(), RegistryError> {
        if target.host.is_empty() {
            return Err(RegistryError::EmptyHost);
        }
        if target.port == 0 {
            return Err(RegistryError::InvalidPort);
        }
        if self.targets.contains(&target) {
            return Err(RegistryError::Duplicate(target));
        }
        self.targets.push(target);
        Ok(())
    }

    /// Removing an absent target is an error so callers can detect a stale
    /// view of the list.
    pub fn remove(&mut self, target: &Target) -> Result<(), RegistryError> {
        match self.targets.iter().position(|t| t == target) {
            Some(index) => {
                self.targets.remove(index);
                Ok(())
            }
            None => Err(RegistryError::NotFound(target.clone())),
        }
    }

    /// Owned snapshot in insertion order.
    pub fn list(&self) -> Vec<Target> {
        self.targets.clone()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }
}
