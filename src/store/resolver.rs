//! DatabaseResolver - model type -> database handle, with lazy provisioning.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::database::{DocumentDatabase, STATUS_PRECONDITION_FAILED};
use crate::model::Model;

/// Addresses the database holding one model type's entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHandle {
    name: String,
}

impl DatabaseHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Resolves database handles, creating databases on first use.
///
/// Provisioning is best effort and idempotent: "already exists" counts as
/// provisioned, and any other failure is logged and left for the actual
/// operation to report. With caching enabled, names known to be provisioned
/// skip the create call until they are invalidated.
#[derive(Debug, Default)]
pub struct DatabaseResolver {
    provisioned: Option<RwLock<HashSet<String>>>,
}

impl DatabaseResolver {
    /// Provision on every resolve.
    pub fn new() -> Self {
        Self { provisioned: None }
    }

    /// Remember provisioned databases between resolves.
    pub fn cached() -> Self {
        Self {
            provisioned: Some(RwLock::new(HashSet::new())),
        }
    }

    pub async fn resolve<M: Model, D: DocumentDatabase + ?Sized>(
        &self,
        database: &D,
    ) -> DatabaseHandle {
        let name = M::database_name();
        if self.is_provisioned(&name) {
            return DatabaseHandle { name };
        }

        match database.create_database(&name).await {
            Ok(()) => {
                log::debug!("created database {}", name);
                self.remember(&name);
            }
            Err(err) if err.status_code() == Some(STATUS_PRECONDITION_FAILED) => {
                self.remember(&name);
            }
            Err(err) => {
                log::debug!("could not provision database {}: {}", name, err);
            }
        }

        DatabaseHandle { name }
    }

    /// Forget a cached database so the next resolve provisions it again.
    pub fn invalidate(&self, name: &str) {
        if let Some(provisioned) = &self.provisioned {
            if let Ok(mut provisioned) = provisioned.write() {
                if provisioned.remove(name) {
                    log::debug!("invalidated cached database handle {}", name);
                }
            }
        }
    }

    fn is_provisioned(&self, name: &str) -> bool {
        match &self.provisioned {
            Some(provisioned) => provisioned
                .read()
                .map(|provisioned| provisioned.contains(name))
                .unwrap_or(false),
            None => false,
        }
    }

    fn remember(&self, name: &str) {
        if let Some(provisioned) = &self.provisioned {
            if let Ok(mut provisioned) = provisioned.write() {
                provisioned.insert(name.to_string());
            }
        }
    }
}
