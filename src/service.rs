//! # Document Service
//!
//! The embedding surface a host service wires its specification endpoint to.
//!
//! ## Overview
//!
//! `DocService` owns the annotation store and the assembled-document cache.
//! Route declaration code writes annotations during startup; the first
//! request to the specification endpoint triggers assembly; every later
//! request reads the cached, immutable document without locking beyond an
//! `Arc` clone.
//!
//! ## Concurrency
//!
//! - The annotation store sits behind an `RwLock`: written during startup,
//!   only read afterwards.
//! - The document cache is a `Mutex<Option<Arc<SpecDocument>>>`, and the
//!   build runs while the mutex is held. Concurrent first requests
//!   therefore cannot race to build duplicate or partially-populated
//!   definitions: one caller assembles, the rest wait and read the cache.
//! - Assembly failures are returned but never cached, so a corrected model
//!   declaration succeeds on the next request without a process restart.

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, info};

use crate::annotations::AnnotationStore;
use crate::assembler::{assemble, AssemblyError, SpecDocument};
use crate::catalog::RouteCatalog;
use crate::config::DocConfig;

pub struct DocService {
    annotations: RwLock<AnnotationStore>,
    config: DocConfig,
    document: Mutex<Option<Arc<SpecDocument>>>,
}

impl DocService {
    pub fn new(config: DocConfig) -> Self {
        DocService {
            annotations: RwLock::new(AnnotationStore::new()),
            config,
            document: Mutex::new(None),
        }
    }

    /// Read access to the annotation store.
    pub fn annotations(&self) -> RwLockReadGuard<'_, AnnotationStore> {
        self.annotations.read().expect("annotation store lock poisoned")
    }

    /// Write access to the annotation store, for the attachment surface.
    /// Call [`DocService::invalidate`] after post-startup writes.
    pub fn annotations_mut(&self) -> RwLockWriteGuard<'_, AnnotationStore> {
        self.annotations.write().expect("annotation store lock poisoned")
    }

    pub fn config(&self) -> &DocConfig {
        &self.config
    }

    /// The assembled document, building it on first call.
    ///
    /// # Errors
    ///
    /// Propagates [`AssemblyError`] from a failed build. The failure is not
    /// cached: the next call re-assembles.
    pub fn document(&self, catalog: &dyn RouteCatalog) -> Result<Arc<SpecDocument>, AssemblyError> {
        let mut cached = self.document.lock().expect("document cache lock poisoned");
        if let Some(document) = cached.as_ref() {
            debug!("specification document cache hit");
            return Ok(Arc::clone(document));
        }

        let store = self.annotations.read().expect("annotation store lock poisoned");
        match assemble(catalog, &store, &self.config) {
            Ok(document) => {
                let document = Arc::new(document);
                *cached = Some(Arc::clone(&document));
                info!(
                    path_count = document.paths.len(),
                    definition_count = document.definitions.len(),
                    "specification document assembled and cached"
                );
                Ok(document)
            }
            Err(err) => {
                error!(error = %err, "specification assembly failed");
                Err(err)
            }
        }
    }

    /// JSON byte body for the specification read endpoint.
    pub fn json_body(&self, catalog: &dyn RouteCatalog) -> anyhow::Result<Vec<u8>> {
        let document = self.document(catalog)?;
        Ok(document.to_json_vec()?)
    }

    /// YAML body, for hosts serving both encodings.
    pub fn yaml_body(&self, catalog: &dyn RouteCatalog) -> anyhow::Result<String> {
        let document = self.document(catalog)?;
        Ok(document.to_yaml_string()?)
    }

    /// Drop the cached document so the next request re-assembles.
    pub fn invalidate(&self) {
        let mut cached = self.document.lock().expect("document cache lock poisoned");
        if cached.take().is_some() {
            debug!("specification document cache invalidated");
        }
    }

    /// Clear the annotation store and the cached document.
    pub fn reset(&self) {
        self.annotations
            .write()
            .expect("annotation store lock poisoned")
            .reset();
        self.invalidate();
    }
}
