//! In-memory dive site storage.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state.

use divelog_core::error::{DivelogError, Result};
use divelog_core::models::{DiveSite, SiteId, TaxonomyKind};
use divelog_core::ports::SiteRepository;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory implementation of SiteRepository.
///
/// A single lock guards every site, so the geocoding worker and user edits
/// never interleave on the same taxonomy.
#[derive(Debug, Clone, Default)]
pub struct MemorySiteStore {
    sites: Arc<RwLock<HashMap<SiteId, DiveSite>>>,
    changed: Arc<AtomicBool>,
}

impl MemorySiteStore {
    /// Create a new in-memory site store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `sites`
    pub fn with_sites(sites: impl IntoIterator<Item = DiveSite>) -> Self {
        let store = Self::new();
        for site in sites {
            store.insert(site);
        }
        store
    }

    /// Load sites from a JSON array
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let sites: Vec<DiveSite> = serde_json::from_str(&content)?;
        tracing::debug!(count = sites.len(), path = %path.as_ref().display(), "Loaded dive sites");
        Ok(Self::with_sites(sites))
    }

    /// Write all sites as a JSON array, ordered by name
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.all())?;
        fs::write(path.as_ref(), content)?;
        self.clear_changed();
        Ok(())
    }

    /// Add or replace a site
    pub fn insert(&self, site: DiveSite) -> SiteId {
        let id = site.id;
        self.sites.write().unwrap().insert(id, site);
        id
    }

    /// Delete a site
    pub fn remove(&self, id: SiteId) -> Option<DiveSite> {
        self.sites.write().unwrap().remove(&id)
    }

    /// Snapshot of every site, ordered by name
    pub fn all(&self) -> Vec<DiveSite> {
        let mut sites: Vec<DiveSite> = self.sites.read().unwrap().values().cloned().collect();
        sites.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.0.cmp(&b.id.0)));
        sites
    }

    pub fn len(&self) -> usize {
        self.sites.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// User edit of a single taxonomy value
    pub fn set_taxonomy_value(&self, id: SiteId, kind: TaxonomyKind, value: &str) -> Result<()> {
        let mut modified = false;
        self.update_site(id, &mut |site| {
            modified = site.taxonomy.set_user_value(kind, value);
        })?;
        if modified {
            self.mark_changed();
        }
        Ok(())
    }

    /// Whether anything was modified since the last save
    pub fn is_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }

    pub fn clear_changed(&self) {
        self.changed.store(false, Ordering::Release);
    }
}

impl SiteRepository for MemorySiteStore {
    fn get_site(&self, id: SiteId) -> Option<DiveSite> {
        self.sites.read().unwrap().get(&id).cloned()
    }

    fn update_site(&self, id: SiteId, update: &mut dyn FnMut(&mut DiveSite)) -> Result<()> {
        let mut sites = self.sites.write().unwrap();
        let site = sites.get_mut(&id).ok_or(DivelogError::SiteNotFound { id })?;
        update(site);
        Ok(())
    }

    fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }
}
