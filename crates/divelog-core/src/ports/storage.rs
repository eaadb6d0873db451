use crate::error::Result;
use crate::models::{DiveSite, SiteId};

/// Port for dive site storage.
///
/// Implementations must serialise `update_site` against every other writer of
/// the same site: the geocoding worker calls it from its own thread while
/// user edits arrive from the UI thread.
pub trait SiteRepository: Send + Sync {
    /// Snapshot of a dive site by ID
    fn get_site(&self, id: SiteId) -> Option<DiveSite>;

    /// Mutate a dive site in place.
    ///
    /// Returns `SiteNotFound` if the site was deleted.
    fn update_site(&self, id: SiteId, update: &mut dyn FnMut(&mut DiveSite)) -> Result<()>;

    /// Flag the dive log as modified so it gets saved
    fn mark_changed(&self);
}
