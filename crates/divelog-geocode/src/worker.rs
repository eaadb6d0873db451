//! Reverse geocoding worker.
//!
//! Sites are queued with their coordinates and drained strictly in FIFO
//! order. For each site the place name provider is asked first, then the
//! ocean provider; each call is bounded by the configured timeout and a
//! failure of one never discards what the other produced.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use divelog_core::config::GeocodeSettings;
use divelog_core::models::{Coordinate, DiveSite, SiteId, TaxonomyKind, TaxonomyOrigin};
use divelog_core::ports::{ErrorReporter, SiteRepository};
use tokio::sync::{broadcast, Mutex as DrainLock};
use tracing::{debug, info, warn};

use crate::error::LookupError;
use crate::geonames::{self, Provider};
use crate::http::HttpFetcher;

const EVENT_CAPACITY: usize = 64;

/// A pending lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeoLookupRequest {
    pub coordinate: Coordinate,
    pub site_id: SiteId,
}

/// Notification sent to observers of location data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationEvent {
    /// The taxonomy of a site was modified
    TaxonomyChanged(SiteId),
}

/// Outcome of one drain of the queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Queue entries consumed
    pub processed: usize,
    /// Sites whose taxonomy changed
    pub enriched: usize,
    /// Every skipped step, in order of occurrence
    pub errors: Vec<LookupError>,
}

/// Drains the lookup queue and writes geocoded names into dive sites.
///
/// Constructed once by the application's composition root and shared via
/// `Arc`. Producers may call [`enqueue`](Self::enqueue) from any thread, also
/// while a drain is running; the running drain picks the new entries up.
pub struct ReverseGeocoder {
    settings: GeocodeSettings,
    fetcher: Arc<dyn HttpFetcher>,
    repository: Arc<dyn SiteRepository>,
    reporter: Arc<dyn ErrorReporter>,
    queue: Mutex<VecDeque<GeoLookupRequest>>,
    /// Held by whichever drain is running
    drain_lock: DrainLock<()>,
    events: broadcast::Sender<LocationEvent>,
}

impl ReverseGeocoder {
    pub fn new(
        settings: GeocodeSettings,
        fetcher: Arc<dyn HttpFetcher>,
        repository: Arc<dyn SiteRepository>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            settings,
            fetcher,
            repository,
            reporter,
            queue: Mutex::new(VecDeque::new()),
            drain_lock: DrainLock::new(()),
            events,
        }
    }

    /// Receive a [`LocationEvent`] after every taxonomy change.
    ///
    /// Events may be coalesced for slow receivers; a lagged receiver should
    /// simply reload.
    pub fn subscribe(&self) -> broadcast::Receiver<LocationEvent> {
        self.events.subscribe()
    }

    pub fn settings(&self) -> &GeocodeSettings {
        &self.settings
    }

    /// Append a lookup to the queue without clearing it
    pub fn enqueue(&self, coordinate: Coordinate, site_id: SiteId) {
        self.queue.lock().unwrap().push_back(GeoLookupRequest { coordinate, site_id });
        debug!(site = %site_id, %coordinate, "queued reverse geocode lookup");
    }

    /// Number of lookups waiting
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Look up a single site, discarding anything queued before.
    ///
    /// If another drain is running, waits for it to finish and then drains
    /// the lookup itself, so the site's taxonomy is up to date on return.
    /// A site without coordinates only clears the queue.
    pub async fn lookup(&self, site: &DiveSite) -> BatchReport {
        // Stop a running drain from picking up stale entries while we wait
        self.queue.lock().unwrap().clear();

        let Some(coordinate) = site.coordinate else {
            debug!(site = %site.id, "dive site has no coordinates, nothing to look up");
            return BatchReport::default();
        };

        let guard = self.drain_lock.lock().await;
        {
            let mut queue = self.queue.lock().unwrap();
            queue.clear();
            queue.push_back(GeoLookupRequest { coordinate, site_id: site.id });
        }
        let mut report = BatchReport::default();
        self.drain(&mut report).await;
        drop(guard);

        // Entries enqueued in the last moment of the drain
        if self.pending() > 0 {
            self.drain_while_idle(&mut report).await;
        }
        log_report(&report);
        report
    }

    /// Like [`lookup`](Self::lookup), but on a dedicated background thread
    pub fn spawn_lookup(self: &Arc<Self>, site: &DiveSite) -> io::Result<JoinHandle<BatchReport>> {
        self.spawn_drain(Some(site.clone()))
    }

    /// Drain the queue on a dedicated background thread.
    ///
    /// The thread runs its own single-threaded tokio runtime, so the caller's
    /// event loop is never blocked.
    pub fn spawn_batch(self: &Arc<Self>) -> io::Result<JoinHandle<BatchReport>> {
        self.spawn_drain(None)
    }

    fn spawn_drain(self: &Arc<Self>, site: Option<DiveSite>) -> io::Result<JoinHandle<BatchReport>> {
        let worker = Arc::clone(self);
        thread::Builder::new()
            .name("reverse-geocode".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let message = format!("failed to start reverse geocoding runtime: {}", e);
                        tracing::error!("{}", message);
                        worker.reporter.report(&message);
                        return BatchReport::default();
                    }
                };
                runtime.block_on(async {
                    match &site {
                        Some(site) => worker.lookup(site).await,
                        None => worker.run_batch().await,
                    }
                })
            })
    }

    /// Process every queued lookup in FIFO order.
    ///
    /// Returns immediately with an empty report if the queue is empty or if
    /// another drain is already running; the running drain consumes whatever
    /// is queued.
    pub async fn run_batch(&self) -> BatchReport {
        let mut report = BatchReport::default();
        self.drain_while_idle(&mut report).await;
        log_report(&report);
        report
    }

    /// Drain as long as no other drain holds the lock
    async fn drain_while_idle(&self, report: &mut BatchReport) {
        loop {
            let Ok(guard) = self.drain_lock.try_lock() else {
                debug!("reverse geocode drain already running");
                break;
            };
            self.drain(report).await;
            drop(guard);

            // An enqueue may have slipped in between the last pop and the release
            if self.pending() == 0 {
                break;
            }
        }
    }

    async fn drain(&self, report: &mut BatchReport) {
        while let Some(request) = self.next_request() {
            self.process(request, report).await;
        }
    }

    fn next_request(&self) -> Option<GeoLookupRequest> {
        self.queue.lock().unwrap().pop_front()
    }

    async fn process(&self, request: GeoLookupRequest, report: &mut BatchReport) {
        report.processed += 1;
        let site_id = request.site_id;

        if self.repository.get_site(site_id).is_none() {
            self.fail(LookupError::SiteVanished { id: site_id }, report);
            return;
        }

        let mut changed = false;

        let place_names = self
            .fetch(Provider::PlaceNames, &request.coordinate)
            .await
            .and_then(|body| geonames::parse_place_names(&body));
        match place_names {
            Ok(names) => match self.apply_place_names(site_id, &names) {
                Ok(modified) => changed |= modified,
                Err(e) => {
                    self.fail(e, report);
                    return;
                }
            },
            Err(e) => self.fail(e, report),
        }

        let ocean = self
            .fetch(Provider::Ocean, &request.coordinate)
            .await
            .and_then(|body| geonames::parse_ocean(&body));
        match ocean {
            Ok(Some(name)) => match self.apply_ocean(site_id, &name) {
                Ok(modified) => changed |= modified,
                Err(e) => self.fail(e, report),
            },
            Ok(None) => debug!(site = %site_id, "no ocean name for coordinates"),
            Err(e) => self.fail(e, report),
        }

        if changed {
            report.enriched += 1;
        }
    }

    /// Issue one bounded GET and return the body of a 2xx answer.
    ///
    /// On timeout the request future is dropped, which aborts the call.
    async fn fetch(&self, provider: Provider, coordinate: &Coordinate) -> Result<Vec<u8>, LookupError> {
        let url = geonames::request_url(provider, &self.settings, coordinate)?;
        debug!(%provider, %url, "reverse geocode request");

        let response = tokio::time::timeout(self.settings.timeout, self.fetcher.get(&url))
            .await
            .map_err(|_| LookupError::Timeout { provider })?
            .map_err(|e| LookupError::Transport {
                provider,
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(LookupError::HttpStatus {
                provider,
                status: response.status,
            });
        }
        Ok(response.body)
    }

    fn apply_place_names(
        &self,
        site_id: SiteId,
        names: &[(TaxonomyKind, String)],
    ) -> Result<bool, LookupError> {
        let reported: Vec<TaxonomyKind> = names.iter().map(|(kind, _)| *kind).collect();
        let mut modified = false;

        self.repository
            .update_site(site_id, &mut |site| {
                let taxonomy = &mut site.taxonomy;
                taxonomy.ensure_allocated();
                modified |= taxonomy.prune_stale_geocoded(&reported) > 0;
                for (kind, value) in names {
                    modified |= taxonomy.upsert(*kind, value.as_str(), TaxonomyOrigin::Geocoded);
                }
            })
            .map_err(|_| LookupError::SiteVanished { id: site_id })?;

        if modified {
            self.notify(site_id);
        }
        Ok(modified)
    }

    fn apply_ocean(&self, site_id: SiteId, name: &str) -> Result<bool, LookupError> {
        let mut modified = false;

        self.repository
            .update_site(site_id, &mut |site| {
                let taxonomy = &mut site.taxonomy;
                if taxonomy.get(TaxonomyKind::Ocean).is_some() {
                    modified = taxonomy.upsert(TaxonomyKind::Ocean, name, TaxonomyOrigin::Geocoded);
                } else {
                    taxonomy.append(TaxonomyKind::Ocean, name, TaxonomyOrigin::Geocoded);
                    modified = true;
                }
            })
            .map_err(|_| LookupError::SiteVanished { id: site_id })?;

        if modified {
            self.notify(site_id);
        }
        Ok(modified)
    }

    fn notify(&self, site_id: SiteId) {
        self.repository.mark_changed();
        // No receivers is fine
        let _ = self.events.send(LocationEvent::TaxonomyChanged(site_id));
    }

    fn fail(&self, error: LookupError, report: &mut BatchReport) {
        warn!(error = %error, "reverse geocode step skipped");
        if error.is_reported() {
            self.reporter.report(&error.to_string());
        }
        report.errors.push(error);
    }
}

fn log_report(report: &BatchReport) {
    if report.processed > 0 {
        info!(
            processed = report.processed,
            enriched = report.enriched,
            errors = report.errors.len(),
            "reverse geocode batch finished"
        );
    }
}
