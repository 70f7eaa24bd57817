//! The conversion facade used by the rendering layer.
//!
//! Every lookup goes cache → remote service (raced against a deadline) →
//! offline approximation → cache. Lookups never fail.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use futures::StreamExt;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::approx::ApproximationEngine;
use crate::cache::{ConversionCache, DEFAULT_TTL_HOURS};
use crate::clock::{Clock, SystemClock};
use crate::config::CalendarConfig;
use crate::date_key::to_key;
use crate::error::RemoteError;
use crate::metrics::Metrics;
use crate::remote::{ConversionService, HttpConversionClient};
use crate::types::{CalendarSystem, ChineseLunarDate, HijriDate};

/// Default deadline for one remote lookup.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2_500);

/// Default number of remote lookups open at once.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 42;

pub struct CalendarConverter {
    service: Option<Arc<dyn ConversionService>>,
    allow_remote: bool,
    timeout: Duration,
    max_in_flight: usize,
    permits: Semaphore,
    engine: ApproximationEngine,
    hijri_cache: ConversionCache<HijriDate>,
    chinese_cache: ConversionCache<ChineseLunarDate>,
    metrics: Arc<Metrics>,
}

// ---------- BUILDER ----------

pub struct ConverterBuilder {
    service: Option<Arc<dyn ConversionService>>,
    allow_remote: bool,
    timeout: Duration,
    max_in_flight: usize,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    engine: ApproximationEngine,
    metrics: Arc<Metrics>,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self {
            service: None,
            allow_remote: true,
            timeout: DEFAULT_TIMEOUT,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            ttl: chrono::Duration::hours(DEFAULT_TTL_HOURS),
            clock: Arc::new(SystemClock),
            engine: ApproximationEngine::default(),
            metrics: Arc::new(Metrics::new()),
        }
    }
}

impl ConverterBuilder {
    pub fn service(mut self, service: Arc<dyn ConversionService>) -> Self {
        self.service = Some(service);
        self
    }

    /// `false` guarantees that no outbound request is ever made.
    pub fn allow_remote(mut self, allow: bool) -> Self {
        self.allow_remote = allow;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn ttl(mut self, ttl: chrono::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn engine(mut self, engine: ApproximationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn build(self) -> CalendarConverter {
        CalendarConverter {
            service: self.service,
            allow_remote: self.allow_remote,
            timeout: self.timeout,
            max_in_flight: self.max_in_flight,
            permits: Semaphore::new(self.max_in_flight),
            engine: self.engine,
            hijri_cache: ConversionCache::new(self.ttl, Arc::clone(&self.clock)),
            chinese_cache: ConversionCache::new(self.ttl, self.clock),
            metrics: self.metrics,
        }
    }
}

// ---------- FACADE ----------

impl CalendarConverter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::default()
    }

    /// A converter that only ever uses the offline approximations.
    pub fn offline() -> Self {
        Self::builder().allow_remote(false).build()
    }

    /// Wires the HTTP client, anchors, cache lifetime and batch width from `config`.
    pub fn from_config(config: &CalendarConfig) -> Self {
        let mut builder = Self::builder()
            .allow_remote(config.remote.enabled)
            .timeout(config.remote.timeout())
            .max_in_flight(config.batch.max_in_flight)
            .ttl(chrono::Duration::hours(i64::from(config.cache.ttl_hours)))
            .engine(config.approximation_engine());
        if config.remote.enabled {
            let client = HttpConversionClient::new(&config.remote);
            debug!(target: "conversion", "Remote lookups via {}", client.name());
            builder = builder.service(Arc::new(client));
        }
        builder.build()
    }

    pub fn allows_remote(&self) -> bool {
        self.allow_remote && self.service.is_some()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn hijri_cache(&self) -> &ConversionCache<HijriDate> {
        &self.hijri_cache
    }

    pub fn chinese_cache(&self) -> &ConversionCache<ChineseLunarDate> {
        &self.chinese_cache
    }

    /// Hijri equivalent of `date`.
    pub async fn hijri_for(&self, date: NaiveDate) -> HijriDate {
        let key = to_key(date);
        if let Some(value) = self.cached(&self.hijri_cache, CalendarSystem::Hijri, &key) {
            return value;
        }

        let started = Instant::now();
        let remote = match self.remote_service() {
            Some(service) => Some(self.with_deadline(service.fetch_hijri(date)).await),
            None => None,
        };
        let value =
            self.settle(CalendarSystem::Hijri, &key, remote, || self.engine.hijri(date));

        self.hijri_cache.put(key, value.clone());
        self.metrics.record_conversion(started.elapsed());
        value
    }

    /// Chinese lunar equivalent of `date`.
    pub async fn chinese_lunar_for(&self, date: NaiveDate) -> ChineseLunarDate {
        let key = to_key(date);
        if let Some(value) = self.cached(&self.chinese_cache, CalendarSystem::Chinese, &key) {
            return value;
        }

        let started = Instant::now();
        let remote = match self.remote_service() {
            Some(service) => Some(self.with_deadline(service.fetch_chinese(date)).await),
            None => None,
        };
        let value =
            self.settle(CalendarSystem::Chinese, &key, remote, || self.engine.chinese(date));

        self.chinese_cache.put(key, value.clone());
        self.metrics.record_conversion(started.elapsed());
        value
    }

    /// Converts every date into both calendars. Results come back in input
    /// order; remote lookups share the converter's `max_in_flight` permits.
    pub async fn convert_batch(
        &self,
        dates: &[NaiveDate],
    ) -> Vec<(HijriDate, ChineseLunarDate)> {
        let started = Instant::now();
        let results: Vec<_> = futures::stream::iter(dates.iter().copied())
            .map(|date| async move {
                tokio::join!(self.hijri_for(date), self.chinese_lunar_for(date))
            })
            .buffered(self.max_in_flight)
            .collect()
            .await;

        info!(
            target: "conversion",
            "Converted {} dates in {}µs",
            dates.len(),
            started.elapsed().as_micros()
        );
        results
    }

    fn remote_service(&self) -> Option<&dyn ConversionService> {
        if self.allow_remote {
            self.service.as_deref()
        } else {
            None
        }
    }

    fn cached<T: Clone>(
        &self,
        cache: &ConversionCache<T>,
        system: CalendarSystem,
        key: &str,
    ) -> Option<T> {
        match cache.get(key) {
            Some(entry) => {
                self.metrics.record_cache_hit();
                debug!(target: "cache", "{} cache hit for {}", system, key);
                Some(entry.value)
            }
            None => {
                self.metrics.record_cache_miss();
                None
            }
        }
    }

    /// Waits for a permit, then runs the lookup. Both count against the
    /// deadline, and the lookup is dropped once it passes.
    async fn with_deadline<T>(
        &self,
        lookup: impl Future<Output = Result<T, RemoteError>>,
    ) -> Result<T, RemoteError> {
        let bounded = async {
            let _permit = self.permits.acquire().await;
            lookup.await
        };
        match tokio::time::timeout(self.timeout, bounded).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.timeout.as_millis())),
        }
    }

    fn settle<T>(
        &self,
        system: CalendarSystem,
        key: &str,
        remote: Option<Result<T, RemoteError>>,
        approximate: impl FnOnce() -> T,
    ) -> T {
        match remote {
            Some(Ok(value)) => {
                self.metrics.record_remote_success();
                value
            }
            Some(Err(err)) => {
                warn!(
                    target: "conversion",
                    "{} lookup for {} failed, using approximation: {}",
                    system,
                    key,
                    err
                );
                self.metrics.record_fallback();
                approximate()
            }
            None => {
                debug!(
                    target: "conversion",
                    "Remote disabled, approximating {} for {}",
                    system,
                    key
                );
                self.metrics.record_fallback();
                approximate()
            }
        }
    }
}
