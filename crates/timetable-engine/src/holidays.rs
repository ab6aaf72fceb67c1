//! Holiday source cache
//!
//! Fetches a division's non-working dates from the holiday feed once per
//! process and serves them from memory afterwards. Concurrent first calls
//! for the same division share one in-flight fetch.

use chrono::NaiveDate;
use shared_types::{AppError, HolidayFeed, HolidaySet, DEFAULT_HOLIDAY_FEED_URL};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::FeedSettings;
use crate::error_convert::ReqwestErrorExt;

type Entry = Arc<OnceCell<Arc<HolidaySet>>>;

/// Process-wide holiday cache, constructed once and shared by reference.
pub struct HolidayCache {
    client: reqwest::Client,
    feed_url: String,
    /// Division -> lazily filled holiday set.
    entries: Mutex<HashMap<String, Entry>>,
}

impl HolidayCache {
    /// Cache backed by `feed_url`; every fetch is bounded by `timeout`.
    pub fn new(feed_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            feed_url: feed_url.into(),
            entries: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_settings(settings: &FeedSettings) -> Result<Self, AppError> {
        Self::new(settings.url.clone(), settings.timeout)
    }

    /// Cache pre-populated for one division. That division never triggers a
    /// fetch; any other division uses the default feed.
    pub fn seeded(division: &str, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let cache = Self {
            client: reqwest::Client::new(),
            feed_url: DEFAULT_HOLIDAY_FEED_URL.to_string(),
            entries: Mutex::new(HashMap::new()),
        };
        cache.seed(division, dates);
        cache
    }

    /// Fill `division` with a static holiday set.
    ///
    /// A division that is already cached, or has a fetch in flight, keeps
    /// its set: returns `false` and the dates are dropped.
    pub fn seed(&self, division: &str, dates: impl IntoIterator<Item = NaiveDate>) -> bool {
        let set: HolidaySet = dates.into_iter().collect();
        let cell = self.entry(division);
        let seeded = cell.set(Arc::new(set)).is_ok();
        if !seeded {
            tracing::warn!(division, "Holiday set already cached, seed ignored");
        }
        seeded
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// Divisions with a cached set or a fetch in flight, sorted.
    pub fn divisions(&self) -> Vec<String> {
        let mut divisions: Vec<String> = self.lock_entries().keys().cloned().collect();
        divisions.sort();
        divisions
    }

    /// Whether `division` has a completed entry.
    pub fn is_cached(&self, division: &str) -> bool {
        self.lock_entries()
            .get(division)
            .is_some_and(|cell| cell.initialized())
    }

    /// Holidays for `division`, fetching the feed on first use.
    ///
    /// Failures are not cached: the division stays empty so a later call
    /// fetches again. A failure is never reported as an empty set.
    #[tracing::instrument(skip(self))]
    pub async fn get_holidays(&self, division: &str) -> Result<Arc<HolidaySet>, AppError> {
        let cell = self.entry(division);
        match cell.get_or_try_init(|| self.fetch_division(division)).await {
            Ok(holidays) => Ok(Arc::clone(holidays)),
            Err(e) => {
                self.forget_failed(division, &cell);
                Err(e)
            }
        }
    }

    fn entry(&self, division: &str) -> Entry {
        self.lock_entries()
            .entry(division.to_string())
            .or_default()
            .clone()
    }

    /// Drop an empty entry once no other caller is waiting on it, so failed
    /// divisions do not accumulate.
    fn forget_failed(&self, division: &str, cell: &Entry) {
        let mut entries = self.lock_entries();
        let unused = entries.get(division).is_some_and(|current| {
            Arc::ptr_eq(current, cell) && !cell.initialized() && Arc::strong_count(cell) == 2
        });
        if unused {
            entries.remove(division);
        }
    }

    async fn fetch_division(&self, division: &str) -> Result<Arc<HolidaySet>, AppError> {
        tracing::info!(division, url = %self.feed_url, "Fetching holiday feed");

        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, division, "Holiday feed request failed");
                e.into_app_error()
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(%status, division, "Holiday feed returned an error status");
            return Err(AppError::holiday_source_unavailable(format!(
                "Holiday feed returned {}",
                status
            )));
        }

        let feed: HolidayFeed = response.json().await.map_err(|e| {
            tracing::error!(error = %e, division, "Holiday feed could not be parsed");
            e.into_app_error()
        })?;

        let calendar = feed.get(division).ok_or_else(|| {
            tracing::warn!(division, "Division missing from holiday feed");
            AppError::holiday_source_unavailable(format!(
                "Division '{}' not present in holiday feed",
                division
            ))
        })?;

        let dates = calendar.dates();
        tracing::info!(division, holidays = dates.len(), "Holiday feed cached");
        Ok(Arc::new(dates))
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for HolidayCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolidayCache")
            .field("feed_url", &self.feed_url)
            .field("divisions", &self.divisions())
            .finish()
    }
}
