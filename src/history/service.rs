//! Activity import, reprocessing and the cross-activity history views.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::activity::processor::process_activity;
use crate::activity::types::{ActivityHistoryEntry, ActivityMeta, ProcessedActivity, RawSample};
use crate::metrics::analytics::binning::{Binned, PeriodBinner, TssBin, ZoneBin, ZoneKind};
use crate::metrics::analytics::curve_merge::{merge_power_curves, ActivityCurve, MergedCurveTable};
use crate::metrics::analytics::error::AnalyticsError;
use crate::metrics::analytics::pdc::NamedDuration;
use crate::metrics::analytics::performance::{performance_chart, PerformanceFilter, PerformancePoint};
use crate::metrics::analytics::training_load::{FitnessTrend, TrainingLoadCalculator, PROJECTION_DAYS};
use crate::storage::config::{ConfigError, UserProfile};
use crate::storage::database::DatabaseError;
use crate::storage::store::ActivityStore;

/// Errors from history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid activity details: {0}")]
    InvalidMeta(String),
}

/// Result type for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// One user's activities over an [`ActivityStore`].
pub struct HistoryService<S: ActivityStore> {
    store: S,
    user_id: Uuid,
}

impl<S: ActivityStore> HistoryService<S> {
    pub fn new(store: S, user_id: Uuid) -> Self {
        Self { store, user_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The stored profile, checked before it reaches the analytics core.
    pub fn profile(&self) -> HistoryResult<UserProfile> {
        let profile = self.store.fetch_user_profile(&self.user_id)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Process and store a new activity.
    ///
    /// Nothing is stored when processing fails.
    pub fn import_activity(&mut self, samples: &[RawSample]) -> HistoryResult<(Uuid, ProcessedActivity)> {
        let profile = self.profile()?;
        let processed = process_activity(samples, &profile)?;

        let activity_id = Uuid::new_v4();
        self.store.save_raw_samples(&self.user_id, &activity_id, samples)?;
        self.store.save_processed(&activity_id, &processed)?;

        tracing::info!("Imported activity {} ({} samples)", activity_id, samples.len());
        Ok((activity_id, processed))
    }

    /// Re-run processing for a stored activity with the current profile.
    pub fn reprocess(&mut self, activity_id: &Uuid) -> HistoryResult<ProcessedActivity> {
        let profile = self.profile()?;
        let samples = self.store.fetch_raw_samples(activity_id)?;
        let processed = process_activity(&samples, &profile)?;
        self.store.save_processed(activity_id, &processed)?;

        tracing::debug!("Reprocessed activity {}", activity_id);
        Ok(processed)
    }

    /// Reprocess every stored activity; returns how many were processed.
    ///
    /// An activity whose samples fail processing is logged and skipped.
    pub fn reprocess_all(&mut self) -> HistoryResult<usize> {
        let ids = self.store.fetch_activity_ids(&self.user_id)?;
        let mut processed = 0;

        for id in &ids {
            match self.reprocess(id) {
                Ok(_) => processed += 1,
                Err(HistoryError::Analytics(e)) => {
                    tracing::warn!("Skipping activity {}: {}", id, e);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!("Reprocessed {} of {} activities", processed, ids.len());
        Ok(processed)
    }

    /// Change one user-entered detail of a stored activity.
    pub fn update_meta(&mut self, activity_id: &Uuid, key: &str, value: &str) -> HistoryResult<ActivityMeta> {
        let mut meta = self.store.fetch_activity_meta(activity_id)?;
        meta.set(key, value).map_err(HistoryError::InvalidMeta)?;
        self.store.save_activity_meta(activity_id, &meta)?;

        tracing::debug!("Updated {} for activity {}", key, activity_id);
        Ok(meta)
    }

    /// Processed activities started in `[from, to)`.
    pub fn entries(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> HistoryResult<Vec<ActivityHistoryEntry>> {
        Ok(self.store.fetch_activity_summaries(&self.user_id, from, to)?)
    }

    /// Daily fitness trend over the whole history, trimmed for display.
    pub fn fitness_trend(
        &self,
        today: NaiveDate,
        history_days: u32,
        notable: NamedDuration,
    ) -> HistoryResult<FitnessTrend> {
        let profile = self.profile()?;
        let until = start_of_day(today + Days::new(PROJECTION_DAYS + 1));
        let entries = self.entries(start_of_day(NaiveDate::default()), until)?;

        let trend = TrainingLoadCalculator::with_constants(profile.atl_days, profile.ctl_days)
            .with_notable_cp(notable, profile.rolloff)
            .fitness_trend(&entries, today);

        Ok(trend.trimmed(history_days))
    }

    /// Best power curves of the last three `history_days` windows.
    pub fn power_curves(&self, history_days: u32, now: DateTime<Utc>) -> HistoryResult<MergedCurveTable> {
        let from = now - chrono::Duration::days(history_days as i64 * 3);
        let entries = self.entries(from, now)?;

        let mut curves = Vec::with_capacity(entries.len());
        for entry in entries.iter().filter(|e| e.has_power) {
            curves.push(ActivityCurve {
                start_time: entry.start_time(),
                has_power: entry.has_power,
                points: self.store.fetch_critical_power_curve(&entry.activity_id)?,
            });
        }

        Ok(merge_power_curves(&curves, history_days, now))
    }

    /// TSS and hours per week or month over the last `history_days`.
    pub fn tss_bins(&self, history_days: u32, now: DateTime<Utc>) -> HistoryResult<Binned<TssBin>> {
        let entries = self.entries(now - chrono::Duration::days(history_days as i64), now)?;
        Ok(PeriodBinner::for_history(history_days).tss_by_period(&entries))
    }

    /// Zone hours per week or month over the last `history_days`.
    pub fn zone_bins(&self, kind: ZoneKind, history_days: u32, now: DateTime<Utc>) -> HistoryResult<Binned<ZoneBin>> {
        let entries = self.entries(now - chrono::Duration::days(history_days as i64), now)?;

        let mut zones = Vec::with_capacity(entries.len());
        for entry in &entries {
            let processed = self.store.fetch_processed(&entry.activity_id)?;
            zones.push((entry.start_time().date_naive(), processed.zones));
        }

        Ok(PeriodBinner::for_history(history_days).zones_by_period(&zones, kind))
    }

    /// Heart rate vs power points for filtered activities in `[from, to)`.
    pub fn performance(
        &self,
        filter: &PerformanceFilter,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> HistoryResult<Vec<PerformancePoint>> {
        let profile = self.profile()?;
        let entries = self.entries(from, to)?;
        Ok(performance_chart(&entries, filter, profile.rolloff))
    }
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}
