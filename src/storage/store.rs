//! Persistence seam between the analytics core and storage backends.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::activity::types::{ActivityHistoryEntry, ActivityMeta, ProcessedActivity, RawSample};
use crate::metrics::analytics::pdc::{CriticalPowerPoint, NamedCpSet};
use crate::storage::config::UserProfile;
use crate::storage::database::DatabaseError;

/// Everything the history views and processing need from storage.
///
/// Fetches for a missing record return [`DatabaseError::NotFound`], except
/// activity meta, which falls back to the default.
pub trait ActivityStore {
    fn fetch_raw_samples(&self, activity_id: &Uuid) -> Result<Vec<RawSample>, DatabaseError>;

    fn fetch_user_profile(&self, user_id: &Uuid) -> Result<UserProfile, DatabaseError>;

    /// Processed activities started in `[from, to)`, oldest first.
    fn fetch_activity_summaries(
        &self,
        user_id: &Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ActivityHistoryEntry>, DatabaseError>;

    fn fetch_critical_power_curve(&self, activity_id: &Uuid) -> Result<Vec<CriticalPowerPoint>, DatabaseError>;

    fn fetch_named_cp_set(&self, activity_id: &Uuid) -> Result<NamedCpSet, DatabaseError>;

    fn fetch_activity_meta(&self, activity_id: &Uuid) -> Result<ActivityMeta, DatabaseError>;

    fn fetch_processed(&self, activity_id: &Uuid) -> Result<ProcessedActivity, DatabaseError>;

    /// All activity ids for a user, processed or not, oldest first.
    fn fetch_activity_ids(&self, user_id: &Uuid) -> Result<Vec<Uuid>, DatabaseError>;

    /// Insert or replace a user profile.
    fn save_user_profile(&mut self, profile: &UserProfile) -> Result<(), DatabaseError>;

    /// Create an activity from its raw samples.
    fn save_raw_samples(&mut self, user_id: &Uuid, activity_id: &Uuid, samples: &[RawSample]) -> Result<(), DatabaseError>;

    /// Store (or replace) the derived metrics of an activity.
    fn save_processed(&mut self, activity_id: &Uuid, activity: &ProcessedActivity) -> Result<(), DatabaseError>;

    fn save_activity_meta(&mut self, activity_id: &Uuid, meta: &ActivityMeta) -> Result<(), DatabaseError>;

    /// Remove an activity and everything stored with it.
    fn delete_activity(&mut self, activity_id: &Uuid) -> Result<(), DatabaseError>;
}
