//! Week-so-far totals and current fitness.

use chrono::{DateTime, Datelike, Days, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::processor::compute_zones;
use crate::history::service::{start_of_day, HistoryResult, HistoryService};
use crate::metrics::analytics::training_load::TrainingLoadCalculator;
use crate::metrics::calculator::round_half_up;
use crate::metrics::zones::{ZoneCounts, ZoneLabels};
use crate::storage::store::ActivityStore;

/// Totals for the current week, Monday 00:00 until now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub week_start: DateTime<Utc>,
    pub activity_count: usize,
    pub total_tss: u32,
    pub total_hours: f64,
    pub zones: ZoneCounts,
    /// Zone boundaries for the current profile
    pub labels: ZoneLabels,
}

/// Fitness read at today's date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentFitness {
    pub ctl: f64,
    pub atl: f64,
    pub tsb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub week: WeekSummary,
    pub fitness: CurrentFitness,
}

impl<S: ActivityStore> HistoryService<S> {
    pub fn dashboard(&self, now: DateTime<Utc>) -> HistoryResult<Dashboard> {
        Ok(Dashboard {
            week: self.week_summary(now)?,
            fitness: self.current_fitness(now)?,
        })
    }

    /// Zone counts are recomputed from the stored series with the thresholds
    /// each activity was processed with.
    pub fn week_summary(&self, now: DateTime<Utc>) -> HistoryResult<WeekSummary> {
        let profile = self.profile()?;
        let today = now.date_naive();
        let monday = today - Days::new(today.weekday().num_days_from_monday() as u64);
        let week_start = start_of_day(monday);

        let entries = self.entries(week_start, now)?;
        let mut zones = ZoneCounts::default();
        let mut total_tss = 0;
        let mut total_hours = 0.0;

        for entry in &entries {
            total_tss += entry.effective_tss();
            total_hours += entry.summary.duration_hours();

            let processed = self.store().fetch_processed(&entry.activity_id)?;
            zones.accumulate(&compute_zones(
                &processed.series,
                processed.ftp,
                processed.thr,
                profile.sample_window,
            ));
        }

        Ok(WeekSummary {
            week_start,
            activity_count: entries.len(),
            total_tss,
            total_hours: round_half_up(total_hours, 2),
            zones,
            labels: ZoneLabels::from_thresholds(profile.ftp, profile.thr),
        })
    }

    /// CTL, ATL and TSB today from the last six months of activities.
    pub fn current_fitness(&self, now: DateTime<Utc>) -> HistoryResult<CurrentFitness> {
        let profile = self.profile()?;
        let today = now.date_naive();
        let from = now.checked_sub_months(Months::new(6)).unwrap_or(now);

        let entries = self.entries(from, now)?;
        let trend = TrainingLoadCalculator::with_constants(profile.atl_days, profile.ctl_days)
            .fitness_trend(&entries, today);

        Ok(trend
            .at(today)
            .map(|point| CurrentFitness {
                ctl: point.ctl,
                atl: point.atl,
                tsb: point.tsb,
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::types::{ActivityMeta, RawSample};
    use crate::storage::config::UserProfile;
    use crate::storage::database::Database;
    use chrono::{Duration, TimeZone};

    // A Thursday
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 13, 20, 0, 0).unwrap()
    }

    fn ride(start: DateTime<Utc>, seconds: i64, power: u16) -> Vec<RawSample> {
        (0..seconds)
            .map(|i| RawSample {
                timestamp: start + Duration::seconds(i),
                lap_start: start,
                lap_number: 1,
                heart_rate_bpm: 150,
                power_watts: power,
                cadence_rpm: 90,
            })
            .collect()
    }

    fn service() -> HistoryService<Database> {
        let mut db = Database::open_in_memory().expect("Failed to create database");
        let user = UserProfile::new("Rider".to_string());
        db.save_user_profile(&user).expect("Failed to insert user");
        HistoryService::new(db, user.id)
    }

    #[test]
    fn test_week_starts_monday() {
        let service = service();
        let week = service.week_summary(now()).unwrap();
        assert_eq!(week.week_start, Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap());
        assert_eq!(week.activity_count, 0);
        assert_eq!(week.labels, ZoneLabels::from_thresholds(250, 160));
    }

    #[test]
    fn test_week_totals() {
        let mut service = service();
        // Previous Sunday is outside the week
        service.import_activity(&ride(now() - Duration::days(4), 3600, 200)).unwrap();
        service.import_activity(&ride(now() - Duration::days(2), 3600, 200)).unwrap();
        let (id, _) = service.import_activity(&ride(now() - Duration::days(1), 1800, 200)).unwrap();

        let meta = ActivityMeta {
            tss_override: 40,
            ..Default::default()
        };
        service.store_mut().save_activity_meta(&id, &meta).unwrap();

        let week = service.week_summary(now()).unwrap();
        assert_eq!(week.activity_count, 2);
        assert_eq!(week.total_tss, 64 + 40);
        assert_eq!(week.total_hours, 1.5);
        assert_eq!(week.zones.heart_total(), 5400);
    }

    #[test]
    fn test_zones_use_processing_thresholds() {
        let mut service = service();
        service.import_activity(&ride(now() - Duration::days(1), 600, 200)).unwrap();
        let before = service.week_summary(now()).unwrap().zones;

        let mut profile = service.profile().unwrap();
        profile.set("ftp", "150").unwrap();
        service.store_mut().save_user_profile(&profile).unwrap();

        let after = service.week_summary(now()).unwrap();
        assert_eq!(after.zones, before);
        assert_eq!(after.labels, ZoneLabels::from_thresholds(150, 160));
    }

    #[test]
    fn test_current_fitness() {
        let mut service = service();
        assert_eq!(service.current_fitness(now()).unwrap(), CurrentFitness::default());

        // The first day of the trend carries no load
        service.import_activity(&ride(now() - Duration::days(5), 3600, 200)).unwrap();
        service.import_activity(&ride(now() - Duration::days(3), 3600, 200)).unwrap();
        let fitness = service.current_fitness(now()).unwrap();
        assert!(fitness.ctl > 0.0);
        assert!(fitness.atl > fitness.ctl);
        assert!((fitness.tsb - (fitness.ctl - fitness.atl)).abs() < 1e-9);
    }
}
