//! History views over a database on disk.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ridelab::activity::types::{ActivityMeta, RawSample};
use ridelab::metrics::analytics::pdc::NamedDuration;
use ridelab::metrics::analytics::PerformanceFilter;
use ridelab::storage::{ActivityStore, Database};
use ridelab::{HistoryService, UserProfile};
use tempfile::tempdir;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 17, 19, 0, 0).unwrap()
}

fn ride(days_ago: i64, seconds: i64, power: u16) -> Vec<RawSample> {
    let start = now() - Duration::days(days_ago);
    (0..seconds)
        .map(|i| RawSample {
            timestamp: start + Duration::seconds(i),
            lap_start: start,
            lap_number: 1,
            heart_rate_bpm: 148,
            power_watts: power,
            cadence_rpm: 88,
        })
        .collect()
}

#[test]
fn test_season_of_rides() {
    let dir = tempdir().unwrap();
    let mut db = Database::open(&dir.path().join("ridelab.db")).unwrap();
    let user = db
        .get_or_create_default_user(&UserProfile::new("Season".to_string()))
        .unwrap();
    let mut service = HistoryService::new(db, user.id);

    let mut ids = Vec::new();
    for days_ago in [40, 30, 20, 10, 3, 1] {
        let power = 180 + (40 - days_ago as u16);
        let (id, _) = service.import_activity(&ride(days_ago, 3600, power)).unwrap();
        ids.push(id);
    }

    // A race is left off the training-only chart
    service
        .store_mut()
        .save_activity_meta(
            &ids[2],
            &ActivityMeta {
                is_race: true,
                ..Default::default()
            },
        )
        .unwrap();

    let trend = service
        .fitness_trend(now().date_naive(), 42, NamedDuration::TwentyMinutes)
        .unwrap();
    assert_eq!(trend.len(), 41 + 30);
    assert!(trend.at(now().date_naive()).unwrap().ctl > 0.0);
    assert_eq!(trend.points().iter().filter(|p| p.notable_cp.is_some()).count(), 6);

    let filter = PerformanceFilter {
        duration: NamedDuration::TwentyMinutes,
        training_only: true,
        ..Default::default()
    };
    let points = service.performance(&filter, now() - Duration::days(60), now()).unwrap();
    assert_eq!(points.len(), 5);

    let curves = service.power_curves(14, now()).unwrap();
    assert_eq!(curves.rows[0].power_watts, [219, 200, 190]);

    let bins = service.tss_bins(42, now()).unwrap();
    assert!(bins.legend.starts_with("By week number: Series ending wk42, 2024"));

    let dashboard = service.dashboard(now()).unwrap();
    assert_eq!(dashboard.week.activity_count, 2);
    assert!(dashboard.fitness.ctl > 0.0);

    // Reprocess everything against a new threshold
    let mut profile = service.profile().unwrap();
    profile.set("ftp", "300").unwrap();
    service.store_mut().save_user_profile(&profile).unwrap();
    assert_eq!(service.reprocess_all().unwrap(), 6);
    let reprocessed = service.store().fetch_processed(&ids[5]).unwrap();
    assert_eq!(reprocessed.ftp, 300);
}
