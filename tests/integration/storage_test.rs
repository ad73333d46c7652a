//! On-disk database round trips.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ridelab::activity::types::{ActivityMeta, RawSample};
use ridelab::storage::{ActivityStore, Database, DatabaseError};
use ridelab::{process_activity, UserProfile};
use tempfile::tempdir;
use uuid::Uuid;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 3, 10, 0, 0).unwrap()
}

fn ride(seconds: i64) -> Vec<RawSample> {
    (0..seconds)
        .map(|i| RawSample {
            timestamp: start() + Duration::seconds(i),
            lap_start: start(),
            lap_number: 1,
            heart_rate_bpm: 135 + (i % 20) as u8,
            power_watts: 150 + (i % 120) as u16,
            cadence_rpm: if i % 50 == 0 { 0 } else { 85 },
        })
        .collect()
}

#[test]
fn test_data_survives_reopen() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("ridelab.db");

    let user = UserProfile::new("Disk Rider".to_string());
    let activity_id = Uuid::new_v4();
    let samples = ride(1200);
    let processed = process_activity(&samples, &user).unwrap();

    {
        let mut db = Database::open(&path).expect("Failed to open database");
        db.save_user_profile(&user).unwrap();
        db.save_raw_samples(&user.id, &activity_id, &samples).unwrap();
        db.save_processed(&activity_id, &processed).unwrap();
        db.save_activity_meta(
            &activity_id,
            &ActivityMeta {
                perceived_effort: 7,
                is_indoor: true,
                ..Default::default()
            },
        )
        .unwrap();
    }

    let db = Database::open(&path).expect("Failed to reopen database");
    assert_eq!(db.fetch_user_profile(&user.id).unwrap().name, "Disk Rider");
    assert_eq!(db.fetch_raw_samples(&activity_id).unwrap(), samples);

    let loaded = db.fetch_processed(&activity_id).unwrap();
    assert_eq!(loaded.series, processed.series);
    assert_eq!(loaded.curve, processed.curve);
    assert_eq!(loaded.laps, processed.laps);
    assert_eq!(loaded.summary.start_time, start());

    let meta = db.fetch_activity_meta(&activity_id).unwrap();
    assert_eq!(meta.perceived_effort, 7);
    assert!(meta.is_indoor);

    let entries = db
        .fetch_activity_summaries(&user.id, start() - Duration::hours(1), start() + Duration::hours(1))
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].meta, meta);
}

#[test]
fn test_processing_unknown_activity_fails() {
    let mut db = Database::open_in_memory().unwrap();
    let user = UserProfile::default();
    let processed = process_activity(&ride(60), &user).unwrap();

    let result = db.save_processed(&Uuid::new_v4(), &processed);
    assert!(matches!(result, Err(DatabaseError::NotFound(_))));
}
