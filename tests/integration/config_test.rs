//! Configuration file round trips.

use ridelab::activity::normalizer::FillMode;
use ridelab::metrics::analytics::pdc::NamedDuration;
use ridelab::storage::config::{load_config_from, save_config_to, AppConfig, ConfigError};
use tempfile::tempdir;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let config = load_config_from(&path).unwrap();
    assert_eq!(config.analysis.history_days, 42);
    assert_eq!(config.profile.ftp, 250);
    assert_eq!(config.database_path(), dir.path().join("ridelab.db"));
}

#[test]
fn test_config_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = AppConfig::default();
    config.analysis.history_days = 90;
    config.analysis.notable_duration = NamedDuration::FiveMinutes;
    config.profile.set("ftp", "275").unwrap();
    config.profile.set("fill_mode", "setzero").unwrap();
    save_config_to(&config, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.analysis.history_days, 90);
    assert_eq!(loaded.analysis.notable_duration, NamedDuration::FiveMinutes);
    assert_eq!(loaded.profile.ftp, 275);
    assert_eq!(loaded.profile.fill_mode, FillMode::SetZero);
}

#[test]
fn test_partial_file_fills_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[profile]\nftp = 310\n").unwrap();

    let config = load_config_from(&path).unwrap();
    assert_eq!(config.profile.ftp, 310);
    assert_eq!(config.profile.thr, 160);
    assert_eq!(config.analysis.history_days, 42);
}

#[test]
fn test_invalid_profile_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[profile]\nctl_days = 0.0\n").unwrap();

    assert!(matches!(load_config_from(&path), Err(ConfigError::ValidationError(_))));

    std::fs::write(&path, "[profile]\nfill_mode = \"interpolate\"\n").unwrap();
    assert!(matches!(load_config_from(&path), Err(ConfigError::ParseError(_))));
}
