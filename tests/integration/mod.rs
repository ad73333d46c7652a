//! Integration test modules.

mod config_test;
mod history_test;
mod pipeline_test;
mod storage_test;
