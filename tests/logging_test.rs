// ABOUTME: Integration tests for logging configuration and environment handling
// ABOUTME: Checks defaults, production detail flags and format parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use form_coach::logging::{LogFormat, LoggingConfig, SERVICE_NAME};
use serial_test::serial;

#[test]
#[serial]
fn test_logging_config_from_env() {
    env::set_var("RUST_LOG", "debug");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("SERVICE_NAME", "form-coach-test");

    let config = LoggingConfig::from_env();

    assert_eq!(config.level, "debug");
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.environment, "production");
    assert_eq!(config.service_name, "form-coach-test");
    // Production turns on location, thread and span detail
    assert!(config.include_location);
    assert!(config.include_thread);
    assert!(config.include_spans);

    env::remove_var("RUST_LOG");
    env::remove_var("LOG_FORMAT");
    env::remove_var("ENVIRONMENT");
    env::remove_var("SERVICE_NAME");
}

#[test]
#[serial]
fn test_default_logging_config() {
    let config = LoggingConfig::default();

    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.environment, "development");
    assert_eq!(config.service_name, SERVICE_NAME);
    assert!(!config.include_location);
    assert!(!config.include_spans);
}

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_env_value(Some("json")), LogFormat::Json);
    assert_eq!(LogFormat::from_env_value(Some("compact")), LogFormat::Compact);
    assert_eq!(LogFormat::from_env_value(Some("xml")), LogFormat::Pretty);
    assert_eq!(LogFormat::from_env_value(None), LogFormat::Pretty);
}

#[test]
#[serial]
fn test_env_filter_covers_workspace_crates() {
    env::remove_var("RUST_LOG");
    let config = LoggingConfig {
        level: "debug".into(),
        ..LoggingConfig::default()
    };
    let filter = config.env_filter().to_string();

    assert!(filter.contains("form_coach=debug"));
    assert!(filter.contains("form_coach_intelligence=debug"));
}

#[test]
#[serial]
fn test_second_initialization_is_an_error() {
    env::remove_var("RUST_LOG");
    let config = LoggingConfig {
        format: LogFormat::Compact,
        ..LoggingConfig::default()
    };

    // The first call may lose to another installed subscriber; the second always fails
    let _ = config.init();
    assert!(config.init().is_err());
}
