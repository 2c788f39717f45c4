// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Integration Test for the application main function.

use anyhow::Result;
use std::process::Command;

/// **Passing Test:** Logs the parsed arguments through the default logger.
#[test]
fn test_main_logs_arguments() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_mintboy"))
        .arg("tetris.gb")
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("[LOG STDOUT]["));
    assert!(stdout.contains("INFO ROM: tetris.gb"));
    assert!(stdout.contains("INFO Debug: false"));
    // Colored output: each line is wrapped in an INFO color and a reset
    assert!(stdout.contains("\x1B[36m"));
    assert!(stdout.contains("\x1B[0m"));
    Ok(())
}

/// **Passing Test:** Prints the effective configuration without logging.
#[test]
fn test_main_dump_config() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_mintboy"))
        .args(["--debug", "--dump-config"])
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let config = mintboy::config::Config::parse(&stdout)?;
    assert_eq!(config.loggers.len(), 1);
    assert_eq!(config.loggers[0].name, "mintboy");
    assert_eq!(
        config.loggers[0].level,
        Some(mintboy::logging::Level::Debug)
    );
    Ok(())
}

/// **Failing Test:** A ROM path is required.
#[test]
fn test_main_requires_rom() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_mintboy")).output()?;
    assert!(!output.status.success());
    Ok(())
}

/// **Failing Test:** A bad log configuration exits non-zero.
#[test]
fn test_main_rejects_bad_log_config() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("log.json5");
    std::fs::write(&path, r#"{ loggers: [ { name: "mintboy", time_format: "%Q" } ] }"#)?;

    let output = Command::new(env!("CARGO_BIN_EXE_mintboy"))
        .arg("--log-config")
        .arg(&path)
        .arg("tetris.gb")
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("invalid time_format"));
    Ok(())
}

/// **Failing Test:** Logging to an unknown logger flushes and exits with status 1.
#[test]
fn test_main_unknown_logger_fails_fast() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("mintboy.log");
    let config_path = dir.path().join("log.json5");
    std::fs::write(
        &config_path,
        format!(
            r#"{{ loggers: [ {{ name: "mintboy", sink: {{ file: {:?} }}, level: "INFO" }} ] }}"#,
            log_path.to_str().unwrap()
        ),
    )?;

    let output = Command::new(env!("CARGO_BIN_EXE_mintboy"))
        .arg("--log-config")
        .arg(&config_path)
        .args(["--echo-logger", "missing", "tetris.gb"])
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("invalid logger name: missing"));
    // Queued before the bad call, written by the shutdown on the way out
    let written = std::fs::read_to_string(&log_path)?;
    assert!(written.contains("INFO ROM: tetris.gb"));
    assert!(written.contains("INFO Debug: false"));
    Ok(())
}
