//! Integration tests for the fishcast binary
//!
//! Every run points at a temporary config whose feeds are unreachable local
//! ports and whose catch log lives in a temp directory, so nothing touches the
//! network or the user's data directory.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

/// Writes a config file with local-only feeds and a temp catch log
fn create_test_config() -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let log_path = temp_dir.path().join("catch_log.json");
    let config_path = temp_dir.path().join("fishcast.toml");
    let toml = format!(
        r#"
[feeds]
weather_url = "http://127.0.0.1:9/weather.php"
tide_url = "http://127.0.0.1:9/tideTimes.php"
timeout_secs = 2

[storage]
log_path = "{}"
"#,
        log_path.display().to_string().replace('\\', "\\\\")
    );
    fs::write(&config_path, toml).expect("Failed to write config");
    (config_path, temp_dir)
}

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_fishcast"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute fishcast")
}

fn run_with_config(config: &PathBuf, args: &[&str]) -> std::process::Output {
    let config = config.to_string_lossy().to_string();
    let mut full: Vec<&str> = vec!["--config", &config];
    full.extend_from_slice(args);
    run_cli(&full)
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fishcast"), "Help should mention fishcast");
    assert!(stdout.contains("recommend"), "Help should list the recommend command");
    assert!(stdout.contains("history"), "Help should list the history command");
}

#[test]
fn test_missing_subcommand_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_districts_lists_bundled_tables() {
    let (config, _temp_dir) = create_test_config();
    let output = run_with_config(&config, &["districts"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("西貢: 西貢碼頭, 西灣"), "unexpected listing: {stdout}");
}

#[test]
fn test_invalid_date_prints_error_and_exits() {
    let (config, _temp_dir) = create_test_config();
    let args = [
        "recommend", "--user", "u", "--district", "西貢", "--spot", "西灣", "--date",
        "2024-13-01",
    ];
    let output = run_with_config(&config, &args);
    assert!(!output.status.success(), "Expected invalid date to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid date"), "Should explain the date error: {stderr}");
}

#[test]
fn test_unknown_district_is_rejected() {
    let (config, _temp_dir) = create_test_config();
    let output = run_with_config(
        &config,
        &["recommend", "--user", "u", "--district", "火星", "--spot", "西灣"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown district '火星'"), "stderr: {stderr}");
}

#[test]
fn test_recommend_degrades_when_feeds_unreachable() {
    let (config, _temp_dir) = create_test_config();
    let args = [
        "recommend", "--user", "u", "--district", "西貢", "--spot", "西灣", "--date",
        "2024-01-01",
    ];
    let output = run_with_config(&config, &args);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Weather data unavailable"), "stdout: {stdout}");
    assert!(stdout.contains("Tide data unavailable"), "stdout: {stdout}");
    assert!(stdout.contains("🌡️ Temperature data not found"));
    // 0 mm counts as dry, no tide means low, 2024-01-01 is first quarter
    assert!(stdout.contains("Score: 80"), "stdout: {stdout}");
}

#[test]
fn test_recommend_json_output() {
    let (config, _temp_dir) = create_test_config();
    let args = [
        "recommend", "--user", "u", "--district", "西貢", "--spot", "西灣", "--date",
        "2024-01-01", "--json",
    ];
    let output = run_with_config(&config, &args);
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["score"], 80);
    assert_eq!(value["advisory"], "favorable");
    assert_eq!(value["tide"]["station"], "大廟灣");
}

#[test]
fn test_log_then_history() {
    let (config, _temp_dir) = create_test_config();
    for notes in ["first", "second"] {
        let args = [
            "log", "--user", "u", "--spot", "西灣", "--species", "鯛, 石斑", "--qty", "2",
            "--notes", notes, "--date", "2024-01-01",
        ];
        let output = run_with_config(&config, &args);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(output.status.success(), "stderr: {stderr}");
    }

    let output = run_with_config(&config, &["history", "--user", "u", "--json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["date"], "2024-01-01");
    assert_eq!(records[0]["notes"], "second");
    assert_eq!(records[0]["qty"], 2);
}

#[test]
fn test_log_unknown_spot_fails() {
    let (config, _temp_dir) = create_test_config();
    let output = run_with_config(&config, &["log", "--user", "u", "--spot", "月球"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("月球"), "stderr: {stderr}");
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use fishcast::cli::{parse_date_arg, Cli, Command};

    #[test]
    fn test_cli_history_parses_user() {
        let cli = Cli::parse_from(["fishcast", "history", "--user", "amy"]);
        match cli.command {
            Command::History { user, json } => {
                assert_eq!(user, "amy");
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_recommend_requires_spot() {
        let result =
            Cli::try_parse_from(["fishcast", "recommend", "--user", "u", "--district", "西貢"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_date_arg_invalid_returns_error() {
        assert!(parse_date_arg("2024-02-30").is_err());
    }
}
