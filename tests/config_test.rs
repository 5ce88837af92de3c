use std::fs;
use veobot::config::Settings;
use veobot::config::loader::{load_settings_from_yaml, parse_settings};
use veobot::runtime::policy::PollPolicy;

#[test]
fn test_load_partial_yaml_settings() {
    let yaml_content = r#"
service:
  base_url: "http://localhost:8080/api/ai/video/v2"
bot:
  trigger: "gen"
polling:
  max_attempts: 3
"#;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("veobot.yaml");
    fs::write(&file_path, yaml_content).expect("Failed to write temp file");

    let settings = load_settings_from_yaml(&file_path.to_string_lossy())
        .expect("Failed to load settings from YAML");

    assert_eq!(settings.service.base_url, "http://localhost:8080/api/ai/video/v2");
    assert_eq!(settings.service.request_timeout_ms, 30_000);
    assert_eq!(settings.bot.trigger, "gen");
    assert_eq!(settings.bot.min_prompt_chars, 10);
    assert_eq!(
        settings.polling,
        PollPolicy {
            max_attempts: 3,
            ..PollPolicy::default()
        }
    );

    temp_dir.close().expect("Failed to close temp dir");
}

#[test]
fn test_empty_document_means_defaults() {
    assert_eq!(parse_settings("").unwrap(), Settings::default());
    assert_eq!(parse_settings("  \n").unwrap(), Settings::default());
}

#[test]
fn test_invalid_settings_are_rejected() {
    let settings = parse_settings("polling:\n  max_attempts: 0\n").unwrap();
    assert!(settings.validate().is_err());
    assert!(parse_settings("service: [not, a, map]\n").is_err());
}

#[test]
fn test_override_fixes_blank_base_url_before_validation() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("veobot.yaml");
    fs::write(&file_path, "service:\n  base_url: \"\"\n").expect("Failed to write temp file");

    let mut settings = load_settings_from_yaml(&file_path.to_string_lossy())
        .expect("Loading alone does not validate");
    assert!(settings.validate().is_err());

    settings.service.base_url = "http://localhost:8080/api".to_string();
    settings.validate().expect("Override makes the settings valid");
}

#[test]
fn test_missing_file_reports_the_path() {
    let err = load_settings_from_yaml("/nonexistent/veobot.yaml").unwrap_err();
    assert!(format!("{:#}", err).contains("/nonexistent/veobot.yaml"));
}
