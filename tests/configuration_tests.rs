use gridlock::config::{ConfigError, RawOptions, ServerConfig};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_from_file() {
    let file = config_file(
        r#"
server_address = "0.0.0.0"
server_port = 9100
field_size = 10
win_length = 5
number_of_moves = 20
max_malformed = 1
move_timeout = 30
max_sessions = 4
"#,
    );

    let config = ServerConfig::load(Some(file.path()), RawOptions::new()).unwrap();
    assert_eq!(config.bind_addr().to_string(), "0.0.0.0:9100");
    assert_eq!((config.field_size, config.win_length), (10, 5));
    assert_eq!(config.number_of_moves, 20);
    assert_eq!(config.max_malformed, 1);
    assert_eq!(config.move_timeout, Duration::from_secs(30));
    assert_eq!(config.max_sessions, 4);
}

#[test]
fn test_command_line_overrides_file() {
    let file = config_file("server_port = 9100\nfield_size = 10\n");
    let overrides: RawOptions = [("server_port", "9200"), ("win_length", "4")]
        .into_iter()
        .collect();

    let config = ServerConfig::load(Some(file.path()), overrides).unwrap();
    assert_eq!(config.port, 9200);
    assert_eq!(config.field_size, 10);
    assert_eq!(config.win_length, 4);
}

#[test]
fn test_partial_file_uses_defaults() {
    let file = config_file("field_size = 4\n");
    let config = ServerConfig::load(Some(file.path()), RawOptions::new()).unwrap();
    assert_eq!(config.field_size, 4);
    assert_eq!(config.port, 8080);
    assert_eq!(config.win_length, 3);
    assert_eq!(config.number_of_moves, 16);
}

#[test]
fn test_unknown_key_in_file() {
    let file = config_file("field_size = 4\nships = 3\n");
    let err = ServerConfig::load(Some(file.path()), RawOptions::new()).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownOption { .. }));
    assert_eq!(err.option(), Some("ships"));
}

#[test]
fn test_out_of_range_values_name_the_option() {
    for (key, value) in [
        ("server_port", "0"),
        ("server_port", "70000"),
        ("field_size", "25"),
        ("move_timeout", "0"),
        ("max_sessions", "-2"),
        ("number_of_moves", "500"),
    ] {
        let file = config_file(&format!("{key} = {value}\n"));
        let err = ServerConfig::load(Some(file.path()), RawOptions::new()).unwrap_err();
        assert_eq!(err.option(), Some(key), "{key} = {value}");
    }
}

#[test]
fn test_bad_address_and_syntax() {
    let file = config_file("server_address = \"not-an-ip\"\n");
    assert!(matches!(
        ServerConfig::load(Some(file.path()), RawOptions::new()),
        Err(ConfigError::InvalidAddress { .. })
    ));

    let file = config_file("field_size = = 3\n");
    assert!(matches!(
        ServerConfig::load(Some(file.path()), RawOptions::new()),
        Err(ConfigError::Toml(_))
    ));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = ServerConfig::load(Some(&path), RawOptions::new()).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_saved_config_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("server.toml");

    let config = ServerConfig {
        port: 9300,
        field_size: 15,
        win_length: 5,
        max_sessions: 2,
        ..ServerConfig::default()
    };
    config.save(&path).unwrap();

    let loaded = ServerConfig::load(Some(&path), RawOptions::new()).unwrap();
    assert_eq!(loaded, config);
}
