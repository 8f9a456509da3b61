use flock_config::FlockConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_credentials_and_server_overrides() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
credentials:
  username: "flockbot"
  password: "${FLOCK_TEST_PASSWORD}"
server:
  bind_addr: "127.0.0.1:9000"
"#;
    let p = write_yaml(&tmp, "flock.yaml", file_yaml);

    temp_env::with_var("FLOCK_TEST_PASSWORD", Some("sekrit"), || {
        let config = FlockConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config");

        assert_eq!(config.credentials.username, "flockbot");
        assert_eq!(config.credentials.password, "sekrit");
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        // Unset fields keep their defaults.
        assert_eq!(config.server.upstream, "https://api.twitter.com");
    });
}

#[test]
#[serial]
fn env_overlay_overrides_file_values() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "flock.yaml",
        r#"
credentials:
  username: "flockbot"
  password: "from-file"
server:
  bind_addr: "127.0.0.1:9000"
"#,
    );

    temp_env::with_vars(
        [
            ("FLOCK_SERVER__BIND_ADDR", Some("0.0.0.0:7777")),
            ("FLOCK_CREDENTIALS__PASSWORD", Some("from-env")),
        ],
        || {
            let config = FlockConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            // `FLOCK_` env vars win over the file.
            assert_eq!(config.server.bind_addr, "0.0.0.0:7777");
            assert_eq!(config.credentials.password, "from-env");
            assert_eq!(config.credentials.username, "flockbot");
        },
    );
}

#[test]
#[serial]
fn missing_file_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("does-not-exist.yaml");

    let err = FlockConfigLoader::new().with_file(&missing).load();
    assert!(err.is_err(), "absent credentials file must fail load");
}

#[test]
#[serial]
fn missing_password_is_a_load_error() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "flock.yaml",
        "credentials:\n  username: \"flockbot\"\n",
    );

    let err = FlockConfigLoader::new().with_file(&p).load();
    assert!(err.is_err(), "credentials without a password must fail load");
}
