//! Integration Tests: session configuration sources
//!
//! These tests verify:
//! 1. STARKLINK_* environment overrides
//! 2. JSON config files, including custom probes
//! 3. Invalid values surface as ConfigError

use once_cell::sync::Lazy;
use starklink::core::slots::env;
use starklink::{ConfigError, MemoryHost, Network, ScriptedProvider, SessionConfig, SessionController, TokioDelay};
use std::io::Write;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner())
}

fn clear_env() {
    for key in [env::NETWORK, env::RECHECK_MS, env::CONNECT_TIMEOUT_MS] {
        std::env::remove_var(key);
    }
}

/// Test: no variables means defaults
#[test]
fn env_defaults() {
    let _guard = lock_env();
    clear_env();

    let config = SessionConfig::from_env().expect("config");
    assert_eq!(config, SessionConfig::default());
}

/// Test: variables override network, re-check window and timeout
#[test]
fn env_overrides() {
    let _guard = lock_env();
    clear_env();
    std::env::set_var(env::NETWORK, "mainnet");
    std::env::set_var(env::RECHECK_MS, "250");
    std::env::set_var(env::CONNECT_TIMEOUT_MS, "5000");

    let config = SessionConfig::from_env().expect("config");
    assert_eq!(config.expected_network, Network::Mainnet);
    assert_eq!(config.recheck_delay(), Duration::from_millis(250));
    assert_eq!(config.connect_timeout(), Some(Duration::from_secs(5)));

    // Zero disables the timeout
    std::env::set_var(env::CONNECT_TIMEOUT_MS, "0");
    assert_eq!(SessionConfig::from_env().expect("config").connect_timeout(), None);

    clear_env();
}

/// Test: a raw chain id is accepted as the expected network
#[test]
fn env_chain_id_network() {
    let _guard = lock_env();
    clear_env();
    std::env::set_var(env::NETWORK, "0x534e5f4d41494e");

    let config = SessionConfig::from_env().expect("config");
    assert_eq!(config.expected_network, Network::Mainnet);

    clear_env();
}

/// Test: unparsable values are reported with their key
#[test]
fn env_invalid_value() {
    let _guard = lock_env();
    clear_env();
    std::env::set_var(env::RECHECK_MS, "soon");

    match SessionConfig::from_env() {
        Err(ConfigError::Invalid { key, value }) => {
            assert_eq!(key, env::RECHECK_MS);
            assert_eq!(value, "soon");
        }
        other => panic!("expected invalid config, got {:?}", other),
    }

    clear_env();
}

/// Test: config file with a custom probe drives detection
#[test]
fn file_config_with_custom_probe() {
    let mut file = NamedTempFile::new().expect("tempfile");
    write!(
        file,
        r#"{{
            "app": "dapp",
            "expected_network": "mainnet",
            "recheck_delay_ms": 100,
            "probes": [
                {{"slot": "starknet_argentX", "label": "Argent X", "rank": 0}},
                {{"slot": "starknet_keplr", "label": "Keplr", "rank": 1}}
            ]
        }}"#
    )
    .expect("write");

    let config = SessionConfig::load(file.path()).expect("load");
    assert_eq!(config.app, "dapp");
    assert_eq!(config.expected_network, Network::Mainnet);
    assert_eq!(config.recheck_delay_ms, 100);
    assert_eq!(config.probes.len(), 2);

    let host = Rc::new(MemoryHost::new());
    host.inject("starknet_keplr", Rc::new(ScriptedProvider::approving("keplr", "0x0123", "SN_MAIN")));
    let controller = SessionController::from_config(&config, host, Rc::new(TokioDelay));

    let connectors = controller.detect();
    assert_eq!(connectors.len(), 1);
    assert_eq!(connectors[0].display_name, "Keplr");
}

/// Test: a missing file is an Io error
#[test]
fn file_config_missing() {
    let dir = TempDir::new().expect("tempdir");
    let result = SessionConfig::load(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
