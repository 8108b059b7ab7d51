//! Unit tests for token configuration parsing.

use super::*;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;
use tempfile::TempDir;

struct KeyFile {
    _dir: TempDir,
    path: PathBuf,
}

impl KeyFile {
    fn new(len: usize) -> Self {
        let dir = TempDir::new().expect("temporary directory");
        let path = dir.path().join("signing_key");
        std::fs::write(&path, vec![b'k'; len]).expect("key file written");
        Self { _dir: dir, path }
    }

    fn path_str(&self) -> String {
        self.path
            .to_str()
            .expect("temporary path should be valid UTF-8")
            .to_owned()
    }
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn with_key(key: &KeyFile) -> HashMap<&'static str, String> {
    HashMap::from([(KEY_FILE_ENV, key.path_str())])
}

fn missing_key() -> HashMap<&'static str, String> {
    HashMap::from([(KEY_FILE_ENV, "/nonexistent/portfolio/signing_key".to_owned())])
}

#[rstest]
fn defaults_apply_when_only_the_key_is_set() {
    let key = KeyFile::new(SIGNING_KEY_MIN_LEN);
    let settings = token_settings_from_env(&mock_env(with_key(&key)), BuildMode::Release)
        .expect("settings");
    assert_eq!(settings.issuer, DEFAULT_ISSUER);
    assert_eq!(settings.lifetimes.access, TimeDelta::seconds(300));
    assert_eq!(settings.lifetimes.refresh, TimeDelta::seconds(86_400));
    assert_eq!(settings.reset_ttl, TimeDelta::seconds(3600));
    assert_eq!(settings.signing_key.len(), SIGNING_KEY_MIN_LEN);
}

#[rstest]
fn overrides_are_respected() {
    let key = KeyFile::new(64);
    let mut vars = with_key(&key);
    vars.insert(ISSUER_ENV, "portfolio-staging".to_owned());
    vars.insert(ACCESS_TTL_ENV, "60".to_owned());
    vars.insert(REFRESH_TTL_ENV, "3600".to_owned());
    vars.insert(RESET_TTL_ENV, "900".to_owned());

    let settings = token_settings_from_env(&mock_env(vars), BuildMode::Release).expect("settings");
    assert_eq!(settings.issuer, "portfolio-staging");
    assert_eq!(settings.lifetimes.access, TimeDelta::seconds(60));
    assert_eq!(settings.lifetimes.refresh, TimeDelta::seconds(3600));
    assert_eq!(settings.reset_ttl, TimeDelta::seconds(900));
}

#[rstest]
#[case(ACCESS_TTL_ENV, "0")]
#[case(REFRESH_TTL_ENV, "-5")]
#[case(RESET_TTL_ENV, "soon")]
fn non_positive_lifetimes_are_rejected(#[case] name: &'static str, #[case] value: &str) {
    let key = KeyFile::new(SIGNING_KEY_MIN_LEN);
    let mut vars = with_key(&key);
    vars.insert(name, value.to_owned());

    let err = token_settings_from_env(&mock_env(vars), BuildMode::Debug).expect_err("rejected");
    assert!(matches!(err, TokenConfigError::InvalidEnv { name: got, .. } if got == name));
}

#[rstest]
fn release_missing_key_is_rejected() {
    let err = token_settings_from_env(&mock_env(missing_key()), BuildMode::Release)
        .expect_err("missing key");
    assert!(matches!(err, TokenConfigError::KeyRead { .. }));
}

#[rstest]
fn release_short_key_is_rejected() {
    let key = KeyFile::new(16);
    let err = token_settings_from_env(&mock_env(with_key(&key)), BuildMode::Release)
        .expect_err("short key");
    assert!(matches!(
        err,
        TokenConfigError::KeyTooShort { length: 16, .. }
    ));
}

#[rstest]
fn debug_accepts_short_keys() {
    let key = KeyFile::new(16);
    let settings = token_settings_from_env(&mock_env(with_key(&key)), BuildMode::Debug)
        .expect("settings");
    assert_eq!(settings.signing_key.len(), 16);
}

#[rstest]
#[case(BuildMode::Debug, HashMap::new())]
#[case(BuildMode::Release, HashMap::from([(ALLOW_EPHEMERAL_ENV, "1".to_owned())]))]
fn missing_key_falls_back_to_an_ephemeral_one(
    #[case] mode: BuildMode,
    #[case] extra: HashMap<&'static str, String>,
) {
    let mut vars = missing_key();
    vars.extend(extra);
    let settings = token_settings_from_env(&mock_env(vars), mode).expect("settings");
    assert_eq!(settings.signing_key.len(), SIGNING_KEY_MIN_LEN * 2);
}

#[rstest]
fn release_rejects_unparseable_ephemeral_flag() {
    let mut vars = missing_key();
    vars.insert(ALLOW_EPHEMERAL_ENV, "maybe".to_owned());
    let err = token_settings_from_env(&mock_env(vars), BuildMode::Release).expect_err("invalid");
    assert!(matches!(
        err,
        TokenConfigError::InvalidEnv {
            name: ALLOW_EPHEMERAL_ENV,
            ..
        }
    ));
}

#[rstest]
fn debug_output_hides_the_key() {
    let key = KeyFile::new(SIGNING_KEY_MIN_LEN);
    let settings = token_settings_from_env(&mock_env(with_key(&key)), BuildMode::Release)
        .expect("settings");
    let rendered = format!("{settings:?}");
    assert!(rendered.contains("<redacted>"));
    assert!(!rendered.contains("kkkk"));
}
