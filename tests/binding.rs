//! Binding records through the public API, against an in-memory provider.

use std::time::Duration;

use envfig::app_error::{AppError, ErrorKind};
use envfig::{Config, Envfig, EnvfigError, MapEnv, Rules, compose, validate};

#[derive(Config, Debug, Default, PartialEq)]
struct App {
    #[config(mapstructure = "port")]
    port: u16,
    #[config(mapstructure = "service_name")]
    service_name: String,
    #[config(mapstructure = "interval_time_out")]
    interval_time_out: Duration,
    #[config(mapstructure = "required", validate = "required")]
    required: bool,
}

#[derive(Config, Debug, Default, PartialEq)]
struct Configuration {
    #[config(mapstructure = "host_dir", validate = "required")]
    host: String,
    #[config(mapstructure = "app", nested)]
    app: App,
}

#[derive(Config, Debug, Default)]
struct AdditionalConfig {
    #[config(mapstructure = "test_val")]
    test_val: i32,
}

#[derive(Config, Debug, Default)]
struct MissingTag {
    test: i32,
}

#[derive(Config, Debug, Default)]
struct Timeouts {
    #[config(env = "timeout")]
    timeout: Duration,
}

#[derive(Config, Debug, Default)]
struct Listener {
    #[config(env = "host", conform = "trim,default=127.0.0.1", validate = "ip")]
    host: String,
    #[config(env = "port", validate = "required,min=1024")]
    port: u16,
    #[config(env = "mode", conform = "lcase", validate = "oneof=http https")]
    mode: String,
}

fn testing_env() -> MapEnv {
    MapEnv::new()
        .with("HOST_DIR", "0.0.0.0")
        .with("APP_PORT", "8080")
        .with("APP_SERVICE_NAME", "service-name")
        .with("APP_INTERVAL_TIME_OUT", "30s")
        .with("APP_REQUIRED", "true")
}

#[test]
fn binds_every_tagged_field() {
    let cfg: Configuration = Envfig::builder()
        .provider(testing_env())
        .tag("mapstructure")
        .load()
        .unwrap();

    assert_eq!(
        cfg,
        Configuration {
            host: "0.0.0.0".into(),
            app: App {
                port: 8080,
                service_name: "service-name".into(),
                interval_time_out: Duration::from_secs(30),
                required: true,
            },
        }
    );
}

#[test]
fn uncoercible_value_is_an_error() {
    let err = Envfig::builder()
        .provider(MapEnv::new().with("TEST_VAL", "some"))
        .tag("mapstructure")
        .load::<AdditionalConfig>()
        .unwrap_err();

    match err {
        EnvfigError::InvalidValue { field, key, .. } => {
            assert_eq!(field, "test_val");
            assert_eq!(key, "TEST_VAL");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn duration_without_unit_is_an_invalid_value() {
    let err = Envfig::builder()
        .provider(MapEnv::new().with("TIMEOUT", "30"))
        .load::<Timeouts>()
        .unwrap_err();
    match err {
        EnvfigError::InvalidValue { key, reason, .. } => {
            assert_eq!(key, "TIMEOUT");
            assert!(reason.contains("missing unit"), "{reason}");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }

    let cfg: Timeouts = Envfig::builder()
        .provider(MapEnv::new().with("TIMEOUT", "30s"))
        .load()
        .unwrap();
    assert_eq!(cfg.timeout, Duration::from_secs(30));
}

#[test]
fn untagged_fields_are_left_alone() {
    let cfg: MissingTag = Envfig::builder()
        .provider(MapEnv::new().with("TEST", "123"))
        .tag("mapstructure")
        .load()
        .unwrap();
    assert_eq!(cfg.test, 0);
}

#[test]
fn default_tag_ignores_other_conventions() {
    let err = Envfig::builder()
        .provider(testing_env())
        .load::<Configuration>()
        .unwrap_err();

    // Nothing carries an `env` key, so nothing binds and the required
    // fields are reported without a variable name.
    let violations = err.violations().unwrap();
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().all(|v| v.key.is_none()));
}

#[test]
fn missing_required_values_are_all_reported() {
    let err = Envfig::builder()
        .provider(MapEnv::new())
        .tag("mapstructure")
        .load::<Configuration>()
        .unwrap_err();

    let violations = err.violations().unwrap();
    assert_eq!(violations.len(), 2);
    assert_eq!(violations.field("host").unwrap().key.as_deref(), Some("HOST_DIR"));
    assert_eq!(violations.field("app.required").unwrap().rule, "required");
}

#[test]
fn conform_runs_before_validation() {
    let cfg: Listener = Envfig::builder()
        .provider(MapEnv::new().with("PORT", "8443").with("MODE", "HTTPS"))
        .load()
        .unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.mode, "https");
}

#[test]
fn violations_collect_across_fields() {
    let env = MapEnv::new()
        .with("HOST", "not-an-ip")
        .with("PORT", "80")
        .with("MODE", "ftp");
    let err = Envfig::builder().provider(env).load::<Listener>().unwrap_err();

    let violations = err.violations().unwrap();
    let rules: Vec<_> = violations.iter().map(|v| v.rule.as_str()).collect();
    assert_eq!(rules, ["ip", "min", "oneof"]);
    assert_eq!(violations.field("port").unwrap().param.as_deref(), Some("1024"));

    let json: serde_json::Value = serde_json::from_str(&violations.to_json()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 3);
    assert_eq!(json[1]["key"], "PORT");
}

#[test]
fn each_field_reports_every_failing_rule() {
    let env = MapEnv::new().with("HOST", "").with("PORT", "").with("MODE", "http");
    let err = Envfig::builder().provider(env).load::<Listener>().unwrap_err();
    let violations = err.violations().unwrap();

    let port: Vec<_> = violations.field_all("port").map(|v| v.rule.as_str()).collect();
    assert_eq!(port, ["required", "min"]);
    assert!(violations.to_string().contains("port (PORT) [min]: must be at least 1024"));
}

#[test]
fn overrides_beat_the_provider() {
    let cfg: Listener = Envfig::builder()
        .provider(MapEnv::new().with("PORT", "8443").with("MODE", "http"))
        .set("port", "9443")
        .load()
        .unwrap();
    assert_eq!(cfg.port, 9443);
}

#[test]
fn compose_lists_env_names() {
    let names: Vec<String> = compose::<Configuration>("mapstructure")
        .unwrap()
        .iter()
        .map(|b| b.env_key())
        .collect();
    assert_eq!(
        names,
        [
            "HOST_DIR",
            "APP_PORT",
            "APP_SERVICE_NAME",
            "APP_INTERVAL_TIME_OUT",
            "APP_REQUIRED"
        ]
    );
}

#[test]
fn validate_alone_checks_a_built_record() {
    let record = Listener {
        host: "::1".into(),
        port: 2048,
        mode: "http".into(),
    };
    validate(&record, &Rules::default(), "env").unwrap();
}

#[test]
fn config_failures_map_to_invalid_argument() {
    let err = Envfig::builder()
        .provider(MapEnv::new())
        .tag("mapstructure")
        .load::<Configuration>()
        .unwrap_err();
    let app: AppError = err.into();
    assert_eq!(app.kind, ErrorKind::Invalid);
    assert_eq!(app.http_status(), 400);
    assert_eq!(app.rpc_code().code(), 3);
}
