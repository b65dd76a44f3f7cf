use super::*;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("config.yaml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_verbosity_from_count() {
    assert_eq!(VerbosityLevel::from_count(0), VerbosityLevel::Normal);
    assert_eq!(VerbosityLevel::from_count(1), VerbosityLevel::Verbose);
    assert_eq!(VerbosityLevel::from_count(2), VerbosityLevel::VeryVerbose);
    assert_eq!(VerbosityLevel::from_count(3), VerbosityLevel::Trace);
    assert_eq!(VerbosityLevel::from_count(9), VerbosityLevel::Trace);
}

#[test]
fn test_verbosity_log_filter() {
    assert_eq!(VerbosityLevel::Normal.log_filter(), "warn");
    assert_eq!(VerbosityLevel::Trace.log_filter(), "trace");
    assert!(VerbosityLevel::Verbose < VerbosityLevel::VeryVerbose);
}

#[test]
fn test_config_file_values_are_used() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "registry:\n  insecure_registries:\n    - registry.local:5000\nnetwork:\n  timeout: 12\noutput:\n  path: /srv/out/result.json\n",
    );
    let overrides = CliOverrides {
        config_path: Some(path),
        ..Default::default()
    };

    let ctx = AppContext::build(ColorChoice::Never, VerbosityLevel::Normal, &overrides).unwrap();

    assert_eq!(ctx.config.network.timeout, 12);
    assert_eq!(ctx.output_path(), Path::new("/srv/out/result.json"));
    assert!(ctx.config.is_insecure("registry.local:5000"));
}

#[test]
fn test_cli_flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "registry:\n  insecure_registries: [\"registry.local:5000\"]\nnetwork:\n  timeout: 12\n",
    );
    let overrides = CliOverrides {
        config_path: Some(path),
        output: Some(dir.path().join("result.json")),
        insecure_registries: vec![
            "registry.local:5000".to_string(),
            "localhost:5000".to_string(),
        ],
        timeout: Some(3),
    };

    let ctx = AppContext::build(ColorChoice::Never, VerbosityLevel::Normal, &overrides).unwrap();

    assert_eq!(ctx.config.network.timeout, 3);
    assert_eq!(ctx.output_path(), dir.path().join("result.json"));
    assert_eq!(
        ctx.config.registry.insecure_registries,
        vec!["registry.local:5000", "localhost:5000"]
    );
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let overrides = CliOverrides {
        config_path: Some(dir.path().join("absent.yaml")),
        ..Default::default()
    };

    let result = AppContext::build(ColorChoice::Auto, VerbosityLevel::Normal, &overrides);

    assert!(matches!(result, Err(libtailor::TailorError::Config { .. })));
}

#[test]
fn test_explicit_color_is_kept() {
    let dir = TempDir::new().unwrap();
    let overrides = CliOverrides {
        config_path: Some(write_config(&dir, "{}\n")),
        ..Default::default()
    };

    let ctx = AppContext::build(ColorChoice::Always, VerbosityLevel::Verbose, &overrides).unwrap();

    assert_eq!(ctx.color, ColorChoice::Always);
    assert_eq!(ctx.verbosity, VerbosityLevel::Verbose);
}

#[test]
fn test_default_config_path_is_yaml() {
    let path = default_config_path();
    assert!(path.ends_with("config.yaml"));
}
