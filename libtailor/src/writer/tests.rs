use super::*;
use serde::Serialize;
use std::collections::HashMap;
use tempfile::TempDir;

#[derive(Serialize)]
struct Payload {
    workdir: &'static str,
    cmd: Vec<&'static str>,
}

fn payload() -> Payload {
    Payload {
        workdir: "/app",
        cmd: vec!["/bin/sh", "-c", "echo \"hi\""],
    }
}

#[test]
fn test_save_writes_envelope_with_sorted_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("result.json");

    save_metadata(&path, &payload()).unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        concat!(
            r#"{"execution_metadata":"{\"cmd\":[\"/bin/sh\",\"-c\",\"echo \\\"hi\\\"\"],\"workdir\":\"/app\"}"}"#,
            "\n"
        )
    );
}

#[test]
fn test_load_returns_inner_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("result.json");

    save_metadata(&path, &payload()).unwrap();
    let inner = load_metadata(&path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&inner).unwrap();
    assert_eq!(value["workdir"], "/app");
    assert_eq!(value["cmd"][2], "echo \"hi\"");
}

#[test]
fn test_save_creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("result").join("nested").join("result.json");

    save_metadata(&path, &payload()).unwrap();

    assert!(path.is_file());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mode = fs::metadata(dir.path().join("result"))
            .unwrap()
            .permissions()
            .mode();
        // The process umask can only clear bits.
        assert_eq!(mode & 0o7022, 0);
        assert_eq!(mode & 0o700, 0o700);
    }
}

#[test]
fn test_save_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    let mut map = HashMap::new();
    for key in ["zeta", "alpha", "mu", "beta", "omega"] {
        map.insert(key, key.len());
    }

    save_metadata(&first, &map).unwrap();
    save_metadata(&second, &map).unwrap();

    let first = fs::read(&first).unwrap();
    let second = fs::read(&second).unwrap();
    assert_eq!(first, second);

    let inner = load_metadata(&dir.path().join("first.json")).unwrap();
    assert_eq!(
        inner,
        r#"{"alpha":5,"beta":4,"mu":2,"omega":5,"zeta":4}"#
    );
}

#[test]
fn test_save_replaces_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("result.json");
    fs::write(&path, "stale contents that are longer than the new record").unwrap();

    save_metadata(&path, &serde_json::json!({})).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{\"execution_metadata\":\"{}\"}\n"
    );
    // Only the result file is left behind.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_save_into_file_parent_fails_with_io() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let result = save_metadata(&blocker.join("result.json"), &payload());

    assert!(matches!(result, Err(crate::error::TailorError::Io(_))));
}

#[test]
fn test_load_rejects_non_envelope() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("result.json");
    fs::write(&path, r#"{"cmd": []}"#).unwrap();

    assert!(load_metadata(&path).is_err());
}
