use super::*;

const IMAGE_ID: &str = "8dbd9e392a964056420e5d58ca5cc376ef18e2de93b5cc90e868a1bbc8318c1c";

fn sample_json() -> String {
    format!(
        r##"{{
    "id": "{IMAGE_ID}",
    "parent": "2103b00b3fdf1d26a86aded36ae73c1c425def0f779a5e69073b3b77377df348",
    "created": "2014-10-01T20:46:07.263351912Z",
    "container": "6d6c5a6c3e7f",
    "container_config": {{
        "Cmd": ["/bin/sh", "-c", "#(nop) CMD [/bin/bash]"],
        "Hostname": "6d6c5a6c3e7f"
    }},
    "docker_version": "1.2.0",
    "architecture": "amd64",
    "os": "linux",
    "Size": 0,
    "config": {{
        "Hostname": "6d6c5a6c3e7f",
        "Env": ["HOME=/", "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin"],
        "Cmd": ["/bin/bash"],
        "Entrypoint": null,
        "WorkingDir": "/app",
        "User": "",
        "ExposedPorts": {{"8080/tcp": {{}}}},
        "Volumes": null
    }}
}}"##
    )
}

#[test]
fn test_parse_full_record() {
    let image = ImageMetadata::from_json(sample_json().as_bytes()).unwrap();

    assert_eq!(image.id, IMAGE_ID);
    assert_eq!(image.architecture.as_deref(), Some("amd64"));
    assert_eq!(image.os.as_deref(), Some("linux"));
    assert_eq!(image.docker_version.as_deref(), Some("1.2.0"));
    assert_eq!(image.size, Some(0));
    assert!(image.created.is_some());

    assert_eq!(image.cmd(), Some(&["/bin/bash".to_string()][..]));
    assert_eq!(image.entrypoint(), None);
    assert_eq!(image.working_dir(), Some("/app"));
}

#[test]
fn test_unknown_config_fields_are_preserved() {
    let image = ImageMetadata::from_json(sample_json().as_bytes()).unwrap();
    let config = image.config.unwrap();

    assert_eq!(
        config.extra.get("Hostname"),
        Some(&Value::String("6d6c5a6c3e7f".to_string()))
    );
    assert!(config.extra.contains_key("Volumes"));
    assert!(config.exposed_ports.unwrap().contains_key("8080/tcp"));
}

#[test]
fn test_minimal_record() {
    let json = format!(r#"{{"id": "{IMAGE_ID}"}}"#);
    let image = ImageMetadata::from_json(json.as_bytes()).unwrap();

    assert!(image.config.is_none());
    assert_eq!(image.cmd(), None);
    assert_eq!(image.working_dir(), None);
}

#[test]
fn test_empty_working_dir_is_none() {
    let json = format!(r#"{{"id": "{IMAGE_ID}", "config": {{"WorkingDir": ""}}}}"#);
    let image = ImageMetadata::from_json(json.as_bytes()).unwrap();

    assert_eq!(image.working_dir(), None);
}

#[test]
fn test_invalid_json_is_malformed() {
    let result = ImageMetadata::from_json(b"<html>502 Bad Gateway</html>");
    assert!(matches!(
        result,
        Err(TailorError::MalformedMetadata { .. })
    ));
}

#[test]
fn test_missing_id_is_malformed() {
    let result = ImageMetadata::from_json(br#"{"config": {}}"#);
    assert!(matches!(
        result,
        Err(TailorError::MalformedMetadata { .. })
    ));
}

#[test]
fn test_non_hex_id_is_malformed() {
    let result = ImageMetadata::from_json(br#"{"id": "../../etc/passwd"}"#);
    assert!(matches!(
        result,
        Err(TailorError::MalformedMetadata { .. })
    ));
}

#[test]
fn test_serialize_keeps_wire_names() {
    let image = ImageMetadata::from_json(sample_json().as_bytes()).unwrap();
    let value = serde_json::to_value(&image).unwrap();

    assert_eq!(value["Size"], 0);
    assert_eq!(value["config"]["Cmd"][0], "/bin/bash");
    assert_eq!(value["config"]["WorkingDir"], "/app");
    assert!(value["config"].get("Entrypoint").is_none());
}
