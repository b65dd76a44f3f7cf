use super::*;

fn locator() -> RegistryLocator {
    RegistryLocator::new(DEFAULT_INDEX, vec!["localhost:5000".to_string()])
}

#[test]
fn test_resolve_single_segment_uses_index() {
    let (host, name) = locator().resolve("ubuntu").unwrap();
    assert_eq!(host, DEFAULT_INDEX);
    assert_eq!(name, "ubuntu");
}

#[test]
fn test_resolve_user_repository_uses_index() {
    let (host, name) = locator().resolve("samalba/hipache").unwrap();
    assert_eq!(host, DEFAULT_INDEX);
    assert_eq!(name, "samalba/hipache");
}

#[test]
fn test_resolve_registry_with_dot() {
    let (host, name) = locator().resolve("quay.io/coreos/etcd").unwrap();
    assert_eq!(host, "quay.io");
    assert_eq!(name, "coreos/etcd");
}

#[test]
fn test_resolve_registry_with_port() {
    let (host, name) = locator().resolve("localhost:5000/team/app").unwrap();
    assert_eq!(host, "localhost:5000");
    assert_eq!(name, "team/app");
}

#[test]
fn test_resolve_localhost_without_port() {
    let (host, name) = locator().resolve("localhost/app").unwrap();
    assert_eq!(host, "localhost");
    assert_eq!(name, "app");
}

#[test]
fn test_resolve_uses_configured_index() {
    let locator = RegistryLocator::new("https://index.internal/v1/", vec![]);
    let (host, _) = locator.resolve("busybox").unwrap();
    assert_eq!(host, "https://index.internal/v1/");
}

#[test]
fn test_resolve_rejects_empty_name() {
    let result = locator().resolve("  ");
    assert!(matches!(result, Err(TailorError::InvalidReference { .. })));
}

#[test]
fn test_resolve_rejects_scheme() {
    let result = locator().resolve("https://quay.io/coreos/etcd");
    assert!(matches!(result, Err(TailorError::InvalidReference { .. })));
}

#[test]
fn test_resolve_rejects_explicit_official_index() {
    let err = locator().resolve("index.docker.io/library/ubuntu").unwrap_err();
    assert!(err.to_string().contains("library/ubuntu"));
}

#[test]
fn test_resolve_rejects_uppercase() {
    let result = locator().resolve("Ubuntu");
    assert!(matches!(result, Err(TailorError::InvalidReference { .. })));
}

#[test]
fn test_resolve_rejects_short_namespace() {
    // Namespaces are 4 to 30 characters long.
    let result = locator().resolve("foo/bar");
    assert!(matches!(result, Err(TailorError::InvalidReference { .. })));
}

#[test]
fn test_resolve_rejects_nested_repository() {
    let result = locator().resolve("quay.io/team/app/extra");
    assert!(matches!(result, Err(TailorError::InvalidReference { .. })));
}

#[test]
fn test_resolve_rejects_illegal_characters() {
    let result = locator().resolve("team/app@sha256");
    assert!(matches!(result, Err(TailorError::InvalidReference { .. })));
}

#[test]
fn test_expand_bare_host_defaults_to_https() {
    let endpoint = locator().expand_and_verify("quay.io").unwrap();
    assert_eq!(endpoint.address().as_str(), "https://quay.io/v1/");
    assert!(endpoint.is_secure());
}

#[test]
fn test_expand_insecure_host_uses_http() {
    let endpoint = locator().expand_and_verify("localhost:5000").unwrap();
    assert_eq!(endpoint.address().as_str(), "http://localhost:5000/v1/");
    assert!(!endpoint.is_secure());
    assert_eq!(endpoint.authority(), "localhost:5000");
}

#[test]
fn test_expand_matches_insecure_host_ignoring_case() {
    let mut config = Config::default();
    config.registry.insecure_registries.push("Registry.LAN:5000".to_string());
    let locator = RegistryLocator::from_config(&config);

    let endpoint = locator.expand_and_verify("registry.lan:5000").unwrap();

    assert!(config.is_insecure("registry.lan:5000"));
    assert!(!endpoint.is_secure());
}

#[test]
fn test_expand_full_url_is_kept() {
    let endpoint = locator().expand_and_verify(DEFAULT_INDEX).unwrap();
    assert_eq!(endpoint.address().as_str(), DEFAULT_INDEX);
}

#[test]
fn test_expand_url_without_path_gets_api_path() {
    let endpoint = locator()
        .expand_and_verify("http://registry.lan:8080")
        .unwrap();
    assert_eq!(endpoint.address().as_str(), "http://registry.lan:8080/v1/");
}

#[test]
fn test_expand_rejects_empty_host() {
    let result = locator().expand_and_verify("");
    assert!(matches!(
        result,
        Err(TailorError::UnreachableRegistry { .. })
    ));
}

#[test]
fn test_expand_rejects_invalid_port() {
    let result = locator().expand_and_verify("registry.lan:99999");
    assert!(matches!(
        result,
        Err(TailorError::UnreachableRegistry { .. })
    ));
}

#[test]
fn test_expand_rejects_unknown_scheme() {
    let result = locator().expand_and_verify("ftp://registry.lan");
    assert!(matches!(
        result,
        Err(TailorError::UnreachableRegistry { .. })
    ));
}

#[test]
fn test_expand_rejects_host_with_path() {
    let result = locator().expand_and_verify("registry.lan/sub");
    assert!(matches!(
        result,
        Err(TailorError::UnreachableRegistry { .. })
    ));
}

#[test]
fn test_endpoint_join() {
    let endpoint = locator().expand_and_verify("quay.io").unwrap();
    let url = endpoint.join("repositories/coreos/etcd/tags").unwrap();
    assert_eq!(url.as_str(), "https://quay.io/v1/repositories/coreos/etcd/tags");
}

#[test]
fn test_endpoint_insecure_variant() {
    let endpoint = locator().expand_and_verify("quay.io").unwrap();
    let insecure = endpoint.insecure_variant().unwrap();

    assert_eq!(insecure.address().as_str(), "http://quay.io/v1/");
    assert!(!insecure.is_secure());
    assert!(insecure.insecure_variant().is_none());
}

#[test]
fn test_mirror_endpoint_follows_index_scheme() {
    let secure = RegistryEndpoint::for_mirror("registry-1.docker.io", true).unwrap();
    assert_eq!(secure.address().as_str(), "https://registry-1.docker.io/v1/");

    let plain = RegistryEndpoint::for_mirror("127.0.0.1:5001", false).unwrap();
    assert_eq!(plain.address().as_str(), "http://127.0.0.1:5001/v1/");
}
