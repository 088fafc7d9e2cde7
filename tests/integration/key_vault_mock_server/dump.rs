//! End-to-end dump scenarios against the mock Key Vault

use super::mock::{MockBehaviour, MockKeyVault, MockSecret};
use axum::http::StatusCode;
use keyvault_dump::config::{DuplicatePolicy, VaultLocation};
use keyvault_dump::{run, DumpError, DumperConfig, RunSummary};

async fn dump(mock: &MockKeyVault) -> (Result<RunSummary, DumpError>, String) {
    dump_with(mock.config()).await
}

async fn dump_with(config: DumperConfig) -> (Result<RunSummary, DumpError>, String) {
    let mut out = Vec::new();
    let result = run(&config, &mut out).await;
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_dump_prints_enabled_secrets_only() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![vec![
            MockSecret::enabled("db-pass", "s3cr3t"),
            MockSecret::disabled("api-key", "should-not-appear"),
        ]],
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump(&mock).await;
    let summary = result.unwrap();

    assert_eq!(output, "db-pass: s3cr3t\n");
    assert_eq!(summary.listed, 2);
    assert_eq!(summary.disabled, 1);
    assert_eq!(mock.fetched(), vec!["db-pass".to_string()]);
}

#[tokio::test]
async fn test_dump_follows_next_links_and_reuses_token() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![
            vec![MockSecret::enabled("alpha", "1"), MockSecret::enabled("beta", "2")],
            vec![],
            vec![MockSecret::enabled("gamma", "3")],
        ],
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump(&mock).await;
    let summary = result.unwrap();

    assert_eq!(output, "alpha: 1\nbeta: 2\ngamma: 3\n");
    assert_eq!(summary.emitted, 3);
    assert_eq!(mock.list_requests(), 3);
    assert_eq!(mock.get_requests(), 3);
    assert_eq!(mock.token_requests(), 1);
}

#[tokio::test]
async fn test_secret_deleted_after_listing_is_skipped() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![vec![MockSecret::enabled("x", "gone")]],
        deleted: ["x".to_string()].into(),
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump(&mock).await;
    let summary = result.unwrap();

    assert!(output.is_empty());
    assert_eq!(summary.skipped, 1);
}

#[tokio::test]
async fn test_failing_secret_does_not_abort_the_run() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![vec![
            MockSecret::enabled("a", "1"),
            MockSecret::enabled("b", "2"),
            MockSecret::enabled("c", "3"),
        ]],
        fetch_status: [("b".to_string(), StatusCode::INTERNAL_SERVER_ERROR)].into(),
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump(&mock).await;
    result.unwrap();

    assert_eq!(output, "a: 1\nc: 3\n");
}

#[tokio::test]
async fn test_concurrent_fetch_prints_in_listing_order() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![
            vec![MockSecret::enabled("one", "1"), MockSecret::enabled("two", "2")],
            vec![MockSecret::enabled("three", "3"), MockSecret::enabled("four", "4")],
        ],
        ..MockBehaviour::default()
    })
    .await;
    let mut config = mock.config();
    config.fetch_concurrency = 4;

    let (result, output) = dump_with(config).await;
    result.unwrap();

    assert_eq!(output, "one: 1\ntwo: 2\nthree: 3\nfour: 4\n");
}

#[tokio::test]
async fn test_invalid_client_secret_is_authentication_failure() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![vec![MockSecret::enabled("db-pass", "s3cr3t")]],
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump_with(mock.config_with_secret("wrong")).await;

    let err = result.unwrap_err();
    assert!(matches!(err, DumpError::Authentication { .. }), "{err:?}");
    assert!(err.to_string().contains("invalid_client"));
    assert_eq!(err.exit_code(), 3);
    assert!(output.is_empty());
    assert_eq!(mock.list_requests(), 0);
    assert_eq!(mock.get_requests(), 0);
}

#[tokio::test]
async fn test_forbidden_listing_is_authorization_failure() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![vec![MockSecret::enabled("db-pass", "s3cr3t")]],
        list_status: Some(StatusCode::FORBIDDEN),
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump(&mock).await;

    let err = result.unwrap_err();
    assert!(matches!(err, DumpError::Authorization { .. }), "{err:?}");
    assert_eq!(err.exit_code(), 4);
    assert!(output.is_empty());
    assert_eq!(mock.get_requests(), 0);
}

#[tokio::test]
async fn test_unavailable_vault_is_fatal() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![vec![MockSecret::enabled("db-pass", "s3cr3t")]],
        list_status: Some(StatusCode::SERVICE_UNAVAILABLE),
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump(&mock).await;

    let err = result.unwrap_err();
    assert!(matches!(err, DumpError::StoreUnavailable { .. }), "{err:?}");
    assert_eq!(err.exit_code(), 5);
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_next_link_to_another_host_is_rejected() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![
            vec![MockSecret::enabled("a", "1")],
            vec![MockSecret::enabled("b", "2")],
        ],
        foreign_next_link: true,
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump(&mock).await;

    assert!(matches!(result, Err(DumpError::StoreUnavailable { .. })));
    assert!(output.is_empty());
    assert_eq!(mock.list_requests(), 1);
    assert_eq!(mock.get_requests(), 0);
}

#[tokio::test]
async fn test_unauthorized_fetch_fails_the_run() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![vec![
            MockSecret::enabled("a", "1"),
            MockSecret::enabled("b", "2"),
        ]],
        fetch_status: [("b".to_string(), StatusCode::UNAUTHORIZED)].into(),
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump(&mock).await;

    let err = result.unwrap_err();
    assert!(matches!(err, DumpError::Authentication { .. }), "{err:?}");
    assert_eq!(err.exit_code(), 3);
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_forbidden_fetch_is_authorization_failure() {
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![vec![MockSecret::enabled("a", "1")]],
        fetch_status: [("a".to_string(), StatusCode::FORBIDDEN)].into(),
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump(&mock).await;

    assert!(matches!(result, Err(DumpError::Authorization { .. })));
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_unreachable_vault_is_store_unavailable() {
    let mock = MockKeyVault::start(MockBehaviour::default()).await;
    let mut config = mock.config();
    config.vault = VaultLocation::parse("http://127.0.0.1:1/").unwrap();

    let (result, _) = dump_with(config).await;

    assert!(matches!(result, Err(DumpError::StoreUnavailable { .. })));
}

#[tokio::test]
async fn test_duplicate_names_follow_policy() {
    let mut first = MockSecret::enabled("dup", "old");
    first.version = "v1".to_string();
    let mut second = MockSecret::enabled("dup", "new");
    second.version = "v2".to_string();
    let mock = MockKeyVault::start(MockBehaviour {
        pages: vec![vec![first], vec![second]],
        ..MockBehaviour::default()
    })
    .await;

    let (result, output) = dump(&mock).await;
    assert_eq!(output, "dup: new\n");
    assert_eq!(result.unwrap().duplicates, 1);

    let mut config = mock.config();
    config.duplicate_policy = DuplicatePolicy::Error;
    let (result, output) = dump_with(config).await;
    assert!(matches!(result, Err(DumpError::DuplicateSecretName { .. })));
    assert!(output.is_empty());
}
