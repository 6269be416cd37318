//! # Secret Manager Façade Tests
//!
//! Drives [`SecretManager`] against [`MockSecretClient`].
//!
//! These tests verify:
//! - Existence checks and the local `AlreadyExists` short-circuit on create
//! - Create-with-data, including cleanup after a failed first version
//! - Version naming (`latest` default) and byte-exact payloads
//! - Pass-through of enable, disable and destroy results
//! - Lazy pagination of list streams
//! - Close

use futures::{StreamExt, TryStreamExt};
use gcp_secret_manager::client::{MockClientFactory, MockSecretClient, Operation, SecretClient};
use gcp_secret_manager::error::{Error, StatusCode};
use gcp_secret_manager::model::{
    AccessSecretVersionResponse, ListSecretVersionsResponse, ListSecretsResponse, Replication,
    Secret, SecretPayload, SecretVersion, VersionState,
};
use gcp_secret_manager::{SecretManager, SecretManagerConfig};
use std::sync::{Arc, Mutex};

const PROJECT: &str = "p";

fn setup() -> (Arc<MockSecretClient>, SecretManager) {
    let mock = Arc::new(MockSecretClient::new());
    let manager = SecretManager::new(Arc::clone(&mock) as Arc<dyn SecretClient>, PROJECT);
    (mock, manager)
}

fn not_found() -> Error {
    Error::status(StatusCode::NotFound, "secret not found")
}

fn secret(name: &str) -> Secret {
    Secret {
        name: name.to_string(),
        ..Default::default()
    }
}

fn version(name: &str, state: VersionState) -> SecretVersion {
    SecretVersion {
        name: name.to_string(),
        state,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_secret_with_data_success() {
    let (mock, manager) = setup();
    mock.on_get_secret(|_| Err(not_found()))
        .on_create_secret(|req| {
            assert_eq!(req.parent, "projects/p");
            assert_eq!(req.secret_id, "my-secret");
            assert_eq!(req.secret.replication, Replication::Automatic);
            Ok(secret("projects/p/secrets/my-secret"))
        })
        .on_add_secret_version(|req| {
            assert_eq!(req.parent, "projects/p/secrets/my-secret");
            assert_eq!(req.payload.data, b"data");
            Ok(version(
                "projects/p/secrets/my-secret/versions/1",
                VersionState::Enabled,
            ))
        });

    let result = manager
        .create_secret_with_data("my-secret", b"data".to_vec())
        .await
        .expect("create with data should succeed");

    assert_eq!(result.name, "projects/p/secrets/my-secret/versions/1");
    assert_eq!(mock.calls(Operation::CreateSecret), 1);
    assert_eq!(mock.calls(Operation::AddSecretVersion), 1);
    assert_eq!(mock.calls(Operation::DeleteSecret), 0);
}

#[tokio::test]
async fn test_create_empty_secret_short_circuits_when_secret_exists() {
    let (mock, manager) = setup();
    mock.on_get_secret(|req| Ok(secret(&req.name)))
        .on_create_secret(|_| panic!("create must not be called for an existing secret"));

    let err = manager
        .create_empty_secret("my-secret")
        .await
        .expect_err("existing secret should be rejected locally");

    assert!(matches!(err, Error::AlreadyExists(ref name) if name == "my-secret"));
    assert!(err.is_already_exists());
    assert_eq!(mock.calls(Operation::CreateSecret), 0);
}

#[tokio::test]
async fn test_create_secret_with_data_short_circuits_when_secret_exists() {
    let (mock, manager) = setup();
    mock.on_get_secret(|req| Ok(secret(&req.name)))
        .on_create_secret(|_| panic!("create must not be called for an existing secret"))
        .on_add_secret_version(|_| panic!("add version must not be called"));

    let err = manager
        .create_secret_with_data("my-secret", "data")
        .await
        .expect_err("existing secret should be rejected locally");

    assert!(err.is_already_exists());
    assert_eq!(mock.calls(Operation::AddSecretVersion), 0);
}

#[tokio::test]
async fn test_create_empty_secret_passes_labels() {
    let (mock, manager) = setup();
    mock.on_get_secret(|_| Err(not_found()))
        .on_create_secret(|req| {
            assert_eq!(
                req.secret.labels.get("team").map(String::as_str),
                Some("payments")
            );
            Ok(Secret {
                name: format!("{}/secrets/{}", req.parent, req.secret_id),
                ..req.secret
            })
        });

    let labels = [("team".to_string(), "payments".to_string())].into();
    let created = manager
        .create_empty_secret_with_labels("labelled", labels)
        .await
        .expect("create should succeed");

    assert_eq!(created.name, "projects/p/secrets/labelled");
    assert_eq!(created.labels.len(), 1);
}

#[tokio::test]
async fn test_create_secret_with_data_deletes_secret_when_add_version_fails() {
    let (mock, manager) = setup();
    let deleted = Arc::new(Mutex::new(Vec::new()));
    let deleted_names = Arc::clone(&deleted);

    mock.on_get_secret(|_| Err(not_found()))
        .on_create_secret(|_| Ok(secret("projects/p/secrets/my-secret")))
        .on_add_secret_version(|_| {
            Err(Error::status(
                StatusCode::ResourceExhausted,
                "quota exceeded",
            ))
        })
        .on_delete_secret(move |req| {
            deleted_names
                .lock()
                .expect("lock poisoned")
                .push(req.name);
            Ok(())
        });

    let err = manager
        .create_secret_with_data("my-secret", "data")
        .await
        .expect_err("failed first version should fail the create");

    assert_eq!(err.code(), Some(StatusCode::ResourceExhausted));
    match err {
        Error::PartialCreate {
            secret,
            source,
            cleanup,
        } => {
            assert_eq!(secret, "projects/p/secrets/my-secret");
            assert_eq!(source.code(), Some(StatusCode::ResourceExhausted));
            assert!(cleanup.is_none(), "cleanup delete succeeded");
        }
        other => panic!("expected PartialCreate, got {other:?}"),
    }
    assert_eq!(mock.calls(Operation::DeleteSecret), 1);
    assert_eq!(
        *deleted.lock().expect("lock poisoned"),
        vec!["projects/p/secrets/my-secret".to_string()]
    );
}

#[tokio::test]
async fn test_create_secret_with_data_reports_failed_cleanup() {
    let (mock, manager) = setup();
    mock.on_get_secret(|_| Err(not_found()))
        .on_create_secret(|_| Ok(secret("projects/p/secrets/my-secret")))
        .on_add_secret_version(|_| Err(Error::Transport("connection reset".to_string())))
        .on_delete_secret(|_| Err(Error::status(StatusCode::PermissionDenied, "denied")));

    let err = manager
        .create_secret_with_data("my-secret", "data")
        .await
        .expect_err("failed first version should fail the create");

    let Error::PartialCreate {
        source, cleanup, ..
    } = err
    else {
        panic!("expected PartialCreate");
    };
    assert!(matches!(*source, Error::Transport(_)));
    let cleanup = cleanup.expect("cleanup error should be reported");
    assert_eq!(cleanup.code(), Some(StatusCode::PermissionDenied));
}

#[tokio::test]
async fn test_secret_exists_collapses_every_error_to_false() {
    let (mock, manager) = setup();

    let failures: [fn() -> Error; 4] = [
        not_found,
        || Error::status(StatusCode::PermissionDenied, "denied"),
        || Error::status(StatusCode::Unavailable, "unavailable"),
        || Error::Transport("broken pipe".to_string()),
    ];
    for failure in failures {
        mock.on_get_secret(move |_| Err(failure()));
        assert!(!manager.secret_exists("s").await, "{} reads as absent", failure());
        assert!(!manager.secret_exists("s").await, "repeated check is stable");
    }

    mock.on_get_secret(|req| {
        assert_eq!(req.name, "projects/p/secrets/s");
        Ok(secret(&req.name))
    });
    assert!(manager.secret_exists("s").await);
    assert!(manager.secret_exists("s").await);
}

#[tokio::test]
async fn test_get_secret_names_latest_for_empty_version() {
    let (mock, manager) = setup();
    let requested = Arc::new(Mutex::new(Vec::new()));
    let requested_names = Arc::clone(&requested);

    mock.on_access_secret_version(move |req| {
        requested_names
            .lock()
            .expect("lock poisoned")
            .push(req.name.clone());
        Ok(AccessSecretVersionResponse {
            name: req.name,
            payload: Some(SecretPayload::new("value")),
        })
    });

    manager.get_secret("s", "").await.expect("latest");
    manager.get_secret("s", "3").await.expect("version 3");

    assert_eq!(
        *requested.lock().expect("lock poisoned"),
        vec![
            "projects/p/secrets/s/versions/latest".to_string(),
            "projects/p/secrets/s/versions/3".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_get_secret_returns_payload_bytes_exactly() {
    let (mock, manager) = setup();
    let stored: Vec<u8> = vec![0x00, 0xff, 0x10, b'\n', 0xc3, 0x28, 0x00];
    let response_bytes = stored.clone();

    mock.on_access_secret_version(move |req| {
        Ok(AccessSecretVersionResponse {
            name: req.name,
            payload: Some(SecretPayload::new(response_bytes.clone())),
        })
    });

    let payload = manager.get_secret("binary", "1").await.expect("payload");
    assert_eq!(payload.data, stored);
}

#[tokio::test]
async fn test_get_secret_passes_backend_error_through() {
    let (mock, manager) = setup();
    mock.on_access_secret_version(|_| {
        Err(Error::status(
            StatusCode::FailedPrecondition,
            "version is disabled",
        ))
    });

    let err = manager
        .get_secret("s", "2")
        .await
        .expect_err("backend error");
    assert_eq!(err.code(), Some(StatusCode::FailedPrecondition));
    assert!(err.to_string().contains("version is disabled"));
}

#[tokio::test]
async fn test_version_transitions_pass_results_through_unchanged() {
    let (mock, manager) = setup();
    let enabled = version("projects/p/secrets/s/versions/4", VersionState::Enabled);
    let disabled = version("projects/p/secrets/s/versions/4", VersionState::Disabled);
    let destroyed = SecretVersion {
        destroy_time: Some(chrono::Utc::now()),
        ..version("projects/p/secrets/s/versions/4", VersionState::Destroyed)
    };

    let (e, d, x) = (enabled.clone(), disabled.clone(), destroyed.clone());
    mock.on_enable_secret_version(move |req| {
        assert_eq!(req.name, "projects/p/secrets/s/versions/4");
        Ok(e.clone())
    })
    .on_disable_secret_version(move |req| {
        assert_eq!(req.name, "projects/p/secrets/s/versions/4");
        Ok(d.clone())
    })
    .on_destroy_secret_version(move |req| {
        assert_eq!(req.name, "projects/p/secrets/s/versions/4");
        Ok(x.clone())
    });

    assert_eq!(manager.enable_secret("s", "4").await.expect("enable"), enabled);
    assert_eq!(manager.disable_secret("s", "4").await.expect("disable"), disabled);
    assert_eq!(
        manager.delete_secret_version("s", "4").await.expect("destroy"),
        destroyed
    );
}

#[tokio::test]
async fn test_destroy_twice_surfaces_failed_precondition() {
    let (mock, manager) = setup();
    mock.on_destroy_secret_version(|_| {
        Err(Error::status(
            StatusCode::FailedPrecondition,
            "version is already destroyed",
        ))
    });

    let err = manager
        .delete_secret_version("s", "1")
        .await
        .expect_err("second destroy fails");
    assert_eq!(err.code(), Some(StatusCode::FailedPrecondition));
}

#[tokio::test]
async fn test_get_secret_metadata_defaults_to_latest() {
    let (mock, manager) = setup();
    mock.on_get_secret_version(|req| Ok(version(&req.name, VersionState::Enabled)));

    let metadata = manager
        .get_secret_metadata("s", "")
        .await
        .expect("metadata");
    assert_eq!(metadata.name, "projects/p/secrets/s/versions/latest");
}

#[tokio::test]
async fn test_add_new_secret_version_and_delete_secret() {
    let (mock, manager) = setup();
    mock.on_add_secret_version(|req| {
        assert_eq!(req.parent, "projects/p/secrets/s");
        assert_eq!(req.payload.data, b"rotated");
        Ok(version(
            "projects/p/secrets/s/versions/2",
            VersionState::Enabled,
        ))
    })
    .on_delete_secret(|req| {
        assert_eq!(req.name, "projects/p/secrets/s");
        Ok(())
    });

    let added = manager
        .add_new_secret_version("s", "rotated")
        .await
        .expect("add version");
    assert_eq!(added.version_id().as_deref(), Some("2"));

    manager
        .delete_secret_and_versions("s")
        .await
        .expect("delete");
    assert_eq!(mock.calls(Operation::DeleteSecret), 1);
}

#[tokio::test]
async fn test_delete_missing_secret_is_not_found() {
    let (mock, manager) = setup();
    mock.on_delete_secret(|_| Err(not_found()));

    let err = manager
        .delete_secret_and_versions("gone")
        .await
        .expect_err("missing secret");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_secrets_walks_all_pages() {
    let (mock, manager) = setup();
    mock.on_list_secrets(|req| {
        let (names, next) = match req.page_token.as_str() {
            "" => (vec!["a", "b"], "t1"),
            "t1" => (vec![], "t2"),
            "t2" => (vec!["c"], ""),
            other => panic!("unexpected page token {other}"),
        };
        Ok(ListSecretsResponse {
            secrets: names
                .iter()
                .map(|n| secret(&format!("projects/p/secrets/{n}")))
                .collect(),
            next_page_token: next.to_string(),
            total_size: 3,
        })
    });

    let names: Vec<String> = manager
        .list_secrets()
        .map_ok(|s| s.name)
        .try_collect()
        .await
        .expect("list");

    assert_eq!(
        names,
        vec![
            "projects/p/secrets/a",
            "projects/p/secrets/b",
            "projects/p/secrets/c"
        ]
    );
    assert_eq!(mock.calls(Operation::ListSecrets), 3);
}

#[tokio::test]
async fn test_list_secret_versions_fetches_pages_on_demand() {
    let (mock, manager) = setup();
    mock.on_list_secret_versions(|req| {
        assert_eq!(req.parent, "projects/p/secrets/s");
        let n: u32 = if req.page_token.is_empty() {
            1
        } else {
            req.page_token.parse().expect("numeric token")
        };
        Ok(ListSecretVersionsResponse {
            versions: vec![version(
                &format!("projects/p/secrets/s/versions/{n}"),
                VersionState::Enabled,
            )],
            next_page_token: (n + 1).to_string(),
            total_size: 0,
        })
    });

    let stream = manager.list_secret_versions("s");
    assert_eq!(mock.calls(Operation::ListSecretVersions), 0);

    let first_two: Vec<SecretVersion> = stream
        .take(2)
        .try_collect()
        .await
        .expect("two versions");
    assert_eq!(first_two.len(), 2);
    assert_eq!(first_two[1].version_id().as_deref(), Some("2"));
    assert_eq!(mock.calls(Operation::ListSecretVersions), 2);
}

#[tokio::test]
async fn test_list_error_ends_stream() {
    let (mock, manager) = setup();
    mock.on_list_secrets(|_| Err(Error::status(StatusCode::PermissionDenied, "denied")));

    let results: Vec<_> = manager.list_secrets().collect().await;
    assert_eq!(results.len(), 1);
    let err = results
        .into_iter()
        .next()
        .expect("one item")
        .expect_err("error item");
    assert_eq!(err.code(), Some(StatusCode::PermissionDenied));
}

#[tokio::test]
async fn test_unconfigured_operation_is_not_implemented() {
    let (_mock, manager) = setup();

    let err = manager
        .get_secret_metadata("s", "1")
        .await
        .expect_err("no handler set");
    assert!(matches!(
        err,
        Error::NotImplemented(Operation::GetSecretVersion)
    ));
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (mock, manager) = setup();

    manager.close().await.expect("first close");
    manager.close().await.expect("second close");
    assert_eq!(mock.close_calls(), 2);
}

#[tokio::test]
async fn test_from_factory_uses_config_project_and_page_size() {
    let factory = MockClientFactory::default();
    factory.mock().on_list_secrets(|req| {
        assert_eq!(req.parent, "projects/from-config");
        assert_eq!(req.page_size, 7);
        Ok(ListSecretsResponse::default())
    });

    let mut config = SecretManagerConfig::new("from-config");
    config.list_page_size = 7;
    let manager = SecretManager::from_factory(&factory, &config)
        .await
        .expect("factory");

    assert_eq!(manager.project_id(), "from-config");
    let secrets: Vec<Secret> = manager.list_secrets().try_collect().await.expect("list");
    assert!(secrets.is_empty());
    assert_eq!(factory.mock().calls(Operation::ListSecrets), 1);
}

#[tokio::test]
async fn test_parallel_managers_have_independent_mocks() {
    let (first_mock, first) = setup();
    let (second_mock, second) = setup();
    first_mock.on_get_secret(|req| Ok(secret(&req.name)));
    second_mock.on_get_secret(|_| Err(not_found()));

    let (a, b) = tokio::join!(first.secret_exists("s"), second.secret_exists("s"));
    assert!(a);
    assert!(!b);
}
