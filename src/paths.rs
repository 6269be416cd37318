//! # Resource Paths
//!
//! Canonical resource names for Secret Manager.
//!
//! Every request built by this crate gets its resource name from here so the
//! format stays identical across the façade, the adapters and the tests:
//!
//! - `projects/{project}`
//! - `projects/{project}/secrets/{secret}`
//! - `projects/{project}/secrets/{secret}/versions/{version}`
//!
//! No character-set validation happens locally. A malformed name is rejected
//! by the backend with `NOT_FOUND` or `INVALID_ARGUMENT`.

use crate::constants::LATEST_VERSION;

/// Parent name used when creating or listing secrets
/// Returns: projects/{project}
pub fn project_name(project: &str) -> String {
    format!("projects/{project}")
}

/// Returns: projects/{project}/secrets/{secret}
pub fn secret_name(project: &str, secret: &str) -> String {
    format!("projects/{project}/secrets/{secret}")
}

/// Returns: projects/{project}/secrets/{secret}/versions/{version}
///
/// An empty `version` is replaced by `latest`.
pub fn version_name(project: &str, secret: &str, version: &str) -> String {
    let version = if version.is_empty() {
        LATEST_VERSION
    } else {
        version
    };
    format!("projects/{project}/secrets/{secret}/versions/{version}")
}

/// Components of a fully-qualified secret version name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionName {
    pub project: String,
    pub secret: String,
    pub version: String,
}

/// Split `projects/{project}/secrets/{secret}/versions/{version}` into its parts
///
/// Returns `None` when the name does not have exactly that shape.
pub fn parse_version_name(name: &str) -> Option<VersionName> {
    let mut segments = name.split('/');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (
            Some("projects"),
            Some(project),
            Some("secrets"),
            Some(secret),
            Some("versions"),
            Some(version),
            None,
        ) if !project.is_empty() && !secret.is_empty() && !version.is_empty() => {
            Some(VersionName {
                project: project.to_string(),
                secret: secret.to_string(),
                version: version.to_string(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_name() {
        assert_eq!(
            secret_name("my-project", "my-secret"),
            "projects/my-project/secrets/my-secret"
        );
    }

    #[test]
    fn test_version_name_explicit_version() {
        let cases = vec![("1", "1"), ("3", "3"), ("latest", "latest"), ("42", "42")];
        for (version, expected) in cases {
            assert_eq!(
                version_name("p", "s", version),
                format!("projects/p/secrets/s/versions/{expected}"),
                "version {version} should be kept as-is"
            );
        }
    }

    #[test]
    fn test_version_name_empty_version_defaults_to_latest() {
        assert_eq!(
            version_name("p", "s", ""),
            "projects/p/secrets/s/versions/latest"
        );
    }

    #[test]
    fn test_project_name() {
        assert_eq!(project_name("my-project"), "projects/my-project");
    }

    #[test]
    fn test_parse_version_name() {
        let parsed = parse_version_name("projects/p/secrets/my-secret/versions/7")
            .expect("valid version name");
        assert_eq!(parsed.project, "p");
        assert_eq!(parsed.secret, "my-secret");
        assert_eq!(parsed.version, "7");

        let rebuilt = version_name(&parsed.project, &parsed.secret, &parsed.version);
        assert_eq!(rebuilt, "projects/p/secrets/my-secret/versions/7");
    }

    #[test]
    fn test_parse_version_name_rejects_other_shapes() {
        let invalid = vec![
            "",
            "projects/p",
            "projects/p/secrets/s",
            "projects/p/secrets/s/versions",
            "projects/p/secrets/s/versions/",
            "projects/p/secrets/s/versions/1/extra",
            "folders/p/secrets/s/versions/1",
        ];
        for name in invalid {
            assert!(
                parse_version_name(name).is_none(),
                "'{name}' should not parse as a version name"
            );
        }
    }
}
