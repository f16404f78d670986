//! # Image References
//!
//! Parsing and formatting of container image locators such as
//! `quay.io/openshift-release-dev/ocp-release:4.14.0` or
//! `registry.example.com:5000/ocp/release@sha256:...`.
//!
//! A reference is split into five parts: `registry`, `namespace`, `name`,
//! `tag` and `id` (the digest). The split follows the usual registry rules:
//!
//! - The first path component is the registry only when there is more than
//!   one component and it contains a `.` or a `:`, or is `localhost`.
//! - With two remaining components they are `namespace/name`. With more, the
//!   first is the namespace and the rest is the name. With one, it is the name.
//!
//! No defaults are applied while parsing, so `busybox` stays `busybox`.
//! [`DockerImageReference::docker_client_defaults`] fills in `docker.io`,
//! `library` and `latest` the way the Docker client does.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Registry used by the Docker client when a reference names none.
pub const DOCKER_DEFAULT_REGISTRY: &str = "docker.io";
/// Namespace used for official images on the default registry.
pub const DOCKER_DEFAULT_NAMESPACE: &str = "library";
/// Tag used when a reference carries neither tag nor digest.
pub const DOCKER_DEFAULT_TAG: &str = "latest";

static PATH_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*$").unwrap());

static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])(?:\.(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]))*(?::[0-9]+)?$",
    )
    .unwrap()
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").unwrap());

static DIGEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9]*(?:[-_+.][A-Za-z][A-Za-z0-9]*)*:[0-9a-fA-F]{32,}$").unwrap()
});

/// A parsed container image locator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DockerImageReference {
    /// Registry host, with optional port. Empty when the reference names none.
    pub registry: String,
    /// First repository path component when the path has more than one.
    pub namespace: String,
    /// Remaining repository path.
    pub name: String,
    /// Tag, without the leading `:`.
    pub tag: String,
    /// Digest, without the leading `@`.
    pub id: String,
}

impl DockerImageReference {
    /// Parse an image reference string.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidReference {
            reference: input.to_string(),
            message: message.to_string(),
        };

        if input.is_empty() {
            return Err(invalid("reference is empty"));
        }

        let (remainder, id) = match input.split_once('@') {
            Some((name, digest)) => {
                if !DIGEST.is_match(digest) {
                    return Err(invalid("invalid digest format"));
                }
                (name, digest)
            }
            None => (input, ""),
        };

        // A tag separator is a ':' after the last '/', otherwise it is a port
        let last_slash = remainder.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (path, tag) = match remainder[last_slash..].rfind(':') {
            Some(colon) => {
                let split = last_slash + colon;
                (&remainder[..split], &remainder[split + 1..])
            }
            None => (remainder, ""),
        };
        if !tag.is_empty() && !TAG.is_match(tag) {
            return Err(invalid("invalid tag format"));
        }
        if remainder.len() > path.len() && tag.is_empty() {
            return Err(invalid("tag is empty"));
        }

        let mut components: Vec<&str> = path.split('/').collect();
        let mut registry = "";
        if components.len() > 1 {
            let first = components[0];
            if first.contains('.') || first.contains(':') || first == "localhost" {
                if !DOMAIN.is_match(first) {
                    return Err(invalid("invalid registry host"));
                }
                registry = first;
                components.remove(0);
            }
        }

        for component in &components {
            if component.is_empty() {
                return Err(invalid("repository path has an empty component"));
            }
            if component.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(invalid("repository name must be lowercase"));
            }
            if !PATH_COMPONENT.is_match(component) {
                return Err(invalid("invalid repository path component"));
            }
        }

        let (namespace, name) = match components.len() {
            1 => (String::new(), components[0].to_string()),
            _ => (components[0].to_string(), components[1..].join("/")),
        };

        Ok(Self {
            registry: registry.to_string(),
            namespace,
            name,
            tag: tag.to_string(),
            id: id.to_string(),
        })
    }

    /// The reference as written, built from its non-empty parts.
    pub fn exact(&self) -> String {
        let mut out = String::new();
        if !self.registry.is_empty() {
            out.push_str(&self.registry);
            out.push('/');
        }
        out.push_str(&self.repository_name());
        if !self.tag.is_empty() {
            out.push(':');
            out.push_str(&self.tag);
        }
        if !self.id.is_empty() {
            out.push('@');
            out.push_str(&self.id);
        }
        out
    }

    /// The repository path without registry, tag or digest.
    pub fn repository_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.namespace, self.name)
        }
    }

    /// A copy of this reference with tag and digest removed.
    pub fn as_repository(&self) -> Self {
        Self {
            tag: String::new(),
            id: String::new(),
            ..self.clone()
        }
    }

    /// Fill in the registry, namespace and tag the Docker client would assume.
    pub fn docker_client_defaults(&self) -> Self {
        let mut out = self.clone();
        if out.registry.is_empty() {
            out.registry = DOCKER_DEFAULT_REGISTRY.to_string();
        }
        if out.namespace.is_empty() && is_docker_hub(&out.registry) {
            out.namespace = DOCKER_DEFAULT_NAMESPACE.to_string();
        }
        if out.tag.is_empty() && out.id.is_empty() {
            out.tag = DOCKER_DEFAULT_TAG.to_string();
        }
        out
    }
}

fn is_docker_hub(registry: &str) -> bool {
    matches!(
        registry,
        "docker.io" | "index.docker.io" | "registry-1.docker.io"
    )
}

/// Check that `input` names a repository or a bare registry host, with no tag
/// or digest.
///
/// A single `host:port` component such as `mirror.local:5000` is a registry,
/// not a name with a tag.
pub fn check_repository(input: &str) -> Result<()> {
    if !input.contains('/') && input.contains(':') && DOMAIN.is_match(input) {
        return Ok(());
    }
    let reference = DockerImageReference::parse(input)?;
    if !reference.tag.is_empty() || !reference.id.is_empty() {
        return Err(Error::InvalidReference {
            reference: input.to_string(),
            message: "must be a repository, without tag or digest".to_string(),
        });
    }
    Ok(())
}

/// Whether `repo` equals `ancestor` or lives underneath it.
///
/// `quay.io/ocp/release` is a subrepo of `quay.io/ocp`, but
/// `quay.io/ocpfoo` is not.
pub fn is_subrepo(repo: &str, ancestor: &str) -> bool {
    if repo == ancestor {
        return true;
    }
    repo.len() > ancestor.len()
        && repo.starts_with(ancestor)
        && repo.as_bytes()[ancestor.len()] == b'/'
}

impl fmt::Display for DockerImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.exact())
    }
}

impl FromStr for DockerImageReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for DockerImageReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.exact())
    }
}
