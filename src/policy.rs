//! # Mirror Policy Documents
//!
//! This module defines the two Kubernetes API objects that describe image
//! mirrors, and the logic for decoding them from a policy file.
//!
//! ## Key Components
//!
//! - **`ImageContentSourcePolicy`** (`operator.openshift.io/v1alpha1`): a list
//!   of `repositoryDigestMirrors`, each mapping a `source` repository to its
//!   `mirrors`. The source may always be contacted.
//!
//! - **`ImageDigestMirrorSet`** (`config.openshift.io/v1`): a list of
//!   `imageDigestMirrors`, which add a `mirrorSourcePolicy` deciding whether
//!   the source may still be contacted.
//!
//! - **`MirrorRule`**: the validated form both documents lower to. Sources and
//!   mirrors are parsed as image references at this point, so a rule that
//!   reaches the matcher is known to be well formed. Both must name a
//!   repository or a registry; a tag or digest is rejected.
//!
//! ## File Format
//!
//! A policy file is YAML (JSON is accepted as a subset). It may hold a single
//! object, several `---` separated documents, or a `kind: List` wrapper whose
//! `items` are the objects. Every object must be of the expected kind.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reference::check_repository;

/// Object metadata. Only the name is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Whether a mirrored source may still be contacted directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MirrorSourcePolicy {
    /// Try the mirrors, then fall back to the source.
    #[default]
    AllowContactingSource,
    /// Only ever pull from the mirrors.
    NeverContactSource,
}

impl fmt::Display for MirrorSourcePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorSourcePolicy::AllowContactingSource => f.write_str("AllowContactingSource"),
            MirrorSourcePolicy::NeverContactSource => f.write_str("NeverContactSource"),
        }
    }
}

/// A single `repositoryDigestMirrors` entry of an ICSP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryDigestMirrors {
    /// Repository the image is requested from.
    pub source: String,
    /// Repositories that may hold the same content.
    #[serde(default)]
    pub mirrors: Vec<String>,
}

/// Spec of an `ImageContentSourcePolicy`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContentSourcePolicySpec {
    #[serde(default)]
    pub repository_digest_mirrors: Vec<RepositoryDigestMirrors>,
}

/// `operator.openshift.io/v1alpha1` `ImageContentSourcePolicy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContentSourcePolicy {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ImageContentSourcePolicySpec,
}

/// A single `imageDigestMirrors` entry of an IDMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDigestMirrors {
    /// Repository the image is requested from.
    pub source: String,
    /// Repositories that may hold the same content.
    #[serde(default)]
    pub mirrors: Vec<String>,
    /// Absent means `AllowContactingSource`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_source_policy: Option<MirrorSourcePolicy>,
}

/// Spec of an `ImageDigestMirrorSet`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDigestMirrorSetSpec {
    #[serde(default)]
    pub image_digest_mirrors: Vec<ImageDigestMirrors>,
}

/// `config.openshift.io/v1` `ImageDigestMirrorSet`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDigestMirrorSet {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ImageDigestMirrorSetSpec,
}

/// A validated mirror rule.
///
/// Sources and mirrors stay in the form they were written, since a mirror may
/// name just a registry (`mirror.local:5000`) that only becomes a full
/// repository once the matched suffix is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRule {
    /// Source repository prefix.
    pub source: String,
    /// Mirror repository prefixes, in the order they were listed.
    pub mirrors: Vec<String>,
    pub source_policy: MirrorSourcePolicy,
}

impl MirrorRule {
    /// Build a rule, checking the source and every mirror name a repository
    /// with no tag or digest.
    pub fn new(source: &str, mirrors: &[String], source_policy: MirrorSourcePolicy) -> Result<Self> {
        check_repository(source)?;
        for mirror in mirrors {
            check_repository(mirror)?;
        }
        if mirrors.is_empty() {
            warn!("Mirror rule for source {} lists no mirrors", source);
        }
        Ok(Self {
            source: source.to_string(),
            mirrors: mirrors.to_vec(),
            source_policy,
        })
    }
}

/// An API object that can appear in a policy file.
pub trait PolicyDocument: DeserializeOwned {
    /// Expected `apiVersion`.
    const API_VERSION: &'static str;
    /// Expected `kind`.
    const KIND: &'static str;

    /// Lower the document into validated rules.
    fn rules(&self) -> Result<Vec<MirrorRule>>;
}

impl PolicyDocument for ImageContentSourcePolicy {
    const API_VERSION: &'static str = "operator.openshift.io/v1alpha1";
    const KIND: &'static str = "ImageContentSourcePolicy";

    fn rules(&self) -> Result<Vec<MirrorRule>> {
        self.spec
            .repository_digest_mirrors
            .iter()
            .map(|rdm| {
                MirrorRule::new(
                    &rdm.source,
                    &rdm.mirrors,
                    MirrorSourcePolicy::AllowContactingSource,
                )
            })
            .collect()
    }
}

impl PolicyDocument for ImageDigestMirrorSet {
    const API_VERSION: &'static str = "config.openshift.io/v1";
    const KIND: &'static str = "ImageDigestMirrorSet";

    fn rules(&self) -> Result<Vec<MirrorRule>> {
        self.spec
            .image_digest_mirrors
            .iter()
            .map(|idm| {
                MirrorRule::new(
                    &idm.source,
                    &idm.mirrors,
                    idm.mirror_source_policy.unwrap_or_default(),
                )
            })
            .collect()
    }
}

/// The kinds of policy file this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Icsp,
    Idms,
}

impl PolicyKind {
    /// The `kind` name of the API object.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PolicyKind::Icsp => ImageContentSourcePolicy::KIND,
            PolicyKind::Idms => ImageDigestMirrorSet::KIND,
        }
    }
}

/// Lower documents into rules, checking source policies agree across them.
pub fn rules_from_documents<T: PolicyDocument>(documents: &[T]) -> Result<Vec<MirrorRule>> {
    let mut rules = Vec::new();
    for document in documents {
        rules.extend(document.rules()?);
    }
    check_source_policies(&rules)?;
    Ok(rules)
}

/// Fail if two rules for the same source disagree on `MirrorSourcePolicy`.
pub fn check_source_policies(rules: &[MirrorRule]) -> Result<()> {
    let mut seen: HashMap<String, MirrorSourcePolicy> = HashMap::new();
    for rule in rules {
        let source = rule.source.clone();
        match seen.get(&source) {
            Some(existing) if *existing != rule.source_policy => {
                return Err(Error::ConflictingSourcePolicy {
                    source_repo: source,
                    first: existing.to_string(),
                    second: rule.source_policy.to_string(),
                });
            }
            Some(_) => {}
            None => {
                seen.insert(source, rule.source_policy);
            }
        }
    }
    Ok(())
}

/// Read every `ImageContentSourcePolicy` from a policy file.
pub fn read_icsps_from_file(path: &Path) -> Result<Vec<ImageContentSourcePolicy>> {
    let data = read_policy_file(path)?;
    decode_documents(path, &data)
}

/// Read every `ImageDigestMirrorSet` from a policy file.
///
/// Fails when two rules for the same source carry different
/// `mirrorSourcePolicy` values.
pub fn read_idms_from_file(path: &Path) -> Result<Vec<ImageDigestMirrorSet>> {
    let data = read_policy_file(path)?;
    let documents: Vec<ImageDigestMirrorSet> = decode_documents(path, &data)?;
    rules_from_documents(&documents)?;
    Ok(documents)
}

fn read_policy_file(path: &Path) -> Result<String> {
    if path.as_os_str().is_empty() {
        return Err(Error::PolicyFileMissing { path: None });
    }
    if !path.exists() {
        return Err(Error::PolicyFileMissing {
            path: Some(path.to_path_buf()),
        });
    }
    debug!("Reading mirror policy from file {}", path.display());
    let data = fs::read_to_string(path).map_err(|source| Error::PolicyFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    if data.trim().is_empty() {
        return Err(Error::PolicyFileEmpty {
            path: path.to_path_buf(),
        });
    }
    Ok(data)
}

/// Decode all objects of type `T` from policy file content.
///
/// `path` is only used to give errors context.
pub fn decode_documents<T: PolicyDocument>(path: &Path, data: &str) -> Result<Vec<T>> {
    let decode_error = |message: String| Error::PolicyDecode {
        path: path.to_path_buf(),
        message,
    };

    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(data) {
        let value = serde_yaml::Value::deserialize(document).map_err(|e| decode_error(e.to_string()))?;
        if value.is_null() {
            continue;
        }
        collect_objects(path, value, &mut objects)?;
    }

    if objects.is_empty() {
        return Err(decode_error(format!("no {} objects found", T::KIND)));
    }
    debug!(
        "Decoded {} {} object(s) from {}",
        objects.len(),
        T::KIND,
        path.display()
    );
    Ok(objects)
}

fn collect_objects<T: PolicyDocument>(
    path: &Path,
    value: serde_yaml::Value,
    out: &mut Vec<T>,
) -> Result<()> {
    let kind = value
        .get("kind")
        .and_then(|k| k.as_str())
        .map(str::to_string);
    let api_version = value
        .get("apiVersion")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    if kind.as_deref() == Some("List") {
        let items = match value.get("items") {
            Some(serde_yaml::Value::Sequence(items)) => items.clone(),
            Some(serde_yaml::Value::Null) | None => Vec::new(),
            Some(_) => {
                return Err(Error::PolicyDecode {
                    path: path.to_path_buf(),
                    message: "List items must be a sequence".to_string(),
                })
            }
        };
        for item in items {
            collect_objects(path, item, out)?;
        }
        return Ok(());
    }

    let expected = format!("{}/{}", T::API_VERSION, T::KIND);
    match (kind.as_deref(), api_version.as_deref()) {
        (Some(k), Some(v)) if k == T::KIND && v == T::API_VERSION => {}
        (None, _) | (_, None) => {
            return Err(Error::PolicyDecode {
                path: path.to_path_buf(),
                message: "object is missing apiVersion or kind".to_string(),
            })
        }
        (Some(k), Some(v)) => {
            return Err(Error::UnexpectedKind {
                path: path.to_path_buf(),
                expected,
                found: format!("{}/{}", v, k),
            })
        }
    }

    let object = serde_yaml::from_value(value).map_err(|e| Error::PolicyDecode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    out.push(object);
    Ok(())
}
