//! # Policy Readers
//!
//! Strategies load their rules through the [`PolicyReader`] trait rather than
//! touching the filesystem directly. `FilePolicyReader` is the real
//! implementation; tests substitute readers that count calls or serve
//! documents from memory.

use std::path::Path;

use crate::error::Result;
use crate::policy::{
    self, rules_from_documents, ImageContentSourcePolicy, ImageDigestMirrorSet, MirrorRule,
    PolicyKind,
};

/// Trait for loading policy documents - allows mocking in tests
pub trait PolicyReader: Send + Sync {
    /// Read every `ImageContentSourcePolicy` from `path`.
    fn read_icsps(&self, path: &Path) -> Result<Vec<ImageContentSourcePolicy>>;

    /// Read every `ImageDigestMirrorSet` from `path`.
    fn read_idms(&self, path: &Path) -> Result<Vec<ImageDigestMirrorSet>>;

    /// Read `path` as a policy file of `kind` and lower it into rules.
    fn read_rules(&self, kind: PolicyKind, path: &Path) -> Result<Vec<MirrorRule>> {
        match kind {
            PolicyKind::Icsp => rules_from_documents(&self.read_icsps(path)?),
            PolicyKind::Idms => rules_from_documents(&self.read_idms(path)?),
        }
    }
}

/// Reads policy documents from the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilePolicyReader;

impl PolicyReader for FilePolicyReader {
    fn read_icsps(&self, path: &Path) -> Result<Vec<ImageContentSourcePolicy>> {
        policy::read_icsps_from_file(path)
    }

    fn read_idms(&self, path: &Path) -> Result<Vec<ImageDigestMirrorSet>> {
        policy::read_idms_from_file(path)
    }
}
