//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_policy("icsp.yaml", policies::ICSP);
//!     fixture.command().args(["validate", "--icsp-file", "icsp.yaml"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::policies;
    pub use super::TestFixture;
}

/// Policy documents used across tests.
#[allow(dead_code)]
pub mod policies {
    /// ICSP with an exact-repository rule and a namespace-wide rule.
    pub const ICSP: &str = r#"
apiVersion: operator.openshift.io/v1alpha1
kind: ImageContentSourcePolicy
metadata:
  name: release-mirrors
spec:
  repositoryDigestMirrors:
  - source: quay.io/openshift-release-dev/ocp-release
    mirrors:
    - mirror.example.com/ocp/release
  - source: quay.io/openshift-release-dev
    mirrors:
    - mirror.example.com/ocp
    - backup.example.com:5000/ocp
"#;

    /// IDMS where the release repository must never be contacted.
    pub const IDMS: &str = r#"
apiVersion: config.openshift.io/v1
kind: ImageDigestMirrorSet
metadata:
  name: release-mirrors
spec:
  imageDigestMirrors:
  - source: quay.io/openshift-release-dev/ocp-release
    mirrors:
    - mirror.example.com/ocp/release
    mirrorSourcePolicy: NeverContactSource
  - source: registry.redhat.io/ubi9
    mirrors:
    - mirror.example.com/ubi9
"#;

    /// IDMS with two rules for one source that disagree on the source policy.
    pub const IDMS_CONFLICT: &str = r#"
apiVersion: config.openshift.io/v1
kind: ImageDigestMirrorSet
spec:
  imageDigestMirrors:
  - source: quay.io/openshift-release-dev/ocp-release
    mirrors: [mirror.example.com/a]
    mirrorSourcePolicy: NeverContactSource
  - source: quay.io/openshift-release-dev/ocp-release
    mirrors: [mirror.example.com/b]
    mirrorSourcePolicy: AllowContactingSource
"#;

    /// ICSP with a rule that lists no mirrors.
    pub const ICSP_NO_MIRRORS: &str = r#"
apiVersion: operator.openshift.io/v1alpha1
kind: ImageContentSourcePolicy
spec:
  repositoryDigestMirrors:
  - source: quay.io/openshift-release-dev/ocp-release
"#;

    /// A Kubernetes object that is not a mirror policy.
    pub const CONFIG_MAP: &str = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: unrelated
data:
  key: value
"#;

    /// Unclosed flow sequence.
    pub const INVALID_YAML: &str = "spec: [unclosed";
}

/// A temporary directory holding policy files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a policy file with the given name and content.
    pub fn with_policy(self, name: &str, content: &str) -> Self {
        self.temp_dir
            .child(name)
            .write_str(content)
            .expect("Failed to write policy file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path of a file inside the fixture.
    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// A command for the imagemirror binary running inside the fixture, with
    /// policy file environment variables and color cleared.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("imagemirror");
        cmd.current_dir(self.path())
            .env_remove("IMAGEMIRROR_ICSP_FILE")
            .env_remove("IMAGEMIRROR_IDMS_FILE")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
