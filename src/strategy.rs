//! # Alternate Source Strategies
//!
//! A registry client asks an [`AlternateStrategy`] where to look for an image,
//! once before its first request and again if that request fails. Three
//! strategies are provided:
//!
//! - **`ExplicitStrategy`**: resolves mirrors up front, from either an ICSP or
//!   an IDMS file, and fails when the image has none. Mirrors are tried before
//!   the original repository.
//! - **`OnErrorIcspStrategy`**: leaves the first request alone and only
//!   resolves ICSP mirrors after a failure. The original repository is retried
//!   first.
//! - **`OnErrorIdmsStrategy`**: as above but for IDMS files, where a rule may
//!   forbid contacting the original repository at all.
//!
//! Every strategy reads its policy file lazily through a [`PolicyReader`] and
//! memoizes the result per repository in an [`AlternatesCache`], so the file is
//! read at most once per repository for the lifetime of the strategy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::cache::AlternatesCache;
use crate::error::{Error, Result};
use crate::mirrors::{resolve_alternates, SourcePlacement};
use crate::policy::PolicyKind;
use crate::reader::{FilePolicyReader, PolicyReader};
use crate::reference::DockerImageReference;

/// Computes alternate repository locations for a requested image.
pub trait AlternateStrategy: Send + Sync {
    /// Locations to search before the first request.
    ///
    /// An empty list means the image should be requested as given.
    fn first_request(&self, image: &DockerImageReference) -> Result<Vec<DockerImageReference>>;

    /// Locations to retry after a request for the image failed.
    fn on_failure(&self, image: &DockerImageReference) -> Result<Vec<DockerImageReference>>;
}

/// Shared state behind every strategy: where the rules live and what has
/// already been resolved.
struct Resolver {
    kind: PolicyKind,
    path: PathBuf,
    reader: Arc<dyn PolicyReader>,
    placement: SourcePlacement,
    cache: AlternatesCache,
}

impl Resolver {
    fn new(
        kind: PolicyKind,
        path: PathBuf,
        reader: Arc<dyn PolicyReader>,
        placement: SourcePlacement,
    ) -> Self {
        Self {
            kind,
            path,
            reader,
            placement,
            cache: AlternatesCache::new(),
        }
    }

    fn alternates(
        &self,
        image: &DockerImageReference,
        require_alternates: bool,
    ) -> Result<Vec<DockerImageReference>> {
        let key = image.as_repository();
        self.cache
            .get_or_resolve(&key, || {
                if self.path.as_os_str().is_empty() {
                    return Err(Error::PolicyFileMissing { path: None });
                }
                debug!(
                    "Resolving alternates for {} from {} file {}",
                    image,
                    self.kind.kind_name(),
                    self.path.display()
                );
                let rules = self.reader.read_rules(self.kind, &self.path)?;
                let alternates = resolve_alternates(&rules, image, self.placement)?;
                if require_alternates && alternates.is_empty() {
                    return Err(Error::NoAlternates {
                        image: image.to_string(),
                    });
                }
                Ok(alternates)
            })
            .map_err(|e| e.for_image(image))
    }
}

/// Resolves mirrors before the first request and requires at least one.
pub struct ExplicitStrategy {
    resolver: Resolver,
}

impl ExplicitStrategy {
    /// Create an explicit strategy over a policy file of `kind`.
    pub fn new(kind: PolicyKind, path: impl Into<PathBuf>) -> Self {
        Self::with_reader(kind, path, Arc::new(FilePolicyReader))
    }

    /// Create an explicit strategy over an `ImageContentSourcePolicy` file.
    pub fn icsp(path: impl Into<PathBuf>) -> Self {
        Self::new(PolicyKind::Icsp, path)
    }

    /// Create an explicit strategy over an `ImageDigestMirrorSet` file.
    pub fn idms(path: impl Into<PathBuf>) -> Self {
        Self::new(PolicyKind::Idms, path)
    }

    /// Create an explicit strategy with custom policy loading.
    ///
    /// This is primarily used for testing to inject mock readers.
    pub fn with_reader(
        kind: PolicyKind,
        path: impl Into<PathBuf>,
        reader: Arc<dyn PolicyReader>,
    ) -> Self {
        Self {
            resolver: Resolver::new(kind, path.into(), reader, SourcePlacement::Last),
        }
    }

    /// The policy file this strategy reads.
    pub fn path(&self) -> &Path {
        &self.resolver.path
    }
}

impl AlternateStrategy for ExplicitStrategy {
    fn first_request(&self, image: &DockerImageReference) -> Result<Vec<DockerImageReference>> {
        self.resolver.alternates(image, true)
    }

    fn on_failure(&self, image: &DockerImageReference) -> Result<Vec<DockerImageReference>> {
        self.resolver.alternates(image, true)
    }
}

/// Resolves ICSP mirrors only after a request has failed.
pub struct OnErrorIcspStrategy {
    resolver: Resolver,
}

impl OnErrorIcspStrategy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_reader(path, Arc::new(FilePolicyReader))
    }

    /// Create the strategy with custom policy loading.
    pub fn with_reader(path: impl Into<PathBuf>, reader: Arc<dyn PolicyReader>) -> Self {
        Self {
            resolver: Resolver::new(PolicyKind::Icsp, path.into(), reader, SourcePlacement::First),
        }
    }

    /// The policy file this strategy reads.
    pub fn path(&self) -> &Path {
        &self.resolver.path
    }
}

impl AlternateStrategy for OnErrorIcspStrategy {
    fn first_request(&self, _image: &DockerImageReference) -> Result<Vec<DockerImageReference>> {
        Ok(Vec::new())
    }

    fn on_failure(&self, image: &DockerImageReference) -> Result<Vec<DockerImageReference>> {
        self.resolver.alternates(image, false)
    }
}

/// Resolves IDMS mirrors only after a request has failed, honouring each
/// rule's `mirrorSourcePolicy`.
pub struct OnErrorIdmsStrategy {
    resolver: Resolver,
}

impl OnErrorIdmsStrategy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_reader(path, Arc::new(FilePolicyReader))
    }

    /// Create the strategy with custom policy loading.
    pub fn with_reader(path: impl Into<PathBuf>, reader: Arc<dyn PolicyReader>) -> Self {
        Self {
            resolver: Resolver::new(PolicyKind::Idms, path.into(), reader, SourcePlacement::First),
        }
    }

    /// The policy file this strategy reads.
    pub fn path(&self) -> &Path {
        &self.resolver.path
    }
}

impl AlternateStrategy for OnErrorIdmsStrategy {
    fn first_request(&self, _image: &DockerImageReference) -> Result<Vec<DockerImageReference>> {
        Ok(Vec::new())
    }

    fn on_failure(&self, image: &DockerImageReference) -> Result<Vec<DockerImageReference>> {
        self.resolver.alternates(image, false)
    }
}

/// When a strategy resolves mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyMode {
    /// Before the first request; an image without mirrors is an error.
    Explicit,
    /// Only after a failed request.
    OnError,
}

/// Build the strategy for a mode and policy file kind.
pub fn build_strategy(
    mode: StrategyMode,
    kind: PolicyKind,
    path: impl Into<PathBuf>,
) -> Box<dyn AlternateStrategy> {
    match (mode, kind) {
        (StrategyMode::Explicit, kind) => Box::new(ExplicitStrategy::new(kind, path)),
        (StrategyMode::OnError, PolicyKind::Icsp) => Box::new(OnErrorIcspStrategy::new(path)),
        (StrategyMode::OnError, PolicyKind::Idms) => Box::new(OnErrorIdmsStrategy::new(path)),
    }
}
