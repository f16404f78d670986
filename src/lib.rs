//! # Image Mirror Library
//!
//! This library computes where else a container image may be pulled from,
//! given an `ImageContentSourcePolicy` (ICSP) or `ImageDigestMirrorSet` (IDMS)
//! file. It is used by the `imagemirror` command-line tool and is meant to be
//! embedded in registry clients that need mirror fallbacks.
//!
//! ## Quick Example
//!
//! ```
//! use imagemirror::mirrors::{resolve_alternates, SourcePlacement};
//! use imagemirror::policy::{MirrorRule, MirrorSourcePolicy};
//! use imagemirror::reference::DockerImageReference;
//!
//! let rules = vec![MirrorRule::new(
//!     "quay.io/ocp",
//!     &["mirror.example.com/ocp".to_string()],
//!     MirrorSourcePolicy::AllowContactingSource,
//! )
//! .unwrap()];
//!
//! let image = DockerImageReference::parse("quay.io/ocp/release:4.14").unwrap();
//! let alternates = resolve_alternates(&rules, &image, SourcePlacement::Last).unwrap();
//!
//! let alternates: Vec<String> = alternates.iter().map(|r| r.exact()).collect();
//! assert_eq!(alternates, ["mirror.example.com/ocp/release", "quay.io/ocp/release"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **References (`reference`)**: parsing and formatting of image locators.
//! - **Policies (`policy`)**: the ICSP and IDMS documents and their decoding
//!   from YAML or JSON files.
//! - **Matching (`mirrors`)**: the prefix-based rule matching that turns rules
//!   and an image into an ordered, de-duplicated list of alternates.
//! - **Strategies (`strategy`)**: when to resolve (before the first request or
//!   after a failure), backed by a per-strategy cache (`cache`) and a pluggable
//!   policy loader (`reader`).

pub mod cache;
pub mod error;
pub mod mirrors;
pub mod output;
pub mod policy;
pub mod reader;
pub mod reference;
pub mod strategy;

#[cfg(test)]
mod reference_proptest;
