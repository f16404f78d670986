//! # Mirror Matching
//!
//! Given the rules from a policy file and a requested image, compute the
//! ordered list of repositories the image may be pulled from.
//!
//! A rule applies when its source equals the image repository or is a path
//! ancestor of it. Every mirror of an applying rule is listed with the part of
//! the repository below the source appended, so a rule
//! `quay.io/ocp -> mirror.local/ocp` maps `quay.io/ocp/release` to
//! `mirror.local/ocp/release`.
//!
//! The result is de-duplicated in discovery order. The image repository itself
//! appears exactly once, first or last according to [`SourcePlacement`],
//! unless an applying rule says `NeverContactSource`. When no rule applies the
//! result is empty.

use std::collections::HashSet;

use log::trace;

use crate::error::Result;
use crate::policy::{MirrorRule, MirrorSourcePolicy};
use crate::reference::{is_subrepo, DockerImageReference};

/// Where the original repository goes in a list of alternates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePlacement {
    /// Try the original repository before any mirror.
    First,
    /// Try every mirror before the original repository.
    Last,
}

/// Resolve the alternates of `image` against `rules`.
pub fn resolve_alternates(
    rules: &[MirrorRule],
    image: &DockerImageReference,
    placement: SourcePlacement,
) -> Result<Vec<DockerImageReference>> {
    let source = image.as_repository();
    let repo = source.exact();

    let mut matched = false;
    let mut contact_source = true;
    let mut mirrors = Vec::new();

    for rule in rules {
        let rule_source = rule.source.as_str();
        if !is_subrepo(&repo, rule_source) {
            continue;
        }
        trace!("Rule for {} matches {}", rule_source, repo);
        matched = true;
        if rule.source_policy == MirrorSourcePolicy::NeverContactSource {
            contact_source = false;
        }

        let suffix = &repo[rule_source.len()..];
        for mirror in &rule.mirrors {
            let candidate = format!("{}{}", mirror, suffix);
            mirrors.push(DockerImageReference::parse(&candidate)?);
        }
    }

    if !matched || mirrors.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = HashSet::new();
    seen.insert(source.clone());
    let mut alternates: Vec<DockerImageReference> = mirrors
        .into_iter()
        .filter(|m| seen.insert(m.clone()))
        .collect();

    if contact_source {
        match placement {
            SourcePlacement::First => alternates.insert(0, source),
            SourcePlacement::Last => alternates.push(source),
        }
    }
    Ok(alternates)
}
