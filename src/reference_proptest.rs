//! Property-based tests for reference parsing and mirror matching.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::mirrors::{resolve_alternates, SourcePlacement};
    use crate::policy::{MirrorRule, MirrorSourcePolicy};
    use crate::reference::{is_subrepo, DockerImageReference};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn component() -> impl Strategy<Value = String> {
        "[a-z0-9]{1,8}"
    }

    fn registry() -> impl Strategy<Value = String> {
        ("[a-z]{1,8}", "[a-z]{2,3}").prop_map(|(host, tld)| format!("{}.{}", host, tld))
    }

    fn repository() -> impl Strategy<Value = String> {
        (registry(), prop::collection::vec(component(), 1..4))
            .prop_map(|(registry, path)| format!("{}/{}", registry, path.join("/")))
    }

    // ============================================================================
    // reference parsing properties
    // ============================================================================

    proptest! {
        /// Property: parsing then printing a repository gives back the input
        #[test]
        fn parse_exact_is_identity(repo in repository(), tag in proptest::option::of("[a-z0-9][a-z0-9.-]{0,10}")) {
            let input = match &tag {
                Some(t) => format!("{}:{}", repo, t),
                None => repo.clone(),
            };
            let parsed = DockerImageReference::parse(&input).unwrap();
            prop_assert_eq!(parsed.exact(), input);
            prop_assert_eq!(parsed.as_repository().exact(), repo);
        }

        /// Property: parsing never panics on arbitrary input
        #[test]
        fn parse_never_panics(input in ".*") {
            let _ = DockerImageReference::parse(&input);
        }

        /// Property: a rule source carrying a tag is rejected
        #[test]
        fn tagged_rule_source_rejected(repo in repository(), tag in "[a-z0-9][a-z0-9.-]{0,10}") {
            let source = format!("{}:{}", repo, tag);
            let result = MirrorRule::new(&source, &[repo.clone()], MirrorSourcePolicy::AllowContactingSource);
            prop_assert!(result.is_err());
        }

        /// Property: a repository is always a subrepo of its own parents
        #[test]
        fn repository_is_subrepo_of_parents(repo in repository()) {
            let parts: Vec<&str> = repo.split('/').collect();
            for i in 1..=parts.len() {
                let ancestor = parts[..i].join("/");
                prop_assert!(is_subrepo(&repo, &ancestor));
            }
        }
    }

    // ============================================================================
    // matching properties
    // ============================================================================

    proptest! {
        /// Property: alternates never contain duplicates and hold the source
        /// exactly once, at the requested end
        #[test]
        fn alternates_unique_with_source_once(
            repo in repository(),
            mirrors in prop::collection::vec(repository(), 1..6),
            first in any::<bool>(),
        ) {
            let rule = MirrorRule::new(&repo, &mirrors, MirrorSourcePolicy::AllowContactingSource).unwrap();
            let image = DockerImageReference::parse(&repo).unwrap();
            let placement = if first { SourcePlacement::First } else { SourcePlacement::Last };

            let alternates = resolve_alternates(&[rule.clone(), rule], &image, placement).unwrap();

            let unique: HashSet<_> = alternates.iter().collect();
            prop_assert_eq!(unique.len(), alternates.len());
            prop_assert_eq!(alternates.iter().filter(|a| **a == image).count(), 1);
            let position = if first { alternates.first() } else { alternates.last() };
            prop_assert_eq!(position, Some(&image));
        }

        /// Property: a parent rule maps every child repository onto each mirror
        /// with the child path appended
        #[test]
        fn parent_rule_appends_suffix(
            parent in repository(),
            child in prop::collection::vec(component(), 1..3),
            mirror in repository(),
        ) {
            let repo = format!("{}/{}", parent, child.join("/"));
            let rule = MirrorRule::new(&parent, &[mirror.clone()], MirrorSourcePolicy::NeverContactSource).unwrap();
            let image = DockerImageReference::parse(&repo).unwrap();

            let alternates = resolve_alternates(&[rule], &image, SourcePlacement::Last).unwrap();

            let expected = format!("{}/{}", mirror, child.join("/"));
            if expected == repo {
                prop_assert!(alternates.is_empty());
            } else {
                prop_assert_eq!(alternates.len(), 1);
                prop_assert_eq!(alternates[0].exact(), expected);
            }
        }
    }
}
