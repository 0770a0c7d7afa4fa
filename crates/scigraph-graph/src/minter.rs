//! Deterministic identifier minting.
//!
//! `mint(namespace, name)` is a pure function of its inputs: whitespace runs
//! collapse to a single `_`, everything outside the unreserved set is
//! percent-encoded, and the result is appended to the namespace base.

use scigraph_core::vocab::ns;
use scigraph_core::{EntityKind, Iri};
use sha2::{Digest, Sha256};

/// Hex characters of the SHA-256 digest kept in assessment keys.
const ASSESSMENT_KEY_HEX_LEN: usize = 16;

pub fn mint(namespace: &str, name: &str) -> Iri {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join("_");
    Iri::new(format!("{}{}", namespace, urlencoding::encode(&collapsed)))
}

/// Mint in the namespace owned by `kind`.
pub fn mint_entity(kind: EntityKind, name: &str) -> Iri {
    mint(kind.namespace(), name)
}

/// `https://doi.org/<doi>`; the DOI is kept verbatim apart from trimming.
pub fn doi_identifier(doi: &str) -> Iri {
    Iri::new(format!("{}{}", ns::DOI, doi.trim()))
}

/// Stable key for an assessment of `repository_url`.
///
/// Derived from SHA-256 so that re-ingesting the same assessment collides
/// predictably across processes. Treat it as a dedup key only.
pub fn assessment_key(repository_url: &str) -> String {
    let digest = Sha256::digest(repository_url.trim().as_bytes());
    let hex = format!("{:x}", digest);
    format!("assessment_{}", &hex[..ASSESSMENT_KEY_HEX_LEN])
}

pub fn assessment_identifier(repository_url: &str) -> Iri {
    mint(ns::ASSESSMENTS, &assessment_key(repository_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_is_idempotent() {
        let a = mint(ns::TOOLS, "Foo Bar");
        let b = mint(ns::TOOLS, "Foo Bar");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://tools.org/Foo_Bar");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(mint(ns::TOOLS, "Foo  Bar"), mint(ns::TOOLS, "Foo Bar"));
        assert_eq!(mint(ns::TOOLS, " Foo\t\nBar "), mint(ns::TOOLS, "Foo Bar"));
    }

    #[test]
    fn test_unsafe_characters_are_encoded() {
        let iri = mint(ns::DATASETS, "ImageNet/1k (v2)");
        assert_eq!(iri.as_str(), "https://datasets.org/ImageNet%2F1k_%28v2%29");
    }

    #[test]
    fn test_distinct_names_do_not_collide() {
        assert_ne!(mint(ns::TOOLS, "PyTorch"), mint(ns::TOOLS, "pytorch"));
        assert_ne!(mint(ns::TOOLS, "A B"), mint(ns::TOOLS, "A%20B"));
    }

    #[test]
    fn test_namespaces_separate_entities() {
        assert_ne!(
            mint_entity(EntityKind::Tool, "Alpha"),
            mint_entity(EntityKind::Dataset, "Alpha")
        );
    }

    #[test]
    fn test_assessment_key_is_stable() {
        let a = assessment_key("https://github.com/org/repo");
        let b = assessment_key("https://github.com/org/repo");
        assert_eq!(a, b);
        assert_eq!(a.len(), "assessment_".len() + ASSESSMENT_KEY_HEX_LEN);
        assert_ne!(a, assessment_key("https://github.com/org/other"));
    }
}
