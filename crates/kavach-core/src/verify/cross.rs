//! Cross-document identity verification.
//!
//! An exact match on normalized names is accepted outright. Otherwise a
//! word-overlap heuristic separates a partial match (middle names, OCR noise)
//! from a clear mismatch.

use crate::types::{CrossVerificationResult, DocumentResult, VerificationStatus};

use super::names::normalize_name;

/// Confidence when all names agree (or only one document was supplied).
pub const CONFIDENCE_MATCH: u8 = 100;

/// Confidence when names differ but share enough common words.
pub const CONFIDENCE_PARTIAL: u8 = 75;

/// Confidence when names differ and share too few common words.
pub const CONFIDENCE_NO_MATCH: u8 = 20;

/// Minimum common words for a partial match.
pub const MIN_COMMON_WORDS: usize = 2;

const SINGLE_DOCUMENT_MESSAGE: &str =
    "Only one document provided - cross-verification not applicable";

const VERIFIED_MESSAGE: &str =
    "All documents belong to the same person - identity verified successfully";

/// Compare the identities extracted from a completed batch.
///
/// Must only be called once every document of the batch has succeeded.
/// A batch whose names are all empty counts as a match, since there are no
/// distinct names to disagree.
pub fn cross_verify(documents: &[DocumentResult]) -> CrossVerificationResult {
    let raw_names: Vec<String> = documents
        .iter()
        .map(|doc| doc.identity.name.clone())
        .collect();

    let normalized: Vec<String> = raw_names
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| normalize_name(name))
        .filter(|name| !name.is_empty())
        .collect();

    let mut distinct: Vec<String> = Vec::new();
    for name in &normalized {
        if !distinct.contains(name) {
            distinct.push(name.clone());
        }
    }

    if documents.len() == 1 {
        return CrossVerificationResult {
            status: VerificationStatus::SingleDocument,
            message: SINGLE_DOCUMENT_MESSAGE.to_string(),
            identity_match: true,
            confidence: CONFIDENCE_MATCH,
            extracted_names: distinct,
            document_count: 1,
            raw_names,
        };
    }

    let identity_match = distinct.len() <= 1;

    let (status, confidence, message) = if identity_match {
        (
            VerificationStatus::IdentityVerified,
            CONFIDENCE_MATCH,
            VERIFIED_MESSAGE.to_string(),
        )
    } else {
        let confidence = if common_words(&distinct).len() >= MIN_COMMON_WORDS {
            CONFIDENCE_PARTIAL
        } else {
            CONFIDENCE_NO_MATCH
        };
        (
            VerificationStatus::IdentityMismatch,
            confidence,
            format!(
                "Documents contain different names ({}) - manual review required",
                distinct.join(", ")
            ),
        )
    };

    tracing::debug!(
        documents = documents.len(),
        distinct_names = distinct.len(),
        confidence,
        "Cross-verification complete"
    );

    CrossVerificationResult {
        status,
        message,
        identity_match,
        confidence,
        extracted_names: distinct,
        document_count: documents.len(),
        raw_names,
    }
}

/// Words that every name contains.
///
/// Containment is substring-based, not token-based: `"amit"` is common to
/// `"amit kumar"` and `"amita kumari"`.
pub fn common_words(names: &[String]) -> Vec<String> {
    let mut words: Vec<&str> = Vec::new();
    for word in names.iter().flat_map(|name| name.split_whitespace()) {
        if !words.contains(&word) {
            words.push(word);
        }
    }

    words
        .into_iter()
        .filter(|word| names.iter().all(|name| name.contains(word)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::documents;

    #[test]
    fn test_single_document() {
        let result = cross_verify(&documents(&["Priya Sharma"]));
        assert_eq!(result.status, VerificationStatus::SingleDocument);
        assert!(result.identity_match);
        assert_eq!(result.confidence, 100);
        assert_eq!(result.document_count, 1);
        assert_eq!(result.message, SINGLE_DOCUMENT_MESSAGE);
    }

    #[test]
    fn test_single_document_with_empty_name() {
        let result = cross_verify(&documents(&[""]));
        assert_eq!(result.status, VerificationStatus::SingleDocument);
        assert!(result.identity_match);
        assert_eq!(result.confidence, 100);
        assert!(result.extracted_names.is_empty());
        assert_eq!(result.raw_names, vec![""]);
    }

    #[test]
    fn test_normalized_names_match() {
        let result = cross_verify(&documents(&["Rajesh Kumar", "RAJESH  KUMAR", "rajesh kumar!"]));
        assert_eq!(result.status, VerificationStatus::IdentityVerified);
        assert!(result.identity_match);
        assert_eq!(result.confidence, 100);
        assert_eq!(result.extracted_names, vec!["rajesh kumar"]);
        assert_eq!(result.document_count, 3);
        assert_eq!(
            result.raw_names,
            vec!["Rajesh Kumar", "RAJESH  KUMAR", "rajesh kumar!"]
        );
        assert_eq!(result.message, VERIFIED_MESSAGE);
    }

    #[test]
    fn test_partial_match() {
        let result = cross_verify(&documents(&["Amit Singh", "Amit K Singh"]));
        assert_eq!(result.status, VerificationStatus::IdentityMismatch);
        assert!(!result.identity_match);
        assert_eq!(result.confidence, 75);
        assert_eq!(result.extracted_names, vec!["amit singh", "amit k singh"]);
        assert_eq!(
            result.message,
            "Documents contain different names (amit singh, amit k singh) - manual review required"
        );
    }

    #[test]
    fn test_no_match() {
        let result = cross_verify(&documents(&["Alice Brown", "Zed Totally Different"]));
        assert_eq!(result.status, VerificationStatus::IdentityMismatch);
        assert!(!result.identity_match);
        assert_eq!(result.confidence, 20);
    }

    #[test]
    fn test_empty_names_excluded_but_kept_raw() {
        let result = cross_verify(&documents(&["Neha Gupta", "", "NEHA GUPTA"]));
        assert!(result.identity_match);
        assert_eq!(result.confidence, 100);
        assert_eq!(result.extracted_names, vec!["neha gupta"]);
        assert_eq!(result.raw_names, vec!["Neha Gupta", "", "NEHA GUPTA"]);
        assert_eq!(result.document_count, 3);
    }

    #[test]
    fn test_all_names_empty_counts_as_match() {
        let result = cross_verify(&documents(&["", ""]));
        assert_eq!(result.status, VerificationStatus::IdentityVerified);
        assert!(result.identity_match);
        assert!(result.extracted_names.is_empty());
    }

    #[test]
    fn test_common_word_uses_substring_containment() {
        // "am" is not a token of "amit singh", yet it counts as common
        // because "amit" contains it. Token-set comparison would find only
        // "singh" in common and score 20.
        let names = vec!["am singh".to_string(), "amit singh".to_string()];
        assert_eq!(common_words(&names), vec!["am", "singh"]);

        let result = cross_verify(&documents(&["Am Singh", "Amit Singh"]));
        assert_eq!(result.confidence, 75);
    }

    #[test]
    fn test_substring_overlap_without_shared_tokens() {
        // No exact token is shared, yet both "amit" and "kumar" are
        // substrings of "amita kumari".
        let result = cross_verify(&documents(&["Amit Kumar", "Amita Kumari"]));
        assert!(!result.identity_match);
        assert_eq!(result.confidence, 75);
    }

    #[test]
    fn test_double_space_yields_no_empty_word() {
        // "A . B" normalizes to "a  b". Splitting on whitespace runs gives
        // no empty word, so only real words can count as common.
        let names = vec![normalize_name("A . B"), "a c".to_string()];
        assert_eq!(names[0], "a  b");
        assert_eq!(common_words(&names), vec!["a"]);

        let result = cross_verify(&documents(&["A . B", "A C"]));
        assert!(!result.identity_match);
        assert_eq!(result.confidence, 20);
    }
}
