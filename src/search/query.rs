//! Query-shape classification for the fuzzy router.
//!
//! The router picks which collections to search first based on whether the
//! query carries a plate-like cluster. Classification is deliberately a
//! standalone function over the normalized query so it can be tested apart
//! from the merge step.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::{Mode, normalize};

/// Vietnamese plate cluster after code normalization: two province digits,
/// one or two series letters, then a four- or five-digit serial.
static PLATE_CLUSTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{2}[a-z]{1,2}[0-9]{4,5}").expect("static pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// Nothing left after code normalization.
    Empty,
    /// Contains a plate-like cluster; vehicles and badges first.
    PlateLike,
    /// Anything else; operators, drivers and routes first.
    FreeText,
}

pub fn classify(query: &str) -> QueryShape {
    let code = normalize(query, Mode::Code);
    if code.is_empty() {
        QueryShape::Empty
    } else if PLATE_CLUSTER.is_match(&code) {
        QueryShape::PlateLike
    } else {
        QueryShape::FreeText
    }
}

/// The first plate-like cluster of the query, code-normalized, if any.
pub fn extract_plate_cluster(query: &str) -> Option<String> {
    let code = normalize(query, Mode::Code);
    PLATE_CLUSTER
        .find(&code)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_separator_only_queries_are_empty() {
        assert_eq!(classify(""), QueryShape::Empty);
        assert_eq!(classify("   "), QueryShape::Empty);
        assert_eq!(classify("-.-"), QueryShape::Empty);
    }

    #[test]
    fn plate_clusters_are_detected_across_formats() {
        assert_eq!(classify("98H07480"), QueryShape::PlateLike);
        assert_eq!(classify("98H-07480"), QueryShape::PlateLike);
        assert_eq!(classify("xe 98h 07480 ở đâu"), QueryShape::PlateLike);
        assert_eq!(classify("51LD 12345"), QueryShape::PlateLike);
    }

    #[test]
    fn names_digits_and_noise_are_free_text() {
        assert_eq!(classify("Phương Trang"), QueryShape::FreeText);
        assert_eq!(classify("98"), QueryShape::FreeText);
        assert_eq!(classify("07480"), QueryShape::FreeText);
        assert_eq!(classify("!!??"), QueryShape::FreeText);
        let long = "x".repeat(1000);
        assert_eq!(classify(&long), QueryShape::FreeText);
    }

    #[test]
    fn cluster_extraction_strips_surrounding_words() {
        assert_eq!(
            extract_plate_cluster("xe 98H-07480 hôm nay").as_deref(),
            Some("98h07480")
        );
        assert_eq!(extract_plate_cluster("Phương Trang"), None);
    }
}
