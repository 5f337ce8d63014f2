//! Per-field token index over one collection snapshot.
//!
//! An index never stores entities, only ordinals into its snapshot's item
//! vector, which keeps snapshot replacement a single `Arc` swap. Exact token
//! lookup is O(1); when a query token is absent the caller falls back to a
//! linear substring scan over the stored normalized values — collections top
//! out in the low thousands, so no trie or suffix structure is warranted.

use fxhash::FxHashMap;
use smallvec::SmallVec;

use crate::normalize::{self, Mode};

type Postings = SmallVec<[u32; 4]>;

/// Values a single entity contributes to one field group (e.g. a route's
/// departure and arrival stations).
pub type FieldValues = SmallVec<[String; 2]>;

#[derive(Debug, Default)]
pub struct FieldIndex {
    /// Normalized token -> ordinals in collection order.
    exact: FxHashMap<String, Postings>,
    /// (ordinal, normalized full value) pairs for the substring fallback.
    scan: Vec<(u32, String)>,
}

impl FieldIndex {
    /// Build an index over `items`. Text-mode fields index the full value
    /// plus each word, so a one-word query hits the containing full name;
    /// code-mode fields index the full value only.
    pub fn build<T, F>(items: &[T], mode: Mode, extract: F) -> Self
    where
        F: Fn(&T) -> FieldValues,
    {
        let mut index = FieldIndex::default();
        for (ordinal, item) in items.iter().enumerate() {
            let ordinal = ordinal as u32;
            for raw in extract(item) {
                let value = normalize::normalize(&raw, mode);
                if value.is_empty() {
                    continue;
                }
                index.insert_token(value.clone(), ordinal);
                if mode == Mode::Text {
                    for word in normalize::words(&value) {
                        index.insert_token(word.to_string(), ordinal);
                    }
                }
                index.scan.push((ordinal, value));
            }
        }
        index
    }

    fn insert_token(&mut self, token: String, ordinal: u32) {
        let postings = self.exact.entry(token).or_default();
        // Ordinals arrive ascending; the guard dedupes repeated words within
        // one value and repeated values within one entity.
        if postings.last() != Some(&ordinal) {
            postings.push(ordinal);
        }
    }

    /// Ordinals whose field produced `token` exactly, in collection order.
    pub fn exact_matches(&self, token: &str) -> &[u32] {
        self.exact.get(token).map(|p| p.as_slice()).unwrap_or(&[])
    }

    /// Ordinals whose normalized field value contains `needle` as a
    /// substring, deduplicated, in collection order.
    pub fn scan_matches(&self, needle: &str) -> Vec<u32> {
        if needle.is_empty() {
            return Vec::new();
        }
        let mut out: Vec<u32> = Vec::new();
        for (ordinal, value) in &self.scan {
            if value.contains(needle) && out.last() != Some(ordinal) {
                out.push(*ordinal);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.scan.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn plate_index(plates: &[&str]) -> FieldIndex {
        let items: Vec<String> = plates.iter().map(|s| s.to_string()).collect();
        FieldIndex::build(&items, Mode::Code, |p| smallvec![p.clone()])
    }

    #[test]
    fn exact_lookup_is_format_insensitive_by_construction() {
        let index = plate_index(&["98H-07480", "29B 12345"]);
        assert_eq!(index.exact_matches("98h07480"), &[0]);
        assert_eq!(index.exact_matches("29b12345"), &[1]);
        assert_eq!(index.exact_matches("98h-07480"), &[] as &[u32]);
    }

    #[test]
    fn scan_finds_partial_plates_in_collection_order() {
        let index = plate_index(&["98H-07480", "29B 12345", "98H-11111"]);
        assert_eq!(index.scan_matches("98h"), vec![0, 2]);
        assert_eq!(index.scan_matches("07480"), vec![0]);
        assert!(index.scan_matches("zzz").is_empty());
        assert!(index.scan_matches("").is_empty());
    }

    #[test]
    fn text_mode_indexes_words_and_full_value() {
        let names = vec!["Nguyễn Văn An".to_string(), "Trần Thị Bình".to_string()];
        let index = FieldIndex::build(&names, Mode::Text, |n| smallvec![n.clone()]);
        assert_eq!(index.exact_matches("nguyen"), &[0]);
        assert_eq!(index.exact_matches("nguyen van an"), &[0]);
        assert_eq!(index.exact_matches("binh"), &[1]);
        assert_eq!(index.exact_matches("an"), &[0]);
    }

    #[test]
    fn repeated_words_do_not_duplicate_postings() {
        let names = vec!["Ha Noi - Ha Giang".to_string()];
        let index = FieldIndex::build(&names, Mode::Text, |n| smallvec![n.clone()]);
        assert_eq!(index.exact_matches("ha"), &[0]);
    }

    #[test]
    fn empty_values_contribute_nothing() {
        let names = vec![String::new(), "  ".to_string()];
        let index = FieldIndex::build(&names, Mode::Text, |n| smallvec![n.clone()]);
        assert!(index.is_empty());
    }

    #[test]
    fn multi_value_extract_scans_both_values() {
        let routes = vec![("Bến xe Mỹ Đình".to_string(), "Bắc Giang".to_string())];
        let index = FieldIndex::build(&routes, Mode::Text, |(a, b)| {
            smallvec![a.clone(), b.clone()]
        });
        assert_eq!(index.exact_matches("bac giang"), &[0]);
        assert_eq!(index.scan_matches("my dinh"), vec![0]);
        // Same entity matched through both values still appears once.
        assert_eq!(index.scan_matches("b"), vec![0]);
    }
}
