//! Cache keys for queries.
//!
//! A fingerprint is the SHA-256 of a canonical, hand-written rendering of the
//! fields that decide what an indexer returns. Field order is fixed, a missing
//! search term renders exactly like an empty one, and categories are sorted
//! and deduplicated, so equivalent queries always land on the same entry.
//!
//! `api_key` and `is_test` are left out: neither changes the releases.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::indexer::TorznabQuery;

/// Compute the cache key of a query.
///
/// Rendered as uppercase hex bytes joined by `-`.
pub fn fingerprint(query: &TorznabQuery) -> String {
    let digest = Sha256::digest(canonical_form(query).as_bytes());
    digest
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join("-")
}

/// Canonical text form of the cache-relevant query fields.
pub(crate) fn canonical_form(query: &TorznabQuery) -> String {
    let mut categories = query.categories.clone();
    categories.sort_unstable();
    categories.dedup();

    let mut w = CanonicalWriter::default();
    w.text("type", query.query_type.as_str());
    w.text("q", query.search_term_or_empty());
    w.raw(
        "cat",
        &categories
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(","),
    );
    w.opt_num("season", query.season);
    w.opt_text("ep", query.episode.as_deref());
    w.opt_text("imdb", query.imdb_id.as_deref());
    w.opt_num("tmdb", query.tmdb_id);
    w.opt_num("tvdb", query.tvdb_id);
    w.opt_text("artist", query.artist.as_deref());
    w.opt_text("album", query.album.as_deref());
    w.opt_text("label", query.label.as_deref());
    w.opt_text("track", query.track.as_deref());
    w.opt_num("year", query.year);
    w.opt_text("genre", query.genre.as_deref());
    w.opt_text("author", query.author.as_deref());
    w.opt_text("title", query.title.as_deref());
    w.opt_text("publisher", query.publisher.as_deref());
    w.opt_num("limit", query.limit);
    w.opt_num("offset", query.offset);
    w.finish()
}

#[derive(Default)]
struct CanonicalWriter {
    out: String,
}

impl CanonicalWriter {
    fn raw(&mut self, name: &str, value: &str) {
        self.out.push_str(name);
        self.out.push('=');
        self.out.push_str(value);
        self.out.push(';');
    }

    /// Strings are JSON-quoted so separators inside values cannot collide.
    fn text(&mut self, name: &str, value: &str) {
        let quoted = Value::String(value.to_owned()).to_string();
        self.raw(name, &quoted);
    }

    fn opt_text(&mut self, name: &str, value: Option<&str>) {
        match value {
            Some(v) => self.text(name, v),
            None => self.raw(name, "null"),
        }
    }

    fn opt_num(&mut self, name: &str, value: Option<u32>) {
        match value {
            Some(v) => self.raw(name, &v.to_string()),
            None => self.raw(name, "null"),
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::QueryType;

    #[test]
    fn test_fingerprint_format() {
        let fp = fingerprint(&TorznabQuery::search("ubuntu"));
        let parts: Vec<&str> = fp.split('-').collect();

        assert_eq!(parts.len(), 32);
        assert!(parts
            .iter()
            .all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let query = TorznabQuery::search("ubuntu").with_categories(vec![2000, 5000]);
        assert_eq!(fingerprint(&query), fingerprint(&query.clone()));
    }

    #[test]
    fn test_none_and_empty_search_term_collide() {
        let absent = TorznabQuery {
            search_term: None,
            categories: vec![5000],
            ..Default::default()
        };
        let empty = TorznabQuery {
            search_term: Some(String::new()),
            categories: vec![5000],
            ..Default::default()
        };
        assert_eq!(fingerprint(&absent), fingerprint(&empty));
    }

    #[test]
    fn test_different_terms_differ() {
        assert_ne!(
            fingerprint(&TorznabQuery::search("ubuntu")),
            fingerprint(&TorznabQuery::search("fedora"))
        );
    }

    #[test]
    fn test_different_categories_differ() {
        let a = TorznabQuery::search("ubuntu").with_categories(vec![2000]);
        let b = TorznabQuery::search("ubuntu").with_categories(vec![5000]);
        let none = TorznabQuery::search("ubuntu");
        assert_ne!(fingerprint(&a), fingerprint(&b));
        assert_ne!(fingerprint(&a), fingerprint(&none));
    }

    #[test]
    fn test_category_order_and_duplicates_ignored() {
        let a = TorznabQuery::search("x").with_categories(vec![5000, 2000]);
        let b = TorznabQuery::search("x").with_categories(vec![2000, 5000, 2000]);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_query_type_and_pagination_matter() {
        let search = TorznabQuery::search("x");
        let tv = TorznabQuery {
            query_type: QueryType::TvSearch,
            ..TorznabQuery::search("x")
        };
        let paged = TorznabQuery {
            offset: Some(100),
            ..TorznabQuery::search("x")
        };
        assert_ne!(fingerprint(&search), fingerprint(&tv));
        assert_ne!(fingerprint(&search), fingerprint(&paged));
    }

    #[test]
    fn test_transport_fields_ignored() {
        let plain = TorznabQuery::search("x");
        let keyed = TorznabQuery {
            api_key: Some("secret".to_string()),
            ..TorznabQuery::search("x")
        };
        let test = TorznabQuery::search("x").as_test();
        assert_eq!(fingerprint(&plain), fingerprint(&keyed));
        assert_eq!(fingerprint(&plain), fingerprint(&test));
    }

    #[test]
    fn test_separator_inside_value_does_not_collide() {
        let a = TorznabQuery {
            artist: Some("a;album=b".to_string()),
            ..Default::default()
        };
        let b = TorznabQuery {
            artist: Some("a".to_string()),
            album: Some("b".to_string()),
            ..Default::default()
        };
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_absent_and_empty_optional_text_differ() {
        // Only the search term is folded; other text fields keep None distinct.
        let absent = TorznabQuery::default();
        let empty = TorznabQuery {
            genre: Some(String::new()),
            ..Default::default()
        };
        assert_ne!(canonical_form(&absent), canonical_form(&empty));
    }
}
