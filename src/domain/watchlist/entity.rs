use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of watchlist entries shown per page
pub const WATCHLIST_PAGE_SIZE: usize = 20;

/// Insertion-ordered set of movie identifiers.
/// Holds identifiers only; full records are always joined from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WatchlistRecord", into = "WatchlistRecord")]
pub struct Watchlist {
    movie_ids: Vec<i64>,
    index: HashSet<i64>,
}

/// Persisted shape of a watchlist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchlistRecord {
    pub movie_ids: Vec<i64>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the id was already present
    pub fn add(&mut self, movie_id: i64) -> bool {
        if !self.index.insert(movie_id) {
            return false;
        }
        self.movie_ids.push(movie_id);
        true
    }

    /// Returns false when the id was absent
    pub fn remove(&mut self, movie_id: i64) -> bool {
        if !self.index.remove(&movie_id) {
            return false;
        }
        self.movie_ids.retain(|id| *id != movie_id);
        true
    }

    pub fn contains(&self, movie_id: i64) -> bool {
        self.index.contains(&movie_id)
    }

    pub fn ids(&self) -> &[i64] {
        &self.movie_ids
    }

    pub fn len(&self) -> usize {
        self.movie_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movie_ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.movie_ids.clear();
        self.index.clear();
    }

    pub fn total_pages(&self, page_size: usize) -> usize {
        if page_size == 0 {
            return 0;
        }
        self.movie_ids.len().div_ceil(page_size)
    }

    /// Ids on 1-based `page`; empty past the end
    pub fn page_ids(&self, page: usize, page_size: usize) -> &[i64] {
        if page == 0 || page_size == 0 {
            return &[];
        }
        let start = (page - 1).saturating_mul(page_size);
        if start >= self.movie_ids.len() {
            return &[];
        }
        let end = (start + page_size).min(self.movie_ids.len());
        &self.movie_ids[start..end]
    }
}

impl From<WatchlistRecord> for Watchlist {
    /// Duplicates in a stored record are dropped, first occurrence wins
    fn from(record: WatchlistRecord) -> Self {
        let mut watchlist = Watchlist::new();
        for id in record.movie_ids {
            watchlist.add(id);
        }
        watchlist
    }
}

impl From<Watchlist> for WatchlistRecord {
    fn from(watchlist: Watchlist) -> Self {
        WatchlistRecord {
            movie_ids: watchlist.movie_ids,
        }
    }
}

impl FromIterator<i64> for Watchlist {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Watchlist::from(WatchlistRecord {
            movie_ids: iter.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut watchlist = Watchlist::new();
        assert!(watchlist.add(7));
        assert!(!watchlist.add(7));
        assert_eq!(watchlist.ids(), &[7]);
    }

    #[test]
    fn test_remove_keeps_insertion_order() {
        let mut watchlist: Watchlist = [5, 2, 9].into_iter().collect();
        assert!(watchlist.remove(2));
        assert!(!watchlist.remove(2));
        assert_eq!(watchlist.ids(), &[5, 9]);
        assert!(!watchlist.contains(2));
    }

    #[test]
    fn test_record_with_duplicates_is_deduplicated() {
        let json = r#"{"movie_ids":[3,1,3,2,1]}"#;
        let watchlist: Watchlist = serde_json::from_str(json).unwrap();
        assert_eq!(watchlist.ids(), &[3, 1, 2]);
        assert_eq!(serde_json::to_string(&watchlist).unwrap(), r#"{"movie_ids":[3,1,2]}"#);
    }

    #[test]
    fn test_pagination() {
        let watchlist: Watchlist = (1..=45).collect();
        assert_eq!(watchlist.total_pages(20), 3);
        assert_eq!(watchlist.page_ids(1, 20).len(), 20);
        assert_eq!(watchlist.page_ids(3, 20), &[41, 42, 43, 44, 45]);
        assert!(watchlist.page_ids(4, 20).is_empty());
        assert!(watchlist.page_ids(0, 20).is_empty());
    }

    #[test]
    fn test_empty_watchlist_has_no_pages() {
        assert_eq!(Watchlist::new().total_pages(WATCHLIST_PAGE_SIZE), 0);
    }
}
