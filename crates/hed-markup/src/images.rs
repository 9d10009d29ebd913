//! Image tables and placeholder resolution.
//!
//! A post body owns one [`ImageTable`]. Ordinal placeholders (`[Image]`,
//! `[Image #N]`) take the next unclaimed entry; keyed placeholders
//! (`![Image]$$KEY$$`) look their entry up by key. Each render walks the
//! table with a fresh [`ImageResolver`].

/// Single image table entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageEntry {
    /// Legacy key (`"<section>-<suffix>"`), `None` for ordinal tables.
    pub key: Option<String>,
    /// Public image URL.
    pub url: String,
}

/// Ordered collection of images belonging to one post body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageTable {
    entries: Vec<ImageEntry>,
}

impl ImageTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an ordinal table from URLs in placeholder order.
    #[must_use]
    pub fn ordered<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: urls
                .into_iter()
                .map(|url| ImageEntry {
                    key: None,
                    url: url.into(),
                })
                .collect(),
        }
    }

    /// Create a keyed table from legacy `key → url` pairs.
    ///
    /// Entries are ordered by section index, then by suffix (numerically when
    /// both suffixes are numbers), so ordinal consumption stays deterministic
    /// whatever order the map was stored in. Entries with an empty URL are
    /// skipped.
    #[must_use]
    pub fn keyed<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<ImageEntry> = pairs
            .into_iter()
            .map(|(key, url)| ImageEntry {
                key: Some(key.into()),
                url: url.into(),
            })
            .filter(|entry| !entry.url.is_empty())
            .collect();
        entries.sort_by(|a, b| {
            let a = a.key.as_deref().unwrap_or_default();
            let b = b.key.as_deref().unwrap_or_default();
            key_order(a).cmp(&key_order(b))
        });
        Self { entries }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in table order.
    #[must_use]
    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    /// URLs in table order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.url.as_str())
    }

    /// Look up the URL stored under a legacy key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key.as_deref() == Some(key))
            .map(|entry| entry.url.as_str())
    }

    /// Start a resolution pass over this table.
    #[must_use]
    pub fn resolver(&self) -> ImageResolver<'_> {
        ImageResolver {
            table: self,
            consumed: vec![false; self.entries.len()],
            cursor: 0,
        }
    }
}

/// Sort key for legacy image keys: section index, numeric suffix, raw key.
fn key_order(key: &str) -> (u64, u64, &str) {
    let (section, suffix) = key.split_once('-').unwrap_or((key, ""));
    (
        section.parse().unwrap_or(u64::MAX),
        suffix.parse().unwrap_or(u64::MAX),
        key,
    )
}

/// Tracks which table entries have been claimed during one render.
#[derive(Debug)]
pub struct ImageResolver<'a> {
    table: &'a ImageTable,
    consumed: Vec<bool>,
    cursor: usize,
}

impl<'a> ImageResolver<'a> {
    /// Claim the next unclaimed entry in table order.
    ///
    /// Returns `None` once the table is exhausted.
    pub fn next_ordinal(&mut self) -> Option<&'a str> {
        while self.cursor < self.consumed.len() {
            let idx = self.cursor;
            self.cursor += 1;
            if !self.consumed[idx] {
                self.consumed[idx] = true;
                return Some(self.table.entries[idx].url.as_str());
            }
        }
        None
    }

    /// Claim the entry stored under `key`.
    ///
    /// A keyed lookup succeeds even if the entry was already claimed, so the
    /// same keyed image may appear twice.
    pub fn by_key(&mut self, key: &str) -> Option<&'a str> {
        let idx = self
            .table
            .entries
            .iter()
            .position(|entry| entry.key.as_deref() == Some(key))?;
        self.consumed[idx] = true;
        Some(self.table.entries[idx].url.as_str())
    }

    /// Number of claimed entries.
    #[must_use]
    pub fn consumed_count(&self) -> usize {
        self.consumed.iter().filter(|used| **used).count()
    }

    /// Unclaimed entries in table order.
    pub fn remaining(&self) -> impl Iterator<Item = &'a str> {
        let table = self.table;
        table
            .entries
            .iter()
            .zip(self.consumed.clone())
            .filter(|(_, used)| !used)
            .map(|(entry, _)| entry.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_ordered_preserves_order() {
        let table = ImageTable::ordered(["a", "b", "c"]);
        assert_eq!(table.urls().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(table.entries().iter().all(|e| e.key.is_none()));
    }

    #[test]
    fn test_keyed_sorted_by_section_then_suffix() {
        let table = ImageTable::keyed([
            ("1-200", "d"),
            ("0-1700000000010", "b"),
            ("0-1700000000002", "a"),
            ("1-100", "c"),
        ]);
        assert_eq!(table.urls().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_keyed_plain_index_keys() {
        let table = ImageTable::keyed([("2", "c"), ("0", "a"), ("1", "b")]);
        assert_eq!(table.urls().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_keyed_skips_empty_urls() {
        let table = ImageTable::keyed([("0-1", ""), ("0-2", "b")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("0-2"), Some("b"));
        assert_eq!(table.get("0-1"), None);
    }

    #[test]
    fn test_next_ordinal_exhausts() {
        let table = ImageTable::ordered(["a", "b"]);
        let mut resolver = table.resolver();
        assert_eq!(resolver.next_ordinal(), Some("a"));
        assert_eq!(resolver.next_ordinal(), Some("b"));
        assert_eq!(resolver.next_ordinal(), None);
        assert_eq!(resolver.consumed_count(), 2);
    }

    #[test]
    fn test_ordinal_skips_entries_claimed_by_key() {
        let table = ImageTable::keyed([("0-1", "a"), ("0-2", "b"), ("0-3", "c")]);
        let mut resolver = table.resolver();
        assert_eq!(resolver.by_key("0-1"), Some("a"));
        assert_eq!(resolver.next_ordinal(), Some("b"));
        assert_eq!(resolver.next_ordinal(), Some("c"));
        assert_eq!(resolver.next_ordinal(), None);
    }

    #[test]
    fn test_by_key_missing() {
        let table = ImageTable::keyed([("0-1", "a")]);
        let mut resolver = table.resolver();
        assert_eq!(resolver.by_key("9-9"), None);
        assert_eq!(resolver.consumed_count(), 0);
    }

    #[test]
    fn test_remaining_lists_unclaimed() {
        let table = ImageTable::ordered(["a", "b", "c"]);
        let mut resolver = table.resolver();
        resolver.next_ordinal();
        assert_eq!(resolver.remaining().collect::<Vec<_>>(), vec!["b", "c"]);
    }
}
