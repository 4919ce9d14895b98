//! Query tokenization and three-band ranking.
//!
//! Every item whose text contains all space-separated query tokens is a
//! match. Matches are ordered as exact matches, then items starting with the
//! first token, then the remaining substring matches. Inside a band items keep
//! their input order.

use memchr::{memchr, memchr2, memmem};

use crate::item::Item;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Comparator {
    #[default]
    CaseSensitive,
    /// ASCII case folding; other bytes compare as-is.
    CaseInsensitive,
}

impl Comparator {
    pub fn from_ignore_case(ignore_case: bool) -> Self {
        if ignore_case {
            Comparator::CaseInsensitive
        } else {
            Comparator::CaseSensitive
        }
    }

    pub fn contains(self, haystack: &[u8], needle: &[u8]) -> bool {
        match self {
            Comparator::CaseSensitive => memmem::find(haystack, needle).is_some(),
            Comparator::CaseInsensitive => contains_ascii_case_insensitive(haystack, needle),
        }
    }

    pub fn starts_with(self, haystack: &[u8], prefix: &[u8]) -> bool {
        haystack.len() >= prefix.len() && self.equals(&haystack[..prefix.len()], prefix)
    }

    pub fn equals(self, left: &[u8], right: &[u8]) -> bool {
        match self {
            Comparator::CaseSensitive => left == right,
            Comparator::CaseInsensitive => left.eq_ignore_ascii_case(right),
        }
    }
}

fn contains_ascii_case_insensitive(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }

    let first = needle[0].to_ascii_lowercase();
    let first_upper = first.to_ascii_uppercase();
    let find_first = |search: &[u8]| {
        if first_upper == first {
            memchr(first, search)
        } else {
            memchr2(first, first_upper, search)
        }
    };

    let mut base = 0usize;
    while let Some(pos) = find_first(&haystack[base..]) {
        let start = base + pos;
        if haystack.len() - start < needle.len() {
            return false;
        }
        if haystack[start..start + needle.len()].eq_ignore_ascii_case(needle) {
            return true;
        }
        base = start + 1;
    }
    false
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Exact,
    Prefix,
    Substring,
}

/// Ordered positions into the item store for one query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchSet {
    indices: Vec<usize>,
    exact: usize,
    prefix: usize,
}

impl MatchSet {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Item store index at match position `pos`.
    pub fn get(&self, pos: usize) -> Option<usize> {
        self.indices.get(pos).copied()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn band(&self, pos: usize) -> Option<Band> {
        if pos >= self.indices.len() {
            None
        } else if pos < self.exact {
            Some(Band::Exact)
        } else if pos < self.exact + self.prefix {
            Some(Band::Prefix)
        } else {
            Some(Band::Substring)
        }
    }

    /// Band sizes as `(exact, prefix, substring)`.
    pub fn band_lens(&self) -> (usize, usize, usize) {
        (
            self.exact,
            self.prefix,
            self.indices.len() - self.exact - self.prefix,
        )
    }
}

/// Split on ASCII space, dropping empty pieces.
pub fn tokenize(query: &[u8]) -> Vec<&[u8]> {
    query
        .split(|&byte| byte == b' ')
        .filter(|token| !token.is_empty())
        .collect()
}

pub fn match_items(items: &[Item], query: &[u8], comparator: Comparator) -> MatchSet {
    let tokens = tokenize(query);
    let mut exact = Vec::new();
    let mut prefix = Vec::new();
    let mut substring = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let text = item.text.as_slice();
        if !tokens.iter().all(|token| comparator.contains(text, token)) {
            continue;
        }
        match tokens.first() {
            None => exact.push(index),
            Some(_) if comparator.equals(query, text) => exact.push(index),
            Some(first) if comparator.starts_with(text, first) => prefix.push(index),
            Some(_) => substring.push(index),
        }
    }

    let (exact_len, prefix_len) = (exact.len(), prefix.len());
    let mut indices = exact;
    indices.append(&mut prefix);
    indices.append(&mut substring);
    MatchSet {
        indices,
        exact: exact_len,
        prefix: prefix_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(texts: &[&str]) -> Vec<Item> {
        texts.iter().map(|text| Item::new(text.as_bytes())).collect()
    }

    fn matched<'a>(items: &'a [Item], set: &MatchSet) -> Vec<&'a str> {
        set.indices()
            .iter()
            .map(|&index| std::str::from_utf8(&items[index].text).unwrap())
            .collect()
    }

    #[test]
    fn tokenize_drops_empty_pieces() {
        assert_eq!(tokenize(b"  foo  bar "), vec![&b"foo"[..], b"bar"]);
        assert!(tokenize(b"   ").is_empty());
        assert!(tokenize(b"").is_empty());
    }

    #[test]
    fn empty_query_matches_everything_as_exact() {
        let items = store(&["b", "a", "c"]);
        let set = match_items(&items, b"", Comparator::CaseSensitive);
        assert_eq!(set.indices(), &[0, 1, 2]);
        assert_eq!(set.band_lens(), (3, 0, 0));

        let set = match_items(&items, b"  ", Comparator::CaseSensitive);
        assert_eq!(set.band_lens(), (3, 0, 0));
    }

    #[test]
    fn prefix_band_precedes_substring_band() {
        let items = store(&["apple", "application", "snapple", "banana"]);
        let set = match_items(&items, b"app", Comparator::CaseSensitive);
        assert_eq!(matched(&items, &set), vec!["apple", "application", "snapple"]);
        assert_eq!(set.band_lens(), (0, 2, 1));
        assert_eq!(set.band(2), Some(Band::Substring));
        assert_eq!(set.band(3), None);
    }

    #[test]
    fn multi_token_query_classifies_against_whole_query_and_first_token() {
        let items = store(&["bar foo", "foobar", "foo bar"]);
        let set = match_items(&items, b"foo bar", Comparator::CaseSensitive);
        assert_eq!(matched(&items, &set), vec!["foo bar", "foobar", "bar foo"]);
        assert_eq!(set.band(0), Some(Band::Exact));
        assert_eq!(set.band(1), Some(Band::Prefix));
        assert_eq!(set.band(2), Some(Band::Substring));
    }

    #[test]
    fn comparator_controls_case_folding() {
        let items = store(&["Makefile", "makefile.am", "README"]);
        let sensitive = match_items(&items, b"make", Comparator::CaseSensitive);
        assert_eq!(matched(&items, &sensitive), vec!["makefile.am"]);

        let insensitive = match_items(&items, b"MAKEFILE", Comparator::CaseInsensitive);
        assert_eq!(matched(&items, &insensitive), vec!["Makefile", "makefile.am"]);
        assert_eq!(insensitive.band_lens(), (1, 1, 0));
    }

    #[test]
    fn case_insensitive_search_scans_past_false_starts() {
        let cmp = Comparator::CaseInsensitive;
        assert!(cmp.contains(b"xXyXYZ", b"xyz"));
        assert!(!cmp.contains(b"xXy", b"xyz"));
        assert!(cmp.contains(b"12-34", b"-3"));
        assert!(cmp.contains(b"anything", b""));
        assert!(!cmp.contains(b"", b"a"));
    }

    #[test]
    fn bands_are_disjoint_and_keep_store_order() {
        let items = store(&["ab", "xab", "ab", "abx", "b a", "zzz", "a b"]);
        let set = match_items(&items, b"a b", Comparator::CaseSensitive);
        let (exact, prefix, _) = set.band_lens();
        let bands = [
            &set.indices()[..exact],
            &set.indices()[exact..exact + prefix],
            &set.indices()[exact + prefix..],
        ];
        for band in bands {
            assert!(band.windows(2).all(|pair| pair[0] < pair[1]));
        }
        let mut seen = set.indices().to_vec();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), set.len());
        assert_eq!(matched(&items, &set), vec!["a b", "ab", "ab", "abx", "xab", "b a"]);
    }
}
