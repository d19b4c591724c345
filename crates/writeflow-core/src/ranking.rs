//! Engagement ranking for feeds.
//!
//! Posts are ordered by a composite key instead of a weighted score:
//!
//! 1. more likes first
//! 2. fewer dislikes first
//! 3. more recent effective timestamp first
//!
//! Items that tie on all three keep their input order. A missing or
//! unparseable timestamp ranks as the oldest possible value.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Anything that can be placed in an engagement-ranked feed.
pub trait Rankable {
    fn like_count(&self) -> u64;

    fn dislike_count(&self) -> u64;

    /// Publication time if set, otherwise creation time.
    /// `None` when neither is known or parseable.
    fn effective_timestamp(&self) -> Option<DateTime<Utc>>;
}

/// Reaction counts of a post. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngagementScore {
    pub likes: u64,
    pub dislikes: u64,
}

impl EngagementScore {
    pub fn of<T: Rankable + ?Sized>(item: &T) -> Self {
        Self {
            likes: item.like_count(),
            dislikes: item.dislike_count(),
        }
    }
}

/// Feed ordering between two items. `Less` means `a` is shown before `b`.
pub fn compare<T: Rankable + ?Sized>(a: &T, b: &T) -> Ordering {
    b.like_count()
        .cmp(&a.like_count())
        .then_with(|| a.dislike_count().cmp(&b.dislike_count()))
        // None < Some(_), so reversing puts unknown timestamps last.
        .then_with(|| b.effective_timestamp().cmp(&a.effective_timestamp()))
}

/// Permutation that ranks `items`: `items[rank_indices(items)[0]]` comes first.
pub fn rank_indices<T: Rankable>(items: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    // sort_by is stable; full ties keep input order
    order.sort_by(|&i, &j| compare(&items[i], &items[j]));
    order
}

/// Ranked copy of `items`. The input slice is left untouched.
pub fn rank<T: Rankable + Clone>(items: &[T]) -> Vec<T> {
    rank_indices(items)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

/// Rank an owned collection without cloning its elements.
pub fn into_ranked<T: Rankable>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(compare);
    items
}

/// The first `n` items of the ranked order.
pub fn top<T: Rankable + Clone>(items: &[T], n: usize) -> Vec<T> {
    rank_indices(items)
        .into_iter()
        .take(n)
        .map(|i| items[i].clone())
        .collect()
}

/// Resolve a raw timestamp string for ranking.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC) or a
/// bare `YYYY-MM-DD` date. Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: &'static str,
        likes: u64,
        dislikes: u64,
        at: Option<DateTime<Utc>>,
    }

    impl Rankable for Item {
        fn like_count(&self) -> u64 {
            self.likes
        }

        fn dislike_count(&self) -> u64 {
            self.dislikes
        }

        fn effective_timestamp(&self) -> Option<DateTime<Utc>> {
            self.at
        }
    }

    /// Record as it arrives from an untyped source.
    #[derive(Debug, Clone)]
    struct RawItem {
        id: &'static str,
        likes: u64,
        dislikes: u64,
        created_at: &'static str,
        published_at: Option<&'static str>,
    }

    impl Rankable for RawItem {
        fn like_count(&self) -> u64 {
            self.likes
        }

        fn dislike_count(&self) -> u64 {
            self.dislikes
        }

        fn effective_timestamp(&self) -> Option<DateTime<Utc>> {
            // a blank publication date falls back to the creation date
            let raw = self
                .published_at
                .filter(|published| !published.trim().is_empty())
                .unwrap_or(self.created_at);
            parse_timestamp(raw)
        }
    }

    fn day(s: &str) -> Option<DateTime<Utc>> {
        parse_timestamp(s)
    }

    fn item(id: &'static str, likes: u64, dislikes: u64, at: &str) -> Item {
        Item {
            id,
            likes,
            dislikes,
            at: day(at),
        }
    }

    fn ids<T: Rankable>(items: &[T], id: impl Fn(&T) -> &'static str) -> Vec<&'static str> {
        items.iter().map(id).collect()
    }

    /// Small deterministic generator so pairwise checks cover many shapes.
    fn sample(n: usize) -> Vec<Item> {
        const IDS: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        (0..n)
            .map(|i| {
                let r = next();
                let at = if r % 11 == 0 {
                    None
                } else {
                    DateTime::from_timestamp(1_700_000_000 + (r % 50) as i64 * 86_400, 0)
                };
                Item {
                    id: IDS[i % IDS.len()],
                    likes: r % 5,
                    dislikes: (r >> 8) % 4,
                    at,
                }
            })
            .collect()
    }

    fn permutations(items: &[Item]) -> Vec<Vec<Item>> {
        if items.len() <= 1 {
            return vec![items.to_vec()];
        }
        let mut out = Vec::new();
        for i in 0..items.len() {
            let mut rest = items.to_vec();
            let head = rest.remove(i);
            for mut tail in permutations(&rest) {
                tail.insert(0, head.clone());
                out.push(tail);
            }
        }
        out
    }

    #[test]
    fn test_concrete_scenario() {
        let posts = vec![
            item("P1", 5, 1, "2024-01-01"),
            item("P2", 5, 0, "2024-01-01"),
            item("P3", 3, 0, "2024-06-01"),
            item("P4", 5, 0, "2024-02-01"),
        ];

        let ranked = rank(&posts);

        assert_eq!(ids(&ranked, |p| p.id), vec!["P4", "P2", "P1", "P3"]);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let posts = vec![item("a", 0, 0, "2024-01-01"), item("b", 3, 0, "2024-01-01")];
        let snapshot = posts.clone();

        let _ = rank(&posts);

        assert_eq!(posts, snapshot);
    }

    #[test]
    fn test_empty_and_single() {
        let empty: Vec<Item> = Vec::new();
        assert!(rank(&empty).is_empty());
        assert!(rank_indices(&empty).is_empty());

        let single = vec![item("only", 2, 9, "2020-05-05")];
        assert_eq!(rank(&single), single);
    }

    #[test]
    fn test_more_likes_always_first() {
        let ranked = rank(&sample(64));
        for (i, a) in ranked.iter().enumerate() {
            for b in &ranked[i + 1..] {
                assert!(a.likes >= b.likes, "{a:?} ranked before {b:?}");
            }
        }
    }

    #[test]
    fn test_equal_likes_fewer_dislikes_first() {
        let ranked = rank(&sample(64));
        for (i, a) in ranked.iter().enumerate() {
            for b in &ranked[i + 1..] {
                if a.likes == b.likes {
                    assert!(a.dislikes <= b.dislikes, "{a:?} ranked before {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_equal_counts_newer_first() {
        let ranked = rank(&sample(64));
        for (i, a) in ranked.iter().enumerate() {
            for b in &ranked[i + 1..] {
                if a.likes == b.likes && a.dislikes == b.dislikes {
                    assert!(a.at >= b.at, "{a:?} ranked before {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let once = rank(&sample(40));
        let twice = rank(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_permutation_invariant() {
        let posts = vec![
            item("a", 1, 0, "2024-03-01"),
            item("b", 1, 0, "2024-04-01"),
            item("c", 1, 2, "2024-05-01"),
            item("d", 4, 3, "2023-01-01"),
            Item {
                id: "e",
                likes: 1,
                dislikes: 2,
                at: None,
            },
        ];
        let expected = ids(&rank(&posts), |p| p.id);
        assert_eq!(expected, vec!["d", "b", "a", "c", "e"]);

        for perm in permutations(&posts) {
            assert_eq!(ids(&rank(&perm), |p| p.id), expected);
        }
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let posts = vec![
            item("first", 2, 1, "2024-01-01"),
            item("second", 2, 1, "2024-01-01"),
            item("third", 2, 1, "2024-01-01"),
        ];

        assert_eq!(rank_indices(&posts), vec![0, 1, 2]);
        assert_eq!(
            ids(&into_ranked(posts), |p| p.id),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn test_unparseable_timestamp_ranks_oldest() {
        let posts = vec![
            RawItem {
                id: "broken",
                likes: 2,
                dislikes: 0,
                created_at: "not a date",
                published_at: None,
            },
            RawItem {
                id: "ancient",
                likes: 2,
                dislikes: 0,
                created_at: "1970-01-02T00:00:00Z",
                published_at: None,
            },
            RawItem {
                id: "blank-published",
                likes: 2,
                dislikes: 0,
                created_at: "2024-01-01",
                published_at: Some(""),
            },
        ];

        let ranked = rank(&posts);

        assert_eq!(
            ids(&ranked, |p| p.id),
            vec!["blank-published", "ancient", "broken"]
        );
    }

    #[test]
    fn test_published_at_wins_over_created_at() {
        let posts = vec![
            RawItem {
                id: "old-draft",
                likes: 0,
                dislikes: 0,
                created_at: "2020-01-01",
                published_at: Some("2024-09-01T10:00:00+02:00"),
            },
            RawItem {
                id: "recent",
                likes: 0,
                dislikes: 0,
                created_at: "2024-08-01",
                published_at: None,
            },
        ];

        assert_eq!(ids(&rank(&posts), |p| p.id), vec!["old-draft", "recent"]);
    }

    #[test]
    fn test_top_takes_ranked_prefix() {
        let posts = sample(20);
        let ranked = rank(&posts);

        assert_eq!(top(&posts, 5), ranked[..5].to_vec());
        assert_eq!(top(&posts, 100).len(), 20);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-06-01T12:30:00Z").is_some());
        assert!(parse_timestamp("2024-06-01T12:30:00.123").is_some());
        assert_eq!(
            parse_timestamp("2024-06-01"),
            parse_timestamp("2024-06-01T00:00:00Z")
        );
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("   ").is_none());
    }

    #[test]
    fn test_engagement_score() {
        let p = item("x", 7, 2, "2024-01-01");
        assert_eq!(
            EngagementScore::of(&p),
            EngagementScore {
                likes: 7,
                dislikes: 2
            }
        );
    }
}
