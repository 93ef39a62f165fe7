//! Aggregations over the validated collections.
//!
//! Every function is pure and works on slices. When several entries tie
//! for "most", the one seen first wins; numeric ids tie towards the
//! smallest id.

pub mod albums;
pub mod comments;
pub mod posts;
pub mod users;

pub use albums::*;
pub use comments::*;
pub use posts::*;
pub use users::*;

use crate::models::User;
use std::collections::HashMap;
use std::hash::Hash;

/// Count keys, keeping the order in which each key first appeared.
pub(crate) fn tally<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();

    for key in keys {
        match positions.get(&key) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts
}

/// The first entry with the strictly highest count.
pub(crate) fn first_max<K>(counts: Vec<(K, usize)>) -> Option<(K, usize)> {
    let mut best: Option<(K, usize)> = None;
    for (key, count) in counts {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((key, count));
        }
    }
    best
}

/// Lowercased email → user. A later user with the same email wins.
pub(crate) fn email_index(users: &[User]) -> HashMap<String, &User> {
    users
        .iter()
        .filter(|u| !u.email.is_empty())
        .map(|u| (u.email.to_lowercase(), u))
        .collect()
}

/// Split `items` into pages of `page_size`. A size of 0 is treated as 1.
pub fn paginate<T>(items: &[T], page_size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(page_size.max(1))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_keeps_first_seen_order() {
        let counts = tally(["b", "a", "b", "c", "a", "b"]);
        assert_eq!(counts, vec![("b", 3), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn test_first_max_prefers_earliest_on_tie() {
        assert_eq!(first_max(vec![("x", 2), ("y", 3), ("z", 3)]), Some(("y", 3)));
        assert_eq!(first_max::<&str>(vec![]), None);
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=7).collect();
        let pages: Vec<&[u32]> = paginate(&items, 3).collect();
        assert_eq!(pages, vec![&[1, 2, 3][..], &[4, 5, 6][..], &[7][..]]);

        assert_eq!(paginate(&items, 0).count(), 7);
        assert_eq!(paginate::<u32>(&[], 10).count(), 0);
    }
}
