//! Album reports and user activity.

use super::first_max;
use crate::models::{Album, Comment, User};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// The user owning the most albums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostAlbums {
    pub user_id: u64,
    pub count: usize,
    /// `None` when the owner is not among the valid users.
    pub user: Option<User>,
}

/// Albums owned by `user_id`.
pub fn albums_of_user(albums: &[Album], user_id: u64) -> Vec<Album> {
    albums
        .iter()
        .filter(|a| a.user_id == user_id)
        .cloned()
        .collect()
}

pub fn user_with_most_albums(albums: &[Album], users: &[User]) -> Option<MostAlbums> {
    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for album in albums {
        *counts.entry(album.user_id).or_default() += 1;
    }

    first_max(counts.into_iter().collect()).map(|(user_id, count)| MostAlbums {
        user_id,
        count,
        user: users.iter().find(|u| u.id == user_id).cloned(),
    })
}

/// Albums divided by users; an empty user list divides by one.
pub fn avg_albums_per_user(albums: &[Album], users: &[User]) -> f64 {
    albums.len() as f64 / users.len().max(1) as f64
}

/// Users with neither an album nor a comment under their email.
pub fn inactive_users(users: &[User], albums: &[Album], comments: &[Comment]) -> Vec<User> {
    let with_albums: HashSet<u64> = albums.iter().map(|a| a.user_id).collect();
    let commenters: HashSet<String> = comments.iter().map(|c| c.email.to_lowercase()).collect();

    users
        .iter()
        .filter(|u| !with_albums.contains(&u.id) && !commenters.contains(&u.email.to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{album, comment, user};

    fn users() -> Vec<User> {
        vec![
            user(1, "bret", "sincere@april.biz", None, None),
            user(2, "antonette", "shanna@melissa.tv", None, None),
            user(3, "samantha", "nathan@yesenia.net", None, None),
            user(4, "karianne", "julianne@kory.org", None, None),
        ]
    }

    fn albums() -> Vec<Album> {
        vec![album(1, 2), album(2, 1), album(3, 2), album(4, 1), album(5, 9)]
    }

    #[test]
    fn test_albums_of_user() {
        let ids: Vec<u64> = albums_of_user(&albums(), 2).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(albums_of_user(&albums(), 3).is_empty());
    }

    #[test]
    fn test_user_with_most_albums_ties_to_smallest_id() {
        let best = user_with_most_albums(&albums(), &users()).unwrap();
        assert_eq!(best.user_id, 1);
        assert_eq!(best.count, 2);
        assert_eq!(best.user.map(|u| u.username), Some("bret".to_string()));
    }

    #[test]
    fn test_user_with_most_albums_unknown_owner() {
        let albums = vec![album(1, 9), album(2, 9)];
        let best = user_with_most_albums(&albums, &users()).unwrap();
        assert_eq!(best.user_id, 9);
        assert!(best.user.is_none());
        assert!(user_with_most_albums(&[], &users()).is_none());
    }

    #[test]
    fn test_avg_albums_per_user() {
        assert!((avg_albums_per_user(&albums(), &users()) - 1.25).abs() < f64::EPSILON);
        assert!((avg_albums_per_user(&albums(), &[]) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inactive_users() {
        let comments = vec![comment(1, "NATHAN@yesenia.net", "hi")];
        let inactive = inactive_users(&users(), &albums(), &comments);
        let ids: Vec<u64> = inactive.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![4]);
    }
}
