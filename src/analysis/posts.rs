//! Post reports built on the author index.

use super::tally;
use crate::dataset::PostIndex;
use crate::models::{word_matcher, Post, User};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A user and how many posts they wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPostCount {
    pub user: User,
    pub count: usize,
}

/// A user's share of all posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostShare {
    pub user: User,
    pub count: usize,
    pub percent: f64,
}

/// Posting average of the residents of one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityAverage {
    pub city: String,
    pub avg_posts: f64,
    pub user_count: usize,
    pub total_posts: usize,
}

pub fn posts_by_user(index: &PostIndex, user_id: u64) -> Vec<Post> {
    index.posts_of(user_id).to_vec()
}

/// Every user's posts keyed by user id. Users without posts map to an
/// empty list.
pub fn user_posts_map(users: &[User], index: &PostIndex) -> BTreeMap<u64, Vec<Post>> {
    users
        .iter()
        .map(|u| (u.id, index.posts_of(u.id).to_vec()))
        .collect()
}

/// Users ranked by post count, most prolific first.
pub fn top_users_by_post_count(users: &[User], index: &PostIndex, n: usize) -> Vec<UserPostCount> {
    let mut ranked: Vec<UserPostCount> = users
        .iter()
        .map(|u| UserPostCount {
            user: u.clone(),
            count: index.count_of(u.id),
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Posts containing `keyword` as a whole word in the title or body.
pub fn search_posts_by_keyword(posts: &[Post], keyword: &str) -> Vec<Post> {
    let Some(matcher) = word_matcher(keyword) else {
        return Vec::new();
    };
    posts
        .iter()
        .filter(|p| p.matches(&matcher))
        .cloned()
        .collect()
}

pub fn users_without_posts(users: &[User], index: &PostIndex) -> Vec<User> {
    users
        .iter()
        .filter(|u| index.count_of(u.id) == 0)
        .cloned()
        .collect()
}

/// Each user's share of the post total, most prolific first.
pub fn post_proportions(users: &[User], posts: &[Post], index: &PostIndex) -> Vec<PostShare> {
    let divisor = posts.len().max(1) as f64;
    let mut shares: Vec<PostShare> = users
        .iter()
        .map(|u| {
            let count = index.count_of(u.id);
            PostShare {
                user: u.clone(),
                count,
                percent: count as f64 / divisor * 100.0,
            }
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

/// The city whose residents post the most on average. Users without a
/// city are grouped under `Unknown`.
pub fn city_with_highest_average_posts(users: &[User], index: &PostIndex) -> Option<CityAverage> {
    let city_of = |u: &User| u.city().unwrap_or("Unknown").to_string();

    let mut posts_per_city: HashMap<String, usize> = HashMap::new();
    for user in users {
        *posts_per_city.entry(city_of(user)).or_default() += index.count_of(user.id);
    }

    let mut best: Option<CityAverage> = None;
    for (city, user_count) in tally(users.iter().map(city_of)) {
        let total_posts = posts_per_city.get(&city).copied().unwrap_or(0);
        let avg_posts = total_posts as f64 / user_count as f64;
        if best.as_ref().map_or(true, |b| avg_posts > b.avg_posts) {
            best = Some(CityAverage {
                city,
                avg_posts,
                user_count,
                total_posts,
            });
        }
    }
    best
}
