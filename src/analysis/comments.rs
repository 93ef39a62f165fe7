//! Comment reports: top commenters, duplicates, keyword hits, share per
//! author and the busiest city.

use super::{email_index, first_max, tally};
use crate::models::{Comment, User};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Comment count for one email address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCommenter {
    /// The address as written on its first comment.
    pub email: String,
    pub count: usize,
    /// The registered user with this email, if any.
    pub user: Option<User>,
}

/// A comment repeating an earlier one's author and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateComment {
    pub original: Comment,
    pub duplicate: Comment,
}

/// A comment with its resolved author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub comment: Comment,
    pub user: Option<User>,
}

/// One author's share of all comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentShare {
    /// `None` pools every comment whose email matches no user.
    pub user_id: Option<u64>,
    pub count: usize,
    pub percent: f64,
}

/// Comment shares, largest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentProportions {
    pub total: usize,
    pub breakdown: Vec<CommentShare>,
}

/// A city and the number of comments written by its residents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityCount {
    pub city: String,
    pub count: usize,
}

/// The `n` most active comment authors, grouped by case-insensitive email.
pub fn top_commenters(comments: &[Comment], users: &[User], n: usize) -> Vec<TopCommenter> {
    let mut display: HashMap<String, &str> = HashMap::new();
    for c in comments {
        display.entry(c.email.to_lowercase()).or_insert(c.email.as_str());
    }

    let by_email = email_index(users);
    let mut ranked: Vec<TopCommenter> = tally(comments.iter().map(|c| c.email.to_lowercase()))
        .into_iter()
        .map(|(key, count)| TopCommenter {
            email: display.get(&key).map(|e| e.to_string()).unwrap_or_default(),
            count,
            user: by_email.get(&key).map(|u| (*u).clone()),
        })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Pairs of comments with the same trimmed, case-folded email and body.
/// Each repeat is paired with the first occurrence.
pub fn duplicate_comments(comments: &[Comment]) -> Vec<DuplicateComment> {
    let mut seen: HashMap<String, &Comment> = HashMap::new();
    let mut duplicates = Vec::new();

    for c in comments {
        let key = format!(
            "{}|{}",
            c.email.trim().to_lowercase(),
            c.body.trim().to_lowercase()
        );
        match seen.get(&key) {
            Some(original) => duplicates.push(DuplicateComment {
                original: (*original).clone(),
                duplicate: c.clone(),
            }),
            None => {
                seen.insert(key, c);
            }
        }
    }

    duplicates
}

/// Comments whose body contains `keyword`, ignoring case.
pub fn comments_containing_keyword(comments: &[Comment], keyword: &str) -> Vec<Comment> {
    let keyword = keyword.to_lowercase();
    comments
        .iter()
        .filter(|c| c.body.to_lowercase().contains(&keyword))
        .cloned()
        .collect()
}

/// Attach the registered author to every comment.
pub fn map_comments_to_users(comments: &[Comment], users: &[User]) -> Vec<CommentAuthor> {
    let by_email = email_index(users);
    comments
        .iter()
        .map(|c| CommentAuthor {
            comment: c.clone(),
            user: by_email.get(&c.email.to_lowercase()).map(|u| (*u).clone()),
        })
        .collect()
}

/// Share of comments per registered author, with unregistered authors
/// pooled together.
pub fn comment_proportions(comments: &[Comment], users: &[User]) -> CommentProportions {
    let by_email = email_index(users);
    let divisor = comments.len().max(1) as f64;

    let mut per_user: BTreeMap<u64, usize> = BTreeMap::new();
    let mut external = 0usize;
    for c in comments {
        match by_email.get(&c.email.to_lowercase()) {
            Some(user) => *per_user.entry(user.id).or_default() += 1,
            None => external += 1,
        }
    }

    let mut breakdown: Vec<CommentShare> = per_user
        .into_iter()
        .map(|(id, count)| (Some(id), count))
        .chain((external > 0).then_some((None, external)))
        .map(|(user_id, count)| CommentShare {
            user_id,
            count,
            percent: count as f64 / divisor * 100.0,
        })
        .collect();
    breakdown.sort_by(|a, b| b.count.cmp(&a.count));

    CommentProportions {
        total: comments.len(),
        breakdown,
    }
}

/// The city whose registered residents wrote the most comments.
pub fn city_with_most_comments(comments: &[Comment], users: &[User]) -> Option<CityCount> {
    let city_by_email: HashMap<String, &str> = users
        .iter()
        .filter_map(|u| u.city().map(|city| (u.email.to_lowercase(), city)))
        .collect();

    let counts = tally(
        comments
            .iter()
            .filter_map(|c| city_by_email.get(&c.email.to_lowercase()).copied()),
    );
    first_max(counts).map(|(city, count)| CityCount {
        city: city.to_string(),
        count,
    })
}
