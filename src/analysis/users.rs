//! User-centric reports: address completeness, companies, lookups and
//! duplicate detection.

use super::{first_max, tally};
use crate::models::User;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user whose address is missing one or more fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompleteAddress {
    pub user: User,
    pub missing: Vec<String>,
}

/// A company and how many users work there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyCount {
    pub company: String,
    pub count: usize,
}

/// Attribute filters for [`filter_users`]. Every provided field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCriteria {
    /// Substring of the company name, case-insensitive.
    pub company_name: Option<String>,
    /// Exact city, case-insensitive.
    pub city: Option<String>,
    /// Substring of the user's name, case-insensitive.
    pub name_includes: Option<String>,
}

impl UserCriteria {
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none() && self.city.is_none() && self.name_includes.is_none()
    }

    pub fn matches(&self, user: &User) -> bool {
        fn contains(haystack: Option<&str>, needle: &str) -> bool {
            haystack.map_or(false, |h| h.to_lowercase().contains(&needle.to_lowercase()))
        }

        if let Some(company) = &self.company_name {
            if !contains(user.company_name(), company) {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if !user.matches_city(city) {
                return false;
            }
        }
        if let Some(name) = &self.name_includes {
            if !contains(Some(&user.name), name) {
                return false;
            }
        }
        true
    }
}

/// Which attribute two users collide on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKind {
    Email,
    Username,
}

/// Identity of a user involved in a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: u64,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// A later user sharing an email or username with an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateUser {
    pub kind: DuplicateKind,
    /// The colliding value as written on the later user.
    pub value: String,
    pub first: UserRef,
    pub second: UserRef,
}

/// Users missing at least one address field, with the missing fields.
pub fn users_with_incomplete_addresses(users: &[User]) -> Vec<IncompleteAddress> {
    users
        .iter()
        .filter_map(|user| {
            let missing = user.address_incomplete_fields();
            (!missing.is_empty()).then(|| IncompleteAddress {
                user: user.clone(),
                missing: missing.into_iter().map(String::from).collect(),
            })
        })
        .collect()
}

/// The company employing the most users. Users without one count as
/// `UNKNOWN`.
pub fn company_with_most_users(users: &[User]) -> Option<CompanyCount> {
    let counts = tally(
        users
            .iter()
            .map(|u| u.company_name().unwrap_or("UNKNOWN").to_string()),
    );
    first_max(counts).map(|(company, count)| CompanyCount { company, count })
}

/// Users matching all of the given criteria.
pub fn filter_users(users: &[User], criteria: &UserCriteria) -> Vec<User> {
    filter_users_by(users, |u| criteria.matches(u))
}

/// Users accepted by an arbitrary predicate.
pub fn filter_users_by(users: &[User], predicate: impl Fn(&User) -> bool) -> Vec<User> {
    users.iter().filter(|u| predicate(*u)).cloned().collect()
}

/// First user whose email matches, ignoring case.
pub fn find_user_by_email<'a>(users: &'a [User], email: &str) -> Option<&'a User> {
    if email.trim().is_empty() {
        return None;
    }
    users.iter().find(|u| u.matches_email(email))
}

/// Users living in `city`, ignoring case.
pub fn find_users_by_city(users: &[User], city: &str) -> Vec<User> {
    filter_users_by(users, |u| u.matches_city(city))
}

/// Every user that repeats an earlier user's email or username.
pub fn find_duplicate_users(users: &[User]) -> Vec<DuplicateUser> {
    let mut by_email: HashMap<String, &User> = HashMap::new();
    let mut by_username: HashMap<String, &User> = HashMap::new();
    let mut duplicates = Vec::new();

    for user in users {
        match by_email.get(&user.email.to_lowercase()) {
            Some(first) => duplicates.push(DuplicateUser {
                kind: DuplicateKind::Email,
                value: user.email.clone(),
                first: UserRef::from(*first),
                second: UserRef::from(user),
            }),
            None => {
                by_email.insert(user.email.to_lowercase(), user);
            }
        }

        match by_username.get(&user.username.to_lowercase()) {
            Some(first) => duplicates.push(DuplicateUser {
                kind: DuplicateKind::Username,
                value: user.username.clone(),
                first: UserRef::from(*first),
                second: UserRef::from(user),
            }),
            None => {
                by_username.insert(user.username.to_lowercase(), user);
            }
        }
    }

    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::user;

    fn sample() -> Vec<User> {
        vec![
            user(1, "bret", "sincere@april.biz", Some("Gwenborough"), Some("Romaguera-Crona")),
            user(2, "antonette", "shanna@melissa.tv", Some("Wisokyburgh"), Some("Deckow-Crist")),
            user(
                3,
                "samantha",
                "nathan@yesenia.net",
                Some("McKenziehaven"),
                Some("Romaguera-Jacobson"),
            ),
            user(4, "karianne", "julianne@kory.org", None, Some("Deckow-Crist")),
            user(5, "kamren", "lucio@annie.ca", Some("gwenborough"), None),
        ]
    }

    #[test]
    fn test_users_with_incomplete_addresses() {
        let mut users = sample();
        if let Some(address) = users[1].address.as_mut() {
            address.suite = None;
            address.zipcode = Some(" ".to_string());
        }

        let incomplete = users_with_incomplete_addresses(&users);
        assert_eq!(incomplete.len(), 2);
        assert_eq!(incomplete[0].user.id, 2);
        assert_eq!(incomplete[0].missing, vec!["suite", "zipcode"]);
        assert_eq!(incomplete[1].user.id, 4);
        assert_eq!(incomplete[1].missing, vec!["address"]);
    }

    #[test]
    fn test_company_with_most_users() {
        let best = company_with_most_users(&sample()).unwrap();
        assert_eq!(
            best,
            CompanyCount {
                company: "Deckow-Crist".to_string(),
                count: 2
            }
        );
        assert_eq!(company_with_most_users(&[]), None);
    }

    #[test]
    fn test_company_unknown_bucket() {
        let users = vec![
            user(1, "a", "a@x", None, None),
            user(2, "b", "b@x", None, None),
            user(3, "c", "c@x", None, Some("Acme")),
        ];
        let best = company_with_most_users(&users).unwrap();
        assert_eq!(best.company, "UNKNOWN");
        assert_eq!(best.count, 2);
    }

    #[test]
    fn test_filter_users_criteria() {
        let users = sample();

        let criteria = UserCriteria {
            company_name: Some("romaguera".to_string()),
            ..Default::default()
        };
        let ids: Vec<u64> = filter_users(&users, &criteria).iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let criteria = UserCriteria {
            company_name: Some("romaguera".to_string()),
            city: Some("GWENBOROUGH".to_string()),
            name_includes: Some("user 1".to_string()),
        };
        let ids: Vec<u64> = filter_users(&users, &criteria).iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![1]);

        assert!(UserCriteria::default().is_empty());
        assert_eq!(filter_users(&users, &UserCriteria::default()).len(), users.len());
    }

    #[test]
    fn test_filter_users_by_predicate() {
        let users = sample();
        let even = filter_users_by(&users, |u| u.id % 2 == 0);
        assert_eq!(even.len(), 2);
    }

    #[test]
    fn test_find_user_by_email() {
        let users = sample();
        assert_eq!(find_user_by_email(&users, "Shanna@Melissa.TV").map(|u| u.id), Some(2));
        assert!(find_user_by_email(&users, "nobody@example.com").is_none());
        assert!(find_user_by_email(&users, "  ").is_none());
    }

    #[test]
    fn test_find_users_by_city() {
        let ids: Vec<u64> = find_users_by_city(&sample(), "Gwenborough")
            .iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![1, 5]);
        assert!(find_users_by_city(&sample(), "").is_empty());
    }

    #[test]
    fn test_find_duplicate_users() {
        let mut users = sample();
        users.push(user(6, "BRET", "other@x.io", None, None));
        users.push(user(7, "unique", "SINCERE@april.biz", None, None));

        let dupes = find_duplicate_users(&users);
        assert_eq!(dupes.len(), 2);

        assert_eq!(dupes[0].kind, DuplicateKind::Username);
        assert_eq!(dupes[0].value, "BRET");
        assert_eq!(dupes[0].first.id, 1);
        assert_eq!(dupes[0].second.id, 6);

        assert_eq!(dupes[1].kind, DuplicateKind::Email);
        assert_eq!(dupes[1].first.id, 1);
        assert_eq!(dupes[1].second.id, 7);
    }

    #[test]
    fn test_no_duplicates() {
        assert!(find_duplicate_users(&sample()).is_empty());
    }
}
