//! Data models for the JSONPlaceholder datasets.
//!
//! Every record arrives as a loosely-typed JSON value. The `from_value`
//! constructors deserialize leniently and then check the required fields,
//! so a bad record is rejected on its own instead of failing the whole
//! payload.

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One of the REST collections the tool reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Users,
    Posts,
    Comments,
    Albums,
}

impl Resource {
    /// All resources, in the order they are reported.
    pub const ALL: [Resource; 4] = [
        Resource::Users,
        Resource::Posts,
        Resource::Comments,
        Resource::Albums,
    ];

    /// URL path below the API base.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Users => "/users",
            Resource::Posts => "/posts",
            Resource::Comments => "/comments",
            Resource::Albums => "/albums",
        }
    }

    /// File name used by the local source.
    pub fn file_name(&self) -> &'static str {
        match self {
            Resource::Users => "users.json",
            Resource::Posts => "posts.json",
            Resource::Comments => "comments.json",
            Resource::Albums => "albums.json",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Users => "users",
            Resource::Posts => "posts",
            Resource::Comments => "comments",
            Resource::Albums => "albums",
        };
        f.pad(name)
    }
}

/// Coerce a JSON id into a positive integer.
///
/// Numbers and numeric strings (`"3"`, `"3.0"`, `"1e1"`) are accepted; zero,
/// negatives, fractions and anything else count as missing.
pub fn coerce_id(value: Option<&Value>) -> Option<u64> {
    let id = match value? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(integral))?,
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))?
        }
        _ => return None,
    };
    (id != 0).then_some(id)
}

fn integral(f: f64) -> Option<u64> {
    (f.fract() == 0.0 && f > 0.0 && f <= u64::MAX as f64).then(|| f as u64)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

fn require_object(value: &Value) -> Result<(), ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ValidationError::NotAnObject)
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T, ValidationError> {
    T::deserialize(value).map_err(|e| ValidationError::Malformed(e.to_string()))
}

/// Geographic coordinates attached to an address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lng: Option<String>,
}

/// Postal address of a user. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub suite: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

/// Employer of a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catch_phrase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bs: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    company: Option<Company>,
}

/// A validated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

impl User {
    /// Validate a raw user.
    ///
    /// `id`, `name`, `username` and `email` are always required. In strict
    /// mode the address must carry a street, city and zipcode, and the
    /// company must carry a name.
    pub fn from_value(value: &Value, strict: bool) -> Result<Self, ValidationError> {
        require_object(value)?;
        let raw: RawUser = decode(value)?;

        let mut missing = Vec::new();
        let id = coerce_id(raw.id.as_ref());
        if id.is_none() {
            missing.push("id".to_string());
        }
        for (field, v) in [
            ("name", &raw.name),
            ("username", &raw.username),
            ("email", &raw.email),
        ] {
            if is_blank(v) {
                missing.push(field.to_string());
            }
        }

        if strict {
            match &raw.address {
                None => missing.push("address".to_string()),
                Some(address) => {
                    for (field, v) in [
                        ("address.street", &address.street),
                        ("address.city", &address.city),
                        ("address.zipcode", &address.zipcode),
                    ] {
                        if is_blank(v) {
                            missing.push(field.to_string());
                        }
                    }
                }
            }
            if raw.company.as_ref().map_or(true, |c| is_blank(&c.name)) {
                missing.push("company.name".to_string());
            }
        }

        match id {
            Some(id) if missing.is_empty() => Ok(Self {
                id,
                name: raw.name.unwrap_or_default(),
                username: raw.username.unwrap_or_default(),
                email: raw.email.unwrap_or_default(),
                phone: raw.phone,
                website: raw.website,
                address: raw.address,
                company: raw.company,
            }),
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }

    /// Address fields that are missing or blank.
    ///
    /// Returns `["address"]` when the user has no address at all.
    pub fn address_incomplete_fields(&self) -> Vec<&'static str> {
        let Some(address) = &self.address else {
            return vec!["address"];
        };
        [
            ("street", &address.street),
            ("suite", &address.suite),
            ("city", &address.city),
            ("zipcode", &address.zipcode),
        ]
        .into_iter()
        .filter(|(_, v)| is_blank(v))
        .map(|(field, _)| field)
        .collect()
    }

    /// City of the user's address, if any.
    pub fn city(&self) -> Option<&str> {
        self.address
            .as_ref()
            .and_then(|a| a.city.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    /// Name of the user's company, if any.
    pub fn company_name(&self) -> Option<&str> {
        self.company
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|n| !n.trim().is_empty())
    }

    /// Case-insensitive email comparison.
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    /// Case-insensitive city comparison. A blank query never matches.
    pub fn matches_city(&self, city: &str) -> bool {
        if city.is_empty() {
            return false;
        }
        self.city().unwrap_or("").to_lowercase() == city.to_lowercase()
    }

    pub fn short(&self) -> String {
        format!("{}#{}", self.username, self.id)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User({}): {} ({}) <{}> - {}",
            self.id,
            self.name,
            self.username,
            self.email,
            self.city().unwrap_or("N/A")
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPost {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// A validated post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub body: String,
}

impl Post {
    /// Validate a raw post. `title` must not be blank; `body` must be present.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        require_object(value)?;
        let raw: RawPost = decode(value)?;

        let id = coerce_id(raw.id.as_ref());
        let user_id = coerce_id(raw.user_id.as_ref());

        let mut missing = Vec::new();
        if user_id.is_none() {
            missing.push("userId".to_string());
        }
        if id.is_none() {
            missing.push("id".to_string());
        }
        if is_blank(&raw.title) {
            missing.push("title".to_string());
        }
        if raw.body.is_none() {
            missing.push("body".to_string());
        }

        match (id, user_id) {
            (Some(id), Some(user_id)) if missing.is_empty() => Ok(Self {
                id,
                user_id,
                title: raw.title.unwrap_or_default(),
                body: raw.body.unwrap_or_default(),
            }),
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }

    /// Whole-word, case-insensitive match against the title or the body.
    #[allow(dead_code)] // Convenience wrapper over `matches`
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        word_matcher(keyword).map_or(false, |re| self.matches(&re))
    }

    /// Match against a matcher built by [`word_matcher`].
    pub fn matches(&self, matcher: &Regex) -> bool {
        matcher.is_match(&self.title) || matcher.is_match(&self.body)
    }

    /// One-line summary with the body cut at 80 characters.
    pub fn summary(&self) -> String {
        let short_body = if self.body.chars().count() > 80 {
            let cut: String = self.body.chars().take(80).collect();
            format!("{}…", cut)
        } else {
            self.body.clone()
        };
        format!("Post({}) \"{}\" - {}", self.id, self.title, short_body)
    }

    pub fn short(&self) -> String {
        format!("{}@{}: {}", self.id, self.user_id, self.title)
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Post({}) by {}: {}\nBody: {}",
            self.id, self.user_id, self.title, self.body
        )
    }
}

/// Build a case-insensitive whole-word matcher. Blank keywords yield `None`.
pub fn word_matcher(keyword: &str) -> Option<Regex> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return None;
    }
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))).ok()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComment {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    post_id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// A validated comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub body: String,
}

impl Comment {
    /// Validate a raw comment. `id`, `email` and `body` are required.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        require_object(value)?;
        let raw: RawComment = decode(value)?;

        let id = coerce_id(raw.id.as_ref());
        let mut missing = Vec::new();
        if id.is_none() {
            missing.push("id".to_string());
        }
        if is_blank(&raw.email) {
            missing.push("email".to_string());
        }
        if is_blank(&raw.body) {
            missing.push("body".to_string());
        }

        match id {
            Some(id) if missing.is_empty() => Ok(Self {
                id,
                post_id: coerce_id(raw.post_id.as_ref()),
                name: raw.name,
                email: raw.email.unwrap_or_default(),
                body: raw.body.unwrap_or_default(),
            }),
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAlbum {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
}

/// A validated album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: u64,
    pub user_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Album {
    /// Validate a raw album. `id` and `userId` are required.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        require_object(value)?;
        let raw: RawAlbum = decode(value)?;

        let id = coerce_id(raw.id.as_ref());
        let user_id = coerce_id(raw.user_id.as_ref());

        match (id, user_id) {
            (Some(id), Some(user_id)) => Ok(Self {
                id,
                user_id,
                title: raw.title,
            }),
            _ => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push("id".to_string());
                }
                if user_id.is_none() {
                    missing.push("userId".to_string());
                }
                Err(ValidationError::MissingFields(missing))
            }
        }
    }
}

/// A record that failed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejected {
    pub resource: Resource,
    /// The coerced id, when the record had a usable one.
    pub id: Option<u64>,
    pub reasons: Vec<String>,
}

impl Rejected {
    pub fn new(resource: Resource, value: &Value, error: &ValidationError) -> Self {
        Self {
            resource,
            id: coerce_id(value.get("id")),
            reasons: error.reasons(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> Value {
        json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": {
                "street": "Kulas Light",
                "suite": "Apt. 556",
                "city": "Gwenborough",
                "zipcode": "92998-3874",
                "geo": { "lat": "-37.3159", "lng": "81.1496" }
            },
            "phone": "1-770-736-8031 x56442",
            "website": "hildegard.org",
            "company": {
                "name": "Romaguera-Crona",
                "catchPhrase": "Multi-layered client-server neural-net",
                "bs": "harness real-time e-markets"
            }
        })
    }

    #[test]
    fn test_coerce_id() {
        assert_eq!(coerce_id(Some(&json!(7))), Some(7));
        assert_eq!(coerce_id(Some(&json!("12"))), Some(12));
        assert_eq!(coerce_id(Some(&json!(3.0))), Some(3));
        assert_eq!(coerce_id(Some(&json!(0))), None);
        assert_eq!(coerce_id(Some(&json!(-4))), None);
        assert_eq!(coerce_id(Some(&json!("abc"))), None);
        assert_eq!(coerce_id(Some(&json!("3.0"))), Some(3));
        assert_eq!(coerce_id(Some(&json!(" 1e1 "))), Some(10));
        assert_eq!(coerce_id(Some(&json!("2.5"))), None);
        assert_eq!(coerce_id(Some(&json!("-1"))), None);
        assert_eq!(coerce_id(Some(&json!("inf"))), None);
        assert_eq!(coerce_id(Some(&json!("NaN"))), None);
        assert_eq!(coerce_id(Some(&json!(null))), None);
        assert_eq!(coerce_id(None), None);
    }

    #[test]
    fn test_valid_user() {
        let user = User::from_value(&sample_user(), true).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.username, "Bret");
        assert_eq!(user.city(), Some("Gwenborough"));
        assert_eq!(user.company_name(), Some("Romaguera-Crona"));
        assert!(user.address_incomplete_fields().is_empty());
    }

    #[test]
    fn test_strict_user_requires_address_and_company() {
        let mut raw = sample_user();
        raw["address"]["city"] = json!("");
        raw.as_object_mut().unwrap().remove("company");

        let err = User::from_value(&raw, true).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![
                "address.city".to_string(),
                "company.name".to_string()
            ])
        );

        // Lenient mode only needs the identity fields.
        let user = User::from_value(&raw, false).unwrap();
        assert_eq!(user.address_incomplete_fields(), vec!["city"]);
        assert_eq!(user.company_name(), None);
    }

    #[test]
    fn test_user_missing_identity_fields() {
        let raw = json!({ "id": 0, "name": "  ", "username": "x" });
        let err = User::from_value(&raw, false).unwrap_err();
        assert_eq!(err.reasons(), vec!["id", "name", "email"]);
    }

    #[test]
    fn test_user_not_an_object() {
        assert_eq!(
            User::from_value(&json!([1, 2]), false).unwrap_err(),
            ValidationError::NotAnObject
        );
    }

    #[test]
    fn test_user_wrong_type_is_malformed() {
        let raw = json!({ "id": 1, "name": 42, "username": "u", "email": "e@x" });
        assert!(matches!(
            User::from_value(&raw, false),
            Err(ValidationError::Malformed(_))
        ));
    }

    #[test]
    fn test_user_without_address() {
        let raw = json!({ "id": 2, "name": "A", "username": "a", "email": "a@b.c" });
        let user = User::from_value(&raw, false).unwrap();
        assert_eq!(user.address_incomplete_fields(), vec!["address"]);
        assert_eq!(user.to_string(), "User(2): A (a) <a@b.c> - N/A");
        assert_eq!(user.short(), "a#2");
    }

    #[test]
    fn test_user_matching() {
        let user = User::from_value(&sample_user(), true).unwrap();
        assert!(user.matches_email("sincere@APRIL.biz"));
        assert!(user.matches_city("gwenborough"));
        assert!(!user.matches_city(""));
    }

    #[test]
    fn test_post_validation() {
        let post = Post::from_value(&json!({
            "userId": "3", "id": 21, "title": "asperiores ea ipsam", "body": ""
        }))
        .unwrap();
        assert_eq!(post.user_id, 3);
        assert_eq!(post.short(), "21@3: asperiores ea ipsam");
        assert_eq!(post.to_string(), "Post(21) by 3: asperiores ea ipsam\nBody: ");

        let err = Post::from_value(&json!({ "userId": 1, "id": 2, "title": "   " })).unwrap_err();
        assert_eq!(err.reasons(), vec!["title", "body"]);
    }

    #[test]
    fn test_post_display() {
        let post = Post {
            id: 1,
            user_id: 1,
            title: "sunt aut facere".to_string(),
            body: "quia et suscipit".to_string(),
        };
        assert_eq!(
            post.to_string(),
            "Post(1) by 1: sunt aut facere\nBody: quia et suscipit"
        );
    }

    #[test]
    fn test_post_contains_keyword_whole_word() {
        let post = Post {
            id: 1,
            user_id: 1,
            title: "Quia et suscipit".to_string(),
            body: "quis nostrum".to_string(),
        };
        assert!(post.contains_keyword("QUIA"));
        assert!(post.contains_keyword(" suscipit "));
        assert!(!post.contains_keyword("qui"));
        assert!(!post.contains_keyword(""));
    }

    #[test]
    fn test_post_keyword_is_escaped() {
        let post = Post {
            id: 1,
            user_id: 1,
            title: "cost (approx)".to_string(),
            body: String::new(),
        };
        assert!(post.contains_keyword("approx"));
        assert!(!post.contains_keyword("a.prox"));
    }

    #[test]
    fn test_post_summary_truncates() {
        let post = Post {
            id: 5,
            user_id: 1,
            title: "t".to_string(),
            body: "x".repeat(100),
        };
        let summary = post.summary();
        assert!(summary.ends_with('…'));
        assert_eq!(summary, format!("Post(5) \"t\" - {}…", "x".repeat(80)));
    }

    #[test]
    fn test_comment_validation() {
        let comment = Comment::from_value(&json!({
            "postId": 1,
            "id": 1,
            "name": "id labore",
            "email": "Eliseo@gardner.biz",
            "body": "laudantium"
        }))
        .unwrap();
        assert_eq!(comment.post_id, Some(1));

        let err = Comment::from_value(&json!({ "id": 9, "email": "" })).unwrap_err();
        assert_eq!(err.reasons(), vec!["email", "body"]);
    }

    #[test]
    fn test_album_validation() {
        let album = Album::from_value(&json!({ "userId": 1, "id": 1, "title": "quidem" })).unwrap();
        assert_eq!(album.title.as_deref(), Some("quidem"));

        let err = Album::from_value(&json!({ "id": 4 })).unwrap_err();
        assert_eq!(err.reasons(), vec!["userId"]);
    }

    #[test]
    fn test_rejected_keeps_coerced_id() {
        let raw = json!({ "id": "17" });
        let err = Album::from_value(&raw).unwrap_err();
        let rejected = Rejected::new(Resource::Albums, &raw, &err);
        assert_eq!(rejected.id, Some(17));
        assert_eq!(rejected.resource, Resource::Albums);
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(Resource::Comments.path(), "/comments");
        assert_eq!(Resource::Albums.file_name(), "albums.json");
        assert_eq!(Resource::Users.to_string(), "users");
        assert_eq!(format!("[{:<6}]", Resource::Posts), "[posts ]");
    }
}
