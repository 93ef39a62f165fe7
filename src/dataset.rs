//! Loading the four collections and splitting valid from invalid records.

use crate::error::{FetchError, ValidationError};
use crate::models::{Album, Comment, Post, Rejected, Resource, User};
use crate::source::DataSource;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Options for [`load_dataset`].
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Require complete address and company on users.
    pub strict_users: bool,
    /// Show a spinner while downloading.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            strict_users: true,
            show_progress: true,
        }
    }
}

/// Valid and invalid counts for one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounts {
    pub valid: usize,
    pub invalid: usize,
}

/// Per-resource validation outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub users: ResourceCounts,
    pub posts: ResourceCounts,
    pub comments: ResourceCounts,
    pub albums: ResourceCounts,
}

impl ValidationSummary {
    pub fn total_invalid(&self) -> usize {
        self.users.invalid + self.posts.invalid + self.comments.invalid + self.albums.invalid
    }

    pub fn get(&self, resource: Resource) -> ResourceCounts {
        match resource {
            Resource::Users => self.users,
            Resource::Posts => self.posts,
            Resource::Comments => self.comments,
            Resource::Albums => self.albums,
        }
    }
}

/// Everything that survived validation, plus what didn't.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub albums: Vec<Album>,
    pub rejected: Vec<Rejected>,
}

impl Dataset {
    /// Validate raw payloads into a dataset.
    pub fn from_raw(
        users: &[Value],
        posts: &[Value],
        comments: &[Value],
        albums: &[Value],
        strict_users: bool,
    ) -> Self {
        let mut rejected = Vec::new();

        let users = split(Resource::Users, users, &mut rejected, |v| {
            User::from_value(v, strict_users)
        });
        let posts = split(Resource::Posts, posts, &mut rejected, Post::from_value);
        let comments = split(Resource::Comments, comments, &mut rejected, Comment::from_value);
        let albums = split(Resource::Albums, albums, &mut rejected, Album::from_value);

        Self {
            users,
            posts,
            comments,
            albums,
            rejected,
        }
    }

    pub fn validation_summary(&self) -> ValidationSummary {
        let invalid = |resource: Resource| {
            self.rejected
                .iter()
                .filter(|r| r.resource == resource)
                .count()
        };

        ValidationSummary {
            users: ResourceCounts {
                valid: self.users.len(),
                invalid: invalid(Resource::Users),
            },
            posts: ResourceCounts {
                valid: self.posts.len(),
                invalid: invalid(Resource::Posts),
            },
            comments: ResourceCounts {
                valid: self.comments.len(),
                invalid: invalid(Resource::Comments),
            },
            albums: ResourceCounts {
                valid: self.albums.len(),
                invalid: invalid(Resource::Albums),
            },
        }
    }
}

fn split<T>(
    resource: Resource,
    raw: &[Value],
    rejected: &mut Vec<Rejected>,
    validate: impl Fn(&Value) -> Result<T, ValidationError>,
) -> Vec<T> {
    let mut valid = Vec::with_capacity(raw.len());
    for value in raw {
        match validate(value) {
            Ok(record) => valid.push(record),
            Err(e) => {
                let entry = Rejected::new(resource, value, &e);
                match entry.id {
                    Some(id) => warn!("Discarding invalid {} record id:{}: {}", resource, id, e),
                    None => warn!("Discarding invalid {} record: {}", resource, e),
                }
                rejected.push(entry);
            }
        }
    }
    debug!("{}: {} valid of {}", resource, valid.len(), raw.len());
    valid
}

/// Fetch all four resources in parallel and validate them.
pub async fn load_dataset(
    source: &DataSource,
    options: LoadOptions,
) -> Result<Dataset, FetchError> {
    info!("Loading datasets from {}", source.describe());

    let spinner = options.show_progress.then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Fetching users, posts, comments and albums...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let fetched = futures::try_join!(
        source.fetch_raw(Resource::Users),
        source.fetch_raw(Resource::Posts),
        source.fetch_raw(Resource::Comments),
        source.fetch_raw(Resource::Albums),
    );

    if let Some(pb) = &spinner {
        match &fetched {
            Ok(_) => pb.finish_with_message("Datasets loaded"),
            Err(_) => pb.abandon_with_message("Fetch failed"),
        }
    }

    let (users, posts, comments, albums) = fetched?;
    let dataset = Dataset::from_raw(&users, &posts, &comments, &albums, options.strict_users);

    info!(
        "Loaded {} users, {} posts, {} comments, {} albums ({} rejected)",
        dataset.users.len(),
        dataset.posts.len(),
        dataset.comments.len(),
        dataset.albums.len(),
        dataset.rejected.len()
    );

    Ok(dataset)
}

/// Posts grouped by author, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct PostIndex {
    by_user: HashMap<u64, Vec<Post>>,
}

impl PostIndex {
    pub fn build(posts: &[Post]) -> Self {
        let mut by_user: HashMap<u64, Vec<Post>> = HashMap::new();
        for post in posts {
            by_user.entry(post.user_id).or_default().push(post.clone());
        }
        Self { by_user }
    }

    /// Posts written by `user_id`; empty when there are none.
    pub fn posts_of(&self, user_id: u64) -> &[Post] {
        self.by_user
            .get(&user_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count_of(&self, user_id: u64) -> usize {
        self.posts_of(user_id).len()
    }
}
