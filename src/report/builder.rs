//! Running every analysis and collecting the results into one report.

use crate::analysis::{
    self, CityAverage, CityCount, CommentProportions, CompanyCount, DuplicateComment,
    DuplicateUser, IncompleteAddress, MostAlbums, PostShare, TopCommenter, UserCriteria,
    UserPostCount, UserRef,
};
use crate::dataset::{Dataset, PostIndex, ValidationSummary};
use crate::models::{Album, Post, Rejected, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Parameters for the individual analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Where the data came from.
    pub source: String,
    pub top_n: usize,
    /// Substring searched in comment bodies.
    pub comment_keyword: String,
    /// Whole word searched in post titles and bodies.
    pub post_keyword: String,
    /// Email of the user whose posts are listed.
    pub lookup_email: String,
    pub criteria: UserCriteria,
    pub page_size: usize,
    /// 1-based page of post keyword results to include.
    pub page: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            source: String::new(),
            top_n: 5,
            comment_keyword: "dolor".to_string(),
            post_keyword: "qui".to_string(),
            lookup_email: "Sincere@april.biz".to_string(),
            criteria: UserCriteria::default(),
            page_size: 10,
            page: 1,
        }
    }
}

/// Metadata about the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub duration_seconds: f64,
}

/// Validation outcome with the rejected records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSection {
    pub summary: ValidationSummary,
    pub rejected: Vec<Rejected>,
}

/// Users matching the requested criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    pub criteria: UserCriteria,
    pub matches: Vec<UserRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSection {
    pub incomplete_addresses: Vec<IncompleteAddress>,
    pub top_company: Option<CompanyCount>,
    pub duplicates: Vec<DuplicateUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentSection {
    pub top_commenters: Vec<TopCommenter>,
    /// Comments whose email belongs to a registered user.
    pub registered_comments: usize,
    pub duplicates: Vec<DuplicateComment>,
    pub keyword: String,
    pub keyword_matches: usize,
    pub proportions: CommentProportions,
    pub busiest_city: Option<CityCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlbumSection {
    pub most_albums: Option<MostAlbums>,
    pub avg_albums_per_user: f64,
    pub inactive_users: Vec<UserRef>,
}

/// One page of post keyword hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordPage {
    pub keyword: String,
    pub total: usize,
    pub page: usize,
    pub pages: usize,
    pub posts: Vec<Post>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSection {
    /// Post count for every user id.
    pub post_counts: BTreeMap<u64, usize>,
    pub top_users: Vec<UserPostCount>,
    pub keyword_results: KeywordPage,
    pub users_without_posts: Vec<UserRef>,
    pub proportions: Vec<PostShare>,
    pub top_city: Option<CityAverage>,
}

/// A user looked up by email with their posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupSection {
    pub email: String,
    pub user: Option<User>,
    pub posts: Vec<Post>,
    pub albums: Vec<Album>,
    /// Other users living in the same city.
    pub neighbors: Vec<UserRef>,
}

/// The complete analytics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub metadata: ReportMetadata,
    pub validation: ValidationSection,
    pub users: UserSection,
    pub comments: CommentSection,
    pub albums: AlbumSection,
    pub posts: PostSection,
    pub lookup: LookupSection,
}

/// Run every analysis over `dataset`.
pub fn build_report(
    dataset: &Dataset,
    options: &ReportOptions,
    duration_seconds: f64,
) -> AnalyticsReport {
    let Dataset {
        users,
        posts,
        comments,
        albums,
        rejected,
    } = dataset;
    let index = PostIndex::build(posts);

    debug!("Building report with options: {:?}", options);

    let filter = (!options.criteria.is_empty()).then(|| FilterResult {
        criteria: options.criteria.clone(),
        matches: analysis::filter_users(users, &options.criteria)
            .iter()
            .map(UserRef::from)
            .collect(),
    });

    let users_section = UserSection {
        incomplete_addresses: analysis::users_with_incomplete_addresses(users),
        top_company: analysis::company_with_most_users(users),
        duplicates: analysis::find_duplicate_users(users),
        filter,
    };

    let comments_section = CommentSection {
        top_commenters: analysis::top_commenters(comments, users, options.top_n),
        registered_comments: analysis::map_comments_to_users(comments, users)
            .iter()
            .filter(|c| c.user.is_some())
            .count(),
        duplicates: analysis::duplicate_comments(comments),
        keyword: options.comment_keyword.clone(),
        keyword_matches: analysis::comments_containing_keyword(
            comments,
            &options.comment_keyword,
        )
        .len(),
        proportions: analysis::comment_proportions(comments, users),
        busiest_city: analysis::city_with_most_comments(comments, users),
    };

    let albums_section = AlbumSection {
        most_albums: analysis::user_with_most_albums(albums, users),
        avg_albums_per_user: analysis::avg_albums_per_user(albums, users),
        inactive_users: analysis::inactive_users(users, albums, comments)
            .iter()
            .map(UserRef::from)
            .collect(),
    };

    let hits = analysis::search_posts_by_keyword(posts, &options.post_keyword);
    let pages: Vec<&[Post]> = analysis::paginate(&hits, options.page_size).collect();
    let keyword_results = KeywordPage {
        keyword: options.post_keyword.clone(),
        total: hits.len(),
        page: options.page,
        pages: pages.len(),
        posts: pages
            .get(options.page.saturating_sub(1))
            .map(|p| p.to_vec())
            .unwrap_or_default(),
    };

    let posts_section = PostSection {
        post_counts: analysis::user_posts_map(users, &index)
            .into_iter()
            .map(|(id, posts)| (id, posts.len()))
            .collect(),
        top_users: analysis::top_users_by_post_count(users, &index, options.top_n),
        keyword_results,
        users_without_posts: analysis::users_without_posts(users, &index)
            .iter()
            .map(UserRef::from)
            .collect(),
        proportions: analysis::post_proportions(users, posts, &index),
        top_city: analysis::city_with_highest_average_posts(users, &index),
    };

    let found = analysis::find_user_by_email(users, &options.lookup_email).cloned();
    let lookup = match found {
        Some(user) => LookupSection {
            email: options.lookup_email.clone(),
            posts: analysis::posts_by_user(&index, user.id),
            albums: analysis::albums_of_user(albums, user.id),
            neighbors: user
                .city()
                .map(|city| analysis::find_users_by_city(users, city))
                .unwrap_or_default()
                .iter()
                .filter(|u| u.id != user.id)
                .map(UserRef::from)
                .collect(),
            user: Some(user),
        },
        None => LookupSection {
            email: options.lookup_email.clone(),
            user: None,
            posts: Vec::new(),
            albums: Vec::new(),
            neighbors: Vec::new(),
        },
    };

    AnalyticsReport {
        metadata: ReportMetadata {
            source: options.source.clone(),
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            duration_seconds,
        },
        validation: ValidationSection {
            summary: dataset.validation_summary(),
            rejected: rejected.clone(),
        },
        users: users_section,
        comments: comments_section,
        albums: albums_section,
        posts: posts_section,
        lookup,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::analysis::fixtures::{album, comment, post, user};
    use crate::models::Resource;

    pub fn sample_dataset() -> Dataset {
        Dataset {
            users: vec![
                user(1, "Bret", "Sincere@april.biz", Some("Gwenborough"), Some("Romaguera-Crona")),
                user(
                    2,
                    "Antonette",
                    "Shanna@melissa.tv",
                    Some("Wisokyburgh"),
                    Some("Deckow-Crist"),
                ),
                user(3, "Samantha", "Nathan@yesenia.net", None, Some("Deckow-Crist")),
            ],
            posts: vec![
                post(1, 1, "sunt aut facere", "quia et suscipit"),
                post(2, 1, "qui est esse", "est rerum tempore"),
                post(3, 2, "ea molestias quasi", "qui iusto"),
            ],
            comments: vec![
                comment(1, "Shanna@melissa.tv", "dolor sit"),
                comment(2, "shanna@melissa.tv", "dolor sit"),
                comment(3, "outsider@web.io", "laudantium"),
            ],
            albums: vec![album(1, 1), album(2, 1), album(3, 2)],
            rejected: vec![Rejected {
                resource: Resource::Comments,
                id: Some(99),
                reasons: vec!["email".to_string()],
            }],
        }
    }

    #[test]
    fn test_build_report_sections() {
        let dataset = sample_dataset();
        let options = ReportOptions {
            source: "fixture".to_string(),
            ..Default::default()
        };
        let report = build_report(&dataset, &options, 1.5);

        assert_eq!(report.metadata.source, "fixture");
        assert_eq!(report.validation.summary.comments.invalid, 1);
        assert_eq!(report.validation.rejected.len(), 1);

        assert_eq!(
            report.users.top_company.as_ref().map(|c| c.company.as_str()),
            Some("Deckow-Crist")
        );
        assert_eq!(report.users.incomplete_addresses.len(), 1);
        assert!(report.users.filter.is_none());

        assert_eq!(report.comments.top_commenters[0].count, 2);
        assert_eq!(report.comments.duplicates.len(), 1);
        assert_eq!(report.comments.keyword_matches, 2);
        assert_eq!(
            report.comments.busiest_city.as_ref().map(|c| c.city.as_str()),
            Some("Wisokyburgh")
        );

        assert_eq!(report.albums.most_albums.as_ref().map(|m| m.user_id), Some(1));
        assert!((report.albums.avg_albums_per_user - 1.0).abs() < 1e-9);
        let inactive: Vec<u64> = report.albums.inactive_users.iter().map(|u| u.id).collect();
        assert_eq!(inactive, vec![3]);

        assert_eq!(report.posts.keyword_results.total, 2);
        assert_eq!(report.posts.keyword_results.pages, 1);
        let without: Vec<u64> = report.posts.users_without_posts.iter().map(|u| u.id).collect();
        assert_eq!(without, vec![3]);

        assert_eq!(report.lookup.user.as_ref().map(|u| u.id), Some(1));
        assert_eq!(report.lookup.posts.len(), 2);
        assert_eq!(report.lookup.albums.len(), 2);
        assert!(report.lookup.neighbors.is_empty());

        assert_eq!(report.comments.registered_comments, 2);
        assert_eq!(report.posts.post_counts.get(&1), Some(&2));
        assert_eq!(report.posts.post_counts.get(&3), Some(&0));
    }

    #[test]
    fn test_build_report_paging_and_filter() {
        let dataset = sample_dataset();
        let options = ReportOptions {
            page_size: 1,
            page: 2,
            criteria: UserCriteria {
                company_name: Some("deckow".to_string()),
                ..Default::default()
            },
            lookup_email: "missing@nowhere.io".to_string(),
            ..Default::default()
        };
        let report = build_report(&dataset, &options, 0.0);

        let page = &report.posts.keyword_results;
        assert_eq!(page.pages, 2);
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].id, 3);

        let filter = report.users.filter.as_ref().unwrap();
        let ids: Vec<u64> = filter.matches.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 3]);

        assert!(report.lookup.user.is_none());
        assert!(report.lookup.posts.is_empty());
    }

    #[test]
    fn test_page_out_of_range_is_empty() {
        let options = ReportOptions {
            page: 9,
            ..Default::default()
        };
        let report = build_report(&sample_dataset(), &options, 0.0);
        assert!(report.posts.keyword_results.posts.is_empty());
    }
}
