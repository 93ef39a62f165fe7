//! Markdown and JSON report generation.

use super::builder::{
    AlbumSection, AnalyticsReport, CommentSection, LookupSection, PostSection, ReportMetadata,
    UserSection, ValidationSection,
};
use crate::models::Resource;
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &AnalyticsReport) -> String {
    let mut output = String::new();

    output.push_str("# FeedLens Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents());
    output.push_str(&generate_validation_section(&report.validation));
    output.push_str(&generate_users_section(&report.users));
    output.push_str(&generate_comments_section(&report.comments));
    output.push_str(&generate_albums_section(&report.albums));
    output.push_str(&generate_posts_section(&report.posts));
    output.push_str(&generate_lookup_section(&report.lookup));
    output.push_str(&generate_footer());

    output
}

/// Generate a pretty-printed JSON report.
pub fn generate_json_report(report: &AnalyticsReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Version:** {}\n", metadata.tool_version));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n\n",
        metadata.duration_seconds
    ));

    section
}

fn generate_table_of_contents() -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    for (title, anchor) in [
        ("Metadata", "metadata"),
        ("Validation", "validation"),
        ("Users", "users"),
        ("Comments", "comments"),
        ("Albums", "albums"),
        ("Posts", "posts"),
        ("Lookup", "lookup"),
    ] {
        toc.push_str(&format!("- [{}](#{})\n", title, anchor));
    }
    toc.push('\n');

    toc
}

fn generate_validation_section(validation: &ValidationSection) -> String {
    let mut section = String::new();

    section.push_str("## Validation\n\n");
    section.push_str("| Resource | Valid | Invalid |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for resource in Resource::ALL {
        let counts = validation.summary.get(resource);
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            resource, counts.valid, counts.invalid
        ));
    }
    section.push('\n');

    if !validation.rejected.is_empty() {
        section.push_str("### Rejected Records\n\n");
        for rejected in &validation.rejected {
            let id = rejected
                .id
                .map(|id| format!("id {}", id))
                .unwrap_or_else(|| "no id".to_string());
            section.push_str(&format!(
                "- {} ({}): {}\n",
                rejected.resource,
                id,
                rejected.reasons.join(", ")
            ));
        }
        section.push('\n');
    }

    section
}

fn generate_users_section(users: &UserSection) -> String {
    let mut section = String::new();

    section.push_str("## Users\n\n");

    match &users.top_company {
        Some(top) => section.push_str(&format!(
            "**Company with most users:** {} ({} users)\n\n",
            top.company, top.count
        )),
        None => section.push_str("**Company with most users:** n/a\n\n"),
    }

    section.push_str("### Incomplete Addresses\n\n");
    if users.incomplete_addresses.is_empty() {
        section.push_str("All addresses are complete.\n\n");
    } else {
        section.push_str("| User | Missing |\n");
        section.push_str("|:---|:---|\n");
        for entry in &users.incomplete_addresses {
            section.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&entry.user.short()),
                escape_cell(&entry.missing.join(", "))
            ));
        }
        section.push('\n');
    }

    section.push_str("### Duplicate Users\n\n");
    if users.duplicates.is_empty() {
        section.push_str("No duplicates detected.\n\n");
    } else {
        for dupe in &users.duplicates {
            section.push_str(&format!(
                "- {:?} `{}`: #{} and #{}\n",
                dupe.kind, dupe.value, dupe.first.id, dupe.second.id
            ));
        }
        section.push('\n');
    }

    if let Some(filter) = &users.filter {
        section.push_str("### Matching Users\n\n");
        if filter.matches.is_empty() {
            section.push_str("No users match the filter.\n\n");
        } else {
            for user in &filter.matches {
                section.push_str(&format!(
                    "- {}#{} <{}>\n",
                    user.username, user.id, user.email
                ));
            }
            section.push('\n');
        }
    }

    section
}

fn generate_comments_section(comments: &CommentSection) -> String {
    let mut section = String::new();

    section.push_str("## Comments\n\n");

    section.push_str("### Top Commenters\n\n");
    section.push_str("| # | Email | User | Comments |\n");
    section.push_str("|:---:|:---|:---|:---:|\n");
    for (i, entry) in comments.top_commenters.iter().enumerate() {
        let user = entry
            .user
            .as_ref()
            .map(|u| u.short())
            .unwrap_or_else(|| "external".to_string());
        section.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            i + 1,
            escape_cell(&entry.email),
            escape_cell(&user),
            entry.count
        ));
    }
    section.push('\n');

    section.push_str(&format!(
        "- **Comments by registered users:** {} of {}\n",
        comments.registered_comments, comments.proportions.total
    ));
    section.push_str(&format!(
        "- **Duplicate comments (same email and body):** {}\n",
        comments.duplicates.len()
    ));
    section.push_str(&format!(
        "- **Comments containing \"{}\":** {}\n",
        comments.keyword, comments.keyword_matches
    ));
    match &comments.busiest_city {
        Some(city) => section.push_str(&format!(
            "- **City with most comments:** {} ({})\n\n",
            city.city, city.count
        )),
        None => section.push_str("- **City with most comments:** n/a\n\n"),
    }

    section.push_str("### Share of Comments\n\n");
    section.push_str("| Author | Comments | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for share in comments.proportions.breakdown.iter().take(10) {
        let author = share
            .user_id
            .map(|id| format!("user {}", id))
            .unwrap_or_else(|| "external".to_string());
        section.push_str(&format!(
            "| {} | {} | {:.2}% |\n",
            author, share.count, share.percent
        ));
    }
    section.push('\n');

    section
}

fn generate_albums_section(albums: &AlbumSection) -> String {
    let mut section = String::new();

    section.push_str("## Albums\n\n");
    match &albums.most_albums {
        Some(most) => {
            let who = most
                .user
                .as_ref()
                .map(|u| u.short())
                .unwrap_or_else(|| format!("user {}", most.user_id));
            section.push_str(&format!(
                "- **User with most albums:** {} ({} albums)\n",
                who, most.count
            ));
        }
        None => section.push_str("- **User with most albums:** n/a\n"),
    }
    section.push_str(&format!(
        "- **Average albums per user:** {:.2}\n",
        albums.avg_albums_per_user
    ));
    section.push_str(&format!(
        "- **Inactive users (no albums, no comments):** {}\n\n",
        albums.inactive_users.len()
    ));

    for user in &albums.inactive_users {
        section.push_str(&format!("  - {}#{} <{}>\n", user.username, user.id, user.email));
    }
    if !albums.inactive_users.is_empty() {
        section.push('\n');
    }

    section
}

fn generate_posts_section(posts: &PostSection) -> String {
    let mut section = String::new();

    section.push_str("## Posts\n\n");

    section.push_str("### Most Prolific Users\n\n");
    for (i, entry) in posts.top_users.iter().enumerate() {
        section.push_str(&format!(
            "{}. {} (id:{}) - {} posts\n",
            i + 1,
            entry.user.username,
            entry.user.id,
            entry.count
        ));
    }
    section.push('\n');

    section.push_str("### Share of Posts\n\n");
    section.push_str("| User | Posts | Share |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for share in posts.proportions.iter().take(10) {
        section.push_str(&format!(
            "| {} | {} | {:.2}% |\n",
            escape_cell(&share.user.short()),
            share.count,
            share.percent
        ));
    }
    section.push('\n');

    match &posts.top_city {
        Some(city) => section.push_str(&format!(
            "**City with highest average posts per user:** {} ({} users, {:.2} posts/user)\n\n",
            city.city, city.user_count, city.avg_posts
        )),
        None => section.push_str("**City with highest average posts per user:** n/a\n\n"),
    }

    if posts.users_without_posts.is_empty() {
        section.push_str("Every user has at least one post.\n\n");
    } else {
        section.push_str("**Users without posts:**\n\n");
        for user in &posts.users_without_posts {
            section.push_str(&format!("- {}#{}\n", user.username, user.id));
        }
        section.push('\n');
    }

    let results = &posts.keyword_results;
    section.push_str(&format!(
        "### Posts with the word \"{}\"\n\n",
        results.keyword
    ));
    section.push_str(&format!(
        "*{} matches, page {} of {}*\n\n",
        results.total,
        results.page,
        results.pages.max(1)
    ));
    for post in &results.posts {
        section.push_str(&format!("- {}\n", post.summary()));
    }
    if !results.posts.is_empty() {
        section.push('\n');
    }

    section
}

fn generate_lookup_section(lookup: &LookupSection) -> String {
    let mut section = String::new();

    section.push_str("## Lookup\n\n");
    match &lookup.user {
        Some(user) => {
            section.push_str(&format!("**{}**\n\n", user));
            section.push_str(&format!("- Albums: {}\n", lookup.albums.len()));
            if !lookup.neighbors.is_empty() {
                let names: Vec<String> = lookup
                    .neighbors
                    .iter()
                    .map(|n| format!("{}#{}", n.username, n.id))
                    .collect();
                section.push_str(&format!("- Same city: {}\n", names.join(", ")));
            }
            section.push('\n');
            if lookup.posts.is_empty() {
                section.push_str("No posts.\n\n");
            } else {
                for post in &lookup.posts {
                    section.push_str(&format!("- {}\n", post.short()));
                }
                section.push('\n');
            }
        }
        None => section.push_str(&format!("No user found with email {}\n\n", lookup.email)),
    }

    section
}

/// Escape `|` so the text stays inside one table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn generate_footer() -> String {
    "---\n\n*Report generated by FeedLens*\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::builder::tests::sample_dataset;
    use crate::report::builder::{build_report, ReportOptions};

    fn report() -> AnalyticsReport {
        let options = ReportOptions {
            source: "https://jsonplaceholder.typicode.com".to_string(),
            ..Default::default()
        };
        build_report(&sample_dataset(), &options, 2.0)
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&report());

        assert!(markdown.contains("# FeedLens Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Validation"));
        assert!(markdown.contains("| comments | 3 | 1 |"));
        assert!(markdown.contains("### Rejected Records"));
        assert!(markdown.contains("Deckow-Crist (2 users)"));
        assert!(markdown.contains("| 1 | Shanna@melissa.tv | Antonette#2 | 2 |"));
        assert!(markdown.contains("Average albums per user:** 1.00"));
        assert!(markdown.contains("### Posts with the word \"qui\""));
        assert!(markdown.contains("User(1): User 1 (Bret) <Sincere@april.biz> - Gwenborough"));
        assert!(markdown.ends_with("*Report generated by FeedLens*\n"));
    }

    #[test]
    fn test_table_cells_are_escaped() {
        assert_eq!(escape_cell("a|b||c"), "a\\|b\\|\\|c");
        assert_eq!(escape_cell("plain"), "plain");

        let mut dataset = sample_dataset();
        dataset.users[1].username = "anto|nette".to_string();
        for comment in dataset.comments.iter_mut().take(2) {
            comment.email = "pipe|d@melissa.tv".to_string();
        }
        dataset.users[1].email = "pipe|d@melissa.tv".to_string();
        let markdown = generate_markdown_report(&build_report(
            &dataset,
            &ReportOptions::default(),
            0.0,
        ));

        assert!(markdown.contains("| 1 | pipe\\|d@melissa.tv | anto\\|nette#2 | 2 |"));
        assert!(markdown.contains("| anto\\|nette#2 | 1 | "));
    }

    #[test]
    fn test_lookup_section_without_user() {
        let lookup = LookupSection {
            email: "ghost@nowhere.io".to_string(),
            user: None,
            posts: vec![],
            albums: vec![],
            neighbors: vec![],
        };
        assert!(generate_lookup_section(&lookup)
            .contains("No user found with email ghost@nowhere.io"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&report()).unwrap();

        assert!(json.contains("\"metadata\""));
        assert!(json.contains("\"top_commenters\""));
        assert!(json.contains("\"keyword_results\""));

        let parsed: AnalyticsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.comments.keyword, "dolor");
    }
}
