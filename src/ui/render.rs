//! ui::render
//!
//! Plain-text rendering of workflow state.
//!
//! Every function returns a `String` so commands decide where it goes and
//! tests can assert on it directly.

use std::fmt::Write as _;

use crate::core::types::{ChangelogEntry, Commit};
use crate::workflow::{ChangelogViewer, CommitBrowser, FailureReason, GenerationState};

pub const NO_COMMITS: &str = "No commits found in the selected date range";
pub const NO_CHANGELOGS: &str = "No changelogs published yet";
pub const GENERATING: &str = "Generating changelog...";
pub const GENERATED: &str = "Changelog generated successfully!";
pub const LOAD_MORE: &str = "Load More";

/// One commit as a single line plus an indented link.
pub fn commit_line(commit: &Commit) -> String {
    let mut line = format!(
        "{}  {}  {}  {}",
        commit.short_sha(),
        commit.display_date(),
        commit.author,
        commit.summary()
    );
    if !commit.link.is_empty() {
        let _ = write!(line, "\n         {}", commit.link);
    }
    line
}

/// `Page X of Y` with the available directions.
pub fn pagination(browser: &CommitBrowser) -> String {
    let total = browser.total_pages();
    if total == 0 {
        return String::new();
    }
    let mut line = format!("Page {} of {}", browser.page() + 1, total);
    let mut controls = Vec::new();
    if browser.can_previous() {
        controls.push("previous");
    }
    if browser.can_next() {
        controls.push("next");
    }
    if !controls.is_empty() {
        let _ = write!(line, "  ({} available)", controls.join(", "));
    }
    line
}

/// The commit listing for the browser's current page.
pub fn commit_list(browser: &CommitBrowser) -> String {
    let mut out = format!("Commits {}\n", browser.range());

    if let Some(error) = browser.error() {
        let _ = write!(out, "\nError: {}", error);
        return out;
    }

    match browser.commits() {
        None => out.push_str("\nLoading..."),
        Some([]) => {
            let _ = write!(out, "\n{}", NO_COMMITS);
        }
        Some(commits) => {
            for commit in commits {
                let _ = write!(out, "\n{}", commit_line(commit));
            }
            let footer = pagination(browser);
            if !footer.is_empty() {
                let _ = write!(out, "\n\n{}", footer);
            }
        }
    }
    out
}

/// Heading line(s) for an entry.
///
/// Entries with neither version nor title are headed by their date range;
/// otherwise the date range goes on a second line.
pub fn entry_heading(entry: &ChangelogEntry) -> String {
    let range = format!(
        "Changelog entry for date range: {}",
        entry.date_range_label()
    );
    match entry.headline() {
        Some(headline) => format!("{}\n{}", headline, range),
        None => range,
    }
}

/// A full entry with sections and bullets.
pub fn changelog_entry(entry: &ChangelogEntry) -> String {
    let mut out = entry_heading(entry);
    for section in &entry.sections {
        let _ = write!(out, "\n\n## {}", section.heading);
        for bullet in &section.bullet_points {
            let _ = write!(out, "\n  - {}", bullet.bullet_point_details);
            if let Some(link) = bullet
                .link_to_relevant_commit
                .as_deref()
                .filter(|l| !l.is_empty())
            {
                let _ = write!(out, " ({})", link);
            }
        }
    }
    out
}

/// The accumulated changelog feed.
pub fn changelog_feed(viewer: &ChangelogViewer) -> String {
    let mut blocks: Vec<String> = viewer.entries().iter().map(changelog_entry).collect();

    if viewer.is_loaded() && blocks.is_empty() {
        blocks.push(NO_CHANGELOGS.to_string());
    }
    if let Some(error) = viewer.error() {
        blocks.push(format!("Error: {}", error));
    }
    if viewer.can_load_more() {
        blocks.push(format!("[{}]", LOAD_MORE));
    }
    blocks.join("\n\n")
}

/// Progress or outcome of a generation attempt.
pub fn generation(state: &GenerationState, viewer_url: &str) -> String {
    match state {
        GenerationState::Idle => String::new(),
        GenerationState::Submitting => GENERATING.to_string(),
        GenerationState::Polling { job, attempts } => {
            format!("{}\nJob ID: {} (check {})", GENERATING, job, attempts)
        }
        GenerationState::Completed { changelog, .. } => format!(
            "{}\nView in changelog: {}\n\n{}",
            GENERATED,
            viewer_url,
            changelog_entry(changelog)
        ),
        GenerationState::Failed { job, reason } => {
            let mut out = format!("Error: {}", reason);
            if let Some(job) = job {
                if !matches!(reason, FailureReason::Submit(_)) {
                    let _ = write!(out, "\nJob ID: {}", job);
                }
            }
            out
        }
    }
}
