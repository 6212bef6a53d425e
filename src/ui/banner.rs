//! ui::banner
//!
//! Static header lines for the two audiences.

pub const DEV_TITLE: &str = "Marimo Developer Portal";
pub const PUBLIC_LINK_LABEL: &str = "View Public Changelog";
pub const PUBLIC_TITLE: &str = "Changelog";

/// Header for the internal commit and generation screens.
pub fn developer(viewer_url: &str) -> String {
    let rule = "=".repeat(DEV_TITLE.chars().count());
    format!(
        "{}\n{}\n{}: {}",
        DEV_TITLE, rule, PUBLIC_LINK_LABEL, viewer_url
    )
}

/// Header for the public changelog feed.
pub fn public() -> String {
    let rule = "=".repeat(PUBLIC_TITLE.chars().count());
    format!("{}\n{}", PUBLIC_TITLE, rule)
}
