//! commits command - List commits in a date range

use anyhow::{bail, Result};

use super::{api_client, date_range};
use crate::cli::Context;
use crate::ui::{banner, output, render};
use crate::workflow::CommitBrowser;

/// Show one page of commits. `page` is one-based.
pub fn commits(ctx: &Context, start: Option<&str>, end: Option<&str>, page: u32) -> Result<()> {
    let range = date_range(start, end)?;
    let api = api_client(ctx)?;
    let mut browser = CommitBrowser::new(range, ctx.settings.commits_page_size);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        if let Err(e) = browser.fetch(&api).await {
            bail!("Failed to fetch commits: {}", e);
        }

        let wanted = page.saturating_sub(1);
        if wanted > 0 {
            if wanted >= browser.total_pages() {
                bail!(
                    "Page {} is out of range ({} page(s) available)",
                    page,
                    browser.total_pages()
                );
            }
            browser.go_to(wanted);
            if let Err(e) = browser.fetch(&api).await {
                bail!("Failed to fetch commits: {}", e);
            }
        }
        Ok(())
    })?;

    output::print(banner::developer(&ctx.settings.viewer_url), ctx.verbosity);
    output::print("", ctx.verbosity);
    output::data(render::commit_list(&browser));
    Ok(())
}
