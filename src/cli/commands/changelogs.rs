//! changelogs command - Show published changelogs

use anyhow::{bail, Result};

use super::api_client;
use crate::cli::Context;
use crate::ui::{banner, output, render};
use crate::workflow::ChangelogViewer;

/// Load `pages` pages of the changelog feed (or all of them) and print them.
pub fn changelogs(ctx: &Context, pages: u32, all: bool) -> Result<()> {
    let api = api_client(ctx)?;
    let mut viewer = ChangelogViewer::new(ctx.settings.changelogs_page_size);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        if let Err(e) = viewer.load_first(&api).await {
            bail!("Failed to fetch changelogs: {}", e);
        }

        let mut loaded = 1;
        while viewer.can_load_more() && (all || loaded < pages) {
            match viewer.load_more(&api).await {
                Ok(_) => loaded += 1,
                Err(e) => {
                    // Keep what was loaded; the feed shows the error.
                    output::warn(format!("Failed to fetch changelogs: {}", e), ctx.verbosity);
                    break;
                }
            }
        }
        Ok(())
    })?;

    output::print(banner::public(), ctx.verbosity);
    output::print("", ctx.verbosity);
    output::data(render::changelog_feed(&viewer));
    Ok(())
}
