//! generate command - Generate a changelog and wait for it

use anyhow::{bail, Result};
use tokio_util::sync::CancellationToken;

use super::{api_client, date_range};
use crate::cli::Context;
use crate::core::types::ChangelogRequest;
use crate::ui::output::{self, Verbosity};
use crate::ui::{banner, render};
use crate::workflow::{
    CommitBrowser, FailureReason, GenerationState, GeneratorWorkflow, PollPolicy,
};

/// Check the range has commits, submit a generation request and poll it to
/// completion.
pub fn generate(
    ctx: &Context,
    start: Option<&str>,
    end: Option<&str>,
    version: &str,
    title: &str,
    open_viewer: bool,
) -> Result<()> {
    let range = date_range(start, end)?;
    let api = api_client(ctx)?;
    let request = ChangelogRequest::new(range, version, title);

    output::print(banner::developer(&ctx.settings.viewer_url), ctx.verbosity);
    output::print("", ctx.verbosity);

    let rt = tokio::runtime::Runtime::new()?;
    let state = rt.block_on(async {
        let mut browser = CommitBrowser::new(range, ctx.settings.commits_page_size);
        if let Err(e) = browser.fetch(&api).await {
            bail!("Failed to fetch commits: {}", e);
        }
        if !browser.can_generate() {
            bail!("{} ({})", render::NO_COMMITS, range);
        }

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trigger.cancel();
            }
        });

        let verbosity = ctx.verbosity;
        let mut workflow = GeneratorWorkflow::new(PollPolicy::from(&ctx.settings))
            .on_transition(move |state| report_progress(state, verbosity));

        let result = workflow
            .generate(&api, request, browser.can_generate(), &cancel)
            .await
            .map(Clone::clone);
        ctrl_c.abort();
        Ok(result?)
    })?;

    match state {
        GenerationState::Completed { .. } => {
            output::data(render::generation(&state, &ctx.settings.viewer_url));
            if open_viewer {
                if let Err(e) = open::that(&ctx.settings.viewer_url) {
                    output::warn(
                        format!("Could not open browser: {}", e),
                        ctx.verbosity,
                    );
                }
            }
            Ok(())
        }
        GenerationState::Failed { job, reason } => {
            if let FailureReason::Submit(e) | FailureReason::Status(e) = &reason {
                if e.is_transient() {
                    output::warn("the service may be temporarily unavailable", ctx.verbosity);
                }
            }
            match job {
                Some(job) => bail!("{} (job {})", reason, job),
                None => bail!("{}", reason),
            }
        }
        other => bail!("Generation stopped in unexpected state {:?}", other),
    }
}

/// Print intermediate progress lines while polling.
fn report_progress(state: &GenerationState, verbosity: Verbosity) {
    match state {
        GenerationState::Submitting => output::print(render::GENERATING, verbosity),
        GenerationState::Polling { job, attempts: 0 } => {
            output::print(format!("Job ID: {}", job), verbosity)
        }
        GenerationState::Polling { attempts, .. } => {
            tracing::debug!(attempts, "still generating")
        }
        _ => {}
    }
}
