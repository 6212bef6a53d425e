//! workflow
//!
//! Client-side state for the three portal screens.
//!
//! - [`commits`]: date-range commit browser with page navigation
//! - [`generator`]: submit-and-poll changelog generation
//! - [`viewer`]: cursor-paginated changelog feed
//!
//! Every workflow talks to the backend through [`crate::api::ChangelogApi`],
//! so tests drive them with [`crate::api::mock::MockApi`].

pub mod commits;
pub mod generator;
pub mod viewer;

pub use commits::CommitBrowser;
pub use generator::{
    FailureReason, GenerationState, GeneratorWorkflow, PollPolicy, WorkflowError,
};
pub use viewer::ChangelogViewer;
