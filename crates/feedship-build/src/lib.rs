//! feedship image build & publish
//!
//! This crate drives the CI sequence that turns one build description into
//! two published images:
//!
//! 1. log in to the source registry
//! 2. build the `primary` and `test` targets, each tagged `latest` and with
//!    the revision tag
//! 3. log in to the destination registry with a short-lived token
//! 4. push all four image coordinates
//!
//! Every external tool call goes through [`ToolRunner`], so the sequence can
//! be exercised without docker or aws installed.

pub mod buildspec;
pub mod docker;
pub mod dockerfile;
pub mod ecr;
pub mod error;
pub mod pipeline;
pub mod runner;
pub mod step;

pub use buildspec::{Buildspec, BuildspecOptions};
pub use dockerfile::BuildDescription;
pub use error::{AuthFailure, PipelineError, RenderError, Result, ToolError};
pub use pipeline::{Pipeline, PipelineReport, StepRecord};
pub use runner::{DryRunRunner, Invocation, ProcessRunner, ToolOutput, ToolRunner};
pub use step::{Build, Login, Publish, Step, StepName, plan};
