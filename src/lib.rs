//! sweepr - delete local branches whose GitHub PRs are merged or closed
//!
//! Branch status checks fan out across a bounded worker pool, results come
//! back in input order, and a second bounded pool runs the deletions.

pub mod error;
pub mod exec;
pub mod git;
pub mod github;
pub mod sweep;
pub mod ui;

pub use error::{Result, SweeprError};
