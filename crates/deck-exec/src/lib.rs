pub mod conductor;
pub mod git;

pub use conductor::*;
pub use git::GitError;
