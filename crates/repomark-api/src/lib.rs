// GitHub REST client - the only remote we talk to
pub mod github;

// Re-export common types
pub use github::{GitHubClient, GitHubError, GitHubOwner, GitHubRepo, Result, RESULTS_PER_PAGE};
