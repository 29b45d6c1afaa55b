// Provider implementations - GitHub is the only remote for now
pub mod github;

pub use github::GitHubProvider;
