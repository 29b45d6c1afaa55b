// GitHub provider implementation - bridges API client with SearchProvider trait
use async_trait::async_trait;
use repomark_api::{GitHubClient, GitHubRepo};
use std::time::Duration;

use crate::{
    config::GitHubConfig,
    models::{Owner, Repository},
    search::SearchProvider,
    Result,
};

/// Wrapper around GitHubClient that implements SearchProvider
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn from_config(config: &GitHubConfig) -> Result<Self> {
        let client = GitHubClient::with_base_url(
            config.api_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &GitHubClient {
        &self.client
    }
}

#[async_trait]
impl SearchProvider for GitHubProvider {
    async fn search(&self, query: &str) -> Result<Vec<Repository>> {
        let repos = self.client.search_repositories(query).await?;
        Ok(repos.into_iter().map(github_to_repo).collect())
    }
}

/// Convert GitHub API repo to our internal Repository model
fn github_to_repo(gh: GitHubRepo) -> Repository {
    Repository {
        id: gh.id,
        name: gh.name,
        full_name: gh.full_name,
        description: gh.description,
        url: gh.html_url,
        stars: gh.stargazers_count,
        language: gh.language,
        owner: Owner {
            login: gh.owner.login,
            avatar_url: gh.owner.avatar_url,
        },
    }
}
