//! GitHub repository search.

use super::{Repository, RepositorySearch};
use crate::error::Result;
use async_trait::async_trait;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use log::debug;
use serde::Deserialize;

/// Maximum number of results shown in the autocomplete menu
pub const MAX_RESULTS: usize = 10;

/// Searches repositories through the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Repository>,
}

impl GithubClient {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl RepositorySearch for GithubClient {
    async fn search(&self, query: &str) -> Result<Vec<Repository>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let response: SearchResponse = self
            .http
            .get(format!("{}/search/repositories", self.api_url))
            .query(&[("q", query)])
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("GitHub search '{}' returned {} items", query, response.items.len());
        Ok(rank_repositories(query, response.items))
    }
}

/// Order search results by how closely their full name matches the query.
///
/// Items the matcher rejects keep GitHub's relevance order after the
/// matched ones. Forks sort after originals with the same score.
pub fn rank_repositories(query: &str, repos: Vec<Repository>) -> Vec<Repository> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, usize, Repository)> = repos
        .into_iter()
        .enumerate()
        .map(|(index, repo)| {
            let score = matcher
                .fuzzy_match(&repo.full_name, query)
                .unwrap_or(i64::MIN);
            (score, index, repo)
        })
        .collect();

    scored.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then(a.2.fork.cmp(&b.2.fork))
            .then(a.1.cmp(&b.1))
    });

    scored
        .into_iter()
        .take(MAX_RESULTS)
        .map(|(_, _, repo)| repo)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::RepositoryOwner;

    fn repo(id: u64, full_name: &str, fork: bool) -> Repository {
        let (owner, name) = full_name.split_once('/').unwrap();
        Repository {
            id,
            name: name.to_string(),
            full_name: full_name.to_string(),
            html_url: format!("https://github.com/{}", full_name),
            owner: RepositoryOwner {
                login: owner.to_string(),
            },
            fork,
        }
    }

    #[test]
    fn test_rank_prefers_closer_matches() {
        let repos = vec![
            repo(1, "someone/unrelated", false),
            repo(2, "utopian-io/utopian.io", false),
            repo(3, "busyorg/busy", false),
        ];
        let ranked = rank_repositories("utopian", repos);
        assert_eq!(ranked[0].id, 2);
        // Non-matching items keep their original order
        assert_eq!(ranked[1].id, 1);
        assert_eq!(ranked[2].id, 3);
    }

    #[test]
    fn test_rank_puts_forks_after_originals() {
        let repos = vec![repo(1, "me/busy", true), repo(2, "me/busy", false)];
        let ranked = rank_repositories("busy", repos);
        assert_eq!(ranked[0].id, 2);
    }

    #[test]
    fn test_rank_limits_results() {
        let repos = (0..25).map(|i| repo(i, &format!("o/r{}", i), false)).collect();
        assert_eq!(rank_repositories("r", repos).len(), MAX_RESULTS);
    }
}
