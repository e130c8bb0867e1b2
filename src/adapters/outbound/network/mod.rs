/// Network adapters for the action hosting API
mod github_client;

pub use github_client::{GitHubClient, GitHubSettings, DEFAULT_API_URL, DEFAULT_TOKEN_ENV};
