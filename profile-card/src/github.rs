// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GitHub GraphQL metrics source.
///
/// Issues the single follower-count query used by the card. Responses are
/// decoded by [`parse_follower_response`] so the decoding rules can be tested
/// without network access.
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;

const FOLLOWER_QUERY: &str = r#"
query($login: String!) {
    user(login: $login) {
        followers { totalCount }
    }
}"#;

#[derive(Debug, Deserialize)]
struct FollowerResponse {
    data:   Option<FollowerData>,
    #[serde(default)]
    errors: Vec<GraphQlError>
}

#[derive(Debug, Deserialize)]
struct FollowerData {
    user: Option<UserFollowers>
}

#[derive(Debug, Deserialize)]
struct UserFollowers {
    followers: Connection
}

#[derive(Debug, Deserialize)]
struct Connection {
    #[serde(rename = "totalCount")]
    total_count: u64
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String
}

/// Builds an authenticated GitHub client.
///
/// # Errors
///
/// Returns [`Error::Configuration`] when the token is empty and
/// [`Error::Service`] when the client cannot be constructed.
pub fn client(token: &str) -> Result<Octocrab, Error> {
    if token.trim().is_empty() {
        return Err(Error::configuration("ACCESS_TOKEN must not be empty"));
    }
    Octocrab::builder()
        .personal_token(token.to_owned())
        .build()
        .map_err(|e| Error::service(format!("failed to initialize GitHub client: {e}")))
}

/// Fetches the follower count of `login`.
///
/// # Errors
///
/// Returns [`Error::Remote`] for non-success HTTP responses and
/// [`Error::Service`] for GraphQL errors or unknown users.
///
/// # Example
///
/// ```no_run
/// use profile_card::github;
///
/// # async fn example() -> Result<(), profile_card::Error> {
/// let client = github::client("ghp_token")?;
/// let followers = github::fetch_follower_count(&client, "octocat").await?;
/// println!("{followers}");
/// # Ok(())
/// # }
/// ```
pub async fn fetch_follower_count(client: &Octocrab, login: &str) -> Result<u64, Error> {
    let payload = json!({
        "query": FOLLOWER_QUERY,
        "variables": { "login": login }
    });
    debug!(login, "querying follower count");
    let response: Value = client.graphql(&payload).await?;
    parse_follower_response(response, login)
}

/// Extracts the follower count from a GraphQL response body.
///
/// # Errors
///
/// Returns [`Error::Service`] when the response carries GraphQL errors or the
/// user does not exist, and [`Error::Decode`] for unexpected shapes.
pub fn parse_follower_response(response: Value, login: &str) -> Result<u64, Error> {
    let response: FollowerResponse = serde_json::from_value(response)?;
    if !response.errors.is_empty() {
        let messages: Vec<&str> = response
            .errors
            .iter()
            .map(|error| error.message.as_str())
            .collect();
        return Err(Error::service(format!(
            "follower query failed: {}",
            messages.join("; ")
        )));
    }
    response
        .data
        .and_then(|data| data.user)
        .map(|user| user.followers.total_count)
        .ok_or_else(|| Error::service(format!("GitHub user '{login}' was not found")))
}
