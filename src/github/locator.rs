//! Identity wrappers for pull requests and the GitHub API host.

use std::fmt;
use std::str::FromStr;

use url::{ParseError, Url};

use super::error::GatewayError;

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Validates that the owner is non-empty.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` when the value is empty.
    pub fn new(value: &str) -> Result<Self, GatewayError> {
        if value.is_empty() {
            return Err(GatewayError::InvalidUrl(
                "repository owner must not be empty".to_owned(),
            ));
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validates that the repository name is non-empty.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` when the value is empty.
    pub fn new(value: &str) -> Result<Self, GatewayError> {
        if value.is_empty() {
            return Err(GatewayError::InvalidUrl(
                "repository name must not be empty".to_owned(),
            ));
        }
        Ok(Self(value.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Composite pull request key of the form `<owner>/<repository>#<number>`.
///
/// Ordering compares owner, then repository, then the numeric pull request
/// number, so `octo/repo#9` sorts before `octo/repo#10`.
///
/// # Example
///
/// ```
/// use pr_collector::github::PullRequestUri;
///
/// let uri: PullRequestUri = "octo/repo#42".parse().expect("valid URI");
/// assert_eq!(uri.owner().as_str(), "octo");
/// assert_eq!(uri.number(), 42);
/// assert_eq!(uri.to_string(), "octo/repo#42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PullRequestUri {
    owner: RepositoryOwner,
    repository: RepositoryName,
    number: u64,
}

impl PullRequestUri {
    /// Creates a composite URI from its parts.
    #[must_use]
    pub const fn new(owner: RepositoryOwner, repository: RepositoryName, number: u64) -> Self {
        Self {
            owner,
            repository,
            number,
        }
    }

    /// Creates a composite URI from an `owner/repository` pair and a number.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` when the pair is not of the form
    /// `owner/repository`.
    pub fn from_name_with_owner(name_with_owner: &str, number: u64) -> Result<Self, GatewayError> {
        let (owner, repository) = name_with_owner.split_once('/').ok_or_else(|| {
            GatewayError::InvalidUrl(format!(
                "expected owner/repository, got `{name_with_owner}`"
            ))
        })?;
        Ok(Self::new(
            RepositoryOwner::new(owner)?,
            RepositoryName::new(repository)?,
            number,
        ))
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// The `owner/repository` part of the URI.
    #[must_use]
    pub fn name_with_owner(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    /// Returns true when both URIs point into the same repository.
    #[must_use]
    pub fn same_repository(&self, other: &Self) -> bool {
        self.owner == other.owner && self.repository == other.repository
    }
}

impl fmt::Display for PullRequestUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}#{}",
            self.owner.as_str(),
            self.repository.as_str(),
            self.number
        )
    }
}

impl FromStr for PullRequestUri {
    type Err = GatewayError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (name_with_owner, number) = input.split_once('#').ok_or_else(|| {
            GatewayError::InvalidUrl(format!("expected owner/repository#number, got `{input}`"))
        })?;
        let parsed_number = number.parse::<u64>().map_err(|error| {
            GatewayError::InvalidUrl(format!("invalid pull request number in `{input}`: {error}"))
        })?;
        Self::from_name_with_owner(name_with_owner, parsed_number)
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GatewayError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GatewayError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Derives the GitHub API base URL from a web or API URL.
///
/// A bare host such as `github.com` is read as `https://<host>`.
/// `github.com` maps to `https://api.github.com`; any other host is treated
/// as GitHub Enterprise and maps to `<scheme>://<host>/api`, the prefix under
/// which Enterprise serves its `graphql` endpoint. URLs that already name an
/// API host (`api.github.com`, or any URL with an `/api` path) are kept.
///
/// # Errors
///
/// Returns `GatewayError::InvalidUrl` when the input cannot be parsed or has
/// no host.
pub fn derive_api_base(input: &str) -> Result<Url, GatewayError> {
    let parsed = match Url::parse(input) {
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{input}")),
        other => other,
    }
    .map_err(|error| GatewayError::InvalidUrl(error.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| GatewayError::InvalidUrl("URL must include a host".to_owned()))?;

    if host.eq_ignore_ascii_case("github.com") || host.eq_ignore_ascii_case("api.github.com") {
        return Url::parse("https://api.github.com")
            .map_err(|error| GatewayError::InvalidUrl(error.to_string()));
    }

    if parsed.path() != "/" {
        return Ok(parsed);
    }

    let mut api_url = parsed;
    api_url.set_path("api");
    Ok(api_url)
}
