//! Discovery of cross-references between pull requests.
//!
//! An extractor reads a pull request body and reports the pull requests it
//! depends on, either by opaque node identifier or by composite URI. The
//! collector feeds unknown references into its re-fetch frontier.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::error::CollectorError;
use crate::github::PullRequestUri;

/// `Depends-On` trailer at the start of a line, followed by a colon and/or
/// whitespace, capturing the first token after it.
static DEPENDS_ON_TRAILER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?m)^Depends-On(?::[ \t]*|[ \t]+)(\S+)").ok());

/// A reference from one pull request to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencyRef {
    /// Reference by opaque node identifier.
    Id(String),
    /// Reference by composite URI.
    Uri(PullRequestUri),
}

/// Dependencies found in one pull request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDependencies {
    /// Dependencies named by opaque identifier.
    pub ids: Vec<String>,
    /// Dependencies named by composite URI, in body order.
    pub uris: Vec<PullRequestUri>,
}

impl ExtractedDependencies {
    /// Returns identifier references followed by URI references.
    #[must_use]
    pub fn to_refs(&self) -> Vec<DependencyRef> {
        self.ids
            .iter()
            .cloned()
            .map(DependencyRef::Id)
            .chain(self.uris.iter().cloned().map(DependencyRef::Uri))
            .collect()
    }
}

/// Strategy that finds dependencies in a pull request body.
///
/// Closures of the shape `Fn(&str) -> Result<ExtractedDependencies, CollectorError>`
/// implement this trait.
pub trait DependencyExtractor: Send + Sync {
    /// Extracts the dependencies referenced by `body`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::MalformedDependency`] when a reference
    /// violates the extractor's convention.
    fn extract(&self, body: &str) -> Result<ExtractedDependencies, CollectorError>;
}

impl<F> DependencyExtractor for F
where
    F: Fn(&str) -> Result<ExtractedDependencies, CollectorError> + Send + Sync,
{
    fn extract(&self, body: &str) -> Result<ExtractedDependencies, CollectorError> {
        self(body)
    }
}

/// Extractor for Zuul-style `Depends-On: <pull request URL>` trailers.
///
/// Only URI dependencies are produced. Tokens that are not absolute URLs are
/// ignored, but a URL that does not end in `/pull/<number>` is an error.
///
/// # Example
///
/// ```
/// use pr_collector::collector::{DependencyExtractor, DependsOnExtractor};
///
/// let deps = DependsOnExtractor
///     .extract("Depends-On: https://github.com/octo/lib/pull/5")
///     .expect("well-formed trailer");
/// assert_eq!(deps.uris[0].to_string(), "octo/lib#5");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DependsOnExtractor;

impl DependencyExtractor for DependsOnExtractor {
    fn extract(&self, body: &str) -> Result<ExtractedDependencies, CollectorError> {
        let Some(pattern) = DEPENDS_ON_TRAILER.as_ref() else {
            return Ok(ExtractedDependencies::default());
        };

        let uris = pattern
            .captures_iter(body)
            .filter_map(|captures| captures.get(1))
            .map(|token| token.as_str())
            .filter(|token| is_absolute_url(token))
            .map(pull_request_uri_from_url)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExtractedDependencies {
            ids: Vec::new(),
            uris,
        })
    }
}

fn is_absolute_url(token: &str) -> bool {
    Url::parse(token).is_ok_and(|url| url.has_host())
}

fn malformed(link: &str, reason: &str) -> CollectorError {
    CollectorError::MalformedDependency {
        link: link.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Converts `.../<owner>/<repository>/pull/<number>` into a composite URI.
///
/// # Errors
///
/// Returns [`CollectorError::MalformedDependency`] when the link has fewer
/// than four `/`-separated segments, does not end in a decimal number, or the
/// number is not preceded by `pull`.
pub fn pull_request_uri_from_url(link: &str) -> Result<PullRequestUri, CollectorError> {
    let segments: Vec<&str> = link.split('/').collect();
    let [.., owner, repository, kind, number] = segments.as_slice() else {
        return Err(malformed(link, "expected at least four path segments"));
    };

    if number.is_empty() || !number.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(malformed(link, "last segment must be a pull request number"));
    }
    if *kind != "pull" {
        return Err(malformed(link, "expected `/pull/<number>` suffix"));
    }

    let parsed_number = number
        .parse::<u64>()
        .map_err(|error| malformed(link, &error.to_string()))?;
    PullRequestUri::from_name_with_owner(&format!("{owner}/{repository}"), parsed_number)
        .map_err(|error| malformed(link, &error.to_string()))
}
