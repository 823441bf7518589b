//! # Allow-List Policy
//!
//! A strategy seam consulted before every request. The default-permissive
//! behavior is one concrete implementation among several, not special-cased
//! logic in the executor.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use url::Url;

/// Decides whether a destination URL may be requested.
///
/// Selected at executor construction. Implementations may refresh their
/// backing data asynchronously; `is_allowed` sees whatever is current.
#[async_trait]
pub trait AllowListPolicy: Send + Sync {
    async fn is_allowed(&self, url: &str) -> bool;
}

/// The default policy: every URL is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl AllowListPolicy for AllowAll {
    async fn is_allowed(&self, _url: &str) -> bool {
        true
    }
}

/// Allows only URLs whose host matches one of a set of domains, including
/// subdomains. The set can be swapped out at runtime.
#[derive(Debug, Default)]
pub struct DomainAllowList {
    domains: RwLock<HashSet<String>>,
}

impl DomainAllowList {
    #[must_use]
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list = Self::default();
        list.refresh(domains);
        list
    }

    /// Replace the allowed set. Requests already past the policy check are
    /// unaffected.
    pub fn refresh<I, S>(&self, domains: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let normalized = domains
            .into_iter()
            .map(|d| d.into().to_ascii_lowercase())
            .collect();
        *self.domains.write() = normalized;
    }

    fn host_allowed(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.domains.read().iter().any(|domain| {
            host == *domain || host.ends_with(&format!(".{domain}"))
        })
    }
}

#[async_trait]
impl AllowListPolicy for DomainAllowList {
    async fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        parsed
            .host_str()
            .is_some_and(|host| self.host_allowed(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allow_all_allows_anything() {
        assert!(AllowAll.is_allowed("https://anywhere.example").await);
        assert!(AllowAll.is_allowed("not even a url").await);
    }

    #[tokio::test]
    async fn domain_list_matches_host_and_subdomains() {
        let policy = DomainAllowList::new(["api.example.com"]);

        assert!(policy.is_allowed("https://api.example.com/v1").await);
        assert!(policy.is_allowed("https://eu.api.example.com/v1").await);
        assert!(!policy.is_allowed("https://example.com/v1").await);
        assert!(!policy.is_allowed("https://notapi.example.com.evil.test/").await);
    }

    #[tokio::test]
    async fn unparseable_url_is_denied() {
        let policy = DomainAllowList::new(["example.com"]);
        assert!(!policy.is_allowed("::nope::").await);
    }

    #[tokio::test]
    async fn refresh_swaps_the_set() {
        let policy = DomainAllowList::new(["old.test"]);
        assert!(policy.is_allowed("https://old.test/").await);

        policy.refresh(["new.test"]);
        assert!(!policy.is_allowed("https://old.test/").await);
        assert!(policy.is_allowed("https://new.test/").await);
    }
}
