//! Disposable, role-based and free-provider classification.
//!
//! All lookups are in-memory and read-only once the [`Classifier`] is built, so
//! a single instance is shared by every concurrent verification.

mod data;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use data::{DISPOSABLE_DOMAINS, DISPOSABLE_PROVIDERS, FREE_PROVIDERS, ROLE_LOCAL_PARTS};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposableCheck {
    pub is_disposable: bool,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCheck {
    pub is_role: bool,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeCheck {
    pub is_free: bool,
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    extra_disposable: HashSet<String>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds domains on top of the built-in disposable table.
    pub fn with_extra_disposable<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for domain in domains {
            let normalized = domain.as_ref().trim().trim_end_matches('.').to_ascii_lowercase();
            if !normalized.is_empty() {
                self.extra_disposable.insert(normalized);
            }
        }
        self
    }

    pub fn extra_disposable_len(&self) -> usize {
        self.extra_disposable.len()
    }

    /// Matches the domain and each of its parent domains.
    pub fn disposable(&self, domain: &str) -> DisposableCheck {
        let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
        for candidate in parent_domains(&domain) {
            if DISPOSABLE_DOMAINS.contains(candidate) || self.extra_disposable.contains(candidate) {
                return DisposableCheck {
                    is_disposable: true,
                    provider: DISPOSABLE_PROVIDERS
                        .get(candidate)
                        .map(|name| (*name).to_string()),
                };
            }
        }
        DisposableCheck::default()
    }

    /// Case-insensitive match on the local-part, ignoring any `+tag`.
    pub fn role(&self, local: &str) -> RoleCheck {
        let base = local.split('+').next().unwrap_or(local).to_lowercase();
        if ROLE_LOCAL_PARTS.contains(base.as_str()) {
            RoleCheck {
                is_role: true,
                name: Some(base),
            }
        } else {
            RoleCheck::default()
        }
    }

    pub fn free(&self, domain: &str) -> FreeCheck {
        let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
        match FREE_PROVIDERS.get(domain.as_str()) {
            Some(provider) => FreeCheck {
                is_free: true,
                provider: Some((*provider).to_string()),
            },
            None => FreeCheck::default(),
        }
    }
}

/// Parses a newline separated domain list; `#` starts a comment.
pub fn parse_domain_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

fn parent_domains(domain: &str) -> impl Iterator<Item = &str> {
    domain
        .match_indices('.')
        .map(move |(idx, _)| &domain[idx + 1..])
        .filter(|rest| rest.contains('.'))
        .chain(std::iter::once(domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposable_domain_with_provider() {
        let check = Classifier::new().disposable("Mailinator.com");
        assert!(check.is_disposable);
        assert_eq!(check.provider.as_deref(), Some("Mailinator"));
    }

    #[test]
    fn bundled_list_covers_long_tail_domains() {
        assert!(DISPOSABLE_DOMAINS.len() > 50_000);
        let classifier = Classifier::new();
        for domain in ["00-tv.com", "0039.cf", "yepmail.net"] {
            let check = classifier.disposable(domain);
            assert!(check.is_disposable, "{domain}");
            assert!(check.provider.is_none(), "{domain}");
        }
        assert!(!classifier.disposable("gmail.com").is_disposable);
        assert!(!classifier.disposable("outlook.com").is_disposable);
    }

    #[test]
    fn disposable_subdomain_matches_parent() {
        let check = Classifier::new().disposable("inbox.yopmail.com");
        assert!(check.is_disposable);
    }

    #[test]
    fn extra_list_extends_table() {
        let list = parse_domain_list("# custom\nthrowaway.test\n\nBurner.example # trailing\n");
        assert_eq!(list, vec!["throwaway.test", "burner.example"]);
        let classifier = Classifier::new().with_extra_disposable(list);
        assert!(classifier.disposable("burner.example").is_disposable);
        assert!(classifier.disposable("throwaway.test").provider.is_none());
        assert!(!classifier.disposable("example.com").is_disposable);
    }

    #[test]
    fn role_matching_is_case_insensitive() {
        let classifier = Classifier::new();
        let check = classifier.role("Support+billing");
        assert!(check.is_role);
        assert_eq!(check.name.as_deref(), Some("support"));
        assert!(!classifier.role("jane.doe").is_role);
    }

    #[test]
    fn free_provider_lookup() {
        let classifier = Classifier::new();
        assert_eq!(
            classifier.free("gmail.com").provider.as_deref(),
            Some("Google")
        );
        assert!(!classifier.free("acme-corp.com").is_free);
    }
}
