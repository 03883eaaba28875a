use textdistance::str::levenshtein;

/// Large consumer providers used as typo targets.
pub const MAJOR_PROVIDERS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "live.com",
    "msn.com",
    "icloud.com",
    "aol.com",
    "protonmail.com",
    "gmx.com",
    "yandex.com",
    "mail.com",
    "zoho.com",
    "comcast.net",
];

/// Maximum edit distance for a suggestion.
pub const TYPO_CUTOFF: usize = 2;

/// Suggests a major provider when `domain` is within [`TYPO_CUTOFF`] edits of
/// exactly one of them at the smallest distance found. Known providers get no
/// suggestion.
pub fn suggest_domain(domain: &str) -> Option<&'static str> {
    let domain = domain.trim().to_ascii_lowercase();
    if domain.is_empty() || MAJOR_PROVIDERS.contains(&domain.as_str()) {
        return None;
    }

    let mut best: Option<(&'static str, usize)> = None;
    let mut tied = false;
    for candidate in MAJOR_PROVIDERS {
        let distance = levenshtein(&domain, candidate);
        if distance > TYPO_CUTOFF {
            continue;
        }
        match best {
            Some((_, current)) if distance > current => {}
            Some((_, current)) if distance == current => tied = true,
            _ => {
                best = Some((*candidate, distance));
                tied = false;
            }
        }
    }

    if tied { None } else { best.map(|(candidate, _)| candidate) }
}
