//! Address syntax validation, normalization and typo suggestion.
//!
//! [`parse_address`] applies a practical grammar (not full RFC 5322): one
//! `@`, a non-empty atext local-part (non-ASCII letters tolerated), and a
//! dotted domain that survives IDNA conversion. Only the domain is lowercased.

mod composition;
mod domain;
mod local;
mod typo;
mod types;

pub use typo::{MAJOR_PROVIDERS, TYPO_CUTOFF, suggest_domain};
pub use types::{CompositionFinding, FindingClass, LocalComposition, ParsedAddress, SyntaxError};

use composition::{analyze_local, warnings_for};
use domain::check_domain;
use local::is_local_valid;

pub const MIN_ADDRESS_LEN: usize = 3;
pub const MAX_ADDRESS_LEN: usize = 320;
pub const MAX_LOCAL_LEN: usize = 64;

pub fn parse_address(input: &str) -> Result<ParsedAddress, SyntaxError> {
    let trimmed = input.trim();
    let length = trimmed.chars().count();
    if !(MIN_ADDRESS_LEN..=MAX_ADDRESS_LEN).contains(&length) {
        return Err(SyntaxError::new(vec![format!(
            "length {length} outside {MIN_ADDRESS_LEN}..={MAX_ADDRESS_LEN}"
        )]));
    }

    let parts: Vec<&str> = trimmed.split('@').collect();
    if parts.len() != 2 {
        return Err(SyntaxError::new(vec![
            "must contain exactly one '@'".to_string(),
        ]));
    }
    let (local, domain) = (parts[0], parts[1]);

    let mut reasons = Vec::new();
    if local.is_empty() {
        reasons.push("local part is empty".to_string());
    } else if local.len() > MAX_LOCAL_LEN {
        reasons.push(format!(
            "local part length {} > {MAX_LOCAL_LEN}",
            local.len()
        ));
    } else if !is_local_valid(local) {
        reasons.push("local part has illegal characters".to_string());
    }

    let ascii_domain = if domain.is_empty() {
        reasons.push("domain is empty".to_string());
        None
    } else {
        check_domain(domain, &mut reasons)
    };

    let ascii_domain = match ascii_domain {
        Some(ascii) if reasons.is_empty() => ascii,
        _ => return Err(SyntaxError::new(reasons)),
    };

    let composition = analyze_local(local);
    let warnings = warnings_for(&composition);

    Ok(ParsedAddress {
        original: input.to_string(),
        local: local.to_string(),
        domain: domain.to_lowercase(),
        ascii_domain,
        composition,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_basic_and_lowercases_domain_only() {
        let parsed = parse_address("Alice.Smith@Example.COM").expect("valid");
        assert_eq!(parsed.local, "Alice.Smith");
        assert_eq!(parsed.domain, "example.com");
        assert_eq!(parsed.ascii_domain, "example.com");
        assert_eq!(parsed.normalized(), "Alice.Smith@example.com");
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn rejects_structural_errors() {
        for input in ["a@@b.com", "@example.com", "alice@", "alice", "a b@example.com", "ab"] {
            assert!(parse_address(input).is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn rejects_overlong_input() {
        let long = format!("{}@example.com", "a".repeat(400));
        let err = parse_address(&long).expect_err("too long");
        assert!(err.reasons[0].contains("length"));
    }

    #[test]
    fn idn_domain_gets_ascii_form() {
        let parsed = parse_address("alice@exämple.com").expect("valid");
        assert_eq!(parsed.domain, "exämple.com");
        assert!(parsed.ascii_domain.starts_with("xn--"));
    }

    #[test]
    fn unicode_local_part_yields_warning() {
        let parsed = parse_address("josé@example.com").expect("valid");
        assert_eq!(parsed.composition.unicode, 1);
        assert!(!parsed.warnings.is_empty());
    }
}
