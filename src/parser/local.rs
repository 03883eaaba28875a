/// Practical local-part grammar: ASCII atext plus non-ASCII letters/digits,
/// '.' neither leading, trailing nor doubled. Quoted strings are refused.
pub(crate) fn is_local_valid(s: &str) -> bool {
    if s.starts_with('.') || s.ends_with('.') || s.contains("..") {
        return false;
    }
    s.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || (!c.is_ascii() && c.is_alphanumeric())
            || matches!(
                c,
                '!' | '#'
                    | '$'
                    | '%'
                    | '&'
                    | '\''
                    | '*'
                    | '+'
                    | '-'
                    | '/'
                    | '='
                    | '?'
                    | '^'
                    | '_'
                    | '`'
                    | '{'
                    | '|'
                    | '}'
                    | '~'
                    | '.'
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn dots() {
        assert!(!is_local_valid(".abc"));
        assert!(!is_local_valid("abc."));
        assert!(!is_local_valid("a..b"));
        assert!(is_local_valid("a.b"));
    }

    #[test]
    fn unicode_letters_allowed_but_not_spaces() {
        assert!(is_local_valid("josé"));
        assert!(!is_local_valid("jo sé"));
        assert!(!is_local_valid("\"quoted\""));
        assert!(!is_local_valid("a,b"));
    }
}
