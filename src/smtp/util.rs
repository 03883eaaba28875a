use rand::{Rng, distributions::Alphanumeric};

/// Lowercase alphanumeric local part, unlikely to name a real mailbox.
pub fn random_local_part(len: usize) -> String {
    let length = len.clamp(8, 64);
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_local_parts_differ_and_respect_length() {
        let a = random_local_part(16);
        let b = random_local_part(16);
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_eq!(random_local_part(2).len(), 8);
    }
}
