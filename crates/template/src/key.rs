//! Cache keys for parsed templates.

use crate::delimiters::Delimiters;
use sha2::{Digest, Sha256};

/// Key for a template supplied inline: its content fingerprint followed by
/// the delimiter pair.
pub fn content_key(content: &[u8], delimiters: &Delimiters) -> String {
    let digest = hex::encode(Sha256::digest(content));
    format!("{}:{}", digest, delimiter_suffix(delimiters))
}

/// Key for a template named by identifier.
pub fn identifier_key(id: &str, delimiters: &Delimiters) -> String {
    format!("{}:{}:{}", id.len(), id, delimiter_suffix(delimiters))
}

// Length-prefixed so that no two distinct pairs share a suffix.
fn delimiter_suffix(delimiters: &Delimiters) -> String {
    format!(
        "{}:{}{}",
        delimiters.left.len(),
        delimiters.left,
        delimiters.right
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiters_are_part_of_the_key() {
        let hash = Delimiters::default();
        let angle = Delimiters::new("<<", ">>").unwrap();
        assert_ne!(content_key(b"Hello", &hash), content_key(b"Hello", &angle));
        assert_ne!(identifier_key("welcome", &hash), identifier_key("welcome", &angle));
    }

    #[test]
    fn test_content_key_is_stable() {
        let d = Delimiters::default();
        assert_eq!(content_key(b"Hello", &d), content_key(b"Hello", &d));
        assert_ne!(content_key(b"Hello", &d), content_key(b"Hello!", &d));
        assert!(content_key(b"Hello", &d).ends_with(":2:#!!#"));
    }

    #[test]
    fn test_identifier_key_format() {
        assert_eq!(identifier_key("welcome", &Delimiters::default()), "7:welcome:2:#!!#");
    }

    #[test]
    fn test_pairs_with_the_same_concatenation_differ() {
        let short_left = Delimiters::new("<", "<>>").unwrap();
        let long_left = Delimiters::new("<<", ">>").unwrap();
        assert_ne!(content_key(b"x", &short_left), content_key(b"x", &long_left));
        assert_ne!(identifier_key("x", &short_left), identifier_key("x", &long_left));
    }

    #[test]
    fn test_identifier_cannot_absorb_delimiters() {
        let cd = Delimiters::new("c", "d").unwrap();
        let bcd = Delimiters::new("bc", "d").unwrap();
        assert_ne!(identifier_key("ab", &cd), identifier_key("a", &bcd));
    }
}
