use sha2::{Digest, Sha256};
use uuid::Uuid;

const SCHEME: &str = "sha256";

/// Digest a password with a fresh random salt.
///
/// The result has the form `sha256$<salt>$<hex digest>` and is what gets
/// stored in `users.password_hash`.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}${}", SCHEME, salt, digest(&salt, password))
}

/// Check `password` against a value produced by `hash_password`.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(SCHEME), Some(salt), Some(expected)) => {
            constant_time_eq(digest(salt, password).as_bytes(), expected.as_bytes())
        }
        _ => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

// Digest length is public, so only the contents need a branch-free compare.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("correct horse");
        assert!(stored.starts_with("sha256$"));
        assert!(!stored.contains("correct horse"));
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong horse", &stored));
    }

    #[test]
    fn test_digest_mismatch_in_any_position_fails() {
        let stored = hash_password("secret123");
        let (prefix, expected) = stored.rsplit_once('$').unwrap();
        for position in [0, expected.len() / 2, expected.len() - 1] {
            let mut tampered = expected.as_bytes().to_vec();
            tampered[position] = if tampered[position] == b'0' { b'1' } else { b'0' };
            let tampered = format!("{}${}", prefix, String::from_utf8(tampered).unwrap());
            assert!(!verify_password("secret123", &tampered));
        }
        assert!(!verify_password("secret123", &format!("{}${}", prefix, &expected[1..])));
        assert!(!verify_password("secret123", &format!("{}${}0", prefix, expected)));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("secret123"), hash_password("secret123"));
    }

    #[test]
    fn test_unknown_format_never_verifies() {
        assert!(!verify_password("secret123", "secret123"));
        assert!(!verify_password("secret123", "md5$salt$digest"));
        assert!(!verify_password("secret123", ""));
    }
}
