//! Per-role password generation.

use crate::models::policy::PolicySection;
use crate::models::user::UserRecord;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use zeroize::Zeroizing;

/// `length` characters from `[a-zA-Z0-9]`, drawn uniformly from the OS CSPRNG.
pub fn generate_password(length: usize) -> Zeroizing<String> {
    Zeroizing::new(
        OsRng
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect(),
    )
}

/// Storage encoding of a password inside the roster. Not encryption.
pub fn encode_password(password: &str) -> String {
    STANDARD.encode(password.as_bytes())
}

/// Attach a fresh base64-encoded password to every record, sized by role.
pub fn assign_passwords(roster: &mut [UserRecord], policy: &PolicySection) {
    for user in roster.iter_mut() {
        let password = generate_password(policy.password_length_for(&user.role));
        user.password = Some(encode_password(&password));
        tracing::debug!(username = %user.username_text(), role = %user.role_text(), "password generated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    fn decode(encoded: &str) -> String {
        String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap()
    }

    #[test]
    fn test_generate_password_length() {
        assert_eq!(generate_password(12).len(), 12);
        assert_eq!(generate_password(8).len(), 8);
        assert_eq!(generate_password(0).len(), 0);
    }

    #[test]
    fn test_generate_password_alphabet() {
        let pw = generate_password(500);
        assert!(pw.chars().all(|c| ALPHABET.contains(c)));
    }

    #[test]
    fn test_encode_password_is_reversible() {
        assert_eq!(encode_password("abc123XYZ"), "YWJjMTIzWFla");
        assert_eq!(decode(&encode_password("Zz09Zz09")), "Zz09Zz09");
    }

    #[test]
    fn test_assign_passwords_by_role() {
        let mut roster = vec![
            UserRecord::new("alice", "Alice A", "Admin"),
            UserRecord::new("carol", "Carol C", "Editor"),
            UserRecord::new("bob", "Bob B", "Viewer"),
        ];
        assign_passwords(&mut roster, &PolicySection::default());
        let lengths: Vec<usize> = roster
            .iter()
            .map(|u| decode(u.password.as_deref().unwrap()).len())
            .collect();
        assert_eq!(lengths, vec![12, 12, 8]);
    }

    #[test]
    fn test_assign_passwords_custom_policy() {
        let policy = PolicySection {
            privileged_roles: vec!["Owner".into()],
            privileged_length: 20,
            default_length: 10,
        };
        let mut roster = vec![
            UserRecord::new("o", "O", "Owner"),
            UserRecord::new("a", "A", "Admin"),
        ];
        assign_passwords(&mut roster, &policy);
        assert_eq!(decode(roster[0].password.as_deref().unwrap()).len(), 20);
        assert_eq!(decode(roster[1].password.as_deref().unwrap()).len(), 10);
    }

    #[test]
    fn test_assign_passwords_non_string_role() {
        let mut roster = vec![UserRecord::new("n", "N", 3)];
        assign_passwords(&mut roster, &PolicySection::default());
        assert_eq!(decode(roster[0].password.as_deref().unwrap()).len(), 8);
    }

    proptest! {
        #[test]
        fn prop_password_matches_requested_length(len in 0usize..256) {
            let pw = generate_password(len);
            prop_assert_eq!(pw.chars().count(), len);
            prop_assert!(pw.chars().all(|c| c.is_ascii_alphanumeric()));
        }

        #[test]
        fn prop_role_length_policy(role in "[A-Za-z]{0,12}") {
            let policy = PolicySection::default();
            let expected = if role == "Admin" || role == "Editor" { 12 } else { 8 };
            let mut roster = vec![UserRecord::new("u", "U", role)];
            assign_passwords(&mut roster, &policy);
            let decoded = decode(roster[0].password.as_deref().unwrap());
            prop_assert_eq!(decoded.len(), expected);
        }
    }
}
