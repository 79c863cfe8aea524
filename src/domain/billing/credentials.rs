//! Credential generation for provisioned accounts.
//!
//! Usernames are derived from the customer's name and email, checked
//! for uniqueness against the store, and suffixed or randomised until
//! a free one is found. Passwords are generated human-readable and
//! only ever persisted as an Argon2 hash.

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use rand::Rng;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::UserRepository;

/// Cleaned name components are capped at this length.
const COMPONENT_MAX: usize = 15;

/// Final usernames are capped at this length.
const USERNAME_MAX: usize = 30;

/// Numeric suffixes tried per candidate before moving on.
const SUFFIX_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

const ADJECTIVES: &[&str] = &[
    "brave", "calm", "clever", "eager", "gentle", "happy", "jolly", "kind", "lively", "merry",
    "proud", "quick", "sharp", "sunny", "swift", "witty",
];

const NOUNS: &[&str] = &[
    "falcon", "river", "maple", "comet", "harbor", "meadow", "summit", "ember", "breeze", "cedar",
    "lantern", "orchid", "pebble", "quartz", "thicket", "willow",
];

const PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789!@#$%&*";

/// Lower-cases, strips non-alphanumerics, and truncates a name
/// component.
fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .take(COMPONENT_MAX)
        .collect()
}

/// Builds the priority-ordered candidate list for a customer.
///
/// Empty components drop their candidates, so a customer without a
/// last name still gets a sensible list.
fn candidates(first_name: &str, last_name: &str, email: &str) -> Vec<String> {
    let first = clean(first_name);
    let last = clean(last_name);
    let local = clean(email.split('@').next().unwrap_or_default());

    let mut out = Vec::new();
    let mut push = |candidate: String| {
        if !candidate.is_empty() && !out.contains(&candidate) {
            out.push(candidate);
        }
    };

    if !first.is_empty() && !last.is_empty() {
        push(format!("{first}{last}"));
        push(format!("{first}_{last}"));
    }
    push(first.clone());
    push(last.clone());
    push(local);
    if !last.is_empty() {
        if let Some(f) = first.chars().next() {
            push(format!("{f}{last}"));
        }
    }
    if !first.is_empty() {
        if let Some(l) = last.chars().next() {
            push(format!("{first}{l}"));
        }
    }

    out
}

fn truncate(username: &str) -> String {
    username.chars().take(USERNAME_MAX).collect()
}

/// Generates a unique username for a new account.
///
/// Tries each candidate bare, then with numeric suffixes 1 through 10.
/// If every candidate is taken, falls back to a timestamp-derived
/// username, so generation only fails when the store itself does.
///
/// # Errors
///
/// - `DatabaseError` if a uniqueness check fails
pub async fn generate_username(
    users: &dyn UserRepository,
    first_name: &str,
    last_name: &str,
    email: &str,
) -> Result<String, DomainError> {
    for candidate in candidates(first_name, last_name, email) {
        let bare = truncate(&candidate);
        if !users.username_exists(&bare).await? {
            return Ok(bare);
        }
        // The suffix goes on after truncation; appending first would
        // let a max-length candidate truncate back to the taken name.
        for suffix in SUFFIX_RANGE {
            let suffixed = format!("{bare}{suffix}");
            if !users.username_exists(&suffixed).await? {
                return Ok(suffixed);
            }
        }
    }

    // Candidate space exhausted. A timestamp plus random tail is
    // effectively always free; loop for the pathological collision.
    loop {
        let tail: u32 = rand::thread_rng().gen_range(100..1000);
        let fallback = truncate(&format!("user{}{}", Timestamp::now().as_datetime().timestamp(), tail));
        if !users.username_exists(&fallback).await? {
            return Ok(fallback);
        }
    }
}

/// Generates a memorable temporary password: adjective, noun, and a
/// 3-digit number.
pub fn generate_readable_password() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES[rng.gen_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rng.gen_range(0..NOUNS.len())];
    let number: u32 = rng.gen_range(100..1000);
    format!("{adjective}-{noun}-{number}")
}

/// Generates a random password from a mixed-character alphabet for
/// contexts needing higher entropy than the readable form.
pub fn generate_secure_password(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| PASSWORD_ALPHABET[rng.gen_range(0..PASSWORD_ALPHABET.len())] as char)
        .collect()
}

/// Hashes a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// - `InternalError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Password hashing failed: {err}"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::domain::billing::user::User;
    use crate::domain::foundation::UserId;

    // ══════════════════════════════════════════════════════════════
    // Mock: UserRepository tracking taken usernames
    // ══════════════════════════════════════════════════════════════

    struct MockUserRepository {
        taken: Mutex<Vec<String>>,
    }

    impl MockUserRepository {
        fn with_taken(taken: &[&str]) -> Self {
            Self {
                taken: Mutex::new(taken.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
            Ok(self
                .taken
                .lock()
                .unwrap()
                .iter()
                .any(|taken| taken == username))
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Candidate Construction Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn clean_strips_and_lowercases() {
        assert_eq!(clean("José-Luis"), "josluis");
        assert_eq!(clean("O'Brien"), "obrien");
    }

    #[test]
    fn clean_truncates_to_component_max() {
        assert_eq!(clean("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmno");
    }

    #[test]
    fn candidates_are_priority_ordered() {
        let list = candidates("Jane", "Doe", "jane.d@example.com");
        // "janed" (email local part) already covers the first+initial
        // variant, which is deduplicated away.
        assert_eq!(
            list,
            vec!["janedoe", "jane_doe", "jane", "doe", "janed", "jdoe"]
        );
    }

    #[test]
    fn candidates_skip_empty_components() {
        let list = candidates("", "", "solo@example.com");
        assert_eq!(list, vec!["solo".to_string()]);
    }

    // ══════════════════════════════════════════════════════════════
    // Username Generation Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn first_free_candidate_wins() {
        let repo = MockUserRepository::with_taken(&[]);
        let username = generate_username(&repo, "Jane", "Doe", "jane@example.com")
            .await
            .unwrap();
        assert_eq!(username, "janedoe");
    }

    #[tokio::test]
    async fn collision_appends_numeric_suffix() {
        let repo = MockUserRepository::with_taken(&["janedoe"]);
        let username = generate_username(&repo, "Jane", "Doe", "jane@example.com")
            .await
            .unwrap();
        assert_eq!(username, "janedoe1");
    }

    #[tokio::test]
    async fn exhausted_candidate_moves_to_next() {
        let mut taken: Vec<String> = vec!["janedoe".to_string()];
        taken.extend((1..=10).map(|n| format!("janedoe{n}")));
        let taken_refs: Vec<&str> = taken.iter().map(String::as_str).collect();
        let repo = MockUserRepository::with_taken(&taken_refs);

        let username = generate_username(&repo, "Jane", "Doe", "jane@example.com")
            .await
            .unwrap();
        assert_eq!(username, "jane_doe");
    }

    #[tokio::test]
    async fn two_identical_customers_get_distinct_usernames() {
        let repo = MockUserRepository::with_taken(&[]);
        let first = generate_username(&repo, "Jane", "Doe", "jane@example.com")
            .await
            .unwrap();
        repo.taken.lock().unwrap().push(first.clone());

        let second = generate_username(&repo, "Jane", "Doe", "jane@example.com")
            .await
            .unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn max_length_candidate_still_gets_a_distinct_suffix() {
        // Both components clean to exactly 15 chars, so the bare
        // candidate sits at the 30-char cap. A collision must still
        // yield a new name, not the same 30 chars again.
        let repo = MockUserRepository::with_taken(&["maximilianaalexfeatherstonehau"]);
        let username = generate_username(
            &repo,
            "Maximiliana-Alexandrina",
            "Featherstonehaugh-Cholmondeley",
            "max@example.com",
        )
        .await
        .unwrap();
        assert_eq!(username, "maximilianaalexfeatherstonehau1");
    }

    #[tokio::test]
    async fn generated_username_respects_length_cap() {
        let repo = MockUserRepository::with_taken(&[]);
        let username = generate_username(
            &repo,
            "Maximiliana-Alexandrina",
            "Featherstonehaugh-Cholmondeley",
            "max@example.com",
        )
        .await
        .unwrap();
        assert!(username.len() <= USERNAME_MAX);
    }

    // ══════════════════════════════════════════════════════════════
    // Password Generation Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn readable_password_has_three_parts() {
        let password = generate_readable_password();
        let parts: Vec<&str> = password.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert!(ADJECTIVES.contains(&parts[0]));
        assert!(NOUNS.contains(&parts[1]));
        assert!(parts[2].parse::<u32>().is_ok());
    }

    #[test]
    fn secure_password_has_requested_length() {
        assert_eq!(generate_secure_password(24).len(), 24);
        assert_eq!(generate_secure_password(0).len(), 0);
    }

    #[test]
    fn hash_never_echoes_plaintext() {
        let password = generate_readable_password();
        let hash = hash_password(&password).unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains(&password));
    }

    // ══════════════════════════════════════════════════════════════
    // Property Tests
    // ══════════════════════════════════════════════════════════════

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn clean_output_is_bounded_lowercase_alnum(input in ".*") {
                let cleaned = clean(&input);

                prop_assert!(cleaned.len() <= COMPONENT_MAX);
                prop_assert!(cleaned
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase()));
            }

            #[test]
            fn candidates_never_contain_empty_entries(
                first in ".*",
                last in ".*",
                email in ".*",
            ) {
                let list = candidates(&first, &last, &email);

                prop_assert!(list.iter().all(|c| !c.is_empty()));
                // Deduped: no candidate is tried twice
                let mut seen = std::collections::HashSet::new();
                prop_assert!(list.iter().all(|c| seen.insert(c.clone())));
            }
        }
    }
}
