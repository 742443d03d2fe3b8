//! Property tests for the shared validation helpers

use proptest::prelude::*;
use uuid::Uuid;

use shared::validation::{dedupe_wishlist, validate_phone, validate_preference_tag};

proptest! {
    #[test]
    fn dedupe_is_idempotent(raw in prop::collection::vec(0u8..8, 0..40)) {
        // Map small ints onto a fixed pool of ids so duplicates are common
        let pool: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
        let mut wishlist: Vec<Uuid> = raw.iter().map(|i| pool[*i as usize]).collect();

        dedupe_wishlist(&mut wishlist);
        let once = wishlist.clone();
        dedupe_wishlist(&mut wishlist);

        prop_assert_eq!(&once, &wishlist);

        // No duplicates remain
        let mut seen = std::collections::HashSet::new();
        prop_assert!(wishlist.iter().all(|id| seen.insert(*id)));
    }

    #[test]
    fn dedupe_keeps_first_occurrence_order(raw in prop::collection::vec(0u8..5, 1..30)) {
        let pool: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let original: Vec<Uuid> = raw.iter().map(|i| pool[*i as usize]).collect();

        let mut deduped = original.clone();
        dedupe_wishlist(&mut deduped);

        // The deduped list is the original filtered to first occurrences
        let mut seen = std::collections::HashSet::new();
        let expected: Vec<Uuid> = original
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        prop_assert_eq!(deduped, expected);
    }

    #[test]
    fn digits_only_phones_in_range_are_accepted(digits in "[0-9]{7,15}") {
        prop_assert!(validate_phone(&digits).is_ok());
        let with_plus = format!("+{}", digits);
        prop_assert!(validate_phone(&with_plus).is_ok());
    }

    #[test]
    fn phones_with_letters_are_rejected(
        prefix in "[0-9]{3}",
        letter in "[a-z]",
        suffix in "[0-9]{4}",
    ) {
        let phone = format!("{}{}{}", prefix, letter, suffix);
        prop_assert!(validate_phone(&phone).is_err());
    }

    #[test]
    fn well_formed_preference_tags_are_accepted(tag in "[a-z0-9][a-z0-9_-]{0,49}") {
        prop_assert!(validate_preference_tag(&tag).is_ok());
    }

    #[test]
    fn uppercase_preference_tags_are_rejected(tag in "[A-Z][a-z]{0,10}") {
        prop_assert!(validate_preference_tag(&tag).is_err());
    }
}

#[test]
fn short_and_long_phones_are_rejected() {
    assert!(validate_phone("123456").is_err());
    assert!(validate_phone("1234567890123456").is_err());
    assert!(validate_phone("+").is_err());
}

#[test]
fn overlong_preference_tag_is_rejected() {
    let tag = "a".repeat(51);
    assert!(validate_preference_tag(&tag).is_err());
    assert!(validate_preference_tag("").is_err());
}
