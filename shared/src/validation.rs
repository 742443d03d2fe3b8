//! Validation utilities for the Yacht Charter Marketplace
//!
//! Field-level checks shared by the backend request handlers.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Longest an admin invitation may remain open
pub const MAX_INVITATION_DAYS: i64 = 30;

/// Validate a phone number: optional leading '+', 7-15 digits
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("Phone number must contain only digits after an optional '+'");
    }
    if digits.len() < 7 || digits.len() > 15 {
        return Err("Phone number must be 7-15 digits");
    }
    Ok(())
}

/// Validate a consumer preference tag (e.g. "sailing", "luxury")
pub fn validate_preference_tag(tag: &str) -> Result<(), &'static str> {
    if tag.is_empty() || tag.len() > 50 {
        return Err("Preference tag must be 1-50 characters");
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        return Err("Preference tag must be lowercase alphanumeric with '_' or '-'");
    }
    Ok(())
}

/// Validate an invitation expiry: in the future, at most MAX_INVITATION_DAYS out
pub fn validate_invitation_expiry(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), &'static str> {
    if expires_at <= now {
        return Err("Invitation expiry must be in the future");
    }
    if expires_at > now + Duration::days(MAX_INVITATION_DAYS) {
        return Err("Invitation expiry must be within 30 days");
    }
    Ok(())
}

/// Deduplicate a wishlist in place, keeping the first occurrence of each id
pub fn dedupe_wishlist(wishlist: &mut Vec<Uuid>) {
    let mut seen = std::collections::HashSet::new();
    wishlist.retain(|id| seen.insert(*id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_phone_numbers() {
        assert!(validate_phone("+306912345678").is_ok());
        assert!(validate_phone("2101234567").is_ok());
        assert!(validate_phone("+12025550147").is_ok());
    }

    #[test]
    fn invalid_phone_numbers() {
        assert!(validate_phone("").is_err());
        assert!(validate_phone("+").is_err());
        assert!(validate_phone("12345").is_err()); // too short
        assert!(validate_phone("1234567890123456").is_err()); // too long
        assert!(validate_phone("210-123-4567").is_err()); // punctuation
    }

    #[test]
    fn valid_preference_tags() {
        assert!(validate_preference_tag("sailing").is_ok());
        assert!(validate_preference_tag("luxury-yachts").is_ok());
        assert!(validate_preference_tag("crew_included").is_ok());
    }

    #[test]
    fn invalid_preference_tags() {
        assert!(validate_preference_tag("").is_err());
        assert!(validate_preference_tag("Sailing").is_err());
        assert!(validate_preference_tag("a b").is_err());
        assert!(validate_preference_tag(&"x".repeat(51)).is_err());
    }

    #[test]
    fn invitation_expiry_window() {
        let now = Utc::now();
        assert!(validate_invitation_expiry(now + Duration::days(7), now).is_ok());
        assert!(validate_invitation_expiry(now, now).is_err());
        assert!(validate_invitation_expiry(now - Duration::days(1), now).is_err());
        assert!(validate_invitation_expiry(now + Duration::days(31), now).is_err());
    }

    #[test]
    fn wishlist_dedupe_keeps_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut wishlist = vec![a, b, a, b, a];
        dedupe_wishlist(&mut wishlist);
        assert_eq!(wishlist, vec![a, b]);
    }
}
