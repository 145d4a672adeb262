use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::shared::constants::MAX_HASHTAG_LENGTH;

lazy_static! {
    /// Characters not allowed in a normalized hashtag
    /// - Kept: lowercase ascii letters, digits and underscore
    /// - Everything else is replaced with `_`
    pub static ref HASHTAG_DISALLOWED_CHARS: Regex = Regex::new(r"[^a-z0-9_]").unwrap();

    /// 24h clock time used by opening hours, e.g. "08:00" or "21:30"
    pub static ref TIME_OF_DAY_REGEX: Regex = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").unwrap();
}

/// Rejects strings that are empty once surrounding whitespace is removed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Every hashtag must fit the tag column once trimmed and lower-cased.
/// Normalisation maps characters one to one, so this is the stored length.
pub fn validate_hashtags(tags: &[String]) -> Result<(), ValidationError> {
    let too_long = tags
        .iter()
        .any(|tag| tag.trim().to_lowercase().chars().count() > MAX_HASHTAG_LENGTH);
    if too_long {
        return Err(ValidationError::new("hashtag_too_long"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashtag_disallowed_chars() {
        assert_eq!(
            HASHTAG_DISALLOWED_CHARS.replace_all("pantai-indah 2", "_"),
            "pantai_indah_2"
        );
        assert!(!HASHTAG_DISALLOWED_CHARS.is_match("snake_case_99"));
    }

    #[test]
    fn test_time_of_day_regex() {
        assert!(TIME_OF_DAY_REGEX.is_match("00:00"));
        assert!(TIME_OF_DAY_REGEX.is_match("08:30"));
        assert!(TIME_OF_DAY_REGEX.is_match("23:59"));
        assert!(!TIME_OF_DAY_REGEX.is_match("24:00"));
        assert!(!TIME_OF_DAY_REGEX.is_match("8:30"));
        assert!(!TIME_OF_DAY_REGEX.is_match("08:60"));
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Pantai Kuta").is_ok());
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
    }

    #[test]
    fn test_validate_hashtags_length() {
        let fits = "a".repeat(MAX_HASHTAG_LENGTH);
        assert!(validate_hashtags(&[fits.clone(), format!("  {}  ", fits)]).is_ok());
        assert!(validate_hashtags(&["x".repeat(MAX_HASHTAG_LENGTH + 1)]).is_err());
        assert!(validate_hashtags(&[]).is_ok());
    }
}
