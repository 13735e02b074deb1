use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

/// Placeholder shown for any missing scalar field.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder shown for a missing related person.
pub const UNKNOWN: &str = "Unknown";

/// Write `content` to `path` via a temp file in the same directory, so a
/// crash never leaves a half-written file behind.
pub fn atomic_write_str(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Restrict a file to owner read/write.
#[cfg(unix)]
pub fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
pub fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Trimmed, non-empty, and at most `max_len` characters.
pub fn validate_bounded_string(value: &str, field: &str, max_len: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Err(format!("{field} must be at most {max_len} characters"));
    }
    Ok(trimmed.to_string())
}

/// Ensure `value` is one of `allowed`.
pub fn validate_enum_string(value: &str, field: &str, allowed: &[&str]) -> Result<String, String> {
    let trimmed = value.trim();
    if allowed.contains(&trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(format!(
            "Invalid {field}: {value}. Expected one of: {}",
            allowed.join(", ")
        ))
    }
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .map(|re| re.is_match(email.trim()))
        .unwrap_or(false)
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Short date ("3/14/2025"), or "N/A" when missing or unparseable.
///
/// Example: "2025-03-14T09:30:00Z" → "3/14/2025"
pub fn format_date(value: Option<&str>) -> String {
    value
        .and_then(parse_timestamp)
        .map(|dt| dt.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Date and clock time for conversation history entries.
pub fn format_date_time(value: Option<&str>) -> String {
    value
        .and_then(parse_timestamp)
        .map(|dt| dt.format("%-m/%-d/%Y %-I:%M %p").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Upper-case status badge text.
///
/// Example: "in_progress" → "IN PROGRESS"
pub fn status_label(status: &str) -> String {
    status.replace('_', " ").to_uppercase()
}

/// Capitalize the first letter: "medium" → "Medium".
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Non-blank text or the given placeholder.
pub fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_variants() {
        assert_eq!(format_date(Some("2025-03-14T09:30:00Z")), "3/14/2025");
        assert_eq!(format_date(Some("2025-03-14T09:30:00.000Z")), "3/14/2025");
        assert_eq!(format_date(Some("2025-12-01")), "12/1/2025");
        assert_eq!(format_date(Some("not a date")), "N/A");
        assert_eq!(format_date(None), "N/A");
    }

    #[test]
    fn test_format_date_time() {
        assert_eq!(
            format_date_time(Some("2025-03-14T15:05:00Z")),
            "3/14/2025 3:05 PM"
        );
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label("in_progress"), "IN PROGRESS");
        assert_eq!(status_label("open"), "OPEN");
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("sarah.chen@acme.com"));
        assert!(!is_valid_email("sarah.chen@acme"));
        assert!(!is_valid_email("sarah chen@acme.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_validate_bounded_string() {
        assert_eq!(validate_bounded_string("  hi ", "Note", 10).unwrap(), "hi");
        assert!(validate_bounded_string("   ", "Note", 10).is_err());
        assert!(validate_bounded_string("abcdef", "Note", 3).is_err());
    }

    #[test]
    fn test_validate_enum_string() {
        assert!(validate_enum_string("open", "status", &["open", "closed"]).is_ok());
        let err = validate_enum_string("pending", "status", &["open", "closed"]).unwrap_err();
        assert!(err.contains("open, closed"));
    }

    #[test]
    fn test_or_placeholder() {
        assert_eq!(or_placeholder(Some(" "), UNKNOWN), "Unknown");
        assert_eq!(or_placeholder(Some("Dana"), UNKNOWN), "Dana");
        assert_eq!(or_placeholder(None, NOT_AVAILABLE), "N/A");
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.json");
        atomic_write_str(&path, "{\"a\":1}").unwrap();
        atomic_write_str(&path, "{\"a\":2}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\":2}");
    }
}
