//! Validation helpers for DTOs.

use validator::ValidationError;

/// Characters with routing meaning on event subjects.
const RESERVED_NAME_CHARS: [char; 3] = ['.', '*', '>'];

/// Validates that a room name can be embedded in an event subject.
///
/// # Examples
///
/// ```ignore
/// validate_room_name("friday-night") // Ok
/// validate_room_name("movie night")  // Err - whitespace
/// validate_room_name("room.*")       // Err - reserved characters
/// ```
pub fn validate_room_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("room_name_empty");
        err.message = Some("Room name must not be empty".into());
        return Err(err);
    }

    if name.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("room_name_whitespace");
        err.message = Some("Room name must not contain whitespace".into());
        return Err(err);
    }

    if let Some(reserved) = name.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        let mut err = ValidationError::new("room_name_reserved");
        err.message = Some(format!("Room name must not contain `{reserved}`").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_room_name_valid() {
        assert!(validate_room_name("r1").is_ok());
        assert!(validate_room_name("friday-night_42").is_ok());
        assert!(validate_room_name("soirée").is_ok());
    }

    #[test]
    fn test_validate_room_name_whitespace() {
        assert!(validate_room_name("").is_err());
        assert!(validate_room_name("   ").is_err());
        assert!(validate_room_name("movie night").is_err());
        assert!(validate_room_name("tab\there").is_err());
    }

    #[test]
    fn test_validate_room_name_reserved() {
        assert!(validate_room_name("a.b").is_err());
        assert!(validate_room_name("rooms*").is_err());
        assert!(validate_room_name(">").is_err());
    }
}
