//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes.

use validator::Validate;

use crate::{error::WildError, slug::slugify};

/// Validate a request body, returning a WildError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), WildError> {
    body.validate().map_err(|e| WildError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>();
    // field_errors() is backed by a HashMap
    messages.sort();
    messages.join("; ")
}

/// Derive the slug for a name or title, rejecting input that leaves nothing
/// URL-safe behind (e.g. `"???"`).
pub fn slug_for(source: &str) -> Result<String, WildError> {
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(WildError::Validation {
            message: "Name must contain at least one letter or number".into(),
        });
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, max = 4, message = "Name must be 1-4 characters"))]
        name: String,
        #[validate(range(min = 10, message = "Goal must be at least 10"))]
        goal: i64,
    }

    #[test]
    fn test_validate_request_collects_messages() {
        let err = validate_request(&Sample {
            name: "too long".into(),
            goal: 3,
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: Goal must be at least 10; Name must be 1-4 characters"
        );
    }

    #[test]
    fn test_validate_request_ok() {
        assert!(validate_request(&Sample { name: "Lion".into(), goal: 10 }).is_ok());
    }

    #[test]
    fn test_slug_for_rejects_empty_slug() {
        assert!(slug_for("?!?").is_err());
        assert_eq!(slug_for("Red Panda").unwrap(), "red-panda");
    }
}
