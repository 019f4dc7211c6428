//! Common validation rules shared across request payloads.

use validator::ValidationError;

/// Validates employee identifier format.
///
/// Requirements:
/// - `E` prefix followed by the numeric sequence, e.g. `E1001`
/// - At least four digits after the prefix
pub fn validate_employee_id(id: &str) -> Result<(), ValidationError> {
    let digits = match id.strip_prefix('E') {
        Some(rest) => rest,
        None => return Err(ValidationError::new("employee_id_invalid_prefix")),
    };

    if digits.len() < 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("employee_id_invalid_sequence"));
    }

    Ok(())
}

/// Validates leave type code format.
///
/// Requirements:
/// - 1-10 characters in length
/// - Only uppercase ASCII letters and digits
pub fn validate_leave_type_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() || code.len() > 10 {
        return Err(ValidationError::new("leave_type_code_invalid_length"));
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(ValidationError::new("leave_type_code_invalid_characters"));
    }

    Ok(())
}
