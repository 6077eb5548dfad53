//! Path component checks shared by the dispatcher and the local backend.

use crate::error::AppError;

/// A single path component: not empty, no separators, not `.` or `..`.
pub fn validate_name(field: &str, name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::invalid_input(field, "name cannot be empty"));
    }

    if name == "." || name == ".." {
        return Err(AppError::invalid_input(field, "name cannot be '.' or '..'"));
    }

    if let Some(c) = name.chars().find(|&c| !is_valid_name_char(c)) {
        return Err(AppError::invalid_input(
            field,
            format!("name cannot contain {c:?}"),
        ));
    }

    Ok(())
}

fn is_valid_name_char(c: char) -> bool {
    !matches!(c, '\0' | '/' | '\\') && !c.is_control()
}

/// Dot-files are hidden unless asked for.
#[must_use]
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
