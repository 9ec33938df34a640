//! Partial lookup errors

use super::ForgeError;

/// Creates a partial not found error
pub fn not_found(name: impl Into<String>) -> ForgeError {
    ForgeError::PartialNotFound { name: name.into() }
}

/// Creates a circular partial error from the in-progress stack and the repeated name
pub fn circular(stack: &[String], name: &str) -> ForgeError {
    let start = stack.iter().position(|n| n == name).unwrap_or(0);
    let mut chain: Vec<&str> = stack[start..].iter().map(String::as_str).collect();
    chain.push(name);
    ForgeError::CircularPartial {
        chain: chain.join(" -> "),
    }
}
