//! Cache key derivation.

/// Prefix shared by all department entries.
pub const DEPARTMENT_PREFIX: &str = "department:";

/// Key under which a department lookup result is cached.
pub fn department_key(department_id: &str) -> String {
    format!("{}{}", DEPARTMENT_PREFIX, department_id)
}
