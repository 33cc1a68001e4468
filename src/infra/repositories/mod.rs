pub mod sqlite_user_repo;
pub mod sqlite_property_repo;
pub mod sqlite_booking_repo;

pub mod postgres_user_repo;
pub mod postgres_property_repo;
pub mod postgres_booking_repo;
pub mod store_health;

/// Case-insensitive substring pattern for `LOWER(col) LIKE ? ESCAPE '\'`.
/// User input is matched literally.
pub(crate) fn contains_pattern(needle: Option<&str>) -> Option<String> {
    let needle = needle.map(str::trim).filter(|n| !n.is_empty())?;
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}
