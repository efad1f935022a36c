/// Normalize a key cell for case-insensitive matching: trim, then uppercase.
///
/// Total and idempotent. Absent cells arrive as `""` and stay `""`.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_uppercase()
}
