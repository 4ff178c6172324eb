//! Cache keys derived from the host's build-session hash.

/// Prefix of every cache key.
pub const CACHE_NAME_PREFIX: &str = "smelt-lite-";

/// Derives the cache key for a build session.
///
/// A session without a hash lands in the degenerate `"smelt-lite-"` bucket;
/// that is a valid key, not an error.
pub fn cache_name(session_hash: Option<&str>) -> String {
    format!("{CACHE_NAME_PREFIX}{}", session_hash.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_with_hash() {
        assert_eq!(cache_name(Some("4f2a")), "smelt-lite-4f2a");
    }

    #[test]
    fn name_without_hash() {
        assert_eq!(cache_name(None), "smelt-lite-");
        assert_eq!(cache_name(None), cache_name(Some("")));
    }
}
