//! Comma-separated name lists as used by `--addons` and `--targets`.

/// The target name that applies to every configured target.
///
/// It is always a valid target, even when the configuration declares none.
pub const WILDCARD_TARGET: &str = "*";

/// Splits a comma-separated list into trimmed, non-empty names.
///
/// `"zip, zap ,zup"` yields `["zip", "zap", "zup"]`. Order is preserved and
/// duplicates are kept; deduplication is left to the consumer.
pub fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins names with a bare comma, the form used in diagnostic messages.
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_trims_entries() {
        assert_eq!(split_names("zip, zap, zup"), vec!["zip", "zap", "zup"]);
        assert_eq!(split_names("  one ,two  "), vec!["one", "two"]);
    }

    #[test]
    fn split_single_name() {
        assert_eq!(split_names("expected"), vec!["expected"]);
    }

    #[test]
    fn split_drops_empty_entries() {
        assert!(split_names("").is_empty());
        assert_eq!(split_names("a,,b, "), vec!["a", "b"]);
    }

    #[test]
    fn join_without_spaces() {
        assert_eq!(join_names(&["unknown", "known"]), "unknown,known");
        assert_eq!(join_names::<&str>(&[]), "");
    }
}
