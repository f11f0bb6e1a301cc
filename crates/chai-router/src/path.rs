//! Route path and view key normalisation

/// Normalise a route path
///
/// Ensures a leading slash, collapses repeated slashes and strips the trailing
/// slash. An empty path becomes the root `/`.
#[must_use]
pub fn normalize_route_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    for segment in path.trim().split('/').filter(|s| !s.is_empty()) {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Canonical registry key for a view reference
///
/// Leading slashes and a file extension on the last segment are dropped, so
/// `/system/user/index.vue` and `system/user/index` name the same view.
#[must_use]
pub fn canonical_view_key(reference: &str) -> String {
    let trimmed = reference.trim().trim_start_matches('/');
    let (dir, file) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));
    let stem = match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    };
    if dir.is_empty() {
        stem.to_string()
    } else {
        format!("{dir}/{stem}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_route_path() {
        let cases = [
            ("", "/"),
            ("/", "/"),
            ("//", "/"),
            ("system", "/system"),
            ("/system/", "/system"),
            ("system//user///list/", "/system/user/list"),
            ("  /monitor/cache  ", "/monitor/cache"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_route_path(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn test_canonical_view_key() {
        let cases = [
            ("system/user/index", "system/user/index"),
            ("/system/user/index.vue", "system/user/index"),
            ("///monitor/cache/CacheView", "monitor/cache/CacheView"),
            ("dashboard.vue", "dashboard"),
            ("system/.hidden", "system/.hidden"),
        ];
        for (input, expected) in cases {
            assert_eq!(canonical_view_key(input), expected, "input {input:?}");
        }
    }
}
