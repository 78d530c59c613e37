pub fn chunked<T: Clone>(v: &[T], size: usize) -> Vec<Vec<T>> {
    v.chunks(size.max(1)).map(|c| c.to_vec()).collect()
}

pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Comma separated env var, blanks dropped.
pub fn env_list(key: &str) -> Vec<String> {
    env_or(key, "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
