//! URL path / method name consistency
//!
//! Plain string comparison on the final `/`-delimited segment. No case folding
//! and no trailing-slash trimming: `/rpc/Action/` does not end with `Action`.

/// Final `/`-delimited segment of `path` (empty when the path ends in `/`)
pub fn last_part(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// True when the final segment of `path` is exactly `method`
pub fn path_has_method(path: &str, method: &str) -> bool {
    !method.is_empty() && last_part(path) == method
}
