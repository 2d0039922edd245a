//! Routing decision for the opt-in secure fetch wrapper.

/// Resource paths whose traffic is sealed when a session is established.
pub const DEFAULT_SECURE_ENDPOINTS: [&str; 13] = [
    "/api/keys",
    "/api/add",
    "/api/remove",
    "/api/config",
    "/api/keys/reorder",
    "/api/passwords",
    "/api/passwords/add",
    "/api/passwords/delete",
    "/api/passwords/get",
    "/api/passwords/update",
    "/api/passwords/reorder",
    "/api/passwords/export",
    "/api/passwords/import",
];

/// True if `target` contains any allow-listed pattern as a substring.
///
/// Pure function of the request target; session state is not consulted.
pub fn should_secure<S: AsRef<str>>(target: &str, patterns: &[S]) -> bool {
    patterns
        .iter()
        .any(|pattern| target.contains(pattern.as_ref()))
}

/// Default allow-list as owned strings.
pub fn default_secure_endpoints() -> Vec<String> {
    DEFAULT_SECURE_ENDPOINTS
        .iter()
        .map(|p| p.to_string())
        .collect()
}
