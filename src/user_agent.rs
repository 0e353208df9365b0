//! Shared User-Agent string for provider HTTP clients.

/// Default User-Agent for provider requests.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("clowds/{version} (music-client)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_product_and_version() {
        let ua = default_user_agent();
        assert_eq!(ua, format!("clowds/{} (music-client)", env!("CARGO_PKG_VERSION")));
        assert!(!ua.contains("http"));
    }
}
