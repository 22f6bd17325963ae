use crate::config::ScopeConfig;
use url::Url;

/// Decides whether a URL is inside the configured crawl scope
///
/// Scope has three gates, all side-effect-free:
/// - scheme must be http or https
/// - host must match one of the allowed domain patterns
/// - the path must not end in an excluded (non-text) extension
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    allowed_domains: Vec<String>,
    excluded_extensions: Vec<String>,
}

impl ScopeFilter {
    /// Creates a scope filter from configuration
    pub fn new(config: &ScopeConfig) -> Self {
        Self {
            allowed_domains: config
                .allowed_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            excluded_extensions: config
                .excluded_extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    /// Returns true if the URL may be crawled
    pub fn is_in_scope(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        let host = match url.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        };

        if !self
            .allowed_domains
            .iter()
            .any(|pattern| matches_domain(pattern, &host))
        {
            return false;
        }

        let path = url.path().to_lowercase();
        if self
            .excluded_extensions
            .iter()
            .any(|ext| path.ends_with(ext.as_str()))
        {
            return false;
        }

        true
    }
}

/// Checks if a host matches a domain pattern
///
/// Two pattern forms are supported:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches:
///    - "example.com" (the bare domain)
///    - "blog.example.com" (single subdomain)
///    - "api.v2.example.com" (nested subdomains)
pub fn matches_domain(pattern: &str, host: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        host == base || host.ends_with(&format!(".{}", base))
    } else {
        host == pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> ScopeFilter {
        ScopeFilter::new(&ScopeConfig {
            allowed_domains: vec![
                "*.ics.uci.edu".to_string(),
                "*.cs.uci.edu".to_string(),
                "*.informatics.uci.edu".to_string(),
                "*.stat.uci.edu".to_string(),
            ],
            excluded_extensions: vec![
                ".css".to_string(),
                ".js".to_string(),
                ".png".to_string(),
                ".pdf".to_string(),
                ".zip".to_string(),
            ],
        })
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_in_scope_host() {
        assert!(filter().is_in_scope(&url("https://vision.ics.uci.edu/page")));
        assert!(filter().is_in_scope(&url("https://ics.uci.edu/about")));
        assert!(filter().is_in_scope(&url("http://www.cs.uci.edu/")));
    }

    #[test]
    fn test_out_of_scope_host() {
        assert!(!filter().is_in_scope(&url("https://example.com/")));
        assert!(!filter().is_in_scope(&url("https://uci.edu/")));
        // Suffix must match on a label boundary
        assert!(!filter().is_in_scope(&url("https://notics.uci.edu.evil.com/")));
    }

    #[test]
    fn test_scheme_gate() {
        assert!(!filter().is_in_scope(&url("ftp://vision.ics.uci.edu/file")));
        // Url::parse lowercases the scheme, so casing never leaks through
        assert!(filter().is_in_scope(&url("HTTPS://vision.ics.uci.edu/page")));
    }

    #[test]
    fn test_excluded_extension() {
        assert!(!filter().is_in_scope(&url("https://vision.ics.uci.edu/img.png")));
        assert!(!filter().is_in_scope(&url("https://vision.ics.uci.edu/style.css")));
        assert!(!filter().is_in_scope(&url("https://vision.ics.uci.edu/paper.PDF")));
    }

    #[test]
    fn test_extension_only_checked_on_path() {
        // A query parameter mentioning .png does not put the page out of scope
        assert!(filter().is_in_scope(&url("https://vision.ics.uci.edu/view?file=img.png")));
    }

    #[test]
    fn test_matches_domain_exact() {
        assert!(matches_domain("example.com", "example.com"));
        assert!(!matches_domain("example.com", "blog.example.com"));
        assert!(!matches_domain("example.com", "other.com"));
    }

    #[test]
    fn test_matches_domain_wildcard() {
        assert!(matches_domain("*.example.com", "example.com"));
        assert!(matches_domain("*.example.com", "blog.example.com"));
        assert!(matches_domain("*.example.com", "api.v2.example.com"));
        assert!(!matches_domain("*.example.com", "example.org"));
        assert!(!matches_domain("*.example.com", "myexample.com"));
    }

    #[test]
    fn test_exact_ip_host() {
        let f = ScopeFilter::new(&ScopeConfig {
            allowed_domains: vec!["127.0.0.1".to_string()],
            excluded_extensions: vec![],
        });
        assert!(f.is_in_scope(&url("http://127.0.0.1:8080/page")));
        assert!(!f.is_in_scope(&url("http://127.0.0.2/page")));
    }
}
