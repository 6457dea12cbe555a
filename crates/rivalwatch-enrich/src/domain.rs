/// Normalises user or provider input to a bare host name:
/// lowercased, without scheme, `www.` prefix, port, path or trailing dot.
///
/// ```
/// use rivalwatch_enrich::domain::clean_domain;
///
/// assert_eq!(clean_domain("https://WWW.Acme.com/about"), "acme.com");
/// assert_eq!(clean_domain("acme.com."), "acme.com");
/// ```
pub fn clean_domain(raw: &str) -> String {
    let mut d = raw.trim().to_lowercase();
    if let Some(idx) = d.find("://") {
        d = d[idx + 3..].to_string();
    }
    if let Some(idx) = d.find(['/', '?', '#']) {
        d.truncate(idx);
    }
    if let Some(idx) = d.rfind(':') {
        d.truncate(idx);
    }
    let d = d.trim_end_matches('.');
    d.strip_prefix("www.").unwrap_or(d).to_string()
}

/// Second-level domain: `azure.microsoft.com` becomes `microsoft.com`.
pub fn root_domain(domain: &str) -> String {
    let domain = clean_domain(domain);
    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() >= 2 {
        parts[parts.len() - 2..].join(".")
    } else {
        domain
    }
}

/// A syntactically plausible host name: at least two labels made of
/// alphanumerics and hyphens.
pub fn is_valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|l| {
            !l.is_empty()
                && l.len() <= 63
                && !l.starts_with('-')
                && !l.ends_with('-')
                && l.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_strips_decorations() {
        assert_eq!(clean_domain("  Acme.COM "), "acme.com");
        assert_eq!(clean_domain("http://www.acme.com:8080/x?y"), "acme.com");
        assert_eq!(clean_domain("shop.acme.com"), "shop.acme.com");
        assert_eq!(clean_domain(""), "");
    }

    #[test]
    fn root_of_subdomain() {
        assert_eq!(root_domain("azure.microsoft.com"), "microsoft.com");
        assert_eq!(root_domain("www.google.com"), "google.com");
        assert_eq!(root_domain("localhost"), "localhost");
    }

    #[test]
    fn validity() {
        assert!(is_valid_domain("acme.com"));
        assert!(is_valid_domain("my-shop.co.uk"));
        assert!(!is_valid_domain("acme"));
        assert!(!is_valid_domain("acme..com"));
        assert!(!is_valid_domain("ac me.com"));
        assert!(!is_valid_domain("-acme.com"));
    }
}
