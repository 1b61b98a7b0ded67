use ::url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use finn_scraper::url::extract_domain;
///
/// let url = Url::parse("https://WWW.FINN.NO/car/used/search.html").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.finn.no".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether a host belongs to a domain
///
/// The bare domain matches, as does any of its subdomains, so `finn.no`
/// accepts both `finn.no` and `www.finn.no` but not `notfinn.no`.
///
/// # Examples
///
/// ```
/// use finn_scraper::url::host_matches;
///
/// assert!(host_matches("finn.no", "finn.no"));
/// assert!(host_matches("finn.no", "www.finn.no"));
/// assert!(!host_matches("finn.no", "notfinn.no"));
/// ```
pub fn host_matches(domain: &str, host: &str) -> bool {
    let domain = domain.to_lowercase();
    let host = host.to_lowercase();
    host == domain || host.ends_with(&format!(".{}", domain))
}
