use std::net::IpAddr;
use url::{Host, Url};

use crate::error::{AppError, Result};

const ALLOWED_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// Checks that `input` is a non-empty absolute URL with a usable host.
///
/// Surrounding whitespace is ignored; whitespace inside the URL is not.
pub fn validate_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::EmptyUrl);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidUrl);
    }

    let url = Url::parse(trimmed).map_err(|_| AppError::InvalidUrl)?;
    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(AppError::InvalidUrl);
    }

    match url.host() {
        Some(Host::Domain(domain)) if is_valid_domain(domain) => Ok(url),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => Ok(url),
        _ => Err(AppError::InvalidUrl),
    }
}

fn is_valid_domain(domain: &str) -> bool {
    if domain.eq_ignore_ascii_case("localhost") {
        return true;
    }
    // Bare IPs that `url` leaves as a domain (e.g. non-special schemes).
    if domain.parse::<IpAddr>().is_ok() {
        return true;
    }

    let labels: Vec<&str> = domain.trim_end_matches('.').split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
