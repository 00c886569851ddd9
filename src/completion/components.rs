//! Where in a URL the typed text matched.

use super::input::{parse_possibly_invalid_url, PLACEHOLDER_SCHEME};
use url::Host;

/// Components a match overlapped. Display trimming must keep these visible:
/// if "h" matched "http://foo/", showing "foo" would hide the match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchComponents {
    pub in_scheme: bool,
    pub in_subdomain: bool,
}

/// Classify byte ranges `[start, end)` of `url` that matched the input.
pub fn analyze(url: &str, match_positions: &[(usize, usize)]) -> MatchComponents {
    let mut components = MatchComponents::default();

    let Some(parsed) = parse_possibly_invalid_url(url) else {
        return components;
    };
    let placeholder = parsed.scheme() == PLACEHOLDER_SCHEME;
    let host = parsed.host_str().unwrap_or_default();

    // The two innermost labels approximate the registrable domain. IP
    // addresses have no subdomain.
    let is_ip = matches!(parsed.host(), Some(Host::Ipv4(_) | Host::Ipv6(_)));
    let labels: Vec<&str> = host.split('.').collect();
    let domain_len = if !is_ip && labels.len() > 2 {
        labels[labels.len() - 2..].join(".").len()
    } else {
        host.len()
    };
    let has_subdomain = !host.is_empty() && domain_len < host.len();

    let authority_start = url.find("://").map_or(0, |i| i + 3);
    let host_pos = url
        .get(authority_start..)
        .and_then(|rest| rest.find(host))
        .map_or(authority_start, |i| i + authority_start);

    // Stop one short of the domain to exclude the '.' delimiter.
    let subdomain_end = has_subdomain.then(|| host_pos + host.len() - domain_len - 1);

    for &(start, end) in match_positions {
        if start == 0 && !placeholder {
            components.in_scheme = true;
        }

        // Subdomain matches begin before the domain and end within the host or later.
        if !placeholder && subdomain_end.is_some_and(|sub_end| start < sub_end) && end > host_pos {
            components.in_subdomain = true;
        }
    }

    components
}
