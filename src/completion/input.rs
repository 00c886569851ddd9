//! Classification of raw address bar text.
//!
//! Every keystroke produces one [`ClassifiedInput`]. The decision tree in
//! [`classify_text`] is order sensitive: each rule only sees inputs that
//! every earlier rule let through.

use super::scheme::SchemeClassifier;
use crate::config;
use regex::Regex;
use serde::Serialize;
use std::net::Ipv6Addr;
use std::sync::LazyLock;
use url::{Host, Url};

/// Scheme used to coax schemeless text through the URL parser.
pub const PLACEHOLDER_SCHEME: &str = "empty";

/// `javascript:` followed by something unlikely to be code.
/// The class admits an empty run, so any input containing `javascript:` matches.
static JAVASCRIPT_NOT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"javascript:([^;=()."]*)"#).expect("static regex compiles"));

/// What the user most likely meant by the text in the address bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputType {
    /// Nothing but whitespace
    Empty,
    /// Could be either; the caller decides what to fall back to
    Unknown,
    /// Something to navigate to
    Url,
    /// Something to search for
    Query,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostnameFamily {
    Ipv6,
    Ipv4,
    Neutral,
}

/// Structured pieces of the typed text. Empty strings mean "not present".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UrlParts {
    pub scheme: String,
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub path: String,
    pub query: String,
}

impl UrlParts {
    pub fn from_url(url: &Url) -> Self {
        let scheme = if url.scheme() == PLACEHOLDER_SCHEME {
            String::new()
        } else {
            url.scheme().to_string()
        };

        Self {
            scheme,
            username: url.username().to_string(),
            password: url.password().unwrap_or_default().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port().map(|p| p.to_string()).unwrap_or_default(),
            path: url.path().to_string(),
            query: url.query().unwrap_or_default().to_string(),
        }
    }
}

/// Number of present components other than the host.
pub fn num_non_host_components(parts: &UrlParts) -> usize {
    [
        &parts.scheme,
        &parts.username,
        &parts.password,
        &parts.port,
        &parts.path,
        &parts.query,
    ]
    .iter()
    .filter(|c| !c.is_empty())
    .count()
}

/// Parse `text` as a URL without ever failing loudly.
///
/// Text with an explicit scheme parses as-is. Anything else is wrapped in
/// the placeholder scheme so its host and path can still be inspected,
/// unless it contains a space, in which case there is nothing to inspect.
pub fn parse_possibly_invalid_url(text: &str) -> Option<Url> {
    match Url::parse(text) {
        Ok(url) if !is_host_and_port(&url, text) => Some(url),
        _ if text.contains(' ') => None,
        _ => Url::parse(&format!("{PLACEHOLDER_SCHEME}://{text}")).ok(),
    }
}

/// Schemes with an authority section the URL parser always understands.
pub fn is_standard_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https" | "ws" | "wss" | "ftp" | "file")
}

/// "localhost:8080" and "www.example.com:81" parse as a scheme followed by
/// an opaque path; treat them as a host and a port instead.
fn is_host_and_port(url: &Url, text: &str) -> bool {
    if is_standard_scheme(url.scheme()) {
        return false;
    }

    let Some(rest) = text.get(url.scheme().len() + 1..) else {
        return false;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();

    digits > 0 && matches!(rest.as_bytes().get(digits), None | Some(b'/' | b'?' | b'#'))
}

fn hostname_family(url: &Url) -> HostnameFamily {
    match url.host() {
        Some(Host::Ipv6(_)) => HostnameFamily::Ipv6,
        Some(Host::Ipv4(_)) => HostnameFamily::Ipv4,
        Some(Host::Domain(domain)) => {
            let bare = domain.trim_start_matches('[').trim_end_matches(']');
            if bare.parse::<Ipv6Addr>().is_ok() {
                HostnameFamily::Ipv6
            } else if looks_like_ipv4(domain) {
                HostnameFamily::Ipv4
            } else {
                HostnameFamily::Neutral
            }
        }
        None => HostnameFamily::Neutral,
    }
}

/// One to four dot-separated numbers, as IPv4 canonicalization accepts them
/// ("1.2", "3232235521", "0x7f.1").
fn looks_like_ipv4(host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host);
    let components: Vec<&str> = host.split('.').collect();

    (1..=4).contains(&components.len()) && components.iter().all(|c| ipv4_component_value(c).is_some())
}

fn ipv4_component_value(component: &str) -> Option<u64> {
    if let Some(hex) = component
        .strip_prefix("0x")
        .or_else(|| component.strip_prefix("0X"))
    {
        return if hex.is_empty() { Some(0) } else { u64::from_str_radix(hex, 16).ok() };
    }
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    component.parse().ok()
}

fn ipv4_components(host: &str) -> Vec<&str> {
    host.strip_suffix('.').unwrap_or(host).split('.').collect()
}

fn is_zero_component(component: &str) -> bool {
    ipv4_component_value(component) == Some(0)
}

/// Whether the last label of `host` is a top-level domain we recognise.
pub fn has_known_tld(host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host);
    match host.rsplit_once('.') {
        Some((rest, tld)) if !rest.is_empty() => {
            let tld = tld.to_ascii_lowercase();
            config::COMMON_TLDS.contains(&tld.as_str())
        }
        _ => false,
    }
}

/// The part of the typed text that names the host, before any parsing
/// could have escaped or dropped characters.
fn typed_host_segment(text: &str) -> &str {
    let rest = text.split_once("://").map_or(text, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#', '\\']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    if host_port.starts_with('[') {
        return host_port;
    }
    host_port.rsplit_once(':').map_or(host_port, |(host, _)| host)
}

fn has_space_in_username(username: &str) -> bool {
    !username.is_empty()
        && urlencoding::decode(username)
            .map(|decoded| decoded.contains(' '))
            .unwrap_or_else(|_| username.contains(' '))
}

/// Outcome of running the decision tree over a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub input_type: InputType,
    /// Navigable form of the text; `None` when it cannot be made into a URL
    pub canonical_url: Option<Url>,
    /// Scheme the user typed, empty when none was
    pub scheme: String,
    pub parts: UrlParts,
}

impl Classification {
    fn new(input_type: InputType) -> Self {
        Self {
            input_type,
            canonical_url: None,
            scheme: String::new(),
            parts: UrlParts::default(),
        }
    }
}

/// Classify `text`, which must already be free of leading whitespace.
pub fn classify_text(text: &str, desired_tld: &str, schemes: &dyn SchemeClassifier) -> Classification {
    if text.trim().is_empty() {
        return Classification::new(InputType::Empty);
    }

    let url = parse_possibly_invalid_url(text);
    let placeholder = url.as_ref().is_some_and(|u| u.scheme() == PLACEHOLDER_SCHEME);
    let canonical_url = match &url {
        Some(_) if placeholder => Url::parse(&format!("http://{text}")).ok(),
        Some(u) => Some(u.clone()),
        None => None,
    };

    let mut result = Classification::new(InputType::Unknown);
    if let Some(u) = &url {
        result.parts = UrlParts::from_url(u);
        result.scheme = result.parts.scheme.clone();
    }
    result.canonical_url = canonical_url;

    // Without a navigable form nothing downstream can produce a URL match.
    let Some(url) = url.filter(|_| result.canonical_url.is_some()) else {
        result.input_type = InputType::Query;
        return result;
    };

    if result.scheme == "file" {
        result.input_type = InputType::Url;
        return result;
    }

    if JAVASCRIPT_NOT_CODE.is_match(text) {
        result.input_type = InputType::Unknown;
        return result;
    }

    if !result.scheme.is_empty() && result.scheme != "http" && result.scheme != "https" {
        let scheme_type = schemes.input_type_for_scheme(&result.scheme);
        if scheme_type != InputType::Empty {
            result.input_type = scheme_type;
            return result;
        }

        // Maybe "username:password@host" rather than a scheme.
        let http = classify_text(&format!("http://{text}"), desired_tld, schemes);
        if http.input_type == InputType::Url
            && !http.parts.username.is_empty()
            && !http.parts.password.is_empty()
        {
            let mut parts = http.parts;
            parts.scheme.clear();
            // Credentials without a desired TLD read like an email address.
            let input_type = if desired_tld.is_empty() {
                InputType::Unknown
            } else {
                InputType::Url
            };
            return Classification {
                input_type,
                canonical_url: http.canonical_url,
                scheme: String::new(),
                parts,
            };
        }

        // Most likely a search operator such as "site:".
        result.input_type = InputType::Unknown;
        return result;
    }

    let family = hostname_family(&url);
    let parts = &result.parts;

    if family == HostnameFamily::Neutral && typed_host_segment(text).contains(' ') {
        let tld_without_space = has_known_tld(&parts.host) && !parts.host.contains(' ');
        result.input_type = if !parts.scheme.is_empty() || tld_without_space {
            InputType::Unknown
        } else {
            InputType::Query
        };
        return result;
    }

    if family == HostnameFamily::Ipv6 {
        result.input_type = InputType::Url;
        return result;
    }

    if family == HostnameFamily::Ipv4 {
        let address = ipv4_components(&parts.host);
        let first_is_zero = address.first().is_some_and(|c| is_zero_component(c));
        let all_zero = address.iter().all(|c| is_zero_component(c));

        // 0.x.x.x are source addresses, except 0.0.0.0 which usually means localhost.
        if (!first_is_zero || all_zero) && address.len() == 4 {
            result.input_type = InputType::Url;
            return result;
        }
        if first_is_zero {
            result.input_type = InputType::Query;
            return result;
        }
    }

    if !parts.scheme.is_empty() {
        result.input_type = InputType::Url;
        return result;
    }

    let username_has_space = has_space_in_username(&parts.username);

    if !username_has_space && (parts.path.ends_with('/') || parts.path.ends_with('\\')) {
        result.input_type = InputType::Url;
        return result;
    }

    // Two or three numeric components ("13.5/7.25") without a scheme or
    // trailing slash are almost certainly arithmetic.
    if family == HostnameFamily::Ipv4 && ipv4_components(&parts.host).len() > 1 {
        result.input_type = InputType::Query;
        return result;
    }

    if username_has_space {
        result.input_type = InputType::Unknown;
        return result;
    }

    if num_non_host_components(parts) > 1 {
        result.input_type = InputType::Url;
        return result;
    }

    // "user@host" is more likely an email address than HTTP auth.
    if !parts.username.is_empty() && desired_tld.is_empty() {
        result.input_type = InputType::Unknown;
        return result;
    }

    if has_known_tld(&parts.host) || parts.host == "localhost" || !parts.port.is_empty() {
        result.input_type = InputType::Url;
        return result;
    }

    result.input_type = InputType::Unknown;
    result
}

/// Caller-supplied knobs for one classification.
#[derive(Debug, Clone)]
pub struct InputOptions {
    /// Cursor offset in characters, `None` when unknown
    pub cursor_position: Option<usize>,
    /// TLD the user asked to append (ctrl+enter), empty for none
    pub desired_tld: String,
    pub prevent_inline_autocomplete: bool,
    pub prefer_keyword: bool,
    pub want_asynchronous_matches: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            cursor_position: None,
            desired_tld: String::new(),
            prevent_inline_autocomplete: false,
            prefer_keyword: false,
            want_asynchronous_matches: true,
        }
    }
}

/// Classified address bar input for one keystroke.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedInput {
    pub raw_text: String,
    /// `raw_text` without leading whitespace
    pub text: String,
    pub cursor_position: Option<usize>,
    pub input_type: InputType,
    #[serde(serialize_with = "serialize_url")]
    pub canonical_url: Option<Url>,
    pub scheme: String,
    pub parts: UrlParts,
    pub desired_tld: String,
    pub prevent_inline_autocomplete: bool,
    pub prefer_keyword: bool,
    pub want_asynchronous_matches: bool,
}

fn serialize_url<S: serde::Serializer>(url: &Option<Url>, serializer: S) -> Result<S::Ok, S::Error> {
    match url {
        Some(url) => serializer.serialize_some(url.as_str()),
        None => serializer.serialize_none(),
    }
}

fn adjust_cursor_position(leading_chars_removed: usize, cursor_position: Option<usize>) -> Option<usize> {
    cursor_position.map(|pos| pos.saturating_sub(leading_chars_removed))
}

impl ClassifiedInput {
    pub fn new(raw_text: &str, options: InputOptions, schemes: &dyn SchemeClassifier) -> Self {
        // Leading whitespace never matters to providers.
        let text = raw_text.trim_start();
        let removed = raw_text.chars().count() - text.chars().count();
        let cursor_position = adjust_cursor_position(removed, options.cursor_position);

        let classification = classify_text(text, &options.desired_tld, schemes);

        Self {
            raw_text: raw_text.to_string(),
            text: text.to_string(),
            cursor_position,
            input_type: classification.input_type,
            canonical_url: classification.canonical_url,
            scheme: classification.scheme,
            parts: classification.parts,
            desired_tld: options.desired_tld,
            prevent_inline_autocomplete: options.prevent_inline_autocomplete,
            prefer_keyword: options.prefer_keyword,
            want_asynchronous_matches: options.want_asynchronous_matches,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.input_type == InputType::Empty
    }
}
