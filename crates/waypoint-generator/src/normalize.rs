//! URL canonicalisation and apex-domain lookup.

use psl::{List, Psl};
use std::borrow::Cow;
use std::net::IpAddr;
use tracing::{debug, trace};
use url::Url;

/// Whether the input could be canonicalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeOutcome {
    /// The input parsed and was rewritten into canonical form.
    Clean,
    /// The input did not parse; the trimmed input is used as-is.
    Degraded,
}

/// A canonical URL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    url: String,
    outcome: NormalizeOutcome,
}

impl Normalized {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn outcome(&self) -> NormalizeOutcome {
        self.outcome
    }

    pub fn is_degraded(&self) -> bool {
        self.outcome == NormalizeOutcome::Degraded
    }

    pub fn into_string(self) -> String {
        self.url
    }
}

/// Canonicalises a URL so that equivalent spellings compare equal.
///
/// - `https://` is prepended when no scheme is present,
/// - the scheme is forced to `https` and an explicit `:443` is dropped,
/// - the host is lower-cased,
/// - the fragment is removed,
/// - query parameters are stably sorted by key.
///
/// Never fails: input that does not parse comes back trimmed and flagged
/// [`NormalizeOutcome::Degraded`]. The function is idempotent.
pub fn normalize(input: &str) -> Normalized {
    let trimmed = input.trim();

    match parse_canonical(trimmed) {
        Some(url) => Normalized {
            url: url.into(),
            outcome: NormalizeOutcome::Clean,
        },
        None => {
            debug!(input = %trimmed, "url did not parse, using raw input");
            Normalized {
                url: trimmed.to_string(),
                outcome: NormalizeOutcome::Degraded,
            }
        }
    }
}

/// Returns the registrable (apex) domain of `url`, e.g. `example.co.uk` for
/// `https://a.b.example.co.uk/`.
///
/// Falls back to the bare hostname when the public suffix list has no
/// registrable domain for it (IP addresses, `localhost`, bare suffixes).
/// Returns an empty string when no hostname can be found at all.
pub fn base_domain(url: &str) -> String {
    let Some(host) = hostname(url) else {
        return String::new();
    };

    match registrable_domain(&host) {
        Some(apex) => apex,
        None => {
            trace!(host = %host, "no registrable domain, using hostname");
            host
        }
    }
}

/// Extracts the lower-cased hostname of `url`.
///
/// Uses a real URL parse when possible and a plain textual split otherwise.
pub fn hostname(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if let Some(parsed) = parse_canonical(trimmed) {
        return parsed.host_str().map(str::to_string);
    }
    split_hostname(trimmed)
}

fn parse_canonical(trimmed: &str) -> Option<Url> {
    let candidate: Cow<'_, str> = if has_scheme(trimmed) {
        Cow::Borrowed(trimmed)
    } else {
        Cow::Owned(format!("https://{}", trimmed))
    };

    let mut url = Url::parse(&candidate).ok()?;

    if url.scheme() != "https" && url.set_scheme("https").is_err() {
        // Non-special schemes can't be switched to a special one in place.
        let rest = &candidate[url.scheme().len()..];
        url = Url::parse(&format!("https{}", rest)).ok()?;
    }

    if url.host_str().map_or(true, str::is_empty) {
        return None;
    }

    if url.port() == Some(443) {
        url.set_port(None).ok()?;
    }

    url.set_fragment(None);
    sort_query(&mut url);

    Some(url)
}

fn sort_query(url: &mut Url) {
    if url.query().is_none() {
        return;
    }

    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    // stable: equal keys keep their relative order
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

/// `scheme://` where scheme is `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn split_hostname(input: &str) -> Option<String> {
    let without_scheme = match input.split_once("://") {
        Some((_, rest)) if has_scheme(input) => rest,
        _ => input,
    };

    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let host = host_port.split(':').next().unwrap_or_default().trim();

    if host.is_empty() || host.contains(char::is_whitespace) {
        return None;
    }

    Some(host.to_ascii_lowercase())
}

fn registrable_domain(host: &str) -> Option<String> {
    if host.starts_with('[') || host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let domain = List.domain(host.as_bytes())?;
    std::str::from_utf8(domain.as_bytes())
        .ok()
        .map(str::to_string)
}
