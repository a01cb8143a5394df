//! Field extractors.
//!
//! Pure functions deriving individual reflection fields from the pieces of
//! an incoming request. None of them fail: a field that cannot be derived
//! falls back to the raw value or to empty.
//!
//! # Trust
//! `X-Forwarded-For`, `X-Real-Ip` and `X-Forwarded-Proto` are taken
//! verbatim from whoever sent the request. The values are for display
//! only and must not feed access-control decisions.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::body::{Body, HttpBody};
use axum::extract::ConnectInfo;
use axum::http::{header, Extensions, HeaderMap, Uri, Version};
use cookie::Cookie;
use url::form_urlencoded;

use super::tls::{TlsSession, TlsSummary};

/// Name to ordered values, iterated in sorted key order.
pub type MultiMap = BTreeMap<String, Vec<String>>;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_REAL_IP: &str = "x-real-ip";

/// One cookie as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePair {
    pub name: String,
    pub value: String,
}

/// First value of a header, if present and non-empty. Bytes outside
/// visible ASCII are decoded lossily rather than dropping the value.
fn first_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
        .filter(|v| !v.is_empty())
}

/// Split `host:port` or `[v6]:port`. Returns `None` when there is no port
/// or the address is otherwise malformed.
pub fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    let (host, port) = match addr.strip_prefix('[') {
        Some(rest) => {
            let (host, after) = rest.split_once(']')?;
            (host, after.strip_prefix(':')?)
        }
        None => {
            let (host, port) = addr.rsplit_once(':')?;
            if host.contains(':') {
                return None;
            }
            (host, port)
        }
    };
    if port.contains(':') || host.contains('[') || host.contains(']') {
        return None;
    }
    Some((host, port))
}

/// Transport peer address as a string, empty when the connection did not
/// record one.
pub fn remote_addr(extensions: &Extensions) -> String {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default()
}

/// `X-Forwarded-Proto` if set, else `https` for encrypted connections,
/// else `http`.
pub fn scheme(headers: &HeaderMap, tls: Option<&TlsSession>) -> String {
    if let Some(proto) = first_header(headers, X_FORWARDED_PROTO) {
        return proto.into_owned();
    }
    if tls.is_some() {
        "https".to_string()
    } else {
        "http".to_string()
    }
}

/// Client IP with forwarding headers taking precedence over the peer.
pub fn client_ip(headers: &HeaderMap, remote_addr: &str) -> String {
    if let Some(forwarded) = first_header(headers, X_FORWARDED_FOR) {
        let first = forwarded.split(',').next().unwrap_or_default();
        return first.trim().to_string();
    }
    if let Some(real_ip) = first_header(headers, X_REAL_IP) {
        return real_ip.into_owned();
    }
    match split_host_port(remote_addr) {
        Some((host, _)) => host.to_string(),
        None => remote_addr.to_string(),
    }
}

/// Port of the transport peer. Forwarding headers are ignored here.
pub fn client_port(remote_addr: &str) -> String {
    split_host_port(remote_addr)
        .map(|(_, port)| port.to_string())
        .unwrap_or_default()
}

/// `Host` as the client addressed it: URI authority (HTTP/2, absolute
/// form) first, then the `Host` header.
pub fn host(uri: &Uri, headers: &HeaderMap) -> String {
    uri.authority()
        .map(|a| a.as_str().to_string())
        .or_else(|| first_header(headers, header::HOST.as_str()).map(Cow::into_owned))
        .unwrap_or_default()
}

/// Path and query exactly as received.
pub fn request_target(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

pub fn protocol_version(version: Version) -> String {
    format!("{:?}", version)
}

/// Owned copy of every header, values in arrival order.
///
/// `None` when the request carried no headers at all.
pub fn header_snapshot(headers: &HeaderMap) -> Option<MultiMap> {
    if headers.is_empty() {
        return None;
    }
    let mut out = MultiMap::new();
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        out.insert(name.as_str().to_string(), values);
    }
    Some(out)
}

/// Decoded query parameters. `None` when the query is absent or empty.
pub fn query_snapshot(uri: &Uri) -> Option<MultiMap> {
    let query = uri.query()?;
    let mut out = MultiMap::new();
    for (name, value) in form_urlencoded::parse(query.as_bytes()) {
        out.entry(name.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Every cookie across all `Cookie` headers, duplicates kept.
pub fn cookie_snapshot(headers: &HeaderMap) -> Vec<CookiePair> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| Cookie::split_parse(line).filter_map(Result::ok))
        .map(|c| CookiePair {
            name: c.name().to_string(),
            value: c.value_trimmed().to_string(),
        })
        .collect()
}

pub fn transfer_encoding(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::TRANSFER_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Declared body length; `-1` when it is not known before reading.
pub fn content_length(headers: &HeaderMap, body: &Body) -> i64 {
    if let Some(declared) = first_header(headers, header::CONTENT_LENGTH.as_str())
        .and_then(|v| v.trim().parse::<i64>().ok())
    {
        return declared;
    }
    body.size_hint()
        .exact()
        .and_then(|n| i64::try_from(n).ok())
        .unwrap_or(-1)
}

pub fn tls_snapshot(tls: Option<&TlsSession>) -> Option<TlsSummary> {
    tls.map(TlsSession::summarize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn split_host_port_variants() {
        assert_eq!(split_host_port("198.51.100.7:54321"), Some(("198.51.100.7", "54321")));
        assert_eq!(split_host_port("[::1]:8080"), Some(("::1", "8080")));
        assert_eq!(split_host_port(":80"), Some(("", "80")));
        assert_eq!(split_host_port("198.51.100.7"), None);
        assert_eq!(split_host_port("::1"), None);
        assert_eq!(split_host_port("[::1]"), None);
        assert_eq!(split_host_port(""), None);
    }

    #[test]
    fn forwarded_for_takes_precedence() {
        let h = headers(&[
            ("x-forwarded-for", "203.0.113.5, 10.0.0.1"),
            ("x-real-ip", "192.0.2.1"),
        ]);
        assert_eq!(client_ip(&h, "198.51.100.7:54321"), "203.0.113.5");
    }

    #[test]
    fn real_ip_used_without_forwarded_for() {
        let h = headers(&[("x-real-ip", "192.0.2.1")]);
        assert_eq!(client_ip(&h, "198.51.100.7:54321"), "192.0.2.1");
    }

    #[test]
    fn peer_address_is_split() {
        let h = HeaderMap::new();
        assert_eq!(client_ip(&h, "198.51.100.7:54321"), "198.51.100.7");
        assert_eq!(client_port("198.51.100.7:54321"), "54321");
    }

    #[test]
    fn unsplittable_peer_is_returned_raw() {
        let h = HeaderMap::new();
        assert_eq!(client_ip(&h, "@unix-socket"), "@unix-socket");
        assert_eq!(client_port("@unix-socket"), "");
    }

    #[test]
    fn port_ignores_forwarding_headers() {
        assert_eq!(client_port(""), "");
    }

    #[test]
    fn scheme_precedence() {
        let tls = TlsSession::default();
        assert_eq!(scheme(&HeaderMap::new(), None), "http");
        assert_eq!(scheme(&HeaderMap::new(), Some(&tls)), "https");
        let h = headers(&[("x-forwarded-proto", "gopher")]);
        assert_eq!(scheme(&h, None), "gopher");
        let empty = headers(&[("x-forwarded-proto", "")]);
        assert_eq!(scheme(&empty, Some(&tls)), "https");
    }

    #[test]
    fn header_snapshot_keeps_value_order() {
        let h = headers(&[("x-b", "2"), ("accept", "text/html"), ("x-b", "1")]);
        let snap = header_snapshot(&h).unwrap();
        let keys: Vec<_> = snap.keys().cloned().collect();
        assert_eq!(keys, vec!["accept", "x-b"]);
        assert_eq!(snap["x-b"], vec!["2", "1"]);
    }

    #[test]
    fn no_headers_is_none() {
        assert!(header_snapshot(&HeaderMap::new()).is_none());
    }

    #[test]
    fn query_snapshot_decodes_and_groups() {
        let uri: Uri = "/path?b=2&a=x%20y&b=1&flag".parse().unwrap();
        let q = query_snapshot(&uri).unwrap();
        assert_eq!(q["a"], vec!["x y"]);
        assert_eq!(q["b"], vec!["2", "1"]);
        assert_eq!(q["flag"], vec![""]);
    }

    #[test]
    fn empty_query_is_none() {
        assert!(query_snapshot(&"/".parse().unwrap()).is_none());
        assert!(query_snapshot(&"/?".parse().unwrap()).is_none());
    }

    #[test]
    fn cookies_keep_duplicates_in_order() {
        let h = headers(&[("cookie", "a=1; b=2"), ("cookie", "a=3")]);
        let cookies = cookie_snapshot(&h);
        let flat: Vec<_> = cookies
            .iter()
            .map(|c| (c.name.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(flat, vec![("a", "1"), ("b", "2"), ("a", "3")]);
    }

    #[test]
    fn quoted_cookie_values_are_unwrapped() {
        let h = headers(&[("cookie", "a=\"quoted\"; b=plain")]);
        let cookies = cookie_snapshot(&h);
        assert_eq!(cookies[0].value, "quoted");
        assert_eq!(cookies[1].value, "plain");
    }

    #[test]
    fn non_ascii_forwarded_for_is_not_skipped() {
        let mut h = headers(&[("x-real-ip", "192.0.2.1")]);
        h.insert(
            X_FORWARDED_FOR,
            HeaderValue::from_bytes(b"203.0.113.5\xff, 10.0.0.1").unwrap(),
        );
        assert_eq!(client_ip(&h, "198.51.100.7:54321"), "203.0.113.5\u{fffd}");
    }

    #[test]
    fn transfer_encoding_tokens() {
        let h = headers(&[("transfer-encoding", "gzip, chunked")]);
        assert_eq!(transfer_encoding(&h), vec!["gzip", "chunked"]);
        assert!(transfer_encoding(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn content_length_sources() {
        let declared = headers(&[("content-length", "42")]);
        assert_eq!(content_length(&declared, &Body::empty()), 42);
        assert_eq!(content_length(&HeaderMap::new(), &Body::from("hello")), 5);

        let stream = futures_util::stream::iter(vec![Ok::<_, std::io::Error>("x")]);
        assert_eq!(content_length(&HeaderMap::new(), &Body::from_stream(stream)), -1);
    }

    #[test]
    fn remote_addr_from_connect_info() {
        let mut req = Request::new(());
        assert_eq!(remote_addr(req.extensions()), "");
        let addr: SocketAddr = "198.51.100.7:54321".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(remote_addr(req.extensions()), "198.51.100.7:54321");
    }

    #[test]
    fn host_prefers_authority() {
        let h = headers(&[("host", "example.com")]);
        assert_eq!(host(&"/".parse().unwrap(), &h), "example.com");
        assert_eq!(host(&"https://other.test/x".parse().unwrap(), &h), "other.test");
    }
}
