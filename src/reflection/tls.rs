//! TLS session parameters and their display names.
//!
//! The listener attaches a [`TlsSession`] to every request that arrived on
//! an encrypted connection. Codes are kept numeric until display time so
//! an unknown suite never fails the request.

/// Negotiated parameters of the connection a request arrived on.
///
/// Inserted into request extensions by [`crate::net::tls::TlsInfoAcceptor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSession {
    /// Wire code of the negotiated protocol version (e.g. `0x0304`).
    pub version: Option<u16>,
    /// IANA code of the negotiated cipher suite (e.g. `0x1301`).
    pub cipher_suite: Option<u16>,
    /// Server name sent in the ClientHello.
    pub server_name: Option<String>,
    /// Negotiated ALPN protocol.
    pub alpn: Option<String>,
}

/// Display-ready TLS summary stored in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSummary {
    pub version: String,
    pub cipher_suite: String,
    pub server_name: String,
    pub alpn: String,
}

const CIPHER_SUITES: &[(u16, &str)] = &[
    (0x1301, "TLS_AES_128_GCM_SHA256"),
    (0x1302, "TLS_AES_256_GCM_SHA384"),
    (0x1303, "TLS_CHACHA20_POLY1305_SHA256"),
    (0xc02f, "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"),
    (0xc030, "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384"),
    (0xc02b, "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256"),
    (0xc02c, "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384"),
    (0x009c, "TLS_RSA_WITH_AES_128_GCM_SHA256"),
    (0x009d, "TLS_RSA_WITH_AES_256_GCM_SHA384"),
];

const PROTOCOL_VERSIONS: &[(u16, &str)] = &[
    (0x0301, "TLS1.0"),
    (0x0302, "TLS1.1"),
    (0x0303, "TLS1.2"),
    (0x0304, "TLS1.3"),
];

fn lookup(table: &[(u16, &str)], code: u16) -> String {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("{:#06x}", code))
}

/// Standard name of a cipher suite, or `0x%04x` when unknown.
pub fn cipher_suite_name(code: u16) -> String {
    lookup(CIPHER_SUITES, code)
}

/// Standard name of a protocol version, or `0x%04x` when unknown.
pub fn protocol_version_name(code: u16) -> String {
    lookup(PROTOCOL_VERSIONS, code)
}

impl TlsSession {
    /// Map the raw session codes to their display form.
    pub fn summarize(&self) -> TlsSummary {
        // A finished handshake always has both; zero only shows up for a
        // session that was recorded before negotiation completed.
        TlsSummary {
            version: protocol_version_name(self.version.unwrap_or_default()),
            cipher_suite: cipher_suite_name(self.cipher_suite.unwrap_or_default()),
            server_name: self.server_name.clone().unwrap_or_default(),
            alpn: self.alpn.clone().unwrap_or_default(),
        }
    }
}
