//! IP-to-ASN resolution
//!
//! Two lookup services are supported:
//! - `api.iptoasn.com` over HTTPS (JSON)
//! - Team Cymru's WHOIS service (`whois.cymru.com`, TCP port 43)
//!
//! Lookups are sequential and uncached. A failed lookup only drops that peer.

use indicatif::ProgressBar;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::io::{Read, Write};
use std::net::{IpAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AsnSource;
use crate::error::{ResolutionError, Result};
use crate::types::{Asn, AsnRecord, Peer, ResolvedPeer};

const IPTOASN_URL: &str = "https://api.iptoasn.com/v1/as/ip";

const CYMRU_WHOIS_HOST: &str = "whois.cymru.com";
const WHOIS_PORT: u16 = 43;

/// Service that maps a single IP address to its origin AS
pub trait AsnLookup {
    fn lookup(&self, ip: IpAddr) -> std::result::Result<AsnRecord, ResolutionError>;
}

/// Build the lookup backend selected in the configuration
pub fn lookup_for(source: AsnSource, timeout: Duration) -> Result<Box<dyn AsnLookup>> {
    let lookup: Box<dyn AsnLookup> = match source {
        AsnSource::Iptoasn => Box::new(IptoasnClient::new(timeout)?),
        AsnSource::Cymru => Box::new(CymruWhois::new(timeout)),
    };
    Ok(lookup)
}

// =============================================================================
// IPTOASN (HTTP)
// =============================================================================

/// `api.iptoasn.com` reply
#[derive(Debug, Deserialize)]
struct IptoasnReply {
    #[serde(default)]
    announced: bool,
    #[serde(default)]
    as_number: u32,
    #[serde(default)]
    as_description: String,
    #[serde(default)]
    as_country_code: String,
}

impl IptoasnReply {
    fn into_record(self) -> std::result::Result<AsnRecord, ResolutionError> {
        if !self.announced || self.as_number == 0 {
            return Err(ResolutionError::NotAnnounced);
        }
        debug!(asn = self.as_number, country = %self.as_country_code, "iptoasn match");
        Ok(AsnRecord::new(Asn(self.as_number), &self.as_description))
    }
}

/// Lookup client for the iptoasn.com JSON API
pub struct IptoasnClient {
    base_url: String,
    client: Client,
}

impl IptoasnClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(IPTOASN_URL, timeout)
    }

    /// Point the client at another iptoasn-compatible server
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

impl AsnLookup for IptoasnClient {
    fn lookup(&self, ip: IpAddr) -> std::result::Result<AsnRecord, ResolutionError> {
        let url = format!("{}/{}", self.base_url, ip);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()?;

        // iptoasn answers 404 for addresses it has no range for
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolutionError::NotAnnounced);
        }
        if !response.status().is_success() {
            return Err(ResolutionError::Status(response.status()));
        }

        let body = response.text()?;
        let reply: IptoasnReply = serde_json::from_str(&body)?;
        reply.into_record()
    }
}

// =============================================================================
// TEAM CYMRU (WHOIS)
// =============================================================================

/// Lookup client for Team Cymru's WHOIS IP-to-ASN service
pub struct CymruWhois {
    server: String,
    timeout: Duration,
}

impl CymruWhois {
    pub fn new(timeout: Duration) -> Self {
        Self::with_server(&format!("{}:{}", CYMRU_WHOIS_HOST, WHOIS_PORT), timeout)
    }

    /// Use another WHOIS server speaking the Cymru reply format (`host:port`)
    pub fn with_server(server: &str, timeout: Duration) -> Self {
        Self {
            server: server.to_string(),
            timeout,
        }
    }

    fn query(&self, ip: IpAddr) -> std::io::Result<String> {
        let addr = self.server.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "No DNS address found for WHOIS server",
            )
        })?;

        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        stream.write_all(ip.to_string().as_bytes())?;
        stream.write_all(b"\r\n")?;

        let mut reply = String::new();
        stream.read_to_string(&mut reply)?;
        Ok(reply)
    }
}

impl AsnLookup for CymruWhois {
    fn lookup(&self, ip: IpAddr) -> std::result::Result<AsnRecord, ResolutionError> {
        let reply = self.query(ip)?;
        parse_cymru_reply(&reply)
    }
}

/// Parse a Cymru WHOIS reply
///
/// Sample reply:
///
///   AS      | IP               | AS Name
///   23028   | 216.90.108.31    | TEAM-CYMRU - Team Cymru Inc., US
///
/// When an address has several origins the first column lists them all,
/// space separated; the first one is used.
fn parse_cymru_reply(reply: &str) -> std::result::Result<AsnRecord, ResolutionError> {
    for line in reply.lines() {
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() < 3 || fields[0].eq_ignore_ascii_case("AS") {
            continue;
        }
        if fields[0] == "NA" {
            return Err(ResolutionError::NotAnnounced);
        }

        let asn = fields[0]
            .split_whitespace()
            .next()
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(|| ResolutionError::Malformed(line.to_string()))?;

        let name = if fields[2] == "NA" { "" } else { fields[2] };
        return Ok(AsnRecord::new(Asn(asn), name));
    }

    Err(ResolutionError::Malformed(reply.trim().to_string()))
}

// =============================================================================
// PIPELINE STAGE
// =============================================================================

/// Resolve every peer in received order, dropping the ones that fail
pub fn resolve_peers(
    lookup: &dyn AsnLookup,
    peers: &[Peer],
    progress: &ProgressBar,
) -> Vec<ResolvedPeer> {
    let mut resolved = Vec::with_capacity(peers.len());

    for peer in peers {
        progress.set_message(peer.remote_ip.clone());

        match resolve_one(lookup, &peer.remote_ip) {
            Ok(r) => {
                debug!(ip = %r.ip, asn = %r.asn, name = %r.name, "resolved peer");
                resolved.push(r);
            }
            Err(e) => {
                progress.suspend(|| {
                    warn!(ip = %peer.remote_ip, error = %e, "ASN lookup failed, skipping peer");
                });
            }
        }

        progress.inc(1);
    }

    progress.finish_and_clear();
    resolved
}

fn resolve_one(
    lookup: &dyn AsnLookup,
    remote_ip: &str,
) -> std::result::Result<ResolvedPeer, ResolutionError> {
    let ip: IpAddr = remote_ip
        .trim()
        .parse()
        .map_err(|_| ResolutionError::InvalidAddress(remote_ip.to_string()))?;

    let record = lookup.lookup(ip)?;
    Ok(ResolvedPeer {
        ip,
        asn: record.asn,
        name: record.name,
    })
}
