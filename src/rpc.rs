// RPC client for querying the node's peer-networking status

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{NetInfo, NetInfoResponse};

const NET_INFO_PATH: &str = "/net_info";

/// RPC client for a Tendermint/CometBFT node
pub struct RpcClient {
    url: String,
    client: Client,
}

impl RpcClient {
    /// Create new RPC client against a base URL such as `http://localhost:26657`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: net_info_url(base_url),
            client,
        })
    }

    /// Full URL of the `net_info` endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the node's peer list
    pub fn net_info(&self) -> Result<NetInfo> {
        debug!(url = %self.url, "querying net_info");

        let response = self.client.get(&self.url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: self.url.clone(),
                status,
            });
        }

        let body = response.text()?;
        decode_net_info(&body)
    }
}

/// Decode a `net_info` body into the peer list
pub fn decode_net_info(body: &str) -> Result<NetInfo> {
    let response: NetInfoResponse = serde_json::from_str(body)?;

    if let Some(error) = response.error {
        let message = match error.data {
            Some(data) if !data.is_empty() => format!("{} ({})", error.message, data),
            _ => error.message,
        };
        return Err(Error::Rpc {
            code: error.code,
            message,
        });
    }

    response.result.ok_or(Error::EmptyResponse)
}

fn net_info_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), NET_INFO_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one HTTP response on a local port and return the base URL
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let reply = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_net_info_url() {
        assert_eq!(
            net_info_url("http://localhost:26657"),
            "http://localhost:26657/net_info"
        );
        assert_eq!(
            net_info_url("http://localhost:26657/"),
            "http://localhost:26657/net_info"
        );
    }

    #[test]
    fn test_client_url() {
        let client = RpcClient::new("http://127.0.0.1:26657", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:26657/net_info");
    }

    #[test]
    fn test_fetch_net_info() {
        let base = serve_once(
            "200 OK",
            r#"{"jsonrpc":"2.0","id":-1,"result":{"listening":true,"listeners":[],"n_peers":"1","peers":[{"is_outbound":true,"remote_ip":"198.51.100.4"}]}}"#,
        );
        let client = RpcClient::new(&base, Duration::from_secs(5)).unwrap();
        let info = client.net_info().unwrap();
        assert_eq!(info.n_peers, "1");
        assert_eq!(info.peers[0].remote_ip, "198.51.100.4");
    }

    #[test]
    fn test_fetch_bad_json_is_decode_error() {
        let base = serve_once("200 OK", "<html>not json</html>");
        let client = RpcClient::new(&base, Duration::from_secs(5)).unwrap();
        assert!(matches!(client.net_info(), Err(Error::Decode(_))));
    }

    #[test]
    fn test_fetch_http_error_status() {
        let base = serve_once("500 Internal Server Error", "{}");
        let client = RpcClient::new(&base, Duration::from_secs(5)).unwrap();
        assert!(matches!(client.net_info(), Err(Error::HttpStatus { .. })));
    }

    #[test]
    fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port with nothing listening
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client =
            RpcClient::new(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2)).unwrap();
        assert!(matches!(client.net_info(), Err(Error::Network(_))));
    }

    #[test]
    fn test_decode_rpc_error_member() {
        let body = r#"{"jsonrpc":"2.0","id":-1,"error":{"code":-32601,"message":"Method not found"}}"#;
        match decode_net_info(body) {
            Err(Error::Rpc { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_envelope() {
        assert!(matches!(
            decode_net_info(r#"{"jsonrpc":"2.0","id":-1}"#),
            Err(Error::EmptyResponse)
        ));
    }
}
