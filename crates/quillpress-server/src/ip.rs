//! Client IP resolution for anonymous engagement identities.

use std::net::SocketAddr;

use axum::http::HeaderMap;

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// The caller's IP: first entry of the forwarded-for chain when an edge
/// proxy set one, otherwise the socket peer address.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
        .unwrap_or_else(|| peer.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "192.0.2.1:40000".parse().unwrap()
    }

    #[test]
    fn forwarded_for_first_entry_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR_HEADER,
            "203.0.113.7, 10.0.0.1, 10.0.0.2".parse().unwrap(),
        );
        assert_eq!(client_ip(&headers, peer()), "203.0.113.7");
    }

    #[test]
    fn socket_address_is_the_fallback() {
        assert_eq!(client_ip(&HeaderMap::new(), peer()), "192.0.2.1");
    }

    #[test]
    fn empty_forwarded_for_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR_HEADER, "".parse().unwrap());
        assert_eq!(client_ip(&headers, peer()), "192.0.2.1");
    }
}
