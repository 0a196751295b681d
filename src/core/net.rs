// src/core/net.rs
// Blocking HTTP GET with a rotating browser header pool.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

use crate::config::consts::REQUEST_TIMEOUT_SECS;
use crate::error::TransportError;

/// Raw response: status plus body text. Status is checked by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fetched {
    pub status: u16,
    pub body: String,
}

impl Fetched {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, body: body.into() }
    }

    /// Body of a 2xx response; anything else is a transport failure.
    pub fn into_body(self) -> Result<String, TransportError> {
        if (200..300).contains(&self.status) {
            Ok(self.body)
        } else {
            Err(TransportError::Status(self.status))
        }
    }
}

/// The fetch capability the collectors depend on.
pub trait Fetch {
    fn get(&self, url: &str) -> Result<Fetched, TransportError>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> Result<Fetched, TransportError>,
{
    fn get(&self, url: &str) -> Result<Fetched, TransportError> {
        self(url)
    }
}

struct HeaderSet {
    user_agent: &'static str,
    accept_language: &'static str,
    accept: &'static str,
}

const HEADER_POOL: [HeaderSet; 3] = [
    HeaderSet {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
        accept_language: "en-US,en;q=0.9",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    },
    HeaderSet {
        user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Safari/605.1.15",
        accept_language: "en-GB,en;q=0.9",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
    },
    HeaderSet {
        user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
        accept_language: "en-US,en;q=0.8",
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.7",
    },
];

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .map_err(map_reqwest)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<Fetched, TransportError> {
        let mut req = self.client.get(url);
        if let Some(h) = HEADER_POOL.choose(&mut rand::thread_rng()) {
            req = req
                .header(USER_AGENT, h.user_agent)
                .header(ACCEPT_LANGUAGE, h.accept_language)
                .header(ACCEPT, h.accept);
        }

        let resp = req.send().map_err(map_reqwest)?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(map_reqwest)?;
        Ok(Fetched { status, body })
    }
}

fn map_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_2xx_is_transport_failure() {
        assert_eq!(Fetched::ok("x").into_body(), Ok(s!("x")));
        let f = Fetched { status: 503, body: s!("busy") };
        assert_eq!(f.into_body(), Err(TransportError::Status(503)));
    }

    #[test]
    fn closures_are_fetchers() {
        let stub = |url: &str| -> Result<Fetched, TransportError> { Ok(Fetched::ok(url.to_uppercase())) };
        assert_eq!(stub.get("abc").unwrap().body, "ABC");
    }
}
