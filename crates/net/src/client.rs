//! Thin `reqwest` wrapper that follows redirects manually so every hop's
//! URL and status code survives into the [`Response`], the way
//! `lemmiwinks.httplib.client` keeps the whole chain rather than just the
//! final URL — the migration core aliases every intermediate URL to the
//! path the final body was written to.

use core::time::Duration;

use archive_core::{Error, Hop, Response, Result};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use url::Url;

const MAX_REDIRECTS: usize = 20;

/// A connect/read-timeout-bound HTTP client for fetching migration
/// resources.
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// # Errors
    /// Returns `Error::Fatal` if the underlying `reqwest` client cannot be
    /// built.
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self> {
        let inner = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|source| Error::Fatal(format!("failed building http client: {source}")))?;
        Ok(Self { inner })
    }

    /// Fetch `url`, following redirects manually and recording every hop.
    pub async fn fetch(&self, url: &Url) -> Result<Response> {
        let mut hops = Vec::new();
        let mut current = url.clone();
        loop {
            let response = self
                .inner
                .get(current.clone())
                .send()
                .await
                .map_err(|source| Error::Network {
                    url: current.to_string(),
                    message: source.to_string(),
                })?;
            let status = response.status();
            hops.push(Hop {
                url: current.clone(),
                status: status.as_u16(),
            });

            if status.is_redirection() {
                if hops.len() >= MAX_REDIRECTS {
                    return Err(Error::Network {
                        url: current.to_string(),
                        message: "too many redirects".into(),
                    });
                }
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or_else(|| Error::Network {
                        url: current.to_string(),
                        message: "redirect response without Location header".into(),
                    })?;
                current = current
                    .join(location)
                    .map_err(|source| Error::UrlValidation(source.to_string()))?;
                continue;
            }

            if status != StatusCode::OK {
                return Err(Error::HttpStatus {
                    url: current.to_string(),
                    status: status.as_u16(),
                });
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(ToOwned::to_owned);
            let body = response.bytes().await.map_err(|source| Error::Network {
                url: current.to_string(),
                message: source.to_string(),
            })?;
            return Ok(Response::new(body, content_type, hops));
        }
    }
}
