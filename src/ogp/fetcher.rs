use std::time::Duration;

use encoding_rs::Encoding;
use lol_html::AsciiCompatibleEncoding;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use url::Url;

use crate::error::OgpError;
use crate::models::OgpData;

use super::extractor::TagExtractor;
use super::user_agent::UserAgentSelector;
use super::validator::ResourceValidator;

pub const MAX_REDIRECTS: usize = 10;

/// End-to-end extraction for a single URL.
#[derive(Debug, Clone)]
pub struct OgpFetcher {
    client: Client,
    validator: ResourceValidator,
    user_agents: UserAgentSelector,
}

impl OgpFetcher {
    /// Every outbound request (document and resource checks) is bounded by
    /// `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(OgpFetcher {
            validator: ResourceValidator::new(client.clone()),
            client,
            user_agents: UserAgentSelector::default(),
        })
    }

    pub fn with_user_agents(mut self, user_agents: UserAgentSelector) -> Self {
        self.user_agents = user_agents;
        self
    }

    /// The `User-Agent` sent for every request made on behalf of `url`.
    pub fn user_agent_for(&self, url: &Url) -> &str {
        self.user_agents.select(url.host_str().unwrap_or_default())
    }

    pub async fn fetch_ogp(&self, url: &Url) -> Result<OgpData, OgpError> {
        let user_agent = self.user_agent_for(url);

        let mut response = self
            .client
            .get(url.as_str())
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, url = %url, "Failed to fetch document");
                unreachable_error(url, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, url = %url, "Document fetch returned non-success status");
            return Err(unreachable_error(url, format!("status {status}")));
        }

        if let Some(content_type) = image_content_type(&response) {
            tracing::info!(%content_type, url = %url, "Refusing to extract from image");
            return Err(OgpError::UnsupportedContent {
                url: url.to_string(),
                content_type,
            });
        }

        let encoding = declared_encoding(&response);
        let mut extractor = TagExtractor::new(url);
        stream_into(&mut extractor, encoding, &mut response, url).await?;
        let mut data = extractor.finish();

        let (image_ok, favicon_ok) = tokio::join!(
            self.validator
                .validate_optional(data.image.as_deref(), user_agent),
            self.validator
                .validate_optional(data.favicon.as_deref(), user_agent),
        );
        if !image_ok {
            tracing::debug!(url = %url, "Dropping unreachable og:image");
            data.image = None;
        }
        if !favicon_ok {
            tracing::debug!(url = %url, "Dropping unreachable favicon");
            data.favicon = None;
        }

        tracing::debug!(url = %url, ?data, "Extracted OGP data");
        Ok(data)
    }
}

/// Feed the body to the extractor chunk by chunk as it arrives. A parser
/// failure keeps whatever was accumulated so far; the rest of the body is
/// still drained.
async fn stream_into(
    extractor: &mut TagExtractor,
    encoding: AsciiCompatibleEncoding,
    response: &mut Response,
    url: &Url,
) -> Result<(), OgpError> {
    let mut rewriter = Some(extractor.rewriter(encoding));

    while let Some(chunk) = response.chunk().await.map_err(|e| {
        tracing::warn!(error = %e, url = %url, "Failed to read document body");
        unreachable_error(url, e.to_string())
    })? {
        let failed = match rewriter.as_mut() {
            Some(r) => r.write(&chunk).err(),
            None => None,
        };
        if let Some(e) = failed {
            tracing::warn!(error = %e, url = %url, "Markup parsing stopped early");
            rewriter = None;
        }
    }

    if let Some(r) = rewriter {
        if let Err(e) = r.end() {
            tracing::warn!(error = %e, url = %url, "Markup parsing stopped early");
        }
    }
    Ok(())
}

fn image_content_type(response: &Response) -> Option<String> {
    let value = response.headers().get(CONTENT_TYPE)?.to_str().ok()?;
    value
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("image/")
        .then(|| value.to_string())
}

/// Initial decoding from the `charset` parameter of `Content-Type`, UTF-8
/// when absent, unknown or not ASCII-compatible.
fn declared_encoding(response: &Response) -> AsciiCompatibleEncoding {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(charset_label)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .and_then(AsciiCompatibleEncoding::new)
        .unwrap_or_else(AsciiCompatibleEncoding::utf_8)
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"'))
    })
}

fn unreachable_error(url: &Url, reason: String) -> OgpError {
    OgpError::Unreachable {
        url: url.to_string(),
        reason,
    }
}
