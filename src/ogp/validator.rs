use reqwest::header::USER_AGENT;
use reqwest::Client;

/// Header-only existence checks for extracted resource URLs.
#[derive(Debug, Clone)]
pub struct ResourceValidator {
    client: Client,
}

impl ResourceValidator {
    /// `client` should follow redirects and carry a timeout; the validator
    /// relies on both.
    pub fn new(client: Client) -> Self {
        ResourceValidator { client }
    }

    /// `true` only when a HEAD request for `url` ends in a success status.
    pub async fn validate(&self, url: &str, user_agent: &str) -> bool {
        let response = match self
            .client
            .head(url)
            .header(USER_AGENT, user_agent)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, url, "Resource check failed");
                return false;
            }
        };

        let ok = response.status().is_success();
        if !ok {
            tracing::debug!(status = %response.status(), url, "Resource check returned non-success status");
        }
        ok
    }

    /// Like `validate`, but nothing to check counts as valid.
    pub(crate) async fn validate_optional(&self, url: Option<&str>, user_agent: &str) -> bool {
        match url {
            Some(url) => self.validate(url, user_agent).await,
            None => true,
        }
    }
}
