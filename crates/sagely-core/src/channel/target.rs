//! Channel target URL construction.
//!
//! The channel URL is scoped to the resolved session and, when a bearer
//! credential is cached, authenticated through a `token` query parameter.
//! The token never appears in `Debug`/`Display` output.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use sagely_types::config::ClientConfig;
use sagely_types::error::ChannelError;
use sagely_types::session::SessionId;

/// Fully-formed URL for one channel connection.
#[derive(Clone)]
pub struct ChannelTarget {
    url: Url,
    has_token: bool,
}

impl ChannelTarget {
    /// Build the channel URL for a session.
    ///
    /// Uses `config.ws_url` verbatim when set; otherwise derives it from the
    /// REST base by rewriting the scheme (`http` -> `ws`, `https` -> `wss`)
    /// and replacing the path with `/ws` at the host root.
    pub fn build(
        config: &ClientConfig,
        session: &SessionId,
        token: Option<&SecretString>,
    ) -> Result<Self, ChannelError> {
        let mut url = match &config.ws_url {
            Some(ws_url) => Url::parse(ws_url)
                .map_err(|e| ChannelError::Connect(format!("invalid ws_url '{ws_url}': {e}")))?,
            None => derive_from_base(&config.base_url)?,
        };

        url.query_pairs_mut()
            .append_pair("sessionId", session.as_str());
        if let Some(token) = token {
            url.query_pairs_mut()
                .append_pair("token", token.expose_secret());
        }

        Ok(Self {
            url,
            has_token: token.is_some(),
        })
    }

    /// The full URL, including the credential. Hand this only to the
    /// transport.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Loggable form with the credential masked.
    pub fn redacted(&self) -> String {
        if !self.has_token {
            return self.url.to_string();
        }
        let mut masked = self.url.clone();
        let pairs: Vec<(String, String)> = masked
            .query_pairs()
            .map(|(k, v)| {
                if k == "token" {
                    (k.into_owned(), "***".to_string())
                } else {
                    (k.into_owned(), v.into_owned())
                }
            })
            .collect();
        masked.query_pairs_mut().clear().extend_pairs(pairs);
        masked.to_string()
    }
}

impl std::fmt::Debug for ChannelTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelTarget")
            .field("url", &self.redacted())
            .finish()
    }
}

impl std::fmt::Display for ChannelTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.redacted())
    }
}

fn derive_from_base(base_url: &str) -> Result<Url, ChannelError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ChannelError::Connect(format!("invalid base_url '{base_url}': {e}")))?;

    let scheme = match url.scheme() {
        "https" => "wss",
        _ => "ws",
    };
    url.set_scheme(scheme)
        .map_err(|_| ChannelError::Connect(format!("cannot derive ws scheme from '{base_url}'")))?;
    url.set_path("/ws");
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
