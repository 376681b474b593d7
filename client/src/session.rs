//! Sessione - Contesto esplicito dell'utente autenticato
//!
//! Il token arriva dall'identity provider; il client lo riceve dal chiamante
//! e lo passa ai componenti che ne hanno bisogno.

use crate::error::Result;
use std::fmt;
use std::time::Duration;
use url::Url;

#[derive(Clone)]
pub struct Session {
    base_url: Url,
    token: String,
    pub user_id: i64,
    pub display_name: String,
}

impl Session {
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        user_id: i64,
        display_name: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            token: token.into(),
            user_id,
            display_name: display_name.into(),
        })
    }

    /// Valore dell'header `Authorization`
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL assoluto di un endpoint dell'API
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"****")
            .field("user_id", &self.user_id)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Opzioni del client HTTP
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Timeout delle richieste JSON; lo stream della chat non ha limite complessivo
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub history_limit: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            history_limit: crate::chat::HISTORY_LIMIT,
        }
    }
}
