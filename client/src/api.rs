//! Adapter HTTP - Implementazioni reqwest dei trasporti usati dai componenti

use crate::chat::{ByteStream, ChatPanel, ChatTransport};
use crate::dto::{
    ChatRequest, ErrorBody, LockBody, ModerationListResponse, ModerationUpdate,
    ModerationUpdateResponse, ReasonBody, StoredMessage, UserListResponse, UserRow,
};
use crate::error::{ClientError, Result};
use crate::list::{ListApi, ListQuery, Page};
use crate::moderation::{ModerationApi, ModerationItem, ModerationStatus};
use crate::session::{ClientOptions, Session};
use futures::stream::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone)]
pub struct CoachApi {
    http: reqwest::Client,
    session: Session,
    options: ClientOptions,
}

impl CoachApi {
    pub fn new(session: Session, options: ClientOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .build()?;
        Ok(Self {
            http,
            session,
            options,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Pannello di chat su questo client, con il limite di cronologia delle opzioni
    pub fn chat_panel(self) -> ChatPanel<Self> {
        let limit = self.options.history_limit;
        ChatPanel::new(self).with_history_limit(limit)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.session.endpoint(path)?;
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, self.session.bearer()))
    }

    /// Richiesta JSON con timeout complessivo
    fn json_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self
            .request(method, path)?
            .timeout(self.options.request_timeout))
    }

    #[instrument(skip(self, query))]
    pub async fn list_users(&self, query: &ListQuery) -> Result<UserListResponse> {
        let response = self
            .json_request(Method::GET, "/api/admin/users")?
            .query(&query.to_query_pairs())
            .send()
            .await?;
        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn list_moderation(
        &self,
        page: u32,
        limit: u32,
        status: Option<ModerationStatus>,
    ) -> Result<ModerationListResponse> {
        let mut params = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(status) = status {
            params.push(("status", status.as_wire().to_string()));
        }
        let response = self
            .json_request(Method::GET, "/api/admin/moderation")?
            .query(&params)
            .send()
            .await?;
        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn moderation_item(&self, item_id: &str) -> Result<ModerationItem> {
        let response = self
            .json_request(Method::GET, &format!("/api/admin/moderation/{item_id}"))?
            .send()
            .await?;
        read_json(response).await
    }

    /// Cronologia salvata dal server, in ordine cronologico
    #[instrument(skip(self))]
    pub async fn history(&self, limit: Option<u32>) -> Result<Vec<StoredMessage>> {
        let mut builder = self.json_request(Method::GET, "/api/coach/history")?;
        if let Some(limit) = limit {
            builder = builder.query(&[("limit", limit)]);
        }
        read_json(builder.send().await?).await
    }

    #[instrument(skip(self, reason))]
    pub async fn flag_message(&self, message_id: i64, reason: &str) -> Result<ModerationItem> {
        let response = self
            .json_request(Method::POST, &format!("/api/coach/messages/{message_id}/flag"))?
            .json(&ReasonBody { reason })
            .send()
            .await?;
        read_json(response).await
    }

    #[instrument(skip(self, reason))]
    pub async fn warn_user(&self, user_id: i64, reason: &str) -> Result<ModerationItem> {
        let response = self
            .json_request(Method::POST, &format!("/api/admin/users/{user_id}/warn"))?
            .json(&ReasonBody { reason })
            .send()
            .await?;
        read_json(response).await
    }

    #[instrument(skip(self))]
    pub async fn lock_user(&self, user_id: i64, locked: bool) -> Result<UserRow> {
        let response = self
            .json_request(Method::PATCH, &format!("/api/admin/users/{user_id}/lock"))?
            .json(&LockBody { locked })
            .send()
            .await?;
        read_json(response).await
    }
}

/// Converte una risposta non 2xx in `ClientError::Status`, con il messaggio del server se presente
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => {
            if let Some(details) = &err.details {
                debug!("Server error details: {}", details);
            }
            err.error
        }
        Err(_) => status.canonical_reason().unwrap_or_default().to_string(),
    };
    warn!("Request failed with {}: {}", status, message);
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = check(response).await?.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl ChatTransport for CoachApi {
    #[instrument(skip(self, request))]
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream> {
        let response = self
            .request(Method::POST, "/api/coach/chat")?
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await?;
        let response = check(response).await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ClientError::from))
            .boxed())
    }
}

impl ModerationApi for CoachApi {
    #[instrument(skip(self, update), fields(item_id = %update.item_id))]
    async fn update(&self, update: &ModerationUpdate) -> Result<ModerationItem> {
        let response = self
            .json_request(Method::PATCH, "/api/admin/moderation")?
            .json(update)
            .send()
            .await?;
        let body: ModerationUpdateResponse = read_json(response).await?;
        match (body.success, body.item) {
            (true, Some(item)) => Ok(item),
            (_, _) => Err(ClientError::Rejected(
                body.error
                    .unwrap_or_else(|| "Moderation update was not applied".to_string()),
            )),
        }
    }
}

impl ListApi<UserRow> for CoachApi {
    async fn fetch(&self, query: &ListQuery) -> Result<Page<UserRow>> {
        let response = self.list_users(query).await?;
        Ok(Page {
            rows: response.users,
            pagination: response.pagination,
        })
    }
}
