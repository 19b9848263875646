// ============================================================================
// Sitenav Gateway - HTTP Menu Gateway
// File: crates/sitenav-gateway/src/http/menu_gateway_impl.rs
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use sitenav_core::domain::{MenuCreate, MenuNode, MenuReplace};
use sitenav_core::error::DomainError;
use sitenav_core::gateway::MenuGateway;
use sitenav_shared::config::ApiSettings;
use sitenav_shared::EntityId;

use super::dto::{CreateMenuBody, Envelope, MenuDto, ReplaceMenuBody};

#[derive(Clone)]
pub struct HttpMenuGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpMenuGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration, token: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
            token,
        }
    }

    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new(
            settings.base_url.clone(),
            Duration::from_secs(settings.timeout_secs),
            settings.token.clone(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// A rejected credential terminates the session globally; everything
    /// else inside the envelope is a validation rejection.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>, DomainError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DomainError::SessionExpired);
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;

        if !envelope.success {
            return Err(DomainError::ValidationRejected(
                envelope
                    .message
                    .unwrap_or_else(|| "request rejected".to_string()),
            ));
        }
        Ok(envelope)
    }

    async fn decode_data<T: DeserializeOwned>(response: Response) -> Result<T, DomainError> {
        Self::decode::<T>(response)
            .await?
            .data
            .ok_or_else(|| DomainError::Transport("response envelope carried no data".to_string()))
    }
}

#[async_trait]
impl MenuGateway for HttpMenuGateway {
    async fn fetch_menus(&self, site_id: EntityId) -> Result<Vec<MenuNode>, DomainError> {
        let url = self.url(&format!("/api/v1/menu/site/{}", site_id));
        debug!("GET {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                error!("Menu list request failed: {}", e);
                DomainError::Transport(e.to_string())
            })?;

        let menus: Vec<MenuDto> = Self::decode_data(response).await?;
        Ok(menus.into_iter().map(MenuNode::from).collect())
    }

    async fn create_menu(&self, create: MenuCreate) -> Result<MenuNode, DomainError> {
        let url = self.url("/api/v1/menu");
        debug!("POST {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .json(&CreateMenuBody::from(&create))
            .send()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;

        let menu: MenuDto = Self::decode_data(response).await?;
        Ok(menu.into())
    }

    async fn replace_menu(&self, id: EntityId, replace: MenuReplace) -> Result<MenuNode, DomainError> {
        let url = self.url(&format!("/api/v1/menu/{}", id));
        debug!("PUT {}", url);

        let response = self
            .authorize(self.client.put(&url))
            .json(&ReplaceMenuBody::from(&replace))
            .send()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;

        let menu: MenuDto = Self::decode_data(response).await?;
        Ok(menu.into())
    }

    async fn delete_menu(&self, id: EntityId) -> Result<(), DomainError> {
        let url = self.url(&format!("/api/v1/menu/{}", id));
        debug!("DELETE {}", url);

        let response = self
            .authorize(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| DomainError::Transport(e.to_string()))?;

        // Delete acks carry no data payload.
        Self::decode::<serde_json::Value>(response).await.map(|_| ())
    }
}
