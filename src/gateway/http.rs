//! reqwest-backed [`Gateway`] talking to a live FreeDATA API.

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;

use super::{verify_identity, ApiInfo, Gateway, Message, MessageList, OutgoingMessage, RadioStatus};
use crate::config::GatewayConfig;
use crate::errors::GatewayError;

pub struct HttpGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client for `config` and run the startup identity check.
    pub async fn connect(config: GatewayConfig) -> Result<(Self, ApiInfo), GatewayError> {
        let gateway = Self::new(config);
        let info = verify_identity(&gateway, &gateway.config.expected_name).await?;
        Ok((gateway, info))
    }

    /// Send a request under the configured deadline and require a 2xx status.
    async fn execute(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GatewayError> {
        let deadline: Duration = self.config.timeout();

        let response = timeout(deadline, request.send())
            .await
            .map_err(|_| GatewayError::Timeout {
                url: url.to_string(),
                after: deadline,
            })?
            .map_err(|source| GatewayError::Unreachable {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(GatewayError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = self.config.endpoint(path);
        debug!("GET {}", url);
        let response = self.execute(&url, self.client.get(&url)).await?;
        decode(&url, response, self.config.timeout()).await
    }
}

/// Body reads share the request deadline.
async fn decode<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
    deadline: Duration,
) -> Result<T, GatewayError> {
    let bytes = timeout(deadline, response.bytes())
        .await
        .map_err(|_| GatewayError::Timeout {
            url: url.to_string(),
            after: deadline,
        })?
        .map_err(|source| GatewayError::Unreachable {
            url: url.to_string(),
            source,
        })?;

    serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn info(&self) -> Result<ApiInfo, GatewayError> {
        self.get_json("/").await
    }

    async fn radio_status(&self) -> Result<RadioStatus, GatewayError> {
        self.get_json(&self.config.radio_path).await
    }

    async fn messages(&self) -> Result<Vec<Message>, GatewayError> {
        let list: MessageList = self.get_json(&self.config.messages_path).await?;
        debug!(
            "Gateway reports {} message(s), listed {}",
            list.total_messages,
            list.messages.len()
        );
        Ok(list.messages)
    }

    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), GatewayError> {
        let url = self.config.endpoint(&self.config.messages_path);
        debug!("POST {} -> {}", url, message.destination);
        // The acknowledgement shape is not fixed; a 2xx is the only success signal.
        self.execute(&url, self.client.post(&url).json(message)).await?;
        Ok(())
    }
}
