//! async HTTP client for a MyMonero-compatible light-wallet server.
//!
//! Endpoints (all `POST` with a JSON body):
//! - `/login`
//! - `/get_unspent_outs`
//! - `/get_random_outs`
//! - `/submit_raw_tx`
//!
//! The client owns the request timeout. It never retries: a failed submit
//! may or may not have reached the network, so retrying is the caller's call.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use url::Url;

use super::wire;
use super::wire::UserAgent;
use super::AmountOutputs;
use super::GatewayError;
use super::RemoteGateway;
use super::SubmitAck;
use super::UnspentOutputs;
use crate::protocol::amount::Amount;
use crate::protocol::keys::SecretKey;
use crate::protocol::mixin::Mixin;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct LightWalletClient {
    base: Url,
    client: Client,
    app_name: String,
    app_version: String,
}

impl LightWalletClient {
    /// Create a new client. `base` like "https://api.mymonero.com:8443".
    ///
    /// A path prefix on `base` is kept: endpoints are resolved below it.
    pub fn new(base: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let mut base = Url::parse(base).map_err(|e| GatewayError::Transport(format!("url parse: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            base,
            client,
            app_name: env!("CARGO_PKG_NAME").to_owned(),
            app_version: env!("CARGO_PKG_VERSION").to_owned(),
        })
    }

    /// set the name and version reported to the server.
    pub fn with_user_agent(mut self, app_name: impl Into<String>, app_version: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self.app_version = app_version.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn user_agent(&self) -> UserAgent<'_> {
        UserAgent {
            app_name: &self.app_name,
            app_version: &self.app_version,
        }
    }

    /// POST `body` to `endpoint`. returns the status and raw response body.
    async fn post<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<(StatusCode, String), GatewayError> {
        let url = self
            .base
            .join(endpoint)
            .map_err(|e| GatewayError::Transport(format!("url join: {e}")))?;

        tracing::debug!(%url, "light-wallet request");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok((status, text))
    }

    async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let (status, text) = self.post(endpoint, body).await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        wire::decode(endpoint, &text)
    }
}

/// whether a non-success HTTP status on submit means the server looked at
/// the transaction and refused it.
fn is_explicit_refusal(status: StatusCode) -> bool {
    status.is_client_error()
        && status != StatusCode::REQUEST_TIMEOUT
        && status != StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl RemoteGateway for LightWalletClient {
    async fn login(&self, address: &str, view_key: &SecretKey) -> Result<bool, GatewayError> {
        let view_key = view_key.expose_hex();
        let request = wire::LoginRequest {
            address,
            view_key: &view_key,
            create_account: true,
            user_agent: self.user_agent(),
        };
        let response: wire::LoginResponse = self.post_json("login", &request).await?;
        Ok(response.new_address)
    }

    async fn unspent_outputs(
        &self,
        address: &str,
        view_key: &SecretKey,
        mixin: Mixin,
        dust_threshold: Amount,
    ) -> Result<UnspentOutputs, GatewayError> {
        let view_key = view_key.expose_hex();
        let request = wire::UnspentOutsRequest {
            address,
            view_key: &view_key,
            amount: "0",
            mixin: mixin.into(),
            // dust is filtered client side, where sweeps may still want it.
            use_dust: true,
            dust_threshold: dust_threshold.to_piconero().to_string(),
            user_agent: self.user_agent(),
        };
        let response: wire::UnspentOutsResponse =
            self.post_json("get_unspent_outs", &request).await?;
        Ok(response.into())
    }

    async fn random_outputs(
        &self,
        amounts: Vec<String>,
        count: u32,
    ) -> Result<Vec<AmountOutputs>, GatewayError> {
        let request = wire::RandomOutsRequest {
            amounts: &amounts,
            count,
            user_agent: self.user_agent(),
        };
        let response: wire::RandomOutsResponse =
            self.post_json("get_random_outs", &request).await?;
        Ok(response.into())
    }

    async fn submit_raw_tx(
        &self,
        address: &str,
        view_key: &SecretKey,
        tx_hex: &str,
    ) -> Result<SubmitAck, GatewayError> {
        let view_key = view_key.expose_hex();
        let request = wire::SubmitRawTxRequest {
            address,
            view_key: &view_key,
            tx: tx_hex,
            user_agent: self.user_agent(),
        };
        let (status, text) = self.post("submit_raw_tx", &request).await?;

        if !status.is_success() {
            if is_explicit_refusal(status) {
                let reason = serde_json::from_str::<wire::ErrorBody>(&text)
                    .ok()
                    .and_then(|b| b.error)
                    .unwrap_or(text);
                return Err(GatewayError::Rejected { reason });
            }
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let response: wire::SubmitRawTxResponse = wire::decode("submit_raw_tx", &text)?;
        match (response.status, response.error) {
            (_, Some(reason)) => Err(GatewayError::Rejected { reason }),
            (Some(status), None) if status.eq_ignore_ascii_case("ok") => Ok(SubmitAck { status }),
            (Some(status), None) => Err(GatewayError::Rejected { reason: status }),
            (None, None) => Ok(SubmitAck {
                status: "OK".to_owned(),
            }),
        }
    }
}
