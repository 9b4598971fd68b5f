use std::time::{Duration, Instant};

use anyhow::Result;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::config_model::Mpesa;

const TRANSACTION_TYPE: &str = "CustomerPayBillOnline";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
// Refresh ahead of the provider-reported expiry so an in-flight push never
// carries a token about to lapse.
const TOKEN_EXPIRY_SKEW_SECS: u64 = 60;
const DEFAULT_TOKEN_TTL_SECS: u64 = 3599;

/// Daraja (M-Pesa) client built on reqwest. Holds a process-wide OAuth
/// token cache refreshed under a single-flight mutex.
pub struct DarajaClient {
    http: reqwest::Client,
    consumer_key: String,
    consumer_secret: String,
    shortcode: String,
    passkey: String,
    base_url: String,
    callback_url: String,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Derives the cache entry from a Daraja token response. The reported
    /// ttl is shortened by the skew; an unparseable `expires_in` falls back
    /// to the documented default rather than poisoning the cache.
    fn new(access_token: String, expires_in: &str, now: Instant) -> Self {
        let ttl_secs = expires_in
            .parse::<u64>()
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS)
            .saturating_sub(TOKEN_EXPIRY_SKEW_SECS);

        Self {
            access_token,
            expires_at: now + Duration::from_secs(ttl_secs),
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    // Daraja reports expiry as a string of seconds, e.g. "3599".
    expires_in: String,
}

#[derive(Debug, Serialize)]
struct StkPushRequest<'a> {
    #[serde(rename = "BusinessShortCode")]
    business_short_code: &'a str,
    #[serde(rename = "Password")]
    password: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "TransactionType")]
    transaction_type: &'static str,
    #[serde(rename = "Amount")]
    amount: i32,
    #[serde(rename = "PartyA")]
    party_a: &'a str,
    #[serde(rename = "PartyB")]
    party_b: &'a str,
    #[serde(rename = "PhoneNumber")]
    phone_number: &'a str,
    #[serde(rename = "CallBackURL")]
    call_back_url: &'a str,
    #[serde(rename = "AccountReference")]
    account_reference: &'a str,
    #[serde(rename = "TransactionDesc")]
    transaction_desc: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StkPushResponse {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResponseCode")]
    pub response_code: String,
    #[serde(rename = "ResponseDescription")]
    pub response_description: String,
    #[serde(rename = "CustomerMessage")]
    pub customer_message: String,
}

impl DarajaClient {
    pub fn new(config: &Mpesa) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout))
            .build()?;

        Ok(Self {
            http,
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            shortcode: config.shortcode.clone(),
            passkey: config.passkey.clone(),
            base_url: config.base_url.clone(),
            callback_url: config.callback_url.clone(),
            token: Mutex::new(None),
        })
    }

    /// Requests the push payment on the payer's device. The account
    /// reference carries the local intent id so the eventual callback stays
    /// traceable even if correlation-id assignment fails.
    pub async fn stk_push(
        &self,
        phone_number: &str,
        amount: i32,
        account_reference: &str,
        transaction_desc: &str,
    ) -> Result<StkPushResponse> {
        let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let request = StkPushRequest {
            business_short_code: &self.shortcode,
            password: lipa_na_mpesa_password(&self.shortcode, &self.passkey, &timestamp),
            timestamp,
            transaction_type: TRANSACTION_TYPE,
            amount,
            party_a: phone_number,
            party_b: &self.shortcode,
            phone_number,
            call_back_url: &self.callback_url,
            account_reference,
            transaction_desc,
        };

        let token = self.access_token().await?;
        let mut resp = self.send_stk_push(&token, &request).await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            // Token revoked server-side before its reported expiry; refresh
            // once and retry.
            warn!("daraja: push rejected with 401, refreshing access token");
            self.invalidate_token().await;
            let token = self.access_token().await?;
            resp = self.send_stk_push(&token, &request).await?;
        }

        let resp = Self::ensure_success(resp, "stk push").await?;
        let parsed: StkPushResponse = resp.json().await?;

        if parsed.response_code != "0" {
            anyhow::bail!(
                "STK push rejected: {} (code {})",
                parsed.response_description,
                parsed.response_code
            );
        }

        Ok(parsed)
    }

    async fn send_stk_push(
        &self,
        token: &str,
        request: &StkPushRequest<'_>,
    ) -> Result<reqwest::Response> {
        let resp = self
            .http
            .post(format!("{}/mpesa/stkpush/v1/processrequest", self.base_url))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Ok(resp)
    }

    /// Returns a valid bearer token, refreshing it when the cached one has
    /// expired. The mutex is held across the refresh round trip so
    /// concurrent initiations do not all hit the credential endpoint.
    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;

        if let Some(cached) = guard.as_ref() {
            if cached.is_fresh(Instant::now()) {
                return Ok(cached.access_token.clone());
            }
        }

        let fresh = self.request_token().await?;
        let access_token = fresh.access_token.clone();
        *guard = Some(fresh);

        Ok(access_token)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn request_token(&self) -> Result<CachedToken> {
        let resp = self
            .http
            .get(format!(
                "{}/oauth/v1/generate?grant_type=client_credentials",
                self.base_url
            ))
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "generate access token").await?;

        let parsed: TokenResponse = resp.json().await?;
        info!(expires_in = %parsed.expires_in, "daraja: access token refreshed");

        Ok(CachedToken::new(
            parsed.access_token,
            &parsed.expires_in,
            Instant::now(),
        ))
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            response_body = %body,
            context = %context,
            "daraja api request failed"
        );

        anyhow::bail!("Daraja API request failed: {} (status {}): {}", context, status, body);
    }
}

/// Lipa na M-Pesa online password: base64 of shortcode + passkey + timestamp.
fn lipa_na_mpesa_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    BASE64.encode(format!("{shortcode}{passkey}{timestamp}"))
}
