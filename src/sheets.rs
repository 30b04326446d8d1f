use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::{ConfigError, SinkError};
use crate::http_client::http_client;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_SHEET_NAME: &str = "player-data";
const TOKEN_LIFETIME_SECS: u64 = 3600;

pub trait SheetSink {
    fn replace_all(&self, header: &[String], rows: &[Vec<String>]) -> Result<(), SinkError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub key: ServiceAccountKey,
    pub spreadsheet_id: String,
    pub sheet_name: String,
    pub api_base: String,
}

impl SheetsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from a key lookup. Credentials come from
    /// `GOOGLE_SERVICE_ACCOUNT_JSON` (inline) or `GOOGLE_SERVICE_ACCOUNT_FILE`
    /// (path); the inline form wins when both are set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_key = match (get("GOOGLE_SERVICE_ACCOUNT_JSON"), get("GOOGLE_SERVICE_ACCOUNT_FILE")) {
            (Some(inline), _) => inline,
            (None, Some(path)) => {
                let path = PathBuf::from(path.trim());
                std::fs::read_to_string(&path).map_err(|e| {
                    ConfigError::Credentials(format!("read {}: {e}", path.display()))
                })?
            }
            (None, None) => {
                return Err(ConfigError::Missing(
                    "GOOGLE_SERVICE_ACCOUNT_JSON or GOOGLE_SERVICE_ACCOUNT_FILE",
                ));
            }
        };
        let key: ServiceAccountKey = serde_json::from_str(&raw_key)
            .map_err(|e| ConfigError::Credentials(format!("parse service account json: {e}")))?;

        let spreadsheet_id = get("GEM_SPREADSHEET_ID").ok_or(ConfigError::Missing("GEM_SPREADSHEET_ID"))?;
        let sheet_name = get("GEM_SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
        let api_base = get("GEM_SHEETS_API_BASE").unwrap_or_else(|| SHEETS_API.to_string());

        Ok(Self {
            key,
            spreadsheet_id: spreadsheet_id.trim().to_string(),
            sheet_name: sheet_name.trim().to_string(),
            api_base: api_base.trim().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google Sheets v4 sink authenticated as a service account.
///
/// `replace_all` clears the sheet and then writes. A failure between the two
/// calls leaves the sheet empty; there is no retry.
pub struct GoogleSheetsSink {
    config: SheetsConfig,
    signing_key: EncodingKey,
    client: Client,
}

impl GoogleSheetsSink {
    /// Validates the key before any request is made.
    pub fn new(config: SheetsConfig) -> Result<Self, SinkError> {
        let client = http_client().map_err(SinkError::Client)?.clone();
        Self::with_client(config, client)
    }

    pub fn with_client(config: SheetsConfig, client: Client) -> Result<Self, SinkError> {
        let signing_key = EncodingKey::from_rsa_pem(config.key.private_key.as_bytes())
            .map_err(|e| ConfigError::Credentials(format!("private key: {e}")))?;
        Ok(Self {
            config,
            signing_key,
            client,
        })
    }

    fn access_token(&self) -> Result<String, SinkError> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let claims = TokenClaims {
            iss: &self.config.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.config.key.token_uri,
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?;

        let resp = self
            .client
            .post(&self.config.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(SinkError::Auth(format!("http {status}: {body}")));
        }
        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| SinkError::Auth(format!("unexpected token response: {e}")))?;
        Ok(token.access_token)
    }

    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, SinkError> {
        let invalid = |reason: String| SinkError::InvalidUrl {
            url: self.config.api_base.clone(),
            reason,
        };
        let mut url = Url::parse(&self.config.api_base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .push(&self.config.spreadsheet_id)
            .push("values")
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }

    fn check(resp: reqwest::blocking::Response) -> Result<(), SinkError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().unwrap_or_default();
        Err(SinkError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

impl SheetSink for GoogleSheetsSink {
    fn replace_all(&self, header: &[String], rows: &[Vec<String>]) -> Result<(), SinkError> {
        let sheet_range = format!("'{}'", self.config.sheet_name.replace('\'', "''"));
        let start = format!("{sheet_range}!A1");
        let clear_url = self.values_url(&sheet_range, ":clear")?;
        let mut update_url = self.values_url(&start, "")?;
        update_url
            .query_pairs_mut()
            .append_pair("valueInputOption", "RAW");

        let token = self.access_token()?;
        let resp = self
            .client
            .post(clear_url)
            .bearer_auth(&token)
            .json(&json!({}))
            .send()?;
        Self::check(resp)?;
        info!("cleared sheet {}", self.config.sheet_name);

        let body = json!({
            "range": start,
            "majorDimension": "ROWS",
            "values": sheet_values(header, rows),
        });
        let resp = self.client.put(update_url).bearer_auth(&token).json(&body).send()?;
        if let Err(err) = Self::check(resp) {
            warn!("sheet {} was cleared but the update failed", self.config.sheet_name);
            return Err(err);
        }
        info!("uploaded {} rows to sheet {}", rows.len(), self.config.sheet_name);
        Ok(())
    }
}

/// Numeric text becomes a JSON number so the sheet stores numbers, not text.
pub fn cell_value(raw: &str) -> Value {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        _ => Value::String(raw.to_string()),
    }
}

pub fn sheet_values(header: &[String], rows: &[Vec<String>]) -> Value {
    let mut values = Vec::with_capacity(rows.len() + 1);
    values.push(Value::Array(header.iter().map(|h| Value::String(h.clone())).collect()));
    for row in rows {
        values.push(Value::Array(row.iter().map(|c| cell_value(c)).collect()));
    }
    Value::Array(values)
}
