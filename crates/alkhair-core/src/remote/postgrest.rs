//! PostgREST (Supabase REST) remote source.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{dedupe_by_id, RemoteBackend, RemoteSource};
use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::models::Syncable;
use crate::util::{error_excerpt, is_http_url, non_blank};

/// Connection settings shared by every collection of one Supabase project.
///
/// An unconfigured backend still hands out sources; their fetches fail with
/// [`RemoteError::InvalidConfiguration`] so offline reads keep working.
#[derive(Clone)]
pub struct PostgrestBackend {
    client: Client,
    endpoint: Option<Arc<Endpoint>>,
}

struct Endpoint {
    rest_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl fmt::Debug for PostgrestBackend {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = formatter.debug_struct("PostgrestBackend");
        match self.endpoint.as_deref() {
            Some(endpoint) => debug
                .field("rest_url", &endpoint.rest_url)
                .field("anon_key", &"[REDACTED]")
                .field(
                    "access_token",
                    &endpoint.access_token.as_ref().map(|_| "[REDACTED]"),
                ),
            None => debug.field("rest_url", &None::<String>),
        };
        debug.finish_non_exhaustive()
    }
}

impl PostgrestBackend {
    /// Build a backend sharing `client` (connection pool, timeouts).
    ///
    /// Requests authenticate with `access_token` when present, otherwise with
    /// the anon key.
    pub fn new(
        client: Client,
        base_url: &str,
        anon_key: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, RemoteError> {
        let rest_url = normalize_rest_url(base_url)?;
        let anon_key = anon_key.into().trim().to_string();
        if anon_key.is_empty() {
            return Err(RemoteError::InvalidConfiguration(
                "anon key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client,
            endpoint: Some(Arc::new(Endpoint {
                rest_url,
                anon_key,
                access_token: non_blank(access_token),
            })),
        })
    }

    pub fn from_config(client: Client, config: &RemoteConfig) -> Result<Self, RemoteError> {
        Self::new(
            client,
            &config.supabase_url,
            config.anon_key.clone(),
            config.access_token.clone(),
        )
    }

    pub const fn unconfigured(client: Client) -> Self {
        Self {
            client,
            endpoint: None,
        }
    }
}

impl RemoteBackend for PostgrestBackend {
    type Source<T: Syncable> = PostgrestSource<T>;

    fn source<T: Syncable>(&self) -> PostgrestSource<T> {
        PostgrestSource {
            backend: self.clone(),
            _record: PhantomData,
        }
    }

    fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

/// Pulls `updated_at > cursor` deltas from `{base}/rest/v1/{collection}`
pub struct PostgrestSource<T> {
    backend: PostgrestBackend,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for PostgrestSource<T> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> fmt::Debug for PostgrestSource<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("PostgrestSource")
            .field(&self.backend)
            .finish()
    }
}

impl<T: Syncable> PostgrestSource<T> {
    pub fn new(
        client: Client,
        base_url: &str,
        anon_key: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, RemoteError> {
        PostgrestBackend::new(client, base_url, anon_key, access_token)
            .map(|backend| backend.source())
    }

    fn endpoint(&self) -> Result<&Endpoint, RemoteError> {
        self.backend.endpoint.as_deref().ok_or_else(|| {
            RemoteError::InvalidConfiguration("remote backend is not configured".to_string())
        })
    }

    fn collection_url(endpoint: &Endpoint) -> String {
        format!("{}/{}", endpoint.rest_url, T::COLLECTION)
    }
}

impl<T: Syncable> RemoteSource<T> for PostgrestSource<T> {
    async fn fetch_remote_updated(&self, after: i64) -> Result<Vec<T>, RemoteError> {
        let endpoint = self.endpoint()?;
        let bearer = endpoint
            .access_token
            .as_deref()
            .unwrap_or(&endpoint.anon_key);
        let response = self
            .backend
            .client
            .get(Self::collection_url(endpoint))
            .query(&delta_query(after))
            .header("apikey", &endpoint.anon_key)
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let records: Vec<T> = serde_json::from_str(&body)?;
        tracing::debug!(
            "Fetched {} {} records updated after {after}",
            records.len(),
            T::COLLECTION
        );
        Ok(dedupe_by_id(records))
    }
}

fn delta_query(after: i64) -> [(&'static str, String); 3] {
    [
        ("select", "*".to_string()),
        ("updated_at", format!("gt.{after}")),
        ("order", "updated_at.asc".to_string()),
    ]
}

fn normalize_rest_url(url: &str) -> Result<String, RemoteError> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(RemoteError::InvalidConfiguration(
            "backend URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(trimmed) {
        return Err(RemoteError::InvalidConfiguration(
            "backend URL must include http:// or https://".to_string(),
        ));
    }
    if trimmed.ends_with("/rest/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/rest/v1"))
    }
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    message: Option<String>,
    error: Option<String>,
    hint: Option<String>,
}

fn parse_api_error(body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<PostgrestErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return match payload.hint {
                Some(hint) if !hint.trim().is_empty() => {
                    format!("{} ({})", message.trim(), hint.trim())
                }
                _ => message.trim().to_string(),
            };
        }
    }
    error_excerpt(body)
}

fn classify_error(status: StatusCode, body: &str) -> RemoteError {
    let message = parse_api_error(body);
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        RemoteError::Unauthorized(if message.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            message
        })
    } else {
        RemoteError::Server {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Announcement;

    #[test]
    fn normalize_rest_url_appends_rest_path() {
        assert_eq!(
            normalize_rest_url("https://demo.supabase.co/").unwrap(),
            "https://demo.supabase.co/rest/v1"
        );
        assert_eq!(
            normalize_rest_url("https://demo.supabase.co/rest/v1").unwrap(),
            "https://demo.supabase.co/rest/v1"
        );
    }

    #[test]
    fn normalize_rest_url_rejects_invalid_values() {
        assert!(normalize_rest_url("  ").is_err());
        assert!(normalize_rest_url("demo.supabase.co").is_err());
    }

    #[test]
    fn collection_url_uses_table_name() {
        let source = PostgrestSource::<Announcement>::new(
            Client::new(),
            "https://demo.supabase.co",
            "anon",
            None,
        )
        .unwrap();
        assert_eq!(
            PostgrestSource::<Announcement>::collection_url(source.endpoint().unwrap()),
            "https://demo.supabase.co/rest/v1/announcements"
        );
    }

    #[tokio::test]
    async fn unconfigured_backend_fails_fetches() {
        let source: PostgrestSource<Announcement> =
            PostgrestBackend::unconfigured(Client::new()).source();
        assert!(matches!(
            source.fetch_remote_updated(0).await,
            Err(RemoteError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn delta_query_is_exclusive_and_ordered() {
        let query = delta_query(150);
        assert!(query.contains(&("updated_at", "gt.150".to_string())));
        assert!(query.contains(&("order", "updated_at.asc".to_string())));
    }

    #[test]
    fn unauthorized_status_maps_to_unauthorized() {
        let error = classify_error(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"JWT expired","code":"PGRST301"}"#,
        );
        assert!(matches!(error, RemoteError::Unauthorized(message) if message == "JWT expired"));
    }

    #[test]
    fn server_error_includes_hint() {
        let error = classify_error(
            StatusCode::BAD_REQUEST,
            r#"{"message":"column missing","hint":"check updated_at"}"#,
        );
        match error {
            RemoteError::Server { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "column missing (check updated_at)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn debug_redacts_keys() {
        let source = PostgrestSource::<Announcement>::new(
            Client::new(),
            "https://demo.supabase.co",
            "secret-anon",
            Some("secret-token".to_string()),
        )
        .unwrap();
        let rendered = format!("{source:?}");
        assert!(!rendered.contains("secret-anon"));
        assert!(!rendered.contains("secret-token"));
    }
}
