//! Small HTTP helpers shared by the catalog and favorites clients.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiSettings;
use crate::error::{ApiError, Result};

pub(crate) fn build_client(api: &ApiSettings) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(api.timeout_secs))
        .user_agent(api.user_agent.clone())
        .build()?;
    Ok(client)
}

pub(crate) fn parse_base(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}

/// Append path segments to `base`, percent-encoding each one.
///
/// A trailing slash on the base is ignored, so `https://host/api/` and
/// `https://host/api` produce the same endpoints.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{base} cannot be a base")))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

pub(crate) async fn get_json<T: DeserializeOwned>(client: &Client, url: Url) -> Result<T> {
    debug!(%url, "GET");
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub(crate) async fn post_json<B: Serialize + ?Sized>(client: &Client, url: Url, body: &B) -> Result<()> {
    debug!(%url, "POST");
    let response = client.post(url.clone()).json(body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(())
}
