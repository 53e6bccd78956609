use anyhow::{Context, Result, bail};
use async_trait::async_trait;

use super::Transport;
use crate::item::Item;
use crate::wire::{AddBody, EditBody, ErrorBody, IdBody, Snapshot};

/// A real network client speaking the items API.
///
/// Keeps the stub's two-outcome contract: a non-success status or a body
/// that doesn't parse is an error like any other, and the dispatcher rolls
/// back the same way.
pub struct HttpTransport {
    base: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            base,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/items", self.base)
    }

    async fn read_snapshot(response: reqwest::Response) -> Result<Vec<Item>> {
        let status = response.status();
        if !status.is_success() {
            match response.json::<ErrorBody>().await {
                Ok(body) => bail!("server rejected: {}", body.error),
                Err(_) => bail!("server returned {status}"),
            }
        }
        let snapshot: Snapshot = response
            .json()
            .await
            .context("malformed server response")?;
        Ok(snapshot.items)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self) -> Result<Vec<Item>> {
        let response = self.client.get(self.url()).send().await?;
        Self::read_snapshot(response).await
    }

    async fn add(&self, text: &str) -> Result<Vec<Item>> {
        let response = self
            .client
            .post(self.url())
            .json(&AddBody {
                text: text.to_string(),
            })
            .send()
            .await?;
        Self::read_snapshot(response).await
    }

    async fn toggle(&self, id: i64) -> Result<Vec<Item>> {
        let response = self
            .client
            .patch(self.url())
            .json(&IdBody { id })
            .send()
            .await?;
        Self::read_snapshot(response).await
    }

    async fn update(&self, id: i64, text: &str) -> Result<Vec<Item>> {
        let response = self
            .client
            .put(self.url())
            .json(&EditBody {
                id,
                text: text.to_string(),
            })
            .send()
            .await?;
        Self::read_snapshot(response).await
    }

    async fn delete(&self, id: i64) -> Result<Vec<Item>> {
        let response = self
            .client
            .delete(self.url())
            .json(&IdBody { id })
            .send()
            .await?;
        Self::read_snapshot(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_normalized() {
        let transport = HttpTransport::new("http://127.0.0.1:3000/");
        assert_eq!(transport.url(), "http://127.0.0.1:3000/items");
    }
}
