// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Console API client.
//!
//! Thin typed wrappers over the cloud API's REST surface. Non-2xx
//! responses surface the body text; 404 on single-resource lookups maps
//! to [`ClientError::NotFound`] so commands can render it cleanly.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use rdc_core::domain::{Cluster, Machine, QueueItem, StorageVolume, Team};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone)]
pub struct ConsoleClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ConsoleClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        lookup: Option<(&'static str, &str)>,
    ) -> Result<T, ClientError> {
        let response = self.request(method, path).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some((resource, id)) = lookup {
                return Err(ClientError::NotFound {
                    resource,
                    id: id.to_string(),
                });
            }
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }

    async fn fetch_text(
        &self,
        path: &str,
        lookup: (&'static str, &str),
    ) -> Result<String, ClientError> {
        let response = self.request(Method::GET, path).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                resource: lookup.0,
                id: lookup.1.to_string(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.text().await?)
    }

    async fn action(
        &self,
        method: Method,
        path: &str,
        lookup: (&'static str, &str),
    ) -> Result<(), ClientError> {
        let response = self.request(method, path).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                resource: lookup.0,
                id: lookup.1.to_string(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    // --- machines ---------------------------------------------------

    pub async fn list_machines(&self) -> Result<Vec<Machine>, ClientError> {
        self.fetch(Method::GET, "/api/v1/machines", None).await
    }

    pub async fn get_machine(&self, id: Uuid) -> Result<Machine, ClientError> {
        self.fetch(
            Method::GET,
            &format!("/api/v1/machines/{}", id),
            Some(("machine", &id.to_string())),
        )
        .await
    }

    pub async fn reboot_machine(&self, id: Uuid) -> Result<(), ClientError> {
        self.action(
            Method::POST,
            &format!("/api/v1/machines/{}/reboot", id),
            ("machine", &id.to_string()),
        )
        .await
    }

    pub async fn delete_machine(&self, id: Uuid) -> Result<(), ClientError> {
        self.action(
            Method::DELETE,
            &format!("/api/v1/machines/{}", id),
            ("machine", &id.to_string()),
        )
        .await
    }

    /// Raw log text for a machine; callers run it through
    /// `rdc_core::parse::log`.
    pub async fn machine_logs(&self, id: Uuid, tail: Option<usize>) -> Result<String, ClientError> {
        let mut path = format!("/api/v1/machines/{}/logs", id);
        if let Some(n) = tail {
            path.push_str(&format!("?tail={}", n));
        }
        self.fetch_text(&path, ("machine", &id.to_string())).await
    }

    // --- teams ------------------------------------------------------

    pub async fn list_teams(&self) -> Result<Vec<Team>, ClientError> {
        self.fetch(Method::GET, "/api/v1/teams", None).await
    }

    pub async fn get_team(&self, id: Uuid) -> Result<Team, ClientError> {
        self.fetch(
            Method::GET,
            &format!("/api/v1/teams/{}", id),
            Some(("team", &id.to_string())),
        )
        .await
    }

    // --- storage ----------------------------------------------------

    pub async fn list_storages(&self) -> Result<Vec<StorageVolume>, ClientError> {
        self.fetch(Method::GET, "/api/v1/storages", None).await
    }

    pub async fn get_storage(&self, id: Uuid) -> Result<StorageVolume, ClientError> {
        self.fetch(
            Method::GET,
            &format!("/api/v1/storages/{}", id),
            Some(("storage", &id.to_string())),
        )
        .await
    }

    /// Raw listing output for a storage path; callers run it through
    /// `rdc_core::parse::listing`.
    pub async fn browse_storage(&self, id: Uuid, path: &str) -> Result<String, ClientError> {
        let encoded =
            percent_encoding::utf8_percent_encode(path, crate::sigv4::QUERY_ENCODE_SET);
        self.fetch_text(
            &format!("/api/v1/storages/{}/browse?path={}", id, encoded),
            ("storage", &id.to_string()),
        )
        .await
    }

    // --- clusters ---------------------------------------------------

    pub async fn list_clusters(&self) -> Result<Vec<Cluster>, ClientError> {
        self.fetch(Method::GET, "/api/v1/clusters", None).await
    }

    pub async fn get_cluster(&self, id: Uuid) -> Result<Cluster, ClientError> {
        self.fetch(
            Method::GET,
            &format!("/api/v1/clusters/{}", id),
            Some(("cluster", &id.to_string())),
        )
        .await
    }

    pub async fn cluster_status(&self, id: Uuid) -> Result<Cluster, ClientError> {
        self.fetch(
            Method::GET,
            &format!("/api/v1/clusters/{}/status", id),
            Some(("cluster", &id.to_string())),
        )
        .await
    }

    // --- queue ------------------------------------------------------

    pub async fn list_queue(&self, state: Option<&str>) -> Result<Vec<QueueItem>, ClientError> {
        let mut path = "/api/v1/queue".to_string();
        if let Some(s) = state {
            path.push_str(&format!("?state={}", s));
        }
        self.fetch(Method::GET, &path, None).await
    }

    pub async fn get_queue_item(&self, id: Uuid) -> Result<QueueItem, ClientError> {
        self.fetch(
            Method::GET,
            &format!("/api/v1/queue/{}", id),
            Some(("queue item", &id.to_string())),
        )
        .await
    }

    pub async fn cancel_queue_item(&self, id: Uuid) -> Result<(), ClientError> {
        self.action(
            Method::POST,
            &format!("/api/v1/queue/{}/cancel", id),
            ("queue item", &id.to_string()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_machines_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/machines")
            .match_header("authorization", "Bearer tok-1")
            .with_status(200)
            .with_body(
                r#"[{
                    "id": "550e8400-e29b-41d4-a716-446655440000",
                    "name": "db-01",
                    "host": "10.0.4.12",
                    "status": "online",
                    "created_at": "2026-01-15T09:30:00Z"
                }]"#,
            )
            .create_async()
            .await;

        let client = ConsoleClient::new(server.url(), "tok-1").unwrap();
        let machines = client.list_machines().await.unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].name, "db-01");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_machine_404_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let id = Uuid::nil();
        server
            .mock("GET", format!("/api/v1/machines/{}", id).as_str())
            .with_status(404)
            .with_body("no such machine")
            .create_async()
            .await;

        let client = ConsoleClient::new(server.url(), "tok").unwrap();
        let err = client.get_machine(id).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::NotFound {
                resource: "machine",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn get_cluster_fetches_by_id() {
        let mut server = mockito::Server::new_async().await;
        let id = Uuid::nil();
        let mock = server
            .mock("GET", format!("/api/v1/clusters/{}", id).as_str())
            .with_status(200)
            .with_body(
                r#"{
                    "id": "00000000-0000-0000-0000-000000000000",
                    "name": "ceph-east",
                    "nodes": 5,
                    "health": "healthy",
                    "capacity_bytes": 1099511627776
                }"#,
            )
            .create_async()
            .await;

        let client = ConsoleClient::new(server.url(), "tok").unwrap();
        let cluster = client.get_cluster(id).await.unwrap();
        assert_eq!(cluster.name, "ceph-east");
        assert_eq!(cluster.nodes, 5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn get_cluster_404_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let id = Uuid::nil();
        server
            .mock("GET", format!("/api/v1/clusters/{}", id).as_str())
            .with_status(404)
            .with_body("no such cluster")
            .create_async()
            .await;

        let client = ConsoleClient::new(server.url(), "tok").unwrap();
        let err = client.get_cluster(id).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::NotFound {
                resource: "cluster",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn api_error_carries_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/teams")
            .with_status(503)
            .with_body("maintenance window")
            .create_async()
            .await;

        let client = ConsoleClient::new(server.url(), "tok").unwrap();
        let err = client.list_teams().await.unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance window");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn machine_logs_returns_raw_text() {
        let mut server = mockito::Server::new_async().await;
        let id = Uuid::nil();
        server
            .mock(
                "GET",
                format!("/api/v1/machines/{}/logs?tail=50", id).as_str(),
            )
            .with_status(200)
            .with_body("INFO booted\nERROR oops\n")
            .create_async()
            .await;

        let client = ConsoleClient::new(server.url(), "tok").unwrap();
        let text = client.machine_logs(id, Some(50)).await.unwrap();
        assert!(text.contains("ERROR oops"));
    }

    #[tokio::test]
    async fn queue_list_filters_by_state() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/queue?state=running")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = ConsoleClient::new(server.url(), "tok").unwrap();
        let items = client.list_queue(Some("running")).await.unwrap();
        assert!(items.is_empty());
    }
}
