// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! Minimal S3 object client backing the state vault.
//!
//! Path-style addressing (`<endpoint>/<bucket>/<key>`), SigV4-signed
//! requests, whole-object get/put/delete. Works against AWS and
//! S3-compatible endpoints (MinIO, Ceph RGW).

use async_trait::async_trait;
use chrono::Utc;
use percent_encoding::utf8_percent_encode;
use reqwest::{Client, Method, StatusCode};
use tracing::debug;

use rdc_core::vault::ObjectStore;
use rdc_core::Error;

use crate::sigv4::{self, Credentials, SignRequest, PATH_ENCODE_SET};

pub use crate::sigv4::Credentials as S3Credentials;

#[derive(Debug, Clone)]
pub struct S3Client {
    client: Client,
    endpoint: String,
    host: String,
    region: String,
    bucket: String,
    credentials: Credentials,
}

impl S3Client {
    pub fn new(
        endpoint: &str,
        region: impl Into<String>,
        bucket: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        let url = reqwest::Url::parse(endpoint)
            .map_err(|e| Error::validation(format!("invalid s3 endpoint '{}': {}", endpoint, e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(p)) => format!("{}:{}", h, p),
            (Some(h), None) => h.to_string(),
            (None, _) => {
                return Err(Error::validation(format!(
                    "s3 endpoint '{}' has no host",
                    endpoint
                )))
            }
        };
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Store(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            host,
            region: region.into(),
            bucket: bucket.into(),
            credentials,
        })
    }

    fn object_uri(&self, key: &str) -> String {
        format!(
            "/{}/{}",
            utf8_percent_encode(&self.bucket, PATH_ENCODE_SET),
            utf8_percent_encode(key, PATH_ENCODE_SET)
        )
    }

    async fn send(
        &self,
        method: Method,
        key: &str,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response, Error> {
        let uri = self.object_uri(key);
        let payload_hash = match &body {
            Some(b) => sigv4::payload_hash(b),
            None => sigv4::EMPTY_PAYLOAD_HASH.to_string(),
        };
        let signature = sigv4::sign(
            &SignRequest {
                method: method.as_str(),
                uri: &uri,
                query: "",
                host: &self.host,
                payload_hash: &payload_hash,
                timestamp: Utc::now(),
            },
            &self.credentials,
            &self.region,
            "s3",
        );

        let mut req = self
            .client
            .request(method, format!("{}{}", self.endpoint, uri))
            .header("host", &self.host)
            .header("x-amz-date", &signature.amz_date)
            .header("x-amz-content-sha256", &signature.content_sha256)
            .header("authorization", &signature.authorization);
        if let Some(b) = body {
            req = req.body(b);
        }
        req.send().await.map_err(|e| Error::Store(e.to_string()))
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let response = self.send(Method::GET, key, None).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| Error::Store(e.to_string()))?;
                debug!(key, len = bytes.len(), "fetched object");
                Ok(Some(bytes.to_vec()))
            }
            status => Err(Error::Store(format!(
                "GET {} failed with status {}",
                key, status
            ))),
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), Error> {
        let len = body.len();
        let response = self.send(Method::PUT, key, Some(body)).await?;
        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "PUT {} failed with status {}",
                key,
                response.status()
            )));
        }
        debug!(key, len, "stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let response = self.send(Method::DELETE, key, None).await?;
        let status = response.status();
        // Deleting a missing object is a no-op, matching S3 semantics.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(Error::Store(format!(
                "DELETE {} failed with status {}",
                key, status
            )));
        }
        Ok(())
    }
}
