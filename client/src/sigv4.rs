// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! AWS Signature Version 4 request signing.
//!
//! Only what the S3 object client needs: canonical request over the
//! `host`/`x-amz-content-sha256`/`x-amz-date` header set, the
//! date/region/service HMAC key chain, and the `Authorization` header.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// SHA-256 of the empty string; payload hash for bodyless requests.
pub const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// SigV4 URI encoding: unreserved characters stay, `/` stays (path
/// segments are encoded individually).
pub const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Query-value encoding: as above but `/` is encoded too.
pub const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

/// One request to sign. `uri` is the already-encoded absolute path,
/// `query` the canonical query string (may be empty).
pub struct SignRequest<'a> {
    pub method: &'a str,
    pub uri: &'a str,
    pub query: &'a str,
    pub host: &'a str,
    pub payload_hash: &'a str,
    pub timestamp: DateTime<Utc>,
}

/// Headers to attach to the outgoing request.
#[derive(Debug, Clone)]
pub struct Signature {
    pub authorization: String,
    pub amz_date: String,
    pub content_sha256: String,
}

const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// Produce the SigV4 headers for `req`.
pub fn sign(req: &SignRequest<'_>, creds: &Credentials, region: &str, service: &str) -> Signature {
    let amz_date = req.timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let date = req.timestamp.format("%Y%m%d").to_string();

    let canonical = canonical_request(req, &amz_date);
    let scope = format!("{}/{}/{}/aws4_request", date, region, service);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        hex::encode(Sha256::digest(canonical.as_bytes()))
    );

    let key = derive_signing_key(&creds.secret_key, &date, region, service);
    let signature = hex::encode(hmac(&key, string_to_sign.as_bytes()));

    Signature {
        authorization: format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, creds.access_key, scope, SIGNED_HEADERS, signature
        ),
        amz_date,
        content_sha256: req.payload_hash.to_string(),
    }
}

/// Canonical request over the fixed header set, headers in byte order.
fn canonical_request(req: &SignRequest<'_>, amz_date: &str) -> String {
    format!(
        "{}\n{}\n{}\nhost:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n\n{}\n{}",
        req.method, req.uri, req.query, req.host, req.payload_hash, amz_date, SIGNED_HEADERS,
        req.payload_hash
    )
}

/// HMAC key chain: `AWS4<secret>` → date → region → service →
/// `aws4_request`.
pub fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac(format!("AWS4{}", secret).as_bytes(), date.as_bytes());
    let k_region = hmac(&k_date, region.as_bytes());
    let k_service = hmac(&k_region, service.as_bytes());
    hmac(&k_service, b"aws4_request")
}

/// Hex SHA-256 of a payload.
pub fn payload_hash(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // Signing-key example from the AWS SigV4 documentation.
    #[test]
    fn derive_signing_key_matches_aws_example() {
        let key = derive_signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn empty_payload_hash_constant() {
        assert_eq!(payload_hash(b""), EMPTY_PAYLOAD_HASH);
    }

    #[test]
    fn canonical_request_layout() {
        let req = SignRequest {
            method: "GET",
            uri: "/bucket/state.json",
            query: "",
            host: "s3.example.com",
            payload_hash: EMPTY_PAYLOAD_HASH,
            timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
        };
        let canonical = canonical_request(&req, "20260115T093000Z");
        let lines: Vec<&str> = canonical.split('\n').collect();
        assert_eq!(lines[0], "GET");
        assert_eq!(lines[1], "/bucket/state.json");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "host:s3.example.com");
        assert!(lines[4].starts_with("x-amz-content-sha256:"));
        assert!(lines[5].starts_with("x-amz-date:"));
        assert_eq!(lines[6], "");
        assert_eq!(lines[7], SIGNED_HEADERS);
        assert_eq!(lines[8], EMPTY_PAYLOAD_HASH);
    }

    #[test]
    fn signature_is_deterministic_for_fixed_inputs() {
        let creds = Credentials {
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
        };
        let req = SignRequest {
            method: "PUT",
            uri: "/bucket/_meta.json",
            query: "",
            host: "s3.example.com",
            payload_hash: EMPTY_PAYLOAD_HASH,
            timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
        };
        let a = sign(&req, &creds, "us-east-1", "s3");
        let b = sign(&req, &creds, "us-east-1", "s3");
        assert_eq!(a.authorization, b.authorization);
        assert_eq!(a.amz_date, "20260115T093000Z");
        assert!(a
            .authorization
            .starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20260115/us-east-1/s3/aws4_request"));
        assert!(a.authorization.contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date"));
    }
}
