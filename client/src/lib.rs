// Copyright (c) 2026 Rackdeck Labs
// SPDX-License-Identifier: AGPL-3.0

//! HTTP clients for the `rdc` CLI.
//!
//! - [`ConsoleClient`] — the cloud console API (machines, teams,
//!   storage, clusters, queue)
//! - [`S3Client`] — minimal S3 object access with AWS SigV4 signing,
//!   backing the state vault

pub mod api;
pub mod s3;
pub mod sigv4;

pub use api::{ClientError, ConsoleClient};
pub use s3::{S3Client, S3Credentials};
