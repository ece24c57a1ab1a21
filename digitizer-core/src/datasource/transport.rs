//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::error::SyncError;
use crate::datasource::protocol::Request;
use serde_json::Value;
use std::future::Future;

/// Delivery of requests to the feature service
///
/// Implementations only move bytes. Interpretation of the response body
/// is left to the `protocol` parsers.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> impl Future<Output = Result<Value, SyncError>> + Send;
}
