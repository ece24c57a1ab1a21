//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::schema::FieldError;
use thiserror::Error;

/// Errors of a single editor operation or request
///
/// No variant is fatal for the editor: every failure is local to the
/// operation which caused it and leaves prior state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// Response without the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Client-side field validation failed, nothing was sent
    #[error("{} invalid field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// The feature service rejected the request
    #[error("request rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("schema `{0}` not found")]
    UnknownSchema(String),

    #[error("schema `{0}` is read-only")]
    ReadOnlySchema(String),

    #[error("feature `{0}` not found")]
    UnknownFeature(String),

    /// A save of the feature is still waiting for its response
    #[error("save of feature `{0}` in progress")]
    SaveInProgress(String),

    #[error("no active schema")]
    NoActiveSchema,

    #[error("editor `{0}` already registered")]
    DuplicateEditor(String),

    #[error("editor `{0}` not registered")]
    UnknownEditor(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> SyncError {
        SyncError::MalformedResponse(err.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

#[test]
fn test_error_messages() {
    assert_eq!(
        SyncError::Rejected(vec!["name missing".to_string(), "too long".to_string()]).to_string(),
        "request rejected: name missing; too long"
    );
    assert_eq!(
        SyncError::UnknownSchema("poi".to_string()).to_string(),
        "schema `poi` not found"
    );
    let err: SyncError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
    match err {
        SyncError::MalformedResponse(_) => {}
        _ => panic!("unexpected error {:?}", err),
    }
}
