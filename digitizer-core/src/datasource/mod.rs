//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Request/response contract of the remote feature service

pub mod memory;
pub mod protocol;
#[cfg(test)]
mod protocol_test;
pub mod transport;

pub use self::memory::MemoryBackend;
pub use self::protocol::{DeleteRequest, ExportRequest, Request, SaveRequest, SelectRequest};
pub use self::transport::Transport;
