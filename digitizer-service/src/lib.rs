//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate log;
#[cfg(test)]
#[macro_use]
extern crate serde_json;

pub mod activation;
pub mod driver;
#[cfg(test)]
mod driver_test;
pub mod http;
pub mod projection;
pub mod registry;
pub mod runtime_config;
pub mod schemas;
pub mod sync;

pub use self::driver::{Driver, EditorEvent};
pub use self::schemas::{Schema, SchemaRegistry};
pub use self::sync::{Outgoing, RequestId, SyncCoordinator};
