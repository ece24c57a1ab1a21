//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

pub mod config;
pub mod error;
pub mod feature;
pub mod geom;
pub mod schema;
pub mod stats;
pub mod style;
pub mod toolset;

pub use self::config::{parse_config, read_config, ApplicationCfg, Config};
pub use self::error::SyncError;

#[cfg(test)]
mod schema_test;
