//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::driver::Driver;
use crate::http::HttpTransport;
use crate::projection::{EditorUi, FeatureTable, Journal, MapView, MemoryEditorUi, MemoryMap, MemoryTable};
use crate::schemas::SchemaRegistry;
use crate::sync::SyncCoordinator;
use clap::ArgMatches;
use digitizer_core::core::config::{ApplicationCfg, DEFAULT_CONFIG};
use digitizer_core::core::{parse_config, read_config, Config};
use digitizer_core::datasource::Transport;
use std::sync::Arc;
use viewport_diff::Extent;

/// Headless editor with in-memory projections
pub type HeadlessCoordinator = SyncCoordinator<MemoryMap, MemoryTable, MemoryEditorUi>;

pub fn config_from_args(args: &ArgMatches) -> Result<ApplicationCfg, String> {
    let mut config: ApplicationCfg = match args.value_of("config") {
        Some(cfgpath) => {
            info!("Reading configuration from '{}'", cfgpath);
            read_config(cfgpath)?
        }
        None => parse_config(DEFAULT_CONFIG.to_string(), "")?,
    };
    if let Some(url) = args.value_of("url") {
        config.remote.url = url.to_string();
    }
    Ok(config)
}

/// Editor for the configured schemas. The initially selected schema
/// defaults to the first one.
pub fn coordinator_from_config<M, T, U>(
    config: &ApplicationCfg,
    map: M,
    table: T,
    ui: U,
) -> Result<SyncCoordinator<M, T, U>, String>
where
    M: MapView,
    T: FeatureTable,
    U: EditorUi,
{
    let schemas = SchemaRegistry::from_config(config)?;
    let selected = match config.digitizer.schema {
        Some(ref name) => {
            if schemas.get(name).is_none() {
                return Err(format!("Selected schema `{}` not configured", name));
            }
            name.clone()
        }
        None => match schemas.names().first() {
            Some(name) => name.to_string(),
            None => return Err("No schema configured".to_string()),
        },
    };
    Ok(SyncCoordinator::new(schemas, Some(selected), map, table, ui))
}

pub fn headless_coordinator(config: &ApplicationCfg) -> Result<HeadlessCoordinator, String> {
    let journal = Journal::new();
    coordinator_from_config(
        config,
        MemoryMap::new(journal.clone()),
        MemoryTable::new(journal.clone()),
        MemoryEditorUi::new(journal),
    )
}

/// Run the fetch cycle of the selected schema for a sequence of viewports
pub async fn fetch_viewports<S: Transport + 'static>(
    coordinator: &mut HeadlessCoordinator,
    transport: Arc<S>,
    viewports: &[Extent],
) -> Result<(), String> {
    let mut driver = Driver::new(transport);
    driver.dispatch(coordinator.enable().map_err(|e| e.to_string())?);
    for viewport in viewports {
        info!("Viewport {}", viewport);
        let outgoing = coordinator
            .viewport_changed(viewport)
            .map_err(|e| e.to_string())?;
        driver.dispatch(outgoing);
        for err in driver.run_until_idle(coordinator).await {
            error!("{}", err);
        }
    }
    Ok(())
}

/// Fetch from the configured feature service. Returns the statistics as CSV.
pub fn fetch(config: &ApplicationCfg, viewports: &[Extent]) -> Result<String, String> {
    let mut coordinator = headless_coordinator(config)?;
    if config.digitizer.disabled {
        warn!("Editor disabled in configuration");
        return Ok(String::new());
    }
    let transport = Arc::new(HttpTransport::from_config(&config.remote)?);
    let rt = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    rt.block_on(fetch_viewports(&mut coordinator, transport, viewports))?;
    for schema in coordinator.schemas().feature_schemas() {
        info!(
            "Schema `{}`: {} features loaded",
            schema.settings.name,
            schema.store.len()
        );
    }
    Ok(coordinator.stats().as_csv())
}

/// Parse viewport list `minx,miny,maxx,maxy;minx,...`
pub fn viewports_from_arg(arg: &str) -> Result<Vec<Extent>, String> {
    arg.split(';')
        .filter(|s| !s.trim().is_empty())
        .map(Extent::from_csv)
        .collect()
}

pub fn gen_config(args: &ArgMatches) -> String {
    let toml = r#"
[digitizer]
# Editor instance id
id = "digitizer"
# Map element
target = "map"
# Initially selected schema
#schema = "poi"
# Defaults for all schemas
#max_results = 1000
#search_type = "current_extent"
"#;
    let mut config = "# digitizer configuration\n".to_string();
    if args.value_of("config").is_some() {
        match config_from_args(args).and_then(|cfg| {
            let transport = HttpTransport::from_config(&cfg.remote)?;
            let schemas = SchemaRegistry::from_config(&cfg)?;
            Ok((transport, schemas))
        }) {
            Ok((transport, schemas)) => {
                config.push_str(&transport.gen_runtime_config());
                config.push_str(toml);
                config.push_str(&schemas.gen_runtime_config());
                return config;
            }
            Err(err) => warn!("Ignoring configuration - {}", err),
        }
    }
    config.push_str(&HttpTransport::gen_config());
    config.push_str(toml);
    config.push_str(&SchemaRegistry::gen_config());
    config
}

#[test]
fn test_gen_config() {
    let args = ArgMatches::new();
    let toml = gen_config(&args);
    assert_eq!(Some("# digitizer configuration"), toml.lines().next());

    let config: ApplicationCfg = parse_config(toml, "").unwrap();
    let coordinator = headless_coordinator(&config).unwrap();
    assert_eq!(coordinator.schemas().names(), vec!["poi"]);
    assert_eq!(coordinator.activation().selected(), Some("poi"));
}

#[test]
fn test_selected_schema() {
    let mut config: ApplicationCfg = parse_config(DEFAULT_CONFIG.to_string(), "").unwrap();
    config.digitizer.schema = Some("roads".to_string());
    assert_eq!(
        headless_coordinator(&config).err(),
        Some("Selected schema `roads` not configured".to_string())
    );
}

#[test]
fn test_viewports_arg() {
    let viewports = viewports_from_arg("0,0,10,10; -2,0,12,10;").unwrap();
    assert_eq!(viewports.len(), 2);
    assert_eq!(viewports[1], Extent::new(-2.0, 0.0, 12.0, 10.0));
    assert!(viewports_from_arg("0,0,10").is_err());
}
