//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use clap::{App, AppSettings, ArgMatches, SubCommand};
use digitizer_core::core::config::ApplicationCfg;
use digitizer_service::runtime_config;
use dotenv::dotenv;
use env_logger::Builder;
use log::Record;
use std::env;
use std::io::Write;
use std::process;

fn init_logger(args: &ArgMatches<'_>) {
    let mut builder = Builder::new();
    builder.format(|buf, record: &Record<'_>| {
        let t = time::now();
        let timestamp = time::strftime("%Y-%m-%d %H:%M:%S", &t).unwrap_or_default();
        writeln!(
            buf,
            "{}.{:03} {} {}",
            timestamp,
            t.tm_nsec / 1000_000,
            record.level(),
            record.args()
        )
    });

    let rust_log = match (args.value_of("loglevel"), env::var("RUST_LOG")) {
        (None, Ok(rust_log_env)) => rust_log_env,
        (loglevel, _) => match loglevel.unwrap_or("info") {
            "debug" => "debug,tokio=info,hyper=info,reqwest=info".to_string(),
            loglevel => loglevel.to_string(),
        },
    };
    builder.parse_filters(&rust_log);

    builder.init();
}

fn exit_with(err: String) -> ! {
    error!("{}", err);
    process::exit(1)
}

fn load_config(args: &ArgMatches<'_>) -> ApplicationCfg {
    runtime_config::config_from_args(args).unwrap_or_else(|err| exit_with(err))
}

fn check(args: &ArgMatches<'_>) {
    let config = load_config(args);
    let coordinator =
        runtime_config::headless_coordinator(&config).unwrap_or_else(|err| exit_with(err));
    let schemas = coordinator.schemas();
    match schemas.title() {
        Some(title) => println!("Editor `{}`: {}", config.digitizer.id, title),
        None => println!(
            "Editor `{}`: {} schemas",
            config.digitizer.id,
            schemas.len()
        ),
    }
    for name in schemas.names() {
        if let Some(schema) = schemas.get(name) {
            println!(
                "  {} ({}, {}){}",
                name,
                schema.label(),
                schema.geometry_kind(),
                if schema.is_read_only() { " read-only" } else { "" }
            );
        }
    }
    if let Some(selected) = coordinator.activation().selected() {
        println!("Selected schema: {}", selected);
    }
}

fn fetch(args: &ArgMatches<'_>) {
    let config = load_config(args);
    let viewports = args
        .value_of("viewports")
        .map(runtime_config::viewports_from_arg)
        .unwrap_or_else(|| Err("Missing 'viewports' list".to_string()))
        .unwrap_or_else(|err| exit_with(format!("Error parsing 'viewports' - {}", err)));
    let stats = runtime_config::fetch(&config, &viewports).unwrap_or_else(|err| exit_with(err));
    print!("{}", stats);
}

fn main() {
    dotenv().ok();
    let mut app = App::new("digitizer")
        .version(crate_version!())
        .author("Pirmin Kalberer <pka@sourcepole.ch>")
        .about("map feature editor with incremental viewport synchronization")
        .subcommand(SubCommand::with_name("genconfig")
                        .args_from_usage("-c, --config=[FILE] 'Regenerate from existing config file'
                                              --url=[URL] 'Feature service base URL'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Generate configuration template"))
        .subcommand(SubCommand::with_name("check")
                        .args_from_usage("-c, --config=<FILE> 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Check configuration and list schemas"))
        .subcommand(SubCommand::with_name("fetch")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("-c, --config=<FILE> 'Load from custom config file'
                                              --url=[URL] 'Feature service base URL'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --viewports=[minx,miny,maxx,maxy;..] 'Sequence of viewports'")
                        .about("Run fetch cycles for a sequence of viewports and print statistics"));

    match app.get_matches_from_safe_borrow(env::args()) {
        //app.get_matches() prohibits later call of app.print_help()
        Result::Err(e) => {
            println!("{}", e);
        }
        Result::Ok(matches) => match matches.subcommand() {
            ("genconfig", Some(sub_m)) => {
                init_logger(sub_m);
                println!("{}", runtime_config::gen_config(sub_m));
            }
            ("check", Some(sub_m)) => {
                init_logger(sub_m);
                check(sub_m);
            }
            ("fetch", Some(sub_m)) => {
                init_logger(sub_m);
                fetch(sub_m);
            }
            _ => {
                let _ = app.print_help();
                println!();
            }
        },
    }
}
