// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Threadline-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Threadline and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Threadline headless driver.
//!
//! Loads a project from a store snapshot into the in-memory remote, replays a gesture script
//! against the controller, waits for every remote call to settle and prints the resulting
//! scene for the selected view as JSON on stdout. Logs go to stderr.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use threadline::controller::{Notice, Outcome};
use threadline::gateway::MemorySnapshot;
use threadline::model::ProjectId;
use threadline::view::Scene;
use threadline::{CanvasConfig, Controller, Gateway, Gesture, MemoryRemote, View};

const DEFAULT_PROJECT: &str = "default";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--store <snapshot.json>] [--project <id>] [--view <view>] [--replay <gestures.json>] [--config <config.json>] [--save]\n\n--store loads the decisions/decision_links snapshot (empty when omitted).\n--project selects the project id (default {DEFAULT_PROJECT}).\n--view is one of process, information, opportunities (default process).\n--replay applies a JSON array of gestures before printing.\n--save writes the store back to the --store file afterwards.\n\nRUST_LOG controls log output on stderr (default threadline=info)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    store: Option<String>,
    project: Option<String>,
    view: Option<View>,
    replay: Option<String>,
    config: Option<String>,
    save: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    fn value(slot: &Option<impl Sized>, args: &mut impl Iterator<Item = String>) -> Result<String, ()> {
        if slot.is_some() {
            return Err(());
        }
        args.next().ok_or(())
    }

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--store" => options.store = Some(value(&options.store, &mut args)?),
            "--project" => options.project = Some(value(&options.project, &mut args)?),
            "--replay" => options.replay = Some(value(&options.replay, &mut args)?),
            "--config" => options.config = Some(value(&options.config, &mut args)?),
            "--view" => {
                let raw = value(&options.view, &mut args)?;
                options.view = Some(raw.parse().map_err(|_| ())?);
            }
            "--save" => {
                if options.save {
                    return Err(());
                }
                options.save = true;
            }
            _ => return Err(()),
        }
    }

    if options.save && options.store.is_none() {
        return Err(());
    }

    Ok(options)
}

#[derive(Serialize)]
struct Report {
    scene: Scene,
    notices: Vec<Notice>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("threadline=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "threadline".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };
        init_logging();

        let config = CanvasConfig::load_or_default(options.config.as_deref().map(Path::new))?;
        let snapshot = match &options.store {
            Some(path) => serde_json::from_str::<MemorySnapshot>(&std::fs::read_to_string(path)?)?,
            None => MemorySnapshot::default(),
        };
        let gestures = match &options.replay {
            Some(path) => serde_json::from_str::<Vec<Gesture>>(&std::fs::read_to_string(path)?)?,
            None => Vec::new(),
        };
        let project_id = ProjectId::new(options.project.as_deref().unwrap_or(DEFAULT_PROJECT))?;
        let view = options.view.unwrap_or_default();

        let remote = MemoryRemote::from_snapshot(snapshot);
        let gateway = Gateway::new(Arc::new(remote.clone()));

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let report = runtime.block_on(async move {
            let mut controller = Controller::new(project_id, gateway, config);
            controller.load().await?;

            for (index, gesture) in gestures.into_iter().enumerate() {
                if let Outcome::Ignored(reason) = controller.dispatch(gesture) {
                    tracing::info!(index, ?reason, "gesture ignored");
                }
                controller.apply_ready_completions();
            }
            controller.settle().await;

            Ok::<_, Box<dyn Error>>(Report {
                scene: controller.scene(view),
                notices: controller.take_notices(),
            })
        })?;

        println!("{}", serde_json::to_string_pretty(&report)?);

        if let (true, Some(path)) = (options.save, &options.store) {
            std::fs::write(path, serde_json::to_string_pretty(&remote.snapshot())?)?;
            tracing::info!(path = %path, "store saved");
        }
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("threadline: {err}");
        std::process::exit(1);
    }
}
