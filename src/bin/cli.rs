// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! omnibridge CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use omnibridge::anim::{self, ImportOptions, LoadTo, StartAt, TargetState};
use omnibridge::cli::{anim_json, metadata_from_pairs, parse_key_val, write_json, Reporter};
use omnibridge::config::BridgeConfig;
use omnibridge::document::{self, Template};
use omnibridge::project::{payload_reference_for, project_path_for, CharacterParts, PartNames, ProjectExport};
use omnibridge::scene::{SceneNode, Transform};
use omnibridge::shapes::TransferJob;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "omnibridge")]
#[command(about = "USD interchange generation and Audio2Face animation import", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./omnibridge.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the project template with a payload path and metadata
    Generate {
        /// Payload asset path, e.g. ./char.usd
        payload: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Metadata line written as `key = value`; the key may carry a type
        /// (`bool mm:flag=1`). Repeat for more
        #[arg(short, long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        meta: Vec<(String, String)>,

        /// Custom template file
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Write <head>_project.usda for an exported character head
    Project {
        /// Exported head USD file
        head: PathBuf,

        /// Scene snapshot (JSON) used to resolve part names
        #[arg(long)]
        scene: Option<PathBuf>,

        #[arg(long)]
        skin: Option<String>,

        #[arg(long)]
        tongue: Option<String>,

        #[arg(long)]
        eye_left: Option<String>,

        #[arg(long)]
        eye_right: Option<String>,

        #[arg(long)]
        gums: Option<String>,

        /// Extra static mesh; repeat for more
        #[arg(long = "static")]
        extra_static: Vec<String>,

        /// Extra dynamic mesh; repeat for more
        #[arg(long = "dynamic")]
        extra_dynamic: Vec<String>,

        #[arg(long)]
        axis_fwd: Option<String>,

        #[arg(long)]
        axis_up: Option<String>,

        /// Mark the character as hidden
        #[arg(long)]
        hidden: bool,

        /// Print the document instead of writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Load a USDA or JSON weights cache, optionally planning its import
    Anim {
        /// .usda weights cache or .json export
        input: PathBuf,

        /// Frame rate of JSON exports
        #[arg(long)]
        frame_rate: Option<f64>,

        /// Print the clip, and the plan when planning, as one JSON document
        #[arg(long)]
        json: bool,

        /// Target snapshot (JSON); plans the import when given
        #[arg(long)]
        target: Option<PathBuf>,

        /// Start at this frame instead of the playhead
        #[arg(long)]
        start_frame: Option<i32>,

        /// Load as a new clip track instead of the current action
        #[arg(long)]
        clip: bool,

        /// Rescale keys to the scene frame rate
        #[arg(long)]
        scale: bool,

        /// Replace existing clips of the same name
        #[arg(long)]
        overwrite: bool,

        /// Write the import plan as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Transfer shape keys through a vertex mapping
    Transfer {
        /// Transfer job (JSON)
        input: PathBuf,

        /// Output file for the resulting keys (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(err) = run(cli) {
        Reporter::report_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = BridgeConfig::from_file(path)?;
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
        None => BridgeConfig::load()?,
    };
    config.verbose |= cli.verbose;

    match cli.command {
        Commands::Generate {
            payload,
            output,
            meta,
            template,
        } => {
            generate_command(&config, &payload, output.as_deref(), &meta, template.as_deref())?;
        }
        Commands::Project {
            head,
            scene,
            skin,
            tongue,
            eye_left,
            eye_right,
            gums,
            extra_static,
            extra_dynamic,
            axis_fwd,
            axis_up,
            hidden,
            dry_run,
        } => {
            let names = PartNames {
                skin,
                tongue,
                eye_left,
                eye_right,
                gums_lower: gums,
                extra_static,
                extra_dynamic,
            };
            if let Some(forward) = axis_fwd {
                config.axes.forward = forward;
            }
            if let Some(up) = axis_up {
                config.axes.up = up;
            }
            if hidden {
                config.axes.visible = false;
            }
            project_command(&config, &head, scene.as_deref(), &names, dry_run)?;
        }
        Commands::Anim {
            input,
            frame_rate,
            json,
            target,
            start_frame,
            clip,
            scale,
            overwrite,
            output,
        } => {
            let options = ImportOptions {
                start: start_frame.map(StartAt::Frame).unwrap_or(StartAt::Playhead),
                load_to: if clip { LoadTo::Clip } else { LoadTo::CurrentAction },
                apply_scale: scale,
                overwrite,
            };
            let rate = frame_rate.unwrap_or(config.json_frame_rate);
            anim_command(&input, rate, json, target.as_deref(), &options, output.as_deref())?;
        }
        Commands::Transfer { input, output } => {
            transfer_command(&input, output.as_deref())?;
        }
        Commands::Version => {
            println!("omnibridge v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn generate_command(
    config: &BridgeConfig,
    payload: &str,
    output: Option<&Path>,
    meta: &[(String, String)],
    template: Option<&Path>,
) -> Result<()> {
    let template = match template {
        Some(path) => Template::from_file(path)
            .with_context(|| format!("Failed to load template: {:?}", path))?,
        None => config.load_template()?,
    };
    let metadata = metadata_from_pairs(meta);

    let start = Instant::now();
    match output {
        Some(path) => {
            document::write(path, &template, payload, &metadata)
                .with_context(|| format!("Failed to write document: {:?}", path))?;
            if config.verbose {
                Reporter::report_document(path, payload, &metadata, start.elapsed());
            } else {
                Reporter::success(&format!("Wrote {}", path.display()));
            }
        }
        None => {
            let text = template.generate(payload, &metadata)?;
            print!("{}", text);
        }
    }

    Ok(())
}

fn project_command(
    config: &BridgeConfig,
    head: &Path,
    scene: Option<&Path>,
    names: &PartNames,
    dry_run: bool,
) -> Result<()> {
    let names_given = names.skin.is_some()
        || names.tongue.is_some()
        || names.eye_left.is_some()
        || names.eye_right.is_some()
        || names.gums_lower.is_some()
        || !names.extra_static.is_empty()
        || !names.extra_dynamic.is_empty();

    let (parts, root_transform) = match scene {
        Some(path) => {
            let scene = SceneNode::from_json_file(path)?;
            let parts = CharacterParts::resolve(&scene, names)?;
            (parts, scene.transform.clone())
        }
        None if names_given => bail!("--scene is required when naming character parts"),
        None => {
            Reporter::report_warning("No scene snapshot given; writing a project without parts");
            (CharacterParts::default(), Transform::identity())
        }
    };

    let export = ProjectExport::new(parts)
        .with_axes(config.axes.clone())
        .with_template(config.load_template()?)
        .with_root_transform(root_transform);

    if dry_run {
        let payload = payload_reference_for(head)?;
        print!("{}", export.generate(&payload)?);
        return Ok(());
    }

    let start = Instant::now();
    let path = export
        .write(head)
        .with_context(|| format!("Failed to write project: {:?}", project_path_for(head)))?;
    if config.verbose {
        Reporter::report_document(&path, &payload_reference_for(head)?, &export.metadata(), start.elapsed());
    } else {
        Reporter::success(&format!("Exported project to: '{}'", path.display()));
    }

    Ok(())
}

fn anim_command(
    input: &Path,
    frame_rate: f64,
    json: bool,
    target: Option<&Path>,
    options: &ImportOptions,
    output: Option<&Path>,
) -> Result<()> {
    let clip = anim::load_clip(input, frame_rate)
        .with_context(|| format!("Unable to load data from file {}", input.display()))?;

    let plan = match target {
        Some(target_path) => {
            let content = std::fs::read_to_string(target_path)
                .with_context(|| format!("Failed to read target snapshot: {:?}", target_path))?;
            let target: TargetState = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse target snapshot: {:?}", target_path))?;
            Some(anim::plan_import(&clip, &target, options)?)
        }
        None => None,
    };

    // With --json stdout carries a single JSON document and nothing else
    if json {
        let document = anim_json(&clip, plan.as_ref())?;
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        Reporter::report_clip(&input.display().to_string(), &clip);
        if let Some(plan) = &plan {
            Reporter::report_plan(plan);
        }
    }

    if let (Some(plan), Some(path)) = (&plan, output) {
        write_json(path, plan)
            .with_context(|| format!("Failed to write plan: {:?}", path))?;
        if !json {
            Reporter::report_info(&format!(
                "Plan for {} curves written to {}",
                anim::plan::clip_data_paths(&clip).len(),
                path.display()
            ));
        }
    }

    Ok(())
}

fn transfer_command(input: &Path, output: Option<&Path>) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read transfer job: {:?}", input))?;
    let job: TransferJob = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse transfer job: {:?}", input))?;

    let (keys, report) = job.run()?;

    match output {
        Some(path) => {
            write_json(path, &keys)
                .with_context(|| format!("Failed to write shape keys: {:?}", path))?;
            Reporter::report_transfer(&report);
        }
        None => println!("{}", serde_json::to_string_pretty(&keys)?),
    }

    Ok(())
}
