// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use voicetask::config::{ManagerConfig, Script};
use voicetask::render::render;
use voicetask::util::{format_note_end, format_task};
use voicetask::VoiceManager;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Note and voice task scheduling for polyphonic plugins."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs an event script through a voice manager and prints the tasks.
    Render {
        /// The path to the event script.
        script_path: String,
        /// The path to the voice manager config. Defaults are used if unset.
        #[arg[short, long]]
        config: Option<String>,
    },
    /// Loads and validates a voice manager config.
    CheckConfig {
        /// The path to the voice manager config.
        config_path: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            script_path,
            config,
        } => {
            let manager_config = match config {
                Some(path) => ManagerConfig::deserialize(&PathBuf::from(path))?,
                None => ManagerConfig::default(),
            };
            let script = Script::deserialize(&PathBuf::from(&script_path))?;
            let mut manager = VoiceManager::from_config(&manager_config);
            let rendering = render(&script, &mut manager)?;

            if rendering.tasks.is_empty() {
                println!("No tasks rendered from {}.", script_path);
                return Ok(());
            }

            println!("Tasks (count: {}):", rendering.tasks.len());
            for rendered in rendering.tasks.iter() {
                println!("- {}", format_task(rendered.block, &rendered.task));
            }

            if !rendering.note_ends.is_empty() {
                println!("\nNote ends (count: {}):", rendering.note_ends.len());
                for rendered in rendering.note_ends.iter() {
                    println!("- {}", format_note_end(rendered.block, &rendered.end));
                }
            }
        }
        Commands::CheckConfig { config_path } => {
            let config = ManagerConfig::deserialize(&PathBuf::from(&config_path))?;
            println!("{} is valid:", config_path);
            println!("- polyphony: {}", config.polyphony());
            println!("- pitch wheel range: {} semitones", config.pitch_wheel_range());
        }
    }

    Ok(())
}
