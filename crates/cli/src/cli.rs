// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::path::PathBuf;

use crate::helpers::telemetry::setup_tracing;
use crate::{dump, primegen};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use conflux::{load_config, FieldSize, ReconConfig};
use tracing::{debug, Level};

#[derive(Parser, Debug)]
#[command(name = "conflux")]
#[command(about = "Tools for inspecting set reconciliation prefix trees", long_about = None)]
pub struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity (error, warn, info, debug, trace). Logs go to stderr.
    #[arg(long, global = true, default_value_t = Level::INFO)]
    log_level: Level,

    /// Prime field of the sample values (sks, p128, p160, p256, p512)
    #[arg(long, global = true, value_parser = parse_field)]
    field: Option<FieldSize>,

    /// Bits consumed per prefix-tree level
    #[arg(long, global = true)]
    bit_quantum: Option<u32>,

    /// Sample values carried by every node
    #[arg(long, global = true)]
    num_samples: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate random primes and print them as byte array constants
    Primegen {
        /// Bit sizes to generate
        #[arg(long, num_args = 1.., default_values_t = [128u64, 160, 256, 512])]
        bits: Vec<u64>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Decode a `db_dump` of a prefix-tree database and print its nodes as JSON
    DumpPtree {
        /// Dump file to read instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        setup_tracing(self.log_level);

        match &self.command {
            Commands::Primegen { bits, seed } => primegen::execute(bits, *seed),
            Commands::DumpPtree { input } => {
                let config = self.recon_config()?;
                dump::execute(input.as_deref(), &config)
            }
        }
    }

    /// Loads the configuration and applies command-line overrides.
    pub fn recon_config(&self) -> Result<ReconConfig> {
        let mut config = load_config(self.config.as_deref()).context("loading configuration")?;
        if let Some(field) = self.field {
            config.field = field;
        }
        if let Some(bit_quantum) = self.bit_quantum {
            config.bit_quantum = bit_quantum;
        }
        if let Some(num_samples) = self.num_samples {
            config.num_samples = num_samples;
        }
        config.validate()?;
        debug!(?config, "resolved configuration");
        Ok(config)
    }
}

fn parse_field(s: &str) -> Result<FieldSize, String> {
    s.parse().map_err(|err: conflux::ConfigError| err.to_string())
}
