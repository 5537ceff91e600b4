// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Protocol parameters supplied by the deployment.
//!
//! Both peers must agree on every value here. Defaults match an SKS keyserver
//! prefix tree.

pub use crate::bitstring::MAX_BIT_QUANTUM;
use crate::errors::{ConfigError, ConfigResult};
use crate::primes::FieldSize;
use crate::wire::WireParams;
use crate::zp::Modulus;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables with this prefix override file values,
/// e.g. `CONFLUX_BIT_QUANTUM=3`.
pub const ENV_PREFIX: &str = "CONFLUX_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub bit_quantum: u32,
    pub num_samples: usize,
    pub fingerprint_len: usize,
    pub field: FieldSize,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            bit_quantum: 2,
            num_samples: 6,
            fingerprint_len: 17,
            field: FieldSize::Sks,
        }
    }
}

impl ReconConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=MAX_BIT_QUANTUM).contains(&self.bit_quantum) {
            return Err(ConfigError::invalid(format!(
                "bit_quantum must be between 1 and {MAX_BIT_QUANTUM}, got {}",
                self.bit_quantum
            )));
        }
        if self.num_samples == 0 {
            return Err(ConfigError::invalid("num_samples must be at least 1"));
        }
        if self.fingerprint_len == 0 {
            return Err(ConfigError::invalid("fingerprint_len must be at least 1"));
        }
        Ok(())
    }

    pub fn modulus(&self) -> Modulus {
        self.field.modulus()
    }

    /// Validated parameters for [`crate::wire::NodeCodec`].
    pub fn wire_params(&self) -> ConfigResult<WireParams> {
        self.validate()?;
        Ok(WireParams {
            bit_quantum: self.bit_quantum,
            num_samples: self.num_samples,
            fingerprint_len: self.fingerprint_len,
            modulus: self.modulus(),
        })
    }
}

/// Layers defaults, the optional YAML file at `path`, then `CONFLUX_*`
/// environment variables, and validates the result.
pub fn load_config(path: Option<&Path>) -> ConfigResult<ReconConfig> {
    let mut figment = Figment::from(Serialized::defaults(ReconConfig::default()));
    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::invalid(format!(
                "configuration file {} not found",
                path.display()
            )));
        }
        figment = figment.merge(Yaml::file(path));
    }
    let config: ReconConfig = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
    config.validate()?;
    Ok(config)
}
