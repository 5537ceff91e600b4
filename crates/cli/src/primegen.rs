// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use conflux::primes::generate_prime;
use rand::rngs::OsRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::io::Write;
use tracing::info;

const BYTES_PER_LINE: usize = 16;

pub fn execute(bits: &[u64], seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_rng(OsRng)?,
    };
    let mut stdout = std::io::stdout().lock();
    for text in generate(bits, &mut rng)? {
        stdout.write_all(text.as_bytes()).context("writing to stdout")?;
    }
    Ok(())
}

/// Generates one prime per requested size and renders each as a constant.
pub fn generate<R: Rng + ?Sized>(bits: &[u64], rng: &mut R) -> Result<Vec<String>> {
    bits.iter()
        .map(|&n| {
            let p = generate_prime(n, rng).with_context(|| format!("generating {n}-bit prime"))?;
            info!(bits = n, "generated prime");
            Ok(format_const(n, &p.to_bytes_be()))
        })
        .collect()
}

/// Renders `bytes` as `pub const P_<bits>: &[u8] = &[...];`.
pub fn format_const(bits: u64, bytes: &[u8]) -> String {
    let mut out = format!("pub const P_{bits}: &[u8] = &[\n");
    for line in bytes.chunks(BYTES_PER_LINE) {
        out.push_str("   ");
        for b in line {
            out.push_str(&format!(" 0x{b:02x},"));
        }
        out.push('\n');
    }
    out.push_str("];\n\n");
    out
}
