// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Decodes the text output of Berkeley DB `db_dump` run against a prefix-tree
//! database. The dump is a header terminated by `HEADER=END`, then alternating
//! hex-encoded key and value lines, terminated by `DATA=END`.

use anyhow::{Context, Result};
use conflux::{NodeCodec, PrefixNode, ReconConfig};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// JSON view of one decoded node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDump {
    pub svalues: Vec<String>,
    pub num_elements: usize,
    pub key: String,
    pub leaf: bool,
    pub fingerprints: Vec<String>,
    pub children: Vec<String>,
}

impl From<&PrefixNode> for NodeDump {
    fn from(node: &PrefixNode) -> Self {
        Self {
            svalues: node.sample_values.iter().map(|z| z.to_string()).collect(),
            num_elements: node.num_elements,
            key: node.key.to_string(),
            leaf: node.is_leaf(),
            fingerprints: node
                .fingerprints()
                .unwrap_or_default()
                .iter()
                .map(|fp| fp.to_string())
                .collect(),
            children: node
                .children()
                .unwrap_or_default()
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

#[derive(Clone, Copy)]
enum State {
    Header,
    Key,
    Value,
}

pub fn execute(input: Option<&Path>, config: &ReconConfig) -> Result<()> {
    let codec = NodeCodec::new(config.wire_params()?)?;
    let nodes = match input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            dump(BufReader::new(file), &codec)?
        }
        None => dump(std::io::stdin().lock(), &codec)?,
    };
    info!(nodes = nodes.len(), "decoded prefix-tree dump");

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &nodes).context("writing JSON")?;
    writeln!(stdout).context("writing to stdout")?;
    Ok(())
}

/// Reads a `db_dump` stream and decodes every value line as a node record.
/// Lines that are not valid hex or do not decode are skipped.
pub fn dump<R: BufRead>(reader: R, codec: &NodeCodec) -> Result<Vec<NodeDump>> {
    let mut state = State::Header;
    let mut nodes = Vec::new();
    let mut key = String::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", lineno + 1))?;
        let line = line.trim();
        match state {
            _ if line == "HEADER=END" => state = State::Key,
            State::Header => continue,
            _ if line == "DATA=END" => break,
            State::Key => {
                key.clear();
                key.push_str(line);
                state = State::Value;
            }
            State::Value => {
                state = State::Key;
                let bytes = match hex::decode(line) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        warn!(line = lineno + 1, %key, %err, "skipping value that is not hex");
                        continue;
                    }
                };
                match codec.decode(&bytes) {
                    Ok(node) => {
                        debug!(%key, node_key = %node.key, "decoded node");
                        nodes.push(NodeDump::from(&node));
                    }
                    Err(err) => warn!(line = lineno + 1, %key, %err, "skipping undecodable node"),
                }
            }
        }
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conflux::{Bitstring, FieldSize, Fingerprint, Zp};

    fn codec() -> NodeCodec {
        NodeCodec::new(ReconConfig::default().wire_params().unwrap()).unwrap()
    }

    fn leaf(codec: &NodeCodec) -> PrefixNode {
        let p = &codec.params().modulus;
        PrefixNode::leaf(
            1,
            Bitstring::from_bytes(2, &[0x80]),
            (1..=6).map(|v| Zp::from_u64(v, p)).collect(),
            vec![Fingerprint::new(vec![0xaa; 17])],
        )
    }

    fn internal(codec: &NodeCodec) -> PrefixNode {
        let p = &codec.params().modulus;
        PrefixNode::internal(40, Bitstring::new(0), vec![Zp::from_i64(-1, p); 6], 2).unwrap()
    }

    fn dump_text(values: &[String]) -> String {
        let mut text = String::from("VERSION=3\nformat=bytevalue\ntype=btree\nHEADER=END\n");
        for (i, value) in values.iter().enumerate() {
            text.push_str(&format!(" {i:02x}\n {value}\n"));
        }
        text.push_str("DATA=END\n");
        text
    }

    #[test]
    fn test_dump_decodes_records_in_order() {
        let codec = codec();
        let values = vec![
            hex::encode(codec.encode(&internal(&codec)).unwrap()),
            hex::encode(codec.encode(&leaf(&codec)).unwrap()),
        ];
        let nodes = dump(dump_text(&values).as_bytes(), &codec).unwrap();
        assert_eq!(nodes.len(), 2);

        assert!(!nodes[0].leaf);
        assert_eq!(nodes[0].num_elements, 40);
        assert_eq!(nodes[0].key, "");
        assert_eq!(nodes[0].children, vec!["00", "10", "01", "11"]);
        assert!(nodes[0].fingerprints.is_empty());
        assert_eq!(
            nodes[0].svalues[0],
            (FieldSize::Sks.modulus().value() - 1u32).to_string()
        );

        assert!(nodes[1].leaf);
        assert_eq!(nodes[1].key, "10");
        assert_eq!(nodes[1].svalues, vec!["1", "2", "3", "4", "5", "6"]);
        assert_eq!(nodes[1].fingerprints, vec!["aa".repeat(17)]);
        assert!(nodes[1].children.is_empty());
    }

    #[test]
    fn test_dump_skips_bad_records() {
        let codec = codec();
        let good = hex::encode(codec.encode(&leaf(&codec)).unwrap());
        let truncated = good[..good.len() - 4].to_string();
        let values = vec!["not hex".to_string(), truncated, good];
        let nodes = dump(dump_text(&values).as_bytes(), &codec).unwrap();
        assert_eq!(nodes, vec![NodeDump::from(&leaf(&codec))]);
    }

    #[test]
    fn test_dump_ignores_everything_outside_data_section() {
        let codec = codec();
        let good = hex::encode(codec.encode(&leaf(&codec)).unwrap());
        // a value-looking line in the header and a record after DATA=END
        let text = format!("{good}\nHEADER=END\n00\n{good}\nDATA=END\n01\n{good}\n");
        let nodes = dump(text.as_bytes(), &codec).unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn test_json_field_names() {
        let codec = codec();
        let json = serde_json::to_value(NodeDump::from(&leaf(&codec))).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["children", "fingerprints", "key", "leaf", "num_elements", "svalues"]
        );
    }
}
