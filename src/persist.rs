/*!

  Portable records for netlists, and their JSON files.

  Decoding builds gates first and wires second. A wire whose endpoints are
  missing, or that lands on a pin its gates do not have, is skipped with a
  warning; the rest of the circuit still loads. Anything that stops the gate
  list itself from being rebuilt fails the whole decode.

*/

use crate::{
    circuit::{GateId, GateKind, Position, Slot},
    error::{GateError, Result},
    netlist::{GateNode, Netlist},
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path};

/// A persisted gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateRecord {
    /// Gate id, local to the record set
    pub id: GateId,
    /// The kind, as a gate type string like `AND_GATE`
    pub gate_type: GateKind,
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// The label, if the user set one. An empty label reads as none.
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_label: Option<String>,
}

fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let label = Option::<String>::deserialize(deserializer)?;
    Ok(label.filter(|l| !l.is_empty()))
}

impl GateRecord {
    /// Returns the position of the record
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

impl From<&GateNode> for GateRecord {
    fn from(node: &GateNode) -> Self {
        GateRecord {
            id: node.id().clone(),
            gate_type: node.kind().clone(),
            x: node.position().x,
            y: node.position().y,
            custom_label: node.label().map(str::to_string),
        }
    }
}

/// A persisted wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    /// The driving gate
    pub start_gate_id: GateId,
    /// The driven gate
    pub end_gate_id: GateId,
    /// The driven input, `A` or `B`
    pub end_pin_type: Slot,
}

/// A persisted circuit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CircuitRecord {
    /// Gates in creation order
    pub gates: Vec<GateRecord>,
    /// Wires in connection order
    #[serde(default)]
    pub wires: Vec<WireRecord>,
}

/// Encodes the whole netlist
pub fn encode(netlist: &Netlist) -> CircuitRecord {
    encode_matching(netlist, |_| true)
}

/// Encodes the subgraph induced by `keep`: the kept gates, and the wires between them
pub fn encode_induced(netlist: &Netlist, keep: &HashSet<GateId>) -> CircuitRecord {
    encode_matching(netlist, |id| keep.contains(id))
}

fn encode_matching<F>(netlist: &Netlist, keep: F) -> CircuitRecord
where
    F: Fn(&GateId) -> bool,
{
    let gates = netlist
        .matches(|n| keep(n.id()))
        .map(GateRecord::from)
        .collect();
    let wires = netlist
        .wires()
        .iter()
        .filter(|w| keep(&w.source) && keep(&w.dest))
        .map(|w| WireRecord {
            start_gate_id: w.source.clone(),
            end_gate_id: w.dest.clone(),
            end_pin_type: w.slot,
        })
        .collect();
    CircuitRecord { gates, wires }
}

/// Rebuilds a netlist from a record, keeping the stored ids
pub fn decode(record: &CircuitRecord) -> Result<Netlist> {
    let mut netlist = Netlist::new();
    for g in &record.gates {
        netlist
            .add_node_at(g.gate_type.clone(), Some(g.id.clone()), g.position())
            .map_err(|e| match e {
                GateError::UnexpandedTemplate(kind) => GateError::MalformedPersistedData(
                    format!("gate {} has unexpanded type {kind}", g.id),
                ),
                other => other,
            })?;
        netlist.set_label(&g.id, g.custom_label.clone())?;
    }
    for w in &record.wires {
        if let Err(e) = connect_record(&mut netlist, w, &w.start_gate_id, &w.end_gate_id) {
            warn!("skipping wire: {e}");
        }
    }
    Ok(netlist)
}

/// Connects a wire record between the gates now known as `source` and `dest`.
/// Failures that concern only this wire come back as [GateError::DanglingReference].
pub(crate) fn connect_record(
    netlist: &mut Netlist,
    record: &WireRecord,
    source: &GateId,
    dest: &GateId,
) -> Result<()> {
    let dangling = || GateError::DanglingReference {
        driver: record.start_gate_id.clone(),
        dest: record.end_gate_id.clone(),
        slot: record.end_pin_type,
    };
    if !netlist.contains(source) || !netlist.contains(dest) {
        return Err(dangling());
    }
    match netlist.connect(source, dest, record.end_pin_type) {
        Ok(_) => Ok(()),
        Err(GateError::InvalidConnection(_)) => Err(dangling()),
        Err(e) => Err(e),
    }
}

/// Serialize the netlist into the writer.
pub fn circuit_serialize(netlist: &Netlist, writer: impl std::io::Write) -> Result<()> {
    serde_json::to_writer_pretty(writer, &encode(netlist))?;
    Ok(())
}

/// Deserialize a netlist from the reader.
pub fn circuit_deserialize(reader: impl std::io::Read) -> Result<Netlist> {
    let record: CircuitRecord = serde_json::from_reader(reader)?;
    decode(&record)
}

/// Writes the netlist to a JSON file at `path`
pub fn save_circuit(path: impl AsRef<Path>, netlist: &Netlist) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&encode(netlist))?;
    std::fs::write(path, json)?;
    info!(
        "saved {} gate(s) and {} wire(s) to {}",
        netlist.len(),
        netlist.wires().len(),
        path.display()
    );
    Ok(())
}

/// Reads a netlist from the JSON file at `path`
pub fn load_circuit(path: impl AsRef<Path>) -> Result<Netlist> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let netlist = circuit_deserialize(std::io::BufReader::new(file))?;
    info!(
        "loaded {} gate(s) and {} wire(s) from {}",
        netlist.len(),
        netlist.wires().len(),
        path.display()
    );
    Ok(netlist)
}
