/*!

  Expansion of a [Template] back into gates of a live netlist.

  Every expansion draws fresh ids, so one template can be dropped any number of
  times. Pin mappings are not consulted: the new gates come out unconnected to
  the rest of the circuit and are wired by hand through their own pins.

*/

use crate::{
    circuit::{GateId, GateKind, Position, Wire},
    error::{GateError, Result},
    netlist::Netlist,
    persist::connect_record,
    template::Template,
    util::fresh_id,
};
use log::{info, warn};
use std::collections::HashMap;

/// The gates and wires created by one expansion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    /// New gate ids, in template order
    pub nodes: Vec<GateId>,
    /// New wires, in template order
    pub wires: Vec<Wire>,
}

/// The top-left corner of the template's gates
fn origin(template: &Template) -> Position {
    template
        .internal_gates
        .iter()
        .map(|g| g.position())
        .reduce(|a, b| Position::new(a.x.min(b.x), a.y.min(b.y)))
        .unwrap_or_default()
}

/// Expands `template` into `netlist` with its top-left corner at `anchor`.
///
/// The netlist is left untouched if the template holds a gate that cannot be
/// placed. Internal wires whose endpoints are missing are skipped.
pub fn instantiate(netlist: &mut Netlist, template: &Template, anchor: Position) -> Result<Placement> {
    if let Some(bad) = template
        .internal_gates
        .iter()
        .find(|g| matches!(g.gate_type, GateKind::Custom(_)))
    {
        return Err(GateError::UnexpandedTemplate(bad.gate_type.clone()));
    }

    let offset = origin(template);
    let mut placement = Placement::default();
    let mut renamed: HashMap<&GateId, GateId> = HashMap::new();

    for g in &template.internal_gates {
        let at = anchor + (g.position() - offset);
        let id = netlist.add_node_at(g.gate_type.clone(), Some(fresh_id()), at)?;
        netlist.set_label(&id, g.custom_label.clone())?;
        renamed.insert(&g.id, id.clone());
        placement.nodes.push(id);
    }

    for w in &template.internal_wires {
        let (Some(source), Some(dest)) = (renamed.get(&w.start_gate_id), renamed.get(&w.end_gate_id))
        else {
            warn!(
                "template {} has a wire from {} to {} outside its gates",
                template.name, w.start_gate_id, w.end_gate_id
            );
            continue;
        };
        match connect_record(netlist, w, source, dest) {
            Ok(()) => placement
                .wires
                .push(Wire::new(source.clone(), dest.clone(), w.end_pin_type)),
            Err(e) => warn!("template {}: skipping wire: {e}", template.name),
        }
    }

    info!(
        "placed {} with {} gate(s) at ({}, {})",
        template.name,
        placement.nodes.len(),
        anchor.x,
        anchor.y
    );
    Ok(placement)
}
