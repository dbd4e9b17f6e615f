/*!

  Extraction of a selected subgraph into a [Template].

  Boundary ports are inferred from the wiring around the selection:

  - An input slot whose wire comes from outside the selection, or that has no
    wire at all, becomes an exposed input. Slots fed by the same outside gate
    share one port; every unconnected slot gets a port of its own.
  - An output pin with no wires, or with at least one wire leaving the
    selection, becomes an exposed output.

*/

use crate::{
    circuit::{GateId, Slot},
    error::{GateError, Result},
    graph::FanOutTable,
    netlist::Netlist,
    persist::encode_induced,
    template::{Direction, PinMapping, Template, template_name},
};
use log::info;
use std::collections::{HashMap, HashSet};

/// What an exposed input is keyed on when merging shared ports
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SourceKey {
    /// An outside gate
    External(GateId),
    /// A slot with nothing connected
    Unconnected(GateId, Slot),
}

/// Hands out `In-n` names in first-seen order
#[derive(Default)]
struct InputNames {
    names: HashMap<SourceKey, String>,
}

impl InputNames {
    fn name_for(&mut self, key: SourceKey) -> String {
        let next = self.names.len() + 1;
        self.names
            .entry(key)
            .or_insert_with(|| format!("In-{next}"))
            .clone()
    }
}

/// Infers the boundary ports of `selection` within `netlist`.
///
/// Gates are visited in selection order, inputs A before B.
pub fn infer_mappings(netlist: &Netlist, selection: &[GateId]) -> Result<Vec<PinMapping>> {
    let fan_out = netlist.get_analysis::<FanOutTable>()?;
    let members: HashSet<&GateId> = selection.iter().collect();
    let mut inputs = InputNames::default();
    let mut mappings = Vec::new();
    let mut out_counter = 1;

    for node in selection.iter().filter_map(|id| netlist.node(id)) {
        for slot in node.kind().input_slots() {
            let key = match node.driver(*slot) {
                Some(driver) if members.contains(driver) => continue,
                Some(driver) => SourceKey::External(driver.clone()),
                None => SourceKey::Unconnected(node.id().clone(), *slot),
            };
            let name = inputs.name_for(key);
            mappings.push(PinMapping::new(name, Direction::In, node.id().clone(), *slot));
        }

        if node.kind().has_output() {
            let exposed = !fan_out.has_uses(node.id())
                || fan_out
                    .get_wires(node.id())
                    .any(|w| !members.contains(&w.dest));
            if exposed {
                let name = format!("Out-{out_counter}");
                out_counter += 1;
                mappings.push(PinMapping::new(
                    name,
                    Direction::Out,
                    node.id().clone(),
                    Slot::Out,
                ));
            }
        }
    }
    Ok(mappings)
}

/// Packages the selected gates of `netlist` as a template named `name`.
///
/// The template holds the selected gates, the wires among them, and the
/// inferred boundary ports, numbered in selection order. Ids of selected gates
/// missing from the netlist, and repeated ids, are ignored; if none remain the
/// selection is empty.
pub fn bundle(netlist: &Netlist, selection: &[GateId], name: &str) -> Result<Template> {
    let mut members: HashSet<GateId> = HashSet::new();
    let ordered: Vec<GateId> = selection
        .iter()
        .filter(|id| netlist.contains(id) && members.insert((*id).clone()))
        .cloned()
        .collect();
    if ordered.is_empty() {
        return Err(GateError::EmptySelection);
    }
    let name = template_name(name)?;

    let mappings = infer_mappings(netlist, &ordered)?;
    let record = encode_induced(netlist, &members);
    let template = Template {
        name,
        internal_gates: record.gates,
        internal_wires: record.wires,
        mappings,
    };
    info!(
        "bundled {} gate(s) into {} with {} input(s) and {} output(s)",
        template.internal_gates.len(),
        template.name,
        template.input_count(),
        template.output_count()
    );
    Ok(template)
}
