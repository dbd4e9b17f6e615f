/*!

  Graph analyses over a [Netlist].

*/

use crate::circuit::{GateId, Wire};
use crate::error::{GateError, Result};
use crate::netlist::Netlist;
#[cfg(feature = "graph")]
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// A common trait of analyses than can be performed on a netlist.
/// An analysis becomes stale when the netlist is modified.
pub trait Analysis<'a>
where
    Self: Sized + 'a,
{
    /// Construct the analysis to the current state of the netlist.
    fn build(netlist: &'a Netlist) -> Result<Self>;
}

impl Netlist {
    /// Constructs an analysis of the netlist.
    pub fn get_analysis<'a, A: Analysis<'a>>(&'a self) -> Result<A> {
        A::build(self)
    }
}

/// A table that maps gates to the wires they drive
pub struct FanOutTable<'a> {
    // Maps a gate to its outgoing wires, in connection order
    fan_out: HashMap<&'a GateId, Vec<&'a Wire>>,
}

impl<'a> FanOutTable<'a> {
    /// Returns an iterator to the wires driven by `id`
    pub fn get_wires(&self, id: &GateId) -> impl Iterator<Item = &'a Wire> + '_ {
        self.fan_out
            .get(id)
            .into_iter()
            .flat_map(|wires| wires.iter().copied())
    }

    /// Returns `true` if `id` drives at least one wire
    pub fn has_uses(&self, id: &GateId) -> bool {
        self.fan_out.get(id).is_some_and(|w| !w.is_empty())
    }
}

impl<'a> Analysis<'a> for FanOutTable<'a> {
    fn build(netlist: &'a Netlist) -> Result<Self> {
        let mut fan_out: HashMap<&'a GateId, Vec<&'a Wire>> = HashMap::new();
        for w in netlist.wires() {
            fan_out.entry(&w.source).or_default().push(w);
        }
        Ok(FanOutTable { fan_out })
    }
}

/// The logic level of every gate.
/// Sources and unconnected gates sit at level 0. This analysis checks for cycles.
pub struct CombDepth {
    comb_depth: HashMap<GateId, usize>,
    max_depth: usize,
}

impl CombDepth {
    /// Returns the logic level of a gate in the circuit.
    pub fn get_comb_depth(&self, id: &GateId) -> Option<usize> {
        self.comb_depth.get(id).copied()
    }

    /// Returns the maximum logic level of the circuit.
    pub fn get_max_depth(&self) -> usize {
        self.max_depth
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Open,
    Done,
}

impl<'a> Analysis<'a> for CombDepth {
    fn build(netlist: &'a Netlist) -> Result<Self> {
        let mut comb_depth: HashMap<GateId, usize> = HashMap::new();
        let mut marks: HashMap<&GateId, Mark> = HashMap::new();

        for root in netlist.nodes() {
            // Iterative post-order DFS along driver links
            let mut stack: Vec<(&GateId, bool)> = vec![(root.id(), false)];
            while let Some((id, expanded)) = stack.pop() {
                let Some(node) = netlist.node(id) else {
                    continue;
                };
                if expanded {
                    let depth = node
                        .drivers()
                        .filter_map(|(_, d)| comb_depth.get(d))
                        .max()
                        .map(|d| d + 1)
                        .unwrap_or(0);
                    comb_depth.insert(id.clone(), depth);
                    marks.insert(id, Mark::Done);
                    continue;
                }
                match marks.get(id) {
                    Some(Mark::Done) => continue,
                    Some(Mark::Open) => return Err(GateError::CycleDetected(id.clone())),
                    None => {}
                }
                marks.insert(id, Mark::Open);
                stack.push((id, true));
                for (_, driver) in node.drivers() {
                    match marks.get(driver) {
                        Some(Mark::Open) => return Err(GateError::CycleDetected(driver.clone())),
                        Some(Mark::Done) => {}
                        None => stack.push((driver, false)),
                    }
                }
            }
        }

        let max_depth = comb_depth.values().max().copied().unwrap_or(0);
        Ok(CombDepth {
            comb_depth,
            max_depth,
        })
    }
}

/// Returns a petgraph representation of the netlist, with gate ids as nodes and input slots as edges.
#[cfg(feature = "graph")]
pub struct PetGraph {
    graph: DiGraph<GateId, crate::circuit::Slot>,
    mapping: HashMap<GateId, NodeIndex>,
}

#[cfg(feature = "graph")]
impl PetGraph {
    /// Return a reference to the graph constructed by this analysis
    pub fn get_graph(&self) -> &DiGraph<GateId, crate::circuit::Slot> {
        &self.graph
    }

    /// Returns the graph node standing for gate `id`
    pub fn get_index(&self, id: &GateId) -> Option<NodeIndex> {
        self.mapping.get(id).copied()
    }
}

#[cfg(feature = "graph")]
impl<'a> Analysis<'a> for PetGraph {
    fn build(netlist: &'a Netlist) -> Result<Self> {
        netlist.verify().map_err(GateError::MalformedPersistedData)?;
        let mut mapping = HashMap::new();
        let mut graph = DiGraph::new();

        for node in netlist.nodes() {
            let idx = graph.add_node(node.id().clone());
            mapping.insert(node.id().clone(), idx);
        }

        for w in netlist.wires() {
            graph.add_edge(mapping[&w.source], mapping[&w.dest], w.slot);
        }

        Ok(Self { graph, mapping })
    }
}
