/*!

  API for a netlist data structure.

  Gates live in an arena keyed by [GateId]. Connectivity is recorded twice: once
  as the list of [Wire]s, and once as the operand links each node evaluates
  through. Every mutation updates both, and [Netlist::verify] checks that they
  agree.

*/

use crate::{
    circuit::{GateId, GateKind, Position, Slot, Wire},
    error::{GateError, Result},
    gate,
    util::fresh_id,
};
use log::debug;
use std::collections::{HashMap, HashSet};

/// A gate instance in the netlist
#[derive(Debug, Clone, PartialEq)]
pub struct GateNode {
    /// Stable identifier
    id: GateId,
    /// What the gate computes
    kind: GateKind,
    /// Canvas location
    position: Position,
    /// User-facing label, if renamed
    label: Option<String>,
    /// Output of a switch or clock
    state: bool,
    /// The live drivers of input slots A and B
    operands: [Option<GateId>; 2],
}

impl GateNode {
    fn new(id: GateId, kind: GateKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            label: None,
            state: false,
            operands: [None, None],
        }
    }

    /// Returns the id of the gate
    pub fn id(&self) -> &GateId {
        &self.id
    }

    /// Returns the kind of the gate
    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    /// Returns the canvas position of the gate
    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns the custom label of the gate, if any
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the stored state. Always `false` for stateless kinds.
    pub fn state(&self) -> bool {
        self.state
    }

    /// Returns the gate driving `slot`, if connected
    pub fn driver(&self, slot: Slot) -> Option<&GateId> {
        slot.operand_index()
            .and_then(|i| self.operands[i].as_ref())
    }

    /// Returns the connected input slots along with their drivers
    pub fn drivers(&self) -> impl Iterator<Item = (Slot, &GateId)> {
        self.kind
            .input_slots()
            .iter()
            .filter_map(|s| self.driver(*s).map(|d| (*s, d)))
    }
}

impl std::fmt::Display for GateNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} @ ({}, {})",
            self.kind, self.id, self.position.x, self.position.y
        )?;
        if let Some(label) = &self.label {
            write!(f, " \"{label}\"")?;
        }
        if self.kind.is_stateful() {
            write!(f, " = {}", self.state as u8)?;
        }
        Ok(())
    }
}

/// A netlist data structure
#[derive(Debug, Clone, Default)]
pub struct Netlist {
    /// The gates in creation order
    objects: Vec<GateNode>,
    /// Maps an id to its position in `objects`
    index: HashMap<GateId, usize>,
    /// Every wire, in connection order
    wires: Vec<Wire>,
}

impl Netlist {
    /// Creates an empty netlist
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a gate at the origin. A fresh id is generated when `id` is [None].
    pub fn add_node(&mut self, kind: GateKind, id: Option<GateId>) -> Result<GateId> {
        self.add_node_at(kind, id, Position::default())
    }

    /// Adds a gate at `position`. A fresh id is generated when `id` is [None].
    pub fn add_node_at(
        &mut self,
        kind: GateKind,
        id: Option<GateId>,
        position: Position,
    ) -> Result<GateId> {
        if let GateKind::Custom(_) = kind {
            return Err(GateError::UnexpandedTemplate(kind));
        }
        let id = id.unwrap_or_else(fresh_id);
        if self.index.contains_key(&id) {
            return Err(GateError::DuplicateId(id));
        }
        debug!("add {kind} {id}");
        self.index.insert(id.clone(), self.objects.len());
        self.objects.push(GateNode::new(id.clone(), kind, position));
        Ok(id)
    }

    fn position_of(&self, id: &GateId) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GateError::UnknownNode(id.clone()))
    }

    fn node_mut(&mut self, id: &GateId) -> Result<&mut GateNode> {
        let i = self.position_of(id)?;
        Ok(&mut self.objects[i])
    }

    /// Wires the output of `source` into `slot` of `dest`.
    /// A wire already occupying the slot is detached and returned.
    pub fn connect(&mut self, source: &GateId, dest: &GateId, slot: Slot) -> Result<Option<Wire>> {
        let src = self.position_of(source)?;
        let dst = self.position_of(dest)?;
        if !self.objects[src].kind.has_output() {
            return Err(GateError::InvalidConnection(format!(
                "{} {} has no output pin",
                self.objects[src].kind, source
            )));
        }
        if !self.objects[dst].kind.accepts(slot) {
            return Err(GateError::InvalidConnection(format!(
                "{} {} has no input {}",
                self.objects[dst].kind, dest, slot
            )));
        }
        if src == dst {
            return Err(GateError::InvalidConnection(format!(
                "{source} cannot drive itself"
            )));
        }

        let displaced = self.detach(dest, slot);
        if let Some(operand) = slot.operand_index() {
            self.objects[dst].operands[operand] = Some(source.clone());
        }
        let wire = Wire::new(source.clone(), dest.clone(), slot);
        debug!("connect {wire}");
        self.wires.push(wire);
        Ok(displaced)
    }

    /// Removes the wire into `slot` of `dest` from both the wire list and the live link
    fn detach(&mut self, dest: &GateId, slot: Slot) -> Option<Wire> {
        let pos = self
            .wires
            .iter()
            .position(|w| w.dest == *dest && w.slot == slot)?;
        let wire = self.wires.remove(pos);
        if let (Some(i), Some(operand)) = (self.index.get(dest), slot.operand_index()) {
            self.objects[*i].operands[operand] = None;
        }
        Some(wire)
    }

    /// Disconnects the wire into `slot` of `dest`, restoring the slot's default.
    /// Returns the removed wire, or [None] if the slot was free.
    pub fn remove_wire(&mut self, dest: &GateId, slot: Slot) -> Option<Wire> {
        let wire = self.detach(dest, slot);
        if let Some(w) = &wire {
            debug!("disconnect {w}");
        }
        wire
    }

    /// Deletes a gate along with every wire touching it.
    /// Slots that the gate used to drive fall back to their defaults.
    pub fn remove_node(&mut self, id: &GateId) -> Result<GateNode> {
        let pos = self.position_of(id)?;

        let incident: Vec<Wire> = self
            .wires
            .iter()
            .filter(|w| w.source == *id || w.dest == *id)
            .cloned()
            .collect();
        for w in &incident {
            self.detach(&w.dest, w.slot);
        }

        let node = self.objects.remove(pos);
        self.index.remove(id);
        for (i, obj) in self.objects.iter().enumerate().skip(pos) {
            self.index.insert(obj.id.clone(), i);
        }
        debug!("remove {} {} and {} wire(s)", node.kind, id, incident.len());
        Ok(node)
    }

    /// Removes every gate and wire
    pub fn clear(&mut self) {
        self.objects.clear();
        self.index.clear();
        self.wires.clear();
    }

    /// Sets the label shown on a gate. An empty label clears it.
    pub fn set_label(&mut self, id: &GateId, label: Option<String>) -> Result<()> {
        self.node_mut(id)?.label = label.filter(|l| !l.is_empty());
        Ok(())
    }

    /// Moves a gate on the canvas
    pub fn move_node(&mut self, id: &GateId, position: Position) -> Result<()> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Drives a switch to `state`
    pub fn set_switch(&mut self, id: &GateId, state: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.kind != GateKind::Switch {
            return Err(GateError::WrongKind(id.clone(), GateKind::Switch));
        }
        node.state = state;
        Ok(())
    }

    /// Flips a switch and returns its new state
    pub fn toggle_switch(&mut self, id: &GateId) -> Result<bool> {
        let state = !self.node(id).map(|n| n.state).unwrap_or(false);
        self.set_switch(id, state)?;
        Ok(state)
    }

    /// Flips every clock. Returns the number of clocks ticked.
    pub fn tick_clocks(&mut self) -> usize {
        let mut ticked = 0;
        for node in self.objects.iter_mut().filter(|n| n.kind == GateKind::Clock) {
            node.state = !node.state;
            ticked += 1;
        }
        ticked
    }

    /// Computes the output of gate `id` by pulling its inputs recursively.
    ///
    /// Nothing is cached: every call re-evaluates the whole fan-in cone.
    /// A wire loop is reported as [GateError::CycleDetected].
    pub fn evaluate(&self, id: &GateId) -> Result<bool> {
        let mut path = HashSet::new();
        self.evaluate_on_path(id, &mut path)
    }

    fn evaluate_on_path(&self, id: &GateId, path: &mut HashSet<GateId>) -> Result<bool> {
        let node = self
            .node(id)
            .ok_or_else(|| GateError::UnknownNode(id.clone()))?;
        if !path.insert(id.clone()) {
            return Err(GateError::CycleDetected(id.clone()));
        }
        let mut inputs = [None, None];
        for (i, operand) in node.operands.iter().enumerate() {
            if let Some(driver) = operand {
                inputs[i] = Some(self.evaluate_on_path(driver, path)?);
            }
        }
        path.remove(id);
        Ok(gate::evaluate(&node.kind, inputs[0], inputs[1], node.state))
    }

    /// Evaluates every gate, in creation order
    pub fn evaluate_all(&self) -> Result<Vec<(GateId, bool)>> {
        self.objects
            .iter()
            .map(|n| Ok((n.id.clone(), self.evaluate(&n.id)?)))
            .collect()
    }

    /// Verifies that the wire list and the live operand links agree,
    /// and that every wire references gates present in the netlist.
    pub fn verify(&self) -> std::result::Result<(), String> {
        if self.index.len() != self.objects.len() {
            return Err("Netlist contains non-unique gate ids".to_string());
        }

        let mut seen = HashSet::new();
        for w in &self.wires {
            let src = self
                .node(&w.source)
                .ok_or(format!("Wire {w} has no source gate"))?;
            let dst = self
                .node(&w.dest)
                .ok_or(format!("Wire {w} has no destination gate"))?;
            if !src.kind.has_output() || !dst.kind.accepts(w.slot) {
                return Err(format!("Wire {w} connects incompatible pins"));
            }
            if !seen.insert((w.dest.clone(), w.slot)) {
                return Err(format!("Slot {}.{} has several drivers", w.dest, w.slot));
            }
            if dst.driver(w.slot) != Some(&w.source) {
                return Err(format!("Wire {w} is missing its live link"));
            }
        }

        for node in &self.objects {
            for (slot, driver) in node.drivers() {
                if !seen.contains(&(node.id.clone(), slot)) {
                    return Err(format!(
                        "Live link {driver} -> {}.{slot} has no wire",
                        node.id
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Netlist {
    /// Returns the gate with the given id
    pub fn node(&self, id: &GateId) -> Option<&GateNode> {
        self.index.get(id).map(|i| &self.objects[*i])
    }

    /// Returns `true` if the netlist holds a gate with this id
    pub fn contains(&self, id: &GateId) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the number of gates
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the netlist has no gates
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates over the gates in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &GateNode> {
        self.objects.iter()
    }

    /// Iterates over the gates matching `filter`
    pub fn matches<F>(&self, filter: F) -> impl Iterator<Item = &GateNode>
    where
        F: Fn(&GateNode) -> bool,
    {
        self.objects.iter().filter(move |n| filter(n))
    }

    /// Returns every wire, in connection order
    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    /// Returns the wire into `slot` of `dest`, if any
    pub fn wire_into(&self, dest: &GateId, slot: Slot) -> Option<&Wire> {
        self.wires.iter().find(|w| w.dest == *dest && w.slot == slot)
    }

    /// Iterates over the wires driven by `source`
    pub fn wires_from<'a>(&'a self, source: &GateId) -> impl Iterator<Item = &'a Wire> + use<'a> {
        let source = source.clone();
        self.wires.iter().filter(move |w| w.source == source)
    }

    /// Returns the gate driving `slot` of `dest`
    pub fn driver(&self, dest: &GateId, slot: Slot) -> Option<&GateId> {
        self.node(dest).and_then(|n| n.driver(slot))
    }
}

impl std::fmt::Display for Netlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for node in &self.objects {
            writeln!(f, "{node}")?;
        }
        for wire in &self.wires {
            writeln!(f, "{wire}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> GateId {
        GateId::from(s)
    }

    fn and_of_two_switches() -> Netlist {
        let mut netlist = Netlist::new();
        netlist.add_node(GateKind::Switch, Some(id("a"))).unwrap();
        netlist.add_node(GateKind::Switch, Some(id("b"))).unwrap();
        netlist.add_node(GateKind::And, Some(id("and"))).unwrap();
        netlist.add_node(GateKind::Probe, Some(id("p"))).unwrap();
        netlist.connect(&id("a"), &id("and"), Slot::A).unwrap();
        netlist.connect(&id("b"), &id("and"), Slot::B).unwrap();
        netlist.connect(&id("and"), &id("p"), Slot::A).unwrap();
        netlist
    }

    #[test]
    fn duplicate_id() {
        let mut netlist = Netlist::new();
        netlist.add_node(GateKind::And, Some(id("g"))).unwrap();
        assert!(matches!(
            netlist.add_node(GateKind::Or, Some(id("g"))),
            Err(GateError::DuplicateId(_))
        ));
        assert_eq!(netlist.len(), 1);
    }

    #[test]
    fn generated_ids() {
        let mut netlist = Netlist::new();
        let a = netlist.add_node(GateKind::Not, None).unwrap();
        let b = netlist.add_node(GateKind::Not, None).unwrap();
        assert_ne!(a, b);
        assert!(netlist.contains(&a) && netlist.contains(&b));
    }

    #[test]
    fn invalid_connections() {
        let mut netlist = and_of_two_switches();
        netlist.add_node(GateKind::Not, Some(id("n"))).unwrap();
        // Probes have no output pin
        assert!(matches!(
            netlist.connect(&id("p"), &id("n"), Slot::A),
            Err(GateError::InvalidConnection(_))
        ));
        // NOT has no slot B
        assert!(matches!(
            netlist.connect(&id("a"), &id("n"), Slot::B),
            Err(GateError::InvalidConnection(_))
        ));
        // Switches have no inputs
        assert!(matches!(
            netlist.connect(&id("n"), &id("a"), Slot::A),
            Err(GateError::InvalidConnection(_))
        ));
        assert!(matches!(
            netlist.connect(&id("n"), &id("n"), Slot::A),
            Err(GateError::InvalidConnection(_))
        ));
        assert!(matches!(
            netlist.connect(&id("zz"), &id("n"), Slot::A),
            Err(GateError::UnknownNode(_))
        ));
        assert!(netlist.verify().is_ok());
    }

    #[test]
    fn occupied_slot_is_replaced() {
        let mut netlist = and_of_two_switches();
        let displaced = netlist.connect(&id("b"), &id("and"), Slot::A).unwrap();
        assert_eq!(displaced, Some(Wire::new(id("a"), id("and"), Slot::A)));
        assert_eq!(netlist.driver(&id("and"), Slot::A), Some(&id("b")));
        assert_eq!(netlist.wires().len(), 3);
        assert!(netlist.verify().is_ok());
    }

    #[test]
    fn evaluation() {
        let mut netlist = and_of_two_switches();
        assert!(!netlist.evaluate(&id("p")).unwrap());
        netlist.set_switch(&id("a"), true).unwrap();
        assert!(!netlist.evaluate(&id("p")).unwrap());
        netlist.set_switch(&id("b"), true).unwrap();
        assert!(netlist.evaluate(&id("p")).unwrap());
        // Repeated calls agree
        assert!(netlist.evaluate(&id("p")).unwrap());
        assert!(matches!(
            netlist.set_switch(&id("and"), true),
            Err(GateError::WrongKind(..))
        ));
    }

    #[test]
    fn remove_wire_restores_default() {
        let mut netlist = Netlist::new();
        netlist.add_node(GateKind::Switch, Some(id("s"))).unwrap();
        netlist.add_node(GateKind::Not, Some(id("n"))).unwrap();
        netlist.connect(&id("s"), &id("n"), Slot::A).unwrap();
        netlist.set_switch(&id("s"), true).unwrap();
        assert!(!netlist.evaluate(&id("n")).unwrap());
        assert!(netlist.remove_wire(&id("n"), Slot::A).is_some());
        assert!(netlist.evaluate(&id("n")).unwrap());
        assert!(netlist.remove_wire(&id("n"), Slot::A).is_none());
        assert!(netlist.verify().is_ok());
    }

    #[test]
    fn remove_node_cascades() {
        let mut netlist = and_of_two_switches();
        netlist.add_node(GateKind::Not, Some(id("n"))).unwrap();
        netlist.connect(&id("a"), &id("n"), Slot::A).unwrap();

        netlist.remove_node(&id("and")).unwrap();
        assert_eq!(netlist.len(), 4);
        assert_eq!(netlist.wires(), &[Wire::new(id("a"), id("n"), Slot::A)]);
        assert_eq!(netlist.driver(&id("p"), Slot::A), None);
        assert!(netlist.verify().is_ok());
        // Index is rebuilt past the removed slot
        assert_eq!(netlist.node(&id("n")).unwrap().kind(), &GateKind::Not);
    }

    #[test]
    fn cycles_are_reported() {
        let mut netlist = Netlist::new();
        netlist.add_node(GateKind::Not, Some(id("x"))).unwrap();
        netlist.add_node(GateKind::Not, Some(id("y"))).unwrap();
        netlist.connect(&id("x"), &id("y"), Slot::A).unwrap();
        netlist.connect(&id("y"), &id("x"), Slot::A).unwrap();
        assert!(matches!(
            netlist.evaluate(&id("x")),
            Err(GateError::CycleDetected(_))
        ));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut netlist = Netlist::new();
        netlist.add_node(GateKind::Switch, Some(id("s"))).unwrap();
        netlist.add_node(GateKind::And, Some(id("g"))).unwrap();
        netlist.connect(&id("s"), &id("g"), Slot::A).unwrap();
        netlist.connect(&id("s"), &id("g"), Slot::B).unwrap();
        netlist.toggle_switch(&id("s")).unwrap();
        assert!(netlist.evaluate(&id("g")).unwrap());
    }

    #[test]
    fn clocks_tick() {
        let mut netlist = Netlist::new();
        netlist.add_node(GateKind::Clock, Some(id("c"))).unwrap();
        netlist.add_node(GateKind::Switch, Some(id("s"))).unwrap();
        assert_eq!(netlist.tick_clocks(), 1);
        assert!(netlist.evaluate(&id("c")).unwrap());
        assert!(!netlist.evaluate(&id("s")).unwrap());
        netlist.tick_clocks();
        assert!(!netlist.evaluate(&id("c")).unwrap());
    }

    #[test]
    fn custom_kinds_are_not_placeable() {
        let mut netlist = Netlist::new();
        assert!(matches!(
            netlist.add_node(GateKind::Custom("adder".into()), None),
            Err(GateError::UnexpandedTemplate(_))
        ));
    }
}
