use gate_bench::bundle::bundle;
use gate_bench::circuit::{GateId, GateKind, Position, Slot};
use gate_bench::instantiate::instantiate;
use gate_bench::netlist::Netlist;
use gate_bench::template::{Direction, Template, TemplateStore};
use gate_bench::truth_table::generate;
use std::collections::HashMap;

fn id(s: &str) -> GateId {
    GateId::from(s)
}

/// A full adder whose core gates are created before its switches and probes
fn full_adder() -> Netlist {
    let mut netlist = Netlist::new();
    netlist.add_node(GateKind::Xor, Some(id("x1"))).unwrap();
    netlist.add_node(GateKind::Xor, Some(id("s"))).unwrap();
    netlist.add_node(GateKind::And, Some(id("c1"))).unwrap();
    netlist.add_node(GateKind::And, Some(id("c2"))).unwrap();
    netlist.add_node(GateKind::Or, Some(id("cout"))).unwrap();
    for s in ["a", "b", "cin"] {
        netlist.add_node(GateKind::Switch, Some(id(s))).unwrap();
    }
    netlist.add_node(GateKind::Probe, Some(id("sum"))).unwrap();
    netlist.add_node(GateKind::Probe, Some(id("carry"))).unwrap();

    let wires = [
        ("a", "x1", Slot::A),
        ("b", "x1", Slot::B),
        ("x1", "s", Slot::A),
        ("cin", "s", Slot::B),
        ("a", "c1", Slot::A),
        ("b", "c1", Slot::B),
        ("x1", "c2", Slot::A),
        ("cin", "c2", Slot::B),
        ("c1", "cout", Slot::A),
        ("c2", "cout", Slot::B),
        ("s", "sum", Slot::A),
        ("cout", "carry", Slot::A),
    ];
    for (src, dst, slot) in wires {
        netlist.connect(&id(src), &id(dst), slot).unwrap();
    }
    netlist
}

fn core() -> Vec<GateId> {
    ["x1", "s", "c1", "c2", "cout"].into_iter().map(id).collect()
}

#[test]
fn test_adder_ports() {
    let t = bundle(&full_adder(), &core(), "Full Adder").unwrap();
    assert_eq!(t.name, "FullAdder");
    assert_eq!(t.internal_gates.len(), 5);
    assert_eq!(t.internal_wires.len(), 4);
    assert_eq!(t.input_count(), 3);
    assert_eq!(t.output_count(), 2);

    let ins: Vec<_> = t
        .ports(Direction::In)
        .map(|m| (m.exposed_name.as_str(), m.internal_node.as_str(), m.internal_slot))
        .collect();
    assert_eq!(
        ins,
        vec![
            ("In-1", "x1", Slot::A),
            ("In-2", "x1", Slot::B),
            ("In-3", "s", Slot::B),
            ("In-1", "c1", Slot::A),
            ("In-2", "c1", Slot::B),
            ("In-3", "c2", Slot::B),
        ]
    );
    let outs: Vec<_> = t
        .ports(Direction::Out)
        .map(|m| (m.exposed_name.as_str(), m.internal_node.as_str()))
        .collect();
    assert_eq!(outs, vec![("Out-1", "s"), ("Out-2", "cout")]);
    assert!(t.verify().is_ok());
}

/// Expands `template` and wires one switch per input port and one probe per output port
fn harness(template: &Template) -> Netlist {
    let mut netlist = Netlist::new();
    let placed = instantiate(&mut netlist, template, Position::new(100.0, 100.0)).unwrap();
    let renamed: HashMap<&GateId, &GateId> = template
        .internal_gates
        .iter()
        .map(|g| &g.id)
        .zip(&placed.nodes)
        .collect();

    let mut ports: HashMap<String, GateId> = HashMap::new();
    for m in template.ports(Direction::In) {
        let switch = ports
            .entry(m.exposed_name.clone())
            .or_insert_with(|| netlist.add_node(GateKind::Switch, None).unwrap())
            .clone();
        netlist
            .connect(&switch, renamed[&m.internal_node], m.internal_slot)
            .unwrap();
    }
    for m in template.ports(Direction::Out) {
        let probe = netlist.add_node(GateKind::Probe, None).unwrap();
        netlist
            .connect(renamed[&m.internal_node], &probe, Slot::A)
            .unwrap();
    }
    netlist
}

#[test]
fn test_store_and_expand() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = TemplateStore::open(dir.path());
    let template = bundle(&full_adder(), &core(), "adder").unwrap();
    store.save(&template).unwrap();

    // A new session reads it back from disk
    let store = TemplateStore::open(dir.path());
    let loaded = store.get("adder").unwrap();
    assert_eq!(loaded, &template);

    let mut expanded = harness(loaded);
    assert!(expanded.verify().is_ok());
    assert_eq!(expanded.len(), 5 + 3 + 2);

    let table = generate(&mut expanded).unwrap();
    assert_eq!(table.rows().len(), 8);
    for r in 0..8 {
        let (ins, outs) = table.row(r).unwrap();
        let total = ins.iter().filter(|b| **b).count();
        assert_eq!(outs, vec![total % 2 == 1, total >= 2], "row {r}");
    }
    assert_eq!(table.rows(), generate(&mut full_adder()).unwrap().rows());
}
