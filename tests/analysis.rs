use gate_bench::circuit::{GateId, GateKind, Slot};
use gate_bench::error::GateError;
use gate_bench::graph::{CombDepth, FanOutTable};
use gate_bench::netlist::Netlist;

fn id(s: &str) -> GateId {
    GateId::from(s)
}

fn full_adder() -> Netlist {
    let mut netlist = Netlist::new();
    for s in ["a", "b", "cin"] {
        netlist.add_node(GateKind::Switch, Some(id(s))).unwrap();
    }
    netlist.add_node(GateKind::Xor, Some(id("x1"))).unwrap();
    netlist.add_node(GateKind::Xor, Some(id("s"))).unwrap();
    netlist.add_node(GateKind::And, Some(id("c1"))).unwrap();
    netlist.add_node(GateKind::And, Some(id("c2"))).unwrap();
    netlist.add_node(GateKind::Or, Some(id("cout"))).unwrap();
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

#[test]
fn test_logic_levels() {
    let netlist = full_adder();
    let levels = netlist.get_analysis::<CombDepth>().unwrap();
    let expected = [
        ("a", 0),
        ("cin", 0),
        ("x1", 1),
        ("s", 2),
        ("c1", 1),
        ("c2", 2),
        ("cout", 3),
        ("sum", 3),
        ("carry", 4),
    ];
    for (gate, level) in expected {
        assert_eq!(levels.get_comb_depth(&id(gate)), Some(level), "{gate}");
    }
    assert_eq!(levels.get_max_depth(), 4);
}

#[test]
fn test_fan_out() {
    let netlist = full_adder();
    let fo = netlist.get_analysis::<FanOutTable>().unwrap();
    let mut users: Vec<_> = fo.get_wires(&id("x1")).map(|w| w.dest.to_string()).collect();
    users.sort();
    assert_eq!(users, vec!["c2", "s"]);
    assert_eq!(fo.get_wires(&id("cin")).count(), 2);
    assert!(!fo.has_uses(&id("carry")));
}

#[test]
fn test_detect_cycles() {
    let mut netlist = full_adder();
    assert!(netlist.get_analysis::<CombDepth>().is_ok());

    // Feed the carry back into the first xor
    netlist.connect(&id("cout"), &id("x1"), Slot::B).unwrap();
    assert!(matches!(
        netlist.get_analysis::<CombDepth>(),
        Err(GateError::CycleDetected(_))
    ));

    // Breaking the loop restores the analysis
    netlist.remove_wire(&id("x1"), Slot::B).unwrap();
    let levels = netlist.get_analysis::<CombDepth>().unwrap();
    assert_eq!(levels.get_comb_depth(&id("x1")), Some(1));
}

#[cfg(feature = "graph")]
#[test]
fn test_petgraph() {
    use gate_bench::graph::PetGraph;
    let netlist = full_adder();
    let pg = netlist.get_analysis::<PetGraph>().unwrap();
    let graph = pg.get_graph();
    assert_eq!(graph.node_count(), netlist.len());
    assert_eq!(graph.edge_count(), netlist.wires().len());
    let x1 = pg.get_index(&id("x1")).unwrap();
    assert_eq!(
        graph
            .neighbors_directed(x1, petgraph::Direction::Outgoing)
            .count(),
        2
    );
}
