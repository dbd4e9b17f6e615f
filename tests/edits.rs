use gate_bench::circuit::{GateId, GateKind, Position, Slot, Wire};
use gate_bench::error::GateError;
use gate_bench::netlist::Netlist;

fn id(s: &str) -> GateId {
    GateId::from(s)
}

fn get_simple_example() -> Netlist {
    let mut netlist = Netlist::new();
    netlist.add_node(GateKind::Switch, Some(id("a"))).unwrap();
    netlist.add_node(GateKind::Switch, Some(id("b"))).unwrap();
    netlist.add_node(GateKind::Nor, Some(id("g"))).unwrap();
    netlist.add_node(GateKind::Probe, Some(id("y"))).unwrap();
    netlist.connect(&id("a"), &id("g"), Slot::A).unwrap();
    netlist.connect(&id("b"), &id("g"), Slot::B).unwrap();
    netlist.connect(&id("g"), &id("y"), Slot::A).unwrap();
    netlist
}

#[test]
fn test_delete_driver() {
    let mut netlist = get_simple_example();
    netlist.set_switch(&id("b"), true).unwrap();
    assert!(!netlist.evaluate(&id("y")).unwrap());

    let removed = netlist.remove_node(&id("b")).unwrap();
    assert_eq!(removed.kind(), &GateKind::Switch);
    assert!(netlist.verify().is_ok());
    assert_eq!(netlist.driver(&id("g"), Slot::B), None);
    assert!(netlist.wire_into(&id("g"), Slot::B).is_none());
    // Slot B now reads false
    assert!(netlist.evaluate(&id("y")).unwrap());
}

#[test]
fn test_delete_middle() {
    let mut netlist = get_simple_example();
    netlist.remove_node(&id("g")).unwrap();
    assert_eq!(netlist.len(), 3);
    assert!(netlist.wires().is_empty());
    assert!(netlist.verify().is_ok());
    assert!(matches!(
        netlist.remove_node(&id("g")),
        Err(GateError::UnknownNode(_))
    ));
}

#[test]
fn test_rewire() {
    let mut netlist = get_simple_example();
    let displaced = netlist.connect(&id("a"), &id("g"), Slot::B).unwrap();
    assert_eq!(displaced, Some(Wire::new(id("b"), id("g"), Slot::B)));
    let from_a: Vec<_> = netlist.wires_from(&id("a")).collect();
    assert_eq!(from_a.len(), 2);
    assert_eq!(netlist.wires_from(&id("b")).count(), 0);
    assert!(netlist.verify().is_ok());

    netlist.set_switch(&id("b"), true).unwrap();
    assert!(netlist.evaluate(&id("y")).unwrap());
    netlist.set_switch(&id("a"), true).unwrap();
    assert!(!netlist.evaluate(&id("y")).unwrap());
}

#[test]
fn test_labels_and_moves() {
    let mut netlist = get_simple_example();
    netlist.set_label(&id("g"), Some("nor".into())).unwrap();
    netlist.move_node(&id("g"), Position::new(40.0, -5.0)).unwrap();
    let g = netlist.node(&id("g")).unwrap();
    assert_eq!(g.label(), Some("nor"));
    assert_eq!(g.position(), Position::new(40.0, -5.0));
    assert_eq!(g.to_string(), "NOR_GATE g @ (40, -5) \"nor\"");

    netlist.set_label(&id("g"), Some(String::new())).unwrap();
    assert_eq!(netlist.node(&id("g")).unwrap().label(), None);
    assert!(netlist.set_label(&id("zz"), None).is_err());
}

#[test]
fn test_clear() {
    let mut netlist = get_simple_example();
    netlist.clear();
    assert!(netlist.is_empty());
    assert!(netlist.wires().is_empty());
    // Ids are free again
    netlist.add_node(GateKind::Not, Some(id("g"))).unwrap();
    assert!(netlist.verify().is_ok());
}
