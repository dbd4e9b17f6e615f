#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, unreachable_pub)]
/*!

`gate-bench`

A netlist model for a logic-gate circuit simulator: gates and wires with pull
evaluation, a JSON codec for circuits, reusable templates bundled from a
selection and expanded back with fresh ids, and exhaustive truth tables.

## Simple Example
```
use gate_bench::circuit::{GateKind, Slot};
use gate_bench::netlist::Netlist;

let mut netlist = Netlist::new();
let a = netlist.add_node(GateKind::Switch, None).unwrap();
let b = netlist.add_node(GateKind::Switch, None).unwrap();
let g = netlist.add_node(GateKind::Xor, None).unwrap();
netlist.connect(&a, &g, Slot::A).unwrap();
netlist.connect(&b, &g, Slot::B).unwrap();

netlist.set_switch(&a, true).unwrap();
assert!(netlist.evaluate(&g).unwrap());
```

*/

pub mod bundle;
pub mod circuit;
pub mod error;
pub mod gate;
pub mod graph;
pub mod instantiate;
pub mod netlist;
pub mod persist;
pub mod template;
pub mod truth_table;
pub mod util;
pub mod workspace;
