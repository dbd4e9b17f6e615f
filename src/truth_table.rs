/*!

  Exhaustive enumeration of a netlist's input assignments.

  Inputs are the switches and clocks, outputs the probes, each in creation
  order. Row `r` drives input column `j` to bit `k-1-j` of `r`, so the first
  column changes slowest. Clocks are not driven; their column samples whatever
  the clock holds, which makes rows repeat when a clock takes part.

*/

use crate::{
    circuit::{GateId, GateKind},
    error::{GateError, Result},
    netlist::Netlist,
};
use bitvec::vec::BitVec;
use log::info;

/// The widest input set that will be enumerated
pub const MAX_INPUTS: usize = 20;

/// A column of the truth table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// The gate behind the column
    pub id: GateId,
    /// The column header
    pub name: String,
}

/// Input assignments paired with the probe readings they produce
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TruthTable {
    inputs: Vec<Column>,
    outputs: Vec<Column>,
    /// One bit vector per row: inputs first, then outputs
    rows: Vec<BitVec>,
}

impl TruthTable {
    /// Returns the input columns
    pub fn inputs(&self) -> &[Column] {
        &self.inputs
    }

    /// Returns the output columns
    pub fn outputs(&self) -> &[Column] {
        &self.outputs
    }

    /// Returns the rows, each holding the input bits followed by the output bits
    pub fn rows(&self) -> &[BitVec] {
        &self.rows
    }

    /// Returns `true` if there was nothing to enumerate
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns row `r` as input and output bools
    pub fn row(&self, r: usize) -> Option<(Vec<bool>, Vec<bool>)> {
        let row = self.rows.get(r)?;
        let (ins, outs) = row.split_at(self.inputs.len());
        Some((ins.iter().by_vals().collect(), outs.iter().by_vals().collect()))
    }
}

impl std::fmt::Display for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let headers: Vec<String> = self
            .inputs
            .iter()
            .map(|c| format!("{} (In)", c.name))
            .chain(self.outputs.iter().map(|c| format!("{} (Out)", c.name)))
            .collect();
        writeln!(f, "{}", headers.join(" | "))?;
        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .by_vals()
                .zip(&headers)
                .map(|(b, h)| format!("{:^width$}", b as u8, width = h.len()))
                .collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        Ok(())
    }
}

fn columns(netlist: &Netlist, filter: impl Fn(&GateKind) -> bool) -> Vec<Column> {
    let mut seen = std::collections::HashMap::<String, usize>::new();
    netlist
        .matches(|n| filter(n.kind()))
        .map(|n| {
            let name = match n.label() {
                Some(label) => label.to_string(),
                None => {
                    let count = seen.entry(n.kind().base_label().to_string()).or_insert(0);
                    *count += 1;
                    format!("{}-{}", n.kind().base_label(), count)
                }
            };
            Column {
                id: n.id().clone(),
                name,
            }
        })
        .collect()
}

/// Enumerates every assignment of the netlist's switches and records the probes.
///
/// Switch states are restored afterwards; clocks are never touched.
/// Only the fan-in of the probes is evaluated.
/// Returns an empty table when there are no inputs or no outputs.
pub fn generate(netlist: &mut Netlist) -> Result<TruthTable> {
    let inputs = columns(netlist, GateKind::is_source);
    let outputs = columns(netlist, |k| *k == GateKind::Probe);
    if inputs.is_empty() || outputs.is_empty() {
        return Ok(TruthTable::default());
    }
    let k = inputs.len();
    if k > MAX_INPUTS {
        return Err(GateError::TooManyInputs(k));
    }

    let snapshot: Vec<(GateId, bool)> = inputs
        .iter()
        .filter_map(|c| netlist.node(&c.id))
        .filter(|n| *n.kind() == GateKind::Switch)
        .map(|n| (n.id().clone(), n.state()))
        .collect();

    let enumerated = enumerate(netlist, &inputs, &outputs);

    for (id, state) in &snapshot {
        netlist.set_switch(id, *state)?;
    }
    let rows = enumerated?;

    info!(
        "truth table over {} input(s) and {} output(s): {} row(s)",
        k,
        outputs.len(),
        rows.len()
    );
    Ok(TruthTable {
        inputs,
        outputs,
        rows,
    })
}

fn enumerate(netlist: &mut Netlist, inputs: &[Column], outputs: &[Column]) -> Result<Vec<BitVec>> {
    let k = inputs.len();
    let mut rows = Vec::with_capacity(1 << k);
    for r in 0..(1usize << k) {
        let mut row = BitVec::with_capacity(k + outputs.len());
        for (j, col) in inputs.iter().enumerate() {
            let bit = (r >> (k - 1 - j)) & 1 == 1;
            let is_switch = netlist
                .node(&col.id)
                .is_some_and(|n| *n.kind() == GateKind::Switch);
            if is_switch {
                netlist.set_switch(&col.id, bit)?;
                row.push(bit);
            } else {
                row.push(netlist.evaluate(&col.id)?);
            }
        }
        for col in outputs {
            row.push(netlist.evaluate(&col.id)?);
        }
        rows.push(row);
    }
    Ok(rows)
}
