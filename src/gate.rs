/*!

  Boolean semantics of every gate kind.

  Primitive kinds apply a single operator. Composite kinds (NAND, NOR, XOR, XNOR)
  are fixed compositions of primitive cells wired at construction time; the cells
  are private to the kind and never appear as nodes of a netlist.

*/

use crate::circuit::GateKind;

/// A primitive boolean operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Conjunction
    And,
    /// Disjunction
    Or,
    /// Negation of the first operand
    Not,
}

impl Primitive {
    /// Applies the operator. `Not` ignores `b`.
    pub fn apply(&self, a: bool, b: bool) -> bool {
        match self {
            Primitive::And => a && b,
            Primitive::Or => a || b,
            Primitive::Not => !a,
        }
    }
}

/// Where a cell of a composition reads its operand from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    /// The composite gate's input A
    PortA,
    /// The composite gate's input B
    PortB,
    /// The output of an earlier cell
    Cell(usize),
}

/// A primitive instance inside a composition
#[derive(Debug, Clone, Copy)]
struct Cell {
    op: Primitive,
    a: Operand,
    b: Operand,
}

impl Cell {
    const fn and(a: Operand, b: Operand) -> Self {
        Self {
            op: Primitive::And,
            a,
            b,
        }
    }

    const fn or(a: Operand, b: Operand) -> Self {
        Self {
            op: Primitive::Or,
            a,
            b,
        }
    }

    const fn not(a: Operand) -> Self {
        Self {
            op: Primitive::Not,
            a,
            b: a,
        }
    }
}

use Operand::{Cell as C, PortA, PortB};

const AND: &[Cell] = &[Cell::and(PortA, PortB)];
const OR: &[Cell] = &[Cell::or(PortA, PortB)];
const NOT: &[Cell] = &[Cell::not(PortA)];
const NAND: &[Cell] = &[Cell::and(PortA, PortB), Cell::not(C(0))];
const NOR: &[Cell] = &[Cell::or(PortA, PortB), Cell::not(C(0))];
// (A & !B) | (!A & B)
const XOR: &[Cell] = &[
    Cell::not(PortA),
    Cell::not(PortB),
    Cell::and(PortA, C(1)),
    Cell::and(C(0), PortB),
    Cell::or(C(2), C(3)),
];
const XNOR: &[Cell] = &[
    Cell::not(PortA),
    Cell::not(PortB),
    Cell::and(PortA, C(1)),
    Cell::and(C(0), PortB),
    Cell::or(C(2), C(3)),
    Cell::not(C(4)),
];

/// The fixed internal wiring of a logic kind. The last cell drives the output.
#[derive(Debug, Clone, Copy)]
pub struct Composition {
    cells: &'static [Cell],
}

impl Composition {
    /// Returns the composition implementing `kind`, if it is a logic kind
    pub fn of(kind: &GateKind) -> Option<Self> {
        let cells = match kind {
            GateKind::And => AND,
            GateKind::Or => OR,
            GateKind::Not => NOT,
            GateKind::Nand => NAND,
            GateKind::Nor => NOR,
            GateKind::Xor => XOR,
            GateKind::Xnor => XNOR,
            GateKind::Switch | GateKind::Clock | GateKind::Probe | GateKind::Custom(_) => {
                return None;
            }
        };
        Some(Self { cells })
    }

    /// Number of primitive cells in the composition
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns an iterator over the primitive operators, in evaluation order
    pub fn primitives(&self) -> impl Iterator<Item = Primitive> + '_ {
        self.cells.iter().map(|c| c.op)
    }

    /// Evaluates the composition with the gate inputs `a` and `b`
    pub fn eval(&self, a: bool, b: bool) -> bool {
        let mut values: Vec<bool> = Vec::with_capacity(self.cells.len());
        for cell in self.cells {
            let read = |operand: Operand| match operand {
                PortA => a,
                PortB => b,
                C(i) => values[i],
            };
            let v = cell.op.apply(read(cell.a), read(cell.b));
            values.push(v);
        }
        values.last().copied().unwrap_or(false)
    }
}

/// Computes the output of a gate of `kind`.
///
/// `a` and `b` are the driven values of the input slots, [None] when the slot
/// is unconnected. Unconnected inputs read as `false`, so an unconnected NOT
/// outputs `true`. `state` is only read by switches and clocks.
pub fn evaluate(kind: &GateKind, a: Option<bool>, b: Option<bool>, state: bool) -> bool {
    let a = a.unwrap_or(false);
    let b = b.unwrap_or(false);
    match kind {
        GateKind::Switch | GateKind::Clock => state,
        GateKind::Probe => a,
        GateKind::Custom(_) => false,
        logic => Composition::of(logic)
            .map(|c| c.eval(a, b))
            .unwrap_or(false),
    }
}
