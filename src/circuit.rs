/*!

  The vocabulary of a circuit: gate kinds, pins, ids and positions.

*/

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The stable identifier of a gate node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GateId(String);

impl GateId {
    /// Creates an id from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for GateId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A connection point on a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    /// The first (or only) input
    A,
    /// The second input of a binary gate
    B,
    /// The single output
    #[serde(rename = "OUT")]
    Out,
}

impl Slot {
    /// Returns `true` for the input slots A and B
    pub fn is_input(&self) -> bool {
        !matches!(self, Slot::Out)
    }

    /// Position of an input slot in a gate's operand list
    pub(crate) fn operand_index(&self) -> Option<usize> {
        match self {
            Slot::A => Some(0),
            Slot::B => Some(1),
            Slot::Out => None,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::A => write!(f, "A"),
            Slot::B => write!(f, "B"),
            Slot::Out => write!(f, "OUT"),
        }
    }
}

impl FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Slot::A),
            "B" => Ok(Slot::B),
            "OUT" => Ok(Slot::Out),
            _ => Err(format!("unknown pin type {s:?}")),
        }
    }
}

/// The kinds of gates a netlist can hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// A user-driven input
    Switch,
    /// An input toggled by the periodic tick
    Clock,
    /// A sink that shows the value on its input
    Probe,
    /// Two-input AND
    And,
    /// Two-input OR
    Or,
    /// Inverter
    Not,
    /// AND followed by NOT
    Nand,
    /// OR followed by NOT
    Nor,
    /// Exclusive OR built from NOT, AND and OR
    Xor,
    /// XOR followed by NOT
    Xnor,
    /// A reference to a stored template, expanded on placement
    Custom(String),
}

const NO_INPUTS: &[Slot] = &[];
const UNARY: &[Slot] = &[Slot::A];
const BINARY: &[Slot] = &[Slot::A, Slot::B];

/// Prefix that marks a template reference in a gate type string
pub const CUSTOM_PREFIX: &str = "CUSTOM:";

impl GateKind {
    /// Every primitive (non-template) kind in palette order
    pub const PRIMITIVES: [GateKind; 10] = [
        GateKind::Switch,
        GateKind::Clock,
        GateKind::Probe,
        GateKind::And,
        GateKind::Or,
        GateKind::Not,
        GateKind::Nand,
        GateKind::Nor,
        GateKind::Xor,
        GateKind::Xnor,
    ];

    /// Returns the input slots of the kind, in order
    pub fn input_slots(&self) -> &'static [Slot] {
        match self {
            GateKind::Switch | GateKind::Clock | GateKind::Custom(_) => NO_INPUTS,
            GateKind::Probe | GateKind::Not => UNARY,
            GateKind::And
            | GateKind::Or
            | GateKind::Nand
            | GateKind::Nor
            | GateKind::Xor
            | GateKind::Xnor => BINARY,
        }
    }

    /// Returns `true` if the kind drives an output pin.
    /// Probes are sinks and template references are not placeable.
    pub fn has_output(&self) -> bool {
        !matches!(self, GateKind::Probe | GateKind::Custom(_))
    }

    /// Returns `true` if `slot` is a valid wire destination on this kind
    pub fn accepts(&self, slot: Slot) -> bool {
        self.input_slots().contains(&slot)
    }

    /// Returns `true` for kinds that carry a boolean state
    pub fn is_stateful(&self) -> bool {
        matches!(self, GateKind::Switch | GateKind::Clock)
    }

    /// Returns `true` for the truth-table input kinds
    pub fn is_source(&self) -> bool {
        self.is_stateful()
    }

    /// The short label shown on a gate of this kind
    pub fn base_label(&self) -> &str {
        match self {
            GateKind::Switch => "SWITCH",
            GateKind::Clock => "CLOCK",
            GateKind::Probe => "PROBE",
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Not => "NOT",
            GateKind::Nand => "NAND",
            GateKind::Nor => "NOR",
            GateKind::Xor => "XOR",
            GateKind::Xnor => "XNOR",
            GateKind::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateKind::Switch => write!(f, "SWITCH"),
            GateKind::Clock => write!(f, "CLOCK_GATE"),
            GateKind::Probe => write!(f, "PROBE"),
            GateKind::And => write!(f, "AND_GATE"),
            GateKind::Or => write!(f, "OR_GATE"),
            GateKind::Not => write!(f, "NOT_GATE"),
            GateKind::Nand => write!(f, "NAND_GATE"),
            GateKind::Nor => write!(f, "NOR_GATE"),
            GateKind::Xor => write!(f, "XOR_GATE"),
            GateKind::Xnor => write!(f, "XNOR_GATE"),
            GateKind::Custom(name) => write!(f, "{CUSTOM_PREFIX}{name}"),
        }
    }
}

impl FromStr for GateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix(CUSTOM_PREFIX) {
            return Ok(GateKind::Custom(name.to_string()));
        }
        match s {
            "SWITCH" => Ok(GateKind::Switch),
            "CLOCK_GATE" => Ok(GateKind::Clock),
            "PROBE" => Ok(GateKind::Probe),
            "AND_GATE" => Ok(GateKind::And),
            "OR_GATE" => Ok(GateKind::Or),
            "NOT_GATE" => Ok(GateKind::Not),
            "NAND_GATE" => Ok(GateKind::Nand),
            "NOR_GATE" => Ok(GateKind::Nor),
            "XOR_GATE" => Ok(GateKind::Xor),
            "XNOR_GATE" => Ok(GateKind::Xnor),
            _ => Err(format!("unknown gate type {s:?}")),
        }
    }
}

impl Serialize for GateKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GateKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Where a gate sits on the canvas. Only used for layout and persistence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Creates a position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Position {
    type Output = Position;

    fn add(self, rhs: Self) -> Self::Output {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Self) -> Self::Output {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A directed connection from the output of `source` to input `slot` of `dest`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Wire {
    /// The driving gate
    pub source: GateId,
    /// The driven gate
    pub dest: GateId,
    /// The input slot on `dest`
    pub slot: Slot,
}

impl Wire {
    /// Creates a wire
    pub fn new(source: GateId, dest: GateId, slot: Slot) -> Self {
        Self { source, dest, slot }
    }
}

impl std::fmt::Display for Wire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}.{}", self.source, self.dest, self.slot)
    }
}
