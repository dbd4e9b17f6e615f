/*!

  Errors reported by netlist edits, persistence, bundling and analysis.

*/

use crate::circuit::{GateId, GateKind, Slot};

/// The error type shared by every fallible operation in the crate.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A node with this id already exists in the netlist
    #[error("duplicate gate id {0}")]
    DuplicateId(GateId),
    /// The requested wire cannot exist between these pins
    #[error("invalid connection: {0}")]
    InvalidConnection(String),
    /// The id does not name a node in the netlist
    #[error("unknown gate id {0}")]
    UnknownNode(GateId),
    /// No template is stored under this name
    #[error("unknown template {0:?}")]
    UnknownTemplate(String),
    /// Bundling was requested without any selected gates
    #[error("select one or more gates to bundle")]
    EmptySelection,
    /// The template name is empty once reduced to `[A-Za-z0-9_-]`
    #[error("invalid template name {0:?}")]
    InvalidTemplateName(String),
    /// A persisted record could not be understood
    #[error("malformed persisted data: {0}")]
    MalformedPersistedData(String),
    /// A wire record points at a node or pin that does not exist
    #[error("wire {driver} -> {dest}.{slot} references a missing pin")]
    DanglingReference {
        /// Id of the driving gate
        driver: GateId,
        /// Id of the driven gate
        dest: GateId,
        /// Destination slot on the driven gate
        slot: Slot,
    },
    /// Evaluation re-entered a gate that is already on the evaluation path
    #[error("combinational cycle through gate {0}")]
    CycleDetected(GateId),
    /// The netlist has more truth-table inputs than can be enumerated
    #[error("{0} inputs is too many to enumerate")]
    TooManyInputs(usize),
    /// The gate carries no state that could be set
    #[error("gate {0} is not a {1}")]
    WrongKind(GateId, GateKind),
    /// A template kind was placed without being expanded first
    #[error("{0} must be expanded from its template before placement")]
    UnexpandedTemplate(GateKind),
    /// Reading or writing a circuit or template file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for GateError {
    fn from(e: serde_json::Error) -> Self {
        GateError::MalformedPersistedData(e.to_string())
    }
}

/// Result alias for fallible gate operations
pub type Result<T> = std::result::Result<T, GateError>;
