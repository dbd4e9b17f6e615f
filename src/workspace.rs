/*!

  An editing session: one netlist, the template store, and the current selection.

*/

use crate::{
    bundle::bundle,
    circuit::{GateId, GateKind, Position},
    error::{GateError, Result},
    instantiate::{Placement, instantiate},
    netlist::Netlist,
    persist::{load_circuit, save_circuit},
    template::{Template, TemplateStore},
    truth_table::{TruthTable, generate},
};
use log::info;
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Environment variable overriding the template directory
pub const TEMPLATE_DIR_VAR: &str = "GATE_BENCH_TEMPLATE_DIR";

/// Where templates are kept when nothing else is configured
pub const DEFAULT_TEMPLATE_DIR: &str = "custom_gates";

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Directory holding one JSON file per template
    pub template_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from(DEFAULT_TEMPLATE_DIR),
        }
    }
}

impl WorkspaceConfig {
    /// Reads the configuration from the environment, falling back to the defaults
    pub fn from_env() -> Self {
        Self::from_var(std::env::var_os(TEMPLATE_DIR_VAR))
    }

    fn from_var(template_dir: Option<OsString>) -> Self {
        match template_dir {
            Some(dir) if !dir.is_empty() => Self {
                template_dir: PathBuf::from(dir),
            },
            _ => Self::default(),
        }
    }

    /// Replaces the template directory
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = dir.into();
        self
    }
}

/// The state of one editing session
#[derive(Debug)]
pub struct Workspace {
    netlist: Netlist,
    templates: TemplateStore,
    selection: Vec<GateId>,
}

impl Workspace {
    /// Starts an empty session, loading the templates named by `config`
    pub fn new(config: &WorkspaceConfig) -> Self {
        Self {
            netlist: Netlist::new(),
            templates: TemplateStore::open(config.template_dir.clone()),
            selection: Vec::new(),
        }
    }

    /// Returns the netlist being edited
    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    /// Returns the netlist for direct edits such as wiring
    pub fn netlist_mut(&mut self) -> &mut Netlist {
        &mut self.netlist
    }

    /// Returns the loaded templates
    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Returns the selected gates, in selection order
    pub fn selection(&self) -> &[GateId] {
        &self.selection
    }

    /// Places a gate of `kind` at `at` and returns the ids created.
    /// A custom kind expands its template, leaving the new gates selected.
    pub fn place_gate(&mut self, kind: GateKind, at: Position) -> Result<Vec<GateId>> {
        match kind {
            GateKind::Custom(name) => Ok(self.place_template(&name, at)?.nodes),
            kind => Ok(vec![self.netlist.add_node_at(kind, None, at)?]),
        }
    }

    /// Expands the template `name` at `anchor` and selects what was created
    pub fn place_template(&mut self, name: &str, anchor: Position) -> Result<Placement> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| GateError::UnknownTemplate(name.to_string()))?;
        let placement = instantiate(&mut self.netlist, template, anchor)?;
        self.selection = placement.nodes.clone();
        Ok(placement)
    }

    /// Adds a gate to the selection
    pub fn select(&mut self, id: &GateId) -> Result<()> {
        if !self.netlist.contains(id) {
            return Err(GateError::UnknownNode(id.clone()));
        }
        if !self.selection.contains(id) {
            self.selection.push(id.clone());
        }
        Ok(())
    }

    /// Drops a gate from the selection. Returns `true` if it was selected.
    pub fn deselect(&mut self, id: &GateId) -> bool {
        let before = self.selection.len();
        self.selection.retain(|s| s != id);
        self.selection.len() != before
    }

    /// Flips the selection of a gate and returns whether it is now selected
    pub fn toggle_selection(&mut self, id: &GateId) -> Result<bool> {
        if self.deselect(id) {
            return Ok(false);
        }
        self.select(id)?;
        Ok(true)
    }

    /// Empties the selection
    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    /// Deletes every selected gate along with its wires.
    /// Returns the number of gates deleted.
    pub fn remove_selected(&mut self) -> Result<usize> {
        let mut removed = 0;
        for id in std::mem::take(&mut self.selection) {
            if self.netlist.contains(&id) {
                self.netlist.remove_node(&id)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Packages the selection as a template, stores it, and reloads the store
    pub fn bundle_selection(&mut self, name: &str) -> Result<Template> {
        let template = bundle(&self.netlist, &self.selection, name)?;
        self.templates.save(&template)?;
        Ok(template)
    }

    /// Advances every clock by one half period
    pub fn tick(&mut self) -> usize {
        self.netlist.tick_clocks()
    }

    /// Enumerates the truth table of the current netlist
    pub fn truth_table(&mut self) -> Result<TruthTable> {
        generate(&mut self.netlist)
    }

    /// Writes the netlist to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_circuit(path, &self.netlist)
    }

    /// Replaces the netlist with the circuit at `path`.
    /// On failure the current netlist is kept.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.netlist = load_circuit(path)?;
        self.selection.clear();
        Ok(())
    }

    /// Empties the netlist and the selection, and rereads the template store
    pub fn clear(&mut self) {
        self.netlist.clear();
        self.selection.clear();
        self.templates.reload();
        info!("workspace cleared");
    }
}
