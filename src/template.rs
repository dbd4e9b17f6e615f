/*!

  Reusable sub-circuits and the directory they are stored in.

*/

use crate::{
    circuit::{GateId, Slot},
    error::{GateError, Result},
    persist::{GateRecord, WireRecord},
    util::sanitize_token,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
};

/// Which side of a template boundary a port sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// A port that feeds the template
    #[serde(rename = "IN")]
    In,
    /// A port the template drives
    #[serde(rename = "OUT")]
    Out,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::In => write!(f, "IN"),
            Direction::Out => write!(f, "OUT"),
        }
    }
}

/// Links an exposed template port to a pin inside the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinMapping {
    /// Port name, `In-n` or `Out-n`
    pub exposed_name: String,
    /// Port direction
    pub direction: Direction,
    /// The internal gate the port lands on
    #[serde(rename = "internalGateId")]
    pub internal_node: GateId,
    /// The internal pin: `A` or `B` for inputs, `OUT` for outputs
    #[serde(rename = "internalPinType")]
    pub internal_slot: Slot,
}

impl PinMapping {
    /// Creates a pin mapping
    pub fn new(
        exposed_name: impl Into<String>,
        direction: Direction,
        internal_node: GateId,
        internal_slot: Slot,
    ) -> Self {
        Self {
            exposed_name: exposed_name.into(),
            direction,
            internal_node,
            internal_slot,
        }
    }
}

/// A named, reusable sub-circuit with its boundary ports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique, filesystem-safe name
    #[serde(rename = "gateName")]
    pub name: String,
    /// The gates of the sub-circuit, with ids local to the template
    pub internal_gates: Vec<GateRecord>,
    /// The wires between internal gates
    #[serde(default)]
    pub internal_wires: Vec<WireRecord>,
    /// Boundary ports
    #[serde(default)]
    pub mappings: Vec<PinMapping>,
}

impl Template {
    /// Returns the mappings of one direction
    pub fn ports(&self, direction: Direction) -> impl Iterator<Item = &PinMapping> {
        self.mappings.iter().filter(move |m| m.direction == direction)
    }

    /// Number of distinct input ports. Several mappings may share one port.
    pub fn input_count(&self) -> usize {
        self.ports(Direction::In)
            .map(|m| m.exposed_name.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of output ports
    pub fn output_count(&self) -> usize {
        self.ports(Direction::Out).count()
    }

    /// Checks that every mapping lands on an internal gate,
    /// and that output names are unique.
    pub fn verify(&self) -> std::result::Result<(), String> {
        let ids: HashSet<&GateId> = self.internal_gates.iter().map(|g| &g.id).collect();
        if ids.len() != self.internal_gates.len() {
            return Err(format!("Template {} has non-unique gate ids", self.name));
        }
        for m in &self.mappings {
            if !ids.contains(&m.internal_node) {
                return Err(format!(
                    "Port {} of {} points at missing gate {}",
                    m.exposed_name, self.name, m.internal_node
                ));
            }
        }
        let mut outs = HashSet::new();
        for m in self.ports(Direction::Out) {
            if !outs.insert(m.exposed_name.as_str()) {
                return Err(format!("Port {} is exposed twice", m.exposed_name));
            }
        }
        Ok(())
    }
}

/// Checks a user-supplied template name and reduces it to a safe token
pub fn template_name(name: &str) -> Result<String> {
    let token = sanitize_token(name.trim());
    if token.is_empty() {
        return Err(GateError::InvalidTemplateName(name.to_string()));
    }
    Ok(token)
}

/// A directory of template files, one JSON file per template, and its in-memory index.
#[derive(Debug)]
pub struct TemplateStore {
    dir: PathBuf,
    templates: BTreeMap<String, Template>,
    /// The file each template was read from
    sources: BTreeMap<String, PathBuf>,
}

impl TemplateStore {
    /// Opens the store at `dir` and loads every template in it.
    /// A missing directory is an empty store.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            dir: dir.into(),
            templates: BTreeMap::new(),
            sources: BTreeMap::new(),
        };
        store.reload();
        store
    }

    /// Returns the directory backing the store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Rebuilds the index from the directory.
    /// Files that cannot be read or parsed are skipped with a warning.
    pub fn reload(&mut self) {
        self.templates.clear();
        self.sources.clear();
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
            Err(e) => {
                warn!("cannot list templates in {}: {e}", self.dir.display());
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"));
            if !is_json {
                continue;
            }
            match Self::read_template(&path) {
                Ok(t) => {
                    self.sources.insert(t.name.clone(), path);
                    self.templates.insert(t.name.clone(), t);
                }
                Err(e) => warn!("error loading template {}: {e}", path.display()),
            }
        }
        info!(
            "loaded {} template(s) from {}",
            self.templates.len(),
            self.dir.display()
        );
    }

    fn read_template(path: &Path) -> Result<Template> {
        let file = std::fs::File::open(path)?;
        let template: Template = serde_json::from_reader(std::io::BufReader::new(file))?;
        template.verify().map_err(GateError::MalformedPersistedData)?;
        Ok(template)
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_token(name)))
    }

    /// Writes `template` to the store, replacing any template of the same name,
    /// then reloads the index.
    pub fn save(&mut self, template: &Template) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(template)?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&template.name);
        std::fs::write(&path, json)?;
        // Drop the older copy when it came from a differently named file
        if let Some(old) = self.sources.get(&template.name) {
            if *old != path {
                std::fs::remove_file(old)?;
            }
        }
        info!("saved template {} to {}", template.name, path.display());
        self.reload();
        Ok(path)
    }

    /// Deletes the template file for `name` and reloads the index
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let path = self
            .sources
            .get(name)
            .ok_or_else(|| GateError::UnknownTemplate(name.to_string()))?;
        std::fs::remove_file(path)?;
        self.reload();
        Ok(())
    }

    /// Returns the template stored under `name`
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Iterates over the template names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Iterates over the templates in name order
    pub fn templates(&self) -> impl Iterator<Item = &Template> {
        self.templates.values()
    }

    /// Number of loaded templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns `true` if no template is loaded
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
