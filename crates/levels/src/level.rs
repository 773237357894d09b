//! Level packs.

use serde::{Deserialize, Serialize};
use tracing::debug;

use powerline_circuit::{GateCatalog, GateKind, TruthTable};

use crate::LevelError;

const BUILTIN: &str = include_str!("../levels.toml");

/// A named group of consecutive levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Index of the first level of the chapter.
    pub start: usize,
    /// Chapter title.
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackDef {
    #[serde(default)]
    chapters: Vec<Chapter>,
    levels: Vec<LevelDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LevelDef {
    name: String,
    description: String,
    hint: Option<String>,
    reference: String,
    best: usize,
    #[serde(default)]
    permitted: Vec<String>,
    #[serde(default)]
    unlocks: Vec<String>,
}

/// A level of a pack, with its kinds resolved against a catalog.
#[derive(Debug, Clone)]
pub struct Level {
    index: usize,
    name: String,
    description: String,
    hint: Option<String>,
    reference: GateKind,
    table: TruthTable,
    best: usize,
    permitted: Vec<GateKind>,
    unlocks: Vec<GateKind>,
}

impl Level {
    /// Returns the position of the level in its pack.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the level name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the level description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the hint, if the level has one.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Returns the kind whose behaviour the level asks to rebuild.
    pub fn reference(&self) -> &GateKind {
        &self.reference
    }

    /// Returns the truth table a solution must satisfy.
    pub fn table(&self) -> &TruthTable {
        &self.table
    }

    /// Returns the gate count of the best known solution.
    pub fn best(&self) -> usize {
        self.best
    }

    /// Returns the kinds that may be placed.
    pub fn permitted(&self) -> &[GateKind] {
        &self.permitted
    }

    /// Returns the kinds unlocked by solving the level.
    pub fn unlocks(&self) -> &[GateKind] {
        &self.unlocks
    }

    /// Returns the permitted kind with the given identifier.
    pub fn permitted_kind(&self, id: &str) -> Option<&GateKind> {
        self.permitted
            .iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(id))
    }
}

/// An ordered list of levels grouped into chapters.
#[derive(Debug, Clone)]
pub struct LevelPack {
    levels: Vec<Level>,
    chapters: Vec<Chapter>,
}

impl LevelPack {
    /// Loads the built-in pack.
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_toml(BUILTIN, &GateCatalog::builtin())
    }

    /// Loads a pack from TOML, resolving kinds against `catalog`.
    pub fn from_toml(source: &str, catalog: &GateCatalog) -> Result<Self, LevelError> {
        let PackDef {
            mut chapters,
            levels,
        } = toml::from_str(source)?;

        let levels = levels
            .into_iter()
            .enumerate()
            .map(|(index, def)| resolve(index, def, catalog))
            .collect::<Result<Vec<_>, _>>()?;

        chapters.sort_by_key(|chapter| chapter.start);

        debug!(
            levels = levels.len(),
            chapters = chapters.len(),
            "loaded level pack"
        );

        Ok(Self { levels, chapters })
    }

    /// Returns all levels in order.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Returns a level.
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Returns the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Returns `true` if the pack has no levels.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns the chapters ordered by their first level.
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Returns the chapter a level belongs to: the one with the greatest
    /// start not after `index`.
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters
            .iter()
            .take_while(|chapter| chapter.start <= index)
            .last()
    }
}

fn resolve(index: usize, def: LevelDef, catalog: &GateCatalog) -> Result<Level, LevelError> {
    let reference = catalog.lookup(&def.reference)?;
    if reference.is_driven() {
        return Err(LevelError::config(format!(
            "level {:?} references {:?}, which has no evaluation rule",
            def.name,
            reference.id()
        )));
    }

    let lookup = |ids: &[String]| {
        ids.iter()
            .map(|id| catalog.lookup(id))
            .collect::<Result<Vec<_>, _>>()
    };
    let permitted = lookup(&def.permitted)?;
    let unlocks = lookup(&def.unlocks)?;

    Ok(Level {
        index,
        table: reference.truth_table(),
        name: def.name,
        description: def.description,
        hint: def.hint,
        reference,
        best: def.best,
        permitted,
        unlocks,
    })
}
