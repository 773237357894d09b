//! In-memory campaign progress.

use std::collections::BTreeSet;

use tracing::info;

use powerline_circuit::{CircuitConfig, CircuitGraph, GateCatalog, GateKind};

use crate::{Level, LevelError, LevelPack, Puzzle, Submission};

/// Progress through a level pack.
#[derive(Debug, Clone)]
pub struct Campaign {
    pack: LevelPack,
    config: CircuitConfig,
    current: usize,
    solved: BTreeSet<usize>,
    unlocked: Vec<GateKind>,
}

impl Campaign {
    /// Starts a campaign at the first level.
    pub fn new(pack: LevelPack, config: CircuitConfig) -> Self {
        Self {
            pack,
            config,
            current: 0,
            solved: BTreeSet::new(),
            unlocked: Vec::new(),
        }
    }

    /// Returns the level pack.
    pub fn pack(&self) -> &LevelPack {
        &self.pack
    }

    /// Returns the index of the level to play next.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Returns the level to play next, `None` once every level is done.
    pub fn current_level(&self) -> Option<&Level> {
        self.pack.level(self.current)
    }

    /// Returns `true` if the level was solved.
    pub fn is_solved(&self, index: usize) -> bool {
        self.solved.contains(&index)
    }

    /// Returns the unlocked kinds in unlock order.
    pub fn unlocked(&self) -> &[GateKind] {
        &self.unlocked
    }

    /// Returns `true` once the last level was passed.
    pub fn is_complete(&self) -> bool {
        self.current >= self.pack.len()
    }

    /// Opens a puzzle for the current level.
    pub fn start(&self) -> Result<Puzzle, LevelError> {
        self.start_level(self.current)
    }

    /// Opens a puzzle for any level of the pack.
    pub fn start_level(&self, index: usize) -> Result<Puzzle, LevelError> {
        let level = self
            .pack
            .level(index)
            .ok_or_else(|| LevelError::unknown_level(index))?;

        Puzzle::new(level.clone(), self.config.clone())
    }

    /// Records a submission.
    ///
    /// A solved level unlocks its kinds and moves the campaign past it.
    /// Returns the kinds that were not unlocked before.
    pub fn record(&mut self, submission: &Submission) -> Result<Vec<GateKind>, LevelError> {
        let level = self
            .pack
            .level(submission.level)
            .ok_or_else(|| LevelError::unknown_level(submission.level))?;

        if !submission.is_solved() {
            return Ok(Vec::new());
        }

        let mut unlocked = Vec::new();
        for kind in level.unlocks() {
            if !self.unlocked.contains(kind) {
                self.unlocked.push(kind.clone());
                unlocked.push(kind.clone());
            }
        }

        self.solved.insert(submission.level);
        self.current = self.current.max(submission.level + 1);

        info!(
            level = level.name(),
            unlocked = unlocked.len(),
            complete = self.is_complete(),
            "level solved"
        );

        Ok(unlocked)
    }

    /// Returns an empty circuit whose catalog holds the unlocked kinds.
    pub fn sandbox(&self) -> Result<CircuitGraph, LevelError> {
        let mut catalog = GateCatalog::empty();
        for kind in &self.unlocked {
            catalog.register(kind.clone())?;
        }

        Ok(CircuitGraph::new(self.config.clone()).with_catalog(catalog))
    }
}
