use std::collections::HashMap;

use super::prefix::{Prefix, PrefixSnapshot};
use crate::scorer::Scorer;

/// Live hypotheses of one search, keyed by their collapsed string.
///
/// `active` is the beam, `staged` collects hypotheses created or revived
/// during the current timestep, `overflow` keeps what the last
/// [`advance`](Self::advance) pruned so a later path can revive it with
/// its history intact. The three maps are disjoint between timesteps.
pub struct BeamState<'a> {
    active: HashMap<String, Prefix>,
    staged: HashMap<String, Prefix>,
    overflow: HashMap<String, Prefix>,
    beam_width: usize,
    overflow_capacity: Option<usize>,
    scorers: &'a [Box<dyn Scorer>],
}

impl<'a> BeamState<'a> {
    pub fn new(beam_width: usize, scorers: &'a [Box<dyn Scorer>]) -> Self {
        let root = Prefix::root();
        let mut active = HashMap::new();
        active.insert(root.value.clone(), root);

        Self {
            active,
            staged: HashMap::new(),
            overflow: HashMap::new(),
            beam_width: beam_width.max(1),
            overflow_capacity: None,
            scorers,
        }
    }

    pub fn with_overflow_capacity(mut self, capacity: Option<usize>) -> Self {
        self.overflow_capacity = capacity;
        self
    }

    /// Committed masses of every hypothesis in the beam.
    pub fn snapshot(&self) -> Vec<PrefixSnapshot> {
        self.active.values().map(Prefix::snapshot).collect()
    }

    /// Returns the hypothesis `parent + symbol`, creating or reviving it if needed.
    ///
    /// `None` means a scorer rejected the new string, or `parent` is not a
    /// live hypothesis.
    pub fn get_or_create(&mut self, parent: &str, symbol: &str) -> Option<&mut Prefix> {
        let value = format!("{parent}{symbol}");

        if self.active.contains_key(&value) {
            return self.active.get_mut(&value);
        }
        if self.staged.contains_key(&value) {
            return self.staged.get_mut(&value);
        }
        if let Some(revived) = self.overflow.remove(&value) {
            return Some(self.staged.entry(value).or_insert(revived));
        }

        let Some(parent) = self.lookup(parent) else {
            log::warn!("Cannot extend unknown hypothesis {parent:?}");
            return None;
        };
        let mut child = parent.child(symbol);

        if !self.scorers.iter().all(|s| s.is_valid_prefix(&child.value)) {
            return None;
        }
        child.ext_weight = self.scorers.iter().map(|s| s.score_prefix(&child)).sum();

        Some(self.staged.entry(value).or_insert(child))
    }

    /// Adds blank-path mass to a hypothesis of the beam.
    pub fn add_blank(&mut self, value: &str, p: f32) {
        if let Some(prefix) = self.active.get_mut(value) {
            prefix.add_p_blank(p);
        }
    }

    /// Adds non-blank-path mass to a hypothesis of the beam.
    pub fn add_non_blank(&mut self, value: &str, p: f32) {
        if let Some(prefix) = self.active.get_mut(value) {
            prefix.add_p_non_blank(p);
        }
    }

    /// Commits the timestep: merges staged hypotheses into the beam, steps
    /// all of them and keeps the best `beam_width` by score.
    pub fn advance(&mut self) {
        self.active.extend(self.staged.drain());

        let mut ranked: Vec<(String, Prefix)> = self
            .active
            .drain()
            .map(|(value, mut prefix)| {
                prefix.step();
                (value, prefix)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.score.total_cmp(&a.1.score));

        let mut pruned = if ranked.len() > self.beam_width {
            ranked.split_off(self.beam_width)
        } else {
            Vec::new()
        };
        if let Some(capacity) = self.overflow_capacity {
            pruned.truncate(capacity);
        }

        self.active = ranked.into_iter().collect();
        self.overflow = pruned.into_iter().collect();

        log::trace!(
            "Beam advanced: active={}, overflow={}",
            self.active.len(),
            self.overflow.len()
        );
    }

    /// Adds every scorer's end-of-input score to the beam.
    pub fn finalize(&mut self) {
        for scorer in self.scorers {
            for prefix in self.active.values_mut() {
                let ext_score = scorer.final_prefix_score(prefix);
                prefix.score += ext_score;
            }
        }
    }

    /// The highest scoring hypothesis in the beam.
    pub fn best(&self) -> Option<&Prefix> {
        self.active.values().max_by(|a, b| a.score.total_cmp(&b.score))
    }

    /// Beam hypotheses ordered by descending score.
    pub fn ranked(&self) -> Vec<&Prefix> {
        let mut ranked: Vec<&Prefix> = self.active.values().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    pub fn active(&self) -> impl Iterator<Item = &Prefix> {
        self.active.values()
    }

    pub fn get(&self, value: &str) -> Option<&Prefix> {
        self.active.get(value)
    }

    pub fn is_active(&self, value: &str) -> bool {
        self.active.contains_key(value)
    }

    pub fn is_staged(&self, value: &str) -> bool {
        self.staged.contains_key(value)
    }

    pub fn is_overflow(&self, value: &str) -> bool {
        self.overflow.contains_key(value)
    }

    pub fn overflow_prefix(&self, value: &str) -> Option<&Prefix> {
        self.overflow.get(value)
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub fn overflow_len(&self) -> usize {
        self.overflow.len()
    }

    pub fn beam_width(&self) -> usize {
        self.beam_width
    }

    fn lookup(&self, value: &str) -> Option<&Prefix> {
        self.active
            .get(value)
            .or_else(|| self.staged.get(value))
            .or_else(|| self.overflow.get(value))
    }
}
