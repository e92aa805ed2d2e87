use solana_sdk::pubkey::Pubkey;
use std::collections::{HashMap, HashSet};

/// Stable identity of a reported item across polling cycles.
pub trait DedupeKey {
    fn dedupe_key(&self) -> &str;
}

/// Split `current` into the items whose key is not in `previous`, in their original
/// order, and the union of `previous` with every key in `current`.
///
/// A key repeated within `current` is reported once, at its first occurrence.
pub fn filter_new<T: DedupeKey>(
    current: Vec<T>,
    previous: HashSet<String>,
) -> (Vec<T>, HashSet<String>) {
    let mut updated = previous;
    let mut fresh = Vec::new();
    for item in current {
        if updated.insert(item.dedupe_key().to_string()) {
            fresh.push(item);
        }
    }
    (fresh, updated)
}

#[derive(Debug, Default)]
struct SeenKeys {
    keys: HashSet<String>,
    /// Cycle each key was last sighted in.
    last_seen: HashMap<String, u64>,
}

/// Signatures already reported, per monitored program.
///
/// Only [`DedupeState::refresh`] and [`DedupeState::commit`] mutate it, at the end of a
/// completed cycle.
#[derive(Debug, Default)]
pub struct DedupeState {
    programs: HashMap<Pubkey, SeenKeys>,
    cycle: u64,
    horizon: Option<u64>,
}

impl DedupeState {
    /// `horizon_cycles == 0` keeps every key for the life of the process.
    pub fn new(horizon_cycles: u64) -> Self {
        Self {
            programs: HashMap::new(),
            cycle: 0,
            horizon: (horizon_cycles > 0).then_some(horizon_cycles),
        }
    }

    pub fn contains(&self, program_id: &Pubkey, key: &str) -> bool {
        self.programs
            .get(program_id)
            .map(|seen| seen.keys.contains(key))
            .unwrap_or(false)
    }

    /// Number of keys held across all programs.
    pub fn len(&self) -> usize {
        self.programs.values().map(|seen| seen.keys.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Completed cycles so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Mark reported keys as sighted again in the cycle about to be committed, so the
    /// eviction horizon counts from their latest sighting. Unknown keys are ignored.
    pub fn refresh<'a, I>(&mut self, program_id: &Pubkey, keys: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(seen) = self.programs.get_mut(program_id) else {
            return;
        };
        let cycle = self.cycle + 1;
        for key in keys {
            if let Some(last_seen) = seen.last_seen.get_mut(key) {
                *last_seen = cycle;
            }
        }
    }

    /// Record one completed cycle and return the items not reported before, keeping the
    /// order of `batches` and of the items within each batch.
    pub fn commit<T: DedupeKey>(&mut self, batches: Vec<(Pubkey, Vec<T>)>) -> Vec<T> {
        self.cycle += 1;
        let mut reported = Vec::new();

        for (program_id, items) in batches {
            let seen = self.programs.entry(program_id).or_default();
            let previous = std::mem::take(&mut seen.keys);
            let (fresh, updated) = filter_new(items, previous);
            seen.keys = updated;
            for item in &fresh {
                seen.last_seen
                    .insert(item.dedupe_key().to_string(), self.cycle);
            }
            reported.extend(fresh);
        }

        if let Some(horizon) = self.horizon {
            self.evict(horizon);
        }
        reported
    }

    fn evict(&mut self, horizon: u64) {
        let cycle = self.cycle;
        for seen in self.programs.values_mut() {
            let SeenKeys { keys, last_seen } = seen;
            last_seen.retain(|key, sighted_at| {
                let keep = *sighted_at + horizon > cycle;
                if !keep {
                    keys.remove(key);
                }
                keep
            });
        }
        self.programs.retain(|_, seen| !seen.keys.is_empty());
    }
}
