#![deny(warnings)]

use crate::grammar::{Grammar, Symbol};
use crate::items::{State, StateId, StateKey};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// States ending at one input position.
///
/// `best` holds the cheapest state per key. Buckets may keep ids of states
/// that were since replaced by a cheaper one, those are skipped on the way out.
#[derive(Debug, Default)]
pub struct ChartEntry {
    best: HashMap<StateKey, StateId>,
    seen: Vec<StateId>,
    pending: VecDeque<StateId>,
    deferred: Vec<StateId>,
    // states ending here, by the symbol they wait on
    waiting: HashMap<Symbol, Vec<StateId>>,
    // completions starting here: symbol -> (end, key)
    completed: HashMap<Symbol, Vec<(usize, StateKey)>>,
    recorded: HashSet<(Symbol, usize, StateKey)>,
}

impl ChartEntry {
    pub fn best(&self, key: &StateKey) -> Option<StateId> {
        self.best.get(key).copied()
    }

    fn is_live(&self, key: &StateKey, id: StateId) -> bool {
        self.best.get(key) == Some(&id)
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    pub fn has_work(&self) -> bool {
        !self.pending.is_empty() || !self.deferred.is_empty()
    }
}

/// Every state of one parse, in an arena, plus one entry per input position.
#[derive(Debug)]
pub struct Chart<'g> {
    grammar: &'g Grammar,
    states: Vec<State>,
    entries: Vec<ChartEntry>,
}

impl<'g> Chart<'g> {
    pub fn new(grammar: &'g Grammar, positions: usize) -> Chart<'g> {
        Chart{
            grammar,
            states: Vec::new(),
            entries: (0..positions).map(|_| ChartEntry::default()).collect(),
        }
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn entry(&self, pos: usize) -> &ChartEntry {
        &self.entries[pos]
    }

    pub fn entries(&self) -> &[ChartEntry] {
        &self.entries
    }

    /// Number of states ever created, replaced ones included.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn has_work(&self) -> bool {
        self.entries.iter().any(ChartEntry::has_work)
    }

    /// Live state for `key` in the entry at `pos`.
    pub fn best(&self, pos: usize, key: &StateKey) -> Option<StateId> {
        self.entries[pos].best(key)
    }

    /// Add a state unless an equal or cheaper one with the same key exists.
    /// A replaced state stays in the arena but is never processed again.
    pub fn insert(&mut self, state: State) -> Option<StateId> {
        let key = state.key();
        let entry = &mut self.entries[state.end];
        if let Some(prev) = entry.best.get(&key) {
            if self.states[prev.index()].cost <= state.cost {
                return None;
            }
        }
        let id = StateId(self.states.len() as u32);
        entry.best.insert(key, id);
        entry.pending.push_back(id);
        if let Some(next) = state.next_symbol(self.grammar) {
            entry.waiting.entry(next).or_default().push(id);
        }
        self.states.push(state);
        Some(id)
    }

    /// Next live pending state at `pos` within `bound`. Costlier ones are
    /// deferred to a later round.
    pub fn pop(&mut self, pos: usize, bound: u32) -> Option<StateId> {
        let entry = &mut self.entries[pos];
        while let Some(id) = entry.pending.pop_front() {
            let state = &self.states[id.index()];
            if !entry.is_live(&state.key(), id) {
                continue;
            }
            if state.cost > bound {
                entry.deferred.push(id);
                continue;
            }
            entry.seen.push(id);
            return Some(id);
        }
        None
    }

    /// Deferred states become pending for the next cost round.
    pub fn graduate(&mut self, pos: usize) {
        let entry = &mut self.entries[pos];
        entry.pending.extend(entry.deferred.drain(..));
    }

    /// Live states ending at `pos` whose next symbol is `symbol`.
    pub fn waiting_on(&self, pos: usize, symbol: Symbol) -> Vec<StateId> {
        let entry = &self.entries[pos];
        entry.waiting.get(&symbol).map_or_else(Vec::new, |ids| ids.iter()
            .copied()
            .filter(|id| entry.is_live(&self.states[id.index()].key(), *id))
            .collect())
    }

    /// Remember that `id` completed its lhs, so states starting to wait on
    /// it later can still advance. Returns false if already known.
    pub fn record_completion(&mut self, id: StateId) -> bool {
        let state = &self.states[id.index()];
        let record = (state.lhs(self.grammar), state.end, state.key());
        let entry = &mut self.entries[state.origin];
        if !entry.recorded.insert(record) {
            return false;
        }
        let (lhs, end, key) = record;
        entry.completed.entry(lhs).or_default().push((end, key));
        true
    }

    /// Live completions of `symbol` starting at `pos`.
    pub fn completions_of(&self, pos: usize, symbol: Symbol) -> Vec<StateId> {
        self.entries[pos].completed.get(&symbol).map_or_else(Vec::new, |done| done.iter()
            .filter_map(|(end, key)| self.best(*end, key))
            .collect())
    }
}

impl<'g> fmt::Display for Chart<'g> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let buckets = |entry: &ChartEntry| [
            ("Seen", entry.seen.clone()),
            ("Pending", entry.pending.iter().copied().collect()),
            ("Deferred", entry.deferred.clone()),
        ];
        for (pos, entry) in self.entries.iter().enumerate() {
            writeln!(f, "=== Chart[{}] ===", pos)?;
            for (name, ids) in buckets(entry) {
                writeln!(f, "<<<< {} >>>>", name)?;
                for id in ids {
                    let state = self.state(id);
                    let retired = if entry.is_live(&state.key(), id) { "" } else { " (replaced)" };
                    writeln!(f, "{:>5} {}{}", id.index(), state.display(self.grammar), retired)?;
                }
            }
        }
        Ok(())
    }
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    fn grammar() -> Grammar {
        GrammarBuilder::default()
            .rule("S", &["A", "A"])
            .rule("A", &["a"])
            .into_grammar("S")
            .unwrap()
    }

    #[test]
    fn cheaper_replaces() {
        let g = grammar();
        let rule = g.rules_for(g.start())[0];
        let mut chart = Chart::new(&g, 3);
        let first = chart.insert(State{cost: 2, ..State::predicted(rule, 0)}).unwrap();
        assert_eq!(chart.insert(State{cost: 2, ..State::predicted(rule, 0)}), None);
        assert_eq!(chart.insert(State{cost: 5, ..State::predicted(rule, 0)}), None);
        let second = chart.insert(State::predicted(rule, 0)).unwrap();
        assert_ne!(first, second);
        assert_eq!(chart.len(), 2);
        assert_eq!(chart.entry(0).len(), 1);
        // the replaced one is skipped
        assert_eq!(chart.pop(0, 8), Some(second));
        assert_eq!(chart.pop(0, 8), None);
        assert!(!chart.has_work());
    }

    #[test]
    fn defer_until_bound() {
        let g = grammar();
        let a = g.symbol("A").unwrap();
        let mut chart = Chart::new(&g, 3);
        let costly = chart.insert(State::lexeme(a, 0, 1)).unwrap();
        assert_eq!(chart.pop(1, 0), None);
        assert!(chart.has_work());
        chart.graduate(1);
        assert_eq!(chart.pop(1, 1), Some(costly));
        assert!(!chart.entry(1).has_work());
    }

    #[test]
    fn waiting_and_completed() {
        let g = grammar();
        let (s, a) = (g.start(), g.symbol("A").unwrap());
        let rule = g.rules_for(s)[0];
        let mut chart = Chart::new(&g, 3);
        let waiting = chart.insert(State::predicted(rule, 0)).unwrap();
        assert_eq!(chart.waiting_on(0, a), vec![waiting]);
        assert!(chart.waiting_on(0, s).is_empty());

        let lexeme = chart.insert(State::lexeme(a, 0, 0)).unwrap();
        assert!(chart.record_completion(lexeme));
        assert!(!chart.record_completion(lexeme));
        assert_eq!(chart.completions_of(0, a), vec![lexeme]);
        assert!(chart.completions_of(1, a).is_empty());

        assert_eq!(chart.insert(State::predicted(rule, 0)), None);
    }

    #[test]
    fn dump() {
        let g = grammar();
        let rule = g.rules_for(g.start())[0];
        let mut chart = Chart::new(&g, 1);
        chart.insert(State{cost: 1, ..State::predicted(rule, 0)});
        chart.insert(State::predicted(rule, 0));
        let text = chart.to_string();
        assert!(text.starts_with("=== Chart[0] ===\n<<<< Seen >>>>\n<<<< Pending >>>>\n"));
        assert!(text.contains("    0 (0 - 0) S ->  \u{00b7} A A #cost: 1 #bp: 0 (replaced)\n"));
        assert!(text.contains("    1 (0 - 0) S ->  \u{00b7} A A #cost: 0 #bp: 0\n"));
    }
}
