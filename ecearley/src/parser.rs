#![deny(warnings)]

use crate::chart::Chart;
use crate::config::ParserConfig;
use crate::cost::{Completion, CostPolicy, TruePositiveFree};
use crate::error::ParseError;
use crate::error_grammar::ErrorGrammar;
use crate::grammar::{Grammar, Symbol, SymbolClass};
use crate::items::{Production, State, StateId, StateKey};
use crate::trees::{Derivation, Extractor, Tree};
use std::time::Instant;
use tracing::{debug, trace};

// how many states to process between clock reads
const CLOCK_EVERY: usize = 256;

/// Error-correcting Earley parser. Finds the cheapest way to derive the
/// input from the grammar, raising the tolerated cost one unit at a time.
pub struct ErrorEarleyParser<'g, P = TruePositiveFree> {
    grammar: &'g ErrorGrammar,
    config: ParserConfig,
    policy: P,
}

/// Outcome of a parse. Keeps the chart around for inspection.
#[derive(Debug)]
pub struct ParseChart<'g> {
    grammar: &'g ErrorGrammar,
    chart: Chart<'g>,
    tokens: Vec<String>,
    accepted: Option<StateId>,
}

///////////////////////////////////////////////////////////////////////////////

impl<'g> ErrorEarleyParser<'g> {
    pub fn new(grammar: &'g ErrorGrammar, config: ParserConfig) -> Self {
        ErrorEarleyParser{grammar, config, policy: TruePositiveFree}
    }
}

impl<'g, P: CostPolicy> ErrorEarleyParser<'g, P> {
    pub fn with_policy(grammar: &'g ErrorGrammar, config: ParserConfig, policy: P) -> Self {
        ErrorEarleyParser{grammar, config, policy}
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a stream of terminals. Not finding a parse within `max_cost`
    /// is not an error, check `ParseChart::has_parse`.
    pub fn parse<I>(&self, tokens: I) -> Result<ParseChart<'g>, ParseError>
            where I: IntoIterator, I::Item: AsRef<str> {
        let tokens: Vec<String> = tokens.into_iter().map(|t| t.as_ref().to_string()).collect();
        let g = self.grammar.grammar();
        let symbols: Vec<_> = tokens.iter().map(|t| g.symbol(t)).collect();

        let mut sweep = Sweep{
            parser: self,
            g,
            chart: Chart::new(g, tokens.len() + 1),
            symbols: &symbols,
            processed: 0,
            started: Instant::now(),
        };
        for rule in self.grammar.active_rules_for(self.grammar.start()) {
            sweep.chart.insert(State::predicted(rule, 0));
        }

        let mut accepted = None;
        for bound in 0..=self.config.max_cost {
            for pos in 0..=tokens.len() {
                while let Some(id) = sweep.chart.pop(pos, bound) {
                    sweep.check_limits()?;
                    sweep.step(id, pos);
                }
                sweep.chart.graduate(pos);
            }
            accepted = sweep.accepted(bound);
            debug!(bound, states = sweep.chart.len(), accepted = accepted.is_some(), "cost round done");
            if accepted.is_some() || !sweep.chart.has_work() {
                break;
            }
        }

        if cfg!(feature="debug") {
            eprintln!("{}", sweep.chart);
        }
        match accepted {
            Some(id) => debug!(cost = sweep.chart.state(id).cost, tokens = tokens.len(), "accepted"),
            None => debug!(max_cost = self.config.max_cost, tokens = tokens.len(), "no parse"),
        }
        Ok(ParseChart{grammar: self.grammar, chart: sweep.chart, tokens, accepted})
    }
}

// State of one parse call
struct Sweep<'a, 'g, P> {
    parser: &'a ErrorEarleyParser<'g, P>,
    g: &'g Grammar,
    chart: Chart<'g>,
    symbols: &'a [Option<Symbol>],
    processed: usize,
    started: Instant,
}

impl<'a, 'g, P: CostPolicy> Sweep<'a, 'g, P> {
    fn check_limits(&mut self) -> Result<(), ParseError> {
        let config = &self.parser.config;
        if let Some(limit) = config.max_states {
            if self.chart.len() > limit {
                return Err(ParseError::ChartLimit{limit});
            }
        }
        self.processed += 1;
        if let Some(limit) = config.time_limit {
            if self.processed % CLOCK_EVERY == 0 && self.started.elapsed() > limit {
                return Err(ParseError::Timeout{limit});
            }
        }
        Ok(())
    }

    fn step(&mut self, id: StateId, pos: usize) {
        trace!(state = %self.chart.state(id).display(self.g), pos, "step");
        let Some(next) = self.chart.state(id).next_symbol(self.g) else {
            return self.complete(id);
        };
        match self.g.class(next) {
            SymbolClass::Tag => self.scan(next, pos),
            SymbolClass::Terminal => self.scan_terminal(next, pos),
            SymbolClass::Nonterminal => self.predict(next, pos),
        }
        // next may have completed here before this state started waiting on it
        for done in self.chart.completions_of(pos, next) {
            self.advance(id, done);
        }
    }

    fn predict(&mut self, sym: Symbol, pos: usize) {
        let eg = self.parser.grammar;
        for rule in eg.active_rules_for(sym) {
            self.chart.insert(State::predicted(rule, pos));
        }
    }

    fn scan(&mut self, tag: Symbol, pos: usize) {
        let eg = self.parser.grammar;
        let token = self.symbols.get(pos).copied().flatten();
        if let Some(rule) = token.and_then(|t| eg.scan_rule(tag, t)) {
            let cost = self.g.rule(rule).error_score();
            if cost <= self.parser.config.max_cost {
                trace!(tag = self.g.name(tag), pos, cost, "scan");
                self.chart.insert(State::lexeme(tag, pos, cost));
            }
        }
        // the empty alternative completes right here
        if let Some(rule) = eg.epsilon_rule(tag) {
            self.chart.insert(State::predicted(rule, pos));
        }
    }

    fn scan_terminal(&mut self, terminal: Symbol, pos: usize) {
        if self.symbols.get(pos).copied().flatten() == Some(terminal) {
            self.chart.insert(State::lexeme(terminal, pos, 0));
        }
    }

    fn complete(&mut self, id: StateId) {
        self.chart.record_completion(id);
        let state = self.chart.state(id);
        let (lhs, origin) = (state.lhs(self.g), state.origin);
        for waiting in self.chart.waiting_on(origin, lhs) {
            self.advance(waiting, id);
        }
    }

    fn advance(&mut self, waiting: StateId, done: StateId) {
        let (w, c) = (self.chart.state(waiting), self.chart.state(done));
        let token = match c.production {
            Production::Lexeme(_) => self.symbols.get(c.origin).copied().flatten(),
            Production::Rule(_) => None,
        };
        let completion = Completion{
            waiting_lhs: w.lhs(self.g),
            waiting_cost: w.cost,
            completed_lhs: c.lhs(self.g),
            completed_cost: c.cost,
            error_score: c.error_score(self.g),
            token,
        };
        let cost = self.parser.policy.completion_cost(self.parser.grammar, &completion);
        if cost > self.parser.config.max_cost {
            return;
        }
        let advanced = w.advanced(done, c.end, cost);
        self.chart.insert(advanced);
    }

    /// Cheapest complete `S'` spanning the whole input, first found on ties.
    fn accepted(&self, bound: u32) -> Option<StateId> {
        let end = self.symbols.len();
        self.g.rules_for(self.parser.grammar.start()).iter()
            .filter_map(|rule| self.chart.best(end, &StateKey{
                production: Production::Rule(*rule),
                dot: self.g.rule(*rule).rhs.len(),
                origin: 0,
            }))
            .filter(|id| self.chart.state(*id).cost <= bound)
            .min_by_key(|id| (self.chart.state(*id).cost, *id))
    }
}

impl<'g> ParseChart<'g> {
    pub fn has_parse(&self) -> bool {
        self.accepted.is_some()
    }

    /// Minimum number of corrections needed, if any parse was found.
    pub fn cost(&self) -> Option<u32> {
        self.accepted.map(|id| self.chart.state(id).cost)
    }

    pub fn chart(&self) -> &Chart<'g> {
        &self.chart
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn extractor(&self) -> Extractor<'_, 'g> {
        Extractor{chart: &self.chart, grammar: self.grammar, tokens: &self.tokens}
    }

    pub fn tree(&self) -> Option<Tree> {
        self.accepted.map(|id| self.extractor().tree(id))
    }

    pub fn derivation(&self) -> Option<Derivation> {
        self.accepted.map(|id| self.extractor().derivation(id))
    }
}
