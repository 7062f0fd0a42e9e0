#![deny(warnings)]

use crate::config::ErrorGrammarConfig;
use crate::error::GrammarError;
use crate::grammar::{Grammar, RuleId, RuleKind, Symbol};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub const AUGMENTED_START: &str = "S'";
pub const ERR_TAG: &str = "Err_Tag";
pub const INSERT_ERR: &str = "InsertErr";
const ERR_PREFIX: &str = "Err_";

// Rule routing the parse through error symbols is free, each token level
// correction (substitute, insert, delete) costs one.
const ROUTING: RuleKind = RuleKind::Error(0);
const CORRECTION: RuleKind = RuleKind::Error(1);

#[derive(Debug)]
struct Augmented {
    grammar: Grammar,
    base_start: Symbol,
    err_tag: Symbol,
    insert_err: Symbol,
    // Err_T -> T
    stands_for: HashMap<Symbol, Symbol>,
}

/// A base grammar extended with error productions, plus the set of those
/// productions currently allowed to take part in a parse.
///
/// Cloning is cheap and clones don't see each other's activation changes.
#[derive(Clone, Debug)]
pub struct ErrorGrammar {
    inner: Arc<Augmented>,
    active: Arc<Vec<bool>>,
}

impl ErrorGrammar {
    /// Augment `base`. Every error production starts out active.
    pub fn new(base: &Grammar, config: &ErrorGrammarConfig) -> Result<ErrorGrammar, GrammarError> {
        if let Some(reserved) = base.symbol_names().find(|name|
                *name == AUGMENTED_START || *name == INSERT_ERR || name.starts_with(ERR_PREFIX)) {
            return Err(GrammarError::ReservedSymbol(reserved.to_string()));
        }

        let mut tags = Vec::new();
        for tag in &config.important_tags {
            match base.symbol(tag) {
                Some(sym) if base.is_terminal(sym) =>
                    return Err(GrammarError::NotANonterminal(tag.clone())),
                Some(sym) => tags.push(sym),
                None => debug!(tag = %tag, "important tag not in grammar, skipped"),
            }
        }
        let rewrites = |sym: Symbol| {
            let name = base.name(sym);
            base.is_tag(sym) && config.is_important(name) && !config.is_literal(name)
        };

        let mut builder = base.builder();
        // 1. rules that may see an error in place of any of their important tags
        for (_, rule) in base.rules().filter(|(_, rule)| !base.is_tag(rule.lhs)) {
            if !rule.rhs.iter().any(|sym| rewrites(*sym)) {
                continue;
            }
            let rhs: Vec<_> = rule.rhs.iter()
                .map(|sym| if rewrites(*sym) {
                    format!("{}{}", ERR_PREFIX, base.name(*sym))
                } else {
                    base.name(*sym).to_string()
                })
                .collect();
            builder.add_rule(base.name(rule.lhs), &rhs, ROUTING);
        }
        // 2. substitution, insertion and deletion of single tokens
        for tag in &tags {
            let tag = base.name(*tag);
            let err = format!("{}{}", ERR_PREFIX, tag);
            builder.add_rule(&err, &[ERR_TAG], ROUTING);
            builder.add_rule(&err, &[INSERT_ERR, tag], ROUTING);
        }
        builder.add_rule::<&str>(ERR_TAG, &[], CORRECTION);
        for terminal in &config.important_terminals {
            builder.add_rule(ERR_TAG, &[terminal], CORRECTION);
            builder.add_rule(INSERT_ERR, &[terminal], CORRECTION);
        }
        // 3. trailing junk after a complete program
        let base_start = base.name(base.start());
        builder.add_rule(AUGMENTED_START, &[base_start], RuleKind::Normal);
        builder.add_rule(AUGMENTED_START, &[base_start, INSERT_ERR], ROUTING);

        let err_tag = builder.symbol(ERR_TAG);
        let insert_err = builder.symbol(INSERT_ERR);
        let grammar = builder.into_grammar(AUGMENTED_START)?;
        let stands_for = tags.iter()
            .filter_map(|tag| {
                let err = grammar.symbol(&format!("{}{}", ERR_PREFIX, base.name(*tag)))?;
                Some((err, *tag))
            })
            .collect();
        let active = grammar.rules().map(|_| true).collect();
        debug!(rules = grammar.rules().count(), tags = tags.len(), "error grammar built");
        Ok(ErrorGrammar{
            inner: Arc::new(Augmented{
                base_start: base.start(),
                grammar,
                err_tag,
                insert_err,
                stands_for,
            }),
            active: Arc::new(active),
        })
    }

    /// Load the base grammar from text and augment it with the Python set.
    /// Symbols without productions must be terminals the Python tokenizer
    /// emits, a misspelled nonterminal is a `GrammarError::UnknownSymbol`.
    pub fn load(text: &str) -> Result<ErrorGrammar, GrammarError> {
        let base = Grammar::load(text)?;
        base.check_terminals(lexers::is_python_terminal)?;
        ErrorGrammar::new(&base, &ErrorGrammarConfig::default())
    }

    pub fn grammar(&self) -> &Grammar { &self.inner.grammar }

    /// The augmented start `S'`.
    pub fn start(&self) -> Symbol { self.inner.grammar.start() }

    pub fn base_start(&self) -> Symbol { self.inner.base_start }

    pub fn err_tag(&self) -> Symbol { self.inner.err_tag }

    pub fn insert_err(&self) -> Symbol { self.inner.insert_err }

    /// The tag an `Err_T` symbol stands in for.
    pub fn stands_for(&self, err: Symbol) -> Option<Symbol> {
        self.inner.stands_for.get(&err).copied()
    }

    pub fn is_error_symbol(&self, sym: Symbol) -> bool {
        sym == self.err_tag() || sym == self.insert_err() || self.stands_for(sym).is_some()
    }

    pub fn is_active(&self, id: RuleId) -> bool {
        self.active[id.index()]
    }

    pub fn active_rules_for(&self, sym: Symbol) -> impl Iterator<Item=RuleId> + '_ {
        self.grammar().rules_for(sym).iter().copied().filter(|id| self.is_active(*id))
    }

    /// First active alternative of a tag that holds `token`.
    pub fn scan_rule(&self, tag: Symbol, token: Symbol) -> Option<RuleId> {
        self.active_rules_for(tag).find(|id| self.grammar().rule(*id).rhs.contains(&token))
    }

    pub fn epsilon_rule(&self, tag: Symbol) -> Option<RuleId> {
        self.active_rules_for(tag).find(|id| self.grammar().rule(*id).rhs.is_empty())
    }

    /// Whether the untouched productions of `tag` accept `token`.
    pub fn tag_accepts(&self, tag: Symbol, token: Symbol) -> bool {
        let g = self.grammar();
        g.rules_for(tag).iter()
            .map(|id| g.rule(*id))
            .any(|rule| !rule.kind.is_error() && rule.rhs.contains(&token))
    }

    pub fn rule_key(&self, id: RuleId) -> String {
        self.grammar().rule_text(id)
    }

    /// Canonical text of every error production, active or not.
    pub fn error_rules(&self) -> Vec<String> {
        self.grammar().rules()
            .filter(|(_, rule)| rule.kind.is_error())
            .map(|(id, _)| self.rule_key(id))
            .collect()
    }

    pub fn active_rules(&self) -> Vec<String> {
        self.grammar().rules()
            .filter(|(id, rule)| rule.kind.is_error() && self.is_active(*id))
            .map(|(id, _)| self.rule_key(id))
            .collect()
    }

    /// Restrict error productions to exactly those named by `keys`
    /// (`LHS -> r1 r2` text). Normal productions always stay active.
    /// Returns how many error productions ended up active.
    pub fn update_active_rules<S: AsRef<str>>(&mut self, keys: &[S]) -> usize {
        let g = self.grammar();
        let mut active: Vec<bool> = g.rules().map(|(_, rule)| !rule.kind.is_error()).collect();
        let mut enabled = 0;
        for key in keys {
            match g.find_rule(key.as_ref()) {
                Some(id) if g.rule(id).kind.is_error() && !active[id.index()] => {
                    active[id.index()] = true;
                    enabled += 1;
                },
                Some(_) => (),
                None => debug!(key = key.as_ref(), "unknown rule left inactive"),
            }
        }
        debug!(enabled, "active error rules updated");
        self.active = Arc::new(active);
        enabled
    }

    pub fn activate_all(&mut self) {
        self.active = Arc::new(self.grammar().rules().map(|_| true).collect());
    }
}

impl fmt::Display for ErrorGrammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.grammar())
    }
}

///////////////////////////////////////////////////////////////////////////////
