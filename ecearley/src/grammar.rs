#![deny(warnings)]

use crate::error::GrammarError;
use std::collections::{BTreeSet, HashMap};
use std::{fmt, hash, iter};

pub const DEFAULT_START: &str = "S";

/// An interned grammar symbol. Its name and whether it's a terminal, a tag
/// or a syntactic nonterminal are only known to the `Grammar` that made it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Symbol(u32);

impl Symbol {
    pub fn index(self) -> usize { self.0 as usize }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct RuleId(u32);

impl RuleId {
    pub fn index(self) -> usize { self.0 as usize }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RuleKind {
    Normal,
    /// Synthetic production that tolerates an error, at the given cost.
    Error(u32),
}

impl RuleKind {
    pub fn error_score(self) -> u32 {
        match self {
            RuleKind::Normal => 0,
            RuleKind::Error(cost) => cost,
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, RuleKind::Error(_))
    }
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub lhs: Symbol,
    pub rhs: Vec<Symbol>,
    pub kind: RuleKind,
}

// A production is the same rule whatever its kind
impl hash::Hash for Rule {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.lhs.hash(state);
        self.rhs.hash(state);
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Rule) -> bool {
        self.lhs == other.lhs && self.rhs == other.rhs
    }
}

impl Eq for Rule {}

impl Rule {
    pub fn error_score(&self) -> u32 {
        self.kind.error_score()
    }
}

/// Terminals have no productions. Tags are nonterminals whose productions
/// are all made of terminals, ie: lexical classes like `Assign_Op -> = <|> +=`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolClass {
    Terminal,
    Tag,
    Nonterminal,
}

#[derive(Clone, Debug, Default)]
struct SymbolTable {
    names: Vec<String>,
    ids: HashMap<String, Symbol>,
}

impl SymbolTable {
    fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&sym) = self.ids.get(name) {
            return sym;
        }
        let sym = Symbol(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), sym);
        sym
    }
}

/// Builds a Grammar one production at a time. Repeated productions are
/// silently dropped, the first one added wins.
#[derive(Clone, Debug, Default)]
pub struct GrammarBuilder {
    symbols: SymbolTable,
    rules: Vec<Rule>,
    by_lhs: HashMap<Symbol, Vec<RuleId>>,
    // in order of first definition
    nonterminals: Vec<Symbol>,
}

impl GrammarBuilder {
    pub fn symbol(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    pub fn defines(&self, name: &str) -> bool {
        self.symbols.ids.get(name).is_some_and(|sym| self.by_lhs.contains_key(sym))
    }

    /// Returns false if the production was already there.
    pub fn add_rule<S: AsRef<str>>(&mut self, lhs: &str, rhs: &[S], kind: RuleKind) -> bool {
        let lhs = self.symbols.intern(lhs);
        let rhs = rhs.iter().map(|s| self.symbols.intern(s.as_ref())).collect();
        let rule = Rule{lhs, rhs, kind};
        let alternatives = self.by_lhs.entry(lhs).or_default();
        if alternatives.iter().any(|id| self.rules[id.index()] == rule) {
            return false;
        }
        if alternatives.is_empty() {
            self.nonterminals.push(lhs);
        }
        alternatives.push(RuleId(self.rules.len() as u32));
        self.rules.push(rule);
        true
    }

    pub fn rule<S: AsRef<str>>(mut self, lhs: &str, rhs: &[S]) -> Self {
        self.add_rule(lhs, rhs, RuleKind::Normal);
        self
    }

    pub fn into_grammar(self, start: &str) -> Result<Grammar, GrammarError> {
        let start = match self.symbols.ids.get(start) {
            Some(sym) if self.by_lhs.contains_key(sym) => *sym,
            _ => return Err(GrammarError::MissingStart(start.to_string())),
        };
        let defined = |sym: &Symbol| self.by_lhs.contains_key(sym);
        let classes = (0..self.symbols.names.len() as u32).map(Symbol)
            .map(|sym| match self.by_lhs.get(&sym) {
                None => SymbolClass::Terminal,
                Some(ids) if ids.iter().all(|id|
                    !self.rules[id.index()].rhs.iter().any(defined)) => SymbolClass::Tag,
                Some(_) => SymbolClass::Nonterminal,
            })
            .collect();
        Ok(Grammar{
            symbols: self.symbols,
            rules: self.rules,
            by_lhs: self.by_lhs,
            nonterminals: self.nonterminals,
            classes,
            start,
        })
    }
}

/// An immutable context-free grammar. Alternatives of every nonterminal are
/// kept in insertion order, which is also the order they're tried in.
#[derive(Clone, Debug)]
pub struct Grammar {
    symbols: SymbolTable,
    rules: Vec<Rule>,
    by_lhs: HashMap<Symbol, Vec<RuleId>>,
    nonterminals: Vec<Symbol>,
    classes: Vec<SymbolClass>,
    start: Symbol,
}

impl Grammar {
    /// Load a grammar with `S` as its start symbol.
    ///
    /// Every non-blank line reads `LHS -> RHS_1 <|> RHS_2 <|> ...`, each RHS
    /// being whitespace separated symbols. An empty RHS is an ε production.
    pub fn load(text: &str) -> Result<Grammar, GrammarError> {
        Grammar::load_with_start(text, DEFAULT_START)
    }

    pub fn load_with_start(text: &str, start: &str) -> Result<Grammar, GrammarError> {
        let mut builder = GrammarBuilder::default();
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = || GrammarError::Malformed{line: idx + 1, text: line.to_string()};
            let (lhs, alternatives) = line.split_once("->").ok_or_else(malformed)?;
            let lhs = lhs.trim();
            if lhs.is_empty() || lhs.contains(char::is_whitespace) {
                return Err(malformed());
            }
            for alternative in alternatives.split("<|>") {
                let rhs: Vec<_> = alternative.split_whitespace().collect();
                builder.add_rule(lhs, &rhs, RuleKind::Normal);
            }
        }
        builder.into_grammar(start)
    }

    /// Reopen the grammar to extend it.
    pub fn builder(&self) -> GrammarBuilder {
        GrammarBuilder{
            symbols: self.symbols.clone(),
            rules: self.rules.clone(),
            by_lhs: self.by_lhs.clone(),
            nonterminals: self.nonterminals.clone(),
        }
    }

    pub fn start(&self) -> Symbol { self.start }

    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.symbols.ids.get(name).copied()
    }

    pub fn name(&self, sym: Symbol) -> &str {
        &self.symbols.names[sym.index()]
    }

    /// Every symbol name, in order of first appearance.
    pub fn symbol_names(&self) -> impl Iterator<Item=&str> {
        self.symbols.names.iter().map(String::as_str)
    }

    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    pub fn rules(&self) -> impl Iterator<Item=(RuleId, &Rule)> {
        self.rules.iter().enumerate().map(|(idx, rule)| (RuleId(idx as u32), rule))
    }

    pub fn rules_for(&self, sym: Symbol) -> &[RuleId] {
        self.by_lhs.get(&sym).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nonterminals(&self) -> &[Symbol] {
        &self.nonterminals
    }

    pub fn class(&self, sym: Symbol) -> SymbolClass {
        self.classes[sym.index()]
    }

    pub fn is_terminal(&self, sym: Symbol) -> bool {
        self.class(sym) == SymbolClass::Terminal
    }

    pub fn is_tag(&self, sym: Symbol) -> bool {
        self.class(sym) == SymbolClass::Tag
    }

    pub fn is_nullable(&self, sym: Symbol) -> bool {
        self.rules_for(sym).iter().any(|id| self.rule(*id).rhs.is_empty())
    }

    /// Terminals used by any production.
    pub fn alphabet(&self) -> BTreeSet<&str> {
        self.rules.iter()
            .flat_map(|rule| rule.rhs.iter())
            .filter(|sym| self.is_terminal(**sym))
            .map(|sym| self.name(*sym))
            .collect()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.nonterminals.iter()
            .filter(|sym| self.is_tag(**sym))
            .map(|sym| self.name(*sym))
            .collect()
    }

    fn rhs_text(&self, rule: &Rule) -> String {
        rule.rhs.iter().map(|s| self.name(*s)).collect::<Vec<_>>().join(" ")
    }

    /// Canonical `LHS -> r1 r2` text used to refer to a single production.
    pub fn rule_text(&self, id: RuleId) -> String {
        let rule = self.rule(id);
        format!("{} -> {}", self.name(rule.lhs), self.rhs_text(rule))
    }

    /// Look up a production by its canonical text.
    pub fn find_rule(&self, text: &str) -> Option<RuleId> {
        let (lhs, rhs) = text.split_once("->")?;
        let lhs = self.symbol(lhs.trim())?;
        let rhs = rhs.split_whitespace()
            .map(|name| self.symbol(name))
            .collect::<Option<Vec<_>>>()?;
        self.rules_for(lhs).iter().copied().find(|id| self.rule(*id).rhs == rhs)
    }

    /// Every undefined symbol must be a terminal the input can produce.
    pub fn check_terminals(&self, accepts: impl Fn(&str) -> bool) -> Result<(), GrammarError> {
        match self.alphabet().into_iter().find(|name| !accepts(name)) {
            Some(unknown) => Err(GrammarError::UnknownSymbol(unknown.to_string())),
            None => Ok(()),
        }
    }
}

// The start symbol goes first, the rest follow in order of definition
impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let others = self.nonterminals.iter().copied().filter(|sym| *sym != self.start);
        for lhs in iter::once(self.start).chain(others) {
            let alternatives = self.rules_for(lhs).iter()
                .map(|id| self.rhs_text(self.rule(*id)))
                .collect::<Vec<_>>();
            writeln!(f, "{} -> {}", self.name(lhs), alternatives.join(" <|> "))?;
        }
        Ok(())
    }
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    const ARITH: &str = "
        S -> Expr
        Expr -> Expr Add_Op Term <|> Term
        Term -> Open_Paren Expr Close_Paren <|> Number
        Add_Op -> + <|> -
        Open_Paren -> (
        Close_Paren -> )
        Number -> _NUMBER_
        Opt -> Number <|>
    ";

    #[test]
    fn classify_symbols() {
        let g = Grammar::load(ARITH).unwrap();
        let sym = |name| g.symbol(name).unwrap();
        assert_eq!(g.class(sym("Expr")), SymbolClass::Nonterminal);
        assert_eq!(g.class(sym("Add_Op")), SymbolClass::Tag);
        assert_eq!(g.class(sym("+")), SymbolClass::Terminal);
        assert!(g.is_tag(sym("Number")));
        assert!(!g.is_tag(sym("Opt")));
        assert!(g.is_nullable(sym("Opt")));
        assert!(!g.is_nullable(sym("Expr")));
        assert_eq!(g.tags(), vec!["Add_Op", "Open_Paren", "Close_Paren", "Number"]);
        let alphabet: Vec<_> = g.alphabet().into_iter().collect();
        assert_eq!(alphabet, vec!["(", ")", "+", "-", "_NUMBER_"]);
    }

    #[test]
    fn canonical_round_trip() {
        let g = Grammar::load(ARITH).unwrap();
        let text = g.to_string();
        assert!(text.starts_with("S -> Expr\n"));
        assert!(text.contains("Opt -> Number <|> \n"));
        let again = Grammar::load(&text).unwrap();
        assert_eq!(again.to_string(), text);
        for (lhs, relhs) in g.nonterminals().iter().zip(again.nonterminals()) {
            let alts = |g: &Grammar, s: Symbol| g.rules_for(s).iter()
                .map(|id| g.rule_text(*id)).collect::<Vec<_>>();
            assert_eq!(alts(&g, *lhs), alts(&again, *relhs));
        }
    }

    #[test]
    fn start_goes_first() {
        let g = Grammar::load_with_start("A -> a\nB -> A b\n", "B").unwrap();
        assert_eq!(g.to_string(), "B -> A b\nA -> a\n");
    }

    #[test]
    fn rules_are_deduped() {
        let g = GrammarBuilder::default()
            .rule("S", &["a"])
            .rule("S", &["a"])
            .rule("S", &["b"])
            .into_grammar("S")
            .unwrap();
        assert_eq!(g.rules_for(g.start()).len(), 2);
    }

    #[test]
    fn load_errors() {
        assert_eq!(Grammar::load("S a b").unwrap_err(),
                   GrammarError::Malformed{line: 1, text: "S a b".to_string()});
        assert_eq!(Grammar::load("\n  -> a").unwrap_err(),
                   GrammarError::Malformed{line: 2, text: "-> a".to_string()});
        assert_eq!(Grammar::load("X Y -> a").unwrap_err(),
                   GrammarError::Malformed{line: 1, text: "X Y -> a".to_string()});
        assert_eq!(Grammar::load("A -> a").unwrap_err(),
                   GrammarError::MissingStart("S".to_string()));
        // a symbol only used on the right is not a start symbol
        assert_eq!(Grammar::load_with_start("A -> a", "a").unwrap_err(),
                   GrammarError::MissingStart("a".to_string()));
    }

    #[test]
    fn rule_lookup() {
        let g = Grammar::load(ARITH).unwrap();
        let id = g.find_rule("Term -> Open_Paren  Expr Close_Paren").unwrap();
        assert_eq!(g.rule_text(id), "Term -> Open_Paren Expr Close_Paren");
        let eps = g.find_rule("Opt ->").unwrap();
        assert_eq!(g.rule_text(eps), "Opt -> ");
        assert_eq!(g.find_rule("Term -> Expr"), None);
        assert_eq!(g.find_rule("Nope -> a"), None);
        assert_eq!(g.find_rule("no arrow"), None);
    }

    #[test]
    fn terminal_check() {
        let g = Grammar::load(ARITH).unwrap();
        assert_eq!(g.check_terminals(|t| t != "_NUMBER_"),
                   Err(GrammarError::UnknownSymbol("_NUMBER_".to_string())));
        assert_eq!(g.check_terminals(|_| true), Ok(()));
    }

    #[test]
    fn error_scores() {
        assert_eq!(RuleKind::Normal.error_score(), 0);
        assert_eq!(RuleKind::Error(1).error_score(), 1);
        assert!(RuleKind::Error(0).is_error());
        let mut b = GrammarBuilder::default();
        assert!(b.add_rule("S", &["a"], RuleKind::Normal));
        // same production, different kind, is a duplicate
        assert!(!b.add_rule("S", &["a"], RuleKind::Error(1)));
        assert!(b.defines("S"));
        assert!(!b.defines("a"));
    }
}
