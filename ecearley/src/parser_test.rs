#![deny(warnings)]

use crate::{
    has_parse, parse_tree, program_has_parse, tokenize_for,
    Additive, ErrorEarleyParser, ErrorGrammar, ErrorGrammarConfig, Grammar,
    ParseError, ParserConfig, Repair, Tree,
};
use proptest::prelude::*;
use rstest::rstest;
use std::time::Duration;

fn error_grammar(text: &str, tags: &[&str], terminals: &[&str]) -> ErrorGrammar {
    let base = Grammar::load(text).expect("Bad grammar");
    ErrorGrammar::new(&base, &ErrorGrammarConfig::for_tags(tags, terminals)).expect("Bad grammar")
}

// S -> A, A -> a
fn grammar_tiny() -> ErrorGrammar {
    error_grammar("S -> A\nA -> a\n", &["A"], &["a", "b"])
}

fn grammar_arith() -> ErrorGrammar {
    error_grammar("
        S -> Expr Newline
        Expr -> Expr Add_Op Term <|> Term
        Term -> Open_Paren Expr Close_Paren <|> Number
        Add_Op -> + <|> -
        Open_Paren -> (
        Close_Paren -> )
        Number -> _NUMBER_
        Newline -> _NEWLINE_
    ", &["Add_Op", "Open_Paren", "Close_Paren", "Number"], &["+", "-", "(", ")", "_NUMBER_"])
}

const PYTHONISH: &str = "
    S -> Stmts Endmarker
    Stmts -> Stmt Stmts <|> Stmt
    Stmt -> Simple_Name Assign_Op Expr Newline <|> Def_Keyword Simple_Name Open_Paren Close_Paren Colon Newline Indent Stmts Dedent
    Expr -> Expr Arith_Op Atom <|> Atom
    Atom -> Simple_Name <|> Literals <|> Open_Paren Expr Close_Paren
    Simple_Name -> _NAME_
    Literals -> _NUMBER_ <|> _STRING_
    Assign_Op -> =
    Arith_Op -> + <|> -
    Def_Keyword -> def
    Open_Paren -> (
    Close_Paren -> )
    Colon -> :
    Newline -> _NEWLINE_
    Indent -> _INDENT_
    Dedent -> _DEDENT_
    Endmarker -> _ENDMARKER_
";

fn words(input: &str) -> Vec<&str> {
    input.split_whitespace().collect()
}

fn cost(grammar: &ErrorGrammar, input: &str, max_cost: u32) -> Option<u32> {
    let config = ParserConfig::default().with_max_cost(max_cost);
    ErrorEarleyParser::new(grammar, config).parse(words(input)).unwrap().cost()
}

fn node(label: &str, children: Vec<Tree>) -> Tree {
    Tree::Node(label.to_string(), children)
}

fn leaf(label: &str, token: &str) -> Tree {
    Tree::Leaf(label.to_string(), token.to_string())
}

///////////////////////////////////////////////////////////////////////////////

#[rstest]
#[case::exact("a", 8, Some(0))]
#[case::missing("", 8, Some(1))]
#[case::missing_within_one("", 1, Some(1))]
#[case::substitution("b", 1, Some(1))]
#[case::no_budget("b", 0, None)]
#[case::trailing_token("a a", 8, Some(1))]
#[case::two_substitutions("b b", 8, Some(2))]
#[case::two_over_budget("b b", 1, None)]
fn minimal_repair(#[case] input: &str, #[case] max_cost: u32, #[case] expected: Option<u32>) {
    assert_eq!(cost(&grammar_tiny(), input, max_cost), expected);
}

#[test]
fn substitution_tree() {
    let grammar = grammar_tiny();
    let parse = ErrorEarleyParser::new(&grammar, ParserConfig::default()).parse(["b"]).unwrap();
    assert!(parse.has_parse());
    assert_eq!(parse.tree().unwrap(), node("S'", vec![
        node("S", vec![node("Err_A", vec![leaf("Err_Tag", "b")])]),
    ]));
    let derivation = parse.derivation().unwrap();
    assert_eq!(derivation.cost, 1);
    assert_eq!(derivation.error_rules, vec!["S -> Err_A", "Err_A -> Err_Tag", "Err_Tag -> b"]);
    assert_eq!(derivation.repairs, vec![
        Repair::Replace{at: 0, found: "b".to_string(), expected: "A".to_string()},
    ]);
}

#[test]
fn missing_token() {
    let grammar = grammar_tiny();
    let parse = ErrorEarleyParser::new(&grammar, ParserConfig::default())
        .parse(Vec::<String>::new())
        .unwrap();
    let derivation = parse.derivation().unwrap();
    assert_eq!(derivation.tree, node("S'", vec![
        node("S", vec![node("Err_A", vec![node("Err_Tag", vec![])])]),
    ]));
    assert!(derivation.tree.leaves().is_empty());
    assert_eq!(derivation.error_rules, vec!["S -> Err_A", "Err_A -> Err_Tag", "Err_Tag -> "]);
    assert_eq!(derivation.repairs, vec![Repair::Insert{at: 0, expected: "A".to_string()}]);
}

#[test]
fn extra_token() {
    let grammar = grammar_tiny();
    let parse = ErrorEarleyParser::new(&grammar, ParserConfig::default()).parse(["a", "a"]).unwrap();
    let derivation = parse.derivation().unwrap();
    assert_eq!(derivation.cost, 1);
    assert_eq!(derivation.tree.leaves(), vec!["a", "a"]);
    assert!(matches!(derivation.repairs.as_slice(), [Repair::Delete{found, ..}] if found == "a"));
}

#[test]
fn ties_resolve_the_same_way() {
    // "a a" has several cost 1 derivations, each run must pick the same one
    let runs: Vec<_> = (0..3)
        .map(|_| {
            let grammar = grammar_tiny();
            let parse = ErrorEarleyParser::new(&grammar, ParserConfig::default())
                .parse(["a", "a"])
                .unwrap();
            (parse.derivation().unwrap(), parse.chart().to_string())
        })
        .collect();
    assert_eq!(runs[0].0.cost, 1);
    assert!(runs.iter().all(|run| *run == runs[0]));

    let grammar = grammar_arith();
    let input = words("( _NUMBER_ + _NUMBER_ _NEWLINE_");
    let parser = ErrorEarleyParser::new(&grammar, ParserConfig::default());
    let first = parser.parse(&input).unwrap().derivation();
    assert!(first.is_some());
    assert_eq!(parser.parse(&input).unwrap().derivation(), first);
}

#[test]
fn no_parse_is_not_an_error() {
    let grammar = grammar_tiny();
    let config = ParserConfig::default().with_max_cost(0);
    let parse = ErrorEarleyParser::new(&grammar, config.clone()).parse(["b"]).unwrap();
    assert!(!parse.has_parse());
    assert_eq!(parse.cost(), None);
    assert_eq!(parse.tree(), None);
    assert_eq!(parse.derivation(), None);
    assert_eq!(has_parse(["b"], &grammar, &config), Ok(false));
    assert_eq!(parse_tree(["b"], &grammar, &config), Ok(None));
    // unknown tokens can't even be substituted
    assert_eq!(has_parse(["zzz"], &grammar, &ParserConfig::default()), Ok(false));
}

#[test]
fn base_sentences_cost_nothing() {
    let input = words("_NUMBER_ + ( _NUMBER_ - _NUMBER_ ) _NEWLINE_");
    let grammar = grammar_arith();
    let mut plain = grammar.clone();
    assert_eq!(plain.update_active_rules::<&str>(&[]), 0);

    let config = ParserConfig::default();
    let corrected = ErrorEarleyParser::new(&grammar, config.clone()).parse(&input).unwrap();
    let baseline = ErrorEarleyParser::new(&plain, config).parse(&input).unwrap();
    assert_eq!(corrected.cost(), Some(0));
    assert_eq!(baseline.cost(), Some(0));
    let tree = corrected.tree().unwrap();
    assert_eq!(tree.leaves(), input);
    assert_eq!(Some(tree), baseline.tree());
    assert!(corrected.derivation().unwrap().error_rules.is_empty());
}

#[test]
fn error_rules_off_means_no_repair() {
    let mut grammar = grammar_arith();
    grammar.update_active_rules::<&str>(&[]);
    assert_eq!(cost(&grammar, "_NUMBER_ + _NEWLINE_", 8), None);
    grammar.activate_all();
    assert_eq!(cost(&grammar, "_NUMBER_ + _NEWLINE_", 8), Some(1));
    // only deletions allowed, the dangling operator goes away
    grammar.update_active_rules(&["Term -> Err_Open_Paren Expr Err_Close_Paren", "S' -> S InsertErr", "InsertErr -> +"]);
    assert_eq!(cost(&grammar, "_NUMBER_ _NEWLINE_ +", 8), Some(1));
    assert_eq!(cost(&grammar, "_NUMBER_ + _NEWLINE_", 8), None);
}

#[test]
fn true_positives_are_free() {
    // both tags get rewritten together, only the wrong one costs
    let grammar = error_grammar("S -> A B\nA -> a\nB -> b\n", &["A", "B"], &["a", "b", "c"]);
    assert_eq!(cost(&grammar, "a c", 8), Some(1));
    let additive = ErrorEarleyParser::with_policy(&grammar, ParserConfig::default(), Additive);
    assert_eq!(additive.parse(["a", "c"]).unwrap().cost(), Some(2));

    let derivation = ErrorEarleyParser::new(&grammar, ParserConfig::default())
        .parse(["a", "c"])
        .unwrap()
        .derivation()
        .unwrap();
    assert_eq!(derivation.error_rules, vec![
        "S -> Err_A Err_B", "Err_A -> Err_Tag", "Err_Tag -> a", "Err_B -> Err_Tag", "Err_Tag -> c",
    ]);
    assert_eq!(derivation.repairs, vec![
        Repair::Replace{at: 1, found: "c".to_string(), expected: "B".to_string()},
    ]);
}

#[test]
fn used_rules_are_enough() {
    let mut grammar = grammar_arith();
    let input = words("( _NUMBER_ + _NUMBER_ _NEWLINE_");
    let derivation = ErrorEarleyParser::new(&grammar, ParserConfig::default())
        .parse(&input)
        .unwrap()
        .derivation()
        .unwrap();
    // either drop the paren or close it
    assert_eq!(derivation.cost, 1);
    assert_eq!(derivation.repairs.len(), 1);
    let active = grammar.update_active_rules(&derivation.error_rules);
    assert!(active < grammar.error_rules().len());
    assert_eq!(cost(&grammar, "( _NUMBER_ + _NUMBER_ _NEWLINE_", 8), Some(1));
}

#[test]
fn chart_limit() {
    let grammar = grammar_tiny();
    let config = ParserConfig::default().with_max_states(3);
    let err = ErrorEarleyParser::new(&grammar, config).parse(["b"]).unwrap_err();
    assert_eq!(err, ParseError::ChartLimit{limit: 3});
}

#[test]
fn time_limit() {
    let grammar = grammar_arith();
    let mut input = vec!["_NUMBER_"];
    for _ in 0..100 {
        input.extend(["+", "_NUMBER_"]);
    }
    input.push("_NEWLINE_");
    let config = ParserConfig::default().with_time_limit(Duration::ZERO);
    let err = ErrorEarleyParser::new(&grammar, config).parse(&input).unwrap_err();
    assert_eq!(err, ParseError::Timeout{limit: Duration::ZERO});
    // no limits, no errors
    assert_eq!(cost(&grammar, &input.join(" "), 8), Some(0));
}

#[test]
fn config_from_json() {
    let config: ParserConfig = serde_json::from_str(r#"{"max_cost": 0}"#).unwrap();
    let grammar = grammar_tiny();
    assert_eq!(has_parse(["b"], &grammar, &config), Ok(false));
    let config: ParserConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(has_parse(["b"], &grammar, &config), Ok(true));
}

#[test]
fn python_source() {
    let grammar = ErrorGrammar::load(PYTHONISH).unwrap();
    let config = ParserConfig::default();

    let tokens = tokenize_for("x = 1 + y\n", &grammar);
    let tree = parse_tree(&tokens.terminals, &grammar, &config).unwrap().unwrap();
    assert_eq!(tree.leaves(), vec!["_NAME_", "=", "_NUMBER_", "+", "_NAME_", "_NEWLINE_", "_ENDMARKER_"]);

    // missing colon
    let tokens = tokenize_for("def f()\n    x = 1\n", &grammar);
    let parse = ErrorEarleyParser::new(&grammar, config.clone()).parse(&tokens.terminals).unwrap();
    let derivation = parse.derivation().unwrap();
    assert_eq!(derivation.cost, 1);
    assert_eq!(derivation.repairs, vec![Repair::Insert{at: 4, expected: "Colon".to_string()}]);
}

#[test]
fn python_programs() {
    let grammar = ErrorGrammar::load(PYTHONISH).unwrap();
    let strict = ParserConfig::default().with_max_cost(0);
    let good = "def f():\n    x = 1\ndef g():\n    y = (2 - x)\n";
    let bad = "def f():\n    x = 1\ndef g()\n    y = 2\n";
    assert_eq!(program_has_parse(good, &grammar, &strict), Ok(true));
    assert_eq!(program_has_parse(bad, &grammar, &strict), Ok(false));
    assert_eq!(program_has_parse(bad, &grammar, &ParserConfig::default()), Ok(true));
}

proptest! {
    #[test]
    fn raising_budget_keeps_cost(input in prop::collection::vec(prop::sample::select(vec!["a", "b"]), 0..4)) {
        let grammar = grammar_tiny();
        let input = input.join(" ");
        let low = cost(&grammar, &input, 1);
        let high = cost(&grammar, &input, 3);
        if let Some(found) = low {
            prop_assert_eq!(high, Some(found));
        }
        if let Some(found) = high.filter(|c| *c <= 1) {
            prop_assert_eq!(low, Some(found));
        }
    }

    #[test]
    fn tree_covers_input(input in prop::collection::vec(
            prop::sample::select(vec!["_NUMBER_", "+", "(", ")"]), 0..5)) {
        let grammar = grammar_arith();
        let mut input = input;
        input.push("_NEWLINE_");
        let parse = ErrorEarleyParser::new(&grammar, ParserConfig::default().with_max_cost(3))
            .parse(&input)
            .unwrap();
        if let Some(derivation) = parse.derivation() {
            // deleted tokens are still leaves, inserted ones are not
            prop_assert_eq!(derivation.tree.leaves(), input);
            prop_assert!(derivation.repairs.len() as u32 <= derivation.cost);
        }
    }
}
