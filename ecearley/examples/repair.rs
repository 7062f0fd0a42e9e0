fn main() {
    // A sliver of Python: assignments and argument-less defs
    let grammar = ecearley::ErrorGrammar::load("
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
    ").unwrap();

    let source = std::env::args().nth(1)
        .unwrap_or_else(|| "def f()\n    x = (1 + y\n".to_string());
    let tokens = ecearley::tokenize_for(&source, &grammar);
    println!("{}", tokens.canonical());

    let parse = ecearley::ErrorEarleyParser::new(&grammar, ecearley::ParserConfig::default())
        .parse(&tokens.terminals)
        .unwrap();
    match parse.derivation() {
        Some(derivation) => {
            println!("cost: {}", derivation.cost);
            for repair in &derivation.repairs {
                println!("{:?}", repair);
            }
            print!("{}", derivation.tree);
        },
        None => println!("no parse"),
    }
}
