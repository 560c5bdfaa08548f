//! End-to-end JSON tokenizer + grammar, exercised as an integration test.
//! Token patterns are grounded on the crate's own JSON example tokenizer
//! (number/string/const patterns); this is a fixture, not a shipped feature.

use lexyacc::{ConfigErrorKind, Engine, LexerBuilder, NodeValue, ParserBuilder, Token};

#[derive(Debug, Clone, PartialEq)]
enum Json {
    Epsilon,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Json>),
    Array(Vec<Json>),
}

impl NodeValue for Json {
    fn epsilon() -> Self {
        Json::Epsilon
    }
    fn from_token(token: &Token) -> Self {
        match token.ty.as_str() {
            "NUMBER" => Json::Number(token.value.parse().unwrap()),
            "STRING" => Json::Str(token.value[1..token.value.len() - 1].to_string()),
            "CONSTANT" => match token.value.as_str() {
                "true" => Json::Bool(true),
                "false" => Json::Bool(false),
                "null" => Json::Null,
                other => panic!("unexpected constant {:?}", other),
            },
            // Punctuation atoms (brackets, comma) are matched structurally
            // but never read back by an action.
            _ => Json::Epsilon,
        }
    }
}

fn build_lexer() -> lexyacc::Lexer {
    LexerBuilder::new()
        .tokens(["NUMBER", "STRING", "CONSTANT", "LBRACKET", "RBRACKET", "COMMA"])
        .ignore_rule(None, r"^\s+", None)
        .token_rule(None, "STRING", r#"^"([^"\\\r\n]|\\.)*""#, None, |t, _| Some(t.clone()))
        .token_rule(
            None,
            "NUMBER",
            r"^[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?",
            None,
            |t, _| Some(t.clone()),
        )
        .token_rule(None, "CONSTANT", r"^(true|false|null)", None, |t, _| Some(t.clone()))
        .token_rule(None, "LBRACKET", r"^\[", None, |t, _| Some(t.clone()))
        .token_rule(None, "RBRACKET", r"^\]", None, |t, _| Some(t.clone()))
        .token_rule(None, "COMMA", r"^,", None, |t, _| Some(t.clone()))
        .error_rule(None, |e, lexer| {
            lexer.skip(1);
            Some(e.clone())
        })
        .build()
        .unwrap()
}

fn build_parser(engine: Engine) -> lexyacc::Parser<Json> {
    ParserBuilder::<Json>::new()
        .engine(engine)
        .tokens(["NUMBER", "STRING", "CONSTANT", "LBRACKET", "RBRACKET", "COMMA"])
        .production("ARRAY", "LBRACKET ELEMENTS RBRACKET", |children: &mut Vec<Json>| {
            children[0] = match &children[2] {
                Json::List(items) => Json::Array(items.clone()),
                _ => Json::Array(Vec::new()),
            };
        })
        .production("ARRAY", "LBRACKET RBRACKET", |children: &mut Vec<Json>| {
            children[0] = Json::Array(Vec::new());
        })
        .production("ELEMENTS", "VALUE COMMA ELEMENTS", |children: &mut Vec<Json>| {
            let mut items = vec![children[1].clone()];
            if let Json::List(rest) = &children[3] {
                items.extend(rest.clone());
            }
            children[0] = Json::List(items);
        })
        .production("ELEMENTS", "VALUE", |children: &mut Vec<Json>| {
            children[0] = Json::List(vec![children[1].clone()]);
        })
        .production("VALUE", "NUMBER", |children: &mut Vec<Json>| {
            children[0] = children[1].clone();
        })
        .production("VALUE", "STRING", |children: &mut Vec<Json>| {
            children[0] = children[1].clone();
        })
        .production("VALUE", "CONSTANT", |children: &mut Vec<Json>| {
            children[0] = children[1].clone();
        })
        .production("VALUE", "ARRAY", |children: &mut Vec<Json>| {
            children[0] = children[1].clone();
        })
        .build()
        .unwrap()
}

#[test]
fn lexes_numbers_strings_and_constants_in_order() {
    let mut lexer = build_lexer();
    lexer.input(r#"true, null , 42, 3.14, "hi""#);
    let tokens = lexyacc::TokenStream::new(&mut lexer).collect_tokens().unwrap();
    let shapes: Vec<(&str, &str)> = tokens.iter().map(|t| (t.ty.as_str(), t.value.as_str())).collect();
    assert_eq!(
        shapes,
        vec![
            ("CONSTANT", "true"),
            ("COMMA", ","),
            ("CONSTANT", "null"),
            ("COMMA", ","),
            ("NUMBER", "42"),
            ("COMMA", ","),
            ("NUMBER", "3.14"),
            ("COMMA", ","),
            ("STRING", "\"hi\""),
        ]
    );
}

#[test]
fn parses_array_of_three_values_with_recursive_descent() {
    let mut lexer = build_lexer();
    lexer.input(r#"[1, "x", true]"#);
    let tokens = lexyacc::TokenStream::new(&mut lexer).collect_tokens().unwrap();

    let parser = build_parser(Engine::RecursiveDescent);
    let tree = parser.parse(&tokens).unwrap();

    match tree {
        Json::Array(items) => {
            assert_eq!(items.len(), 3);
            assert_eq!(items[0], Json::Number(1.0));
            assert_eq!(items[1], Json::Str("x".to_string()));
            assert_eq!(items[2], Json::Bool(true));
        }
        other => panic!("expected an array, got {:?}", other),
    }
}

#[test]
fn earley_and_recursive_descent_agree_on_an_unambiguous_grammar() {
    let mut lexer = build_lexer();
    lexer.input(r#"[1, 2, 3]"#);
    let tokens = lexyacc::TokenStream::new(&mut lexer).collect_tokens().unwrap();

    let rd_tree = build_parser(Engine::RecursiveDescent).parse(&tokens).unwrap();
    let earley_tree = build_parser(Engine::Earley).parse(&tokens).unwrap();
    assert_eq!(rd_tree, earley_tree);
}

#[test]
fn error_rule_skip_recovers_and_yields_error_then_token() {
    let mut lexer = build_lexer();
    lexer.input("@true");
    let items = lexer.tokens().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_error());
    match &items[1] {
        lexyacc::LexItem::Token(t) => assert_eq!(t.value, "true"),
        lexyacc::LexItem::Error(_) => panic!("expected a token as the second item"),
    }
}

#[test]
fn left_recursive_grammar_is_rejected_by_recursive_descent_but_accepted_by_earley() {
    #[derive(Debug, Clone, PartialEq)]
    enum Expr {
        Epsilon,
        Leaf,
        Sum,
    }
    impl NodeValue for Expr {
        fn epsilon() -> Self {
            Expr::Epsilon
        }
        fn from_token(_: &Token) -> Self {
            Expr::Leaf
        }
    }

    let rd_err = ParserBuilder::<Expr>::new()
        .engine(Engine::RecursiveDescent)
        .tokens(["PLUS", "N"])
        .production("E", "E PLUS E | N", |_: &mut Vec<Expr>| {})
        .build()
        .unwrap_err();
    assert_eq!(rd_err.kind, ConfigErrorKind::LeftRecursive);

    let earley_parser = ParserBuilder::<Expr>::new()
        .engine(Engine::Earley)
        .tokens(["PLUS", "N"])
        .production("E", "E PLUS E", |children: &mut Vec<Expr>| {
            children[0] = Expr::Sum;
        })
        .production("E", "N", |children: &mut Vec<Expr>| {
            children[0] = children[1].clone();
        })
        .build()
        .unwrap();

    let tokens = vec![
        Token::new("N", "n", 0, 1),
        Token::new("PLUS", "+", 1, 1),
        Token::new("N", "n", 2, 1),
        Token::new("PLUS", "+", 3, 1),
        Token::new("N", "n", 4, 1),
    ];
    let tree = earley_parser.parse(&tokens).unwrap();
    assert_eq!(tree, Expr::Sum);
}
