use parsnip::{
    alt, bracket, literal, literal_of, read1, rep, skip, BoxedParser, Driver, LazyParser, Options,
};

fn lexeme<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<T> {
    parser.skip(skip(" \t"))
}

fn fold_ops((first, rest): (i64, Vec<(String, i64)>)) -> i64 {
    rest.into_iter().fold(first, |acc, (op, value)| match op.as_str() {
        "+" => acc + value,
        "-" => acc - value,
        "*" => acc * value,
        "/" => acc / value,
        _ => acc,
    })
}

/// expr   := term (("+" | "-") term)*
/// term   := factor (("*" | "/") factor)*
/// factor := number | "(" expr ")"
fn arithmetic() -> BoxedParser<i64> {
    let expr = LazyParser::new();

    let number = lexeme(read1("0123456789")).try_map(|digits: String, _, _| {
        digits
            .parse::<i64>()
            .map_err(|_| "number out of range".to_string())
    });
    let parens = bracket(
        lexeme(literal("(")),
        expr.parser(),
        lexeme(literal(")")),
    );
    let factor = alt(vec![number, parens]);

    let term = factor
        .clone()
        .seq(rep(lexeme(literal_of(&["*", "/"])).seq(factor)))
        .map(fold_ops);
    let sum = term
        .clone()
        .seq(rep(lexeme(literal_of(&["+", "-"])).seq(term)))
        .map(fold_ops);

    expr.define(sum);
    expr.parser()
}

fn eval(input: &str) -> Result<i64, parsnip::ParseError> {
    Driver::with_options(
        arithmetic(),
        Options {
            trim: true,
            consume_all: true,
            ..Options::default()
        },
    )
    .parse(input)
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(eval("2 + 3 * 4").expect("parses"), 14);
}

#[test]
fn single_number() {
    assert_eq!(eval("42").expect("parses"), 42);
    assert_eq!(eval("  7 ").expect("parses"), 7);
}

#[test]
fn left_associativity() {
    assert_eq!(eval("10 - 3 - 2").expect("parses"), 5);
    assert_eq!(eval("16 / 2 / 2").expect("parses"), 4);
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(eval("(2 + 3) * 4").expect("parses"), 20);
    assert_eq!(eval("((2)) * (1 + 1)").expect("parses"), 4);
}

#[test]
fn mixed_expression() {
    assert_eq!(eval("1 + 2 * 3 - 4 / 2").expect("parses"), 5);
}

#[test]
fn dangling_operator_is_unconsumed_input() {
    let error = eval("2 +").expect_err("incomplete");
    assert_eq!(error.position, 2);
}

#[test]
fn unbalanced_parenthesis_fails() {
    assert!(eval("(2 + 3").is_err());
    assert!(eval("2 + 3)").is_err());
}
