use parsnip::{
    alt, bracket, literal, node_for_position, read1, read_to, rep, repsep, skip, BoxedParser,
    Driver, Options, ParseNode, Trail,
};

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Str(String),
    Num(i64),
    Call(String, Vec<i64>),
}

fn lexeme<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<T> {
    parser.skip(skip(" \t"))
}

fn number() -> BoxedParser<i64> {
    read1("0123456789")
        .try_map(|digits: String, _, _| {
            digits
                .parse::<i64>()
                .map_err(|_| "number out of range".to_string())
        })
        .named("number")
}

fn string_lit() -> BoxedParser<String> {
    literal("\"")
        .skip_left(read_to("\""))
        .skip(literal("\""))
        .named("string")
}

fn call() -> BoxedParser<(String, Vec<i64>)> {
    let name = read1("abcdefghijklmnopqrstuvwxyz");
    let args = repsep(lexeme(number()), lexeme(literal(",")), Trail::Disallow);
    name.seq(bracket(literal("("), args, literal(")"))).named("call")
}

fn expression() -> BoxedParser<Vec<Expr>> {
    let item = alt(vec![
        string_lit().map(Expr::Str),
        call().map(|(name, args)| Expr::Call(name, args)),
        number().map(Expr::Num),
    ]);
    rep(lexeme(item)).named("expression")
}

fn parse_tree(input: &str) -> ParseNode {
    Driver::with_options(
        expression(),
        Options {
            consume_all: true,
            ..Options::default()
        },
    )
    .parse_tree(input)
    .expect("input should parse")
}

#[test]
fn tree_query_returns_the_named_path() {
    // positions:          0123456789...
    let input = r#""foo" 22 bar(69, 72)"#;
    let root = parse_tree(input);

    let path = node_for_position(&root, 14, true);
    let labels: Vec<_> = path.iter().filter_map(|n| n.label()).collect();
    assert_eq!(labels, ["number", "call", "expression"]);

    let innermost = path[0];
    assert_eq!(innermost.value_as::<i64>(), Some(&69));
    assert_eq!(innermost.start, 13);
    assert_eq!(innermost.end, 15);
}

#[test]
fn tree_values_carry_the_parsed_results() {
    let root = parse_tree(r#""foo" 22 bar(69, 72)"#);
    let expression = &root.children[0];
    assert_eq!(expression.label(), Some("expression"));

    let labels: Vec<_> = expression
        .children
        .iter()
        .filter_map(|n| n.label())
        .collect();
    assert_eq!(labels, ["string", "number", "call"]);

    assert_eq!(
        expression.children[0].value_as::<String>(),
        Some(&"foo".to_string())
    );
    assert_eq!(expression.children[1].value_as::<i64>(), Some(&22));

    // inside the call, the sequencing of name and argument list is one
    // anonymous node whose result is the pair
    let call = &expression.children[2];
    let pair = &call.children[0];
    assert!(pair.label().is_none());
    assert_eq!(
        pair.value_as::<(String, Vec<i64>)>(),
        Some(&("bar".to_string(), vec![69, 72]))
    );
    let args: Vec<_> = pair.children.iter().map(|n| n.value_as::<i64>()).collect();
    assert_eq!(args, [Some(&69), Some(&72)]);
}

#[test]
fn bare_seq_opens_a_node_with_the_tuple_result() {
    // no .named(...) anywhere: the sequence itself must still produce a
    // node spanning both matches
    let parser = literal("a").seq(read1("0123456789").named("num"));
    let root = Driver::new(parser).parse_tree("a42").expect("should parse");

    assert_eq!(root.children.len(), 1);
    let seq_node = &root.children[0];
    assert!(seq_node.label().is_none());
    assert_eq!(seq_node.start, 0);
    assert_eq!(seq_node.end, 3);
    assert_eq!(
        seq_node.value_as::<(String, String)>(),
        Some(&("a".to_string(), "42".to_string()))
    );
    assert_eq!(seq_node.children.len(), 1);
    assert_eq!(seq_node.children[0].label(), Some("num"));

    // with named_only off, the anonymous sequence node is on the path
    let path = node_for_position(&root, 1, false);
    let labels: Vec<_> = path.iter().map(|n| n.label()).collect();
    assert_eq!(labels, [Some("num"), None, None]);
}

#[test]
fn failed_seq_discards_its_node() {
    let failing = literal("a").seq(read1("0123456789").named("num"));
    let whole = alt(vec![failing.map(|(a, _)| a), literal("ax")]);
    let root = Driver::new(whole).parse_tree("ax").expect("should parse");
    // the abandoned sequence (and the node it opened) leaves no trace
    assert!(root.children.is_empty());
}

#[test]
fn tree_spans_nest_within_their_parents() {
    fn assert_nested(node: &ParseNode) {
        assert!(node.start <= node.end);
        for child in &node.children {
            assert!(child.start >= node.start);
            assert!(child.end <= node.end);
            assert_nested(child);
        }
    }
    let root = parse_tree(r#""foo" 22 bar(69, 72)"#);
    assert_nested(&root);
}

#[test]
fn unnamed_path_includes_the_root() {
    let root = parse_tree("7");
    let path = node_for_position(&root, 0, false);
    // number, expression, then the anonymous root
    assert_eq!(path.len(), 3);
    assert!(path[2].label().is_none());
}

#[test]
fn failed_alternatives_leave_no_phantom_nodes() {
    // "22" first parses as a number inside a call attempt that fails at
    // the missing parenthesis; the surviving tree must only contain the
    // final interpretation
    let item = alt(vec![
        number()
            .skip(literal("!"))
            .map(|n| n.to_string())
            .named("shouted"),
        number().map(|n| n.to_string()),
    ]);
    let root = Driver::new(item)
        .parse_tree("22")
        .expect("second alternative matches");

    let labels: Vec<_> = root.children.iter().filter_map(|n| n.label()).collect();
    assert_eq!(labels, ["number"]);
    assert!(root.children[0].children.is_empty());
}

#[test]
fn non_tree_parses_build_no_nodes() {
    let driver = Driver::new(expression());
    assert!(driver.parse(r#""foo" 22"#).is_ok());
}
