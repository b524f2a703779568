use parsnip::{
    alt, bracket, literal, read1, read1_to_or_end, read1_to_parser, rep, skip, BoxedParser, Driver,
    Options,
};

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Text(String),
    Slot(String),
}

/// template := (slot | text-before-slot | trailing-text)*
fn template() -> BoxedParser<Vec<Piece>> {
    let name = skip(" ") * read1("abcdefghijklmnopqrstuvwxyz_") - skip(" ");
    let slot = bracket(literal("{{"), name, literal("}}")).map(Piece::Slot);
    // scan forward to a brace that really opens a slot
    let before_slot = read1_to_parser("{", literal("{{")).map(Piece::Text);
    let trailing = read1_to_or_end("").map(Piece::Text);
    rep(alt(vec![slot, before_slot, trailing]))
}

fn pieces(input: &str) -> Vec<Piece> {
    Driver::with_options(
        template(),
        Options {
            consume_all: true,
            ..Options::default()
        },
    )
    .parse(input)
    .expect("template should parse")
}

fn text(s: &str) -> Piece {
    Piece::Text(s.to_string())
}

fn slot(s: &str) -> Piece {
    Piece::Slot(s.to_string())
}

#[test]
fn plain_text_is_one_piece() {
    assert_eq!(pieces("hello world"), vec![text("hello world")]);
}

#[test]
fn slots_split_the_text() {
    assert_eq!(
        pieces("hello {{ name }}, welcome to {{place}}!"),
        vec![
            text("hello "),
            slot("name"),
            text(", welcome to "),
            slot("place"),
            text("!"),
        ]
    );
}

#[test]
fn a_lone_brace_is_plain_text() {
    assert_eq!(
        pieces("a { b {{x}} c"),
        vec![text("a { b "), slot("x"), text(" c")]
    );
}

#[test]
fn adjacent_slots() {
    assert_eq!(pieces("{{a}}{{b}}"), vec![slot("a"), slot("b")]);
}

#[test]
fn empty_template() {
    assert_eq!(pieces(""), Vec::<Piece>::new());
}

#[test]
fn unclosed_slot_is_consumed_as_text() {
    // "{{oops" never closes, so nothing recognizes it as a slot
    assert_eq!(pieces("a {{oops"), vec![text("a "), text("{{oops")]);
}
