use parsnip::grammars::json::{json, parse_json, Value};

fn object_keys(value: &Value) -> Vec<String> {
    value
        .as_object()
        .expect("expected an object")
        .keys()
        .cloned()
        .collect()
}

#[test]
fn mixed_radix_object() {
    let value = parse_json(r#"{"a": 0xFF, b: -0b1010, "c": [1, 2, "x"]}"#).expect("parses");

    assert_eq!(value.get("a").and_then(Value::as_i64), Some(255));
    assert_eq!(value.get("b").and_then(Value::as_i64), Some(-10));
    let c = value.get("c").and_then(Value::as_array).expect("array");
    assert_eq!(c[0].as_i64(), Some(1));
    assert_eq!(c[1].as_i64(), Some(2));
    assert_eq!(c[2].as_str(), Some("x"));
}

#[test]
fn object_preserves_key_order() {
    let value = parse_json(r#"{z: 1, a: 2, m: 3}"#).expect("parses");
    assert_eq!(object_keys(&value), ["z", "a", "m"]);
}

#[test]
fn scalars() {
    assert_eq!(parse_json("null").expect("parses"), Value::Null);
    assert_eq!(parse_json("true").expect("parses"), Value::Bool(true));
    assert_eq!(parse_json("false").expect("parses"), Value::Bool(false));
    assert_eq!(parse_json("42").expect("parses"), Value::Int(42));
    assert_eq!(parse_json("-7").expect("parses"), Value::Int(-7));
    assert_eq!(parse_json("+7").expect("parses"), Value::Int(7));
}

#[test]
fn keywords_do_not_swallow_identifiers() {
    assert!(parse_json("nullx").is_err());
    assert!(parse_json("truey").is_err());
}

#[test]
fn radix_literals() {
    assert_eq!(parse_json("0x10").expect("parses"), Value::Int(16));
    assert_eq!(parse_json("0X10").expect("parses"), Value::Int(16));
    assert_eq!(parse_json("0b110").expect("parses"), Value::Int(6));
    assert_eq!(parse_json("0o17").expect("parses"), Value::Int(15));
    assert_eq!(parse_json("-0x0A").expect("parses"), Value::Int(-10));
}

#[test]
fn underscore_separators() {
    assert_eq!(parse_json("1_000_000").expect("parses"), Value::Int(1_000_000));
    assert_eq!(parse_json("0xFF_FF").expect("parses"), Value::Int(0xFFFF));
    assert_eq!(parse_json("1_0.5").expect("parses"), Value::Float(10.5));
}

#[test]
fn floats_and_exponents() {
    assert_eq!(parse_json("1.5").expect("parses"), Value::Float(1.5));
    assert_eq!(parse_json("-2.25").expect("parses"), Value::Float(-2.25));
    assert_eq!(parse_json("1e3").expect("parses"), Value::Float(1000.0));
    assert_eq!(parse_json("2.5e-1").expect("parses"), Value::Float(0.25));
    assert_eq!(parse_json("4E+2").expect("parses"), Value::Float(400.0));
}

#[test]
fn double_and_single_quoted_strings() {
    assert_eq!(
        parse_json(r#""hello""#).expect("parses"),
        Value::Str("hello".to_string())
    );
    assert_eq!(
        parse_json("'hello'").expect("parses"),
        Value::Str("hello".to_string())
    );
    // the other quote is plain content
    assert_eq!(
        parse_json(r#""don't""#).expect("parses"),
        Value::Str("don't".to_string())
    );
}

#[test]
fn escape_sequences() {
    assert_eq!(
        parse_json(r#""a\tb\nc""#).expect("parses"),
        Value::Str("a\tb\nc".to_string())
    );
    assert_eq!(
        parse_json(r#""\x41B""#).expect("parses"),
        Value::Str("AB".to_string())
    );
    assert_eq!(
        parse_json(r#""quote: \" done""#).expect("parses"),
        Value::Str("quote: \" done".to_string())
    );
    assert_eq!(
        parse_json(r#"'it\'s'"#).expect("parses"),
        Value::Str("it's".to_string())
    );
    assert_eq!(
        parse_json(r#""é""#).expect("parses"),
        Value::Str("é".to_string())
    );
}

#[test]
fn unquoted_identifier_keys() {
    let value = parse_json("{foo_bar: 1, _x: 2}").expect("parses");
    assert_eq!(object_keys(&value), ["foo_bar", "_x"]);
    assert!(parse_json("{1abc: 1}").is_err());
}

#[test]
fn trailing_commas() {
    let value = parse_json("[1, 2, 3,]").expect("parses");
    assert_eq!(value.as_array().map(<[Value]>::len), Some(3));

    let value = parse_json("{a: 1, b: 2,}").expect("parses");
    assert_eq!(object_keys(&value), ["a", "b"]);
}

#[test]
fn nested_structures() {
    let value = parse_json(
        r#"
        {
            server: { host: 'localhost', ports: [80, 443] },
            retries: 3,
            backoff: [0.5, 1.0, 2.0],
        }
        "#,
    )
    .expect("parses");

    let server = value.get("server").expect("server");
    assert_eq!(
        server.get("host").and_then(Value::as_str),
        Some("localhost")
    );
    assert_eq!(
        server
            .get("ports")
            .and_then(Value::as_array)
            .map(<[Value]>::len),
        Some(2)
    );
    assert_eq!(value.get("retries").and_then(Value::as_i64), Some(3));
}

#[test]
fn empty_containers() {
    assert_eq!(parse_json("[]").expect("parses"), Value::Array(vec![]));
    assert!(parse_json("{}")
        .expect("parses")
        .as_object()
        .is_some_and(|o| o.is_empty()));
}

#[test]
fn whitespace_everywhere() {
    let value = parse_json(" [ 1 , 2 ] ").expect("parses");
    assert_eq!(value.as_array().map(<[Value]>::len), Some(2));
}

#[test]
fn errors_point_into_the_input() {
    // the reported failure may sit at the enclosing delimiter; the
    // deepest attempt is carried alongside it
    let error = parse_json("{a: }").expect_err("missing value");
    let deepest = error.latest.as_deref().map_or(error.position, |c| c.position);
    assert!(deepest >= 4);

    let error = parse_json("[1, 2").expect_err("unclosed array");
    let deepest = error.latest.as_deref().map_or(error.position, |c| c.position);
    assert!(deepest >= 4);

    assert!(parse_json("'unterminated").is_err());
    assert!(parse_json("").is_err());
}

#[test]
fn leftover_input_is_rejected() {
    let error = json().parse("1 2").expect_err("two values");
    assert_eq!(
        error.message,
        "expected to consume all input, but only 2 chars consumed"
    );
}

#[test]
fn values_render_back_to_parseable_text() {
    let value = parse_json(r#"{"a": 0xFF, b: [1, 2.5, 'x'], c: null}"#).expect("parses");
    let rendered = value.to_string();
    assert_eq!(rendered, r#"{"a": 255, "b": [1, 2.5, "x"], "c": null}"#);
    assert_eq!(parse_json(&rendered).expect("round-trips"), value);
}

#[test]
fn rendering_escapes_control_characters() {
    let value = parse_json(r#""a\tb\nc \"quoted\"""#).expect("parses");
    assert_eq!(value.to_string(), r#""a\tb\nc \"quoted\"""#);

    let whole = parse_json("2.0").expect("parses");
    // a whole float keeps its decimal point so it re-parses as a float
    assert_eq!(whole.to_string(), "2.0");
    assert_eq!(parse_json("2.0").expect("parses"), Value::Float(2.0));
}

#[test]
fn deeply_nested_arrays() {
    let value = parse_json("[[[[[1]]]]]").expect("parses");
    let mut current = &value;
    for _ in 0..5 {
        current = &current.as_array().expect("array")[0];
    }
    assert_eq!(current.as_i64(), Some(1));
}
