use std::process;

use parsnip::grammars::json::parse_json;

const INPUT: &str = r#"
{
    name: 'parsnip',
    flags: 0b1010,
    mask: 0xFF,
    threshold: 1_000.5,
    tags: ["parser", "combinator",],
}
"#;

const BROKEN: &str = r#"
{
    name: 'parsnip',
    flags: 0b1012,
}
"#;

fn main() -> anyhow::Result<()> {
    let value = parse_json(INPUT)?;
    println!("{value:#?}");

    match parse_json(BROKEN) {
        Ok(value) => {
            println!("unexpectedly parsed: {value:#?}");
            process::exit(-1);
        }
        Err(error) => {
            println!("{error}");
            println!("{}", error.marked);
        }
    }

    Ok(())
}
