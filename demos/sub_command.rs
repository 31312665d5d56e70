use flagstream::{Definition, Definitions, Parsed, Type};
use std::env;
use std::process;

fn parse_or_exit(definitions: &mut Definitions, tokens: &[String], chokes: &[&str]) -> Parsed {
    match definitions.parse(tokens, chokes) {
        Ok(parsed) => parsed,
        Err(error) => {
            eprintln!("Parse error: {error}");
            process::exit(1);
        }
    }
}

fn main() {
    let tokens: Vec<String> = env::args().skip(1).collect();

    let mut global = Definitions::default();
    global.insert("verbose", Definition::new(Type::Bool));
    global.insert("name", Definition::new(Type::String));
    global
        .alias("v", "verbose")
        .expect("'verbose' must be defined");

    let parsed = parse_or_exit(&mut global, &tokens, &["greet"]);
    let verbosity = global
        .get("verbose")
        .and_then(|d| d.run_count())
        .unwrap_or(0);
    let name = global
        .get("name")
        .and_then(|d| d.string_value())
        .unwrap_or("you")
        .to_string();
    println!("verbosity: {verbosity}");

    match parsed.choke_remainder() {
        Some(remainder) => {
            let mut greet = Definitions::default();
            greet.insert("loud", Definition::new(Type::Bool));
            // The choke itself leads the remainder.
            parse_or_exit(&mut greet, &remainder[1..], &[]);

            if greet.get("loud").and_then(|d| d.bool_value()) == Some(true) {
                println!("Hello, {}!", name.to_uppercase());
            } else {
                println!("Hello, {name}.");
            }
        }
        None => {
            println!("positionals: {:?}", parsed.positionals());
        }
    }
}
