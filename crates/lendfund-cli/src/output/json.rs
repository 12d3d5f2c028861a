use serde_json::Value;

/// Pretty-print a computation envelope as JSON on stdout.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}
