use colored::Colorize;
use tokenstore_core::Token;

pub fn print_token(token: &Token) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(token)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_not_found(msg: &str) {
    println!("{} {}", "∅".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}
