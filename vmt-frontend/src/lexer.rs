//! Line cleaning and tokenizing for VM source
//!
//! VM source is line oriented: one instruction per line, `//` starts a
//! comment, tokens are separated by whitespace.

/// Strip a trailing `//` comment and surrounding whitespace
pub fn clean_line(line: &str) -> &str {
    let line = match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    };
    line.trim()
}

/// Split a cleaned line into whitespace separated tokens
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Check that a name can be used as a target-machine symbol.
///
/// Symbols are letters, digits, `_`, `.`, `$` and `:`, and may not start
/// with a digit.
pub fn is_valid_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if !first.is_ascii_digit() && is_symbol_char(first) => {
            chars.all(is_symbol_char)
        }
        _ => false,
    }
}

fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '$' | ':')
}
