use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_IDENT:  Regex = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

const RUST_KEYWORDS: [&str; 51] = [
    "as", "break", "const", "continue", "crate", "else",
    "enum", "extern", "false", "fn", "for", "if", "impl",
    "in", "let", "loop", "match", "mod", "move", "mut",
    "pub", "ref", "return", "self", "Self", "static",
    "struct", "super", "trait", "true", "type", "unsafe",
    "use", "where", "while", "async", "await", "dyn",
    "abstract", "become", "box", "do", "final", "macro",
    "override", "priv", "typeof", "unsized", "virtual", "yield",
    "try",
];

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER.is_match(text)
}

/// Converts a schema name to PascalCase.
/// - Words are split on anything that is not a letter or digit.
/// - A fully uppercase word keeps only its first letter uppercase (`ADDR` -> `Addr`).
/// - Otherwise the casing after the first letter is preserved, so
///   `Array_of_WalletInfo` becomes `ArrayOfWalletInfo`.
pub fn to_pascal_case(s: &str) -> String {
    let cleaned = NON_IDENT.replace_all(s, "_");
    let pascal: String = cleaned
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    let rest = chars.as_str();
                    if word == word.to_uppercase() {
                        first.to_uppercase().to_string() + &rest.to_lowercase()
                    } else {
                        first.to_uppercase().to_string() + rest
                    }
                }
            }
        })
        .collect();
    lead_with_letter(pascal)
}

/// Converts a schema name to snake_case.
/// Underscores are not inserted between consecutive uppercase letters,
/// so that acronyms remain intact (e.g. "sessionID" becomes "session_id").
pub fn to_snake_case(s: &str) -> String {
    let cleaned = NON_IDENT.replace_all(s, "_");
    let chars: Vec<char> = cleaned.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                // Insert an underscore if the previous character is not uppercase,
                // or if the next character exists and is lowercase.
                let boundary = !prev.is_uppercase() || (i + 1 < chars.len() && chars[i + 1].is_lowercase());
                if boundary && prev != '_' {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    let trimmed = snake.trim_matches('_').to_string();
    lead_with_letter(trimmed)
}

fn lead_with_letter(ident: String) -> String {
    match ident.chars().next() {
        None                          => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", ident),
        Some(_)                       => ident,
    }
}

/// Escapes Rust reserved keywords by suffixing with an underscore.
pub fn escape_rust_keyword(s: &str) -> String {
    if RUST_KEYWORDS.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

/// Renders a schema description as `///` lines at the given indentation.
pub fn doc_comment(description: Option<&str>, indent: &str) -> String {
    let Some(text) = description.map(str::trim).filter(|text| !text.is_empty()) else {
        return String::new();
    };
    let mut out = String::new();
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            out.push_str(&format!("{}///\n", indent));
        } else {
            out.push_str(&format!("{}/// {}\n", indent, line));
        }
    }
    out
}
