//! Ticker list parsing

use std::collections::HashSet;

/// Split free text into an ordered, deduplicated list of uppercase symbols.
///
/// Commas and newlines are interchangeable separators. Tokens are trimmed,
/// blank tokens are skipped and only the first occurrence of a symbol is kept.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    raw.split([',', '\n'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_uppercase)
        .filter(|symbol| seen.insert(symbol.clone()))
        .collect()
}
