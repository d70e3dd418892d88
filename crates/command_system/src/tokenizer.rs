//! Quote-aware tokenization of raw command lines.
//!
//! The scanner is a small state machine: an accumulator buffer plus a flag
//! tracking whether the cursor sits inside a double-quoted span. Quotes are
//! delimiters that disappear from the output; a closing quote flushes the
//! accumulator immediately, while an opening quote retains it. Several games
//! of input depend on that exact shape, so it is pinned by the tests below
//! rather than cleaned up.

/// Splits a raw command line into ordered tokens.
///
/// Whitespace separates tokens outside quoted spans; inside a quoted span it
/// is accumulated verbatim. Every emitted token is non-empty after trimming,
/// so an empty or all-whitespace line yields an empty vector. An unterminated
/// quote at end of input flushes whatever was accumulated without erroring.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut buffer = String::new();
    let mut in_quotes = false;

    for c in raw.chars() {
        if c == '"' {
            if in_quotes {
                flush(&mut buffer, &mut tokens);
                in_quotes = false;
            } else {
                in_quotes = true;
            }
        } else if c.is_whitespace() && !in_quotes {
            flush(&mut buffer, &mut tokens);
        } else {
            buffer.push(c);
        }
    }

    flush(&mut buffer, &mut tokens);
    tokens
}

fn flush(buffer: &mut String, tokens: &mut Vec<String>) {
    let token = buffer.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
    buffer.clear();
}
