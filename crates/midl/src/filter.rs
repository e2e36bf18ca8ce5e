//! Lexical filter
//!
//! Skips everything between tokens that carries no grammar: whitespace,
//! comments, `import` lines, preprocessor directives and `midl_pragma`
//! statements.
//!
//! Conditional compilation is handled crudely: the `#if` branch is kept and
//! any `#else` (or `#elif`) branch is dropped up to the next `#endif`. Nested
//! conditionals inside a dropped branch end at the first `#endif` seen, so
//! this is not a general preprocessor.

/// Words that discard the rest of their line when they start a token
const LINE_KEYWORDS: &[&str] = &["import", "importlib", "midl_pragma"];

/// Directives that discard the rest of their line
const LINE_DIRECTIVES: &[&str] = &["#define", "#include", "#if", "#endif", "#pragma", "#undef"];

/// Directives that open a dropped branch running to the next `#endif`
const BRANCH_DIRECTIVES: &[&str] = &["#else", "#elif"];

/// Byte order mark written by some Windows editors
const BOM: char = '\u{feff}';

/// Return the position of the next meaningful byte at or after `pos`.
pub fn skip_trivia(input: &str, mut pos: usize) -> usize {
    let bytes = input.as_bytes();
    loop {
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= bytes.len() {
            return pos;
        }

        let rest = &input[pos..];
        if rest.starts_with(BOM) {
            pos += BOM.len_utf8();
        } else if rest.starts_with("//") {
            pos = line_end(bytes, pos);
        } else if rest.starts_with("/*") {
            pos = match rest[2..].find("*/") {
                Some(i) => pos + 2 + i + 2,
                None => bytes.len(),
            };
        } else if bytes[pos] == b'#' {
            let word = directive_word(rest);
            if BRANCH_DIRECTIVES.contains(&word) {
                pos = skip_branch(input, pos);
            } else if LINE_DIRECTIVES.iter().any(|d| word.starts_with(d)) {
                pos = logical_line_end(bytes, pos);
            } else {
                return pos;
            }
        } else if LINE_KEYWORDS.contains(&leading_word(rest)) {
            pos = line_end(bytes, pos);
        } else {
            return pos;
        }
    }
}

/// `#word` at the start of `s`, including the hash
fn directive_word(s: &str) -> &str {
    let len = s[1..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    &s[..1 + len]
}

fn leading_word(s: &str) -> &str {
    let len = s
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    &s[..len]
}

fn line_end(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos] != b'\n' {
        pos += 1;
    }
    pos
}

/// End of a directive line, following `\` continuations
fn logical_line_end(bytes: &[u8], mut pos: usize) -> usize {
    loop {
        pos = line_end(bytes, pos);
        let continued = bytes[..pos]
            .iter()
            .rev()
            .find(|b| **b != b'\r')
            .is_some_and(|b| *b == b'\\');
        if continued && pos < bytes.len() {
            pos += 1;
        } else {
            return pos;
        }
    }
}

/// Skip from `#else` through the end of the line holding the next `#endif`.
/// Without a closing `#endif` the rest of the input is dropped.
fn skip_branch(input: &str, pos: usize) -> usize {
    let bytes = input.as_bytes();
    let mut line = line_end(bytes, pos);
    while line < bytes.len() {
        let start = line + 1;
        let text = input[start..].trim_start_matches([' ', '\t']);
        if text.starts_with("#endif") {
            return line_end(bytes, start);
        }
        line = line_end(bytes, start);
    }
    bytes.len()
}
