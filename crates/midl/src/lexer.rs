//! MIDL Lexer
//!
//! Tokenizes MIDL source after the lexical filter has removed comments and
//! preprocessor noise. Attribute names (`uuid`, `propget`, `in`, ...) are
//! context-dependent in MIDL and stay identifiers here; the parser decides
//! what they mean.

use crate::error::{MidlError, Result, Span};
use crate::filter;

/// Token types
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // Definition keywords
    Coclass,
    Dispinterface,
    Enum,
    Interface,
    Library,
    Struct,
    Typedef,
    Union,

    // Type keywords
    Boolean,
    Byte,
    Char,
    Double,
    Error_status_t,
    Float,
    Handle_t,
    Hyper,
    Int,
    Int8,
    Int16,
    Int32,
    Int3264,
    Int64,
    Long,
    Short,
    Signed,
    Small,
    Unsigned,
    Void,
    Wchar_t,

    // Identifiers and literals, kept as written
    Ident(String),
    Integer(String),
    HexInteger(String),
    Decimal(String),
    StringLiteral(String),
    UuidLiteral(String),

    // Punctuation
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    LParen,    // (
    RParen,    // )
    Comma,     // ,
    Semicolon, // ;
    Colon,     // :
    Star,      // *
    Equals,    // =
    Dot,       // .
    Minus,     // -
    Plus,      // +
    Slash,     // /

    // End of file
    Eof,
}

impl Token {
    pub fn is_keyword(s: &str) -> Option<Token> {
        match s {
            "boolean" => Some(Token::Boolean),
            "byte" => Some(Token::Byte),
            "char" => Some(Token::Char),
            "coclass" => Some(Token::Coclass),
            "dispinterface" => Some(Token::Dispinterface),
            "double" => Some(Token::Double),
            "enum" => Some(Token::Enum),
            "error_status_t" => Some(Token::Error_status_t),
            "float" => Some(Token::Float),
            "handle_t" => Some(Token::Handle_t),
            "hyper" => Some(Token::Hyper),
            "int" => Some(Token::Int),
            "__int8" => Some(Token::Int8),
            "__int16" => Some(Token::Int16),
            "__int32" => Some(Token::Int32),
            "__int3264" => Some(Token::Int3264),
            "__int64" => Some(Token::Int64),
            "interface" => Some(Token::Interface),
            "library" => Some(Token::Library),
            "long" => Some(Token::Long),
            "short" => Some(Token::Short),
            "signed" => Some(Token::Signed),
            "small" => Some(Token::Small),
            "struct" => Some(Token::Struct),
            "typedef" => Some(Token::Typedef),
            "union" => Some(Token::Union),
            "unsigned" => Some(Token::Unsigned),
            "void" => Some(Token::Void),
            "wchar_t" => Some(Token::Wchar_t),
            _ => None,
        }
    }

    /// Human-readable form used in "found ..." diagnostics
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier `{}`", s),
            Token::Integer(s) | Token::HexInteger(s) | Token::Decimal(s) => {
                format!("number `{}`", s)
            }
            Token::StringLiteral(s) => format!("string \"{}\"", s),
            Token::UuidLiteral(s) => format!("uuid `{}`", s),
            Token::Eof => "end of input".to_string(),
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Semicolon => "`;`".to_string(),
            Token::Colon => "`:`".to_string(),
            Token::Star => "`*`".to_string(),
            Token::Equals => "`=`".to_string(),
            Token::Dot => "`.`".to_string(),
            Token::Minus => "`-`".to_string(),
            Token::Plus => "`+`".to_string(),
            Token::Slash => "`/`".to_string(),
            keyword => format!("keyword `{:?}`", keyword).to_lowercase(),
        }
    }
}

/// A token with its source location
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer state
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<SpannedToken>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let is_eof = tok.token == Token::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<SpannedToken> {
        self.pos = filter::skip_trivia(self.input, self.pos);

        let start = self.pos;

        if self.pos >= self.bytes.len() {
            return Ok(SpannedToken {
                token: Token::Eof,
                span: Span::at(self.pos),
            });
        }

        if let Some(uuid) = self.bare_uuid() {
            self.pos += uuid.len();
            return Ok(SpannedToken {
                token: Token::UuidLiteral(uuid.to_string()),
                span: Span::new(start, self.pos),
            });
        }

        let ch = self.bytes[self.pos];

        let token = match ch {
            b'{' => { self.pos += 1; Token::LBrace }
            b'}' => { self.pos += 1; Token::RBrace }
            b'[' => { self.pos += 1; Token::LBracket }
            b']' => { self.pos += 1; Token::RBracket }
            b'(' => { self.pos += 1; Token::LParen }
            b')' => { self.pos += 1; Token::RParen }
            b',' => { self.pos += 1; Token::Comma }
            b';' => { self.pos += 1; Token::Semicolon }
            b':' => { self.pos += 1; Token::Colon }
            b'=' => { self.pos += 1; Token::Equals }
            b'*' => { self.pos += 1; Token::Star }
            b'.' => { self.pos += 1; Token::Dot }
            // Negative numbers are Minus followed by a number; the parser joins them
            b'-' => { self.pos += 1; Token::Minus }
            b'+' => { self.pos += 1; Token::Plus }
            b'/' => { self.pos += 1; Token::Slash }
            b'"' => return self.lex_string(),
            b'0'..=b'9' => return self.lex_number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => return self.lex_ident(),
            _ => {
                let found = self.input[self.pos..].chars().next().unwrap_or('?');
                return Err(MidlError::lexer(
                    self.input,
                    self.pos,
                    format!("unexpected character: {}", found),
                ));
            }
        };

        Ok(SpannedToken {
            token,
            span: Span::new(start, self.pos),
        })
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// An unquoted GUID such as `uuid(00020400-0000-0000-C000-000000000046)`
    fn bare_uuid(&self) -> Option<&'a str> {
        let candidate = self.input.get(self.pos..self.pos + 36)?;
        let boundary = self
            .bytes
            .get(self.pos + 36)
            .map_or(true, |b| !(b.is_ascii_alphanumeric() || *b == b'_'));
        (boundary && is_uuid_format(candidate)).then_some(candidate)
    }

    fn lex_ident(&mut self) -> Result<SpannedToken> {
        let start = self.pos;

        while self.pos < self.bytes.len() {
            let ch = self.bytes[self.pos];
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }

        let s = &self.input[start..self.pos];

        let token = if let Some(kw) = Token::is_keyword(s) {
            kw
        } else {
            Token::Ident(s.to_string())
        };

        Ok(SpannedToken {
            token,
            span: Span::new(start, self.pos),
        })
    }

    fn lex_number(&mut self) -> Result<SpannedToken> {
        let start = self.pos;

        let is_hex = self.bytes[self.pos] == b'0' && matches!(self.peek_at(1), Some(b'x' | b'X'));
        let token = if is_hex {
            self.pos += 2;
            let digits_start = self.pos;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_hexdigit() {
                self.pos += 1;
            }
            if self.pos == digits_start {
                return Err(MidlError::lexer(self.input, start, "invalid hex number"));
            }
            self.skip_integer_suffix();
            Token::HexInteger(self.input[start..self.pos].to_string())
        } else {
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            // `1.0` in version clauses
            if self.peek_at(0) == Some(b'.')
                && self.peek_at(1).is_some_and(|b| b.is_ascii_digit())
            {
                self.pos += 1;
                while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                    self.pos += 1;
                }
                Token::Decimal(self.input[start..self.pos].to_string())
            } else {
                self.skip_integer_suffix();
                Token::Integer(self.input[start..self.pos].to_string())
            }
        };

        Ok(SpannedToken {
            token,
            span: Span::new(start, self.pos),
        })
    }

    /// C integer suffixes (`L`, `U`, `UL`) are part of the literal text
    fn skip_integer_suffix(&mut self) {
        while matches!(self.peek_at(0), Some(b'u' | b'U' | b'l' | b'L')) {
            self.pos += 1;
        }
    }

    fn lex_string(&mut self) -> Result<SpannedToken> {
        let start = self.pos;
        self.pos += 1; // Skip opening quote

        let mut s = String::new();
        let mut chars = self.input[self.pos..].char_indices();
        let mut closed = false;
        while let Some((i, ch)) = chars.next() {
            match ch {
                '"' => {
                    self.pos += i + 1;
                    closed = true;
                    break;
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => s.push('\n'),
                    Some((_, 'r')) => s.push('\r'),
                    Some((_, 't')) => s.push('\t'),
                    Some((_, '\\')) => s.push('\\'),
                    Some((_, '"')) => s.push('"'),
                    Some((_, other)) => {
                        s.push('\\');
                        s.push(other);
                    }
                    None => break,
                },
                other => s.push(other),
            }
        }

        if !closed {
            return Err(MidlError::lexer(self.input, start, "unterminated string"));
        }

        let token = if is_uuid_format(&s) {
            Token::UuidLiteral(s)
        } else {
            Token::StringLiteral(s)
        };

        Ok(SpannedToken {
            token,
            span: Span::new(start, self.pos),
        })
    }
}

/// Check if a string looks like a UUID
fn is_uuid_format(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 5 {
        return false;
    }
    parts[0].len() == 8
        && parts[1].len() == 4
        && parts[2].len() == 4
        && parts[3].len() == 4
        && parts[4].len() == 12
        && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_keywords() {
        let toks = tokens("interface dispinterface coclass library typedef enum");
        assert_eq!(
            toks,
            vec![
                Token::Interface,
                Token::Dispinterface,
                Token::Coclass,
                Token::Library,
                Token::Typedef,
                Token::Enum,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_attribute_words_are_identifiers() {
        let toks = tokens("propget retval in");
        assert!(matches!(&toks[0], Token::Ident(s) if s == "propget"));
        assert!(matches!(&toks[1], Token::Ident(s) if s == "retval"));
        assert!(matches!(&toks[2], Token::Ident(s) if s == "in"));
    }

    #[test]
    fn test_numbers() {
        let toks = tokens("42 0x00FF -10 1.0 7L");
        assert_eq!(toks[0], Token::Integer("42".into()));
        assert_eq!(toks[1], Token::HexInteger("0x00FF".into()));
        assert_eq!(toks[2], Token::Minus);
        assert_eq!(toks[3], Token::Integer("10".into()));
        assert_eq!(toks[4], Token::Decimal("1.0".into()));
        assert_eq!(toks[5], Token::Integer("7L".into()));
    }

    #[test]
    fn test_uuids() {
        let toks = tokens(r#"5fb0c8a1-1234-4bcd-8e2f-00aa00bb00cc "00020400-0000-0000-C000-000000000046""#);
        assert_eq!(toks[0], Token::UuidLiteral("5fb0c8a1-1234-4bcd-8e2f-00aa00bb00cc".into()));
        assert_eq!(toks[1], Token::UuidLiteral("00020400-0000-0000-C000-000000000046".into()));
    }

    #[test]
    fn test_strings() {
        let toks = tokens(r#""Returns the \"count\"" "Größe""#);
        assert_eq!(toks[0], Token::StringLiteral("Returns the \"count\"".into()));
        assert_eq!(toks[1], Token::StringLiteral("Größe".into()));
        assert!(Lexer::new("\"open").tokenize().is_err());
    }

    #[test]
    fn test_punctuation() {
        let toks = tokens("{}[](),;:*=.+/");
        assert_eq!(
            toks,
            vec![
                Token::LBrace,
                Token::RBrace,
                Token::LBracket,
                Token::RBracket,
                Token::LParen,
                Token::RParen,
                Token::Comma,
                Token::Semicolon,
                Token::Colon,
                Token::Star,
                Token::Equals,
                Token::Dot,
                Token::Plus,
                Token::Slash,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_filtered_noise() {
        let input = "import \"unknwn.idl\";\n#include <x.h>\na // line\nb /* block */ c\n#else\nd\n#endif\n";
        let toks = tokens(input);
        assert_eq!(
            toks,
            vec![
                Token::Ident("a".into()),
                Token::Ident("b".into()),
                Token::Ident("c".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("a\n  @").tokenize().unwrap_err();
        assert!(matches!(err, MidlError::LexerError { line: 2, column: 3, .. }));
    }
}
