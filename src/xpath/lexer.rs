//! Locator expression lexer.
//!
//! Splits a locator string into the token stream the recursive descent
//! parser consumes. The grammar this engine accepts has no namespace
//! prefixes and no variable references, so a lone colon never separates
//! anything and `$` is not recognized at all.

/// One lexical unit of a locator expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Slash,
    SlashSlash,
    Dot,
    DotDot,
    ColonColon,
    At,
    Pipe,
    Comma,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Plus,
    Minus,
    Star,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Div,
    Mod,
    /// Numeric literal.
    Number(f64),
    /// Quoted string literal, quotes removed.
    Literal(String),
    /// Element or function name.
    Name(String),
    /// `node`, `text` or `comment` sitting directly before `(`.
    NodeKind(String),
    /// Axis name sitting directly before `::`.
    AxisName(String),
    End,
}

/// Multi-character operators, matched before their one-character prefixes.
const DIGRAPHS: [(&str, Token); 6] = [
    ("//", Token::SlashSlash),
    ("..", Token::DotDot),
    ("::", Token::ColonColon),
    ("!=", Token::Ne),
    ("<=", Token::Le),
    (">=", Token::Ge),
];

const SINGLES: [(char, Token); 15] = [
    ('/', Token::Slash),
    ('.', Token::Dot),
    ('@', Token::At),
    ('|', Token::Pipe),
    (',', Token::Comma),
    ('(', Token::OpenParen),
    (')', Token::CloseParen),
    ('[', Token::OpenBracket),
    (']', Token::CloseBracket),
    ('+', Token::Plus),
    ('-', Token::Minus),
    ('*', Token::Star),
    ('=', Token::Eq),
    ('<', Token::Lt),
    ('>', Token::Gt),
];

/// Cursor over the unconsumed tail of the locator text.
pub struct Lexer<'a> {
    rest: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { rest: input }
    }

    /// Split the whole input into tokens; `End` is not included.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut out = Vec::new();
        loop {
            match self.next_token() {
                Token::End => return out,
                token => out.push(token),
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.rest = self.rest.trim_start();
        let first = match self.rest.chars().next() {
            Some(c) => c,
            None => return Token::End,
        };

        for (text, token) in DIGRAPHS {
            if let Some(tail) = self.rest.strip_prefix(text) {
                self.rest = tail;
                return token;
            }
        }

        // `.5` is a number, `.` a step; the digraph pass took `..` already
        if first.is_ascii_digit() || (first == '.' && self.digit_at(1)) {
            return self.lex_number();
        }

        for (ch, token) in SINGLES {
            if first == ch {
                self.rest = &self.rest[1..];
                return token;
            }
        }

        match first {
            '\'' | '"' => self.lex_literal(first),
            c if is_name_start(c) => self.lex_name(),
            // Anything unrecognized surfaces as a name the parser rejects
            c => {
                self.rest = &self.rest[c.len_utf8()..];
                Token::Name(c.to_string())
            }
        }
    }

    fn digit_at(&self, index: usize) -> bool {
        self.rest.as_bytes().get(index).is_some_and(u8::is_ascii_digit)
    }

    fn lex_number(&mut self) -> Token {
        let bytes = self.rest.as_bytes();
        let mut end = 0;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
            end += 1;
            while bytes.get(end).is_some_and(u8::is_ascii_digit) {
                end += 1;
            }
        }
        let (digits, tail) = self.rest.split_at(end);
        self.rest = tail;
        Token::Number(digits.parse().unwrap_or(f64::NAN))
    }

    /// XPath 1.0 literals have no escape sequences; the value runs to the
    /// next occurrence of the opening quote. An unterminated literal takes
    /// the rest of the input and leaves the parser to complain about
    /// whatever is then missing.
    fn lex_literal(&mut self, quote: char) -> Token {
        let body = &self.rest[1..];
        match body.find(quote) {
            Some(end) => {
                self.rest = &body[end + 1..];
                Token::Literal(body[..end].to_string())
            }
            None => {
                self.rest = "";
                Token::Literal(body.to_string())
            }
        }
    }

    fn lex_name(&mut self) -> Token {
        let end = self
            .rest
            .find(|c: char| !is_name_part(c))
            .unwrap_or(self.rest.len());
        let (name, tail) = self.rest.split_at(end);
        self.rest = tail;
        match name {
            "and" => Token::And,
            "or" => Token::Or,
            "div" => Token::Div,
            "mod" => Token::Mod,
            _ => self.classify_name(name),
        }
    }

    /// A bare name is an axis when `::` follows, a node-kind test when it
    /// names one of the three kinds directly before `(`, and otherwise an
    /// element or function name (the parser tells those two apart).
    fn classify_name(&mut self, name: &str) -> Token {
        self.rest = self.rest.trim_start();
        if self.rest.starts_with("::") {
            Token::AxisName(name.to_string())
        } else if self.rest.starts_with('(') && matches!(name, "node" | "text" | "comment") {
            Token::NodeKind(name.to_string())
        } else {
            Token::Name(name.to_string())
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize()
    }

    fn name(s: &str) -> Token {
        Token::Name(s.to_string())
    }

    #[test]
    fn test_plain_path() {
        assert_eq!(
            lex("/HTML/BODY"),
            vec![Token::Slash, name("HTML"), Token::Slash, name("BODY")]
        );
    }

    #[test]
    fn test_descendant_shorthand() {
        assert_eq!(lex("//DIV"), vec![Token::SlashSlash, name("DIV")]);
    }

    #[test]
    fn test_attribute_predicate() {
        assert_eq!(
            lex("DIV[@id='test']"),
            vec![
                name("DIV"),
                Token::OpenBracket,
                Token::At,
                name("id"),
                Token::Eq,
                Token::Literal("test".to_string()),
                Token::CloseBracket,
            ]
        );
    }

    #[test]
    fn test_axis_lookahead() {
        assert_eq!(
            lex("following-sibling::node()"),
            vec![
                Token::AxisName("following-sibling".to_string()),
                Token::ColonColon,
                Token::NodeKind("node".to_string()),
                Token::OpenParen,
                Token::CloseParen,
            ]
        );
    }

    #[test]
    fn test_kind_test_inside_call() {
        assert_eq!(
            lex("contains(text(),'pivot')"),
            vec![
                name("contains"),
                Token::OpenParen,
                Token::NodeKind("text".to_string()),
                Token::OpenParen,
                Token::CloseParen,
                Token::Comma,
                Token::Literal("pivot".to_string()),
                Token::CloseParen,
            ]
        );
    }

    #[test]
    fn test_double_quoted_literal() {
        assert!(lex("contains(text(),\"it's\")").contains(&Token::Literal("it's".to_string())));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lex("position() = 1").last(), Some(&Token::Number(1.0)));
        assert_eq!(lex("3.25"), vec![Token::Number(3.25)]);
        assert_eq!(lex(".5"), vec![Token::Number(0.5)]);
    }

    #[test]
    fn test_parent_shorthand() {
        assert_eq!(lex("../SPAN"), vec![Token::DotDot, Token::Slash, name("SPAN")]);
    }

    #[test]
    fn test_comparison_digraphs() {
        assert_eq!(
            lex("1 <= 2 != 3"),
            vec![
                Token::Number(1.0),
                Token::Le,
                Token::Number(2.0),
                Token::Ne,
                Token::Number(3.0),
            ]
        );
    }
}
