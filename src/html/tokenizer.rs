//! Lenient HTML tokenization
//!
//! Pull-based tokenizer producing a flat stream of tags, text, and comments.
//! There is no strict mode: anything that cannot be read as markup is text.
//! Doctype declarations, processing instructions, and marked sections are
//! skipped. Element names are canonicalized to ASCII uppercase, attribute
//! names to lowercase.

use super::attributes::{parse_attributes, Attribute};
use super::entities::decode_text;
use super::scanner::Scanner;
use std::borrow::Cow;

/// One tokenization event
#[derive(Debug)]
pub enum HtmlToken<'a> {
    /// `<NAME attr=...>`; `self_closing` covers both `<BR/>` and void elements
    /// written without a slash (resolved by the tree builder)
    StartTag { name: Cow<'a, [u8]>, attrs: Vec<Attribute<'a>>, self_closing: bool },
    /// `</NAME>`
    EndTag { name: Cow<'a, [u8]> },
    /// Character data with entities decoded; raw (undecoded) inside
    /// script/style elements
    Text(Cow<'a, [u8]>),
    /// `<!-- ... -->` content, without the delimiters
    Comment(&'a [u8]),
}

/// Elements whose content is raw text up to the matching end tag
const RAW_TEXT_ELEMENTS: [&[u8]; 2] = [b"SCRIPT", b"STYLE"];

/// Elements that never take children; a start tag is complete by itself
pub fn is_void_element(name: &[u8]) -> bool {
    matches!(
        name,
        b"AREA" | b"BASE" | b"BR" | b"COL" | b"EMBED" | b"HR" | b"IMG" | b"INPUT"
            | b"LINK" | b"META" | b"PARAM" | b"SOURCE" | b"TRACK" | b"WBR"
    )
}

/// Pull tokenizer over a byte buffer
pub struct Tokenizer<'a> {
    input: &'a [u8],
    scanner: Scanner<'a>,
    /// Set after a script/style start tag: canonical name whose end tag
    /// terminates the raw-text run
    raw_text_until: Option<&'static [u8]>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let mut scanner = Scanner::new(input);
        // UTF-8 BOM
        if scanner.starts_with(&[0xEF, 0xBB, 0xBF]) {
            scanner.advance(3);
        }
        Tokenizer { input, scanner, raw_text_until: None }
    }

    /// Next token, or None at end of input
    pub fn next_token(&mut self) -> Option<HtmlToken<'a>> {
        loop {
            if self.scanner.is_eof() {
                return None;
            }

            if let Some(name) = self.raw_text_until {
                if let Some(token) = self.read_raw_text(name) {
                    return Some(token);
                }
                continue;
            }

            if self.scanner.peek() == Some(b'<') {
                match self.read_markup() {
                    Some(token) => return Some(token),
                    // skipped construct (doctype, PI); keep scanning
                    None => continue,
                }
            }

            return Some(self.read_text());
        }
    }

    /// Raw-text content of a script/style element, up to its end tag
    fn read_raw_text(&mut self, name: &'static [u8]) -> Option<HtmlToken<'a>> {
        self.raw_text_until = None;
        let start = self.scanner.position();
        let end = match self.scanner.find_end_tag_ci(name) {
            Some(end) => end,
            None => self.input.len(),
        };
        self.scanner.set_position(end);
        if end > start {
            // raw: no entity decoding inside script/style
            Some(HtmlToken::Text(Cow::Borrowed(self.scanner.slice(start, end))))
        } else {
            None
        }
    }

    /// Text run up to the next '<'
    fn read_text(&mut self) -> HtmlToken<'a> {
        let start = self.scanner.position();
        let end = match self.scanner.find_tag_start() {
            Some(end) => end,
            None => self.input.len(),
        };
        self.scanner.set_position(end);
        HtmlToken::Text(decode_text(self.scanner.slice(start, end)))
    }

    /// Anything starting with '<'. Returns None for skipped constructs.
    fn read_markup(&mut self) -> Option<HtmlToken<'a>> {
        if self.scanner.starts_with(b"<!--") {
            return Some(self.read_comment());
        }
        if self.scanner.starts_with(b"<!") || self.scanner.starts_with(b"<?") {
            // doctype / marked section / processing instruction
            self.skip_past_tag_end();
            return None;
        }
        if self.scanner.starts_with(b"</") {
            return self.read_end_tag();
        }
        self.read_start_tag()
    }

    fn read_comment(&mut self) -> HtmlToken<'a> {
        self.scanner.advance(4); // <!--
        let start = self.scanner.position();
        match self.scanner.find_sequence(b"-->") {
            Some(end) => {
                let content = self.scanner.slice(start, end);
                self.scanner.set_position(end + 3);
                HtmlToken::Comment(content)
            }
            None => {
                // unterminated comment runs to end of input
                let content = self.scanner.slice(start, self.input.len());
                self.scanner.set_position(self.input.len());
                HtmlToken::Comment(content)
            }
        }
    }

    fn read_end_tag(&mut self) -> Option<HtmlToken<'a>> {
        self.scanner.advance(2); // </
        match self.scanner.read_name() {
            Some(name) => {
                self.skip_past_tag_end();
                Some(HtmlToken::EndTag { name: uppercase(name) })
            }
            None => {
                // "</>" or "</ garbage>": bogus, skip it
                self.skip_past_tag_end();
                None
            }
        }
    }

    fn read_start_tag(&mut self) -> Option<HtmlToken<'a>> {
        let lt = self.scanner.position();
        self.scanner.advance(1); // <
        let name = match self.scanner.read_name() {
            Some(name) => name,
            None => {
                // bare '<' in text
                self.scanner.set_position(lt + 1);
                return Some(HtmlToken::Text(Cow::Borrowed(&self.input[lt..lt + 1])));
            }
        };

        let attrs_start = self.scanner.position();
        let gt = match self.scanner.find_tag_end_quoted() {
            Some(gt) => gt,
            None => {
                // unterminated tag: drop it, consume the rest
                self.scanner.set_position(self.input.len());
                return None;
            }
        };

        let self_closing = gt > attrs_start && self.input[gt - 1] == b'/';
        let attrs_end = if self_closing { gt - 1 } else { gt };
        let attrs = parse_attributes(self.scanner.slice(attrs_start, attrs_end));
        self.scanner.set_position(gt + 1);

        let canonical = uppercase(name);
        if !self_closing {
            if let Some(raw) = RAW_TEXT_ELEMENTS.iter().find(|e| **e == canonical.as_ref()) {
                self.raw_text_until = Some(raw);
            }
        }
        Some(HtmlToken::StartTag { name: canonical, attrs, self_closing })
    }

    fn skip_past_tag_end(&mut self) {
        match self.scanner.find_tag_end_quoted() {
            Some(gt) => self.scanner.set_position(gt + 1),
            None => self.scanner.set_position(self.input.len()),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = HtmlToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Uppercase a name, borrowing when it is already uppercase
fn uppercase(name: &[u8]) -> Cow<'_, [u8]> {
    if name.iter().any(|b| b.is_ascii_lowercase()) {
        Cow::Owned(name.to_ascii_uppercase())
    } else {
        Cow::Borrowed(name)
    }
}
