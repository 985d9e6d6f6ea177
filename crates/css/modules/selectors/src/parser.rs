//! CSS selector parsing.
//! Spec: <https://www.w3.org/TR/selectors-4/#grammar>

use crate::{
    AttributeSelector, Combinator, ComplexSelector, CompoundSelector, SelectorList,
    SimpleSelector,
};
use core::mem::take;

/// Pseudo-elements that may still be written with a single colon.
/// Spec: Section 3.6.3 — legacy pseudo-element syntax
const LEGACY_PSEUDO_ELEMENTS: [&str; 4] = ["before", "after", "first-line", "first-letter"];

#[derive(Clone, Debug, PartialEq, Eq)]
/// Internal tokenizer token kinds.
pub enum Tok {
    /// A combinator token like child/adjacent/general sibling.
    Combinator(Combinator),
    /// Whitespace that implies a descendant combinator.
    DescendantWS,
    /// A namespace separator `|`; the preceding type or universal selector was a prefix.
    NamespaceBar,
    /// A simple selector token.
    Simple(SimpleSelector),
}

/// Tokenizer over a selector string.
pub struct SelectorTokenizer {
    /// Underlying owned bytes for the selector.
    input_bytes: Vec<u8>,
    /// Current cursor index into `input_bytes`.
    index: usize,
    /// Whether we should emit a descendant whitespace token on `next()` call.
    pending_whitespace: bool,
}

impl SelectorTokenizer {
    /// Construct a tokenizer from input.
    #[inline]
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input_bytes: input.as_bytes().to_vec(),
            index: 0,
            pending_whitespace: false,
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.input_bytes.get(self.index).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input_bytes
            .get(self.index.saturating_add(offset))
            .copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    /// Return the next selector token, if any.
    pub(crate) fn next(&mut self) -> Option<Tok> {
        if self.pending_whitespace {
            self.pending_whitespace = false;
            return Some(Tok::DescendantWS);
        }
        self.skip_whitespace_descendant();
        if self.pending_whitespace {
            self.pending_whitespace = false;
            return Some(Tok::DescendantWS);
        }
        loop {
            let current = self.peek()?;
            match current {
                b'*' => {
                    self.bump();
                    return Some(Tok::Simple(SimpleSelector::Universal));
                }
                b'.' => return Some(self.consume_class()),
                b'#' => return Some(self.consume_id()),
                b'[' => return Some(self.consume_attr()),
                b':' => return Some(self.consume_pseudo()),
                b'|' => {
                    self.bump();
                    return Some(Tok::NamespaceBar);
                }
                b'>' => {
                    self.bump();
                    return Some(Tok::Combinator(Combinator::Child));
                }
                b'+' => {
                    self.bump();
                    return Some(Tok::Combinator(Combinator::AdjacentSibling));
                }
                b'~' => {
                    self.bump();
                    return Some(Tok::Combinator(Combinator::GeneralSibling));
                }
                _ if is_ident_start(current) => return Some(self.consume_type()),
                _ => {
                    // Stray punctuation contributes nothing.
                    self.bump();
                    self.skip_whitespace_descendant();
                    if self.pending_whitespace {
                        self.pending_whitespace = false;
                        return Some(Tok::DescendantWS);
                    }
                }
            }
        }
    }

    /// Skip whitespace and mark that a descendant combinator should be emitted next.
    #[inline]
    fn skip_whitespace_descendant(&mut self) {
        let mut saw = false;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() {
                saw = true;
                self.bump();
            } else {
                break;
            }
        }
        if saw {
            self.pending_whitespace = true;
        }
    }

    /// Consume an identifier of name code points, honouring CSS escapes.
    /// Spec: CSS Syntax 3 — Section 4.3.11 Consume an ident sequence
    fn consume_ident(&mut self) -> String {
        let mut out: Vec<u8> = Vec::new();
        while let Some(byte) = self.peek() {
            if byte == b'\\' {
                self.bump();
                self.consume_escape(&mut out);
            } else if is_ident_char(byte) {
                out.push(byte);
                self.bump();
            } else {
                break;
            }
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Consume the body of an escape (the backslash is already consumed).
    fn consume_escape(&mut self, out: &mut Vec<u8>) {
        let mut hex_len = 0usize;
        while hex_len < 6 && self.peek().is_some_and(|byte| byte.is_ascii_hexdigit()) {
            if let Some(byte) = self.peek() {
                out.push(byte);
            }
            self.bump();
            hex_len = hex_len.saturating_add(1);
        }
        if hex_len > 0 {
            if self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
                self.bump();
            }
            return;
        }
        if let Some(byte) = self.peek() {
            out.push(byte);
            self.bump();
        }
    }

    /// Parse a type selector identifier into a `SimpleSelector::Type`.
    #[inline]
    fn consume_type(&mut self) -> Tok {
        let ident = self.consume_ident();
        Tok::Simple(SimpleSelector::Type(ident.to_ascii_lowercase()))
    }

    /// Parse a class selector following '.' into `SimpleSelector::Class`.
    #[inline]
    fn consume_class(&mut self) -> Tok {
        self.bump();
        let ident = self.consume_ident();
        Tok::Simple(SimpleSelector::Class(ident))
    }

    /// Parse an id selector following '#' into `SimpleSelector::IdSelector`.
    #[inline]
    fn consume_id(&mut self) -> Tok {
        self.bump();
        let ident = self.consume_ident();
        Tok::Simple(SimpleSelector::IdSelector(ident))
    }

    /// Parse an attribute selector: `[name]`, `[ns|name]`, `[name op value flags]`.
    /// Spec: Section 6 — Attribute selectors
    fn consume_attr(&mut self) -> Tok {
        self.bump();
        self.skip_spaces();
        let mut name = self.consume_ident();
        if self.peek() == Some(b'|') && self.peek_at(1) != Some(b'=') {
            self.bump();
            name = self.consume_ident();
        }
        self.skip_spaces();
        let operator = self.consume_attr_operator();
        let value = if operator.is_some() {
            self.skip_spaces();
            match self.peek() {
                Some(quote @ (b'"' | b'\'')) => {
                    self.bump();
                    Some(self.consume_quoted(quote))
                }
                _ => Some(self.consume_ident()),
            }
        } else {
            None
        };
        self.skip_until_close_bracket();
        Tok::Simple(SimpleSelector::Attribute(AttributeSelector {
            name: name.to_ascii_lowercase(),
            operator,
            value,
        }))
    }

    /// Consume one of `=`, `~=`, `|=`, `^=`, `$=`, `*=`.
    fn consume_attr_operator(&mut self) -> Option<String> {
        match (self.peek(), self.peek_at(1)) {
            (Some(b'='), _) => {
                self.bump();
                Some("=".to_owned())
            }
            (Some(prefix @ (b'~' | b'|' | b'^' | b'$' | b'*')), Some(b'=')) => {
                self.bump();
                self.bump();
                Some(format!("{}=", char::from(prefix)))
            }
            _ => None,
        }
    }

    /// Skip modifiers and anything else up to and including the closing `]`.
    fn skip_until_close_bracket(&mut self) {
        while let Some(byte) = self.peek() {
            self.bump();
            match byte {
                b']' => return,
                b'"' | b'\'' => {
                    let _skipped: String = self.consume_quoted(byte);
                }
                _ => {}
            }
        }
    }

    /// Consume a quoted string until the matching quote byte (which is consumed).
    fn consume_quoted(&mut self, quote: u8) -> String {
        let mut out: Vec<u8> = Vec::new();
        while let Some(byte) = self.peek() {
            self.bump();
            if byte == quote {
                break;
            }
            if byte == b'\\' {
                if let Some(escaped) = self.peek() {
                    out.push(escaped);
                    self.bump();
                }
                continue;
            }
            out.push(byte);
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Parse `:name`, `:name(args)`, `::name` or `::name(args)`.
    /// Spec: Section 3.5 — Pseudo-classes; Section 3.6 — Pseudo-elements
    fn consume_pseudo(&mut self) -> Tok {
        self.bump();
        let double_colon = self.peek() == Some(b':');
        if double_colon {
            self.bump();
        }
        let name = self.consume_ident().to_ascii_lowercase();
        let argument = if self.peek() == Some(b'(') {
            self.bump();
            Some(self.consume_balanced_argument())
        } else {
            None
        };
        if double_colon || LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) {
            Tok::Simple(SimpleSelector::PseudoElement { name, argument })
        } else {
            Tok::Simple(SimpleSelector::PseudoClass { name, argument })
        }
    }

    /// Consume a parenthesised argument (opening paren already consumed) and return its
    /// trimmed inner text. Nested parentheses, brackets and strings are kept intact.
    fn consume_balanced_argument(&mut self) -> String {
        let start = self.index;
        let mut depth = 0usize;
        let mut end = self.input_bytes.len();
        while let Some(byte) = self.peek() {
            match byte {
                b'"' | b'\'' => {
                    self.bump();
                    let _skipped: String = self.consume_quoted(byte);
                    continue;
                }
                b'\\' => {
                    self.bump();
                }
                b'(' | b'[' => depth = depth.saturating_add(1),
                b']' => depth = depth.saturating_sub(1),
                b')' => {
                    if depth == 0 {
                        end = self.index;
                        self.bump();
                        break;
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.bump();
        }
        let slice = self.input_bytes.get(start..end).unwrap_or(&[]);
        String::from_utf8_lossy(slice).trim().to_owned()
    }

    /// Skip ASCII whitespace.
    #[inline]
    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
    }
}

/// Spec: CSS Syntax 3 — ident-start code point (non-ASCII counts as a name code point).
const fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'-' || byte == b'\\' || byte >= 0x80
}

/// Spec: CSS Syntax 3 — name code point.
const fn is_ident_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte >= 0x80
}

/// Split `input` on `separator` bytes that sit outside parentheses, brackets and strings.
pub(crate) fn split_top_level(input: &str, separator: u8) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0usize;
    let mut index = 0usize;
    while let Some(&byte) = bytes.get(index) {
        if let Some(open) = quote {
            if byte == b'\\' {
                index = index.saturating_add(1);
            } else if byte == open {
                quote = None;
            }
        } else {
            match byte {
                b'\\' => index = index.saturating_add(1),
                b'"' | b'\'' => quote = Some(byte),
                b'(' | b'[' => depth = depth.saturating_add(1),
                b')' | b']' => depth = depth.saturating_sub(1),
                _ if byte == separator && depth == 0 => {
                    parts.push(input.get(start..index).unwrap_or_default());
                    start = index.saturating_add(1);
                }
                _ => {}
            }
        }
        index = index.saturating_add(1);
    }
    parts.push(input.get(start..).unwrap_or_default());
    parts
}

/// Find the selector list following a top-level `of` keyword in an `An+B of S` argument.
/// Spec: Section 14.4.1 — `:nth-child()` with a selector list
pub(crate) fn nth_of_selector(argument: &str) -> Option<&str> {
    let mut selector_text = None;
    let mut depth = 0usize;
    for (index, byte) in argument.bytes().enumerate() {
        match byte {
            b'(' | b'[' => depth = depth.saturating_add(1),
            b')' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth != 0 || !byte.is_ascii_whitespace() {
            continue;
        }
        let rest = argument.get(index..)?.trim_start();
        if let Some(after) = rest.strip_prefix("of").or_else(|| rest.strip_prefix("OF"))
            && after.starts_with(|character: char| character.is_ascii_whitespace())
        {
            selector_text = Some(after.trim());
            break;
        }
    }
    selector_text
}

/// Parse a selector list from CSS text.
/// Spec: Section 4.1 — Selector lists
pub fn parse_selector_list(input: &str) -> SelectorList {
    let mut list = SelectorList::default();
    for part in split_top_level(input, b',') {
        let sel = parse_complex_selector(part.trim());
        if !sel.first.simples.is_empty() || !sel.rest.is_empty() {
            list.selectors.push(sel);
        }
    }
    list
}

/// Parse one complex selector (very permissive, minimal error handling).
/// Spec: Section 15 — Combinators; Sections 5–7 — simple selectors
///
/// A leading combinator (as in the relative selectors of `:has(> img)`) is accepted
/// and leaves `first` empty.
pub fn parse_complex_selector(input: &str) -> ComplexSelector {
    let mut tokens = SelectorTokenizer::new(input);
    let mut compounds: Vec<(Option<Combinator>, CompoundSelector)> = Vec::new();
    let mut current = CompoundSelector::default();
    let mut current_combinator: Option<Combinator> = None;
    let mut pending_combinator: Option<Combinator> = None;

    while let Some(token) = tokens.next() {
        match token {
            Tok::Combinator(comb) => {
                finish_compound(&mut compounds, &mut current, &mut current_combinator);
                pending_combinator = Some(comb);
            }
            Tok::DescendantWS => {
                if !current.simples.is_empty() {
                    finish_compound(&mut compounds, &mut current, &mut current_combinator);
                    pending_combinator.get_or_insert(Combinator::Descendant);
                }
            }
            Tok::NamespaceBar => {
                if matches!(
                    current.simples.last(),
                    Some(SimpleSelector::Type(_) | SimpleSelector::Universal)
                ) {
                    current.simples.pop();
                }
            }
            Tok::Simple(simple) => {
                if current.simples.is_empty() {
                    current_combinator = pending_combinator.take();
                }
                current.simples.push(simple);
            }
        }
    }
    finish_compound(&mut compounds, &mut current, &mut current_combinator);

    let mut iter = compounds.into_iter();
    let mut selector = ComplexSelector::default();
    match iter.next() {
        Some((None, compound)) => selector.first = compound,
        Some((Some(comb), compound)) => selector.rest.push((comb, compound)),
        None => return selector,
    }
    selector.rest.extend(
        iter.map(|(comb, compound)| (comb.unwrap_or(Combinator::Descendant), compound)),
    );
    selector
}

/// Move a non-empty `current` compound into `compounds` with its leading combinator.
fn finish_compound(
    compounds: &mut Vec<(Option<Combinator>, CompoundSelector)>,
    current: &mut CompoundSelector,
    current_combinator: &mut Option<Combinator>,
) {
    if !current.simples.is_empty() {
        compounds.push((current_combinator.take(), take(current)));
    }
}
