//! CSS Style Attributes — declaration block parsing for `style="..."` and `cssText`.
//! Spec: <https://www.w3.org/TR/css-style-attr/>

#![forbid(unsafe_code)]

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, Token,
};

/// A single CSS declaration parsed from a declaration block.
///
/// Spec: <https://www.w3.org/TR/css-style-attr/#interpreting>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name normalized to ASCII lowercase; custom properties keep their case.
    pub property: String,
    /// Value text without the `!important` suffix, trimmed of surrounding whitespace.
    pub value: String,
    /// Whether the declaration carried `!important`.
    pub important: bool,
}

/// Declaration-only body parser; nested rules are rejected and skipped.
struct DeclarationCollector;

impl<'input> DeclarationParser<'input> for DeclarationCollector {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'tokens>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, 'tokens>,
        _declaration_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let start = input.position();
        let mut value_end = None;
        loop {
            let before = input.position();
            let token = match input.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };
            if token == Token::Delim('!') && value_end.is_none() {
                let state = input.state();
                input.skip_whitespace();
                if input
                    .try_parse(|parser| parser.expect_ident_matching("important"))
                    .is_ok()
                {
                    value_end = Some(before);
                } else {
                    input.reset(&state);
                }
            }
        }
        let raw = value_end.map_or_else(
            || input.slice_from(start),
            |end| input.slice(start..end),
        );
        let property = if name.starts_with("--") {
            (*name).to_owned()
        } else {
            name.to_ascii_lowercase()
        };
        let value = raw.trim().to_owned();
        if value.is_empty() && !property.starts_with("--") {
            return Err(input.new_custom_error(()));
        }
        Ok(Declaration {
            property,
            value,
            important: value_end.is_some(),
        })
    }
}

impl<'input> AtRuleParser<'input> for DeclarationCollector {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ();
}

impl<'input> QualifiedRuleParser<'input> for DeclarationCollector {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ();
}

impl<'input> RuleBodyItemParser<'input, Declaration, ()> for DeclarationCollector {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Parse a declaration block into declarations, in source order.
///
/// Duplicates are kept; callers decide how later declarations replace earlier ones.
/// Invalid items (no colon, empty property, empty value) are skipped using the CSS
/// error recovery rules, so one bad declaration never hides the following ones.
///
/// Spec: <https://www.w3.org/TR/css-style-attr/#interpreting>
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    let mut parser_input = ParserInput::new(input);
    let mut parser = Parser::new(&mut parser_input);
    let mut collector = DeclarationCollector;
    RuleBodyParser::new(&mut parser, &mut collector)
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(property: &str, value: &str, important: bool) -> Declaration {
        Declaration {
            property: property.to_owned(),
            value: value.to_owned(),
            important,
        }
    }

    #[test]
    fn parses_ordered_declarations() {
        let parsed = parse_style_attribute("color: red; Margin: 0 auto ;color:blue");
        assert_eq!(
            parsed,
            vec![
                decl("color", "red", false),
                decl("margin", "0 auto", false),
                decl("color", "blue", false),
            ]
        );
    }

    #[test]
    fn detects_important_with_spacing_and_case() {
        let parsed = parse_style_attribute("color: red !important; width: 1px ! IMPORTANT");
        assert_eq!(
            parsed,
            vec![decl("color", "red", true), decl("width", "1px", true)]
        );
    }

    #[test]
    fn keeps_custom_property_case_and_raw_value() {
        let parsed = parse_style_attribute("--Brand-Color: #FF0000; --gap: calc(1px + 2px)");
        assert_eq!(
            parsed,
            vec![
                decl("--Brand-Color", "#FF0000", false),
                decl("--gap", "calc(1px + 2px)", false),
            ]
        );
    }

    #[test]
    fn skips_invalid_items() {
        let parsed = parse_style_attribute("nonsense; color:; : red; font-size: 12px");
        assert_eq!(parsed, vec![decl("font-size", "12px", false)]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse_style_attribute("  ").is_empty());
    }
}
