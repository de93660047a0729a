//! Stylesheet model and the cssparser-backed parser that produces it.
//!
//! The model is deliberately flat: top-level style rules with their
//! selector list and declarations, at-rules by name only, and parse errors
//! with 1-based line numbers. Diagnostics are returned in the model rather
//! than printed, and non-UTF-8 input is a distinct [`GradeError::CssDecode`].

use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, DeclarationParser, ParseError, ParseErrorKind,
    Parser, ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
};
use serde::Serialize;

use crate::error::GradeError;

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyleSheet {
    /// Top-level rules in source order.
    pub rules: Vec<CssRule>,
    /// Recovered syntax errors, ordered by line.
    pub errors: Vec<CssParseError>,
}

impl StyleSheet {
    /// Qualified (style) rules only; at-rules are skipped.
    pub fn style_rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.rules.iter().filter_map(|rule| match rule {
            CssRule::Style(style) => Some(style),
            CssRule::At(_) => None,
        })
    }
}

/// One top-level rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CssRule {
    /// `selectors { declarations }`
    Style(StyleRule),
    /// `@name ...`, kept by name; its contents are not examined.
    At(String),
}

/// A qualified rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRule {
    /// Comma-separated selectors, whitespace-collapsed.
    pub selectors: Vec<String>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

impl StyleRule {
    /// Returns true if one of the selectors is exactly the type selector `tag`.
    ///
    /// `body` matches; `body.home`, `#page body` and `div.body` do not.
    pub fn has_type_selector(&self, tag: &str) -> bool {
        self.selectors.iter().any(|s| s.eq_ignore_ascii_case(tag))
    }
}

/// A `name: value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// Lower-cased property name.
    pub name: String,
    /// Raw value text, whitespace-collapsed.
    pub value: String,
}

impl Declaration {
    /// Lower-cased value terms split on commas and whitespace, quotes removed.
    /// Anything from a `!` on (`!important`) is not a term.
    ///
    /// `"Georgia", Times New Roman, serif!important` yields
    /// `georgia`, `times`, `new`, `roman`, `serif`.
    pub fn terms(&self) -> impl Iterator<Item = String> + '_ {
        let value = self
            .value
            .split_once('!')
            .map_or(self.value.as_str(), |(before, _)| before);
        value
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(|term| term.trim_matches(|c| c == '"' || c == '\''))
            .filter(|term| !term.is_empty())
            .map(str::to_ascii_lowercase)
    }
}

/// A recovered syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CssParseError {
    /// 1-based source line.
    pub line: u32,
    /// What went wrong and the offending text.
    pub message: String,
}

/// Something that turns stylesheet bytes into a [`StyleSheet`].
pub trait StylesheetParser {
    /// Parses one stylesheet.
    ///
    /// # Errors
    ///
    /// Returns [`GradeError::CssDecode`] if the bytes are not text.
    fn parse(&self, source: &[u8]) -> Result<StyleSheet, GradeError>;
}

/// [`StylesheetParser`] built on the `cssparser` tokenizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct CssParserBackend;

impl StylesheetParser for CssParserBackend {
    fn parse(&self, source: &[u8]) -> Result<StyleSheet, GradeError> {
        let text = std::str::from_utf8(source).map_err(|e| GradeError::CssDecode {
            offset: e.valid_up_to(),
        })?;
        Ok(parse_stylesheet(text.strip_prefix('\u{feff}').unwrap_or(text)))
    }
}

/// Parses stylesheet text, recovering from every syntax error.
pub fn parse_stylesheet(text: &str) -> StyleSheet {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut top = TopLevel::default();
    let mut rules = Vec::new();
    let mut errors = Vec::new();

    for item in cssparser::StyleSheetParser::new(&mut parser, &mut top) {
        match item {
            Ok(rule) => rules.push(rule),
            Err((error, slice)) => errors.push(convert_error(error, slice)),
        }
    }

    errors.extend(top.nested_errors);
    errors.sort_by_key(|e| e.line);
    StyleSheet { rules, errors }
}

#[derive(Debug, Clone, Copy)]
enum SyntaxIssue {
    EmptySelector,
    EmptyValue,
}

#[derive(Default)]
struct TopLevel {
    nested_errors: Vec<CssParseError>,
}

impl<'i> QualifiedRuleParser<'i> for TopLevel {
    type Prelude = Vec<String>;
    type QualifiedRule = CssRule;
    type Error = SyntaxIssue;

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let selectors: Vec<String> = strip_comments(consume_rest(input))
            .split(',')
            .map(collapse)
            .filter(|s| !s.is_empty())
            .collect();
        if selectors.is_empty() {
            return Err(input.new_custom_error(SyntaxIssue::EmptySelector));
        }
        Ok(selectors)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut body = DeclarationList;
        let mut declarations = Vec::new();
        for item in RuleBodyParser::new(input, &mut body) {
            match item {
                Ok(declaration) => declarations.push(declaration),
                Err((error, slice)) => self.nested_errors.push(convert_error(error, slice)),
            }
        }
        Ok(CssRule::Style(StyleRule {
            selectors: prelude,
            declarations,
        }))
    }
}

impl<'i> AtRuleParser<'i> for TopLevel {
    type Prelude = String;
    type AtRule = CssRule;
    type Error = SyntaxIssue;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        consume_rest(input);
        Ok(name.to_ascii_lowercase())
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        Ok(CssRule::At(prelude))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        consume_rest(input);
        Ok(CssRule::At(prelude))
    }
}

struct DeclarationList;

impl<'i> DeclarationParser<'i> for DeclarationList {
    type Declaration = Declaration;
    type Error = SyntaxIssue;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let value = collapse(&strip_comments(consume_rest(input)));
        if value.is_empty() {
            return Err(input.new_custom_error(SyntaxIssue::EmptyValue));
        }
        Ok(Declaration {
            name: name.to_ascii_lowercase(),
            value,
        })
    }
}

// Nested rules and at-rules inside a declaration block are rejected.
impl<'i> AtRuleParser<'i> for DeclarationList {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = SyntaxIssue;
}

impl<'i> QualifiedRuleParser<'i> for DeclarationList {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = SyntaxIssue;
}

impl<'i> RuleBodyItemParser<'i, Declaration, SyntaxIssue> for DeclarationList {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Consumes the remaining tokens and returns the text they spanned.
fn consume_rest<'i>(input: &mut Parser<'i, '_>) -> &'i str {
    let start = input.position();
    while input.next().is_ok() {}
    input.slice_from(start)
}

/// Removes `/* ... */` comments outside quoted strings. An unterminated
/// comment runs to the end of the text.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut quote: Option<char> = None;
    while let Some(c) = rest.chars().next() {
        if quote.is_none() && rest.starts_with("/*") {
            rest = rest[2..].split_once("*/").map_or("", |(_, after)| after);
            out.push(' ');
            continue;
        }
        match quote {
            Some(q) if c == q => quote = None,
            None if c == '"' || c == '\'' => quote = Some(c),
            _ => {}
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn convert_error(error: ParseError<'_, SyntaxIssue>, slice: &str) -> CssParseError {
    let what = match error.kind {
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected token {:?}", token)
        }
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "unexpected end of input".to_string()
        }
        ParseErrorKind::Basic(BasicParseErrorKind::AtRuleInvalid(name)) => {
            format!("invalid @{} rule", &*name)
        }
        ParseErrorKind::Basic(BasicParseErrorKind::AtRuleBodyInvalid) => {
            "invalid at-rule body".to_string()
        }
        ParseErrorKind::Basic(BasicParseErrorKind::QualifiedRuleInvalid) => {
            "invalid rule".to_string()
        }
        ParseErrorKind::Custom(SyntaxIssue::EmptySelector) => "rule has no selector".to_string(),
        ParseErrorKind::Custom(SyntaxIssue::EmptyValue) => "declaration has no value".to_string(),
    };
    let near = collapse(slice);
    let message = if near.is_empty() {
        what
    } else {
        format!("{} near `{}`", what, near)
    };
    CssParseError {
        line: error.location.line + 1,
        message,
    }
}
