//! Advisory SQL syntax checker.
//!
//! Works on arbitrary SQL text, not only compiler output. The text is lexed
//! with nom so that string literals, quoted identifiers and comments are seen
//! as single tokens, then a set of structural and safety checks runs over the
//! token stream. The checker never fails: findings are reported in a
//! [`SyntaxReport`].
//!
//! This is a second line of defense. The AST path (validated names, escaped
//! literals) is what keeps compiled rules safe.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while1},
    character::complete::{anychar, char, multispace1, not_line_ending},
    combinator::{map, opt, rest, value},
    multi::many0,
    sequence::{pair, preceded},
};
use serde::Serialize;

use crate::settings::CompilerSettings;

const LEADING_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "WITH", "CREATE", "ALTER", "DROP",
];

/// Statements that must not follow a `;`.
const STACKED_KEYWORDS: &[&str] = &["DROP", "DELETE", "INSERT", "UPDATE", "CREATE", "ALTER"];

/// Keywords that cannot end a statement.
const DANGLING_KEYWORDS: &[&str] = &["SELECT", "FROM", "WHERE", "HAVING"];

/// Keywords that close a FROM table list.
const FROM_TERMINATORS: &[&str] = &["WHERE", "GROUP", "ORDER", "HAVING", "LIMIT", "UNION"];

/// Findings for one SQL string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Str { terminated: bool },
    QuotedIdent { terminated: bool },
    LineComment,
    BlockComment { terminated: bool },
    LParen,
    RParen,
    Semicolon,
    Comma,
    Symbol(char),
    Whitespace,
}

impl Token<'_> {
    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    fn is_any_keyword(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.is_keyword(k))
    }

    fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment | Token::BlockComment { .. })
    }
}

/// A quoted run where the quote is escaped by doubling it. Returns whether
/// the closing quote was found.
fn quoted<'a>(
    quote: &'static str,
    escaped: &'static str,
) -> impl FnMut(&'a str) -> IResult<&'a str, bool> {
    map(
        preceded(tag(quote), pair(many0(alt((is_not(quote), tag(escaped)))), opt(tag(quote)))),
        |(_, close)| close.is_some(),
    )
}

fn block_comment(input: &str) -> IResult<&str, Token<'_>> {
    preceded(
        tag("/*"),
        alt((
            value(Token::BlockComment { terminated: true }, pair(take_until("*/"), tag("*/"))),
            value(Token::BlockComment { terminated: false }, rest),
        )),
    )(input)
}

fn token(input: &str) -> IResult<&str, Token<'_>> {
    alt((
        value(Token::Whitespace, multispace1),
        value(Token::LineComment, pair(tag("--"), not_line_ending)),
        block_comment,
        map(quoted("'", "''"), |terminated| Token::Str { terminated }),
        map(quoted("\"", "\"\""), |terminated| Token::QuotedIdent { terminated }),
        map(take_while1(|c: char| c.is_alphanumeric() || c == '_'), Token::Word),
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::Semicolon, char(';')),
        value(Token::Comma, char(',')),
        map(anychar, Token::Symbol),
    ))(input)
}

/// Tokens without whitespace. The `anychar` fallback makes lexing total.
fn lex(sql: &str) -> Vec<Token<'_>> {
    many0(token)(sql)
        .map(|(_, tokens)| tokens)
        .unwrap_or_default()
        .into_iter()
        .filter(|t| *t != Token::Whitespace)
        .collect()
}

/// Syntax checker with a configurable length threshold.
#[derive(Debug, Clone)]
pub struct SyntaxChecker {
    max_query_length: usize,
}

impl Default for SyntaxChecker {
    fn default() -> Self {
        Self::from_settings(&CompilerSettings::default())
    }
}

impl SyntaxChecker {
    pub fn new(max_query_length: usize) -> Self {
        Self { max_query_length }
    }

    pub fn from_settings(settings: &CompilerSettings) -> Self {
        Self::new(settings.max_query_length)
    }

    pub fn check(&self, sql: &str) -> SyntaxReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let normalized = sql.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            errors.push("SQL query cannot be empty".to_string());
            return SyntaxReport {
                is_valid: false,
                errors,
                warnings,
            };
        }

        let tokens = lex(sql);
        let code: Vec<Token<'_>> = tokens.iter().copied().filter(|t| !t.is_comment()).collect();

        check_structure(&code, &mut errors);
        check_dangerous_patterns(&tokens, &code, &mut errors);
        check_parentheses(&code, &mut errors);
        check_quotes(&code, &mut errors);
        check_identifiers(&code, &mut errors);
        self.check_potential_issues(&normalized, &code, &mut warnings);

        if !errors.is_empty() {
            tracing::warn!("SQL syntax check found {} error(s)", errors.len());
        }

        SyntaxReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn check_potential_issues(&self, normalized: &str, code: &[Token<'_>], warnings: &mut Vec<String>) {
        if code
            .windows(2)
            .any(|w| w[0].is_keyword("SELECT") && w[1] == Token::Symbol('*'))
        {
            warnings.push(
                "Using SELECT * might be inefficient; consider specifying columns explicitly"
                    .to_string(),
            );
        }

        if let Some(first) = code.first()
            && first.is_any_keyword(&["UPDATE", "DELETE"])
            && !code.iter().any(|t| t.is_keyword("WHERE"))
        {
            warnings.push("UPDATE/DELETE without WHERE clause will affect all rows".to_string());
        }

        if has_implicit_cross_join(code) {
            warnings.push(
                "Multiple tables without explicit JOIN might create Cartesian product".to_string(),
            );
        }

        let length = normalized.chars().count();
        if length > self.max_query_length {
            warnings.push(format!(
                "Very long SQL query ({} characters); consider breaking into smaller parts",
                length
            ));
        }
    }
}

/// Check SQL text with default settings.
pub fn validate_syntax(sql: &str) -> SyntaxReport {
    SyntaxChecker::default().check(sql)
}

fn check_structure(code: &[Token<'_>], errors: &mut Vec<String>) {
    let first = code.first();
    if !first.is_some_and(|t| t.is_any_keyword(LEADING_KEYWORDS)) {
        errors.push(
            "SQL must start with a valid command (SELECT, INSERT, UPDATE, DELETE, etc.)".to_string(),
        );
    }
    if first.is_some_and(|t| t.is_keyword("SELECT")) && !code.iter().any(|t| t.is_keyword("FROM")) {
        errors.push("SELECT statement must contain a FROM clause".to_string());
    }

    let tail: Vec<&Token<'_>> = code.iter().rev().skip_while(|t| **t == Token::Semicolon).take(2).collect();
    let dangling = match tail.as_slice() {
        [last, ..] if last.is_any_keyword(DANGLING_KEYWORDS) => true,
        [last, before, ..] if last.is_keyword("BY") => before.is_any_keyword(&["GROUP", "ORDER"]),
        _ => false,
    };
    if dangling {
        errors.push("SQL keywords cannot be at the end without proper clauses".to_string());
    }
}

fn check_dangerous_patterns(tokens: &[Token<'_>], code: &[Token<'_>], errors: &mut Vec<String>) {
    let mut found: Vec<&str> = Vec::new();

    if code
        .windows(2)
        .any(|w| w[0] == Token::Semicolon && w[1].is_any_keyword(STACKED_KEYWORDS))
    {
        found.push("stacked statement after ';'");
    }
    let union_select = code
        .windows(2)
        .any(|w| w[0].is_keyword("UNION") && w[1].is_keyword("SELECT"))
        || code.windows(3).any(|w| {
            w[0].is_keyword("UNION") && w[1].is_keyword("ALL") && w[2].is_keyword("SELECT")
        });
    if union_select {
        found.push("UNION SELECT");
    }
    if tokens.last() == Some(&Token::LineComment) {
        found.push("trailing '--' comment");
    }
    if tokens.iter().any(|t| matches!(t, Token::BlockComment { .. })) {
        found.push("'/* */' block comment");
    }

    for pattern in found {
        errors.push(format!("Potentially dangerous SQL pattern detected: {}", pattern));
    }
}

fn check_parentheses(code: &[Token<'_>], errors: &mut Vec<String>) {
    let opening = code.iter().filter(|t| **t == Token::LParen).count();
    let closing = code.iter().filter(|t| **t == Token::RParen).count();
    if opening != closing {
        errors.push(format!(
            "Mismatched parentheses: {} opening, {} closing",
            opening, closing
        ));
    }

    let mut depth: i64 = 0;
    for t in code {
        match t {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth < 0 {
                    errors.push("Closing parenthesis without matching opening parenthesis".to_string());
                    break;
                }
            }
            _ => {}
        }
    }
}

fn check_quotes(code: &[Token<'_>], errors: &mut Vec<String>) {
    if code.iter().any(|t| *t == Token::Str { terminated: false }) {
        errors.push("Unmatched single quotes in SQL".to_string());
    }
    if code.iter().any(|t| *t == Token::QuotedIdent { terminated: false }) {
        errors.push("Unmatched double quotes in SQL".to_string());
    }
}

/// `1abc` is not an identifier; `1`, `500` and `1.5` are fine.
fn check_identifiers(code: &[Token<'_>], errors: &mut Vec<String>) {
    for t in code {
        if let Token::Word(w) = t
            && w.starts_with(|c: char| c.is_ascii_digit())
            && w.chars().any(|c| c.is_alphabetic() || c == '_')
        {
            errors.push(format!(
                "Invalid identifier: identifiers cannot start with numbers ({})",
                w
            ));
        }
    }
}

/// A comma at paren depth 0 inside the FROM table list.
fn has_implicit_cross_join(code: &[Token<'_>]) -> bool {
    let Some(from) = code.iter().position(|t| t.is_keyword("FROM")) else {
        return false;
    };
    let mut depth = 0usize;
    for t in &code[from + 1..] {
        match t {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Semicolon if depth == 0 => return false,
            Token::Comma if depth == 0 => return true,
            t if depth == 0 && (t.is_any_keyword(FROM_TERMINATORS) || t.is_keyword("JOIN")) => {
                return false;
            }
            _ => {}
        }
    }
    false
}
