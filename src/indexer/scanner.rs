//! Lexical scanner that locates R function definitions
//!
//! Recognized forms:
//!
//! - `name <- function(...)`, `name <<- function(...)`, `name <- \(x) ...`
//! - `name = function(...)` outside of call parentheses
//! - backtick or string quoted names: `` `%+%` <- function(a, b) ``
//! - `setGeneric("name", ...)` and `setMethod("name", ...)`
//!
//! Anything more exotic is simply not indexed.

use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::context::{ContextResolver, DefinitionSite};
use super::lexer::{Lexer, Token, TokenKind};
use crate::symbol::DefinitionRecord;

const S4_DECLARATIONS: &[&str] = &["setGeneric", "setMethod"];

/// Convert a zero-based scanner position to a 1-based `(line, column)`.
///
/// Positions that do not fit fall back to `(1, 1)`: finding the
/// definition matters more than pointing at it precisely.
pub fn bounded_position(line: usize, column: usize) -> (u32, u32) {
    match (one_based(line), one_based(column)) {
        (Some(line), Some(column)) => (line, column),
        _ => {
            debug!(
                "Definition position {}:{} out of range, using 1:1",
                line, column
            );
            (1, 1)
        }
    }
}

fn one_based(raw: usize) -> Option<u32> {
    raw.checked_add(1).and_then(|value| u32::try_from(value).ok())
}

/// Extracts definitions from R source text
#[derive(Debug, Clone, Default)]
pub struct SourceScanner {
    resolver: ContextResolver,
}

impl SourceScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: ContextResolver) -> Self {
        Self { resolver }
    }

    /// Scan one file's content. `path` is only used for context labels.
    pub fn scan(&self, path: &Path, content: &str) -> Vec<DefinitionRecord> {
        find_definitions(content)
            .into_iter()
            .map(|site| {
                let (line, column) = bounded_position(site.line, site.column);
                DefinitionRecord {
                    context: self.resolver.resolve(path, &site),
                    name: site.name,
                    line,
                    column,
                }
            })
            .collect()
    }
}

/// Brace scope tracked while walking the token stream
#[derive(Debug, Default)]
struct Scope {
    /// Function whose body this brace block is
    owner: Option<String>,
    /// Open parentheses inside this block
    parens: usize,
}

/// Locate definition sites in source order
pub fn find_definitions(content: &str) -> Vec<DefinitionSite> {
    let tokens = Lexer::new(content).tokenize();
    let mut sites = Vec::new();
    let mut scopes = vec![Scope::default()];
    // token index of a `{` -> function it opens the body of
    let mut bodies: HashMap<usize, String> = HashMap::new();

    for (i, token) in tokens.iter().enumerate() {
        match &token.kind {
            TokenKind::LParen => current(&mut scopes).parens += 1,
            TokenKind::RParen => {
                let scope = current(&mut scopes);
                scope.parens = scope.parens.saturating_sub(1);
            }
            TokenKind::LBrace => scopes.push(Scope {
                owner: bodies.remove(&i),
                parens: 0,
            }),
            TokenKind::RBrace => {
                if scopes.len() > 1 {
                    scopes.pop();
                }
            }
            TokenKind::Ident(name) | TokenKind::Str(name) => {
                let in_call = current(&mut scopes).parens > 0;

                if let Some(function_at) = assignment_target(&tokens, i, in_call) {
                    if name.is_empty() {
                        continue;
                    }
                    if let Some(brace) = body_brace(&tokens, function_at) {
                        bodies.insert(brace, name.clone());
                    }
                    sites.push(site(name, token, &scopes));
                } else if let Some(declared) = s4_declaration(&tokens, i) {
                    sites.push(site(&declared.0, declared.1, &scopes));
                }
            }
            _ => {}
        }
    }

    sites
}

fn current(scopes: &mut [Scope]) -> &mut Scope {
    let last = scopes.len() - 1;
    &mut scopes[last]
}

fn site(name: &str, token: &Token, scopes: &[Scope]) -> DefinitionSite {
    DefinitionSite {
        name: name.to_string(),
        line: token.line,
        column: token.column,
        enclosing: scopes.iter().filter_map(|s| s.owner.clone()).collect(),
    }
}

/// If `tokens[i]` is assigned a function, return the index of the `function` token
fn assignment_target(tokens: &[Token], i: usize, in_call: bool) -> Option<usize> {
    if preceded_by_accessor(tokens, i) {
        return None;
    }
    let assigns = match tokens.get(i + 1).map(|t| &t.kind) {
        Some(TokenKind::LeftAssign) => true,
        Some(TokenKind::EqAssign) => !in_call,
        _ => false,
    };
    if assigns && matches!(tokens.get(i + 2).map(|t| &t.kind), Some(TokenKind::Function)) {
        Some(i + 2)
    } else {
        None
    }
}

/// `obj$name <- function` and `obj@name <- function` assign into an object
fn preceded_by_accessor(tokens: &[Token], i: usize) -> bool {
    i > 0
        && matches!(
            &tokens[i - 1].kind,
            TokenKind::Other(op) if op == "$" || op == "@" || op == "::" || op == ":"
        )
}

/// Index of the `{` opening the body of the function at `function_at`
fn body_brace(tokens: &[Token], function_at: usize) -> Option<usize> {
    let open = function_at + 1;
    if !matches!(tokens.get(open).map(|t| &t.kind), Some(TokenKind::LParen)) {
        return None;
    }

    let mut depth = 0usize;
    for (offset, token) in tokens[open..].iter().enumerate() {
        match token.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth == 0 {
                    let next = open + offset + 1;
                    return matches!(tokens.get(next).map(|t| &t.kind), Some(TokenKind::LBrace))
                        .then_some(next);
                }
            }
            _ => {}
        }
    }
    None
}

/// `setGeneric("name", ...)` / `setMethod("name", ...)`
fn s4_declaration(tokens: &[Token], i: usize) -> Option<(String, &Token)> {
    let TokenKind::Ident(callee) = &tokens[i].kind else {
        return None;
    };
    if !S4_DECLARATIONS.contains(&callee.as_str()) {
        return None;
    }
    if !matches!(tokens.get(i + 1).map(|t| &t.kind), Some(TokenKind::LParen)) {
        return None;
    }
    let name_token = tokens.get(i + 2)?;
    match &name_token.kind {
        TokenKind::Str(name) if !name.is_empty() => Some((name.clone(), name_token)),
        _ => None,
    }
}
