//! Minimal R tokenizer used to locate function definitions
//!
//! This is not a full R lexer. It only distinguishes the tokens the
//! definition scanner cares about (identifiers, strings, assignment
//! operators, `function`, brackets) and collapses everything else into
//! [`TokenKind::Other`]. Comments and string bodies are skipped so that
//! code-like text inside them is never mistaken for a definition.

/// Kind of a lexed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain or backtick-quoted identifier
    Ident(String),
    /// Quoted string literal (contents without quotes, escapes kept verbatim)
    Str(String),
    /// `function` keyword or the `\` lambda shorthand
    Function,
    /// `<-` or `<<-`
    LeftAssign,
    /// `=` used as an operator (not `==`)
    EqAssign,
    LParen,
    RParen,
    LBrace,
    RBrace,
    /// Any other operator, number or punctuation
    Other(String),
}

/// A token with its zero-based start position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

/// Character cursor over R source text
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 0,
            column: 0,
        }
    }

    /// Consume the whole input and return the token stream
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        tokens
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            let c = self.peek()?;
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }

        let (line, column) = (self.line, self.column);
        let c = self.peek()?;

        let kind = if (c == 'r' || c == 'R') && self.raw_string_ahead() {
            self.bump();
            TokenKind::Str(self.raw_string())
        } else if is_ident_start(c) && !(c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) {
            let ident = self.identifier();
            if ident == "function" {
                TokenKind::Function
            } else {
                TokenKind::Ident(ident)
            }
        } else if c.is_ascii_digit() || c == '.' {
            TokenKind::Other(self.number())
        } else if c == '"' || c == '\'' {
            self.bump();
            TokenKind::Str(self.quoted(c))
        } else if c == '`' {
            self.bump();
            TokenKind::Ident(self.quoted('`'))
        } else {
            self.operator()
        };

        Some(Token { kind, line, column })
    }

    fn identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                ident.push(c);
                self.bump();
            } else {
                break;
            }
        }
        ident
    }

    fn number(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '.' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }

    /// Read a quoted body after the opening quote has been consumed
    fn quoted(&mut self, quote: char) -> String {
        let mut body = String::new();
        while let Some(c) = self.bump() {
            if c == quote {
                break;
            }
            body.push(c);
            if c == '\\' {
                if let Some(escaped) = self.bump() {
                    body.push(escaped);
                }
            }
        }
        body
    }

    /// `r"(...)"`, `R'[...]'`, `r"---{...}---"`
    fn raw_string_ahead(&self) -> bool {
        let Some(quote) = self.peek_at(1) else {
            return false;
        };
        if quote != '"' && quote != '\'' {
            return false;
        }
        let mut offset = 2;
        while self.peek_at(offset) == Some('-') {
            offset += 1;
        }
        matches!(self.peek_at(offset), Some('(') | Some('[') | Some('{'))
    }

    fn raw_string(&mut self) -> String {
        let quote = self.bump().unwrap_or('"');
        let mut dashes = 0;
        while self.peek() == Some('-') {
            self.bump();
            dashes += 1;
        }
        let close = match self.bump() {
            Some('[') => ']',
            Some('{') => '}',
            _ => ')',
        };

        let mut body = String::new();
        while let Some(c) = self.bump() {
            if c == close && self.closes_raw_string(dashes, quote) {
                for _ in 0..=dashes {
                    self.bump();
                }
                return body;
            }
            body.push(c);
        }
        body
    }

    fn closes_raw_string(&self, dashes: usize, quote: char) -> bool {
        (0..dashes).all(|i| self.peek_at(i) == Some('-')) && self.peek_at(dashes) == Some(quote)
    }

    fn operator(&mut self) -> TokenKind {
        let Some(c) = self.bump() else {
            return TokenKind::Other(String::new());
        };

        match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '\\' => TokenKind::Function,
            '<' => match (self.peek(), self.peek_at(1)) {
                (Some('<'), Some('-')) => {
                    self.bump();
                    self.bump();
                    TokenKind::LeftAssign
                }
                (Some('-'), _) => {
                    self.bump();
                    TokenKind::LeftAssign
                }
                (Some('='), _) => {
                    self.bump();
                    TokenKind::Other("<=".to_string())
                }
                _ => TokenKind::Other("<".to_string()),
            },
            '=' => {
                if self.peek() == Some('=') {
                    self.bump();
                    TokenKind::Other("==".to_string())
                } else {
                    TokenKind::EqAssign
                }
            }
            '-' if self.peek() == Some('>') => {
                self.bump();
                if self.peek() == Some('>') {
                    self.bump();
                    TokenKind::Other("->>".to_string())
                } else {
                    TokenKind::Other("->".to_string())
                }
            }
            '!' | '>' if self.peek() == Some('=') => {
                self.bump();
                TokenKind::Other(format!("{}=", c))
            }
            '%' => {
                // %in%, %>%, user infix operators; never spans lines
                let mut op = String::from('%');
                while let Some(next) = self.peek() {
                    if next == '\n' {
                        break;
                    }
                    op.push(next);
                    self.bump();
                    if next == '%' {
                        break;
                    }
                }
                TokenKind::Other(op)
            }
            other => TokenKind::Other(other.to_string()),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '.'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '.' || c == '_'
}
