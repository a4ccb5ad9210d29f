//! Token definitions

use logos::{Lexer, Logos};

/// Raw text of an embedded DSL block: `#name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct DslBlock {
    pub name: String,
    pub source: String,
}

/// Rhovas token
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // Keywords
    #[token("import")]
    Import,
    #[token("as")]
    As,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("struct")]
    Struct,
    #[token("var")]
    Var,
    #[token("val")]
    Val,
    #[token("ctor")]
    Ctor,
    #[token("func")]
    Func,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("match")]
    Match,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("while")]
    While,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("throw")]
    Throw,
    #[token("return")]
    Return,
    #[token("assert")]
    Assert,
    #[token("require")]
    Require,
    #[token("ensure")]
    Ensure,
    #[token("null")]
    Null,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // Literals
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok(), priority = 3)]
    DecimalLit(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok(), priority = 2)]
    IntegerLit(i64),

    #[regex(r#""([^"\\\n\r]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len() - 1]).map(|chars| chars.into_iter().collect::<String>())
    })]
    StringLit(String),

    #[regex(r"'([^'\\\n\r]|\\.)'", |lex| {
        let s = lex.slice();
        let mut chars = unescape(&s[1..s.len() - 1])?.into_iter();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    })]
    CharLit(char),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_]*", lex_dsl)]
    Dsl(DslBlock),

    // Operators
    #[token("||")]
    PipePipe,
    #[token("&&")]
    AmpAmp,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("!")]
    Bang,
    #[token("=")]
    Eq,
    #[token("|")]
    Pipe,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Punctuation
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
}

/// Processes backslash escapes; `None` on an unknown escape
fn unescape(raw: &str) -> Option<Vec<char>> {
    let mut result = Vec::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        result.push(match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            _ => return None,
        });
    }
    Some(result)
}

/// Consumes the brace-delimited body following `#name`. Braces nest.
fn lex_dsl(lex: &mut Lexer<Token>) -> Option<DslBlock> {
    let name = lex.slice()[1..].to_string();
    let rest = lex.remainder();
    let open = rest.find(|c: char| !matches!(c, ' ' | '\t'))?;
    if !rest[open..].starts_with('{') {
        return None;
    }
    let mut depth = 0usize;
    for (offset, c) in rest[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let body = &rest[open + 1..open + offset];
                    let source = dedent(body);
                    lex.bump(open + offset + 1);
                    return Some(DslBlock { name, source });
                }
            }
            _ => {}
        }
    }
    None
}

/// Single-line bodies are trimmed. Multi-line bodies lose the indentation of
/// their first non-blank line along with the leading and trailing blank lines.
pub fn dedent(body: &str) -> String {
    if !body.contains('\n') {
        return body.trim().to_string();
    }
    let lines: Vec<&str> = body.lines().collect();
    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let indent = lines[first].len() - lines[first].trim_start().len();
    lines[first..=last]
        .iter()
        .map(|line| {
            let width = line.len() - line.trim_start().len();
            &line[width.min(indent)..]
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl Token {
    /// Reserved words, which are still valid member names after `.`
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Import
                | Token::As
                | Token::Class
                | Token::Interface
                | Token::Struct
                | Token::Var
                | Token::Val
                | Token::Ctor
                | Token::Func
                | Token::If
                | Token::Else
                | Token::Match
                | Token::For
                | Token::In
                | Token::While
                | Token::Try
                | Token::Catch
                | Token::Finally
                | Token::Break
                | Token::Continue
                | Token::Throw
                | Token::Return
                | Token::Assert
                | Token::Require
                | Token::Ensure
                | Token::Null
                | Token::True
                | Token::False
        )
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Import => write!(f, "import"),
            Token::As => write!(f, "as"),
            Token::Class => write!(f, "class"),
            Token::Interface => write!(f, "interface"),
            Token::Struct => write!(f, "struct"),
            Token::Var => write!(f, "var"),
            Token::Val => write!(f, "val"),
            Token::Ctor => write!(f, "ctor"),
            Token::Func => write!(f, "func"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::Match => write!(f, "match"),
            Token::For => write!(f, "for"),
            Token::In => write!(f, "in"),
            Token::While => write!(f, "while"),
            Token::Try => write!(f, "try"),
            Token::Catch => write!(f, "catch"),
            Token::Finally => write!(f, "finally"),
            Token::Break => write!(f, "break"),
            Token::Continue => write!(f, "continue"),
            Token::Throw => write!(f, "throw"),
            Token::Return => write!(f, "return"),
            Token::Assert => write!(f, "assert"),
            Token::Require => write!(f, "require"),
            Token::Ensure => write!(f, "ensure"),
            Token::Null => write!(f, "null"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::DecimalLit(n) => write!(f, "{n}"),
            Token::IntegerLit(n) => write!(f, "{n}"),
            Token::StringLit(s) => write!(f, "\"{s}\""),
            Token::CharLit(c) => write!(f, "'{c}'"),
            Token::Ident(s) => write!(f, "{s}"),
            Token::Dsl(block) => write!(f, "#{} {{ ... }}", block.name),
            Token::PipePipe => write!(f, "||"),
            Token::AmpAmp => write!(f, "&&"),
            Token::EqEqEq => write!(f, "==="),
            Token::NotEqEq => write!(f, "!=="),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::LtEq => write!(f, "<="),
            Token::GtEq => write!(f, ">="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Bang => write!(f, "!"),
            Token::Eq => write!(f, "="),
            Token::Pipe => write!(f, "|"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::DotDot => write!(f, ".."),
            Token::Dot => write!(f, "."),
            Token::Comma => write!(f, ","),
            Token::Semi => write!(f, ";"),
            Token::Colon => write!(f, ":"),
        }
    }
}
