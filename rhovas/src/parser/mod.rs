//! Recursive-descent parser

use crate::ast::{
    BinaryOp, CatchClause, Component, ComponentKind, Constructor, Expr, FunctionDef, Import, Lambda,
    Literal, MatchCase, Member, Param, Pattern, Property, Source, Span, Stmt, TypeName, UnaryOp,
};
use crate::error::{CompileError, Result};
use crate::lexer::Token;
use std::rc::Rc;

#[cfg(test)]
mod tests;

/// Parse tokens into a source file
pub fn parse(_filename: &str, source: &str, tokens: Vec<(Token, Span)>) -> Result<Source> {
    let mut parser = Parser::new(source, tokens);
    parser.parse_source()
}

/// Parse tokens into a single statement
pub fn parse_statement(source: &str, tokens: Vec<(Token, Span)>) -> Result<Stmt> {
    let mut parser = Parser::new(source, tokens);
    let stmt = parser.parse_stmt()?;
    parser.expect_eof()?;
    Ok(stmt)
}

/// A line of REPL input: either declarations or a statement
#[derive(Debug, Clone)]
pub enum ReplInput {
    Source(Source),
    Statement(Stmt),
}

/// Declarations (imports, components, constructors, functions) parse as a
/// source file; anything else parses as one statement.
pub fn parse_repl(source: &str, tokens: Vec<(Token, Span)>) -> Result<ReplInput> {
    let declares = matches!(
        tokens.first(),
        Some((
            Token::Import | Token::Class | Token::Interface | Token::Struct | Token::Ctor | Token::Func,
            _
        ))
    );
    if declares {
        parse("<repl>", source, tokens).map(ReplInput::Source)
    } else {
        parse_statement(source, tokens).map(ReplInput::Statement)
    }
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    eof: Span,
}

impl Parser {
    fn new(source: &str, tokens: Vec<(Token, Span)>) -> Self {
        Parser {
            tokens,
            pos: 0,
            eof: Span::new(source.len(), source.len()),
        }
    }

    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn span(&self) -> Span {
        self.tokens.get(self.pos).map(|(_, s)| *s).unwrap_or(self.eof)
    }

    fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1) {
            Some(i) => self.tokens[i].1,
            None => Span::default(),
        }
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T> {
        let found = match self.peek() {
            Some(token) => format!("`{token}`"),
            None => "end of input".to_string(),
        };
        Err(CompileError::parser(
            format!("{}, found {found}", message.into()),
            self.span(),
        ))
    }

    fn expect(&mut self, token: &Token, context: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            self.error(format!("expected `{token}` {context}"))
        }
    }

    fn expect_ident(&mut self, context: &str) -> Result<String> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => self.error(format!("expected identifier {context}")),
        }
    }

    /// Identifier or keyword naming a member after `.`
    fn expect_member_name(&mut self) -> Result<String> {
        let keyword = self.peek().filter(|token| token.is_keyword()).map(Token::to_string);
        match keyword {
            Some(name) => {
                self.pos += 1;
                Ok(name)
            }
            None => self.expect_ident("after `.`"),
        }
    }

    fn expect_eof(&self) -> Result<()> {
        if self.peek().is_none() {
            Ok(())
        } else {
            self.error("expected end of input")
        }
    }

    /// Parses `item (, item)* close`, allowing a trailing comma
    fn comma_list<T>(
        &mut self,
        close: &Token,
        context: &str,
        mut item: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while !self.eat(close) {
            items.push(item(self)?);
            if !self.check(close) {
                self.expect(&Token::Comma, context)?;
            }
        }
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Source and members
    // ------------------------------------------------------------------

    fn parse_source(&mut self) -> Result<Source> {
        let mut imports = Vec::new();
        while self.check(&Token::Import) {
            imports.push(self.parse_import()?);
        }
        let mut members = Vec::new();
        while self.peek().is_some() {
            members.push(self.parse_member()?);
        }
        Ok(Source { imports, members })
    }

    fn parse_import(&mut self) -> Result<Import> {
        self.expect(&Token::Import, "")?;
        let mut path = vec![self.expect_ident("in import path")?];
        while self.eat(&Token::Dot) {
            path.push(self.expect_ident("in import path")?);
        }
        let alias = if self.eat(&Token::As) {
            Some(self.expect_ident("after `as`")?)
        } else {
            None
        };
        self.expect(&Token::Semi, "after import")?;
        Ok(Import { path, alias })
    }

    fn parse_member(&mut self) -> Result<Member> {
        match self.peek() {
            Some(Token::Class) => self.parse_component(ComponentKind::Class),
            Some(Token::Interface) => self.parse_component(ComponentKind::Interface),
            Some(Token::Struct) => self.parse_component(ComponentKind::Struct),
            Some(Token::Var | Token::Val) => self.parse_property().map(|p| Member::Property(Rc::new(p))),
            Some(Token::Ctor) => self.parse_constructor(),
            Some(Token::Func) => self.parse_function().map(|f| Member::Function(Rc::new(f))),
            _ => self.error("expected member declaration (class, interface, struct, var, val, ctor or func)"),
        }
    }

    fn parse_component(&mut self, kind: ComponentKind) -> Result<Member> {
        let start = self.span();
        self.advance();
        let name = self.expect_ident(&format!("after `{}`", kind.keyword()))?;
        if self.check(&Token::Lt) {
            // Generic parameters carry no runtime meaning.
            self.parse_generics()?;
        }
        let mut extends = Vec::new();
        if self.eat(&Token::Colon) {
            extends.push(self.parse_type()?);
            while self.eat(&Token::Comma) {
                extends.push(self.parse_type()?);
            }
        }
        self.expect(&Token::LBrace, &format!("to open the body of `{name}`"))?;
        let mut members = Vec::new();
        while !self.eat(&Token::RBrace) {
            if self.peek().is_none() {
                return self.error(format!("expected `}}` to close the body of `{name}`"));
            }
            members.push(self.parse_member()?);
        }
        Ok(Member::Component(Rc::new(Component {
            kind,
            name,
            extends,
            members,
            span: start.merge(self.prev_span()),
        })))
    }

    fn parse_property(&mut self) -> Result<Property> {
        let start = self.span();
        let mutable = matches!(self.advance(), Some(Token::Var));
        let name = self.expect_ident("after `var`/`val`")?;
        let ty = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let value = if self.eat(&Token::Eq) {
            Some(Rc::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect(&Token::Semi, "after property")?;
        Ok(Property {
            mutable,
            name,
            ty,
            value,
            span: start.merge(self.prev_span()),
        })
    }

    fn parse_constructor(&mut self) -> Result<Member> {
        let start = self.span();
        self.expect(&Token::Ctor, "")?;
        let params = self.parse_params()?;
        let body = Rc::new(self.parse_stmt()?);
        Ok(Member::Constructor(Rc::new(Constructor {
            params,
            body,
            span: start.merge(self.prev_span()),
        })))
    }

    fn parse_function(&mut self) -> Result<FunctionDef> {
        let start = self.span();
        self.expect(&Token::Func, "")?;
        let name = self.parse_function_name()?;
        let params = self.parse_params()?;
        let ret = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = if self.eat(&Token::Semi) {
            None
        } else {
            Some(Rc::new(self.parse_stmt()?))
        };
        Ok(FunctionDef {
            name,
            params,
            ret,
            body,
            span: start.merge(self.prev_span()),
        })
    }

    /// Identifier or overloadable operator: `+ - * / ! == [] []=`
    fn parse_function_name(&mut self) -> Result<String> {
        let name = match self.peek() {
            Some(Token::Ident(name)) => name.clone(),
            Some(Token::Plus) => "+".to_string(),
            Some(Token::Minus) => "-".to_string(),
            Some(Token::Star) => "*".to_string(),
            Some(Token::Slash) => "/".to_string(),
            Some(Token::Bang) => "!".to_string(),
            Some(Token::EqEq) => "==".to_string(),
            Some(Token::LBracket) => {
                self.advance();
                self.expect(&Token::RBracket, "in index operator name")?;
                if self.check(&Token::Eq) {
                    self.advance();
                    return Ok("[]=".to_string());
                }
                return Ok("[]".to_string());
            }
            _ => return self.error("expected function name after `func`"),
        };
        self.advance();
        Ok(name)
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        self.expect(&Token::LParen, "to open parameter list")?;
        self.comma_list(&Token::RParen, "or `)` after parameter", |p| p.parse_param())
    }

    fn parse_param(&mut self) -> Result<Param> {
        let name = self.expect_ident("for parameter name")?;
        let ty = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        Ok(Param { name, ty })
    }

    fn parse_type(&mut self) -> Result<TypeName> {
        let mut name = self.expect_ident("for type name")?;
        while self.check(&Token::Dot) && matches!(self.peek_at(1), Some(Token::Ident(_))) {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_ident("in type name")?);
        }
        let generics = if self.check(&Token::Lt) {
            self.parse_generics()?
        } else {
            Vec::new()
        };
        Ok(TypeName { name, generics })
    }

    fn parse_generics(&mut self) -> Result<Vec<TypeName>> {
        self.expect(&Token::Lt, "")?;
        self.comma_list(&Token::Gt, "or `>` after generic type", |p| p.parse_type())
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek() {
            None => self.error("expected statement"),
            Some(Token::LBrace) => self.parse_block(),
            Some(Token::Var) => self.parse_declaration(),
            Some(Token::Val) if matches!(self.peek_at(1), Some(Token::Ident(_))) => self.parse_declaration(),
            Some(Token::Ident(_)) if self.peek_at(1) == Some(&Token::Colon) => {
                let label = self.expect_ident("")?;
                self.advance();
                let stmt = self.parse_stmt()?;
                Ok(Stmt::Label {
                    label,
                    stmt: Box::new(stmt),
                })
            }
            Some(Token::If) => self.parse_if(),
            Some(Token::Match) => self.parse_match(),
            Some(Token::For) => self.parse_for(),
            Some(Token::While) => self.parse_while(),
            Some(Token::Try) => self.parse_try(),
            Some(Token::Break) => {
                self.advance();
                let label = self.parse_optional_label();
                self.expect(&Token::Semi, "after `break`")?;
                Ok(Stmt::Break(label))
            }
            Some(Token::Continue) => {
                self.advance();
                let label = self.parse_optional_label();
                self.expect(&Token::Semi, "after `continue`")?;
                Ok(Stmt::Continue(label))
            }
            Some(Token::Throw) => {
                self.advance();
                let value = self.parse_expr()?;
                self.expect(&Token::Semi, "after `throw` value")?;
                Ok(Stmt::Throw(value))
            }
            Some(Token::Return) => {
                self.advance();
                let value = if self.check(&Token::Semi) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(&Token::Semi, "after `return`")?;
                Ok(Stmt::Return(value))
            }
            Some(Token::Assert) => self.parse_contract(Stmt::Assert),
            Some(Token::Require) => self.parse_contract(Stmt::Require),
            Some(Token::Ensure) => self.parse_contract(Stmt::Ensure),
            Some(_) => {
                let expr = self.parse_expr()?;
                if self.eat(&Token::Eq) {
                    let value = self.parse_expr()?;
                    self.expect(&Token::Semi, "after assignment")?;
                    Ok(Stmt::Assignment {
                        receiver: expr,
                        value,
                    })
                } else {
                    self.expect(&Token::Semi, "after expression statement")?;
                    Ok(Stmt::Expression(expr))
                }
            }
        }
    }

    fn parse_optional_label(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token::Ident(label)) => {
                let label = label.clone();
                self.advance();
                Some(label)
            }
            _ => None,
        }
    }

    fn parse_block(&mut self) -> Result<Stmt> {
        self.expect(&Token::LBrace, "to open block")?;
        let mut stmts = Vec::new();
        while !self.eat(&Token::RBrace) {
            if self.peek().is_none() {
                return self.error("expected `}` to close block");
            }
            stmts.push(self.parse_stmt()?);
        }
        Ok(Stmt::Block(stmts))
    }

    fn parse_declaration(&mut self) -> Result<Stmt> {
        let mutable = matches!(self.advance(), Some(Token::Var));
        let name = self.expect_ident("after `var`/`val`")?;
        let ty = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let value = if self.eat(&Token::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(&Token::Semi, "after variable declaration")?;
        Ok(Stmt::Declaration {
            mutable,
            name,
            ty,
            value,
        })
    }

    fn parse_condition(&mut self, keyword: &str) -> Result<Expr> {
        self.expect(&Token::LParen, &format!("after `{keyword}`"))?;
        let cond = self.parse_expr()?;
        self.expect(&Token::RParen, &format!("to close `{keyword}` condition"))?;
        Ok(cond)
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.expect(&Token::If, "")?;
        let cond = self.parse_condition("if")?;
        let then_stmt = Box::new(self.parse_stmt()?);
        let else_stmt = if self.eat(&Token::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_stmt,
            else_stmt,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.expect(&Token::While, "")?;
        let cond = self.parse_condition("while")?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::While { cond, body })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        self.expect(&Token::For, "")?;
        self.expect(&Token::LParen, "after `for`")?;
        let name = self.expect_ident("for loop variable")?;
        self.expect(&Token::In, "after loop variable")?;
        let iterable = self.parse_expr()?;
        self.expect(&Token::RParen, "to close `for` header")?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::For {
            name,
            iterable,
            body,
        })
    }

    fn parse_try(&mut self) -> Result<Stmt> {
        self.expect(&Token::Try, "")?;
        let body = Box::new(self.parse_stmt()?);
        let mut catches = Vec::new();
        while self.eat(&Token::Catch) {
            self.expect(&Token::LParen, "after `catch`")?;
            let name = self.expect_ident("for caught value")?;
            self.expect(&Token::Colon, "before caught type")?;
            let ty = self.parse_type()?;
            self.expect(&Token::RParen, "to close `catch` header")?;
            let body = self.parse_stmt()?;
            catches.push(CatchClause { name, ty, body });
        }
        let finally = if self.eat(&Token::Finally) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(Stmt::Try {
            body,
            catches,
            finally,
        })
    }

    fn parse_contract(&mut self, build: fn(Expr) -> Stmt) -> Result<Stmt> {
        self.advance();
        let cond = self.parse_expr()?;
        self.expect(&Token::Semi, "after condition")?;
        Ok(build(cond))
    }

    fn parse_match(&mut self) -> Result<Stmt> {
        self.expect(&Token::Match, "")?;
        let args = if self.eat(&Token::LParen) {
            self.comma_list(&Token::RParen, "or `)` after match argument", |p| p.parse_expr())?
        } else {
            Vec::new()
        };
        self.expect(&Token::LBrace, "to open match cases")?;
        let mut cases = Vec::new();
        while !self.eat(&Token::RBrace) {
            if self.peek().is_none() {
                return self.error("expected `}` to close match");
            }
            let mut patterns = Vec::new();
            loop {
                patterns.push(if args.is_empty() {
                    self.parse_condition_pattern()?
                } else {
                    self.parse_pattern()?
                });
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::Colon, "after match case")?;
            let body = self.parse_stmt()?;
            cases.push(MatchCase { patterns, body });
        }
        Ok(Stmt::Match { args, cases })
    }

    /// Zero-argument match cases are boolean conditions or `else`
    fn parse_condition_pattern(&mut self) -> Result<Pattern> {
        if self.eat(&Token::Else) {
            Ok(Pattern::Else(None))
        } else {
            Ok(Pattern::Expression(self.parse_expr()?))
        }
    }

    fn at_pattern_end(&self, offset: usize) -> bool {
        matches!(
            self.peek_at(offset),
            Some(Token::Comma | Token::Colon | Token::RBracket | Token::RBrace)
        )
    }

    fn parse_pattern(&mut self) -> Result<Pattern> {
        match self.peek() {
            Some(Token::Else) => {
                self.advance();
                if self.at_pattern_end(0) {
                    Ok(Pattern::Else(None))
                } else {
                    Ok(Pattern::Else(Some(Box::new(self.parse_pattern()?))))
                }
            }
            Some(Token::Ident(name)) if self.at_pattern_end(1) => {
                let name = name.clone();
                self.advance();
                Ok(Pattern::Variable((name != "_").then_some(name)))
            }
            Some(Token::LBracket) => self.parse_list_pattern(),
            Some(Token::LBrace) => self.parse_map_pattern(),
            _ => Ok(Pattern::Expression(self.parse_expr()?)),
        }
    }

    /// `name..` at the end of a list or map pattern
    fn parse_rest(&mut self) -> Option<String> {
        match (self.peek(), self.peek_at(1)) {
            (Some(Token::Ident(name)), Some(Token::DotDot)) => {
                let name = name.clone();
                self.pos += 2;
                Some(name)
            }
            _ => None,
        }
    }

    fn parse_list_pattern(&mut self) -> Result<Pattern> {
        self.expect(&Token::LBracket, "")?;
        let mut elements = Vec::new();
        let mut rest = None;
        while !self.eat(&Token::RBracket) {
            if let Some(name) = self.parse_rest() {
                rest = Some(name);
                self.expect(&Token::RBracket, "after rest capture")?;
                break;
            }
            elements.push(self.parse_pattern()?);
            if !self.check(&Token::RBracket) {
                self.expect(&Token::Comma, "or `]` after list pattern element")?;
            }
        }
        Ok(Pattern::List { elements, rest })
    }

    fn parse_map_pattern(&mut self) -> Result<Pattern> {
        self.expect(&Token::LBrace, "")?;
        let mut entries = Vec::new();
        let mut rest = None;
        while !self.eat(&Token::RBrace) {
            if let Some(name) = self.parse_rest() {
                rest = Some(name);
                self.expect(&Token::RBrace, "after rest capture")?;
                break;
            }
            let key = self.expect_ident("for map pattern key")?;
            let pattern = if self.eat(&Token::Colon) {
                self.parse_pattern()?
            } else {
                Pattern::Variable(Some(key.clone()))
            };
            entries.push((key, pattern));
            if !self.check(&Token::RBrace) {
                self.expect(&Token::Comma, "or `}` after map pattern entry")?;
            }
        }
        Ok(Pattern::Map { entries, rest })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_binary(0)
    }

    fn binary_op(&self, level: usize) -> Option<BinaryOp> {
        let op = match (level, self.peek()?) {
            (0, Token::PipePipe) => BinaryOp::Or,
            (1, Token::AmpAmp) => BinaryOp::And,
            (2, Token::EqEq) => BinaryOp::Eq,
            (2, Token::NotEq) => BinaryOp::NotEq,
            (2, Token::EqEqEq) => BinaryOp::Identical,
            (2, Token::NotEqEq) => BinaryOp::NotIdentical,
            (2, Token::Lt) => BinaryOp::Lt,
            (2, Token::LtEq) => BinaryOp::LtEq,
            (2, Token::Gt) => BinaryOp::Gt,
            (2, Token::GtEq) => BinaryOp::GtEq,
            (3, Token::Plus) => BinaryOp::Add,
            (3, Token::Minus) => BinaryOp::Sub,
            (4, Token::Star) => BinaryOp::Mul,
            (4, Token::Slash) => BinaryOp::Div,
            _ => return None,
        };
        Some(op)
    }

    /// Left-associative binary levels: `||`, `&&`, comparison, additive, multiplicative
    fn parse_binary(&mut self, level: usize) -> Result<Expr> {
        if level > 4 {
            return self.parse_unary();
        }
        let mut left = self.parse_binary(level + 1)?;
        while let Some(op) = self.binary_op(level) {
            self.advance();
            let right = self.parse_binary(level + 1)?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Bang) => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        self.advance();
        if op == UnaryOp::Neg {
            match self.peek() {
                Some(Token::IntegerLit(n)) if !matches!(self.peek_at(1), Some(Token::Dot | Token::LBracket)) => {
                    let n = -*n;
                    self.advance();
                    return Ok(Expr::Literal(Literal::Integer(n)));
                }
                Some(Token::DecimalLit(n)) if !matches!(self.peek_at(1), Some(Token::Dot | Token::LBracket)) => {
                    let n = -*n;
                    self.advance();
                    return Ok(Expr::Literal(Literal::Decimal(n)));
                }
                _ => {}
            }
        }
        let expr = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            expr: Box::new(expr),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&Token::Dot) {
                let name = self.expect_member_name()?;
                let receiver = Some(Box::new(expr));
                expr = if self.eat(&Token::LParen) {
                    let args = self.parse_call_args()?;
                    Expr::Call { receiver, name, args }
                } else if self.check(&Token::LBrace) || self.check(&Token::Pipe) {
                    let args = vec![self.parse_lambda()?];
                    Expr::Call { receiver, name, args }
                } else {
                    Expr::Access { receiver, name }
                };
            } else if self.eat(&Token::LBracket) {
                let args = self.comma_list(&Token::RBracket, "or `]` after index", |p| p.parse_expr())?;
                expr = Expr::Index {
                    receiver: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    /// Arguments after `(`, plus an optional trailing lambda
    fn parse_call_args(&mut self) -> Result<Vec<Expr>> {
        let mut args = self.comma_list(&Token::RParen, "or `)` after argument", |p| p.parse_expr())?;
        if self.check(&Token::LBrace) || self.check(&Token::Pipe) {
            args.push(self.parse_lambda()?);
        }
        Ok(args)
    }

    /// `|a, b| body`, `|| body` or a bare block (zero parameters)
    fn parse_lambda(&mut self) -> Result<Expr> {
        let params = match self.peek() {
            Some(Token::PipePipe) => {
                self.advance();
                Vec::new()
            }
            Some(Token::Pipe) => {
                self.advance();
                self.comma_list(&Token::Pipe, "or `|` after lambda parameter", |p| p.parse_param())?
            }
            _ => Vec::new(),
        };
        let body = if self.check(&Token::LBrace) {
            self.parse_block()?
        } else {
            Stmt::Return(Some(self.parse_expr()?))
        };
        Ok(Expr::Lambda(Rc::new(Lambda { params, body })))
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let literal = match self.peek() {
            None => return self.error("expected expression"),
            Some(Token::Null) => Literal::Null,
            Some(Token::True) => Literal::Boolean(true),
            Some(Token::False) => Literal::Boolean(false),
            Some(Token::IntegerLit(n)) => Literal::Integer(*n),
            Some(Token::DecimalLit(n)) => Literal::Decimal(*n),
            Some(Token::CharLit(c)) => Literal::Character(*c),
            Some(Token::StringLit(s)) => Literal::String(s.clone()),
            Some(Token::Colon) => {
                self.advance();
                let name = self.expect_ident("for atom literal")?;
                return Ok(Expr::Literal(Literal::Atom(name)));
            }
            Some(Token::Val) => {
                self.advance();
                return Ok(Expr::variable("val"));
            }
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.advance();
                if self.eat(&Token::LParen) {
                    let args = self.parse_call_args()?;
                    return Ok(Expr::Call {
                        receiver: None,
                        name,
                        args,
                    });
                }
                return Ok(Expr::variable(name));
            }
            Some(Token::LParen) => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&Token::RParen, "to close group")?;
                return Ok(Expr::Group(Box::new(expr)));
            }
            Some(Token::LBracket) => {
                self.advance();
                let elements = self.comma_list(&Token::RBracket, "or `]` after list element", |p| p.parse_expr())?;
                return Ok(Expr::Literal(Literal::List(elements)));
            }
            Some(Token::LBrace) => {
                self.advance();
                let entries = self.comma_list(&Token::RBrace, "or `}` after map entry", |p| {
                    let key = match p.peek() {
                        Some(Token::StringLit(key)) => {
                            let key = key.clone();
                            p.advance();
                            key
                        }
                        _ => p.expect_ident("for map key")?,
                    };
                    p.expect(&Token::Colon, "after map key")?;
                    Ok((key, p.parse_expr()?))
                })?;
                return Ok(Expr::Literal(Literal::Map(entries)));
            }
            Some(Token::Pipe | Token::PipePipe) => return self.parse_lambda(),
            Some(Token::Dsl(block)) => {
                let expr = Expr::Dsl {
                    name: block.name.clone(),
                    source: block.source.clone(),
                };
                self.advance();
                return Ok(expr);
            }
            Some(_) => return self.error("expected expression"),
        };
        self.advance();
        Ok(Expr::Literal(literal))
    }
}
