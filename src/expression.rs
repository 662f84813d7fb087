//! Arithmetic expressions used to place regions relative to the target footprint.
//!
//! An expression is parsed once into an [`Expr`] tree and evaluated against a set of
//! [`Variables`]. Only two identifiers are known: `targetX` and `targetZ`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TARGET_X: &str = "targetX";
pub const TARGET_Z: &str = "targetZ";

/// Deepest nesting of parentheses and unary signs a parser accepts.
pub const MAX_DEPTH: usize = 256;
/// Longest token stream a parser accepts; bounds chains of binary operators.
pub const MAX_TOKENS: usize = 4096;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("expression is empty")]
    Empty,
    #[error("unexpected character '{found}' at offset {offset} in `{expression}`")]
    UnexpectedChar {
        expression: String,
        found: char,
        offset: usize,
    },
    #[error("unexpected {found} in `{expression}`")]
    UnexpectedToken { expression: String, found: String },
    #[error("invalid number literal `{literal}` in `{expression}`")]
    InvalidNumber { expression: String, literal: String },
    #[error("unknown identifier `{name}` in `{expression}`")]
    UnknownIdentifier { expression: String, name: String },
    #[error("`{expression}` evaluated to a non-finite value")]
    NonFinite { expression: String },
    #[error("expression nests deeper than {limit} levels")]
    TooDeep { limit: usize },
    #[error("expression has more than {limit} tokens")]
    TooLong { limit: usize },
}

pub type Result<T> = std::result::Result<T, ExpressionError>;

/// Values bound to the identifiers an expression may reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Variables {
    pub target_x: f64,
    pub target_z: f64,
}

impl Variables {
    pub fn new(target_x: i32, target_z: i32) -> Self {
        Variables {
            target_x: target_x as f64,
            target_z: target_z as f64,
        }
    }

    fn get(&self, variable: Variable) -> f64 {
        match variable {
            Variable::TargetX => self.target_x,
            Variable::TargetZ => self.target_z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    TargetX,
    TargetZ,
}

impl Variable {
    fn from_identifier(name: &str) -> Option<Self> {
        match name {
            TARGET_X => Some(Variable::TargetX),
            TARGET_Z => Some(Variable::TargetZ),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(Variable),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn eval(&self, variables: &Variables) -> f64 {
        match self {
            Expr::Number(value) => *value,
            Expr::Variable(variable) => variables.get(*variable),
            Expr::Unary(UnaryOp::Neg, operand) => -operand.eval(variables),
            Expr::Unary(UnaryOp::Plus, operand) => operand.eval(variables),
            Expr::Binary(op, lhs, rhs) => {
                let (lhs, rhs) = (lhs.eval(variables), rhs.eval(variables));
                match op {
                    BinOp::Add => lhs + rhs,
                    BinOp::Sub => lhs - rhs,
                    BinOp::Mul => lhs * rhs,
                    BinOp::Div => lhs / rhs,
                }
            }
        }
    }
}

/// A parsed expression that remembers its source text for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    expr: Expr,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self> {
        let expr = Parser::new(source)?.parse()?;
        Ok(Expression {
            source: source.to_string(),
            expr,
        })
    }

    /// Wraps a literal number, as found in configurations that give plain JSON numbers.
    pub fn constant(value: f64) -> Self {
        Expression {
            source: value.to_string(),
            expr: Expr::Number(value),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn evaluate(&self, variables: &Variables) -> Result<f64> {
        let value = self.expr.eval(variables);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExpressionError::NonFinite {
                expression: self.source.clone(),
            })
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parses and evaluates `expression` in one go.
pub fn evaluate(expression: &str, variables: &Variables) -> Result<f64> {
    Expression::parse(expression)?.evaluate(variables)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "number {}", value),
            Token::Ident(name) => write!(f, "identifier `{}`", name),
            Token::Op(op) => write!(f, "operator '{}'", op),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut literal = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ExpressionError::InvalidNumber {
                        expression: source.to_string(),
                        literal: literal.clone(),
                    })?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        name.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            found => {
                return Err(ExpressionError::UnexpectedChar {
                    expression: source.to_string(),
                    found,
                    offset,
                })
            }
        }
    }

    Ok(tokens)
}

// expr    := term (('+' | '-') term)*
// term    := unary (('*' | '/') unary)*
// unary   := ('-' | '+') unary | primary
// primary := number | identifier | '(' expr ')'
struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(ExpressionError::Empty);
        }
        if tokens.len() > MAX_TOKENS {
            return Err(ExpressionError::TooLong { limit: MAX_TOKENS });
        }
        Ok(Parser {
            source,
            tokens,
            pos: 0,
            depth: 0,
        })
    }

    fn parse(mut self) -> Result<Expr> {
        let expr = self.parse_expr()?;
        match self.tokens.get(self.pos) {
            None => Ok(expr),
            Some(token) => Err(self.unexpected(Some(token))),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn unexpected(&self, token: Option<&Token>) -> ExpressionError {
        ExpressionError::UnexpectedToken {
            expression: self.source.to_string(),
            found: token.map_or_else(|| "end of input".to_string(), |t| t.to_string()),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek() {
            let op = if *op == '+' { BinOp::Add } else { BinOp::Sub };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek() {
            let op = if *op == '*' { BinOp::Mul } else { BinOp::Div };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // Every nesting level (a parenthesis or a unary sign) passes through here.
    fn parse_unary(&mut self) -> Result<Expr> {
        if self.depth >= MAX_DEPTH {
            return Err(ExpressionError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let expr = self.parse_unary_inner();
        self.depth -= 1;
        expr
    }

    fn parse_unary_inner(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Op('-')) => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)))
            }
            Some(Token::Op('+')) => {
                self.pos += 1;
                Ok(Expr::Unary(UnaryOp::Plus, Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.bump() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Ident(name)) => Variable::from_identifier(&name)
                .map(Expr::Variable)
                .ok_or_else(|| ExpressionError::UnknownIdentifier {
                    expression: self.source.to_string(),
                    name,
                }),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    other => Err(self.unexpected(other.as_ref())),
                }
            }
            other => Err(self.unexpected(other.as_ref())),
        }
    }
}
