//! Locator expression parser.
//!
//! Recursive descent over the lexed token stream, producing the `Expr`
//! tree the compiler flattens. Covers the XPath 1.0 subset induced
//! locators and their predicates draw from: child and sibling navigation,
//! the parent, self, descendant, and attribute axes, positional and
//! general predicates, unions, and the core function library.

use super::lexer::{Lexer, Token};

/// Expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Bare `/`: the document node.
    Root,
    /// `.` as a primary.
    Current,
    /// `..` as a primary.
    Parent,
    /// `left | right`.
    Union(Box<Expr>, Box<Expr>),
    /// One location step applied to the node-set `base` produces.
    Path(Box<Expr>, Box<LocationStep>),
    /// `base[predicate]` where the predicate is not part of a step.
    Filter(Box<Expr>, Box<Expr>),
    /// Core-library function call.
    Call(String, Vec<Expr>),
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    Neg(Box<Expr>),
    Number(f64),
    Literal(String),
    /// A relative path beginning with a bare step.
    Step(Box<LocationStep>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// One step of a location path.
#[derive(Debug, Clone)]
pub struct LocationStep {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl LocationStep {
    /// `.` and `..` abbreviate to a bare axis over `node()`.
    fn abbreviated(axis: Axis) -> Self {
        LocationStep {
            axis,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    FollowingSibling,
    PrecedingSibling,
    SelfAxis,
    Attribute,
}

impl Axis {
    pub fn parse(name: &str) -> Option<Axis> {
        Some(match name {
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "parent" => Axis::Parent,
            "following-sibling" => Axis::FollowingSibling,
            "preceding-sibling" => Axis::PrecedingSibling,
            "self" => Axis::SelfAxis,
            "attribute" => Axis::Attribute,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum NodeTest {
    /// Element with this exact name.
    Named(String),
    /// `*`: any element.
    Wildcard,
    /// `node()`: any node kind.
    Node,
    /// `text()`.
    Text,
    /// `comment()`.
    Comment,
}

/// Parse one complete locator expression.
pub fn parse(input: &str) -> Result<Expr, String> {
    Parser::new(input).parse()
}

pub struct Parser {
    /// Token stream; the last element is always `End`.
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        let mut tokens = Lexer::new(input).tokenize();
        tokens.push(Token::End);
        Parser { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Expr, String> {
        let expr = self.expr()?;
        match self.current() {
            Token::End => Ok(expr),
            other => Err(format!("trailing input after expression: {:?}", other)),
        }
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expect(&mut self, token: Token, context: &str) -> Result<(), String> {
        if *self.current() == token {
            self.bump();
            Ok(())
        } else {
            Err(format!(
                "expected {:?} {}, found {:?}",
                token,
                context,
                self.current()
            ))
        }
    }

    fn expr(&mut self) -> Result<Expr, String> {
        self.binary_expr(0)
    }

    /// Left-associative binary operators by binding strength; everything
    /// tighter than a union is handled below.
    fn binary_expr(&mut self, min_strength: u8) -> Result<Expr, String> {
        let mut left = self.unary_expr()?;
        while let Some((op, strength)) = binding(self.current()) {
            if strength < min_strength {
                break;
            }
            self.bump();
            let right = self.binary_expr(strength + 1)?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn unary_expr(&mut self) -> Result<Expr, String> {
        if *self.current() == Token::Minus {
            self.bump();
            Ok(Expr::Neg(Box::new(self.unary_expr()?)))
        } else {
            self.union_expr()
        }
    }

    fn union_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.path_expr()?;
        while *self.current() == Token::Pipe {
            self.bump();
            let right = self.path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// An absolute or relative location path, including any trailing
    /// steps and filters on a primary head.
    fn path_expr(&mut self) -> Result<Expr, String> {
        let mut expr = match self.current() {
            Token::Slash => {
                self.bump();
                if self.at_path_end() {
                    return Ok(Expr::Root);
                }
                let step = self.location_step(Axis::Child)?;
                Expr::Path(Box::new(Expr::Root), Box::new(step))
            }
            Token::SlashSlash => {
                self.bump();
                let step = self.location_step(Axis::Child)?;
                Expr::Path(Box::new(descend(Expr::Root)), Box::new(step))
            }
            _ => self.primary_expr()?,
        };

        loop {
            match self.current() {
                Token::Slash => {
                    self.bump();
                    let step = self.location_step(Axis::Child)?;
                    expr = Expr::Path(Box::new(expr), Box::new(step));
                }
                Token::SlashSlash => {
                    self.bump();
                    let step = self.location_step(Axis::Child)?;
                    expr = Expr::Path(Box::new(descend(expr)), Box::new(step));
                }
                Token::OpenBracket => {
                    self.bump();
                    let predicate = self.expr()?;
                    self.expect(Token::CloseBracket, "to close the predicate")?;
                    expr = Expr::Filter(Box::new(expr), Box::new(predicate));
                }
                _ => return Ok(expr),
            }
        }
    }

    /// Tokens that may legally follow a bare `/`.
    fn at_path_end(&self) -> bool {
        matches!(
            self.current(),
            Token::End | Token::CloseBracket | Token::CloseParen | Token::Pipe | Token::Comma
        )
    }

    fn primary_expr(&mut self) -> Result<Expr, String> {
        match self.current().clone() {
            Token::Number(value) => {
                self.bump();
                Ok(Expr::Number(value))
            }
            Token::Literal(value) => {
                self.bump();
                Ok(Expr::Literal(value))
            }
            Token::OpenParen => {
                self.bump();
                let inner = self.expr()?;
                self.expect(Token::CloseParen, "to close the group")?;
                Ok(inner)
            }
            Token::Name(name) => {
                if *self.peek() == Token::OpenParen {
                    self.bump();
                    self.bump();
                    let args = self.call_args()?;
                    Ok(Expr::Call(name, args))
                } else {
                    let step = self.location_step(Axis::Child)?;
                    Ok(Expr::Step(Box::new(step)))
                }
            }
            // A path can open with a kind test, a wildcard, an attribute
            // access, or a spelled-out axis; all of these are steps
            Token::NodeKind(_) | Token::Star | Token::At | Token::AxisName(_) => {
                let step = self.location_step(Axis::Child)?;
                Ok(Expr::Step(Box::new(step)))
            }
            Token::Dot => {
                self.bump();
                Ok(Expr::Current)
            }
            Token::DotDot => {
                self.bump();
                Ok(Expr::Parent)
            }
            other => Err(format!("unexpected token: {:?}", other)),
        }
    }

    fn location_step(&mut self, default_axis: Axis) -> Result<LocationStep, String> {
        // Abbreviated steps take no node test and no predicates; the
        // locator compiler emits `..` mid-path for every climb
        if *self.current() == Token::Dot {
            self.bump();
            return Ok(LocationStep::abbreviated(Axis::SelfAxis));
        }
        if *self.current() == Token::DotDot {
            self.bump();
            return Ok(LocationStep::abbreviated(Axis::Parent));
        }

        let mut axis = default_axis;
        if *self.current() == Token::At {
            self.bump();
            axis = Axis::Attribute;
        }
        if let Token::AxisName(name) = self.current().clone() {
            axis = Axis::parse(&name).ok_or_else(|| format!("unsupported axis: {}", name))?;
            self.bump();
            self.expect(Token::ColonColon, "after the axis name")?;
        }

        let test = self.node_test()?;

        let mut predicates = Vec::new();
        while *self.current() == Token::OpenBracket {
            self.bump();
            predicates.push(self.expr()?);
            self.expect(Token::CloseBracket, "to close the predicate")?;
        }

        Ok(LocationStep {
            axis,
            test,
            predicates,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest, String> {
        match self.current().clone() {
            Token::Star => {
                self.bump();
                Ok(NodeTest::Wildcard)
            }
            Token::Name(name) => {
                self.bump();
                Ok(NodeTest::Named(name))
            }
            Token::NodeKind(kind) => {
                self.bump();
                self.expect(Token::OpenParen, "after the node kind")?;
                self.expect(Token::CloseParen, "after the node kind")?;
                match kind.as_str() {
                    "node" => Ok(NodeTest::Node),
                    "text" => Ok(NodeTest::Text),
                    "comment" => Ok(NodeTest::Comment),
                    other => Err(format!("unknown node kind: {}", other)),
                }
            }
            other => Err(format!("expected a node test, found {:?}", other)),
        }
    }

    fn call_args(&mut self) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();
        if *self.current() != Token::CloseParen {
            args.push(self.expr()?);
            while *self.current() == Token::Comma {
                self.bump();
                args.push(self.expr()?);
            }
        }
        self.expect(Token::CloseParen, "to close the argument list")?;
        Ok(args)
    }
}

/// Wrap `base` in the `descendant-or-self::node()` step that `//`
/// abbreviates.
fn descend(base: Expr) -> Expr {
    Expr::Path(
        Box::new(base),
        Box::new(LocationStep {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }),
    )
}

/// Binding strength per binary operator, loosest first. Unary minus and
/// union bind tighter and live outside this table.
fn binding(token: &Token) -> Option<(BinaryOp, u8)> {
    Some(match token {
        Token::Or => (BinaryOp::Or, 1),
        Token::And => (BinaryOp::And, 2),
        Token::Eq => (BinaryOp::Eq, 3),
        Token::Ne => (BinaryOp::Ne, 3),
        Token::Lt => (BinaryOp::Lt, 4),
        Token::Le => (BinaryOp::Le, 4),
        Token::Gt => (BinaryOp::Gt, 4),
        Token::Ge => (BinaryOp::Ge, 4),
        Token::Plus => (BinaryOp::Add, 5),
        Token::Minus => (BinaryOp::Sub, 5),
        Token::Star => (BinaryOp::Mul, 6),
        Token::Div => (BinaryOp::Div, 6),
        Token::Mod => (BinaryOp::Mod, 6),
        _ => return None,
    })
}
