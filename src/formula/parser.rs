//! Formula parsing.
//!
//! A formula is a whitespace-separated run `operand op operand op operand ...`
//! with `op ∈ {+, -}`. It parses into a left-leaning chain of
//! [`OperationNode`]s, so `A + B - C` becomes `(A + B) - C`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
}

impl Operator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
        }
    }

    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Sub => left - right,
        }
    }
}

/// Left-hand side of an operation: a series name or an earlier operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Leaf(String),
    Node(Box<OperationNode>),
}

/// One binary `+`/`-` step of a formula.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationNode {
    pub operator: Operator,
    pub left: Operand,
    pub right: String,
}

impl OperationNode {
    /// Operand names in source order.
    pub fn leaves(&self) -> Vec<&str> {
        let mut names = match &self.left {
            Operand::Leaf(name) => vec![name.as_str()],
            Operand::Node(inner) => inner.leaves(),
        };
        names.push(self.right.as_str());
        names
    }

    /// Number of operations in the chain.
    pub fn depth(&self) -> usize {
        match &self.left {
            Operand::Leaf(_) => 1,
            Operand::Node(inner) => inner.depth() + 1,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Leaf(name) => f.write_str(name),
            Operand::Node(inner) => write!(f, "{inner}"),
        }
    }
}

impl fmt::Display for OperationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator.symbol(), self.right)
    }
}

fn operand(token: &str, position: usize) -> Result<String, SignalError> {
    if Operator::from_token(token).is_some() {
        return Err(SignalError::malformed(format!(
            "expected an operand at token {position}, found operator '{token}'"
        )));
    }
    Ok(token.to_string())
}

fn operator(token: &str, position: usize) -> Result<Operator, SignalError> {
    Operator::from_token(token).ok_or_else(|| {
        SignalError::malformed(format!(
            "expected '+' or '-' at token {position}, found '{token}'"
        ))
    })
}

/// Parse formula text into an operation chain.
///
/// # Errors
/// `MalformedInput` unless the text has an odd number (≥ 3) of tokens with
/// operands at even and `+`/`-` at odd positions.
pub fn parse(text: &str) -> Result<OperationNode, SignalError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 3 || tokens.len() % 2 == 0 {
        return Err(SignalError::malformed(format!(
            "formula '{}' has {} tokens; expected 'operand (+|-) operand ...'",
            text.trim(),
            tokens.len()
        )));
    }

    let mut node = OperationNode {
        operator: operator(tokens[1], 1)?,
        left: Operand::Leaf(operand(tokens[0], 0)?),
        right: operand(tokens[2], 2)?,
    };

    let mut pos = 3;
    while pos < tokens.len() {
        node = OperationNode {
            operator: operator(tokens[pos], pos)?,
            left: Operand::Node(Box::new(node)),
            right: operand(tokens[pos + 1], pos + 1)?,
        };
        pos += 2;
    }

    Ok(node)
}
