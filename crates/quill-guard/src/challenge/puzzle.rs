//! Arithmetic puzzles.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Closed set of operators a puzzle may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Self::Add, Self::Subtract, Self::Multiply];

    /// Symbol shown in the prompt.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "×",
        }
    }

    /// Evaluate `left op right`, or `None` on overflow.
    pub fn apply(&self, left: i64, right: i64) -> Option<i64> {
        match self {
            Self::Add => left.checked_add(right),
            Self::Subtract => left.checked_sub(right),
            Self::Multiply => left.checked_mul(right),
        }
    }
}

/// A puzzle: two operands and an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Puzzle {
    pub left: i64,
    pub right: i64,
    pub operator: Operator,
}

impl Puzzle {
    /// Build a puzzle. Subtraction operands are ordered so the answer is
    /// never negative.
    pub fn new(left: i64, right: i64, operator: Operator) -> Self {
        let (left, right) = match operator {
            Operator::Subtract if right > left => (right, left),
            _ => (left, right),
        };
        Self {
            left,
            right,
            operator,
        }
    }

    /// Random puzzle with operands in `1..=max_operand`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, max_operand: u32) -> Self {
        let max = i64::from(max_operand.max(1));
        let left = rng.gen_range(1..=max);
        let right = rng.gen_range(1..=max);
        let operator = Operator::ALL[rng.gen_range(0..Operator::ALL.len())];
        Self::new(left, right, operator)
    }

    /// Text shown to the commenter.
    pub fn prompt(&self) -> String {
        format!("What is {} {} {}?", self.left, self.operator.symbol(), self.right)
    }

    /// Expected answer, or `None` if it overflows.
    pub fn answer(&self) -> Option<i64> {
        self.operator.apply(self.left, self.right)
    }
}
