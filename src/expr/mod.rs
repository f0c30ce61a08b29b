//! Integer expressions typed at prompts and in colon commands.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := bitwise
//! bitwise := additive  (('&' | '^' | '|') additive)*
//! additive:= product   (('+' | '-') product)*
//! product := term      (('*' | '/' | '%') term)*
//! term    := '$' | literal
//! literal := ['0x' | '0o' | '0b'] digits
//! ```
//!
//! The evaluator splits the text at the first operator of the loosest level present and
//! evaluates both halves recursively, so `2+3*4` is `14`. Splitting at the first occurrence
//! makes operators of one level group to the right: `8-2-1` is `8-(2-1)`.
//!
//! There is no unary minus and no parentheses. `$` stands for the current effective
//! address. All arithmetic is 64-bit signed and checked.
//!
//! In radix-16 contexts `0b` is read as hex digits, not as a binary prefix.

use thiserror::Error;

/// Errors from [`evaluate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// An operand that does not start with a digit of the active radix.
    #[error("malformed number: {0:?}")]
    MalformedLiteral(String),

    /// Digits followed by characters that are not digits.
    #[error("unexpected characters after number: {0:?}")]
    TrailingCharacters(String),

    /// Result outside the signed 64-bit range.
    #[error("integer overflow in {0:?}")]
    Overflow(String),

    /// `/` or `%` with a zero right-hand side.
    #[error("division by zero in {0:?}")]
    DivisionByZero(String),
}

/// Values an expression may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalContext {
    /// Value of `$`.
    pub here: i64,
    /// Radix for literals without a prefix.
    pub radix: u32,
}

impl EvalContext {
    /// Context with the given default radix and `$` bound to `here`.
    pub fn new(radix: u32, here: i64) -> Self {
        Self { here, radix }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    And,
    Xor,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Operator levels, loosest first.
const LEVELS: [&[(char, Op)]; 3] = [
    &[('&', Op::And), ('^', Op::Xor), ('|', Op::Or)],
    &[('+', Op::Add), ('-', Op::Sub)],
    &[('*', Op::Mul), ('/', Op::Div), ('%', Op::Rem)],
];

impl Op {
    fn apply(self, lhs: i64, rhs: i64, text: &str) -> Result<i64, ExprError> {
        let overflow = || ExprError::Overflow(text.to_string());
        match self {
            Op::And => Ok(lhs & rhs),
            Op::Xor => Ok(lhs ^ rhs),
            Op::Or => Ok(lhs | rhs),
            Op::Add => lhs.checked_add(rhs).ok_or_else(overflow),
            Op::Sub => lhs.checked_sub(rhs).ok_or_else(overflow),
            Op::Mul => lhs.checked_mul(rhs).ok_or_else(overflow),
            Op::Div | Op::Rem if rhs == 0 => Err(ExprError::DivisionByZero(text.to_string())),
            Op::Div => lhs.checked_div(rhs).ok_or_else(overflow),
            Op::Rem => lhs.checked_rem(rhs).ok_or_else(overflow),
        }
    }
}

/// Evaluate `text` in the given context.
///
/// Input is trimmed and lowercased first, so `0XFF` and ` $ ` are accepted.
///
/// # Errors
///
/// Returns [`ExprError`] for malformed literals, overflow, or division by zero.
pub fn evaluate(text: &str, ctx: &EvalContext) -> Result<i64, ExprError> {
    let normalized = text.trim().to_lowercase();
    eval(&normalized, ctx)
}

fn eval(text: &str, ctx: &EvalContext) -> Result<i64, ExprError> {
    for level in LEVELS {
        let split = text.char_indices().find_map(|(at, c)| {
            level
                .iter()
                .find(|(symbol, _)| *symbol == c)
                .map(|(_, op)| (at, *op))
        });
        if let Some((at, op)) = split {
            let lhs = eval(&text[..at], ctx)?;
            let rhs = eval(&text[at + 1..], ctx)?;
            return op.apply(lhs, rhs, text);
        }
    }
    term(text.trim(), ctx)
}

fn term(text: &str, ctx: &EvalContext) -> Result<i64, ExprError> {
    if text == "$" {
        return Ok(ctx.here);
    }

    let (radix, digits) = if let Some(rest) = text.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = text.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = text.strip_prefix("0b").filter(|_| ctx.radix != 16) {
        (2, rest)
    } else {
        (ctx.radix, text)
    };

    let mut value: i64 = 0;
    let mut consumed = 0;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            if consumed == 0 {
                return Err(ExprError::MalformedLiteral(text.to_string()));
            }
            return Err(ExprError::TrailingCharacters(text.to_string()));
        };
        value = value
            .checked_mul(i64::from(radix))
            .and_then(|v| v.checked_add(i64::from(digit)))
            .ok_or_else(|| ExprError::Overflow(text.to_string()))?;
        consumed += 1;
    }

    if consumed == 0 {
        return Err(ExprError::MalformedLiteral(text.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
