//! Columnar arithmetic expressions such as `price * qty + 1`.
//!
//! Tokens are separated by whitespace only (`a+b` is one token). Parsing converts the infix
//! expression to postfix with the shunting-yard algorithm, resolving column labels against a
//! bound [`DataFrame`]; evaluation runs the postfix sequence over a value stack, broadcasting
//! numeric literals against columns.

use std::borrow::Cow;
use std::fmt;

use crate::error::{DataError, DataResult};
use crate::frame::DataFrame;
use crate::series::{BinaryOp, Series};
use crate::types::{Value, ValueKind, detect_text, parse_cell};

/// One element of a parsed postfix expression.
#[derive(Debug, Clone, PartialEq)]
pub enum PostfixToken<'df> {
    /// Numeric literal, typed by detection (`2` is an integer, `2.0` a float).
    Literal(Value),
    /// Column resolved from the bound frame.
    Column(&'df Series),
    Operator(BinaryOp),
}

impl fmt::Display for PostfixToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixToken::Literal(v) => write!(f, "{v}"),
            PostfixToken::Column(s) => f.write_str(s.label()),
            PostfixToken::Operator(op) => write!(f, "{op}"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pending {
    OpenParen,
    Operator(BinaryOp),
}

/// A parsed expression bound to the frame its columns came from.
#[derive(Debug, Clone)]
pub struct SeriesExpression<'df> {
    infix: String,
    postfix: Vec<PostfixToken<'df>>,
    row_count: usize,
}

impl<'df> SeriesExpression<'df> {
    /// Parses `expression` against `frame`.
    ///
    /// Fails with [`DataError::ColumnNotFound`] for an operand that is neither a number nor a
    /// column label, and with [`DataError::Expression`] for empty input or unbalanced
    /// parentheses.
    pub fn parse(expression: &str, frame: &'df DataFrame) -> DataResult<Self> {
        let mut postfix = Vec::new();
        let mut pending: Vec<Pending> = Vec::new();

        for token in expression.split_whitespace() {
            match token {
                "(" => pending.push(Pending::OpenParen),
                ")" => loop {
                    match pending.pop() {
                        Some(Pending::Operator(op)) => postfix.push(PostfixToken::Operator(op)),
                        Some(Pending::OpenParen) => break,
                        None => {
                            return Err(DataError::expression(
                                "unbalanced parentheses: ')' without matching '('",
                            ));
                        }
                    }
                },
                _ => match BinaryOp::from_symbol(token) {
                    Some(op) => {
                        while let Some(&Pending::Operator(top)) = pending.last() {
                            if top.precedence() < op.precedence() {
                                break;
                            }
                            postfix.push(PostfixToken::Operator(top));
                            pending.pop();
                        }
                        pending.push(Pending::Operator(op));
                    }
                    None => postfix.push(operand(token, frame)?),
                },
            }
        }

        while let Some(item) = pending.pop() {
            match item {
                Pending::Operator(op) => postfix.push(PostfixToken::Operator(op)),
                Pending::OpenParen => {
                    return Err(DataError::expression(
                        "unbalanced parentheses: '(' is never closed",
                    ));
                }
            }
        }

        if postfix.is_empty() {
            return Err(DataError::expression("empty expression"));
        }

        let parsed = Self {
            infix: expression.to_owned(),
            postfix,
            row_count: frame.row_count(),
        };
        tracing::debug!(infix = %parsed.infix, postfix = %parsed.postfix_string(), "parsed expression");
        Ok(parsed)
    }

    pub fn infix(&self) -> &str {
        &self.infix
    }

    pub fn postfix(&self) -> &[PostfixToken<'df>] {
        &self.postfix
    }

    /// Postfix tokens joined by single spaces, e.g. `A B 2 * +`.
    pub fn postfix_string(&self) -> String {
        self.postfix
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Evaluates the expression element-wise.
    ///
    /// The result carries the label of its leftmost column. An expression made only of
    /// literals is broadcast to the frame's row count.
    pub fn evaluate(&self) -> DataResult<Series> {
        let mut stack: Vec<StackValue<'df>> = Vec::new();

        for token in &self.postfix {
            match token {
                PostfixToken::Literal(v) => stack.push(StackValue::Scalar(v.clone())),
                PostfixToken::Column(s) => stack.push(StackValue::Series(Cow::Borrowed(*s))),
                PostfixToken::Operator(op) => {
                    let rhs = stack.pop();
                    let lhs = stack.pop();
                    let (lhs, rhs) = match (lhs, rhs) {
                        (Some(lhs), Some(rhs)) => (lhs, rhs),
                        _ => {
                            return Err(DataError::expression(format!(
                                "operator '{op}' is missing an operand"
                            )));
                        }
                    };
                    stack.push(combine(*op, lhs, rhs)?);
                }
            }
        }

        let result = stack.pop();
        if !stack.is_empty() {
            return Err(DataError::expression(format!(
                "{} operands are not joined by an operator",
                stack.len() + 1
            )));
        }
        match result {
            Some(StackValue::Series(s)) => Ok(s.into_owned()),
            Some(StackValue::Scalar(v)) => Series::zeros("", self.row_count).add(v),
            None => Err(DataError::expression("empty expression")),
        }
    }
}

impl fmt::Display for SeriesExpression<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.postfix_string())
    }
}

fn operand<'df>(token: &str, frame: &'df DataFrame) -> DataResult<PostfixToken<'df>> {
    match detect_text(token) {
        ValueKind::Int64 | ValueKind::Float64 => Ok(PostfixToken::Literal(parse_cell(token))),
        ValueKind::Utf8 | ValueKind::Null => frame.column(token).map(PostfixToken::Column),
    }
}

enum StackValue<'df> {
    Scalar(Value),
    Series(Cow<'df, Series>),
}

fn combine<'df>(op: BinaryOp, lhs: StackValue<'df>, rhs: StackValue<'df>) -> DataResult<StackValue<'df>> {
    let out = match (lhs, rhs) {
        (StackValue::Series(l), StackValue::Series(r)) => l.binary(op, &*r)?,
        (StackValue::Series(l), StackValue::Scalar(v)) => l.binary(op, v)?,
        (StackValue::Scalar(v), StackValue::Series(r)) => {
            Series::constant(r.label(), v, r.len()).binary(op, &*r)?
        }
        (StackValue::Scalar(a), StackValue::Scalar(b)) => {
            return op.apply(&a, &b, 0).map(StackValue::Scalar);
        }
    };
    Ok(StackValue::Series(Cow::Owned(out)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::from_text_columns(vec![
            ("A".into(), vec!["1".into(), "2".into()]),
            ("B".into(), vec!["3".into(), "4".into()]),
            ("C".into(), vec!["".into(), "8".into()]),
        ])
        .unwrap()
    }

    fn eval(expr: &str) -> DataResult<Series> {
        let df = frame();
        SeriesExpression::parse(expr, &df)?.evaluate()
    }

    #[test]
    fn precedence_orders_postfix() {
        let df = frame();
        let e = SeriesExpression::parse("A + B * 2", &df).unwrap();
        assert_eq!(e.postfix_string(), "A B 2 * +");
        assert_eq!(e.to_string(), "A B 2 * +");
        assert_eq!(e.infix(), "A + B * 2");
        assert_eq!(
            e.evaluate().unwrap().values(),
            &[Value::Int64(7), Value::Int64(10)]
        );
    }

    #[test]
    fn parentheses_and_left_associativity() {
        let df = frame();
        let e = SeriesExpression::parse("( A + B ) * 2", &df).unwrap();
        assert_eq!(e.postfix_string(), "A B + 2 *");
        assert_eq!(
            e.evaluate().unwrap().values(),
            &[Value::Int64(8), Value::Int64(12)]
        );

        let e = SeriesExpression::parse("B - A - 1", &df).unwrap();
        assert_eq!(e.postfix_string(), "B A - 1 -");
        assert_eq!(
            e.evaluate().unwrap().values(),
            &[Value::Int64(1), Value::Int64(1)]
        );
    }

    #[test]
    fn left_operand_keeps_infix_order() {
        assert_eq!(
            eval("A - B").unwrap().values(),
            &[Value::Int64(-2), Value::Int64(-2)]
        );
        assert_eq!(
            eval("10 / A").unwrap().values(),
            &[Value::Float64(10.0), Value::Float64(5.0)]
        );
    }

    #[test]
    fn nulls_propagate_through_every_operator() {
        for op in ["+", "-", "*", "/"] {
            let out = eval(&format!("A {op} C")).unwrap();
            assert_eq!(out.values()[0], Value::Null, "operator {op}");
            assert!(!out.values()[1].is_null(), "operator {op}");
        }
    }

    #[test]
    fn literal_only_expression_broadcasts_to_row_count() {
        let out = eval("2 * 3.5").unwrap();
        assert_eq!(out.values(), &[Value::Float64(7.0), Value::Float64(7.0)]);
    }

    #[test]
    fn unknown_column_is_a_lookup_error() {
        assert_eq!(
            eval("A + Z").unwrap_err(),
            DataError::ColumnNotFound { label: "Z".into() }
        );
        // Operators must be separated by spaces.
        assert!(matches!(
            eval("A+B").unwrap_err(),
            DataError::ColumnNotFound { .. }
        ));
    }

    #[test]
    fn malformed_expressions_fail() {
        for bad in ["", "A +", "+ A", "A B", "( A + B", "A + B )", "( )"] {
            assert!(
                matches!(eval(bad), Err(DataError::Expression { .. })),
                "expected expression error for {bad:?}"
            );
        }
    }
}
