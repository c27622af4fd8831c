//! Comparison and membership operators used by [`Queries`](crate::Queries).

use std::fmt;

/// Operator governing one predicate entry.
///
/// `arity()` counts the operator slot itself, so binary comparisons have an
/// arity of 2 and `Between` an arity of 3. `In` accepts any number of
/// operands. `Set` marks an assignment (consumed by UPDATE/INSERT) and is
/// never rendered as a comparison.
///
/// # Example
/// ```ignore
/// use pgquery::{Operator, Queries};
///
/// let queries = Queries::new()
///     .add_with("age", Operator::Greater, [18])
///     .add_with("age", Operator::Set, [25]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// column = value
    Equal,
    /// column <> value
    Different,
    /// column > value
    Greater,
    /// column >= value
    GreaterOrEqual,
    /// column < value
    Lesser,
    /// column <= value
    LesserOrEqual,
    /// column LIKE pattern
    Like,
    /// column BETWEEN low AND high
    Between,
    /// column IN (values...)
    In,
    /// Assignment: SET column = value
    Set,
}

impl Operator {
    /// All operators, in declaration order.
    pub const ALL: [Operator; 10] = [
        Operator::Equal,
        Operator::Different,
        Operator::Greater,
        Operator::GreaterOrEqual,
        Operator::Lesser,
        Operator::LesserOrEqual,
        Operator::Like,
        Operator::Between,
        Operator::In,
        Operator::Set,
    ];

    /// The SQL token for this operator.
    pub const fn symbol(self) -> &'static str {
        match self {
            Operator::Equal | Operator::Set => "=",
            Operator::Different => "<>",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Lesser => "<",
            Operator::LesserOrEqual => "<=",
            Operator::Like => "LIKE",
            Operator::Between => "BETWEEN",
            Operator::In => "IN",
        }
    }

    /// Expected entry length including the operator slot; `None` is unbounded.
    pub const fn arity(self) -> Option<usize> {
        match self {
            Operator::Between => Some(3),
            Operator::In => None,
            _ => Some(2),
        }
    }

    /// Number of operands this operator expects, `None` when unbounded.
    pub const fn operand_count(self) -> Option<usize> {
        match self.arity() {
            Some(arity) => Some(arity - 1),
            None => None,
        }
    }

    /// Whether this operator marks an assignment rather than a filter.
    pub const fn is_assignment(self) -> bool {
        matches!(self, Operator::Set)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
