//! Expression AST definitions.
//!
//! Every node carries a canonical display label. The label is the default
//! output column name of a selected expression and the key under which its
//! value is memoized per row, so two nodes with the same label are assumed
//! to compute the same value.

use crate::access::Value;
use crate::expression::operator::{BinaryOperator, CastType, UnaryOperator};
use crate::expression::pattern::PatternKind;
use std::fmt;

/// Expression tree node together with its canonical label
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub label: String,
}

/// Set quantifier written inside a call or after SELECT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetQuantifier {
    Distinct,
    All,
}

impl SetQuantifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            SetQuantifier::Distinct => "distinct",
            SetQuantifier::All => "all",
        }
    }
}

impl fmt::Display for SetQuantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Value),

    /// Bare field name, resolved through the context's field tables
    Field(String),

    /// `alias.field`
    QualifiedField { table: String, field: String },

    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Unary {
        op: UnaryOperator,
        operand: Box<Expr>,
    },

    IsNull {
        operand: Box<Expr>,
        negated: bool,
    },

    InList {
        operand: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    Pattern {
        kind: PatternKind,
        operand: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
    },

    Cast {
        operand: Box<Expr>,
        target: CastType,
    },

    /// Searched CASE when `operand` is absent, simple CASE otherwise
    Case {
        operand: Option<Box<Expr>>,
        branches: Vec<(Expr, Expr)>,
        else_result: Option<Box<Expr>>,
    },

    Call {
        name: String,
        args: Vec<Expr>,
        quantifier: Option<SetQuantifier>,
    },

    /// `base[index]`
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },

    Alias {
        inner: Box<Expr>,
        alias: String,
    },

    /// Call evaluated over partitions, see [`WindowSpec`]
    Window(Box<WindowSpec>),
}

/// Sort direction of an ORDER BY item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expr: Expr,
    pub order: SortOrder,
}

impl OrderItem {
    pub fn new(expr: Expr, order: SortOrder) -> Self {
        Self { expr, order }
    }

    pub fn asc(expr: Expr) -> Self {
        Self::new(expr, SortOrder::Asc)
    }

    pub fn desc(expr: Expr) -> Self {
        Self::new(expr, SortOrder::Desc)
    }
}

/// `LIMIT count` / `LIMIT offset, count`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitClause {
    pub offset: usize,
    pub count: Option<usize>,
}

impl LimitClause {
    pub fn new(offset: usize, count: Option<usize>) -> Self {
        Self { offset, count }
    }
}

/// One entry of a SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// `*`
    Wildcard,
    /// `alias.*`
    QualifiedWildcard(String),
    Expr(Expr),
}

/// One end of a `ROWS BETWEEN` frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(usize),
    CurrentRow,
    Following(usize),
    UnboundedFollowing,
}

impl FrameBound {
    /// Row index this bound designates for the row at `row` of a partition
    /// with `len` rows. The result may fall outside the partition and
    /// saturates at the ends of `i64`.
    pub fn position(&self, row: usize, len: usize) -> i64 {
        let row = i64::try_from(row).unwrap_or(i64::MAX);
        let offset = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        match self {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::Preceding(n) => row.saturating_sub(offset(*n)),
            FrameBound::CurrentRow => row,
            FrameBound::Following(n) => row.saturating_add(offset(*n)),
            FrameBound::UnboundedFollowing => i64::try_from(len).unwrap_or(i64::MAX) - 1,
        }
    }
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameBound::UnboundedPreceding => f.write_str("unbounded preceding"),
            FrameBound::Preceding(n) => write!(f, "{} preceding", n),
            FrameBound::CurrentRow => f.write_str("current row"),
            FrameBound::Following(n) => write!(f, "{} following", n),
            FrameBound::UnboundedFollowing => f.write_str("unbounded following"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: FrameBound,
    pub end: FrameBound,
}

impl FrameRange {
    pub fn new(start: FrameBound, end: FrameBound) -> Self {
        Self { start, end }
    }

    /// True when the frame always covers the whole partition
    pub fn is_whole_partition(&self) -> bool {
        self.start == FrameBound::UnboundedPreceding && self.end == FrameBound::UnboundedFollowing
    }
}

impl Default for FrameRange {
    fn default() -> Self {
        Self::new(FrameBound::UnboundedPreceding, FrameBound::UnboundedFollowing)
    }
}

/// A call evaluated over partitions:
/// `call OVER (PARTITION BY .. ORDER BY .. ROWS BETWEEN .. AND ..)`
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    /// Must be an [`ExprKind::Call`]
    pub call: Expr,
    pub partition: Vec<Expr>,
    pub order: Vec<OrderItem>,
    pub frame: FrameRange,
}

impl WindowSpec {
    /// Builds a window specification. Without PARTITION BY every row falls
    /// into the single partition keyed by the literal `1`.
    pub fn new(
        call: Expr,
        partition: Vec<Expr>,
        order: Vec<OrderItem>,
        frame: Option<FrameRange>,
    ) -> Self {
        let partition = if partition.is_empty() {
            vec![Expr::literal(Value::Number(1.0))]
        } else {
            partition
        };
        Self {
            call,
            partition,
            order,
            frame: frame.unwrap_or_default(),
        }
    }

    fn label(&self) -> String {
        let mut parts = vec![format!("partition by {}", join_labels(&self.partition))];
        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|item| format!("{} {}", item.expr.label, item.order.keyword()))
                .collect();
            parts.push(format!("order by {}", order.join(",")));
        }
        parts.push(format!("rows between {} and {}", self.frame.start, self.frame.end));
        format!("{} over ({})", self.call.label, parts.join(" "))
    }
}

fn join_labels(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(|e| e.label.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

impl Expr {
    fn new(kind: ExprKind, label: String) -> Self {
        Self { kind, label }
    }

    pub fn literal(value: Value) -> Self {
        let label = value.literal_label();
        Self::new(ExprKind::Literal(value), label)
    }

    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(ExprKind::Field(name.clone()), name)
    }

    pub fn qualified_field(table: impl Into<String>, field: impl Into<String>) -> Self {
        let (table, field) = (table.into(), field.into());
        let label = format!("{}.{}", table, field);
        Self::new(ExprKind::QualifiedField { table, field }, label)
    }

    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        let label = format!("{} {} {}", left.label, op.symbol(), right.label);
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            label,
        )
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        let label = match op {
            UnaryOperator::Not => format!("not {}", operand.label),
            UnaryOperator::Minus => format!("-{}", operand.label),
        };
        Self::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            label,
        )
    }

    pub fn is_null(operand: Expr, negated: bool) -> Self {
        let label = if negated {
            format!("{} is not null", operand.label)
        } else {
            format!("{} is null", operand.label)
        };
        Self::new(
            ExprKind::IsNull {
                operand: Box::new(operand),
                negated,
            },
            label,
        )
    }

    pub fn in_list(operand: Expr, list: Vec<Expr>, negated: bool) -> Self {
        let keyword = if negated { "not in" } else { "in" };
        let label = format!("{} {} ({})", operand.label, keyword, join_labels(&list));
        Self::new(
            ExprKind::InList {
                operand: Box::new(operand),
                list,
                negated,
            },
            label,
        )
    }

    pub fn pattern(kind: PatternKind, operand: Expr, pattern: Expr, negated: bool) -> Self {
        let label = if negated {
            format!("{} not {} {}", operand.label, kind.keyword(), pattern.label)
        } else {
            format!("{} {} {}", operand.label, kind.keyword(), pattern.label)
        };
        Self::new(
            ExprKind::Pattern {
                kind,
                operand: Box::new(operand),
                pattern: Box::new(pattern),
                negated,
            },
            label,
        )
    }

    pub fn cast(operand: Expr, target: CastType) -> Self {
        let label = format!("cast ({} as {})", operand.label, target);
        Self::new(
            ExprKind::Cast {
                operand: Box::new(operand),
                target,
            },
            label,
        )
    }

    pub fn case(
        operand: Option<Expr>,
        branches: Vec<(Expr, Expr)>,
        else_result: Option<Expr>,
    ) -> Self {
        let mut parts = vec!["case".to_string()];
        if let Some(operand) = &operand {
            parts.push(operand.label.clone());
        }
        for (when, then) in &branches {
            parts.push(format!("when {} then {}", when.label, then.label));
        }
        if let Some(else_result) = &else_result {
            parts.push(format!("else {}", else_result.label));
        }
        parts.push("end".to_string());
        Self::new(
            ExprKind::Case {
                operand: operand.map(Box::new),
                branches,
                else_result: else_result.map(Box::new),
            },
            parts.join(" "),
        )
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>, quantifier: Option<SetQuantifier>) -> Self {
        let name = name.into();
        let label = match quantifier {
            Some(q) => format!("{}({} {})", name, q, join_labels(&args)),
            None => format!("{}({})", name, join_labels(&args)),
        };
        Self::new(
            ExprKind::Call {
                name,
                args,
                quantifier,
            },
            label,
        )
    }

    /// `f(*)`: called with the constant `1` per row, labelled with the star
    pub fn call_star(name: impl Into<String>) -> Self {
        let name = name.into();
        let label = format!("{}(*)", name);
        Self::new(
            ExprKind::Call {
                name,
                args: vec![Expr::literal(Value::Number(1.0))],
                quantifier: None,
            },
            label,
        )
    }

    pub fn index(base: Expr, index: Expr) -> Self {
        let label = format!("{} [{}]", base.label, index.label);
        Self::new(
            ExprKind::Index {
                base: Box::new(base),
                index: Box::new(index),
            },
            label,
        )
    }

    pub fn alias(inner: Expr, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        Self::new(
            ExprKind::Alias {
                inner: Box::new(inner),
                alias: alias.clone(),
            },
            alias,
        )
    }

    pub fn window(spec: WindowSpec) -> Self {
        let label = spec.label();
        Self::new(ExprKind::Window(Box::new(spec)), label)
    }

    /// Wraps the label in parentheses, as written in the query
    pub fn nested(mut self) -> Self {
        self.label = format!("({})", self.label);
        self
    }

    /// Whether results of this node are stored in the per-row memo
    pub fn is_memoized(&self) -> bool {
        !matches!(
            self.kind,
            ExprKind::Literal(_) | ExprKind::Field(_) | ExprKind::QualifiedField { .. }
        )
    }

    /// The window specification of this node, looking through an alias
    pub fn window_spec(&self) -> Option<(&WindowSpec, &str)> {
        match &self.kind {
            ExprKind::Window(spec) => Some((spec, &self.label)),
            ExprKind::Alias { inner, .. } => inner.window_spec(),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
