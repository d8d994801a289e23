// SQL parser - converts tokens to AST

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::access::Value;
use crate::expression::{
    BinaryOperator, CastType, Expr, ExprKind, FrameBound, FrameRange, LimitClause, OrderItem,
    PatternKind, SelectItem, SetQuantifier, SortOrder, UnaryOperator, WindowSpec,
};
use anyhow::{bail, Context, Result};

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(sql: &str) -> Result<Self> {
        let tokens = Lexer::new(sql).tokenize()?;
        Ok(Parser {
            tokens,
            position: 0,
        })
    }

    /// Parse a single SELECT statement, optionally terminated by `;`
    pub fn parse(&mut self) -> Result<SelectStatement> {
        let statement = self.parse_select()?;
        if self.match_token(&Token::Semicolon) {
            self.advance();
        }
        if !self.match_token(&Token::Eof) {
            bail!("Unexpected {} after statement", self.current_token().describe());
        }
        Ok(statement)
    }

    /// Parse a SELECT statement
    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect_token(Token::Select)?;

        let quantifier = self.parse_quantifier();

        // Parse projections
        let projections = self.parse_select_items()?;

        // Parse FROM clause and its joins
        let from = if self.match_token(&Token::From) {
            self.advance();
            let base = self.parse_table_factor()?;
            let mut joins = vec![];
            while self.is_join_token() {
                joins.push(self.parse_join()?);
            }
            Some(FromClause { base, joins })
        } else {
            None
        };

        // Parse WHERE clause
        let where_clause = if self.match_token(&Token::Where) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        // Parse GROUP BY
        let mut group_by = vec![];
        if self.match_token(&Token::Group) {
            self.advance();
            self.expect_token(Token::By)?;
            group_by = self.parse_expression_list()?;
        }

        // Parse HAVING
        let having = if self.match_token(&Token::Having) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        // Parse ORDER BY
        let mut order_by = vec![];
        if self.match_token(&Token::Order) {
            self.advance();
            self.expect_token(Token::By)?;
            order_by = self.parse_order_by_items()?;
        }

        let limit = if self.match_token(&Token::Limit) {
            self.advance();
            Some(self.parse_limit()?)
        } else {
            None
        };

        Ok(SelectStatement {
            quantifier,
            projections,
            from,
            where_clause,
            group_by,
            having,
            order_by,
            limit,
        })
    }

    fn parse_quantifier(&mut self) -> Option<SetQuantifier> {
        match self.current_token() {
            Token::Distinct => {
                self.advance();
                Some(SetQuantifier::Distinct)
            }
            Token::All => {
                self.advance();
                Some(SetQuantifier::All)
            }
            _ => None,
        }
    }

    /// Parse SELECT items
    fn parse_select_items(&mut self) -> Result<Vec<SelectItem>> {
        let mut items = vec![];

        loop {
            if self.match_token(&Token::Star) {
                self.advance();
                items.push(SelectItem::Wildcard);
            } else if self.peek_token(1) == &Token::Dot && self.peek_token(2) == &Token::Star {
                let table = self.expect_identifier()?;
                self.advance();
                self.advance();
                items.push(SelectItem::QualifiedWildcard(table));
            } else {
                let expr = self.parse_windowed_expression()?;
                let expr = match self.parse_alias()? {
                    Some(alias) => Expr::alias(expr, alias),
                    None => expr,
                };
                items.push(SelectItem::Expr(expr));
            }

            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(items)
    }

    /// `[AS] alias`
    fn parse_alias(&mut self) -> Result<Option<String>> {
        if self.match_token(&Token::As) {
            self.advance();
            return self.expect_identifier().map(Some);
        }
        match self.current_token() {
            Token::Identifier(_) | Token::QuotedIdentifier(_) => self.expect_identifier().map(Some),
            _ => Ok(None),
        }
    }

    /// Parse a table name or a parenthesized subquery with its alias
    fn parse_table_factor(&mut self) -> Result<TableFactor> {
        if self.match_token(&Token::LeftParen) {
            self.advance();
            let subquery = self.parse_select()?;
            self.expect_token(Token::RightParen)?;
            let alias = self
                .parse_alias()?
                .context("Derived table requires an alias")?;
            return Ok(TableFactor::Derived {
                subquery: Box::new(subquery),
                alias,
            });
        }

        let name = self.expect_identifier()?;
        let alias = self.parse_alias()?;
        Ok(TableFactor::Table { name, alias })
    }

    fn is_join_token(&self) -> bool {
        matches!(
            self.current_token(),
            Token::Join | Token::Inner | Token::Left | Token::Right | Token::Full | Token::Cross
        )
    }

    /// Parse `LEFT [OUTER] JOIN factor ON condition`
    fn parse_join(&mut self) -> Result<Join> {
        if !self.match_token(&Token::Left) {
            bail!(
                "Unsupported join type at {}, only LEFT JOIN is supported",
                self.current_token().describe()
            );
        }
        self.advance();
        if self.match_token(&Token::Outer) {
            self.advance();
        }
        self.expect_token(Token::Join)?;

        let table = self.parse_table_factor()?;
        self.expect_token(Token::On)?;
        let on = self.parse_expression()?;

        Ok(Join { table, on })
    }

    /// Parse ORDER BY items
    fn parse_order_by_items(&mut self) -> Result<Vec<OrderItem>> {
        let mut items = vec![];

        loop {
            let expr = self.parse_windowed_expression()?;
            let order = match self.current_token() {
                Token::Asc => {
                    self.advance();
                    SortOrder::Asc
                }
                Token::Desc => {
                    self.advance();
                    SortOrder::Desc
                }
                _ => SortOrder::Asc,
            };
            items.push(OrderItem::new(expr, order));

            if !self.match_token(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(items)
    }

    /// `LIMIT n`, `LIMIT offset, n` or `LIMIT n OFFSET offset`
    fn parse_limit(&mut self) -> Result<LimitClause> {
        let first = self.expect_count()?;
        if self.match_token(&Token::Comma) {
            self.advance();
            let count = self.expect_count()?;
            return Ok(LimitClause::new(first, Some(count)));
        }
        if self.match_token(&Token::Offset) {
            self.advance();
            let offset = self.expect_count()?;
            return Ok(LimitClause::new(offset, Some(first)));
        }
        Ok(LimitClause::new(0, Some(first)))
    }

    /// Parse an expression that may be a call followed by an OVER clause
    fn parse_windowed_expression(&mut self) -> Result<Expr> {
        let expr = self.parse_expression()?;
        if matches!(expr.kind, ExprKind::Call { .. }) && self.match_word("over") {
            self.advance();
            return self.parse_window(expr);
        }
        Ok(expr)
    }

    /// Parse `( [PARTITION BY ..] [ORDER BY ..] [ROWS BETWEEN .. AND ..] )`
    fn parse_window(&mut self, call: Expr) -> Result<Expr> {
        self.expect_token(Token::LeftParen)?;

        let mut partition = vec![];
        if self.match_word("partition") {
            self.advance();
            self.expect_token(Token::By)?;
            partition = self.parse_expression_list()?;
        }

        let mut order = vec![];
        if self.match_token(&Token::Order) {
            self.advance();
            self.expect_token(Token::By)?;
            order = self.parse_order_by_items()?;
        }

        let frame = if self.match_word("rows") {
            self.advance();
            self.expect_word("between")?;
            let start = self.parse_frame_bound()?;
            self.expect_token(Token::And)?;
            let end = self.parse_frame_bound()?;
            Some(FrameRange::new(start, end))
        } else {
            None
        };

        self.expect_token(Token::RightParen)?;
        Ok(Expr::window(WindowSpec::new(call, partition, order, frame)))
    }

    fn parse_frame_bound(&mut self) -> Result<FrameBound> {
        if self.match_word("unbounded") {
            self.advance();
            if self.match_word("preceding") {
                self.advance();
                return Ok(FrameBound::UnboundedPreceding);
            }
            self.expect_word("following")?;
            return Ok(FrameBound::UnboundedFollowing);
        }
        if self.match_word("current") {
            self.advance();
            self.expect_word("row")?;
            return Ok(FrameBound::CurrentRow);
        }

        let offset = self.expect_count()?;
        if self.match_word("preceding") {
            self.advance();
            return Ok(FrameBound::Preceding(offset));
        }
        self.expect_word("following")?;
        Ok(FrameBound::Following(offset))
    }

    /// Parse expression
    fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_or()
    }

    /// Parse OR expression
    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;

        while self.match_token(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::binary(BinaryOperator::Or, left, right);
        }

        Ok(left)
    }

    /// Parse AND expression
    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_not()?;

        while self.match_token(&Token::And) {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::binary(BinaryOperator::And, left, right);
        }

        Ok(left)
    }

    /// Parse NOT expression
    fn parse_not(&mut self) -> Result<Expr> {
        if self.match_token(&Token::Not) {
            self.advance();
            let operand = self.parse_not()?;
            Ok(Expr::unary(UnaryOperator::Not, operand))
        } else {
            self.parse_comparison()
        }
    }

    /// Parse comparison expression
    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_addition()?;

        if self.match_token(&Token::Is) {
            self.advance();
            let negated = if self.match_token(&Token::Not) {
                self.advance();
                true
            } else {
                false
            };
            self.expect_token(Token::Null)?;
            return Ok(Expr::is_null(left, negated));
        }

        // NOT binds to the following IN / LIKE / RLIKE here
        let negated = if self.match_token(&Token::Not)
            && matches!(self.peek_token(1), Token::In | Token::Like | Token::Rlike)
        {
            self.advance();
            true
        } else {
            false
        };

        match self.current_token() {
            Token::In => {
                self.advance();
                self.expect_token(Token::LeftParen)?;
                let list = if self.match_token(&Token::RightParen) {
                    vec![]
                } else {
                    self.parse_expression_list()?
                };
                self.expect_token(Token::RightParen)?;
                return Ok(Expr::in_list(left, list, negated));
            }
            Token::Like | Token::Rlike => {
                let kind = if self.match_token(&Token::Like) {
                    PatternKind::Like
                } else {
                    PatternKind::Rlike
                };
                self.advance();
                let pattern = self.parse_addition()?;
                return Ok(Expr::pattern(kind, left, pattern, negated));
            }
            _ => {}
        }

        // Standard comparison operators
        let op = match self.current_token() {
            Token::Equal => BinaryOperator::Eq,
            Token::NotEqual => BinaryOperator::Ne,
            Token::Less => BinaryOperator::Lt,
            Token::Greater => BinaryOperator::Gt,
            Token::LessEqual => BinaryOperator::Le,
            Token::GreaterEqual => BinaryOperator::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_addition()?;
        Ok(Expr::binary(op, left, right))
    }

    /// Parse addition/subtraction
    fn parse_addition(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplication()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplication()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse multiplication/division/modulo
    fn parse_multiplication(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Mul,
                Token::Slash => BinaryOperator::Div,
                Token::Percent => BinaryOperator::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse unary minus
    fn parse_unary(&mut self) -> Result<Expr> {
        if self.match_token(&Token::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::unary(UnaryOperator::Minus, operand));
        }
        self.parse_postfix()
    }

    /// Parse `[index]` suffixes
    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;

        while self.match_token(&Token::LeftBracket) {
            self.advance();
            let index = self.parse_expression()?;
            self.expect_token(Token::RightBracket)?;
            expr = Expr::index(expr, index);
        }

        Ok(expr)
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Result<Expr> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.advance();
                let number: f64 = n.parse().with_context(|| format!("Invalid number: {}", n))?;
                Ok(Expr::literal(Value::Number(number)))
            }
            Token::String(s) => {
                self.advance();
                Ok(Expr::literal(Value::String(s)))
            }
            Token::True => {
                self.advance();
                Ok(Expr::literal(Value::Boolean(true)))
            }
            Token::False => {
                self.advance();
                Ok(Expr::literal(Value::Boolean(false)))
            }
            Token::Null => {
                self.advance();
                Ok(Expr::literal(Value::Null))
            }
            Token::LeftParen => {
                self.advance();
                if self.match_token(&Token::Select) {
                    bail!("Subqueries are only supported in FROM");
                }
                let expr = self.parse_expression()?;
                self.expect_token(Token::RightParen)?;
                Ok(expr.nested())
            }
            Token::Case => self.parse_case_expression(),
            Token::Cast => self.parse_cast_expression(),
            Token::Identifier(name) if self.peek_token(1) == &Token::LeftParen => {
                self.advance();
                self.parse_call(name)
            }
            Token::Identifier(_) | Token::QuotedIdentifier(_) => {
                let name = self.expect_identifier()?;
                if self.match_token(&Token::Dot) {
                    self.advance();
                    let field = self.expect_identifier()?;
                    Ok(Expr::qualified_field(name, field))
                } else {
                    Ok(Expr::field(name))
                }
            }
            other => bail!("Unexpected {} in expression", other.describe()),
        }
    }

    /// Parse the argument list of a call to `name`
    fn parse_call(&mut self, name: String) -> Result<Expr> {
        self.expect_token(Token::LeftParen)?;

        if self.match_token(&Token::Star) {
            self.advance();
            self.expect_token(Token::RightParen)?;
            return Ok(Expr::call_star(name));
        }

        let quantifier = self.parse_quantifier();
        let args = if self.match_token(&Token::RightParen) {
            vec![]
        } else {
            self.parse_expression_list()?
        };
        self.expect_token(Token::RightParen)?;

        Ok(Expr::call(name, args, quantifier))
    }

    /// Parse searched (`CASE WHEN ..`) and simple (`CASE x WHEN ..`) CASE
    fn parse_case_expression(&mut self) -> Result<Expr> {
        self.expect_token(Token::Case)?;

        let operand = if self.match_token(&Token::When) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let mut branches = vec![];
        while self.match_token(&Token::When) {
            self.advance();
            let condition = self.parse_expression()?;
            self.expect_token(Token::Then)?;
            let result = self.parse_expression()?;
            branches.push((condition, result));
        }
        if branches.is_empty() {
            bail!("CASE requires at least one WHEN branch");
        }

        let else_result = if self.match_token(&Token::Else) {
            self.advance();
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect_token(Token::End)?;
        Ok(Expr::case(operand, branches, else_result))
    }

    /// Parse `CAST(expr AS type)`
    fn parse_cast_expression(&mut self) -> Result<Expr> {
        self.expect_token(Token::Cast)?;
        self.expect_token(Token::LeftParen)?;
        let expr = self.parse_expression()?;
        self.expect_token(Token::As)?;
        let type_name = self.expect_identifier()?;
        let target = CastType::from_name(&type_name)
            .with_context(|| format!("Unknown cast target type: {}", type_name))?;
        self.expect_token(Token::RightParen)?;
        Ok(Expr::cast(expr, target))
    }

    /// Parse comma-separated expressions
    fn parse_expression_list(&mut self) -> Result<Vec<Expr>> {
        let mut expressions = vec![self.parse_expression()?];

        while self.match_token(&Token::Comma) {
            self.advance();
            expressions.push(self.parse_expression()?);
        }

        Ok(expressions)
    }

    fn current_token(&self) -> &Token {
        self.peek_token(0)
    }

    fn peek_token(&self, offset: usize) -> &Token {
        self.tokens
            .get(self.position + offset)
            .unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn match_token(&self, token: &Token) -> bool {
        self.current_token() == token
    }

    /// Whether the current token is the unquoted, non-reserved `word`
    fn match_word(&self, word: &str) -> bool {
        matches!(self.current_token(), Token::Identifier(name) if name.eq_ignore_ascii_case(word))
    }

    fn expect_token(&mut self, token: Token) -> Result<()> {
        if self.match_token(&token) {
            self.advance();
            Ok(())
        } else {
            bail!(
                "Expected {}, found {}",
                token.describe(),
                self.current_token().describe()
            )
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.match_word(word) {
            self.advance();
            Ok(())
        } else {
            bail!(
                "Expected {}, found {}",
                word.to_uppercase(),
                self.current_token().describe()
            )
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current_token().clone() {
            Token::Identifier(name) | Token::QuotedIdentifier(name) => {
                self.advance();
                Ok(name)
            }
            other => bail!("Expected identifier, found {}", other.describe()),
        }
    }

    /// Expect a non-negative integer such as a LIMIT count or frame offset
    fn expect_count(&mut self) -> Result<usize> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.advance();
                n.parse()
                    .with_context(|| format!("Expected a non-negative integer, found {}", n))
            }
            other => bail!("Expected number, found {}", other.describe()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Result<SelectStatement> {
        Parser::new(sql)?.parse()
    }

    fn select_labels(statement: &SelectStatement) -> Vec<String> {
        statement
            .projections
            .iter()
            .map(|item| match item {
                SelectItem::Wildcard => "*".to_string(),
                SelectItem::QualifiedWildcard(table) => format!("{}.*", table),
                SelectItem::Expr(expr) => expr.label.clone(),
            })
            .collect()
    }

    #[test]
    fn test_parse_select_simple() -> Result<()> {
        let statement = parse("SELECT id, name FROM users;")?;
        assert_eq!(select_labels(&statement), vec!["id", "name"]);
        assert_eq!(
            statement.from.map(|from| from.base),
            Some(TableFactor::Table {
                name: "users".to_string(),
                alias: None
            })
        );
        assert!(statement.where_clause.is_none());
        Ok(())
    }

    #[test]
    fn test_parse_without_from() -> Result<()> {
        let statement = parse("select 1 + 2 * 3, 'a' + 'b', -(4)")?;
        assert!(statement.from.is_none());
        assert_eq!(
            select_labels(&statement),
            vec!["1 + 2 * 3", "\"a\" + \"b\"", "-(4)"]
        );
        Ok(())
    }

    #[test]
    fn test_parse_operator_precedence() -> Result<()> {
        let statement = parse("SELECT a FROM t WHERE NOT a = 1 OR b > 2 AND c <> 3")?;
        let condition = statement.where_clause.context("missing WHERE")?;
        assert_eq!(condition.label, "not a = 1 or b > 2 and c != 3");
        let ExprKind::Binary { op, .. } = condition.kind else {
            bail!("expected binary");
        };
        assert_eq!(op, BinaryOperator::Or);
        Ok(())
    }

    #[test]
    fn test_parse_predicates() -> Result<()> {
        let statement = parse(
            "SELECT a is null, a is not null, a in (1, 2), a not in (), \
             a like '%x', a not rlike '^y', a[0] FROM t",
        )?;
        assert_eq!(
            select_labels(&statement),
            vec![
                "a is null",
                "a is not null",
                "a in (1,2)",
                "a not in ()",
                "a like \"%x\"",
                "a not rlike \"^y\"",
                "a [0]",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_parse_calls_and_aliases() -> Result<()> {
        let statement = parse(
            "SELECT count(*), count(distinct city) AS cities, u.name 姓名, u.* FROM 用户 u",
        )?;
        assert_eq!(
            select_labels(&statement),
            vec!["count(*)", "cities", "姓名", "u.*"]
        );
        assert_eq!(statement.from.map(|f| f.base.alias().to_string()), Some("u".to_string()));
        Ok(())
    }

    #[test]
    fn test_parse_case_and_cast() -> Result<()> {
        let statement = parse(
            "SELECT CASE WHEN a > 1 THEN 'big' ELSE 'small' END, \
             case a when 1 then 'one' end, cast(a as number) FROM t",
        )?;
        assert_eq!(
            select_labels(&statement),
            vec![
                "case when a > 1 then \"big\" else \"small\" end",
                "case a when 1 then \"one\" end",
                "cast (a as number)",
            ]
        );
        assert!(parse("SELECT cast(a as blob) FROM t").is_err());
        Ok(())
    }

    #[test]
    fn test_parse_left_join() -> Result<()> {
        let statement = parse(
            "SELECT * FROM users u LEFT OUTER JOIN orders o ON u.id = o.user_id \
             LEFT JOIN (SELECT * FROM payments) p ON p.order_no = o.order_no",
        )?;
        let from = statement.from.context("missing FROM")?;
        assert_eq!(from.joins.len(), 2);
        assert_eq!(from.joins[0].table.alias(), "o");
        assert_eq!(from.joins[0].on.label, "u.id = o.user_id");
        assert!(matches!(from.joins[1].table, TableFactor::Derived { .. }));
        assert_eq!(from.joins[1].table.alias(), "p");

        assert!(parse("SELECT * FROM a INNER JOIN b ON a.x = b.x").is_err());
        assert!(parse("SELECT * FROM (SELECT * FROM a)").is_err());
        Ok(())
    }

    #[test]
    fn test_parse_group_having_order_limit() -> Result<()> {
        let statement = parse(
            "SELECT city, count(*) FROM users GROUP BY city HAVING count(*) > 1 \
             ORDER BY city DESC, 2 LIMIT 1, 2",
        )?;
        assert_eq!(statement.group_by.len(), 1);
        assert_eq!(
            statement.having.map(|h| h.label),
            Some("count(*) > 1".to_string())
        );
        assert_eq!(statement.order_by[0].order, SortOrder::Desc);
        assert_eq!(statement.order_by[1].order, SortOrder::Asc);
        assert_eq!(statement.limit, Some(LimitClause::new(1, Some(2))));

        let statement = parse("SELECT a FROM t LIMIT 3 OFFSET 4")?;
        assert_eq!(statement.limit, Some(LimitClause::new(4, Some(3))));
        let statement = parse("SELECT a FROM t LIMIT 3")?;
        assert_eq!(statement.limit, Some(LimitClause::new(0, Some(3))));
        assert!(parse("SELECT a FROM t LIMIT 1.5").is_err());
        Ok(())
    }

    #[test]
    fn test_parse_window() -> Result<()> {
        let statement = parse(
            "SELECT sum(score) OVER (PARTITION BY gender ORDER BY age DESC \
             ROWS BETWEEN 1 PRECEDING AND CURRENT ROW) AS s, \
             row_number() over (order by id) FROM users ORDER BY rank() OVER (ORDER BY score)",
        )?;
        let SelectItem::Expr(first) = &statement.projections[0] else {
            bail!("expected expression");
        };
        let (spec, _) = first.window_spec().context("missing window")?;
        assert_eq!(spec.partition[0].label, "gender");
        assert_eq!(spec.order[0].order, SortOrder::Desc);
        assert_eq!(
            spec.frame,
            FrameRange::new(FrameBound::Preceding(1), FrameBound::CurrentRow)
        );
        assert_eq!(first.label, "s");
        assert!(statement.order_by[0].expr.window_spec().is_some());
        Ok(())
    }

    #[test]
    fn test_window_words_are_not_reserved() -> Result<()> {
        let statement = parse("SELECT rows, partition FROM t")?;
        assert_eq!(select_labels(&statement), vec!["rows", "partition"]);
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("SELECT").is_err());
        assert!(parse("SELECT a FROM").is_err());
        assert!(parse("SELECT a FROM t WHERE").is_err());
        assert!(parse("SELECT a FROM t extra tokens").is_err());
        assert!(parse("SELECT (a FROM t").is_err());
        assert!(parse("SELECT a ? b").is_err());
        assert!(parse("SELECT a FROM t WHERE a IN (SELECT 1)").is_err());
    }
}
