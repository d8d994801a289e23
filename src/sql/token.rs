// SQL tokens

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Identifier(String),
    QuotedIdentifier(String),
    Number(String),
    String(String),

    // Keywords
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    Null,
    Order,
    By,
    Asc,
    Desc,
    Limit,
    Offset,
    Join,
    Left,
    Outer,
    Inner,
    Right,
    Full,
    Cross,
    On,
    As,
    Distinct,
    All,
    Group,
    Having,
    In,
    Like,
    Rlike,
    Is,
    True,
    False,
    Case,
    When,
    Then,
    Else,
    End,
    Cast,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Semicolon,
    Dot,

    // Characters the grammar has no use for
    Unknown(char),

    Eof,
}

impl Token {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Select
                | Token::From
                | Token::Where
                | Token::And
                | Token::Or
                | Token::Not
                | Token::Null
                | Token::Order
                | Token::By
                | Token::Asc
                | Token::Desc
                | Token::Limit
                | Token::Offset
                | Token::Join
                | Token::Left
                | Token::Outer
                | Token::Inner
                | Token::Right
                | Token::Full
                | Token::Cross
                | Token::On
                | Token::As
                | Token::Distinct
                | Token::All
                | Token::Group
                | Token::Having
                | Token::In
                | Token::Like
                | Token::Rlike
                | Token::Is
                | Token::True
                | Token::False
                | Token::Case
                | Token::When
                | Token::Then
                | Token::Else
                | Token::End
                | Token::Cast
        )
    }

    /// Convert a string to a keyword token if it matches.
    ///
    /// Window clause words (`OVER`, `PARTITION`, `ROWS`, ...) are not
    /// reserved; the parser recognizes them where a window may appear.
    pub fn keyword_from_str(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            "SELECT" => Some(Token::Select),
            "FROM" => Some(Token::From),
            "WHERE" => Some(Token::Where),
            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),
            "NOT" => Some(Token::Not),
            "NULL" => Some(Token::Null),
            "ORDER" => Some(Token::Order),
            "BY" => Some(Token::By),
            "ASC" => Some(Token::Asc),
            "DESC" => Some(Token::Desc),
            "LIMIT" => Some(Token::Limit),
            "OFFSET" => Some(Token::Offset),
            "JOIN" => Some(Token::Join),
            "LEFT" => Some(Token::Left),
            "OUTER" => Some(Token::Outer),
            "INNER" => Some(Token::Inner),
            "RIGHT" => Some(Token::Right),
            "FULL" => Some(Token::Full),
            "CROSS" => Some(Token::Cross),
            "ON" => Some(Token::On),
            "AS" => Some(Token::As),
            "DISTINCT" => Some(Token::Distinct),
            "ALL" => Some(Token::All),
            "GROUP" => Some(Token::Group),
            "HAVING" => Some(Token::Having),
            "IN" => Some(Token::In),
            "LIKE" => Some(Token::Like),
            "RLIKE" => Some(Token::Rlike),
            "IS" => Some(Token::Is),
            "TRUE" => Some(Token::True),
            "FALSE" => Some(Token::False),
            "CASE" => Some(Token::Case),
            "WHEN" => Some(Token::When),
            "THEN" => Some(Token::Then),
            "ELSE" => Some(Token::Else),
            "END" => Some(Token::End),
            "CAST" => Some(Token::Cast),
            _ => None,
        }
    }

    /// Short description used in parse errors
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(name) | Token::QuotedIdentifier(name) => format!("identifier '{}'", name),
            Token::Number(n) => format!("number {}", n),
            Token::String(s) => format!("string '{}'", s),
            Token::Unknown(c) => format!("character '{}'", c),
            Token::Eof => "end of input".to_string(),
            other => format!("{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_detection() {
        assert!(Token::Select.is_keyword());
        assert!(Token::Rlike.is_keyword());
        assert!(!Token::Identifier("over".to_string()).is_keyword());
        assert!(!Token::Plus.is_keyword());
    }

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Token::keyword_from_str("SELECT"), Some(Token::Select));
        assert_eq!(Token::keyword_from_str("select"), Some(Token::Select));
        assert_eq!(Token::keyword_from_str("RLike"), Some(Token::Rlike));
        assert_eq!(Token::keyword_from_str("partition"), None);
        assert_eq!(Token::keyword_from_str("用户"), None);
    }
}
