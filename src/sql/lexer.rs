// SQL lexer - tokenizes SQL statements

use super::token::Token;
use anyhow::{bail, Result};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek at the next character without advancing
    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        loop {
            self.skip_whitespace();
            if self.current_char() == Some('-') && self.peek() == Some('-') {
                self.skip_comment();
            } else {
                break;
            }
        }

        let Some(ch) = self.current_char() else {
            return Ok(Token::Eof);
        };

        let token = match ch {
            '\'' => return self.read_string(),
            '`' | '"' => return self.read_quoted_identifier(ch),
            c if c.is_alphabetic() || c == '_' => return Ok(self.read_identifier()),
            c if c.is_ascii_digit() => return Ok(self.read_number()),
            '<' => {
                self.advance();
                match self.current_char() {
                    Some('=') => {
                        self.advance();
                        return Ok(Token::LessEqual);
                    }
                    Some('>') => {
                        self.advance();
                        return Ok(Token::NotEqual);
                    }
                    _ => return Ok(Token::Less),
                }
            }
            '>' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    return Ok(Token::GreaterEqual);
                }
                return Ok(Token::Greater);
            }
            '!' if self.peek() == Some('=') => {
                self.advance();
                Token::NotEqual
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '=' => Token::Equal,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '.' => Token::Dot,
            other => Token::Unknown(other),
        };
        self.advance();
        Ok(token)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Skip single-line comments starting with --
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == '\n' {
                break;
            }
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut identifier = String::new();

        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                identifier.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::keyword_from_str(&identifier).unwrap_or(Token::Identifier(identifier))
    }

    /// Read an identifier delimited by backticks or double quotes. The
    /// delimiter is escaped by doubling it.
    fn read_quoted_identifier(&mut self, quote: char) -> Result<Token> {
        let start = self.position;
        self.advance();
        let mut identifier = String::new();

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == quote {
                if self.current_char() == Some(quote) {
                    identifier.push(quote);
                    self.advance();
                } else {
                    return Ok(Token::QuotedIdentifier(identifier));
                }
            } else {
                identifier.push(ch);
            }
        }

        bail!("Unterminated quoted identifier starting at position {}", start)
    }

    /// Read a string literal
    fn read_string(&mut self) -> Result<Token> {
        let start = self.position;
        self.advance();
        let mut string = String::new();

        while let Some(ch) = self.current_char() {
            self.advance();
            match ch {
                '\'' => {
                    if self.current_char() == Some('\'') {
                        string.push('\'');
                        self.advance();
                    } else {
                        return Ok(Token::String(string));
                    }
                }
                '\\' => {
                    let Some(escaped) = self.current_char() else {
                        break;
                    };
                    self.advance();
                    string.push(match escaped {
                        't' => '\t',
                        'n' => '\n',
                        'r' => '\r',
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        other => other,
                    });
                }
                _ => string.push(ch),
            }
        }

        bail!("Unterminated string literal starting at position {}", start)
    }

    /// Read a number (integer or decimal)
    fn read_number(&mut self) -> Token {
        let mut number = String::new();
        let mut has_dot = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.' && !has_dot && self.peek().map_or(false, |c| c.is_ascii_digit()) {
                has_dot = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::Number(number)
    }

    /// Tokenize the entire input. The last token is always [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(sql: &str) -> Result<Vec<Token>> {
        Lexer::new(sql).tokenize()
    }

    #[test]
    fn test_basic_tokens() -> Result<()> {
        assert_eq!(
            tokens("select * FROM users")?,
            vec![
                Token::Select,
                Token::Star,
                Token::From,
                Token::Identifier("users".to_string()),
                Token::Eof
            ]
        );
        Ok(())
    }

    #[test]
    fn test_operators() -> Result<()> {
        assert_eq!(
            tokens("+ - * / % = < > <= >= <> != [ ]")?,
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Percent,
                Token::Equal,
                Token::Less,
                Token::Greater,
                Token::LessEqual,
                Token::GreaterEqual,
                Token::NotEqual,
                Token::NotEqual,
                Token::LeftBracket,
                Token::RightBracket,
                Token::Eof
            ]
        );
        Ok(())
    }

    #[test]
    fn test_string_literals() -> Result<()> {
        assert_eq!(
            tokens(r"'hello world' 'it''s' 'a\tb\'c\\'")?,
            vec![
                Token::String("hello world".to_string()),
                Token::String("it's".to_string()),
                Token::String("a\tb'c\\".to_string()),
                Token::Eof
            ]
        );
        assert!(tokens("'open").is_err());
        Ok(())
    }

    #[test]
    fn test_numbers() -> Result<()> {
        assert_eq!(
            tokens("123 456.789 0.5 7.")?,
            vec![
                Token::Number("123".to_string()),
                Token::Number("456.789".to_string()),
                Token::Number("0.5".to_string()),
                Token::Number("7".to_string()),
                Token::Dot,
                Token::Eof
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unicode_and_quoted_identifiers() -> Result<()> {
        assert_eq!(
            tokens("用户.姓名 `order by` \"a\"\"b\"")?,
            vec![
                Token::Identifier("用户".to_string()),
                Token::Dot,
                Token::Identifier("姓名".to_string()),
                Token::QuotedIdentifier("order by".to_string()),
                Token::QuotedIdentifier("a\"b".to_string()),
                Token::Eof
            ]
        );
        assert!(tokens("`open").is_err());
        Ok(())
    }

    #[test]
    fn test_comments() -> Result<()> {
        assert_eq!(
            tokens("SELECT -- comment\n1 - -2 --")?,
            vec![
                Token::Select,
                Token::Number("1".to_string()),
                Token::Minus,
                Token::Minus,
                Token::Number("2".to_string()),
                Token::Eof
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unknown_character() -> Result<()> {
        assert_eq!(tokens("a ? b")?[1], Token::Unknown('?'));
        assert_eq!(tokens("!")?[0], Token::Unknown('!'));
        Ok(())
    }
}
