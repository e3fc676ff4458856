// ABOUTME: Lexer for compact dice notation.
// ABOUTME: Tokenizes strings like "2d6+3" into a stream of tokens.

use crate::error::{Error, Result};

/// A token in the dice notation language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A numeric literal.
    Number(u32),
    /// The 'd' or 'D' dice separator.
    D,
    /// Positive modifier sign.
    Plus,
    /// Negative modifier sign.
    Minus,
    /// Any other character. Only produced by a scanning lexer.
    Other(char),
    /// End of input.
    Eof,
}

/// A lexer for dice notation.
///
/// A strict lexer skips whitespace and rejects unknown characters. A scanning
/// lexer (see [`Lexer::scanning`]) reports both as [`Token::Other`] so that
/// notation embedded in free text can still be located.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    strict: bool,
}

impl<'a> Lexer<'a> {
    /// Create a strict lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            strict: true,
        }
    }

    /// Create a lexer that never fails.
    pub fn scanning(input: &'a str) -> Self {
        Self {
            strict: false,
            ..Self::new(input)
        }
    }

    /// Get the next token from the input.
    pub fn next_token(&mut self) -> Result<Token> {
        if self.strict {
            self.skip_whitespace();
        }

        let Some(&(pos, ch)) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        match ch {
            '0'..='9' => Ok(self.number()),
            'd' | 'D' => {
                self.chars.next();
                Ok(Token::D)
            }
            '+' => {
                self.chars.next();
                Ok(Token::Plus)
            }
            '-' => {
                self.chars.next();
                Ok(Token::Minus)
            }
            _ if self.strict => Err(Error::UnexpectedChar(ch, pos)),
            _ => {
                self.chars.next();
                Ok(Token::Other(ch))
            }
        }
    }

    /// Drain the remaining input into a token list, ending with `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn number(&mut self) -> Token {
        let mut value: u32 = 0;

        while let Some(&(_, ch)) = self.chars.peek() {
            if let Some(digit) = ch.to_digit(10) {
                self.chars.next();
                value = value.saturating_mul(10).saturating_add(digit);
            } else {
                break;
            }
        }

        Token::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_roll() {
        let mut lexer = Lexer::new("2d6");
        assert_eq!(lexer.next_token().unwrap(), Token::Number(2));
        assert_eq!(lexer.next_token().unwrap(), Token::D);
        assert_eq!(lexer.next_token().unwrap(), Token::Number(6));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_modifier_and_whitespace() {
        let tokens = Lexer::new("1D20 - 1").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(1),
                Token::D,
                Token::Number(20),
                Token::Minus,
                Token::Number(1),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_strict_rejects_unknown() {
        let mut lexer = Lexer::new("2x6");
        assert_eq!(lexer.next_token().unwrap(), Token::Number(2));
        assert!(matches!(lexer.next_token(), Err(Error::UnexpectedChar('x', 1))));
    }

    #[test]
    fn test_scanning_keeps_everything() {
        let tokens = Lexer::scanning("a 1d4").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Other('a'),
                Token::Other(' '),
                Token::Number(1),
                Token::D,
                Token::Number(4),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_number_saturates() {
        let mut lexer = Lexer::new("99999999999");
        assert_eq!(lexer.next_token().unwrap(), Token::Number(u32::MAX));
    }
}
