// ABOUTME: Parsers for compact dice notation ("<count>d<sides>[+/-modifier]").
// ABOUTME: A strict whole-input parser and a scanner that finds notation inside free text.

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Token};
use crate::notation::{DiceSpec, MAX_DICE};

/// Parser for a single dice notation.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input.
    pub fn new(input: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the whole input as one dice notation.
    pub fn parse(&mut self) -> Result<DiceSpec> {
        let spec = self.notation()?;
        if self.current != Token::Eof {
            return Err(Error::Expected {
                expected: "end of input".to_string(),
                found: format!("{:?}", self.current),
            });
        }
        Ok(spec)
    }

    fn advance(&mut self) -> Result<Token> {
        let prev = std::mem::replace(&mut self.current, self.lexer.next_token()?);
        Ok(prev)
    }

    fn notation(&mut self) -> Result<DiceSpec> {
        // "d20" is shorthand for "1d20"
        let count = if let Token::Number(n) = self.current {
            self.advance()?;
            n
        } else {
            1
        };

        if self.current != Token::D {
            return Err(self.expected("'d'"));
        }
        self.advance()?;

        let sides = match self.current {
            Token::Number(n) => {
                self.advance()?;
                n
            }
            Token::Eof => return Err(Error::UnexpectedEof),
            _ => return Err(self.expected("dice sides")),
        };

        let modifier = match self.current {
            Token::Plus => {
                self.advance()?;
                self.modifier()?
            }
            Token::Minus => {
                self.advance()?;
                -self.modifier()?
            }
            _ => 0,
        };

        validate(count, sides)?;
        Ok(DiceSpec::new(count, sides, modifier))
    }

    fn modifier(&mut self) -> Result<i32> {
        match self.current {
            Token::Number(n) => {
                self.advance()?;
                Ok(i32::try_from(n).unwrap_or(i32::MAX))
            }
            Token::Eof => Err(Error::UnexpectedEof),
            _ => Err(self.expected("modifier value")),
        }
    }

    fn expected(&self, what: &str) -> Error {
        Error::Expected {
            expected: what.to_string(),
            found: format!("{:?}", self.current),
        }
    }
}

fn validate(count: u32, sides: u32) -> Result<()> {
    if count == 0 || count > MAX_DICE {
        return Err(Error::InvalidDiceCount(count));
    }
    if sides == 0 {
        return Err(Error::InvalidDiceSides(sides));
    }
    Ok(())
}

/// Parse a dice notation string, rejecting anything but a single notation.
pub fn parse(input: &str) -> Result<DiceSpec> {
    Parser::new(input)?.parse()
}

/// Locate the leftmost `<count>d<sides>[+/-modifier]` in free text.
///
/// The notation must be contiguous. A match whose count or sides is out of
/// range yields an error rather than continuing the search.
pub fn find(input: &str) -> Result<Option<DiceSpec>> {
    let tokens = Lexer::scanning(input).tokenize()?;

    for (start, window) in tokens.windows(3).enumerate() {
        let [Token::Number(count), Token::D, Token::Number(sides)] = window else {
            continue;
        };
        let index = start + 3;
        let modifier = match (tokens.get(index), tokens.get(index + 1)) {
            (Some(Token::Plus), Some(Token::Number(n))) => i32::try_from(*n).unwrap_or(i32::MAX),
            (Some(Token::Minus), Some(Token::Number(n))) => -i32::try_from(*n).unwrap_or(i32::MAX),
            _ => 0,
        };

        validate(*count, *sides)?;
        return Ok(Some(DiceSpec::new(*count, *sides, modifier)));
    }

    Ok(None)
}
