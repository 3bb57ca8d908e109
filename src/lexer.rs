use std::{iter::Peekable, str::CharIndices};

use thiserror::Error;

use crate::token::{Keyword, Span, Symbol, Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unexpected character '{character}' at line {line}, column {column}")]
    UnexpectedCharacter {
        character: char,
        line: usize,
        column: usize,
    },
    #[error("Invalid integer literal '{literal}' at line {line}, column {column}")]
    InvalidIntegerLiteral {
        literal: String,
        line: usize,
        column: usize,
    },
}

pub type LexResult<T> = Result<T, LexError>;

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 0,
        }
    }

    pub fn next_token(&mut self) -> LexResult<Token<'a>> {
        self.skip_blanks();

        let (start_idx, ch) = match self.chars.peek() {
            Some(&(idx, c)) => (idx, c),
            None => {
                let index = self.input.len();
                return Ok(Token::new(
                    TokenKind::EOF,
                    Span {
                        start: index,
                        end: index,
                        line: self.line,
                        column: self.column,
                    },
                ));
            }
        };

        let start_line = self.line;
        let start_column = self.column;
        match ch {
            '\n' => {
                self.advance_char();
                Ok(Token::new(
                    TokenKind::Newline,
                    Span {
                        start: start_idx,
                        end: start_idx + 1,
                        line: start_line,
                        column: start_column,
                    },
                ))
            }
            c if c.is_ascii_digit() => self.read_integer(start_idx, start_line, start_column),
            c if c.is_alphabetic() || c == '_' => {
                Ok(self.read_identifier(start_idx, start_line, start_column))
            }
            _ => self.read_symbol(start_idx, ch, start_line, start_column),
        }
    }

    fn skip_blanks(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c == ' ' || c == '\t' {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first char
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let ident = &self.input[start..end_idx];
        let kind = match Keyword::from_ident(ident) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(ident),
        };
        Token::new(
            kind,
            Span {
                start,
                end: end_idx,
                line,
                column,
            },
        )
    }

    fn read_integer(&mut self, start: usize, line: usize, column: usize) -> LexResult<Token<'a>> {
        self.advance_char(); // Consume first digit
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let num_str = &self.input[start..end_idx];
        let num = num_str
            .parse::<i64>()
            .map_err(|_| LexError::InvalidIntegerLiteral {
                literal: num_str.to_string(),
                line,
                column,
            })?;
        Ok(Token::new(
            TokenKind::Integer(num),
            Span {
                start,
                end: end_idx,
                line,
                column,
            },
        ))
    }

    fn read_symbol(
        &mut self,
        start: usize,
        first: char,
        line: usize,
        column: usize,
    ) -> LexResult<Token<'a>> {
        self.advance_char(); // Consume first char
        let next = self.chars.peek().map(|&(_, c)| c);

        // Two-character symbols win over their single-character prefixes.
        let symbol = match (first, next) {
            ('=', Some('=')) => {
                self.advance_char();
                Symbol::EqualEqual
            }
            ('!', Some('=')) => {
                self.advance_char();
                Symbol::NotEqual
            }
            ('<', Some('=')) => {
                self.advance_char();
                Symbol::LessEqual
            }
            ('>', Some('=')) => {
                self.advance_char();
                Symbol::GreaterEqual
            }
            ('-', Some('>')) => {
                self.advance_char();
                Symbol::Arrow
            }
            ('(', _) => Symbol::LParen,
            (')', _) => Symbol::RParen,
            ('{', _) => Symbol::LBrace,
            ('}', _) => Symbol::RBrace,
            (',', _) => Symbol::Comma,
            (';', _) => Symbol::Semicolon,
            ('+', _) => Symbol::Plus,
            ('-', _) => Symbol::Minus,
            ('*', _) => Symbol::Star,
            ('/', _) => Symbol::Slash,
            ('=', _) => Symbol::Equal,
            ('<', _) => Symbol::Less,
            ('>', _) => Symbol::Greater,
            (':', _) => Symbol::Colon,
            _ => {
                return Err(LexError::UnexpectedCharacter {
                    character: first,
                    line,
                    column,
                });
            }
        };

        let end_idx = self.current_index();
        Ok(Token::new(
            TokenKind::Symbol(symbol),
            Span {
                start,
                end: end_idx,
                line,
                column,
            },
        ))
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

pub fn tokenize(input: &str) -> LexResult<Vec<Token<'_>>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::EOF);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
