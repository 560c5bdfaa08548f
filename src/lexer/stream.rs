//! A lazy adapter over [`Lexer::token`], optionally filtering errors out
//! before handing tokens to a parser.

use super::{LexError, LexItem, Lexer, Token};
use crate::error::LexerStuck;

/// Presents a `Lexer` as a `next() -> Option<Token>` sequence. By default
/// errors are filtered silently; [`TokenStream::with_errors`] passes them
/// through instead, interleaved in emission order.
pub struct TokenStream<'l> {
    lexer: &'l mut Lexer,
    pass_through_errors: bool,
    pending_error: Option<LexError>,
}

impl<'l> TokenStream<'l> {
    pub fn new(lexer: &'l mut Lexer) -> Self {
        Self {
            lexer,
            pass_through_errors: false,
            pending_error: None,
        }
    }

    pub fn with_errors(lexer: &'l mut Lexer) -> Self {
        Self {
            lexer,
            pass_through_errors: true,
            pending_error: None,
        }
    }

    /// The last error seen while filtering, if any; cleared on read.
    pub fn take_pending_error(&mut self) -> Option<LexError> {
        self.pending_error.take()
    }

    /// Pull the next token, skipping (or surfacing) in-band lexical errors
    /// per this stream's mode.
    pub fn next(&mut self) -> Result<Option<LexItem>, LexerStuck> {
        loop {
            match self.lexer.token()? {
                None => return Ok(None),
                Some(LexItem::Token(t)) => return Ok(Some(LexItem::Token(t))),
                Some(LexItem::Error(e)) => {
                    if self.pass_through_errors {
                        return Ok(Some(LexItem::Error(e)));
                    }
                    self.pending_error = Some(e);
                    continue;
                }
            }
        }
    }

    /// Materialize every remaining token, filtering errors regardless of
    /// this stream's pass-through setting. This is what the recursive
    /// descent and Earley engines drive their token vector `T` from.
    pub fn collect_tokens(&mut self) -> Result<Vec<Token>, LexerStuck> {
        let mut out = Vec::new();
        while let Some(item) = self.lexer.token()? {
            if let LexItem::Token(t) = item {
                out.push(t);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::super::builder::LexerBuilder;
    use super::TokenStream;

    #[test]
    fn filters_errors_by_default() {
        let mut lexer = LexerBuilder::new()
            .tokens(["ID"])
            .token_rule(None, "ID", r"^[a-z]+", None, |tok, _| Some(tok.clone()))
            .error_rule(None, |e, lexer| {
                lexer.skip(1);
                Some(e.clone())
            })
            .build()
            .unwrap();
        lexer.input("@ab");
        let mut stream = TokenStream::new(&mut lexer);
        let tokens = stream.collect_tokens().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, "ab");
    }
}
