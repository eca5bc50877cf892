//! Token reader for effect tables.
//!
//! Tables are human-authored text:
//!
//! ```text
//! #Start
//! $Unique ID: Big Boom     ; comments run to end of line
//! $Name:      exp20
//! $LOD:       3
//! $Light color: 255 128 32
//! #End
//! ```
//!
//! Tokens are matched case-insensitively after skipping whitespace and
//! comments. Values are read from the text that follows the token.

use crate::error::FxError;

/// Cursor over the text of one table.
pub struct TableReader<'a> {
    /// Table name, for diagnostics.
    name: &'a str,
    /// Full table text.
    text: &'a str,
    /// Byte offset of the cursor.
    pos: usize,
}

impl<'a> TableReader<'a> {
    /// Creates a reader at the start of `text`.
    #[must_use]
    pub fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text, pos: 0 }
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// 1-based line of the cursor.
    #[must_use]
    pub fn line(&self) -> usize {
        self.text[..self.pos].matches('\n').count() + 1
    }

    /// Builds a parse error at the cursor.
    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> FxError {
        FxError::ConfigParse {
            table: self.name.to_string(),
            line: self.line(),
            message: message.into(),
        }
    }

    /// Skips whitespace and `;` comments.
    fn skip_blank(&mut self) {
        loop {
            let rest = &self.text[self.pos..];
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with(';') {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else {
                return;
            }
        }
    }

    /// Skips spaces and tabs only, staying on the current line.
    fn skip_inline(&mut self) {
        let rest = &self.text[self.pos..];
        let trimmed = rest.trim_start_matches([' ', '\t']);
        self.pos += rest.len() - trimmed.len();
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// True if the next token is `token`. Does not consume.
    pub fn peek(&mut self, token: &str) -> bool {
        self.skip_blank();
        let rest = self.rest();
        rest.len() >= token.len()
            && rest.is_char_boundary(token.len())
            && rest[..token.len()].eq_ignore_ascii_case(token)
    }

    /// Consumes `token` if it is next.
    pub fn optional(&mut self, token: &str) -> bool {
        if self.peek(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Consumes `token` or fails.
    ///
    /// # Errors
    ///
    /// `FxError::ConfigParse` if the next token is something else.
    pub fn required(&mut self, token: &str) -> Result<(), FxError> {
        if self.optional(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{token}', found '{}'", self.preview())))
        }
    }

    /// Index of whichever of `tokens` is next. Does not consume.
    ///
    /// # Errors
    ///
    /// `FxError::ConfigParse` if none of them is next.
    pub fn required_one_of(&mut self, tokens: &[&str]) -> Result<usize, FxError> {
        if let Some(found) = tokens.iter().position(|token| self.peek(token)) {
            return Ok(found);
        }
        Err(self.error(format!(
            "expected one of {tokens:?}, found '{}'",
            self.preview()
        )))
    }

    /// Rest of the current line, trimmed, without any trailing comment.
    ///
    /// # Errors
    ///
    /// `FxError::ConfigParse` if the value is empty.
    pub fn string(&mut self) -> Result<String, FxError> {
        self.skip_inline();
        let rest = self.rest();
        let line_end = rest.find(['\n', '\r']).unwrap_or(rest.len());
        let raw = &rest[..line_end];
        let value = raw.split(';').next().unwrap_or("").trim();
        self.pos += line_end;

        if value.is_empty() {
            return Err(self.error("expected a value"));
        }
        Ok(value.to_string())
    }

    /// Next whitespace-delimited word on the current line.
    fn word(&mut self) -> Result<&'a str, FxError> {
        self.skip_inline();
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == ';' || c == ')' || c == ',')
            .unwrap_or(rest.len());
        if end == 0 {
            return Err(self.error(format!("expected a value, found '{}'", self.preview())));
        }
        self.pos += end;
        Ok(&rest[..end])
    }

    /// Reads an integer.
    ///
    /// # Errors
    ///
    /// `FxError::ConfigParse` if the next word is not an integer.
    pub fn int(&mut self) -> Result<i32, FxError> {
        let word = self.word()?;
        word.parse()
            .map_err(|_| self.error(format!("'{word}' is not an integer")))
    }

    /// Reads a float.
    ///
    /// # Errors
    ///
    /// `FxError::ConfigParse` if the next word is not a number.
    pub fn float(&mut self) -> Result<f32, FxError> {
        let word = self.word()?;
        word.parse()
            .map_err(|_| self.error(format!("'{word}' is not a number")))
    }

    /// Reads a boolean (`yes`/`no`, `true`/`false`, `1`/`0`).
    ///
    /// # Errors
    ///
    /// `FxError::ConfigParse` if the next word is not a boolean.
    pub fn boolean(&mut self) -> Result<bool, FxError> {
        let word = self.word()?;
        match word.to_ascii_lowercase().as_str() {
            "yes" | "true" | "1" => Ok(true),
            "no" | "false" | "0" => Ok(false),
            _ => Err(self.error(format!("'{word}' is not a boolean"))),
        }
    }

    /// Reads a bare keyword.
    ///
    /// # Errors
    ///
    /// `FxError::ConfigParse` if nothing follows on the line.
    pub fn keyword(&mut self) -> Result<&'a str, FxError> {
        self.word()
    }

    /// Reads exactly `N` floats, optionally wrapped in parentheses.
    ///
    /// # Errors
    ///
    /// `FxError::ConfigParse` on a malformed or short list.
    pub fn float_list<const N: usize>(&mut self) -> Result<[f32; N], FxError> {
        self.skip_inline();
        let parenthesised = self.optional_inline('(');

        let mut values = [0.0; N];
        for value in &mut values {
            self.skip_inline();
            self.optional_inline(',');
            *value = self.float()?;
        }

        if parenthesised {
            self.skip_inline();
            if !self.optional_inline(')') {
                return Err(self.error(format!("expected ')' after {N} values")));
            }
        }
        Ok(values)
    }

    fn optional_inline(&mut self, c: char) -> bool {
        self.skip_inline();
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Short excerpt of what follows the cursor, for error messages.
    fn preview(&self) -> &'a str {
        let rest = self.rest();
        let end = rest.find(['\n', '\r']).unwrap_or(rest.len()).min(40);
        let mut end = end;
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        &rest[..end]
    }
}
