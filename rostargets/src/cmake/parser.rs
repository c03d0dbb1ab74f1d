// SPDX-License-Identifier: GPL-3.0-or-later

//! Tokenizer for CMake listfiles.
//!
//! The parser turns the listfile text into a sequence of [`Directive`]s: the
//! command name, the argument tokens and the location of the call. It does not
//! interpret anything; control flow commands come out as plain directives like
//! everything else.
//!
//! Variable references are NOT substituted here. A directive may refer to a
//! variable that an earlier directive of the same file sets, so substitution
//! happens at dispatch time against the environment active at that moment
//! (see [`Argument::expand`]).

use super::variables::{Variables, split_list};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// How an argument was written in the listfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// `foo`, `${SRCS}`: substituted, then split on the list separator.
    Unquoted,
    /// `"foo bar"`: substituted, always one argument.
    Quoted,
    /// `[[foo]]`: taken literally.
    Bracket,
}

/// One argument token of a directive call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub value: String,
    pub kind: ArgumentKind,
}

impl Argument {
    pub fn unquoted(value: impl Into<String>) -> Self {
        Self { value: value.into(), kind: ArgumentKind::Unquoted }
    }

    pub fn quoted(value: impl Into<String>) -> Self {
        Self { value: value.into(), kind: ArgumentKind::Quoted }
    }

    /// Substitutes variable references and splits unquoted lists.
    pub fn expand(&self, variables: &Variables) -> Vec<String> {
        match self.kind {
            ArgumentKind::Bracket => vec![self.value.clone()],
            ArgumentKind::Quoted => vec![substitute(&self.value, variables)],
            ArgumentKind::Unquoted => split_list(&substitute(&self.value, variables)),
        }
    }
}

/// A single command invocation of a listfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub command: String,
    pub arguments: Vec<Argument>,
    pub file: PathBuf,
    pub line: usize,
}

impl Directive {
    /// The arguments as they look after substitution against the given environment.
    pub fn expand_arguments(&self, variables: &Variables) -> Vec<String> {
        self.arguments.iter().flat_map(|argument| argument.expand(variables)).collect()
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arguments: Vec<&str> = self.arguments.iter().map(|arg| arg.value.as_str()).collect();
        write!(f, "{}({}) at {}:{}", self.command, arguments.join(" "), self.file.display(), self.line)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{file}:{line}: unexpected character '{found}'")]
    UnexpectedCharacter { file: PathBuf, line: usize, found: char },
    #[error("{file}:{line}: expected '(' after '{command}'")]
    MissingOpenParenthesis { file: PathBuf, line: usize, command: String },
    #[error("{file}:{line}: unterminated call of '{command}'")]
    UnterminatedCall { file: PathBuf, line: usize, command: String },
    #[error("{file}:{line}: unterminated quoted argument")]
    UnterminatedQuote { file: PathBuf, line: usize },
    #[error("{file}:{line}: unterminated bracket")]
    UnterminatedBracket { file: PathBuf, line: usize },
}

/// Splits the listfile content into directives.
pub fn parse(content: &str, file: &Path) -> Result<Vec<Directive>, ParseError> {
    Lexer::new(content, file).directives()
}

/// Replaces `${NAME}` references with their values, innermost first.
///
/// References to unknown variables are kept verbatim, so later stages can
/// still see which variable was meant.
pub fn substitute(text: &str, variables: &Variables) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let reference = &rest[start..];
        match reference_end(reference) {
            Some(end) => {
                let name = substitute(&reference[2..end], variables);
                match variables.get(&name) {
                    Some(value) => output.push_str(value),
                    None => {
                        output.push_str("${");
                        output.push_str(&name);
                        output.push('}');
                    }
                }
                rest = &reference[end + 1..];
            }
            None => {
                output.push_str(reference);
                rest = "";
            }
        }
    }
    output.push_str(rest);
    output
}

/// Index of the `}` closing the reference at the start of the text.
fn reference_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'$' if bytes.get(index + 1) == Some(&b'{') => {
                depth += 1;
                index += 2;
                continue;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
        index += 1;
    }
    None
}

struct Lexer<'a> {
    chars: Vec<char>,
    position: usize,
    line: usize,
    file: &'a Path,
}

impl<'a> Lexer<'a> {
    fn new(content: &str, file: &'a Path) -> Self {
        Self { chars: content.chars().collect(), position: 0, line: 1, file }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let current = self.peek()?;
        self.position += 1;
        if current == '\n' {
            self.line += 1;
        }
        Some(current)
    }

    fn directives(mut self) -> Result<Vec<Directive>, ParseError> {
        let mut result = Vec::new();
        loop {
            self.skip_blanks_and_comments()?;
            match self.peek() {
                None => return Ok(result),
                Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                    result.push(self.directive()?);
                }
                Some(found) => {
                    return Err(ParseError::UnexpectedCharacter {
                        file: self.file.to_path_buf(),
                        line: self.line,
                        found,
                    });
                }
            }
        }
    }

    fn directive(&mut self) -> Result<Directive, ParseError> {
        let line = self.line;
        let mut command = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                command.push(c);
                self.bump();
            } else {
                break;
            }
        }
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.bump();
        }
        if self.peek() != Some('(') {
            return Err(ParseError::MissingOpenParenthesis {
                file: self.file.to_path_buf(),
                line,
                command,
            });
        }
        self.bump();

        let mut arguments = Vec::new();
        let mut depth = 0usize;
        loop {
            self.skip_blanks_and_comments()?;
            match self.peek() {
                None => {
                    return Err(ParseError::UnterminatedCall {
                        file: self.file.to_path_buf(),
                        line,
                        command,
                    });
                }
                Some(')') if depth == 0 => {
                    self.bump();
                    break;
                }
                Some(')') => {
                    self.bump();
                    depth -= 1;
                    arguments.push(Argument::unquoted(")"));
                }
                Some('(') => {
                    self.bump();
                    depth += 1;
                    arguments.push(Argument::unquoted("("));
                }
                Some('"') => arguments.push(self.quoted()?),
                Some('[') if self.bracket_level().is_some() => {
                    let value = self.bracket()?;
                    arguments.push(Argument { value, kind: ArgumentKind::Bracket });
                }
                Some(_) => arguments.push(self.unquoted()?),
            }
        }

        Ok(Directive { command, arguments, file: self.file.to_path_buf(), line })
    }

    fn skip_blanks_and_comments(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                self.bump();
                if self.peek() == Some('[') && self.bracket_level().is_some() {
                    self.bracket()?;
                } else {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Number of `=` signs if the input continues with an opening bracket `[==[`.
    fn bracket_level(&self) -> Option<usize> {
        if self.peek() != Some('[') {
            return None;
        }
        let mut level = 0;
        while self.peek_at(1 + level) == Some('=') {
            level += 1;
        }
        (self.peek_at(1 + level) == Some('[')).then_some(level)
    }

    fn bracket(&mut self) -> Result<String, ParseError> {
        let line = self.line;
        let level = self.bracket_level().unwrap_or_default();
        for _ in 0..level + 2 {
            self.bump();
        }
        // A newline right after the opening bracket is not part of the content.
        if self.peek() == Some('\n') {
            self.bump();
        }
        let mut value = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ParseError::UnterminatedBracket { file: self.file.to_path_buf(), line });
                }
                Some(']') if self.closes_bracket(level) => {
                    for _ in 0..level + 1 {
                        self.bump();
                    }
                    return Ok(value);
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn closes_bracket(&self, level: usize) -> bool {
        (0..level).all(|offset| self.peek_at(offset) == Some('=')) && self.peek_at(level) == Some(']')
    }

    fn quoted(&mut self) -> Result<Argument, ParseError> {
        let line = self.line;
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedQuote { file: self.file.to_path_buf(), line }),
                Some('"') => return Ok(Argument::quoted(value)),
                Some('\\') => match self.bump() {
                    None => return Err(ParseError::UnterminatedQuote { file: self.file.to_path_buf(), line }),
                    // line continuation
                    Some('\n') => {}
                    Some(escaped) => push_escaped(&mut value, escaped),
                },
                Some(c) => value.push(c),
            }
        }
    }

    fn unquoted(&mut self) -> Result<Argument, ParseError> {
        let mut value = String::new();
        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => break,
                '(' | ')' | '#' => break,
                '\\' => {
                    self.bump();
                    if let Some(escaped) = self.bump() {
                        push_escaped(&mut value, escaped);
                    }
                }
                // legacy form: -DFOO="a b" stays one argument
                '"' => {
                    let quoted = self.quoted()?;
                    value.push('"');
                    value.push_str(&quoted.value);
                    value.push('"');
                }
                _ => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        Ok(Argument::unquoted(value))
    }
}

fn push_escaped(value: &mut String, escaped: char) {
    match escaped {
        'n' => value.push('\n'),
        't' => value.push('\t'),
        'r' => value.push('\r'),
        // keep the list separator escaped, it is not an element boundary
        ';' => value.push_str("\\;"),
        other => value.push(other),
    }
}
