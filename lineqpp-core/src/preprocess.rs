//! The two-mode line driver.
//!
//! Input is free text with embedded equation blocks. Free-text lines
//! are copied to the output byte-identical, except that part tokens
//! (`name#r`, `name#i`, or the `#x`/`#y` spellings) with an entry in
//! the translation table are replaced by their formatted values.
//!
//! A line starting (at column zero) with `#lineqpp` switches the rest
//! of that line to equation mode. The directive line is replaced by an
//! empty line on output, so line numbering downstream is unchanged. A
//! trailing backslash continues equation mode onto the next line, which
//! is likewise replaced by an empty line.

use std::io::Write;

use crate::error::LineqResult;
use crate::eval::Evaluator;
use crate::parser::Parser;
use crate::scanner::Scanner;
use crate::solver::SolverState;

/// The equation-mode directive, recognised at column zero only.
const DIRECTIVE: &str = "#lineqpp";

// ---------------------------------------------------------------------------
// Preprocessor
// ---------------------------------------------------------------------------

/// Streams free text to `out` while solving embedded equation blocks.
pub struct Preprocessor<W: Write> {
    eval: Evaluator,
    out: W,
    line: usize,
}

impl<W: Write> Preprocessor<W> {
    /// Create a preprocessor writing to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            eval: Evaluator::new(),
            out,
            line: 0,
        }
    }

    /// The solver state accumulated so far.
    #[must_use]
    pub const fn state(&self) -> &SolverState {
        self.eval.state()
    }

    /// Recover the output sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Process the entire input.
    ///
    /// Any error aborts immediately; errors carry the input line they
    /// occurred on.
    pub fn run(&mut self, input: &str) -> LineqResult<()> {
        let mut lines = input.split_inclusive('\n');
        while let Some(raw) = lines.next() {
            self.line += 1;
            let (content, ending) = split_ending(raw);

            if let Some(rest) = content.strip_prefix(DIRECTIVE) {
                let start_line = self.line;
                let block = self.collect_block(rest, ending, &mut lines)?;
                self.solve_block(&block, start_line)?;
            } else {
                self.substitute_line(content)?;
                self.out.write_all(ending.as_bytes())?;
            }
        }
        Ok(())
    }

    // -- equation mode --

    /// Gather an equation block starting with `first` (the remainder of
    /// the directive line), consuming continuation lines, and emit one
    /// empty line per line consumed.
    fn collect_block<'a>(
        &mut self,
        first: &str,
        first_ending: &str,
        lines: &mut std::str::SplitInclusive<'a, char>,
    ) -> LineqResult<String> {
        let mut block = String::from(first);
        self.out.write_all(first_ending.as_bytes())?;

        while block.ends_with('\\') {
            block.pop();
            block.push('\n');
            let Some(raw) = lines.next() else { break };
            self.line += 1;
            let (content, ending) = split_ending(raw);
            block.push_str(content);
            self.out.write_all(ending.as_bytes())?;
        }
        Ok(block)
    }

    /// Scan, parse, and solve one equation block.
    fn solve_block(&mut self, block: &str, start_line: usize) -> LineqResult<()> {
        let tokens = Scanner::new(block, start_line).scan_all()?;
        Parser::new(tokens).parse(&mut self.eval)
    }

    // -- text mode --

    /// Copy one line, replacing translated part tokens.
    fn substitute_line(&mut self, content: &str) -> LineqResult<()> {
        let bytes = content.as_bytes();
        let mut plain = 0;
        let mut i = 0;
        while i < bytes.len() {
            if !bytes[i].is_ascii_alphabetic() {
                i += 1;
                continue;
            }
            let start = i;
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            if i + 1 < bytes.len()
                && bytes[i] == b'#'
                && matches!(bytes[i + 1], b'r' | b'i' | b'x' | b'y')
                && let Some(replacement) = self
                    .eval
                    .state()
                    .translations()
                    .lookup(&content[start..i + 2])
            {
                let replacement = replacement.to_owned();
                self.out.write_all(&bytes[plain..start])?;
                self.out.write_all(replacement.as_bytes())?;
                i += 2;
                plain = i;
            }
        }
        self.out.write_all(&bytes[plain..])?;
        Ok(())
    }
}

/// Split a raw line into content and its line ending.
fn split_ending(raw: &str) -> (&str, &str) {
    raw.strip_suffix('\n')
        .map_or((raw, ""), |content| (content, "\n"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
