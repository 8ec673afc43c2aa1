use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::PreprocessError;

/// Name used in error messages for text typed at the REPL.
pub const REPL_SOURCE: &str = "<repl>";

/// Expands `#include` and `#define` directives.
///
/// Directives must be the first thing on their line:
/// - `#include "path"` is replaced by the expanded contents of `path`,
///   resolved against the directory of the including file.
/// - `#define NAME text` makes every later whole-word `NAME` outside string
///   literals and comments read as `text`. Replacement text is not rescanned.
///
/// Directive lines become empty lines. Any other line starting with `#` is a
/// comment and passes through unchanged.
///
/// An `#include` line is replaced by every line of the included file, so the
/// lines after it move down. Positions reported by the lexer, parser and
/// interpreter count lines of the expanded text. Only this function's own
/// errors name the file and line as written.
///
/// # Parameters
/// - `source`: The text to expand.
/// - `root`: The file `source` was read from or, when `repl_mode` is set, the
///   directory includes are resolved against.
/// - `repl_mode`: Whether `source` was typed interactively.
///
/// # Errors
/// - `FileNotFound` if an included file does not exist.
/// - `CircularInclude` if a file ends up including itself.
/// - `InvalidDirective` for a malformed `#include` or `#define`.
/// - `Io` if an included file cannot be read.
///
/// # Example
/// ```
/// use std::path::Path;
///
/// use opera::interpreter::preprocessor::preprocess;
///
/// let out = preprocess("#define TWO 2\nTWO + \"TWO\"", Path::new("."), true).unwrap();
/// assert_eq!(out, "\n2 + \"TWO\"\n");
/// ```
pub fn preprocess(source: &str, root: &Path, repl_mode: bool) -> Result<String, PreprocessError> {
    let mut preprocessor = Preprocessor::default();
    let mut out = String::with_capacity(source.len());

    if repl_mode {
        preprocessor.expand(source, Path::new(REPL_SOURCE), root, &mut out)?;
    } else {
        let canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let dir = root.parent().unwrap_or_else(|| Path::new("."));
        preprocessor.active.push(canonical);
        preprocessor.expand(source, root, dir, &mut out)?;
    }

    Ok(out)
}

#[derive(Debug, Default)]
struct Preprocessor {
    /// Files currently being expanded, outermost first.
    active:  Vec<PathBuf>,
    defines: HashMap<String, String>,
}

impl Preprocessor {
    fn expand(&mut self,
              source: &str,
              file: &Path,
              dir: &Path,
              out: &mut String)
              -> Result<(), PreprocessError> {
        for (index, line) in source.lines().enumerate() {
            let line_number = index + 1;
            let invalid = |details: &str| {
                PreprocessError::InvalidDirective { details: details.to_string(),
                                                    file:    file.to_path_buf(),
                                                    line:    line_number, }
            };

            if let Some(rest) = directive(line, "include") {
                let path = parse_quoted(rest).ok_or_else(|| invalid("expected #include \"path\""))?;
                self.include(&dir.join(path), file, line_number, out)?;
            } else if let Some(rest) = directive(line, "define") {
                let (name, text) = rest.split_once(char::is_whitespace)
                                       .unwrap_or((rest, ""));
                if !is_identifier(name) {
                    return Err(invalid("expected #define NAME text"));
                }
                debug!(name, text = text.trim(), "define");
                self.defines.insert(name.to_string(), text.trim().to_string());
                out.push('\n');
            } else if line.trim_start().starts_with('#') {
                out.push_str(line);
                out.push('\n');
            } else {
                self.substitute(line, out);
                out.push('\n');
            }
        }
        Ok(())
    }

    fn include(&mut self,
               path: &Path,
               file: &Path,
               line: usize,
               out: &mut String)
               -> Result<(), PreprocessError> {
        if !path.is_file() {
            return Err(PreprocessError::FileNotFound { path: path.to_path_buf(),
                                                       file: file.to_path_buf(),
                                                       line });
        }
        let canonical = path.canonicalize()
                            .map_err(|source| PreprocessError::Io { path: path.to_path_buf(),
                                                                    source })?;
        if self.active.contains(&canonical) {
            return Err(PreprocessError::CircularInclude { path: path.to_path_buf(),
                                                          file: file.to_path_buf(),
                                                          line });
        }

        let contents = fs::read_to_string(&canonical).map_err(|source| PreprocessError::Io {
                                                         path: path.to_path_buf(),
                                                         source,
                                                     })?;
        debug!(path = %path.display(), from = %file.display(), line, "include");

        let dir = canonical.parent().map(Path::to_path_buf).unwrap_or_default();
        self.active.push(canonical);
        let result = self.expand(&contents, path, &dir, out);
        self.active.pop();
        result
    }

    /// Copies `line` to `out`, replacing defined names outside string
    /// literals and comments.
    fn substitute(&self, line: &str, out: &mut String) {
        if self.defines.is_empty() {
            out.push_str(line);
            return;
        }

        let mut chars = line.char_indices().peekable();
        let mut in_string = false;

        while let Some((start, c)) = chars.next() {
            if in_string {
                out.push(c);
                match c {
                    '\\' => {
                        if let Some((_, escaped)) = chars.next() {
                            out.push(escaped);
                        }
                    },
                    '"' => in_string = false,
                    _ => {},
                }
                continue;
            }

            match c {
                '"' => {
                    in_string = true;
                    out.push(c);
                },
                '#' => {
                    out.push_str(&line[start..]);
                    return;
                },
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let mut end = start + c.len_utf8();
                    while let Some((i, next)) =
                        chars.next_if(|(_, next)| next.is_ascii_alphanumeric() || *next == '_')
                    {
                        end = i + next.len_utf8();
                    }
                    let word = &line[start..end];
                    out.push_str(self.defines.get(word).map_or(word, String::as_str));
                },
                c if c.is_ascii_digit() => {
                    out.push(c);
                    while let Some((_, next)) =
                        chars.next_if(|(_, next)| next.is_ascii_alphanumeric())
                    {
                        out.push(next);
                    }
                },
                _ => out.push(c),
            }
        }
    }
}

/// Returns the text after `#name` if `line` is that directive.
fn directive<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix('#')?.strip_prefix(name)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn parse_quoted(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.is_empty() && !inner.contains('"')).then_some(inner)
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next()
         .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
