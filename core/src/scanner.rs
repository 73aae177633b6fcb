//! Character-stream tokenizer.
//!
//! The parser flattens the argument vector into one string, joining the
//! elements with [`ARG_DELIMITER`]. The [`Scanner`] walks that string one
//! character at a time and classifies maximal runs into [`Token`]s, which
//! lets it recover the original argument boundaries without holding on to
//! the vector itself.
//!
//! # Example
//!
//! ```
//! use argtree_core::{Scanner, ScannerConfig, Token, join_args};
//!
//! let input = join_args(&["prog", "--name=value"]);
//! let config = ScannerConfig::default();
//! let tokens: Vec<Token> = Scanner::new(&input, &config).map(|lx| lx.token).collect();
//!
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::Ident,
//!         Token::ArgDelimiter,
//!         Token::LongFlag,
//!         Token::Assign,
//!         Token::Ident,
//!     ]
//! );
//! ```

use std::str::Chars;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Position, Token};

/// Sentinel joining argument-vector elements in the flattened stream.
///
/// No argument coming from a C-style argv can contain it.
pub const ARG_DELIMITER: char = '\0';

/// Flattens an argument vector into the delimited stream the scanner reads.
pub fn join_args<S: AsRef<str>>(args: &[S]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(ARG_DELIMITER);
        }
        out.push_str(arg.as_ref());
    }
    out
}

/// Lexical configuration: the three characters that shape a dialect.
///
/// The default is the POSIX-like dialect: `-` prefix (so `--` introduces a
/// long flag, a bare `--` stops flag parsing, and a bare `-` means stdin),
/// `=` for assignment and `,` between multiple values.
///
/// # Examples
///
/// ```
/// use argtree_core::{ScannerConfig, Token};
///
/// let windows = ScannerConfig::new('/', ':', ',');
/// assert_eq!(windows.classify("/f"), Token::ShortFlag);
/// assert_eq!(windows.classify("-f"), Token::Ident);
///
/// let posix = ScannerConfig::default();
/// assert_eq!(posix.classify("--"), Token::StopFlag);
/// assert_eq!(posix.classify("-abc"), Token::CompoundShortFlag);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Character separating a flag from an attached value.
    pub assignment_operator: char,
    /// Character introducing a flag; doubled for long flags.
    pub flag_prefix: char,
    /// Character separating values grouped into one argument.
    pub multi_value_delim: char,
}

impl ScannerConfig {
    /// The POSIX-like dialect (`-`, `=`, `,`).
    pub const POSIXY: Self = Self::new('-', '=', ',');

    pub const fn new(
        flag_prefix: char,
        assignment_operator: char,
        multi_value_delim: char,
    ) -> Self {
        Self {
            assignment_operator,
            flag_prefix,
            multi_value_delim,
        }
    }

    pub fn is_flag_prefix(&self, ch: char) -> bool {
        ch == self.flag_prefix
    }

    pub fn is_assignment_operator(&self, ch: char) -> bool {
        ch == self.assignment_operator
    }

    pub fn is_multi_value_delim(&self, ch: char) -> bool {
        ch == self.multi_value_delim
    }

    pub fn is_blankspace(&self, ch: char) -> bool {
        matches!(ch, ' ' | '\t' | '\n')
    }

    /// Returns the doubled flag prefix (`--` in the POSIX-like dialect).
    pub fn stop_flag(&self) -> String {
        [self.flag_prefix, self.flag_prefix].iter().collect()
    }

    /// Classifies a word by its length and leading characters.
    ///
    /// A lone prefix is [`Token::StdinFlag`], a lone doubled prefix is
    /// [`Token::StopFlag`], prefix plus one character is
    /// [`Token::ShortFlag`], prefix plus more is
    /// [`Token::CompoundShortFlag`], doubled prefix plus more is
    /// [`Token::LongFlag`], anything unprefixed is [`Token::Ident`].
    pub fn classify(&self, word: &str) -> Token {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return Token::Empty;
        };
        let second = chars.next();
        let len = word.chars().count();

        if !self.is_flag_prefix(first) {
            return Token::Ident;
        }

        let doubled = second.is_some_and(|ch| self.is_flag_prefix(ch));
        match (len, doubled) {
            (1, _) => Token::StdinFlag,
            (2, true) => Token::StopFlag,
            (2, false) => Token::ShortFlag,
            (_, true) => Token::LongFlag,
            (_, false) => Token::CompoundShortFlag,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self::POSIXY
    }
}

/// One scanned token with its literal text and starting position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub literal: String,
    pub pos: Position,
}

impl Lexeme {
    pub fn new(token: Token, literal: impl Into<String>, pos: Position) -> Self {
        Self {
            token,
            literal: literal.into(),
            pos,
        }
    }
}

/// Tokenizer over a flattened argument stream.
///
/// Holds exactly one character of pushback, which is all the maximal-munch
/// lookahead at word and blankspace boundaries needs.
pub struct Scanner<'a> {
    chars: Chars<'a>,
    config: &'a ScannerConfig,
    pushback: Option<char>,
    offset: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str, config: &'a ScannerConfig) -> Self {
        Self {
            chars: input.chars(),
            config,
            pushback: None,
            offset: 0,
        }
    }

    /// Scans the next lexeme. Keeps returning [`Token::Eol`] once the
    /// stream is exhausted.
    pub fn next_lexeme(&mut self) -> Lexeme {
        let start = Position::new(self.offset + 1);

        let Some(ch) = self.read() else {
            return Lexeme::new(Token::Eol, "", start);
        };

        let lexeme = if self.config.is_blankspace(ch) {
            self.unread(ch);
            self.scan_blankspace(start)
        } else if ch == ARG_DELIMITER {
            Lexeme::new(Token::ArgDelimiter, ch, start)
        } else if self.config.is_assignment_operator(ch) {
            Lexeme::new(Token::Assign, ch, start)
        } else if self.config.is_multi_value_delim(ch) {
            Lexeme::new(Token::MultiValueDelimiter, ch, start)
        } else if !is_graphic(ch) {
            Lexeme::new(Token::Illegal, ch, start)
        } else {
            self.unread(ch);
            self.scan_word(start)
        };

        trace!(token = %lexeme.token, literal = ?lexeme.literal, pos = %lexeme.pos, "scanned");

        lexeme
    }

    fn read(&mut self) -> Option<char> {
        let ch = self.pushback.take().or_else(|| self.chars.next())?;
        self.offset += 1;
        Some(ch)
    }

    fn unread(&mut self, ch: char) {
        debug_assert!(self.pushback.is_none(), "scanner pushback is one character deep");
        self.pushback = Some(ch);
        self.offset -= 1;
    }

    fn scan_blankspace(&mut self, start: Position) -> Lexeme {
        let mut buf = String::new();

        while let Some(ch) = self.read() {
            if !self.config.is_blankspace(ch) {
                self.unread(ch);
                break;
            }
            buf.push(ch);
        }

        Lexeme::new(Token::Bs, buf, start)
    }

    fn scan_word(&mut self, start: Position) -> Lexeme {
        let mut buf = String::new();

        while let Some(ch) = self.read() {
            if ch == ARG_DELIMITER
                || self.config.is_assignment_operator(ch)
                || self.config.is_multi_value_delim(ch)
            {
                self.unread(ch);
                break;
            }
            buf.push(ch);
        }

        Lexeme::new(self.config.classify(&buf), buf, start)
    }
}

/// Unicode's graphic class without a category table: everything but control
/// and format characters, line and paragraph separators, private use code
/// points and noncharacters. Unassigned code points count as graphic.
fn is_graphic(ch: char) -> bool {
    let noncharacter = (ch as u32) & 0xFFFE == 0xFFFE;

    !(ch.is_control()
        || noncharacter
        || matches!(
            ch,
            '\u{00AD}'
                | '\u{0600}'..='\u{0605}'
                | '\u{061C}'
                | '\u{06DD}'
                | '\u{070F}'
                | '\u{180E}'
                | '\u{200B}'..='\u{200F}'
                | '\u{2028}'..='\u{202E}'
                | '\u{2060}'..='\u{206F}'
                | '\u{E000}'..='\u{F8FF}'
                | '\u{FDD0}'..='\u{FDEF}'
                | '\u{FEFF}'
                | '\u{FFF9}'..='\u{FFFB}'
                | '\u{E0001}'..='\u{E007F}'
                | '\u{F0000}'..='\u{10FFFF}'
        ))
}

impl Iterator for Scanner<'_> {
    type Item = Lexeme;

    /// Yields lexemes up to, but not including, [`Token::Eol`].
    fn next(&mut self) -> Option<Lexeme> {
        let lexeme = self.next_lexeme();
        (lexeme.token != Token::Eol).then_some(lexeme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(args: &[&str], config: &ScannerConfig) -> Vec<(Token, String)> {
        let input = join_args(args);
        Scanner::new(&input, config)
            .map(|lx| (lx.token, lx.literal))
            .collect()
    }

    fn tokens(args: &[&str]) -> Vec<Token> {
        scan_all(args, &ScannerConfig::default())
            .into_iter()
            .map(|(tok, _)| tok)
            .collect()
    }

    #[test]
    fn test_classify_posixy() {
        let cfg = ScannerConfig::default();
        assert_eq!(cfg.classify(""), Token::Empty);
        assert_eq!(cfg.classify("x"), Token::Ident);
        assert_eq!(cfg.classify("-"), Token::StdinFlag);
        assert_eq!(cfg.classify("--"), Token::StopFlag);
        assert_eq!(cfg.classify("-x"), Token::ShortFlag);
        assert_eq!(cfg.classify("-xyz"), Token::CompoundShortFlag);
        assert_eq!(cfg.classify("--xyz"), Token::LongFlag);
        assert_eq!(cfg.classify("--x"), Token::LongFlag);
        assert_eq!(cfg.classify("x-"), Token::Ident);
        assert_eq!(cfg.classify("-2"), Token::ShortFlag);
    }

    #[test]
    fn test_scan_single_argument() {
        assert_eq!(tokens(&["pizzas"]), vec![Token::Ident]);
    }

    #[test]
    fn test_scan_preserves_argument_boundaries() {
        assert_eq!(
            tokens(&["pizzas", "-aca", "--fresh", "-", "--"]),
            vec![
                Token::Ident,
                Token::ArgDelimiter,
                Token::CompoundShortFlag,
                Token::ArgDelimiter,
                Token::LongFlag,
                Token::ArgDelimiter,
                Token::StdinFlag,
                Token::ArgDelimiter,
                Token::StopFlag,
            ]
        );
    }

    #[test]
    fn test_scan_assignment_and_multi_values() {
        let scanned = scan_all(&["--with=whales,waters"], &ScannerConfig::default());
        assert_eq!(
            scanned,
            vec![
                (Token::LongFlag, "--with".to_string()),
                (Token::Assign, "=".to_string()),
                (Token::Ident, "whales".to_string()),
                (Token::MultiValueDelimiter, ",".to_string()),
                (Token::Ident, "waters".to_string()),
            ]
        );
    }

    #[test]
    fn test_scan_embedded_blankspace_stays_in_word() {
        let scanned = scan_all(&["lens flares"], &ScannerConfig::default());
        assert_eq!(scanned, vec![(Token::Ident, "lens flares".to_string())]);
    }

    #[test]
    fn test_scan_leading_blankspace() {
        let scanned = scan_all(&["  \tx"], &ScannerConfig::default());
        assert_eq!(
            scanned,
            vec![
                (Token::Bs, "  \t".to_string()),
                (Token::Ident, "x".to_string()),
            ]
        );
    }

    #[test]
    fn test_scan_custom_dialect() {
        let cfg = ScannerConfig::new('^', '@', ',');
        let scanned = scan_all(&["^wAT@golf", "^^FIERCENESS@-2"], &cfg);
        assert_eq!(
            scanned,
            vec![
                (Token::CompoundShortFlag, "^wAT".to_string()),
                (Token::Assign, "@".to_string()),
                (Token::Ident, "golf".to_string()),
                (Token::ArgDelimiter, "\0".to_string()),
                (Token::LongFlag, "^^FIERCENESS".to_string()),
                (Token::Assign, "@".to_string()),
                (Token::Ident, "-2".to_string()),
            ]
        );
    }

    #[test]
    fn test_scan_windows_dialect() {
        let cfg = ScannerConfig::new('/', ':', ',');
        let scanned = scan_all(&["/o:ppy"], &cfg);
        assert_eq!(
            scanned,
            vec![
                (Token::ShortFlag, "/o".to_string()),
                (Token::Assign, ":".to_string()),
                (Token::Ident, "ppy".to_string()),
            ]
        );
    }

    #[test]
    fn test_scan_positions_are_one_based_columns() {
        let input = join_args(&["pizzas", "=", "--wat"]);
        let config = ScannerConfig::default();
        let positions: Vec<(Token, usize)> = Scanner::new(&input, &config)
            .map(|lx| (lx.token, lx.pos.column))
            .collect();

        assert_eq!(
            positions,
            vec![
                (Token::Ident, 1),
                (Token::ArgDelimiter, 7),
                (Token::Assign, 8),
                (Token::ArgDelimiter, 9),
                (Token::LongFlag, 10),
            ]
        );
    }

    #[test]
    fn test_scan_illegal_character() {
        let scanned = scan_all(&["ok", "\u{1}"], &ScannerConfig::default());
        assert_eq!(scanned[2], (Token::Illegal, "\u{1}".to_string()));
    }

    #[test]
    fn test_scan_non_graphic_characters_are_illegal() {
        for ch in ['\r', '\u{200B}', '\u{FEFF}', '\u{E000}', '\u{2028}'] {
            let scanned = scan_all(&[&ch.to_string()], &ScannerConfig::default());
            assert_eq!(scanned[0].0, Token::Illegal, "{ch:?}");
        }

        for word in ["\u{00A0}x", "日本", "é"] {
            let scanned = scan_all(&[word], &ScannerConfig::default());
            assert_eq!(scanned, vec![(Token::Ident, word.to_string())]);
        }
    }

    #[test]
    fn test_scan_eol_repeats() {
        let config = ScannerConfig::default();
        let mut scanner = Scanner::new("x", &config);
        assert_eq!(scanner.next_lexeme().token, Token::Ident);
        assert_eq!(scanner.next_lexeme().token, Token::Eol);
        assert_eq!(scanner.next_lexeme().token, Token::Eol);
    }
}
