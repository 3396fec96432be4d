use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Display glyph for a dit
pub const PRETTY_DIT: char = '\u{2022}';
/// Display glyph for a dah
pub const PRETTY_DAH: char = '\u{2014}';

/// Morse code lookup table, stored lower-case
const MORSE_TABLE: [(char, &str); 46] = [
    ('a', ".-"),
    ('b', "-..."),
    ('c', "-.-."),
    ('d', "-.."),
    ('e', "."),
    ('f', "..-."),
    ('g', "--."),
    ('h', "...."),
    ('i', ".."),
    ('j', ".---"),
    ('k', "-.-"),
    ('l', ".-.."),
    ('m', "--"),
    ('n', "-."),
    ('o', "---"),
    ('p', ".--."),
    ('q', "--.-"),
    ('r', ".-."),
    ('s', "..."),
    ('t', "-"),
    ('u', "..-"),
    ('v', "...-"),
    ('w', ".--"),
    ('x', "-..-"),
    ('y', "-.--"),
    ('z', "--.."),
    ('0', "-----"),
    ('1', ".----"),
    ('2', "..---"),
    ('3', "...--"),
    ('4', "....-"),
    ('5', "....."),
    ('6', "-...."),
    ('7', "--..."),
    ('8', "---.."),
    ('9', "----."),
    ('.', ".-.-.-"),
    (',', "--..--"),
    ('?', "..--.."),
    ('\'', ".----."),
    ('!', "-.-.--"),
    ('/', "-..-."),
    ('(', "-.--."),
    (')', "-.--.-"),
    ('&', ".-..."),
    (':', "---..."),
];

/// A single keyed element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Dit,
    Dah,
}

impl Symbol {
    /// Raw dot/dash form used by the code table
    pub fn as_char(self) -> char {
        match self {
            Symbol::Dit => '.',
            Symbol::Dah => '-',
        }
    }

    pub fn pretty(self) -> char {
        match self {
            Symbol::Dit => PRETTY_DIT,
            Symbol::Dah => PRETTY_DAH,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '.' => Some(Symbol::Dit),
            '-' => Some(Symbol::Dah),
            _ => None,
        }
    }
}

/// An ordered run of symbols, e.g. the pending buffer of the decoder.
///
/// No length cap: an over-long run simply fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pattern(Vec<Symbol>);

impl Pattern {
    pub fn new() -> Self {
        Self(Vec::with_capacity(8))
    }

    pub fn push(&mut self, symbol: Symbol) {
        self.0.push(symbol);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// Move the contents out, leaving this pattern empty
    pub fn take(&mut self) -> Pattern {
        Pattern(std::mem::take(&mut self.0))
    }

    /// Render with dit/dah glyphs instead of dots and dashes
    pub fn pretty(&self) -> String {
        self.0.iter().map(|s| s.pretty()).collect()
    }
}

impl FromIterator<Symbol> for Pattern {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Pattern(iter.into_iter().collect())
    }
}

impl From<Vec<Symbol>> for Pattern {
    fn from(symbols: Vec<Symbol>) -> Self {
        Pattern(symbols)
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .map(|c| Symbol::from_char(c).ok_or_else(|| Error::UnknownPattern(s.to_string())))
            .collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.0 {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Letter,
    Digit,
    Punctuation,
}

/// One row of the code table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    character: char,
    encoding: &'static str,
    pattern: Pattern,
}

impl CodeEntry {
    pub fn character(&self) -> char {
        self.character
    }

    /// Dot/dash text, e.g. ".-" for `a`
    pub fn encoding(&self) -> &'static str {
        self.encoding
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn category(&self) -> Category {
        match self.character {
            'a'..='z' => Category::Letter,
            '0'..='9' => Category::Digit,
            _ => Category::Punctuation,
        }
    }

    pub fn pretty(&self) -> String {
        self.pattern.pretty()
    }
}

struct CodeTable {
    entries: Vec<CodeEntry>,
    by_pattern: HashMap<Pattern, usize>,
    by_char: HashMap<char, usize>,
}

fn table() -> &'static CodeTable {
    static TABLE: OnceLock<CodeTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let entries: Vec<CodeEntry> = MORSE_TABLE
            .iter()
            .map(|&(character, encoding)| CodeEntry {
                character,
                encoding,
                pattern: encoding
                    .chars()
                    .filter_map(Symbol::from_char)
                    .collect(),
            })
            .collect();

        let by_pattern = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.pattern.clone(), i))
            .collect();
        let by_char = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.character, i))
            .collect();

        CodeTable {
            entries,
            by_pattern,
            by_char,
        }
    })
}

/// All entries in table order
pub fn entries() -> &'static [CodeEntry] {
    &table().entries
}

/// Find the entry for a character; ASCII upper-case folds to lower-case
pub fn lookup(character: char) -> Option<&'static CodeEntry> {
    let t = table();
    t.by_char
        .get(&character.to_ascii_lowercase())
        .map(|&i| &t.entries[i])
}

/// Decode a complete pattern by exact match
pub fn decode(pattern: &Pattern) -> Result<char> {
    let t = table();
    t.by_pattern
        .get(pattern)
        .map(|&i| t.entries[i].character)
        .ok_or_else(|| Error::UnknownPattern(pattern.to_string()))
}

pub fn encode_pattern(character: char) -> Result<Pattern> {
    lookup(character)
        .map(|e| e.pattern.clone())
        .ok_or(Error::UnknownCharacter(character))
}

/// Glyph rendering of a character's code, e.g. "•—" for `a`
pub fn encode_pretty(character: char) -> Result<String> {
    lookup(character)
        .map(CodeEntry::pretty)
        .ok_or(Error::UnknownCharacter(character))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn p(s: &str) -> Pattern {
        s.parse().unwrap()
    }

    #[test]
    fn test_lookup_common_letters() {
        assert_eq!(decode(&p(".")).unwrap(), 'e');
        assert_eq!(decode(&p("-")).unwrap(), 't');
        assert_eq!(decode(&p(".-")).unwrap(), 'a');
        assert_eq!(decode(&p("...")).unwrap(), 's');
        assert_eq!(decode(&p("---")).unwrap(), 'o');
        assert_eq!(decode(&p(".----.")).unwrap(), '\'');
    }

    #[test]
    fn test_table_shape() {
        assert_eq!(entries().len(), 46);
        let count = |c: Category| entries().iter().filter(|e| e.category() == c).count();
        assert_eq!(count(Category::Letter), 26);
        assert_eq!(count(Category::Digit), 10);
        assert_eq!(count(Category::Punctuation), 10);
        assert!(entries().iter().all(|e| e.pattern().len() <= 8));
    }

    #[test]
    fn test_every_entry_round_trips() {
        for entry in entries() {
            let pattern = encode_pattern(entry.character()).unwrap();
            assert_eq!(pattern.to_string(), entry.encoding());
            assert_eq!(decode(&pattern).unwrap(), entry.character());
        }
    }

    #[test]
    fn test_patterns_and_characters_are_unique() {
        let patterns: HashSet<_> = entries().iter().map(|e| e.pattern().clone()).collect();
        let chars: HashSet<_> = entries().iter().map(|e| e.character()).collect();
        assert_eq!(patterns.len(), entries().len());
        assert_eq!(chars.len(), entries().len());
    }

    #[test]
    fn test_strict_prefix_never_decodes_to_same_entry() {
        for entry in entries() {
            let symbols = entry.pattern().symbols();
            for cut in 1..symbols.len() {
                let prefix: Pattern = symbols[..cut].iter().copied().collect();
                if let Ok(c) = decode(&prefix) {
                    assert_ne!(c, entry.character(), "prefix {prefix} of {}", entry.encoding());
                }
            }
        }
    }

    #[test]
    fn test_unknown_pattern() {
        let err = decode(&p("--------")).unwrap_err();
        assert!(matches!(err, Error::UnknownPattern(ref s) if s == "--------"));
        assert!(decode(&Pattern::new()).is_err());
    }

    #[test]
    fn test_encode_pretty() {
        assert_eq!(encode_pretty('a').unwrap(), "\u{2022}\u{2014}");
        assert_eq!(encode_pretty('A').unwrap(), "\u{2022}\u{2014}");
        assert_eq!(encode_pretty('0').unwrap(), "\u{2014}".repeat(5));
        assert!(matches!(encode_pretty('#'), Err(Error::UnknownCharacter('#'))));
    }

    #[test]
    fn test_pattern_parse_rejects_other_chars() {
        assert!(".x-".parse::<Pattern>().is_err());
        assert_eq!(p("").len(), 0);
        assert_eq!(p("-.-").symbols(), &[Symbol::Dah, Symbol::Dit, Symbol::Dah]);
    }
}
