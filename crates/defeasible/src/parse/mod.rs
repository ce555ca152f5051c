use std::fmt;

pub mod prop;

pub use prop::{parse_formula, parse_knowledge_base};

pub type ParseResult<T> = Result<T, ParseErr>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParseErr {
    Expected(String, String),
    EmptyFormula,
    EmptyToken(usize),
    NestedDefeasible(usize),
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErr::Expected(expected, got) => write!(f, "Expected {} but got {}", expected, got),
            ParseErr::EmptyFormula => write!(f, "Please enter a formula"),
            ParseErr::EmptyToken(pos) => write!(f, "Unexpected character at position {}", pos),
            ParseErr::NestedDefeasible(pos) => write!(
                f,
                "Defeasible implication at position {} may only appear at the top level",
                pos
            ),
        }
    }
}

impl std::error::Error for ParseErr {}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token<'f> {
    pub kind: TokenKind,
    pub spelling: &'f str,
    pub src_pos: usize,
}

impl<'f> fmt::Display for Token<'f> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spelling)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    And,
    Or,
    Not,
    Impl,
    DImpl,
    Equiv,
    LParen,
    RParen,
    Ident,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::And => "&",
            TokenKind::Or => "|",
            TokenKind::Not => "!",
            TokenKind::Impl => "=>",
            TokenKind::DImpl => "~>",
            TokenKind::Equiv => "<=>",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Ident => "identifier",
        };

        write!(f, "{}", s)
    }
}

// Longer spellings first so that `&&` is not read as two `&`.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("<->", TokenKind::Equiv),
    ("<=>", TokenKind::Equiv),
    ("&&", TokenKind::And),
    ("||", TokenKind::Or),
    ("->", TokenKind::Impl),
    ("=>", TokenKind::Impl),
    ("~>", TokenKind::DImpl),
    ("&", TokenKind::And),
    ("|", TokenKind::Or),
    ("!", TokenKind::Not),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("∧", TokenKind::And),
    ("∨", TokenKind::Or),
    ("¬", TokenKind::Not),
    ("→", TokenKind::Impl),
    ("↔", TokenKind::Equiv),
];

pub struct Tokenizer<'f> {
    formula: &'f str,
    pos: usize,
}

impl<'f> Tokenizer<'f> {
    pub fn new(formula: &'f str) -> Self {
        Self { formula, pos: 0 }
    }
}

impl<'f> Iterator for Tokenizer<'f> {
    type Item = ParseResult<Token<'f>>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.formula[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();

        if trimmed.is_empty() {
            return None;
        }

        let src_pos = self.pos;

        for (spelling, kind) in OPERATORS {
            if trimmed.starts_with(spelling) {
                self.pos += spelling.len();
                return Some(Ok(Token {
                    kind: *kind,
                    spelling: &self.formula[src_pos..self.pos],
                    src_pos,
                }));
            }
        }

        let len: usize = trimmed
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .map(char::len_utf8)
            .sum();

        if len == 0 {
            // Nothing after an unknown character is tokenized
            self.pos = self.formula.len();
            return Some(Err(ParseErr::EmptyToken(src_pos)));
        }

        self.pos += len;
        Some(Ok(Token {
            kind: TokenKind::Ident,
            spelling: &self.formula[src_pos..self.pos],
            src_pos,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::{ParseErr, TokenKind::*, Tokenizer};

    #[test]
    fn tokenize() {
        let kinds: Vec<_> = Tokenizer::new("bird ~> !fly && (a <=> b_2)")
            .map(|t| t.unwrap().kind)
            .collect();
        assert_eq!(
            vec![Ident, DImpl, Not, Ident, And, LParen, Ident, Equiv, Ident, RParen],
            kinds
        );
    }

    #[test]
    fn positions() {
        let toks: Vec<_> = Tokenizer::new("  p  => b").map(Result::unwrap).collect();
        assert_eq!(2, toks[0].src_pos);
        assert_eq!(5, toks[1].src_pos);
        assert_eq!("=>", toks[1].spelling);
        assert_eq!(8, toks[2].src_pos);
    }

    #[test]
    fn unicode_connectives() {
        let kinds: Vec<_> = Tokenizer::new("¬a ∧ b → c")
            .map(|t| t.unwrap().kind)
            .collect();
        assert_eq!(vec![Not, Ident, And, Ident, Impl, Ident], kinds);
    }

    #[test]
    fn invalid_character() {
        let res: Result<Vec<_>, _> = Tokenizer::new("a $ b").collect();
        assert_eq!(Err(ParseErr::EmptyToken(2)), res);
    }
}
