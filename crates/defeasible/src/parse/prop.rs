use std::iter::Peekable;

use crate::{
    kb::KnowledgeBase,
    logic::Formula,
    parse::{ParseErr, ParseResult, Token, TokenKind},
};

use super::Tokenizer;

/// Parses a single formula. `~>` is accepted only as the outermost connective.
pub fn parse_formula(formula: &str) -> ParseResult<Formula> {
    PropParser::parse(formula)
}

/// Parses formulas separated by `;` or line breaks. Blank entries are skipped.
pub fn parse_knowledge_base(text: &str) -> ParseResult<KnowledgeBase> {
    text.split(|c| c == ';' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_formula)
        .collect()
}

pub struct PropParser<'t> {
    tokens: Peekable<Tokenizer<'t>>,
}

impl<'f> PropParser<'f> {
    pub fn parse(formula: &'f str) -> ParseResult<Formula> {
        let mut parser = PropParser {
            tokens: Tokenizer::new(formula).peekable(),
        };
        if parser.tokens.peek().is_none() {
            return Err(ParseErr::EmptyFormula);
        }
        let node = parser.parse_defeasible()?;
        match parser.tokens.peek() {
            Some(_) => Err(parser.unexpected("end of input")),
            None => Ok(node),
        }
    }

    fn parse_defeasible(&mut self) -> ParseResult<Formula> {
        let stub = self.parse_equiv()?;

        if self.next_is(TokenKind::DImpl) {
            self.bump()?;
            let right = self.parse_equiv()?;
            return Ok(Formula::typically(stub, right));
        }

        Ok(stub)
    }

    fn parse_equiv(&mut self) -> ParseResult<Formula> {
        let mut stub = self.parse_impl()?;

        while self.next_is(TokenKind::Equiv) {
            self.bump()?;
            let right = self.parse_impl()?;
            stub = Formula::And(vec![
                Formula::implies(stub.clone(), right.clone()),
                Formula::implies(right, stub),
            ]);
        }

        Ok(stub)
    }

    fn parse_impl(&mut self) -> ParseResult<Formula> {
        let stub = self.parse_or()?;

        if self.next_is(TokenKind::Impl) {
            self.bump()?;
            let right = self.parse_impl()?;
            return Ok(Formula::implies(stub, right));
        }

        Ok(stub)
    }

    fn parse_or(&mut self) -> ParseResult<Formula> {
        let mut children = vec![self.parse_and()?];

        while self.next_is(TokenKind::Or) {
            self.bump()?;
            children.push(self.parse_and()?);
        }

        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Formula::Or(children)
        })
    }

    fn parse_and(&mut self) -> ParseResult<Formula> {
        let mut children = vec![self.parse_not()?];

        while self.next_is(TokenKind::And) {
            self.bump()?;
            children.push(self.parse_not()?);
        }

        Ok(if children.len() == 1 {
            children.remove(0)
        } else {
            Formula::And(children)
        })
    }

    fn parse_not(&mut self) -> ParseResult<Formula> {
        if self.next_is(TokenKind::Not) {
            self.bump()?;
            Ok(Formula::not(self.parse_not()?))
        } else {
            self.parse_paren()
        }
    }

    fn parse_paren(&mut self) -> ParseResult<Formula> {
        if self.next_is(TokenKind::LParen) {
            self.bump()?;
            let exp = self.parse_equiv()?;
            self.eat(TokenKind::RParen)?;
            Ok(exp)
        } else {
            self.parse_var()
        }
    }

    fn parse_var(&mut self) -> ParseResult<Formula> {
        if !self.next_is(TokenKind::Ident) {
            return Err(self.unexpected("identifier"));
        }

        let exp = Formula::prop(self.cur_token()?.spelling);
        self.bump()?;
        Ok(exp)
    }

    fn next_is(&mut self, expected: TokenKind) -> bool {
        match self.tokens.peek() {
            Some(Ok(Token { kind, .. })) => *kind == expected,
            _ => false,
        }
    }

    fn bump(&mut self) -> ParseResult<()> {
        match self.tokens.next() {
            Some(Ok(_)) => Ok(()),
            Some(Err(e)) => Err(e),
            None => Err(ParseErr::Expected(
                "token".to_string(),
                "end of input".to_string(),
            )),
        }
    }

    fn eat(&mut self, expected: TokenKind) -> ParseResult<()> {
        if self.next_is(expected) {
            self.bump()
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    /// Error for the token at the cursor. A stray `~>` gets its own error
    /// since it can only show up when nested.
    fn unexpected(&mut self, expected: &str) -> ParseErr {
        match self.tokens.peek() {
            Some(Ok(Token {
                kind: TokenKind::DImpl,
                src_pos,
                ..
            })) => ParseErr::NestedDefeasible(*src_pos),
            Some(Ok(t)) => ParseErr::Expected(
                expected.to_string(),
                format!("{} at position {}", t, t.src_pos),
            ),
            Some(Err(e)) => e.clone(),
            None => ParseErr::Expected(expected.to_string(), "end of input".to_string()),
        }
    }

    fn cur_token(&mut self) -> ParseResult<&Token<'f>> {
        match self.tokens.peek() {
            Some(Ok(t)) => Ok(t),
            Some(Err(e)) => Err(e.clone()),
            _ => Err(ParseErr::Expected(
                "token".to_string(),
                "end of input".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_map {
        ($func:ident, $( $f:expr, $e:expr );*) => {{
            $(
                let cs = $func($f).expect($f);
                assert_eq!($e, cs.to_string());
            )*
        }};
    }

    macro_rules! test_list_invalid {
        ($func:ident, $( $f:expr ),*) => {{
            $(
                let res = $func($f);
                assert!(res.is_err(), "f: {}\nCS: {:?}", $f, res);
            )*
        }};
    }

    #[test]
    fn prop_valid() {
        test_map!(
            parse_formula,
            "a", "a";
            "!a", "¬a";
            "!!a", "¬¬a";
            "a -> b", "(a => b)";
            "a=>b", "(a => b)";
            "a -> b -> c", "(a => (b => c))";
            "a & b | c", "((a ∧ b) ∨ c)";
            "a & (b | c)", "(a ∧ (b ∨ c))";
            "a <-> b", "((a => b) ∧ (b => a))";
            "¬a ∨ b", "(¬a ∨ b)";
            "(b & a <-> (a) | !b)", "(((b ∧ a) => (a ∨ ¬b)) ∧ ((a ∨ ¬b) => (b ∧ a)))"
        );
    }

    #[test]
    fn defeasible_valid() {
        test_map!(
            parse_formula,
            "b ~> f", "b ~> f";
            "penguin ~> !flies", "penguin ~> ¬flies";
            "a & b ~> c | d", "(a ∧ b) ~> (c ∨ d)";
            "(a => b) ~> c", "(a => b) ~> c"
        );
    }

    #[test]
    fn prop_invalid() {
        test_list_invalid!(
            parse_formula,
            "",
            "   ",
            "-->a",
            "<--",
            "!->",
            "a!",
            "a-->",
            "b<=>",
            "<->a",
            "(a&b v2",
            "(a|b",
            "a ~>",
            "~> a"
        );
    }

    #[test]
    fn nested_defeasible() {
        assert_eq!(
            Err(ParseErr::NestedDefeasible(7)),
            parse_formula("a ~> b ~> c")
        );
        assert_eq!(
            Err(ParseErr::NestedDefeasible(3)),
            parse_formula("(a ~> b) & c")
        );
    }

    #[test]
    fn empty_formula() {
        assert_eq!(Err(ParseErr::EmptyFormula), parse_formula(""));
    }

    #[test]
    fn knowledge_base() {
        let kb = parse_knowledge_base("p => b; b ~> f\n\n b ~> w ;p ~> !f").unwrap();
        let formulas: Vec<String> = kb.iter().map(ToString::to_string).collect();
        assert_eq!(vec!["(p => b)", "b ~> f", "b ~> w", "p ~> ¬f"], formulas);
    }

    #[test]
    fn knowledge_base_deduplicates() {
        let kb = parse_knowledge_base("a; a; b").unwrap();
        assert_eq!(2, kb.len());
    }

    #[test]
    fn knowledge_base_reports_first_error() {
        assert!(parse_knowledge_base("a; b &; c").is_err());
    }
}
