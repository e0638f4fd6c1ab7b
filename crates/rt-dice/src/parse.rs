//! Dice notation parsing.
//!
//! Grammar, per term: optional sign, optional count, `d`, sides, optional
//! keep/drop suffix (`k`, `kh`, `kl`, `d`, `dl`, `dh` followed by a number),
//! optional `*multiplier`. A bare integer is a constant. Terms are chained
//! with `+` and `-`; whitespace is ignored.

use logos::Logos;

use crate::error::{DiceError, DiceResult};
use crate::range::Range;
use crate::term::{DiceExpr, DieTerm, DropKind};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum DiceToken {
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    #[token("×")]
    Star,

    #[regex("[dD]")]
    Die,

    #[regex("[dD][lL]")]
    DropLow,

    #[regex("[dD][hH]")]
    DropHigh,

    #[regex("[kK]")]
    Keep,

    #[regex("[kK][hH]")]
    KeepHigh,

    #[regex("[kK][lL]")]
    KeepLow,

    #[regex("[0-9]+", |lex| lex.slice().parse::<u32>().ok())]
    Number(u32),
}

/// What a keep/drop suffix asks for, before it is normalized into a drop.
enum Suffix {
    /// Keep `n` dice; the others are dropped from the given end.
    Keep(DropKind),
    /// Drop `n` dice from the given end.
    Drop(DropKind),
}

struct TermParser<'a> {
    input: &'a str,
    tokens: Vec<DiceToken>,
    pos: usize,
}

impl TermParser<'_> {
    fn peek(&self) -> Option<DiceToken> {
        self.tokens.get(self.pos).copied()
    }

    fn error(&self, reason: impl Into<String>) -> DiceError {
        DiceError::Unparseable {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn number(&mut self, what: &str) -> DiceResult<u32> {
        match self.peek() {
            Some(DiceToken::Number(n)) => {
                self.pos += 1;
                Ok(n)
            }
            _ => Err(self.error(format!("expected {what}"))),
        }
    }

    /// Consume any run of sign tokens. The last one wins.
    fn sign(&mut self) -> i64 {
        let mut sign = 1;
        while let Some(token @ (DiceToken::Plus | DiceToken::Minus)) = self.peek() {
            sign = if token == DiceToken::Minus { -1 } else { 1 };
            self.pos += 1;
        }
        sign
    }

    fn multiplier(&mut self) -> DiceResult<i64> {
        if self.peek() != Some(DiceToken::Star) {
            return Ok(1);
        }
        self.pos += 1;
        let negative = self.peek() == Some(DiceToken::Minus);
        if negative {
            self.pos += 1;
        }
        let n = i64::from(self.number("multiplier")?);
        Ok(if negative { -n } else { n })
    }

    fn suffix(&mut self, count: u32) -> DiceResult<Option<(DropKind, u32)>> {
        let suffix = match self.peek() {
            Some(DiceToken::Keep | DiceToken::KeepHigh) => Suffix::Keep(DropKind::Lowest),
            Some(DiceToken::KeepLow) => Suffix::Keep(DropKind::Highest),
            Some(DiceToken::Die | DiceToken::DropLow) => Suffix::Drop(DropKind::Lowest),
            Some(DiceToken::DropHigh) => Suffix::Drop(DropKind::Highest),
            _ => return Ok(None),
        };
        self.pos += 1;
        let n = self.number("keep/drop count")?;
        Ok(Some(match suffix {
            Suffix::Keep(kind) => (kind, count.saturating_sub(n)),
            Suffix::Drop(kind) => (kind, n),
        }))
    }

    fn term(&mut self, sign: i64) -> DiceResult<DieTerm> {
        let count = match self.peek() {
            Some(DiceToken::Number(n)) => {
                self.pos += 1;
                Some(n)
            }
            _ => None,
        };

        if self.peek() == Some(DiceToken::Die) {
            self.pos += 1;
            let sides = self.number("die sides")?;
            if sides == 0 {
                return Err(self.error("a die needs at least one side"));
            }
            let count = count.unwrap_or(1);
            let mut term = DieTerm::dice(count, sides);
            if let Some((kind, number)) = self.suffix(count)? {
                term = term.with_drop(kind, number);
            }
            let multiplier = self.multiplier()?;
            return Ok(term.with_multiplier(sign * multiplier));
        }

        let Some(value) = count else {
            return Err(self.error("expected a number or a die"));
        };
        let multiplier = self.multiplier()?;
        let term = DieTerm::constant(i64::from(value));
        if value == 0 {
            Ok(term)
        } else {
            Ok(term.with_multiplier(sign * multiplier))
        }
    }
}

/// Parse dice notation, failing on any malformed input.
pub(crate) fn parse_strict(text: &str) -> DiceResult<DiceExpr> {
    let mut tokens = Vec::new();
    for (token, span) in DiceToken::lexer(text).spanned() {
        match token {
            Ok(t) => tokens.push(t),
            Err(()) => {
                return Err(DiceError::Unparseable {
                    input: text.to_string(),
                    reason: format!("unexpected input at offset {}", span.start),
                });
            }
        }
    }
    if tokens.is_empty() {
        return Err(DiceError::Empty);
    }

    let mut parser = TermParser {
        input: text,
        tokens,
        pos: 0,
    };
    let mut terms = Vec::new();
    loop {
        let sign = parser.sign();
        terms.push(parser.term(sign)?);
        match parser.peek() {
            None => break,
            Some(DiceToken::Plus | DiceToken::Minus) => {}
            Some(_) => return Err(parser.error("expected '+' or '-' between terms")),
        }
    }
    Ok(DiceExpr::new(terms))
}

/// Parse dice notation, returning an empty expression if the input is
/// not valid notation.
pub fn parse_dice(text: &str) -> DiceExpr {
    parse_strict(text).unwrap_or_default()
}

/// Parse a roll boundary. `00` is the percentile convention for 100.
pub fn parse_roll_integer(s: &str) -> Option<i64> {
    if s == "00" { Some(100) } else { s.parse().ok() }
}

/// Parse a row range such as `7`, `3-5`, `91–00`.
///
/// Two numbers may be separated by any single non-digit character.
pub fn parse_range(s: &str) -> Option<Range> {
    let s = s.trim();
    match s.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        None => parse_roll_integer(s).map(Range::single),
        Some((i, c)) => {
            let (low, high) = (&s[..i], &s[i + c.len_utf8()..]);
            if low.is_empty() || high.is_empty() || !high.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Some(Range::new(parse_roll_integer(low)?, parse_roll_integer(high)?))
        }
    }
}
