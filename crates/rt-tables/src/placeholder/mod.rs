//! Inline placeholder evaluation for row text and extra results.
//!
//! Two bracket families are resolved in order:
//!
//! 1. Named dice, `[[@gold:3d6*10]]`: rolled, recorded under the name,
//!    and replaced by the formatted dice and total, e.g. `3d6*10 (120)`.
//! 2. Percent sections, `[[40% a wolf]]` or `[[a wolf (40%)]]`: the
//!    brackets are stripped and one section is marked as chosen by a
//!    single d100 draw against the running sum of percentages.
//!
//! Named text inputs (`[key]`) are handled by [`inputs`] because they
//! need the table store.

pub mod inputs;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use rand::Rng;
use regex::{Captures, Regex};
use rt_dice::{DiceExpr, DiceRoll, parse_dice};
use serde::Serialize;

static NAMED_DICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[@(\w+):([^\[\]]+)\]\]").expect("named dice pattern is valid")
});

static PERCENT_SECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[\[(?P<text1>[^\]]+ \(?(?P<number1>\d+)(?:%| percent)\)?)\]\]|\[\[(?P<text2>\(?(?P<number2>\d+)(?:%| percent)\)? [^\]]+)\]\]",
    )
    .expect("percent section pattern is valid")
});

/// A named dice roll recorded while evaluating text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedRoll {
    /// The parsed dice.
    pub dice: DiceExpr,
    /// The roll.
    pub result: DiceRoll,
}

/// A percentage-weighted alternative found in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PercentSection {
    /// Weight out of 100.
    pub percent: u32,
    /// The section text, brackets removed.
    pub text: String,
    /// Whether the draw landed on this section.
    pub chosen: bool,
}

/// Text with placeholders resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// The resolved text.
    pub text: String,
    /// Named dice results by name.
    pub results: BTreeMap<String, NamedRoll>,
    /// Percent sections in text order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<PercentSection>,
}

impl Evaluation {
    /// The chosen percent section, if any.
    pub fn chosen_section(&self) -> Option<&PercentSection> {
        self.sections.iter().find(|s| s.chosen)
    }
}

/// Format an integer with `,` thousands separators.
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Display text for a named roll: `2d6+1 (9)`, or `(12)` when the
/// formatted dice is just the total. Unparseable dice format as empty and
/// show `(0)` with no leading space.
fn named_roll_display(dice: &DiceExpr, total: i64) -> String {
    let formatted = dice.to_string();
    let shown = format!("({})", group_thousands(total));
    if formatted.is_empty() || formatted == total.to_string() {
        shown
    } else {
        format!("{formatted} {shown}")
    }
}

fn resolve_named_dice<R: Rng + ?Sized>(
    mut text: String,
    rng: &mut R,
) -> (String, BTreeMap<String, NamedRoll>) {
    let mut results = BTreeMap::new();
    loop {
        let found = NAMED_DICE.captures(&text).and_then(|caps| {
            Some((
                caps.get(0)?.range(),
                caps.get(1)?.as_str().to_string(),
                parse_dice(caps.get(2)?.as_str()),
            ))
        });
        let Some((span, name, dice)) = found else {
            break;
        };
        let result = dice.roll(rng);
        text.replace_range(span, &named_roll_display(&dice, result.total));
        results.insert(name, NamedRoll { dice, result });
    }
    (text, results)
}

fn section_from(caps: &Captures<'_>) -> Option<PercentSection> {
    let text = caps.name("text1").or_else(|| caps.name("text2"))?;
    let number = caps.name("number1").or_else(|| caps.name("number2"))?;
    Some(PercentSection {
        percent: number.as_str().parse().unwrap_or(0),
        text: text.as_str().to_string(),
        chosen: false,
    })
}

fn resolve_percent_sections<R: Rng + ?Sized>(
    text: &str,
    rng: &mut R,
) -> (String, Vec<PercentSection>) {
    let mut out = String::with_capacity(text.len());
    let mut sections = Vec::new();
    let mut last = 0;
    for caps in PERCENT_SECTION.captures_iter(text) {
        let (Some(all), Some(section)) = (caps.get(0), section_from(&caps)) else {
            continue;
        };
        out.push_str(&text[last..all.start()]);
        out.push_str(&section.text);
        last = all.end();
        sections.push(section);
    }
    out.push_str(&text[last..]);

    if !sections.is_empty() {
        let draw: u32 = rng.random_range(1..=100);
        let mut sum: u32 = 0;
        if let Some(chosen) = sections.iter_mut().find(|s| {
            sum = sum.saturating_add(s.percent);
            sum >= draw
        }) {
            chosen.chosen = true;
        }
    }
    (out, sections)
}

/// Resolve named dice and percent sections in `text`.
pub fn evaluate_placeholders<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Evaluation {
    let (text, results) = resolve_named_dice(text.to_string(), rng);
    let (text, sections) = resolve_percent_sections(&text, rng);
    Evaluation {
        text,
        results,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rt_dice::DieTerm;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn plain_text_is_unchanged() {
        let e = evaluate_placeholders("a quiet road", &mut rng());
        assert_eq!(e.text, "a quiet road");
        assert!(e.results.is_empty());
        assert!(e.sections.is_empty());
    }

    #[test]
    fn unparseable_named_dice_show_zero() {
        let e = evaluate_placeholders("found [[@gold:lots]] coins", &mut rng());
        assert_eq!(e.text, "found (0) coins");
        assert_eq!(e.results["gold"].result.total, 0);
        assert!(e.results["gold"].dice.is_empty());
    }

    #[test]
    fn named_dice_are_recorded() {
        let mut rng = rng();
        for _ in 0..50 {
            let e = evaluate_placeholders("[[@name:d4+1]]", &mut rng);
            let roll = &e.results["name"];
            assert!((2..=5).contains(&roll.result.total));
            assert_eq!(e.text, format!("d4+1 ({})", roll.result.total));
        }
    }

    #[test]
    fn named_dice_keep_multiplier() {
        let e = evaluate_placeholders("[[@cp:6d6*100]] copper", &mut rng());
        assert_eq!(
            e.results["cp"].dice.terms(),
            &[DieTerm::dice(6, 6).with_multiplier(100)]
        );
        assert!(e.text.ends_with(") copper"));
        assert!(e.text.starts_with("6d6*100 ("));
    }

    #[test]
    fn constant_shows_only_total() {
        let e = evaluate_placeholders("[[@n:12]] arrows", &mut rng());
        assert_eq!(e.text, "(12) arrows");
        assert_eq!(e.results["n"].result.total, 12);
    }

    #[test]
    fn several_named_rolls() {
        let e = evaluate_placeholders("[[@a:3]] and [[@b:7]]", &mut rng());
        assert_eq!(e.text, "(3) and (7)");
        assert_eq!(e.results.len(), 2);
        assert_eq!(e.results["b"].result.total, 7);
    }

    #[test]
    fn totals_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1200), "1,200");
        assert_eq!(group_thousands(-1234567), "-1,234,567");
        let e = evaluate_placeholders("[[@gp:2d6*1000]]", &mut rng());
        assert!(e.text.starts_with("2d6*1000 ("));
        assert!(e.text.contains(','));
    }

    #[test]
    fn unparseable_dice_shows_zero() {
        let e = evaluate_placeholders("[[@x:lots]]", &mut rng());
        assert_eq!(e.text, "(0)");
        assert_eq!(e.results["x"].result.total, 0);
    }

    #[test]
    fn percent_sections_keep_all_text() {
        let e = evaluate_placeholders("It is [[40% raining]], [[snowing (60%)]].", &mut rng());
        assert_eq!(e.text, "It is 40% raining, snowing (60%).");
        assert_eq!(e.sections.len(), 2);
        assert_eq!(e.sections[0].percent, 40);
        assert_eq!(e.sections[1].percent, 60);
        assert_eq!(e.sections.iter().filter(|s| s.chosen).count(), 1);
    }

    #[test]
    fn percent_word_form() {
        let e = evaluate_placeholders("[[(25 percent) ambush]]", &mut rng());
        assert_eq!(e.text, "(25 percent) ambush");
        assert_eq!(e.sections[0].percent, 25);
    }

    #[test]
    fn full_weight_section_is_always_chosen() {
        let mut rng = rng();
        for _ in 0..20 {
            let e = evaluate_placeholders("[[100% yes]] [[no 0%]]", &mut rng);
            assert_eq!(e.chosen_section().map(|s| s.text.as_str()), Some("100% yes"));
        }
    }

    #[test]
    fn underweight_sections_may_choose_nothing() {
        let mut rng = rng();
        let misses = (0..200)
            .filter(|_| {
                evaluate_placeholders("[[1% rare]]", &mut rng)
                    .chosen_section()
                    .is_none()
            })
            .count();
        assert!(misses > 150);
    }

    #[test]
    fn named_dice_resolve_before_sections() {
        let e = evaluate_placeholders("[[50% [[@g:3]] gold]]", &mut rng());
        assert_eq!(e.text, "50% (3) gold");
        assert_eq!(e.sections.len(), 1);
    }

    #[test]
    fn no_sections_draws_nothing() {
        let mut a = rng();
        let mut b = rng();
        evaluate_placeholders("plain", &mut a);
        assert_eq!(a.random::<u64>(), b.random::<u64>());
    }
}
