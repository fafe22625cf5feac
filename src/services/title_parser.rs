//! Case-number extraction from decision titles.
//!
//! A title such as `2020 03 01 [CAS Web Archives] CAS 2019/A/6148 + 6149.pdf`
//! encodes one or more case numbers: a prefix (`CAS`, `TAS`), an optional
//! `YEAR SERIES` qualifier and a number. Further numbers may be chained with a
//! delimiter; a bare chained number inherits the prefix, year and series of the
//! entry before it.

use regex::{Captures, Regex};
use std::collections::BTreeSet;

use crate::config::CaseGrammar;
use crate::errors::{ConfigError, ExtractionError};
use crate::models::CaseNumber;

/// Separators accepted between prefix, year, series and number.
const SEP: &str = r"[\s/.\-]";
/// Series: up to three capitals, or one letter in either case. Lowercase
/// words such as `and` are never a series.
const SERIES: &str = r"[A-Z]{1,3}|[a-z]";
const MAX_NUMBER_DIGITS: usize = 9;

#[derive(Debug, Clone)]
pub struct TitleParser {
    /// Groups: 1 prefix, 2 year, 3 series, 4 number, 5 chained tail.
    entry: Regex,
    /// Groups: 1 year, 2 series, 3 number.
    item: Regex,
    /// Prefix-less `(YYYY S NNN)`, groups 1 year, 2 series, 3 number, 4 chained
    /// tail, with the prefix it implies.
    parenthesized: Option<(Regex, String)>,
}

impl TitleParser {
    pub fn new(grammar: &CaseGrammar) -> Result<Self, ConfigError> {
        grammar.validate()?;
        let prefixes = grammar
            .prefixes
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let delimiters = grammar
            .delimiters
            .iter()
            .map(|d| regex::escape(&d.to_string()))
            .collect::<Vec<_>>()
            .join("|");
        let qualifier = format!(r"(\d{{4}}){SEP}+({SERIES}){SEP}+");
        let optional_qualifier = format!(r"(?:\d{{4}}{SEP}+(?:{SERIES}){SEP}+)?");
        let tail = format!(r"((?:\s*(?:{delimiters})\s*{optional_qualifier}\d+)*)");
        let head = if grammar.require_qualifier {
            qualifier.clone()
        } else {
            format!("(?:{qualifier})?")
        };
        let entry = format!(r"\b(?i:({prefixes})){SEP}*{head}(\d+){tail}");
        let item = format!(r"(?:{qualifier})?(\d+)");
        let parenthesized = if grammar.allow_bare_parenthesized {
            let pattern = format!(r"\(\s*{qualifier}(\d+){tail}\s*\)");
            Some((Regex::new(&pattern)?, grammar.bare_prefix.clone()))
        } else {
            None
        };
        Ok(Self {
            entry: Regex::new(&entry)?,
            item: Regex::new(&item)?,
            parenthesized,
        })
    }

    /// Every case number in `title`, normalized. Duplicates collapse.
    ///
    /// Prefixed case numbers win; a bare `(YYYY S NNN)` is only looked at when
    /// the title has none.
    pub fn parse(&self, title: &str) -> Result<BTreeSet<CaseNumber>, ExtractionError> {
        let mut cases = BTreeSet::new();
        let mut oversized = None;

        for caps in self.entry.captures_iter(title) {
            self.collect(&caps, &caps[1], 2, &mut cases, &mut oversized);
        }
        if cases.is_empty() {
            if let Some((pattern, prefix)) = &self.parenthesized {
                for caps in pattern.captures_iter(title) {
                    self.collect(&caps, prefix, 1, &mut cases, &mut oversized);
                }
            }
        }

        if cases.is_empty() {
            return Err(match oversized {
                Some(number) => ExtractionError::NumberOutOfRange(number),
                None => ExtractionError::NoCaseNumber(title.to_string()),
            });
        }
        Ok(cases)
    }

    /// Year, series, number and chained tail sit in consecutive groups from `first`.
    fn collect(
        &self,
        caps: &Captures<'_>,
        prefix: &str,
        first: usize,
        cases: &mut BTreeSet<CaseNumber>,
        oversized: &mut Option<String>,
    ) {
        let mut year = caps.get(first).and_then(|m| m.as_str().parse::<u16>().ok());
        let mut series = caps.get(first + 1).map(|m| m.as_str().to_string());
        let number = caps.get(first + 2).map(|m| m.as_str()).unwrap_or("");

        match build_case(prefix, year, series.as_deref(), number) {
            Some(case) => {
                cases.insert(case);
            }
            None => *oversized = Some(number.to_string()),
        }

        let tail = caps.get(first + 3).map(|m| m.as_str()).unwrap_or("");
        for item in self.item.captures_iter(tail) {
            if let (Some(y), Some(s)) = (item.get(1), item.get(2)) {
                year = y.as_str().parse::<u16>().ok();
                series = Some(s.as_str().to_string());
            }
            match build_case(prefix, year, series.as_deref(), &item[3]) {
                Some(case) => {
                    cases.insert(case);
                }
                None => *oversized = Some(item[3].to_string()),
            }
        }
    }
}

/// `None` when the number has more than nine significant digits.
fn build_case(prefix: &str, year: Option<u16>, series: Option<&str>, digits: &str) -> Option<CaseNumber> {
    if digits.trim_start_matches('0').len() > MAX_NUMBER_DIGITS {
        return None;
    }
    let number = digits.parse::<u64>().ok()?;
    Some(match (year, series) {
        (Some(year), Some(series)) => CaseNumber::qualified(prefix, year, series, number),
        _ => CaseNumber::bare(prefix, number),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> TitleParser {
        TitleParser::new(&CaseGrammar::default()).unwrap()
    }

    fn labels(set: &BTreeSet<CaseNumber>) -> Vec<String> {
        set.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn single_qualified_number() {
        let cases = parser().parse("2020 03 01 [CAS Web Archives] CAS 2019 A 6148.pdf").unwrap();
        assert_eq!(labels(&cases), vec!["CAS 2019 A 6148"]);
    }

    #[test]
    fn chained_numbers_inherit_year_and_series() {
        let cases = parser().parse("CAS 2019 A 6148 + 6149 +6150").unwrap();
        assert_eq!(
            labels(&cases),
            vec!["CAS 2019 A 6148", "CAS 2019 A 6149", "CAS 2019 A 6150"]
        );
    }

    #[test]
    fn chained_qualified_number_switches_context() {
        let cases = parser().parse("CAS 2019 A 1 & 2020 O 7 & 8").unwrap();
        assert_eq!(labels(&cases), vec!["CAS 2019 A 1", "CAS 2020 O 7", "CAS 2020 O 8"]);
    }

    #[test]
    fn separator_and_case_variants_normalize_equal() {
        let p = parser();
        let a = p.parse("CAS 2020/A/0123").unwrap();
        let b = p.parse("cas 2020-a-123").unwrap();
        let c = p.parse("Cas 2020 A 123").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(labels(&a), vec!["CAS 2020 A 123"]);
    }

    #[test]
    fn duplicates_collapse() {
        let cases = parser().parse("CAS 2020 A 5 + 5 and again CAS 2020/A/5").unwrap();
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn several_prefixes_in_one_title() {
        let cases = parser().parse("CAS 2020 A 1 & TAS 2020 A 2").unwrap();
        assert_eq!(labels(&cases), vec!["CAS 2020 A 1", "TAS 2020 A 2"]);
    }

    #[test]
    fn filename_underscores_do_not_block_matching() {
        let cases = parser().parse("CAS_2021_A_77_award.pdf");
        // underscores are not separators
        assert!(cases.is_err());
        let cases = parser().parse("award CAS 2021 A 77_final.pdf").unwrap();
        assert_eq!(labels(&cases), vec!["CAS 2021 A 77"]);
    }

    #[test]
    fn title_without_convention_fails() {
        let err = parser().parse("no case info here").unwrap_err();
        assert_eq!(err, ExtractionError::NoCaseNumber("no case info here".to_string()));
    }

    #[test]
    fn qualifier_is_required_by_default() {
        assert!(parser().parse("CAS 123").is_err());
    }

    #[test]
    fn prefix_must_be_a_whole_word() {
        assert!(parser().parse("PICAS 2020 A 1").is_err());
    }

    #[test]
    fn oversized_number_is_reported() {
        let err = parser().parse("CAS 2020 A 1234567890").unwrap_err();
        assert_eq!(err, ExtractionError::NumberOutOfRange("1234567890".to_string()));
    }

    #[test]
    fn leading_zeros_do_not_count_towards_the_digit_limit() {
        let cases = parser().parse("CAS 2019 A 0000000001").unwrap();
        assert_eq!(labels(&cases), vec!["CAS 2019 A 1"]);
    }

    #[test]
    fn lowercase_words_are_not_a_series() {
        let err = parser().parse("CAS 2020 and 2021 statistics.pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::NoCaseNumber(_)));
        assert!(parser().parse("TAS 2019 abc 4").is_err());
        // a single lowercase letter is still a series
        assert_eq!(labels(&parser().parse("cas 2019/a/4").unwrap()), vec!["CAS 2019 A 4"]);
    }

    #[test]
    fn parenthesized_number_without_prefix() {
        let cases = parser()
            .parse("2019 05 02 [CAS Web Archives] Award (2018 A 5612).pdf")
            .unwrap();
        assert_eq!(labels(&cases), vec!["CAS 2018 A 5612"]);

        let cases = parser().parse("Award ( 2018 A 5612 + 5613 ).pdf").unwrap();
        assert_eq!(labels(&cases), vec!["CAS 2018 A 5612", "CAS 2018 A 5613"]);
    }

    #[test]
    fn prefixed_numbers_win_over_parenthesized() {
        let cases = parser().parse("TAS 2020 A 9 (2018 A 5612).pdf").unwrap();
        assert_eq!(labels(&cases), vec!["TAS 2020 A 9"]);
    }

    #[test]
    fn parenthesized_fallback_can_be_disabled() {
        let grammar = CaseGrammar {
            allow_bare_parenthesized: false,
            ..CaseGrammar::default()
        };
        let p = TitleParser::new(&grammar).unwrap();
        assert!(p.parse("Award (2018 A 5612).pdf").is_err());

        let grammar = CaseGrammar {
            bare_prefix: "tas".to_string(),
            ..CaseGrammar::default()
        };
        let p = TitleParser::new(&grammar).unwrap();
        assert_eq!(labels(&p.parse("Award (2018 A 5612).pdf").unwrap()), vec!["TAS 2018 A 5612"]);
    }

    #[test]
    fn unqualified_grammar_accepts_bare_numbers() {
        let p = TitleParser::new(&CaseGrammar::unqualified("Case")).unwrap();
        assert_eq!(labels(&p.parse("Case 12").unwrap()), vec!["CASE 12"]);
        assert_eq!(labels(&p.parse("case 12 + 13").unwrap()), vec!["CASE 12", "CASE 13"]);
        assert!(p.parse("no case info here").is_err());
    }

    #[test]
    fn joined_numbers_round_trip() {
        let p = parser();
        let expected: BTreeSet<CaseNumber> = (1..=6)
            .map(|n| CaseNumber::qualified("CAS", 2018, "A", n * 11))
            .collect();
        let title = expected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" + ");
        assert_eq!(p.parse(&title).unwrap(), expected);
    }

    #[test]
    fn custom_delimiter() {
        let grammar = CaseGrammar {
            delimiters: vec![','],
            ..CaseGrammar::default()
        };
        let p = TitleParser::new(&grammar).unwrap();
        let cases = p.parse("CAS 2020 A 1, 2, 3").unwrap();
        assert_eq!(cases.len(), 3);
    }
}
