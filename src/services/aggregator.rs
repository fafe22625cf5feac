//! Per-year unique case counts.
//!
//! Counts are set unions: a case number decided twice in the same year counts
//! once, a case number decided in two years counts once in each.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{CaseNumber, Category, DecisionRecord, YearTotal, YearlyCount};

fn union_by_year<'a>(
    records: impl Iterator<Item = &'a DecisionRecord>,
) -> BTreeMap<i32, BTreeSet<&'a CaseNumber>> {
    let mut years: BTreeMap<i32, BTreeSet<&CaseNumber>> = BTreeMap::new();
    for record in records.filter(|r| r.is_parsed()) {
        years.entry(record.year()).or_default().extend(record.case_numbers.iter());
    }
    years
}

/// One entry per (category, year) with at least one record, sorted by
/// category then year. `Unclassified` is never counted.
pub fn yearly_counts(records: &[DecisionRecord]) -> Vec<YearlyCount> {
    let mut by_category: BTreeMap<Category, Vec<&DecisionRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.category != Category::Unclassified) {
        by_category.entry(record.category).or_default().push(record);
    }
    by_category
        .into_iter()
        .flat_map(|(category, members)| {
            union_by_year(members.into_iter())
                .into_iter()
                .map(move |(year, cases)| YearlyCount {
                    category,
                    year,
                    unique_case_count: cases.len(),
                })
        })
        .collect()
}

/// Unique case numbers per year over every parsed record, any category.
pub fn year_totals(records: &[DecisionRecord]) -> Vec<YearTotal> {
    union_by_year(records.iter())
        .into_iter()
        .map(|(year, cases)| YearTotal {
            year,
            unique_case_count: cases.len(),
        })
        .collect()
}
