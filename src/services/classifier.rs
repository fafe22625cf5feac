use crate::config::CategoryRule;
use crate::models::{Category, DecisionRecord};

/// First rule matching the filename, else `Unclassified`.
pub fn classify(rules: &[CategoryRule], filename: &str) -> Category {
    rules
        .iter()
        .find(|rule| rule.matcher.matches(filename))
        .map(|rule| rule.category)
        .unwrap_or(Category::Unclassified)
}

/// Tag every record in place. Records without case numbers stay
/// `Unclassified` whatever their filename says.
pub fn classify_records(rules: &[CategoryRule], records: &mut [DecisionRecord]) {
    for record in records.iter_mut() {
        record.category = if record.is_parsed() {
            classify(rules, &record.filename)
        } else {
            Category::Unclassified
        };
    }
}
