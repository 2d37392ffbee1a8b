//! Core data types for per-company quarterly fundamentals

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Separator between the category and the field name in a column label
pub const TAG_SEPARATOR: &str = "___";

/// Statement category a field belongs to.
///
/// Decides which numeric treatment the feature transformer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Balance_Sheet")]
    BalanceSheet,
    #[serde(rename = "Income_Statement")]
    IncomeStatement,
    #[serde(rename = "Dividend")]
    Dividend,
    #[serde(rename = "Equity")]
    Equity,
}

impl Category {
    /// All valid categories
    pub const ALL: [Category; 4] = [
        Category::BalanceSheet,
        Category::IncomeStatement,
        Category::Dividend,
        Category::Equity,
    ];

    /// Label used as column prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::BalanceSheet => "Balance_Sheet",
            Category::IncomeStatement => "Income_Statement",
            Category::Dividend => "Dividend",
            Category::Equity => "Equity",
        }
    }

    /// Parses a column prefix
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }

    /// Monetary amounts are log-compressed, equity is turned into percentage change
    pub fn is_monetary(&self) -> bool {
        !matches!(self, Category::Equity)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column identifier of the form `<Category>___<FieldName>`.
///
/// The category is resolved once at ingestion. Columns without a
/// recognized prefix keep `category: None` and are later dropped by the
/// category filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldTag {
    pub category: Option<Category>,
    pub name: String,
}

impl FieldTag {
    /// Creates a tag with a known category
    pub fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            category: Some(category),
            name: name.into(),
        }
    }

    /// Parses a raw column label
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(TAG_SEPARATOR) {
            Some((prefix, name)) => match Category::from_label(prefix) {
                Some(category) => Self::new(category, name),
                None => Self {
                    category: None,
                    name: raw.to_string(),
                },
            },
            None => Self {
                category: None,
                name: raw.to_string(),
            },
        }
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            Some(category) => write!(f, "{}{}{}", category, TAG_SEPARATOR, self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Identifies one company table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyKey {
    pub country: String,
    pub exchange: String,
    pub company: String,
}

impl CompanyKey {
    pub fn new(
        country: impl Into<String>,
        exchange: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            exchange: exchange.into(),
            company: company.into(),
        }
    }
}

impl fmt::Display for CompanyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.country, self.exchange, self.company)
    }
}

/// One quarter of one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyRecord {
    /// Quarter label, e.g. `2021Q4`
    pub quarter: String,
    /// Field values, `None` when not reported
    pub values: BTreeMap<FieldTag, Option<f64>>,
}

impl QuarterlyRecord {
    pub fn new(quarter: impl Into<String>) -> Self {
        Self {
            quarter: quarter.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter
    pub fn with_value(mut self, tag: FieldTag, value: Option<f64>) -> Self {
        self.values.insert(tag, value);
        self
    }

    /// Value of a field, `None` if absent, unreported or NaN
    pub fn get(&self, tag: &FieldTag) -> Option<f64> {
        self.values
            .get(tag)
            .copied()
            .flatten()
            .filter(|v| !v.is_nan())
    }

    /// Number of fields without an observed value
    pub fn missing_count(&self) -> usize {
        self.values
            .values()
            .filter(|v| v.map_or(true, f64::is_nan))
            .count()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldTag> {
        self.values.keys()
    }
}

/// Quarterly table for one company as handed over by the storage layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyTable {
    pub key: CompanyKey,
    pub columns: Vec<FieldTag>,
    pub records: Vec<QuarterlyRecord>,
}

impl QuarterlyTable {
    pub fn new(key: CompanyKey, columns: Vec<FieldTag>) -> Self {
        Self {
            key,
            columns,
            records: Vec::new(),
        }
    }

    /// Appends a row; every declared column is present in the stored record
    pub fn push_row(&mut self, quarter: impl Into<String>, values: &[Option<f64>]) {
        let mut record = QuarterlyRecord::new(quarter);
        for (i, tag) in self.columns.iter().enumerate() {
            record
                .values
                .insert(tag.clone(), values.get(i).copied().flatten());
        }
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() || self.columns.is_empty()
    }
}

/// Records of one company ordered by quarter label
#[derive(Debug, Clone)]
pub struct CompanyHistory {
    pub key: CompanyKey,
    records: Vec<QuarterlyRecord>,
}

impl CompanyHistory {
    /// Sorts records ascending by quarter label; ties keep their table order
    pub fn new(key: CompanyKey, mut records: Vec<QuarterlyRecord>) -> Self {
        records.sort_by(|a, b| a.quarter.cmp(&b.quarter));
        Self { key, records }
    }

    pub fn records(&self) -> &[QuarterlyRecord] {
        &self.records
    }

    /// Distinct quarter labels in chronological order
    pub fn quarters(&self) -> Vec<&str> {
        let mut quarters: Vec<&str> = self.records.iter().map(|r| r.quarter.as_str()).collect();
        quarters.dedup();
        quarters
    }

    /// All rows carrying the given quarter label
    pub fn rows_for(&self, quarter: &str) -> Vec<&QuarterlyRecord> {
        self.records.iter().filter(|r| r.quarter == quarter).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<QuarterlyTable> for CompanyHistory {
    fn from(table: QuarterlyTable) -> Self {
        CompanyHistory::new(table.key, table.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_tag_parse() {
        let tag = FieldTag::parse("Balance_Sheet___totalAssets");
        assert_eq!(tag.category, Some(Category::BalanceSheet));
        assert_eq!(tag.name, "totalAssets");
        assert_eq!(tag.to_string(), "Balance_Sheet___totalAssets");

        let other = FieldTag::parse("Cash_Flow___capex");
        assert_eq!(other.category, None);
        assert_eq!(other.to_string(), "Cash_Flow___capex");

        let plain = FieldTag::parse("Quarter");
        assert_eq!(plain.category, None);
    }

    #[test]
    fn test_missing_count_treats_nan_as_missing() {
        let record = QuarterlyRecord::new("2021Q1")
            .with_value(FieldTag::new(Category::Equity, "a"), Some(1.0))
            .with_value(FieldTag::new(Category::Equity, "b"), None)
            .with_value(FieldTag::new(Category::Equity, "c"), Some(f64::NAN))
            .with_value(FieldTag::new(Category::Equity, "d"), Some(f64::INFINITY));

        assert_eq!(record.missing_count(), 2);
        assert_eq!(record.get(&FieldTag::new(Category::Equity, "c")), None);
        assert_eq!(
            record.get(&FieldTag::new(Category::Equity, "d")),
            Some(f64::INFINITY)
        );
    }

    #[test]
    fn test_history_sorted() {
        let key = CompanyKey::new("USA", "NASDAQ", "ACME");
        let history = CompanyHistory::new(
            key,
            vec![
                QuarterlyRecord::new("2021Q3"),
                QuarterlyRecord::new("2021Q1"),
                QuarterlyRecord::new("2021Q2"),
                QuarterlyRecord::new("2021Q2"),
            ],
        );
        assert_eq!(history.quarters(), vec!["2021Q1", "2021Q2", "2021Q3"]);
        assert_eq!(history.rows_for("2021Q2").len(), 2);
    }

    #[test]
    fn test_table_push_row() {
        let mut table = QuarterlyTable::new(
            CompanyKey::new("USA", "NASDAQ", "ACME"),
            vec![
                FieldTag::new(Category::BalanceSheet, "cash"),
                FieldTag::new(Category::Equity, "commonStock"),
            ],
        );
        table.push_row("2020Q4", &[Some(5.0)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].missing_count(), 1);
    }
}
