//! Conversion of a provider fundamentals document into a quarterly table
//!
//! The document nests statements as
//! `Financials.<Statement>.quarterly.<YYYY-MM-DD>.<field>`; values arrive
//! either as strings or numbers.

use super::types::{Category, CompanyKey, FieldTag, QuarterlyTable};
use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields pulled from each statement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldCatalog {
    pub balance_sheet: Vec<String>,
    pub income_statement: Vec<String>,
}

impl Default for FieldCatalog {
    fn default() -> Self {
        let assets = [
            "totalAssets",
            "intangibleAssets",
            "earningAssets",
            "otherCurrentAssets",
            "goodWill",
            "otherAssets",
            "cash",
            "cashAndEquivalents",
        ];
        let liabilities = [
            "totalLiab",
            "totalCurrentLiabilities",
            "currentDeferredRevenue",
            "deferredLongTermLiab",
            "otherCurrentLiab",
            "netDebt",
            "shortTermDebt",
        ];
        let equity = [
            "totalStockholderEquity",
            "commonStock",
            "capitalStock",
            "retainedEarnings",
            "otherLiab",
        ];
        let revenue_and_costs = ["totalRevenue", "costOfRevenue", "grossProfit"];

        Self {
            balance_sheet: assets
                .iter()
                .chain(liabilities.iter())
                .chain(equity.iter())
                .map(|s| s.to_string())
                .collect(),
            income_statement: revenue_and_costs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FieldCatalog {
    fn columns(&self) -> Vec<FieldTag> {
        self.balance_sheet
            .iter()
            .map(|f| FieldTag::new(Category::BalanceSheet, f.as_str()))
            .chain(
                self.income_statement
                    .iter()
                    .map(|f| FieldTag::new(Category::IncomeStatement, f.as_str())),
            )
            .collect()
    }
}

/// Maps a period end date to a `YYYYQn` label
pub fn quarter_label(date: NaiveDate) -> String {
    format!("{}Q{}", date.year(), (date.month() - 1) / 3 + 1)
}

/// Builds a table from a fundamentals document.
///
/// The balance sheet dates define the rows. Dates that do not parse are
/// skipped with a warning.
pub fn table_from_fundamentals(
    key: CompanyKey,
    doc: &Value,
    catalog: &FieldCatalog,
) -> Result<QuarterlyTable> {
    let financials = &doc["Financials"];
    let balance = &financials["Balance_Sheet"]["quarterly"];
    let periods = balance
        .as_object()
        .ok_or_else(|| {
            Error::InsufficientData(format!("{}: no quarterly balance sheet", key))
        })?;
    let income = &financials["Income_Statement"]["quarterly"];

    let mut dates: Vec<&String> = periods.keys().collect();
    dates.sort();

    let columns = catalog.columns();
    let mut table = QuarterlyTable::new(key, columns.clone());

    for date in dates {
        let parsed = match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(company = %table.key, date = %date, error = %e, "Skipping undated period");
                continue;
            }
        };

        let values: Vec<Option<f64>> = columns
            .iter()
            .map(|tag| {
                let statement = match tag.category {
                    Some(Category::IncomeStatement) => &income[date.as_str()],
                    _ => &balance[date.as_str()],
                };
                parse_value(&statement[tag.name.as_str()])
            })
            .collect();

        table.push_row(quarter_label(parsed), &values);
    }

    Ok(table)
}

fn parse_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| !v.is_nan()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quarter_label() {
        let d = NaiveDate::from_ymd_opt(2021, 3, 31).unwrap();
        assert_eq!(quarter_label(d), "2021Q1");
        let d = NaiveDate::from_ymd_opt(2021, 12, 31).unwrap();
        assert_eq!(quarter_label(d), "2021Q4");
    }

    #[test]
    fn test_table_from_fundamentals() {
        let doc = json!({
            "Financials": {
                "Balance_Sheet": { "quarterly": {
                    "2021-06-30": { "cash": "150.0", "totalAssets": null },
                    "2021-03-31": { "cash": 100, "totalAssets": "900" },
                    "garbage": { "cash": "1" }
                }},
                "Income_Statement": { "quarterly": {
                    "2021-03-31": { "totalRevenue": "55.5" }
                }}
            }
        });

        let table = table_from_fundamentals(
            CompanyKey::new("USA", "NASDAQ", "ACME"),
            &doc,
            &FieldCatalog::default(),
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].quarter, "2021Q1");
        assert_eq!(table.records[1].quarter, "2021Q2");

        let cash = FieldTag::new(Category::BalanceSheet, "cash");
        let assets = FieldTag::new(Category::BalanceSheet, "totalAssets");
        let revenue = FieldTag::new(Category::IncomeStatement, "totalRevenue");
        assert_eq!(table.records[0].get(&cash), Some(100.0));
        assert_eq!(table.records[0].get(&assets), Some(900.0));
        assert_eq!(table.records[0].get(&revenue), Some(55.5));
        assert_eq!(table.records[1].get(&assets), None);
        assert_eq!(table.records[1].get(&revenue), None);
    }

    #[test]
    fn test_missing_balance_sheet() {
        let doc = json!({ "General": {} });
        let result = table_from_fundamentals(
            CompanyKey::new("USA", "NASDAQ", "ACME"),
            &doc,
            &FieldCatalog::default(),
        );
        assert!(result.is_err());
    }
}
