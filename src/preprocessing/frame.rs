//! Labelled numeric table
//!
//! Missing values are stored as NaN. Every operation returns a new frame;
//! the row index survives filtering so input and target rows can be
//! re-aligned after independent row drops.

use crate::data::{Category, FieldTag};
use crate::extraction::GapTriple;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Which record of a gap triple a column comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Before,
    After,
    Target,
}

/// Frame column: a field tag plus its role
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Column {
    pub tag: FieldTag,
    pub role: Role,
}

impl Column {
    pub fn new(tag: FieldTag, role: Role) -> Self {
        Self { tag, role }
    }

    pub fn category(&self) -> Option<Category> {
        self.tag.category
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            Role::Before => write!(f, "{}_BEFORE", self.tag),
            Role::After => write!(f, "{}_AFTER", self.tag),
            Role::Target => write!(f, "{}", self.tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub columns: Vec<Column>,
    /// Original sample position of each row
    pub index: Vec<usize>,
    pub values: Array2<f64>,
}

impl Frame {
    pub fn new(columns: Vec<Column>, index: Vec<usize>, values: Array2<f64>) -> Self {
        debug_assert_eq!(values.nrows(), index.len());
        debug_assert_eq!(values.ncols(), columns.len());
        Self {
            columns,
            index,
            values,
        }
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nrows() == 0
    }

    /// Column positions of a category
    pub fn category_columns(&self, category: Category) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.category() == Some(category))
            .map(|(i, _)| i)
            .collect()
    }

    /// Keeps only the columns satisfying the predicate
    pub fn select_columns<F>(&self, keep: F) -> Frame
    where
        F: Fn(&Column) -> bool,
    {
        let positions: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| keep(c))
            .map(|(i, _)| i)
            .collect();
        Frame::new(
            positions.iter().map(|&i| self.columns[i].clone()).collect(),
            self.index.clone(),
            self.values.select(Axis(1), &positions),
        )
    }

    /// Keeps rows by position
    pub fn select_rows(&self, positions: &[usize]) -> Frame {
        Frame::new(
            self.columns.clone(),
            positions.iter().map(|&p| self.index[p]).collect(),
            self.values.select(Axis(0), positions),
        )
    }

    /// Keeps rows whose index label is in `labels`, preserving frame order
    pub fn retain_index(&self, labels: &HashSet<usize>) -> Frame {
        let positions: Vec<usize> = self
            .index
            .iter()
            .enumerate()
            .filter(|(_, label)| labels.contains(label))
            .map(|(p, _)| p)
            .collect();
        self.select_rows(&positions)
    }

    /// Applies an elementwise function to every value
    pub fn map_values<F>(&self, f: F) -> Frame
    where
        F: Fn(f64) -> f64,
    {
        Frame::new(self.columns.clone(), self.index.clone(), self.values.mapv(f))
    }

    /// Column names with role suffixes
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.to_string()).collect()
    }

    pub fn row(&self, position: usize) -> Array1<f64> {
        self.values.row(position).to_owned()
    }
}

/// Untransformed input and target frames of a sample batch
#[derive(Debug, Clone, PartialEq)]
pub struct RawBatch {
    pub input: Frame,
    pub target: Frame,
}

impl RawBatch {
    pub fn new(input: Frame, target: Frame) -> Self {
        Self { input, target }
    }

    /// Lays gap triples out as rows.
    ///
    /// Input columns are every field seen in any `before` record followed by
    /// every field seen in any `after` record; target columns are every field
    /// seen in any target. Fields a record lacks are missing.
    pub fn from_triples(triples: &[GapTriple]) -> Self {
        let before: BTreeSet<&FieldTag> = triples.iter().flat_map(|t| t.before.fields()).collect();
        let after: BTreeSet<&FieldTag> = triples.iter().flat_map(|t| t.after.fields()).collect();
        let target: BTreeSet<&FieldTag> = triples.iter().flat_map(|t| t.target.fields()).collect();

        let input_columns: Vec<Column> = before
            .into_iter()
            .map(|t| Column::new(t.clone(), Role::Before))
            .chain(after.into_iter().map(|t| Column::new(t.clone(), Role::After)))
            .collect();
        let target_columns: Vec<Column> = target
            .into_iter()
            .map(|t| Column::new(t.clone(), Role::Target))
            .collect();

        let n = triples.len();
        let input_values = Array2::from_shape_fn((n, input_columns.len()), |(r, c)| {
            let column = &input_columns[c];
            let record = match column.role {
                Role::Before => &triples[r].before,
                _ => &triples[r].after,
            };
            record.get(&column.tag).unwrap_or(f64::NAN)
        });
        let target_values = Array2::from_shape_fn((n, target_columns.len()), |(r, c)| {
            triples[r].target.get(&target_columns[c].tag).unwrap_or(f64::NAN)
        });

        let index: Vec<usize> = (0..n).collect();
        Self {
            input: Frame::new(input_columns, index.clone(), input_values),
            target: Frame::new(target_columns, index, target_values),
        }
    }

    pub fn len(&self) -> usize {
        self.input.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CompanyKey, QuarterlyRecord};

    fn triple(before: &[(&str, Option<f64>)], after: &[(&str, Option<f64>)], target: &[(&str, Option<f64>)]) -> GapTriple {
        let build = |q: &str, fields: &[(&str, Option<f64>)]| {
            fields.iter().fold(QuarterlyRecord::new(q), |r, (name, v)| {
                r.with_value(FieldTag::parse(name), *v)
            })
        };
        GapTriple {
            company: CompanyKey::new("USA", "NASDAQ", "ACME"),
            before: build("2021Q1", before),
            after: build("2021Q3", after),
            target: build("2021Q2", target),
        }
    }

    #[test]
    fn test_from_triples_layout() {
        let t1 = triple(
            &[("Balance_Sheet___cash", Some(1.0))],
            &[("Balance_Sheet___cash", Some(3.0))],
            &[("Balance_Sheet___cash", None)],
        );
        let t2 = triple(
            &[("Equity___commonStock", Some(5.0))],
            &[("Balance_Sheet___cash", Some(6.0))],
            &[("Equity___commonStock", Some(7.0))],
        );
        let batch = RawBatch::from_triples(&[t1, t2]);

        assert_eq!(
            batch.input.column_names(),
            vec![
                "Balance_Sheet___cash_BEFORE",
                "Equity___commonStock_BEFORE",
                "Balance_Sheet___cash_AFTER",
            ]
        );
        assert_eq!(
            batch.target.column_names(),
            vec!["Balance_Sheet___cash", "Equity___commonStock"]
        );
        assert_eq!(batch.input.values[[0, 0]], 1.0);
        assert!(batch.input.values[[0, 1]].is_nan());
        assert_eq!(batch.input.values[[1, 2]], 6.0);
        assert!(batch.target.values[[0, 0]].is_nan());
        assert!(batch.target.values[[1, 0]].is_nan());
        assert_eq!(batch.target.values[[1, 1]], 7.0);
    }

    #[test]
    fn test_retain_index_keeps_labels() {
        let frame = Frame::new(
            vec![Column::new(FieldTag::parse("Equity___x"), Role::Target)],
            vec![0, 1, 2, 3],
            Array2::from_shape_vec((4, 1), vec![0.0, 1.0, 2.0, 3.0]).unwrap(),
        );
        let dropped = frame.select_rows(&[1, 2, 3]);
        let labels: HashSet<usize> = [0, 2, 3].into_iter().collect();
        let aligned = dropped.retain_index(&labels);

        assert_eq!(aligned.index, vec![2, 3]);
        assert_eq!(aligned.values.column(0).to_vec(), vec![2.0, 3.0]);
    }
}
