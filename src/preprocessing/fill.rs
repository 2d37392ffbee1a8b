//! Missing value filling and plain tensorization

use super::frame::Frame;
use crate::error::{Error, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder strategy for missing values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum FillMethod {
    /// Replace with 0
    #[default]
    Zero,
    /// Replace with the mean of the observed values in the column
    Mean,
}

impl FromStr for FillMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(FillMethod::Zero),
            "mean" => Ok(FillMethod::Mean),
            other => Err(Error::Config(format!(
                "unsupported fill method '{}', expected 'zero' or 'mean'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for FillMethod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FillMethod> for String {
    fn from(method: FillMethod) -> Self {
        method.to_string()
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillMethod::Zero => f.write_str("zero"),
            FillMethod::Mean => f.write_str("mean"),
        }
    }
}

impl FillMethod {
    /// Returns a copy with every NaN replaced.
    ///
    /// A column without observed values is filled with 0 under both methods.
    pub fn fill(&self, values: &Array2<f64>) -> Array2<f64> {
        match self {
            FillMethod::Zero => values.mapv(|v| if v.is_nan() { 0.0 } else { v }),
            FillMethod::Mean => {
                let mut filled = values.clone();
                for mut column in filled.axis_iter_mut(Axis(1)) {
                    let (sum, count) = column
                        .iter()
                        .filter(|v| !v.is_nan())
                        .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));
                    let mean = if count > 0 { sum / count as f64 } else { 0.0 };
                    column.mapv_inplace(|v| if v.is_nan() { mean } else { v });
                }
                filled
            }
        }
    }
}

/// Converts a frame straight into a dense array, filling missing values
pub fn to_tensor(frame: &Frame, method: FillMethod) -> Array2<f64> {
    method.fill(&frame.values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FieldTag;
    use crate::preprocessing::frame::{Column, Role};
    use ndarray::array;

    #[test]
    fn test_parse_fill_method() {
        assert_eq!("zero".parse::<FillMethod>().unwrap(), FillMethod::Zero);
        assert_eq!(" Mean ".parse::<FillMethod>().unwrap(), FillMethod::Mean);

        let err = "median".parse::<FillMethod>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_fill() {
        let values = array![[1.0, f64::NAN], [f64::NAN, 4.0]];
        let filled = FillMethod::Zero.fill(&values);
        assert_eq!(filled, array![[1.0, 0.0], [0.0, 4.0]]);
    }

    #[test]
    fn test_mean_fill() {
        let values = array![[1.0, f64::NAN], [f64::NAN, f64::NAN], [3.0, f64::NAN]];
        let filled = FillMethod::Mean.fill(&values);
        assert_eq!(filled, array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]]);
    }

    #[test]
    fn test_to_tensor() {
        let frame = Frame::new(
            vec![Column::new(FieldTag::parse("Dividend___amount"), Role::Target)],
            vec![0, 1],
            array![[f64::NAN], [2.5]],
        );
        assert_eq!(to_tensor(&frame, FillMethod::Mean), array![[2.5], [2.5]]);
    }

    #[test]
    fn test_serde_rejects_unknown() {
        #[derive(Deserialize)]
        struct Wrapper {
            fill: FillMethod,
        }
        let ok: Wrapper = toml::from_str("fill = \"mean\"").unwrap();
        assert_eq!(ok.fill, FillMethod::Mean);
        assert!(toml::from_str::<Wrapper>("fill = \"ffill\"").is_err());
    }
}
