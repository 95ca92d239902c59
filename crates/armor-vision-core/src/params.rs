/// A parameter value rejected by validation or by a named update.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter `{0}`")]
    Unknown(String),

    #[error("parameter `{name}` expects {expected}")]
    WrongType { name: String, expected: &'static str },

    #[error("parameter `{name}` = {value} is outside {range}")]
    OutOfRange {
        name: String,
        value: f64,
        range: &'static str,
    },

    #[error("`{min}` ({min_value}) must not exceed `{max}` ({max_value})")]
    InvertedBounds {
        min: &'static str,
        min_value: f64,
        max: &'static str,
        max_value: f64,
    },
}

impl ParamError {
    /// Check that a float parameter is finite and inside `[lo, hi]`.
    pub fn check_range(
        name: &str,
        value: f64,
        lo: f64,
        hi: f64,
        range: &'static str,
    ) -> Result<(), Self> {
        if value.is_finite() && value >= lo && value <= hi {
            Ok(())
        } else {
            Err(Self::OutOfRange {
                name: name.to_owned(),
                value,
                range,
            })
        }
    }

    /// Check a `min <= max` pair.
    pub fn check_order(
        min: &'static str,
        min_value: f64,
        max: &'static str,
        max_value: f64,
    ) -> Result<(), Self> {
        if min_value <= max_value {
            Ok(())
        } else {
            Err(Self::InvertedBounds {
                min,
                min_value,
                max,
                max_value,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_check_rejects_nan() {
        assert!(ParamError::check_range("x", f64::NAN, 0.0, 1.0, "[0, 1]").is_err());
        assert!(ParamError::check_range("x", 1.0, 0.0, 1.0, "[0, 1]").is_ok());
    }

    #[test]
    fn order_check_reports_names() {
        let err = ParamError::check_order("a.min", 2.0, "a.max", 1.0).unwrap_err();
        assert!(err.to_string().contains("a.min"));
    }
}
