use fractic_server_error::ServerError;

use crate::errors::InvalidQuantity;

/// Quantity cell as typed by users or exported by spreadsheets: accepts
/// thousands separators ("1,200") and integral decimals ("5.0").
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct QuantityModel(pub u32);

impl QuantityModel {
    /// `row` is 1-based and only used for the error message.
    pub(crate) fn parse(s: &str, row: usize) -> Result<Self, ServerError> {
        let raw = s.trim().replace(',', "");
        if raw.is_empty() {
            return Ok(QuantityModel(0));
        }
        if let Ok(q) = raw.parse::<u32>() {
            return Ok(QuantityModel(q));
        }
        let value = raw
            .parse::<f64>()
            .map_err(|_| InvalidQuantity::new(s.trim(), row))?;
        if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return Err(InvalidQuantity::new(s.trim(), row));
        }
        Ok(QuantityModel(value as u32))
    }
}

impl From<QuantityModel> for u32 {
    fn from(q: QuantityModel) -> u32 {
        q.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_plain_and_formatted_quantities() {
        assert_eq!(QuantityModel::parse("5", 1).unwrap(), QuantityModel(5));
        assert_eq!(QuantityModel::parse(" 1,200 ", 1).unwrap(), QuantityModel(1200));
        assert_eq!(QuantityModel::parse("7.0", 1).unwrap(), QuantityModel(7));
        assert_eq!(QuantityModel::parse("", 1).unwrap(), QuantityModel(0));
    }

    #[test]
    fn test_rejects_negative_fractional_and_text() {
        assert!(QuantityModel::parse("-1", 2).is_err());
        assert!(QuantityModel::parse("2.5", 2).is_err());
        assert!(QuantityModel::parse("abc", 2).is_err());
    }
}
