// src/common/validation.rs
//
// Limites das colunas NUMERIC da migration. Valor fora deles seria
// rejeitado (ou arredondado) pelo Postgres; aqui vira 400 antes do store.

use rust_decimal::Decimal;
use validator::ValidationError;

fn fits_numeric(value: &Decimal, precision: u32, scale: u32) -> bool {
    let value = value.normalize();
    if value.scale() > scale {
        return false;
    }
    value.abs() < Decimal::from(10i64.pow(precision - scale))
}

fn numeric_error(precision: u32, scale: u32, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("numeric");
    err.add_param("precision".into(), &precision);
    err.add_param("scale".into(), &scale);
    err.message = Some(message.into());
    err
}

// NUMERIC(12, 2)
pub fn validate_money(val: &Decimal) -> Result<(), ValidationError> {
    if !fits_numeric(val, 12, 2) {
        return Err(numeric_error(
            12,
            2,
            "Valor monetário deve ter no máximo 10 dígitos inteiros e 2 casas decimais.",
        ));
    }
    Ok(())
}

// NUMERIC(12, 3)
pub fn validate_weight(val: &Decimal) -> Result<(), ValidationError> {
    if !fits_numeric(val, 12, 3) {
        return Err(numeric_error(
            12,
            3,
            "Peso deve ter no máximo 9 dígitos inteiros e 3 casas decimais.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_accepts_two_decimals_below_ten_billion() {
        assert!(validate_money(&Decimal::new(999_999_999_999, 2)).is_ok());
        assert!(validate_money(&Decimal::new(1050, 2)).is_ok());
        // zeros à direita não contam como casas
        assert!(validate_money(&Decimal::new(105000, 4)).is_ok());
        assert!(validate_money(&Decimal::new(-2500, 2)).is_ok());

        assert!(validate_money(&Decimal::new(10005, 3)).is_err());
        assert!(validate_money(&Decimal::from(10_000_000_000i64)).is_err());
    }

    #[test]
    fn weight_allows_three_decimals() {
        assert!(validate_weight(&Decimal::new(12505, 3)).is_ok());
        assert!(validate_weight(&Decimal::new(125055, 4)).is_err());
        assert!(validate_weight(&Decimal::from(1_000_000_000)).is_err());
    }
}
