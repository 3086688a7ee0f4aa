//! Monthly payroll calculation
//!
//! Turns a staff member's salary configuration into the amounts stored on a
//! salary record: social insurance deductions, individual income tax and the
//! net amount paid out.

use chrono::NaiveDate;

use crate::entity::salary;

/// Monthly tax-free threshold
pub const TAX_THRESHOLD: f64 = 5000.0;

pub const PENSION_RATE: f64 = 0.08;
pub const MEDICAL_RATE: f64 = 0.02;
pub const UNEMPLOYMENT_RATE: f64 = 0.005;
pub const HOUSING_FUND_RATE: f64 = 0.12;

/// (upper bound of taxable income, rate, quick deduction)
const TAX_BRACKETS: [(f64, f64, f64); 7] = [
    (3000.0, 0.03, 0.0),
    (12000.0, 0.10, 210.0),
    (25000.0, 0.20, 1410.0),
    (35000.0, 0.25, 2660.0),
    (55000.0, 0.30, 4410.0),
    (80000.0, 0.35, 7160.0),
    (f64::INFINITY, 0.45, 15160.0),
];

/// Pay items a payslip is computed from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Earnings {
    pub base: f64,
    pub subsidy: f64,
    pub bonus: f64,
    pub commission: f64,
    pub other: f64,
    /// Whether social insurance and housing fund are withheld
    pub fund: bool,
}

impl From<&salary::Model> for Earnings {
    fn from(s: &salary::Model) -> Self {
        Self {
            base: s.base,
            subsidy: s.subsidy,
            bonus: s.bonus,
            commission: s.commission,
            other: s.other,
            fund: s.fund,
        }
    }
}

impl Earnings {
    pub fn has_invalid_amount(&self) -> bool {
        [self.base, self.subsidy, self.bonus, self.commission, self.other]
            .iter()
            .any(|v| *v < 0.0 || !v.is_finite())
    }
}

/// Computed amounts for one month
#[derive(Debug, Clone, PartialEq)]
pub struct Payslip {
    pub gross: f64,
    pub pension_insurance: f64,
    pub medical_insurance: f64,
    pub unemployment_insurance: f64,
    pub housing_fund: f64,
    pub tax: f64,
    pub total: f64,
}

impl Payslip {
    pub fn insurance(&self) -> f64 {
        round2(
            self.pension_insurance
                + self.medical_insurance
                + self.unemployment_insurance
                + self.housing_fund,
        )
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Individual income tax on the month's taxable income
pub fn income_tax(taxable: f64) -> f64 {
    if taxable <= 0.0 {
        return 0.0;
    }
    let (_, rate, deduction) = TAX_BRACKETS
        .iter()
        .copied()
        .find(|(upper, _, _)| taxable <= *upper)
        .unwrap_or(TAX_BRACKETS[TAX_BRACKETS.len() - 1]);
    round2((taxable * rate - deduction).max(0.0))
}

/// Compute the payslip for one month of earnings
pub fn calculate(earnings: &Earnings) -> Payslip {
    let gross = round2(earnings.base + earnings.subsidy + earnings.bonus + earnings.commission + earnings.other);

    let (pension, medical, unemployment, housing) = if earnings.fund {
        (
            round2(earnings.base * PENSION_RATE),
            round2(earnings.base * MEDICAL_RATE),
            round2(earnings.base * UNEMPLOYMENT_RATE),
            round2(earnings.base * HOUSING_FUND_RATE),
        )
    } else {
        (0.0, 0.0, 0.0, 0.0)
    };

    let insurance = pension + medical + unemployment + housing;
    let tax = income_tax(gross - insurance - TAX_THRESHOLD);

    Payslip {
        gross,
        pension_insurance: pension,
        medical_insurance: medical,
        unemployment_insurance: unemployment,
        housing_fund: housing,
        tax,
        total: round2(gross - insurance - tax),
    }
}

/// Validate a salary month in `YYYY-MM` form
pub fn is_valid_salary_date(value: &str) -> bool {
    value.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn salary(base: f64, bonus: f64, fund: bool) -> salary::Model {
        salary::Model {
            id: 1,
            salary_id: "salary1".to_string(),
            staff_id: "staff1".to_string(),
            staff_name: "张三".to_string(),
            base,
            subsidy: 0.0,
            bonus,
            commission: 0.0,
            other: 0.0,
            fund,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_income_tax_brackets() {
        assert_eq!(income_tax(-100.0), 0.0);
        assert_eq!(income_tax(0.0), 0.0);
        assert_eq!(income_tax(3000.0), 90.0);
        assert_eq!(income_tax(10000.0), 790.0);
        assert_eq!(income_tax(20000.0), 2590.0);
        assert_eq!(income_tax(100000.0), 29840.0);
    }

    #[test]
    fn test_below_threshold_without_fund() {
        let slip = calculate(&Earnings::from(&salary(4000.0, 500.0, false)));
        assert_eq!(slip.gross, 4500.0);
        assert_eq!(slip.insurance(), 0.0);
        assert_eq!(slip.tax, 0.0);
        assert_eq!(slip.total, 4500.0);
    }

    #[test]
    fn test_with_fund() {
        let slip = calculate(&Earnings::from(&salary(10000.0, 2000.0, true)));
        assert_eq!(slip.pension_insurance, 800.0);
        assert_eq!(slip.medical_insurance, 200.0);
        assert_eq!(slip.unemployment_insurance, 50.0);
        assert_eq!(slip.housing_fund, 1200.0);
        // taxable = 12000 - 2250 - 5000 = 4750 -> 10% - 210
        assert_eq!(slip.tax, 265.0);
        assert_eq!(slip.total, 9485.0);
    }

    #[test]
    fn test_invalid_amounts_detected() {
        let mut earnings = Earnings::from(&salary(1000.0, 0.0, false));
        assert!(!earnings.has_invalid_amount());
        earnings.bonus = -1.0;
        assert!(earnings.has_invalid_amount());
        earnings.bonus = f64::NAN;
        assert!(earnings.has_invalid_amount());
    }

    #[test]
    fn test_salary_date() {
        assert!(is_valid_salary_date("2021-03"));
        assert!(!is_valid_salary_date("2021-13"));
        assert!(!is_valid_salary_date("2021-3"));
        assert!(!is_valid_salary_date("202103"));
    }
}
