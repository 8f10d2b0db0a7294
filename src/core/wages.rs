use std::collections::BTreeMap;

/// Applied when an employee has no hourly rate on file.
pub const DEFAULT_HOURLY_RATE: f64 = 15.0;

/// Flat income-tax approximation. Deliberately simplified: it ignores the
/// per-tenant tax configuration and is disclaimed in exported reports as not
/// a compliant payroll calculation.
pub const FLAT_TAX_RATE: f64 = 0.15;

/// Percentage rates and annual caps for the two capped statutory deductions.
#[derive(Debug, Clone, Copy)]
pub struct DeductionRates {
    pub pension_rate: f64,
    pub pension_cap: f64,
    pub insurance_rate: f64,
    pub insurance_cap: f64,
}

impl Default for DeductionRates {
    fn default() -> Self {
        Self {
            pension_rate: 5.95,
            pension_cap: 3867.50,
            insurance_rate: 1.58,
            insurance_cap: 1049.12,
        }
    }
}

/// One worker's computed pay line for a period. All monetary fields are
/// rounded to 2 decimals; `net_pay` is derived from the rounded components so
/// that stored values always add up exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WageBreakdown {
    pub regular_hours: f64,
    pub hourly_rate: f64,
    pub gross_pay: f64,
    pub pension_deduction: f64,
    pub insurance_deduction: f64,
    pub tax_deduction: f64,
    pub net_pay: f64,
}

impl WageBreakdown {
    pub fn total_deductions(&self) -> f64 {
        self.pension_deduction + self.insurance_deduction + self.tax_deduction
    }
}

/// Round half-up to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sums worked minutes per employee as fractional hours. Accumulation stays
/// in floating point; rounding happens once, when the breakdown is computed.
/// BTreeMap keeps entry insertion order deterministic across runs.
pub fn aggregate_hours(jobs: &[(u64, i64)]) -> BTreeMap<u64, f64> {
    let mut hours: BTreeMap<u64, f64> = BTreeMap::new();
    for (employee_id, duration_minutes) in jobs {
        *hours.entry(*employee_id).or_insert(0.0) += *duration_minutes as f64 / 60.0;
    }
    hours
}

pub fn compute_wages(hours: f64, hourly_rate: f64, rates: &DeductionRates) -> WageBreakdown {
    // Gross is derived from the rounded hours, so the stored entry always
    // satisfies gross = regular_hours * rate.
    let regular_hours = round2(hours);
    let gross_pay = round2(regular_hours * hourly_rate);

    let pension_deduction = round2(f64::min(
        gross_pay * (rates.pension_rate / 100.0),
        rates.pension_cap,
    ));
    let insurance_deduction = round2(f64::min(
        gross_pay * (rates.insurance_rate / 100.0),
        rates.insurance_cap,
    ));
    let tax_deduction = round2(gross_pay * FLAT_TAX_RATE);

    let net_pay = round2(gross_pay - pension_deduction - insurance_deduction - tax_deduction);

    WageBreakdown {
        regular_hours,
        hourly_rate,
        gross_pay,
        pension_deduction,
        insurance_deduction,
        tax_deduction,
        net_pay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_minutes_into_hours() {
        let jobs = vec![(7, 180), (7, 300), (8, 90)];
        let hours = aggregate_hours(&jobs);
        assert_eq!(hours[&7], 8.0);
        assert_eq!(hours[&8], 1.5);
    }

    #[test]
    fn aggregation_is_idempotent_for_unchanged_input() {
        let jobs = vec![(1, 50), (1, 70), (2, 45), (1, 25)];
        let first = aggregate_hours(&jobs);
        let second = aggregate_hours(&jobs);
        assert_eq!(first, second);
    }

    #[test]
    fn two_job_scenario_at_twenty_per_hour() {
        // 180 min + 300 min at $20/h, 2024 default rates
        let hours = aggregate_hours(&[(7, 180), (7, 300)])[&7];
        let breakdown = compute_wages(hours, 20.0, &DeductionRates::default());

        assert_eq!(breakdown.regular_hours, 8.0);
        assert_eq!(breakdown.gross_pay, 160.0);
        assert_eq!(breakdown.pension_deduction, 9.52);
        assert_eq!(breakdown.insurance_deduction, 2.53);
        assert_eq!(breakdown.tax_deduction, 24.0);
        assert_eq!(breakdown.net_pay, 123.95);
    }

    #[test]
    fn gross_matches_stored_hours_times_rate() {
        // 500 min does not land on 2 decimals (8.3333.. h); the stored entry
        // must still satisfy gross = regular_hours * rate.
        let hours = aggregate_hours(&[(3, 500)])[&3];
        let breakdown = compute_wages(hours, 20.0, &DeductionRates::default());
        assert_eq!(breakdown.regular_hours, 8.33);
        assert_eq!(breakdown.gross_pay, 166.6);
        assert_eq!(
            breakdown.gross_pay,
            round2(breakdown.regular_hours * breakdown.hourly_rate)
        );
    }

    #[test]
    fn net_equals_gross_minus_stored_deductions() {
        let breakdown = compute_wages(37.25, 18.5, &DeductionRates::default());
        assert_eq!(
            breakdown.net_pay,
            round2(breakdown.gross_pay - breakdown.total_deductions())
        );
    }

    #[test]
    fn pension_deduction_is_capped() {
        let rates = DeductionRates::default();
        // gross far beyond the cap threshold
        let breakdown = compute_wages(4000.0, 20.0, &rates);
        assert!(breakdown.gross_pay * rates.pension_rate / 100.0 > rates.pension_cap);
        assert_eq!(breakdown.pension_deduction, rates.pension_cap);
    }

    #[test]
    fn insurance_deduction_is_capped() {
        let rates = DeductionRates::default();
        let breakdown = compute_wages(4000.0, 20.0, &rates);
        assert_eq!(breakdown.insurance_deduction, rates.insurance_cap);
    }

    #[test]
    fn below_cap_uses_percentage() {
        let rates = DeductionRates::default();
        let breakdown = compute_wages(10.0, 20.0, &rates);
        assert_eq!(breakdown.pension_deduction, 11.9); // 200 * 5.95%
        assert_eq!(breakdown.insurance_deduction, 3.16); // 200 * 1.58%
    }

    #[test]
    fn zero_hours_yields_zero_everywhere() {
        let breakdown = compute_wages(0.0, 20.0, &DeductionRates::default());
        assert_eq!(breakdown.gross_pay, 0.0);
        assert_eq!(breakdown.net_pay, 0.0);
        assert_eq!(breakdown.total_deductions(), 0.0);
    }

    #[test]
    fn period_totals_add_up_exactly() {
        // Period totals are accumulated from the stored entry values, so the
        // sums must match exactly whatever rounding produced per entry.
        let rates = DeductionRates::default();
        let entries: Vec<WageBreakdown> = [(7u64, 480i64), (8, 455), (9, 1234)]
            .iter()
            .map(|(id, minutes)| {
                let hours = aggregate_hours(&[(*id, *minutes)])[id];
                compute_wages(hours, 22.75, &rates)
            })
            .collect();

        let total_gross: f64 = entries.iter().map(|e| e.gross_pay).sum();
        let total_net: f64 = entries.iter().map(|e| e.net_pay).sum();
        let total_deductions: f64 = entries.iter().map(|e| e.total_deductions()).sum();

        let re_gross: f64 = entries.iter().map(|e| e.gross_pay).sum();
        assert_eq!(total_gross, re_gross);
        assert!((total_gross - total_net - total_deductions).abs() < 1e-9);
    }

    #[test]
    fn round2_half_up() {
        assert_eq!(round2(123.952), 123.95);
        assert_eq!(round2(2.528), 2.53);
        assert_eq!(round2(24.0), 24.0);
    }
}
