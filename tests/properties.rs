//! Property tests for the payroll calculation.
//!
//! Covers the identities every payroll record must satisfy for arbitrary
//! salaries, allowances, dependents and attendance.

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use payroll_engine::calculation::{aggregate_working_days, calculate_pit, calculate_salary};
use payroll_engine::config::PayrollConfig;
use payroll_engine::models::{AttendanceRecord, AttendanceStatus, Employee, PayPeriod};
use payroll_engine::store::PayrollStore;

fn employee(base: i64, allowances: i64, dependents: u32) -> Employee {
    Employee {
        id: "emp_prop".to_string(),
        name: "Property Test".to_string(),
        position: "Cashier".to_string(),
        base_salary: Decimal::from(base),
        allowances: Decimal::from(allowances),
        dependents,
        active: true,
    }
}

fn march() -> PayPeriod {
    PayPeriod::new(3, 2024).unwrap()
}

fn status_strategy() -> impl Strategy<Value = AttendanceStatus> {
    prop_oneof![
        Just(AttendanceStatus::Present),
        Just(AttendanceStatus::HalfDay),
        Just(AttendanceStatus::Absent),
        Just(AttendanceStatus::Leave),
    ]
}

fn attendance(statuses: &[AttendanceStatus]) -> Vec<AttendanceRecord> {
    let first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    statuses
        .iter()
        .enumerate()
        .map(|(i, status)| AttendanceRecord {
            employee_id: "emp_prop".to_string(),
            work_date: first + Duration::days(i as i64),
            status: *status,
        })
        .collect()
}

proptest! {
    /// Net pay always reconciles with gross less employee deductions.
    #[test]
    fn net_reconciles_with_deductions(
        base in 0i64..300_000_000,
        allowances in 0i64..20_000_000,
        dependents in 0u32..6,
        half_days in 0u32..62,
    ) {
        let config = PayrollConfig::default();
        let working_days = Decimal::from(half_days) / Decimal::TWO;
        let draft = calculate_salary(
            &employee(base, allowances, dependents),
            &march(),
            working_days,
            &config,
            1,
        )
        .unwrap()
        .draft;

        prop_assert_eq!(
            draft.net_salary,
            draft.gross_salary - draft.employee_insurance_total() - draft.pit
        );
        prop_assert_eq!(
            draft.total_deductions,
            draft.employee_insurance_total() + draft.pit
        );
        prop_assert!(draft.insurance_base <= config.insurance.insurance_cap);
        prop_assert!(draft.taxable_income >= Decimal::ZERO);
        prop_assert!(draft.net_salary.fract().is_zero());
    }

    /// PIT never decreases as taxable income grows, and never exceeds the top rate.
    #[test]
    fn pit_is_monotone_and_bounded(a in 0i64..500_000_000, b in 0i64..500_000_000) {
        let brackets = PayrollConfig::default().tax.brackets;
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let pit_low = calculate_pit(Decimal::from(low), &brackets);
        let pit_high = calculate_pit(Decimal::from(high), &brackets);

        prop_assert!(pit_low <= pit_high);
        prop_assert!(pit_high <= Decimal::from(high) * Decimal::new(35, 2) + Decimal::ONE);
    }

    /// Each extra present day adds exactly one working day; each extra half day adds 0.5.
    #[test]
    fn working_days_monotone(
        statuses in prop::collection::vec(status_strategy(), 0..29),
        extra in prop_oneof![Just(AttendanceStatus::Present), Just(AttendanceStatus::HalfDay)],
    ) {
        let mut records = attendance(&statuses);
        let before = aggregate_working_days("emp_prop", &march(), &records).working_days;

        records.push(AttendanceRecord {
            employee_id: "emp_prop".to_string(),
            work_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            status: extra,
        });
        let after = aggregate_working_days("emp_prop", &march(), &records).working_days;

        prop_assert_eq!(after - before, extra.day_weight());
    }

    /// Recalculating an unchanged period leaves the stored record byte-identical.
    #[test]
    fn recalculation_is_idempotent(
        base in 0i64..100_000_000,
        allowances in 0i64..5_000_000,
        statuses in prop::collection::vec(status_strategy(), 0..31),
    ) {
        let config = PayrollConfig::default();
        let employee = employee(base, allowances, 1);
        let records = attendance(&statuses);
        let store = PayrollStore::new();

        let mut stored = Vec::new();
        for offset in 0..2 {
            let working_days = aggregate_working_days(&employee.id, &march(), &records).working_days;
            let draft = calculate_salary(&employee, &march(), working_days, &config, 1)
                .unwrap()
                .draft;
            let record = store
                .upsert(draft, Utc::now() + Duration::seconds(offset))
                .unwrap();
            stored.push(serde_json::to_vec(&record).unwrap());
        }

        prop_assert_eq!(&stored[0], &stored[1]);
    }
}
