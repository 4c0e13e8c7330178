//! Applies one field edit at a time and decides which derived fields to
//! refresh. A derived field the user typed into is pinned and is never
//! overwritten by the calculator for the rest of the edit session.

use std::collections::BTreeSet;

use tracing::debug;

use crate::calculator::compute;
use crate::fmt::{amount, parse_number};
use crate::models::{DerivedField, Field, FormValue, TransactionRecord};

/// Direct dependents of each derived field.
fn dependents(field: DerivedField) -> &'static [DerivedField] {
    use DerivedField::*;
    match field {
        Gci => &[ReferralDollar, AdjustedGci],
        ReferralDollar => &[AdjustedGci],
        AdjustedGci => &[
            Royalty,
            CompanyDollar,
            PreSplitDeduction,
            TotalBrokerageFees,
            Nci,
        ],
        Royalty | CompanyDollar | PreSplitDeduction => &[TotalBrokerageFees],
        TotalBrokerageFees => &[Nci],
        Nci => &[],
    }
}

/// Every field transitively downstream of `field`, in evaluation order.
pub fn downstream(field: DerivedField) -> Vec<DerivedField> {
    let mut reached = BTreeSet::new();
    let mut stack = vec![field];
    while let Some(current) = stack.pop() {
        for dep in dependents(current) {
            if reached.insert(*dep) {
                stack.push(*dep);
            }
        }
    }
    reached.into_iter().collect()
}

/// Start a clean edit session on a loaded record: every derived field is Auto.
pub fn load_for_edit(record: &TransactionRecord) -> TransactionRecord {
    let mut next = record.clone();
    next.overrides.clear();
    next
}

/// Refresh every Auto derived field without touching any input.
pub fn recompute(record: &TransactionRecord) -> TransactionRecord {
    let mut next = record.clone();
    refresh_auto(&mut next, DerivedField::ALL);
    next
}

/// Apply a single edit and return the next snapshot.
pub fn on_field_change(record: &TransactionRecord, field: Field, value: &str) -> TransactionRecord {
    let mut next = record.clone();

    let refresh = match field {
        Field::Derived(derived) => {
            back_derive(&mut next, derived, value);
            next.set(field, value);
            next.overrides.pin(derived);
            debug!(field = derived.key(), value, "pinned derived field");
            downstream(derived)
        }
        Field::NetVolume => {
            debug!("netVolume follows closedPrice, edit ignored");
            Vec::new()
        }
        descriptive if descriptive.is_descriptive() => {
            next.set(descriptive, value);
            return next;
        }
        input => {
            next.set(input, value);
            DerivedField::ALL.to_vec()
        }
    };

    refresh_auto(&mut next, &refresh);
    next
}

fn back_derive(record: &mut TransactionRecord, field: DerivedField, value: &str) {
    match field {
        DerivedField::Gci => {
            let closed_price = record.closed_price.number();
            if closed_price == 0.0 {
                debug!("closedPrice is 0, commissionPct left as is");
                return;
            }
            let pct = parse_number(value) * 100.0 / closed_price;
            record.commission_pct = FormValue::from(pct.to_string());
            debug!(commission_pct = %record.commission_pct, "back-derived from gci");
        }
        DerivedField::ReferralDollar => {
            let gci = record.gci.number();
            if gci == 0.0 {
                debug!("gci is 0, referralPct left as is");
                return;
            }
            let pct = parse_number(value) * 100.0 / gci;
            record.referral_pct = FormValue::from(pct.to_string());
            debug!(referral_pct = %record.referral_pct, "back-derived from referralDollar");
        }
        _ => {}
    }
}

fn refresh_auto(record: &mut TransactionRecord, fields: &[DerivedField]) {
    let derived = compute(record);
    for field in fields {
        if !record.overrides.is_pinned(*field) {
            *record.derived_mut(*field) = FormValue::from(amount(derived.get(*field)));
        }
    }
    record.net_volume = FormValue::from(amount(derived.net_volume));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Brokerage, TransactionType};
    use proptest::prelude::*;

    fn edit(record: &TransactionRecord, key: &str, value: &str) -> TransactionRecord {
        on_field_change(record, Field::from_key(key).unwrap(), value)
    }

    fn kw_sale() -> TransactionRecord {
        let r = TransactionRecord::blank();
        let r = edit(&r, "brokerage", "KW");
        let r = edit(&r, "closedPrice", "1000000");
        edit(&r, "commissionPct", "3")
    }

    #[test]
    fn test_downstream_order() {
        use DerivedField::*;
        assert_eq!(
            downstream(Gci),
            vec![
                ReferralDollar,
                AdjustedGci,
                Royalty,
                CompanyDollar,
                PreSplitDeduction,
                TotalBrokerageFees,
                Nci
            ]
        );
        assert_eq!(downstream(Royalty), vec![TotalBrokerageFees, Nci]);
        assert_eq!(downstream(TotalBrokerageFees), vec![Nci]);
        assert!(downstream(Nci).is_empty());
    }

    #[test]
    fn test_raw_edits_refresh_everything() {
        let r = kw_sale();
        assert_eq!(r.gci.as_str(), "30000.00");
        assert_eq!(r.royalty.as_str(), "1800.00");
        assert_eq!(r.company_dollar.as_str(), "3000.00");
        assert_eq!(r.total_brokerage_fees.as_str(), "4800.00");
        assert_eq!(r.nci.as_str(), "25200.00");
        assert_eq!(r.net_volume.as_str(), "1000000.00");
        assert!(r.overrides.is_empty());
    }

    #[test]
    fn test_override_isolation() {
        let r = edit(&kw_sale(), "royalty", "1000");
        assert_eq!(r.total_brokerage_fees.as_str(), "4000.00");

        let r = edit(&r, "hoaTransfer", "250");
        assert_eq!(r.royalty.as_str(), "1000");
        assert!(r.overrides.is_pinned(DerivedField::Royalty));
        assert_eq!(r.total_brokerage_fees.as_str(), "4250.00");
        assert_eq!(r.nci.as_str(), "25750.00");
    }

    #[test]
    fn test_pinned_value_survives_upstream_changes() {
        let r = edit(&kw_sale(), "royalty", "$1,900");
        let r = edit(&r, "closedPrice", "2000000");
        assert_eq!(r.royalty.as_str(), "$1,900");
        assert_eq!(r.gci.as_str(), "60000.00");
        assert_eq!(r.company_dollar.as_str(), "6000.00");
        assert_eq!(r.total_brokerage_fees.as_str(), "7900.00");
    }

    #[test]
    fn test_gci_edit_back_fills_commission_pct() {
        let r = edit(&kw_sale(), "gci", "25000");
        assert_eq!(r.commission_pct.as_str(), "2.5");
        assert_eq!(r.gci.as_str(), "25000");
        assert!(r.overrides.is_pinned(DerivedField::Gci));
        assert_eq!(r.adjusted_gci.as_str(), "25000.00");
        assert_eq!(r.royalty.as_str(), "1500.00");
        assert_eq!(r.nci.as_str(), "21000.00");
    }

    #[test]
    fn test_back_filled_pct_reproduces_gci_after_reload() {
        let r = edit(&kw_sale(), "closedPrice", "1234567");
        let r = edit(&r, "gci", "25000");
        let r = edit(&load_for_edit(&r), "hoaTransfer", "250");
        assert!(!r.overrides.is_pinned(DerivedField::Gci));
        assert!((r.gci.number() - 25000.0).abs() <= 0.01);
        assert_eq!(r.gci.as_str(), "25000.00");
    }

    #[test]
    fn test_gci_edit_with_zero_price_skips_back_fill() {
        let r = edit(&TransactionRecord::blank(), "commissionPct", "3");
        let r = edit(&r, "gci", "5000");
        assert_eq!(r.commission_pct.as_str(), "3");
        assert_eq!(r.gci.as_str(), "5000");
        assert_eq!(r.nci.as_str(), "5000.00");
    }

    #[test]
    fn test_referral_dollar_edit_back_fills_referral_pct() {
        let r = edit(&kw_sale(), "referralDollar", "7500");
        assert_eq!(r.referral_pct.as_str(), "25");
        assert_eq!(r.gci.as_str(), "30000.00");
        assert_eq!(r.adjusted_gci.as_str(), "22500.00");
        assert_eq!(r.royalty.as_str(), "1350.00");
        assert_eq!(r.nci.as_str(), "18900.00");
    }

    #[test]
    fn test_referral_dollar_edit_with_zero_gci_skips_back_fill() {
        let r = edit(&TransactionRecord::blank(), "referralPct", "10");
        let r = edit(&r, "referralDollar", "500");
        assert_eq!(r.referral_pct.as_str(), "10");
        assert_eq!(r.adjusted_gci.as_str(), "-500.00");
    }

    #[test]
    fn test_derived_edit_only_refreshes_downstream() {
        let mut stale = kw_sale();
        stale.gci = FormValue::from("1.00");
        let r = edit(&stale, "royalty", "1000");
        assert_eq!(r.gci.as_str(), "1.00");
        assert_eq!(r.total_brokerage_fees.as_str(), "4000.00");
        assert_eq!(r.nci.as_str(), "26000.00");
    }

    #[test]
    fn test_nci_edit_leaves_fees_alone() {
        let r = edit(&kw_sale(), "nci", "20000");
        assert_eq!(r.nci.as_str(), "20000");
        assert_eq!(r.total_brokerage_fees.as_str(), "4800.00");
        let r = edit(&r, "eo", "100");
        assert_eq!(r.total_brokerage_fees.as_str(), "4900.00");
        assert_eq!(r.nci.as_str(), "20000");
    }

    #[test]
    fn test_net_volume_follows_closed_price() {
        let r = edit(&kw_sale(), "netVolume", "5");
        assert_eq!(r.net_volume.as_str(), "1000000.00");
        assert!(r.overrides.is_empty());
    }

    #[test]
    fn test_descriptive_edit_does_not_recompute() {
        let mut stale = kw_sale();
        stale.nci = FormValue::from("1.00");
        let r = edit(&stale, "clientName", "Jordan Lee");
        assert_eq!(r.client_name.as_str(), "Jordan Lee");
        assert_eq!(r.nci.as_str(), "1.00");
    }

    #[test]
    fn test_switching_brokerage_recomputes_deductions() {
        let r = edit(&kw_sale(), "brokerage", "BDH");
        assert_eq!(r.brokerage, Brokerage::Bdh);
        assert_eq!(r.royalty.as_str(), "0.00");
        assert_eq!(r.company_dollar.as_str(), "0.00");
        assert_eq!(r.pre_split_deduction.as_str(), "1800.00");
        assert_eq!(r.total_brokerage_fees.as_str(), "5292.00");
        assert_eq!(r.nci.as_str(), "24708.00");
    }

    #[test]
    fn test_referral_received_edit_flow() {
        let r = edit(&kw_sale(), "transactionType", "Referral Received");
        let r = edit(&r, "referralFeeReceived", "5000");
        assert_eq!(r.transaction_type, TransactionType::ReferralReceived);
        assert_eq!(r.gci.as_str(), "5000.00");
        assert_eq!(r.referral_dollar.as_str(), "0.00");
        assert_eq!(r.adjusted_gci.as_str(), "5000.00");
        assert_eq!(r.nci.as_str(), "4200.00");
    }

    #[test]
    fn test_edits_never_mutate_the_input_snapshot() {
        let before = kw_sale();
        let copy = before.clone();
        let _ = edit(&before, "gci", "1");
        let _ = edit(&before, "closedPrice", "2");
        assert_eq!(before, copy);
    }

    #[test]
    fn test_load_for_edit_clears_overrides() {
        let pinned = edit(&kw_sale(), "royalty", "1000");
        let loaded = load_for_edit(&pinned);
        assert!(loaded.overrides.is_empty());
        assert_eq!(loaded.royalty.as_str(), "1000");

        let r = edit(&loaded, "hoaTransfer", "0");
        assert_eq!(r.royalty.as_str(), "1800.00");
    }

    #[test]
    fn test_recompute_respects_pins() {
        let mut r = edit(&kw_sale(), "companyDollar", "2500");
        r.closed_price = FormValue::from("500000");
        let r = recompute(&r);
        assert_eq!(r.gci.as_str(), "15000.00");
        assert_eq!(r.company_dollar.as_str(), "2500");
        assert_eq!(r.total_brokerage_fees.as_str(), "3400.00");
    }

    proptest! {
        #[test]
        fn prop_gci_back_derivation_recovers_commission_pct(
            price in 10_000.0f64..5_000_000.0,
            pct in 0.0f64..10.0,
        ) {
            let r = edit(&TransactionRecord::blank(), "closedPrice", &format!("{price:.2}"));
            let r = edit(&r, "commissionPct", &format!("{pct}"));
            let gci = r.gci.to_string();
            let back = edit(&r, "gci", &gci);
            prop_assert!((back.commission_pct.number() - pct).abs() <= 0.01);
        }
    }
}
