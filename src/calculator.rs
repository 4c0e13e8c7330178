//! Commission derivation: a record snapshot in, every derived amount out.
//!
//! Pure and total. Blank or malformed numeric entries count as 0 and pinned
//! derived fields replace their formula. Nothing is rounded until the end.

use crate::fmt::{parse_number_opt, round_cents};
use crate::models::{Brokerage, DerivedField, TransactionRecord, TransactionType};

pub const KW_ROYALTY_RATE: f64 = 0.06;
pub const KW_COMPANY_DOLLAR_RATE: f64 = 0.10;
pub const BDH_PRE_SPLIT_RATE: f64 = 0.06;
pub const BDH_DEFAULT_SPLIT_PCT: f64 = 94.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedFields {
    pub gci: f64,
    pub referral_dollar: f64,
    pub adjusted_gci: f64,
    pub royalty: f64,
    pub company_dollar: f64,
    pub pre_split_deduction: f64,
    /// BDH only: the agent's share of Adjusted GCI after the pre-split.
    pub agent_split: f64,
    /// BDH only: what the brokerage keeps of Adjusted GCI.
    pub brokerage_portion: f64,
    pub total_brokerage_fees: f64,
    pub nci: f64,
    pub net_volume: f64,
}

impl DerivedFields {
    pub fn get(&self, field: DerivedField) -> f64 {
        match field {
            DerivedField::Gci => self.gci,
            DerivedField::ReferralDollar => self.referral_dollar,
            DerivedField::AdjustedGci => self.adjusted_gci,
            DerivedField::Royalty => self.royalty,
            DerivedField::CompanyDollar => self.company_dollar,
            DerivedField::PreSplitDeduction => self.pre_split_deduction,
            DerivedField::TotalBrokerageFees => self.total_brokerage_fees,
            DerivedField::Nci => self.nci,
        }
    }

    fn rounded(self) -> Self {
        Self {
            gci: round_cents(self.gci),
            referral_dollar: round_cents(self.referral_dollar),
            adjusted_gci: round_cents(self.adjusted_gci),
            royalty: round_cents(self.royalty),
            company_dollar: round_cents(self.company_dollar),
            pre_split_deduction: round_cents(self.pre_split_deduction),
            agent_split: round_cents(self.agent_split),
            brokerage_portion: round_cents(self.brokerage_portion),
            total_brokerage_fees: round_cents(self.total_brokerage_fees),
            nci: round_cents(self.nci),
            net_volume: round_cents(self.net_volume),
        }
    }
}

pub fn compute(record: &TransactionRecord) -> DerivedFields {
    let closed_price = record.closed_price.number();
    let commission_pct = record.commission_pct.number();
    let referral_pct = record.referral_pct.number();
    let referral_fee_received = record.referral_fee_received.number();

    let (gci, referral_dollar, adjusted_gci) = match record.transaction_type {
        TransactionType::ReferralReceived => {
            let gci = record
                .pinned(DerivedField::Gci)
                .unwrap_or(referral_fee_received);
            let referral_dollar = record.pinned(DerivedField::ReferralDollar).unwrap_or(0.0);
            let adjusted_gci = record.pinned(DerivedField::AdjustedGci).unwrap_or(gci);
            (gci, referral_dollar, adjusted_gci)
        }
        TransactionType::Sale | TransactionType::ReferralPaid => {
            let gci = record
                .pinned(DerivedField::Gci)
                .unwrap_or(closed_price * commission_pct / 100.0);
            let referral_dollar = record.pinned(DerivedField::ReferralDollar).unwrap_or(
                if referral_pct > 0.0 {
                    gci * referral_pct / 100.0
                } else {
                    0.0
                },
            );
            let adjusted_gci = record
                .pinned(DerivedField::AdjustedGci)
                .unwrap_or(gci - referral_dollar);
            (gci, referral_dollar, adjusted_gci)
        }
    };

    let mut out = DerivedFields {
        gci,
        referral_dollar,
        adjusted_gci,
        net_volume: closed_price,
        ..DerivedFields::default()
    };

    let fees = match &record.brokerage {
        Brokerage::Kw => kw_fees(record, &mut out),
        Brokerage::Bdh => bdh_fees(record, &mut out),
        Brokerage::Other(_) | Brokerage::Unset => 0.0,
    };
    out.total_brokerage_fees = record
        .pinned(DerivedField::TotalBrokerageFees)
        .unwrap_or(fees);
    out.nci = record
        .pinned(DerivedField::Nci)
        .unwrap_or(out.adjusted_gci - out.total_brokerage_fees);

    out.rounded()
}

fn kw_fees(record: &TransactionRecord, out: &mut DerivedFields) -> f64 {
    out.royalty = record
        .pinned(DerivedField::Royalty)
        .unwrap_or(out.adjusted_gci * KW_ROYALTY_RATE);
    out.company_dollar = record
        .pinned(DerivedField::CompanyDollar)
        .unwrap_or(out.adjusted_gci * KW_COMPANY_DOLLAR_RATE);

    record.eo.number()
        + out.royalty
        + out.company_dollar
        + record.hoa_transfer.number()
        + record.home_warranty.number()
        + record.kw_cares.number()
        + record.kw_next_gen.number()
        + record.bold_scholarship.number()
        + record.tc_concierge.number()
        + record.jelmberg_team.number()
        + record.other_deductions.number()
        + record.buyers_agent_split.number()
}

/// Agent split and brokerage portion of a BDH deal, unrounded.
/// A blank or non-numeric `bdhSplitPct` means the default split.
pub fn bdh_split(record: &TransactionRecord, adjusted_gci: f64, pre_split: f64) -> (f64, f64) {
    let split_pct = parse_number_opt(record.bdh_split_pct.as_str()).unwrap_or(BDH_DEFAULT_SPLIT_PCT);
    let agent_split = (adjusted_gci - pre_split) * split_pct / 100.0;
    (agent_split, adjusted_gci - agent_split)
}

fn bdh_fees(record: &TransactionRecord, out: &mut DerivedFields) -> f64 {
    out.pre_split_deduction = record
        .pinned(DerivedField::PreSplitDeduction)
        .unwrap_or(out.adjusted_gci * BDH_PRE_SPLIT_RATE);

    (out.agent_split, out.brokerage_portion) =
        bdh_split(record, out.adjusted_gci, out.pre_split_deduction);

    out.pre_split_deduction
        + out.brokerage_portion
        + record.asf.number()
        + record.foundation_10.number()
        + record.admin_fee.number()
        + record.other_deductions.number()
        + record.buyers_agent_split.number()
}
