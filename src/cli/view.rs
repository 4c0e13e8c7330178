use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::calculator::bdh_split;
use crate::db::StoredRecord;
use crate::fmt::{money, parse_number, percent};
use crate::models::{Brokerage, DerivedField, FormValue, TransactionRecord, TransactionType};
use crate::summary::{Summary, Totals};

fn signed(val: f64) -> String {
    if val < 0.0 {
        money(val).red().to_string()
    } else {
        money(val)
    }
}

fn derived_row(table: &mut Table, record: &TransactionRecord, field: DerivedField) {
    let value = money(record.derived(field).number());
    let value = if record.overrides.is_pinned(field) {
        format!("{value} {}", "(pinned)".yellow())
    } else {
        value
    };
    table.add_row(vec![Cell::new(field.label()), Cell::new(value)]);
}

fn amount_row(table: &mut Table, label: &str, value: &FormValue) {
    if !value.is_blank() {
        table.add_row(vec![Cell::new(label), Cell::new(money(value.number()))]);
    }
}

/// Commission breakdown of one record, brokerage-specific rows included.
pub fn format_breakdown(record: &TransactionRecord) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Amount"]);

    let brokerage = match &record.brokerage {
        Brokerage::Unset => "(none)".to_string(),
        b => b.label().to_string(),
    };
    table.add_row(vec![Cell::new("Brokerage"), Cell::new(brokerage)]);
    table.add_row(vec![
        Cell::new("Type"),
        Cell::new(record.transaction_type.name()),
    ]);
    if !record.client_name.is_blank() {
        table.add_row(vec![Cell::new("Client"), Cell::new(&record.client_name)]);
    }

    table.add_row(vec![
        Cell::new("Net Volume"),
        Cell::new(money(record.net_volume.number())),
    ]);
    match record.transaction_type {
        TransactionType::ReferralReceived => {
            amount_row(&mut table, "Referral Fee Received", &record.referral_fee_received);
        }
        TransactionType::Sale | TransactionType::ReferralPaid => {
            table.add_row(vec![
                Cell::new("Commission %"),
                Cell::new(format!("{}%", percent(parse_number(record.commission_pct.as_str())))),
            ]);
        }
    }

    derived_row(&mut table, record, DerivedField::Gci);
    derived_row(&mut table, record, DerivedField::ReferralDollar);
    derived_row(&mut table, record, DerivedField::AdjustedGci);

    match &record.brokerage {
        Brokerage::Kw => {
            derived_row(&mut table, record, DerivedField::Royalty);
            derived_row(&mut table, record, DerivedField::CompanyDollar);
            amount_row(&mut table, "E&O", &record.eo);
            amount_row(&mut table, "HOA Transfer", &record.hoa_transfer);
            amount_row(&mut table, "Home Warranty", &record.home_warranty);
            amount_row(&mut table, "KW Cares", &record.kw_cares);
            amount_row(&mut table, "KW NextGen", &record.kw_next_gen);
            amount_row(&mut table, "BOLD Scholarship", &record.bold_scholarship);
            amount_row(&mut table, "TC Concierge", &record.tc_concierge);
            amount_row(&mut table, "Jelmberg Team", &record.jelmberg_team);
        }
        Brokerage::Bdh => {
            // From the stored amounts, so a reloaded pin still adds up.
            let (agent_split, brokerage_portion) = bdh_split(
                record,
                record.adjusted_gci.number(),
                record.pre_split_deduction.number(),
            );
            derived_row(&mut table, record, DerivedField::PreSplitDeduction);
            table.add_row(vec![Cell::new("Agent Split"), Cell::new(money(agent_split))]);
            table.add_row(vec![
                Cell::new("Brokerage Portion"),
                Cell::new(money(brokerage_portion)),
            ]);
            amount_row(&mut table, "ASF", &record.asf);
            amount_row(&mut table, "Foundation 10", &record.foundation_10);
            amount_row(&mut table, "Admin Fee", &record.admin_fee);
        }
        Brokerage::Other(_) | Brokerage::Unset => {}
    }
    if !matches!(record.brokerage, Brokerage::Other(_) | Brokerage::Unset) {
        amount_row(&mut table, "Other Deductions", &record.other_deductions);
        amount_row(&mut table, "Buyer's Agent Split", &record.buyers_agent_split);
    }

    derived_row(&mut table, record, DerivedField::TotalBrokerageFees);

    let nci = record.nci.number();
    let nci_cell = if record.overrides.is_pinned(DerivedField::Nci) {
        format!("{} {}", signed(nci), "(pinned)".yellow())
    } else {
        signed(nci)
    };
    table.add_row(vec![Cell::new("NCI".bold()), Cell::new(nci_cell)]);

    table.to_string()
}

fn totals_cells(label: String, totals: &Totals) -> Vec<Cell> {
    vec![
        Cell::new(label),
        Cell::new(totals.count),
        Cell::new(money(totals.volume)),
        Cell::new(money(totals.gci)),
        Cell::new(money(totals.brokerage_fees)),
        Cell::new(signed(totals.nci)),
    ]
}

pub fn format_list(rows: &[StoredRecord], totals: &Totals) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Closing", "Client", "Brokerage", "Type", "Volume", "GCI", "Fees", "NCI",
    ]);
    for stored in rows {
        let r = &stored.record;
        table.add_row(vec![
            Cell::new(stored.id),
            Cell::new(&r.closing_date),
            Cell::new(&r.client_name),
            Cell::new(r.brokerage.label()),
            Cell::new(r.transaction_type.name()),
            Cell::new(money(r.net_volume.number())),
            Cell::new(money(r.gci.number())),
            Cell::new(money(r.total_brokerage_fees.number())),
            Cell::new(signed(r.nci.number())),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(format!("{} records", totals.count)),
        Cell::new(""),
        Cell::new(""),
        Cell::new(money(totals.volume)),
        Cell::new(money(totals.gci)),
        Cell::new(money(totals.brokerage_fees)),
        Cell::new(signed(totals.nci)),
    ]);
    table.to_string()
}

pub fn format_summary(summary: &Summary) -> String {
    let header = vec!["", "Deals", "Volume", "GCI", "Fees", "NCI"];

    let mut by_brokerage = Table::new();
    by_brokerage.set_header(header.clone());
    for (label, totals) in &summary.by_brokerage {
        by_brokerage.add_row(totals_cells(label.clone(), totals));
    }
    by_brokerage.add_row(totals_cells("Total".bold().to_string(), &summary.overall));

    let mut by_type = Table::new();
    by_type.set_header(header);
    for (kind, totals) in &summary.by_type {
        by_type.add_row(totals_cells(kind.name().to_string(), totals));
    }

    format!("By brokerage\n{by_brokerage}\n\nBy type\n{by_type}")
}
