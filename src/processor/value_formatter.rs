//! Currency and count formatting for KPI cards.
//!
//! Amounts use `,` as thousands separator and `.` as decimal point. Rounding
//! is half away from zero. Negative amounts are formatted on their absolute
//! value with a leading `-`, unless they round to zero.

use crate::models::{KpiCard, KpiCards, Kpis};

const CURRENCY: &str = "R$";

/// Abbreviated currency: `R$ 2.5 mi`, `R$ 2 mil`, `R$ 999.00`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{} -", CURRENCY);
    }

    let sign = sign_of(amount);
    let value = amount.abs();

    let body = if value >= 1_000_000.0 {
        format!("{} mi", format_fixed(value / 1_000_000.0, 1))
    } else if value >= 1_000.0 {
        format!("{} mil", format_fixed(value / 1_000.0, 0))
    } else {
        group_thousands(value, 2)
    };

    format!("{}{} {}", sign, CURRENCY, body)
}

/// Plain currency with two decimals and thousands separators, never abbreviated.
pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{} -", CURRENCY);
    }

    format!("{}{} {}", sign_of(amount), CURRENCY, group_thousands(amount.abs(), 2))
}

/// Unit counts print as integers when whole.
pub fn format_units(units: f64) -> String {
    if units.fract() == 0.0 && units.is_finite() {
        format!("{:.0}", units)
    } else {
        units.to_string()
    }
}

pub fn kpi_cards(kpis: &Kpis) -> KpiCards {
    KpiCards {
        total_revenue: card("Receita Total", format_currency(kpis.total_revenue)),
        total_units: card("Total de Vendas", format_units(kpis.total_units)),
        total_profit: card("Lucro Total", format_currency(kpis.total_profit)),
        average_ticket: card("Ticket Médio", format_money(kpis.average_ticket)),
    }
}

fn card(label: &str, value: String) -> KpiCard {
    KpiCard {
        label: label.to_string(),
        value,
    }
}

// Amounts below 1,000 show two decimals; anything larger can't round to zero.
fn sign_of(amount: f64) -> &'static str {
    if amount < 0.0 && round_half_up(amount.abs(), 2) != 0.0 {
        "-"
    } else {
        ""
    }
}

fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

fn format_fixed(value: f64, decimals: usize) -> String {
    let rounded = round_half_up(value, decimals as i32);
    format!("{:.*}", decimals, rounded)
}

// Expects a non-negative value.
fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format_fixed(value, decimals);
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, dec)) => (int, Some(dec)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer_part.len() + integer_part.len() / 3);
    for (i, c) in integer_part.chars().enumerate() {
        if i > 0 && (integer_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match decimal_part {
        Some(dec) => format!("{}.{}", grouped, dec),
        None => grouped,
    }
}
