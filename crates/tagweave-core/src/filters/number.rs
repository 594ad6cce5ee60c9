//! Numeric formatting

use super::{FilterCall, Table, insert};
use crate::value::Value;

pub(super) fn register(table: &mut Table) {
    insert(table, "number_format", number_format_filter);
    insert(table, "round", |v, call| {
        let Some(n) = v.as_number() else {
            return v;
        };
        let decimals = call.arg_usize(0).unwrap_or(0).min(15);
        let factor = 10f64.powi(decimals as i32);
        let rounded = (n * factor).round() / factor;
        if decimals == 0 {
            Value::Int(rounded as i64)
        } else {
            Value::Float(rounded)
        }
    });
    insert(table, "abs", |v, _| match v {
        Value::Int(i) => Value::Int(i.saturating_abs()),
        other => match other.as_number() {
            Some(n) => Value::Float(n.abs()),
            None => other,
        },
    });
}

/// `number_format(decimals=0, dec_point=".", thousands_sep=",")`
///
/// Non-numeric input passes through unchanged.
fn number_format_filter(value: Value, call: &FilterCall<'_>) -> Value {
    let Some(n) = value.as_number() else {
        return value;
    };
    let decimals = call.arg_usize(0).unwrap_or(0);
    let dec_point = call.arg_or(1, ".");
    let thousands_sep = call.arg_or(2, ",");
    Value::Str(number_format(n, decimals, dec_point, thousands_sep))
}

/// Format `n` with a fixed number of decimals and grouped thousands.
///
/// Rounds half away from zero.
pub fn number_format(n: f64, decimals: usize, dec_point: &str, thousands_sep: &str) -> String {
    let decimals = decimals.min(15);
    let factor = 10f64.powi(decimals as i32);
    let rounded = (n.abs() * factor).round() / factor;
    let fixed = format!("{:.*}", decimals, rounded);

    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 * thousands_sep.len());
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push_str(thousands_sep);
        }
        grouped.push(digit);
    }

    let mut out = String::new();
    if n < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push_str(dec_point);
        out.push_str(frac);
    }
    out
}
