//! Locale-aware rendering of ledger amounts and report dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number and date formatting preferences for reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LocaleConfig {
    pub decimal_separator: char,
    pub grouping_separator: char,
    /// Digits after the decimal separator.
    pub precision: u8,
    pub date_format: DateFormatStyle,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
            precision: 2,
            date_format: DateFormatStyle::Long,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DateFormatStyle {
    Short,
    Medium,
    Long,
}

/// Formats an amount using the locale's precision.
pub fn format_amount(locale: &LocaleConfig, value: f64) -> String {
    format_number(locale, value, locale.precision)
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let mut body = format!("{:.*}", precision as usize, value.abs());
    if locale.decimal_separator != '.' {
        if let Some(pos) = body.find('.') {
            body.replace_range(pos..=pos, &locale.decimal_separator.to_string());
        }
    }
    body = match body.find(locale.decimal_separator) {
        Some(pos) => format!(
            "{}{}",
            group_digits(&body[..pos], locale.grouping_separator),
            &body[pos..]
        ),
        None => group_digits(&body, locale.grouping_separator),
    };
    // Rounds-to-zero values such as -0.001 print without a sign.
    if value < 0.0 && body.chars().any(|ch| ch.is_ascii_digit() && ch != '0') {
        body.insert(0, '-');
    }
    body
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

pub fn format_date(locale: &LocaleConfig, date: NaiveDate) -> String {
    match locale.date_format {
        DateFormatStyle::Short => date.format("%Y-%m-%d").to_string(),
        DateFormatStyle::Medium => format!(
            "{:02} {} {}",
            date.day(),
            &month_label(date.month())[..3],
            date.year()
        ),
        DateFormatStyle::Long => format!(
            "{} {}, {}",
            month_label(date.month()),
            date.day(),
            date.year()
        ),
    }
}

fn month_label(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
