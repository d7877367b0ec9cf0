use std::fmt::Write as _;
use std::io;

use chrono::NaiveDate;
use serde::Serialize;

use super::TreeSource;
use crate::{
    currency::{format_amount, format_date, LocaleConfig},
    errors::LedgerResult,
    ledger::CompositeNode,
};

const INDENT: &str = "  ";

/// Assets and liabilities trees captured together for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheet {
    pub as_of: NaiveDate,
    pub assets: CompositeNode,
    pub liabilities: CompositeNode,
}

impl BalanceSheet {
    pub fn new(as_of: NaiveDate, assets: CompositeNode, liabilities: CompositeNode) -> Self {
        Self {
            as_of,
            assets,
            liabilities,
        }
    }

    /// Reads both trees from `source`; each read is freshly recomputed.
    pub fn from_source(
        source: &dyn TreeSource,
        assets: &str,
        liabilities: &str,
        as_of: NaiveDate,
    ) -> LedgerResult<Self> {
        Ok(Self::new(
            as_of,
            source.category_tree(assets)?,
            source.category_tree(liabilities)?,
        ))
    }

    pub fn net_worth(&self) -> f64 {
        self.assets.value() - self.liabilities.value()
    }

    /// Indented report: one line per node, then the net worth.
    pub fn render(&self, locale: &LocaleConfig) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Balance Sheet (as of {})", format_date(locale, self.as_of));
        render_composite(&mut out, &self.assets, locale);
        render_composite(&mut out, &self.liabilities, locale);
        let _ = writeln!(out, "Net Worth: {}", format_amount(locale, self.net_worth()));
        out
    }

    pub fn write_to(&self, writer: &mut impl io::Write, locale: &LocaleConfig) -> io::Result<()> {
        writer.write_all(self.render(locale).as_bytes())
    }
}

/// Appends `tree` with two spaces of indentation per level.
pub fn render_composite(out: &mut String, tree: &CompositeNode, locale: &LocaleConfig) {
    for (depth, node) in tree.flatten() {
        let _ = writeln!(
            out,
            "{}{}: {}",
            INDENT.repeat(depth),
            node.name(),
            format_amount(locale, node.value())
        );
    }
}
