//! Bottom-up roll-up of category values.
//!
//! A category's value is the sum of the enabled accounts attached directly to
//! it plus the values of its direct subcategories. Categories are processed
//! deepest first so every child is settled before its parent reads it.

use std::{collections::HashMap, time::Instant};

use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::errors::LedgerResult;

/// Parent relation of a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryLink {
    pub id: i64,
    pub parent_id: Option<i64>,
}

/// Outcome of a full aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollUpSummary {
    /// Categories whose value was recomputed.
    pub updated: usize,
    /// Categories not reachable from any root, left at zero.
    pub unreachable: usize,
}

fn children_of(links: &[CategoryLink]) -> HashMap<i64, Vec<i64>> {
    let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
    for link in links {
        if let Some(parent) = link.parent_id {
            children.entry(parent).or_default().push(link.id);
        }
    }
    children
}

/// Depth of every category reachable from a root (roots are depth 0).
pub fn depths(links: &[CategoryLink]) -> HashMap<i64, usize> {
    let children = children_of(links);
    let mut depths = HashMap::with_capacity(links.len());
    for root in links.iter().filter(|link| link.parent_id.is_none()) {
        assign_depth(root.id, 0, &children, &mut depths);
    }
    depths
}

fn assign_depth(
    id: i64,
    depth: usize,
    children: &HashMap<i64, Vec<i64>>,
    depths: &mut HashMap<i64, usize>,
) {
    if depths.insert(id, depth).is_some() {
        return;
    }
    for &child in children.get(&id).into_iter().flatten() {
        assign_depth(child, depth + 1, children, depths);
    }
}

/// Category ids sorted by depth, deepest first. Ties keep id order.
pub fn processing_order(links: &[CategoryLink]) -> Vec<i64> {
    let depths = depths(links);
    let mut order: Vec<(i64, usize)> = depths.into_iter().collect();
    order.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    order.into_iter().map(|(id, _)| id).collect()
}

/// Computes every reachable category's value from the per-category sums of
/// directly attached enabled accounts. Results come back in processing order.
pub fn roll_up(links: &[CategoryLink], direct_totals: &HashMap<i64, f64>) -> Vec<(i64, f64)> {
    let children = children_of(links);
    let mut values: HashMap<i64, f64> = HashMap::with_capacity(links.len());
    let mut out = Vec::with_capacity(links.len());

    for id in processing_order(links) {
        let own = direct_totals.get(&id).copied().unwrap_or(0.0);
        let value = children
            .get(&id)
            .into_iter()
            .flatten()
            .fold(own, |total, child| {
                total + values.get(child).copied().unwrap_or(0.0)
            });
        values.insert(id, value);
        out.push((id, value));
    }
    out
}

/// Resets and recomputes every stored category value.
pub fn recalculate(conn: &Connection) -> LedgerResult<RollUpSummary> {
    let started = Instant::now();
    conn.execute("UPDATE categories SET value = 0", [])?;

    let links = {
        let mut stmt = conn.prepare("SELECT id, parent_id FROM categories")?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryLink {
                id: row.get(0)?,
                parent_id: row.get(1)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    let direct_totals = {
        let mut stmt = conn.prepare(
            "SELECT category_id, SUM(value) FROM enabled_accounts GROUP BY category_id",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, f64>(1)?)))?;
        rows.collect::<Result<HashMap<_, _>, _>>()?
    };

    let values = roll_up(&links, &direct_totals);
    {
        let mut update = conn.prepare_cached("UPDATE categories SET value = ?1 WHERE id = ?2")?;
        for (id, value) in &values {
            update.execute(params![value, id])?;
        }
    }

    let summary = RollUpSummary {
        updated: values.len(),
        unreachable: links.len() - values.len(),
    };
    if summary.unreachable > 0 {
        warn!(
            unreachable = summary.unreachable,
            "Categories not connected to any root were left at zero"
        );
    }
    debug!(
        updated = summary.updated,
        elapsed_us = started.elapsed().as_micros() as u64,
        "Category values recalculated"
    );
    Ok(summary)
}
