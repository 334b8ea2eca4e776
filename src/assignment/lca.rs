use std::collections::BTreeSet;

use crate::core::lineage::{Lineage, TaxonomicAssignment};
use crate::core::types::Rank;

/// Lowest common ancestor of a set of lineages.
///
/// Ranks are walked top-down. A rank shared by every lineage that sets it is
/// kept; the walk stops at the first rank where lineages disagree. Ranks that
/// no lineage sets are skipped. A single lineage is returned unchanged and an
/// empty input yields an empty lineage.
pub fn lineage_lca<'l, I>(lineages: I) -> Lineage
where
    I: IntoIterator<Item = &'l Lineage>,
{
    let lineages: Vec<&Lineage> = lineages.into_iter().collect();
    match lineages.as_slice() {
        [] => return Lineage::default(),
        [single] => return (*single).clone(),
        _ => {}
    }

    let mut consensus = Lineage::default();
    for rank in Rank::ALL {
        let distinct: BTreeSet<&str> = lineages.iter().filter_map(|l| l.get(rank)).collect();
        let mut values = distinct.into_iter();
        match (values.next(), values.next()) {
            (Some(value), None) => consensus.set(rank, value),
            (Some(_), Some(_)) => break,
            (None, _) => {}
        }
    }
    consensus
}

/// Lowest common ancestor of the lineages of several candidate assignments
pub fn lowest_common_ancestor(assignments: &[TaxonomicAssignment]) -> Lineage {
    lineage_lca(assignments.iter().map(|a| &a.lineage))
}
