//! Exhaustive search for the cheapest anvil combination order.
//!
//! Every permutation of the (pre-sorted) modifier list is reduced with a
//! balanced tournament of adjacent pairs and finally merged onto the target.
//! A permutation is abandoned as soon as one step exceeds the cost cap.

use crate::types::{Combine, Leaf, LeafItem, ModifierLevel, NodeId, OpNode};
use crate::xp;

/// A requested modifier with its multipliers already resolved against the
/// catalog and rule overlay.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) modifier: ModifierLevel,
    pub(crate) book_multiplier: u32,
    pub(crate) item_multiplier: u32,
}

impl Candidate {
    /// Sort key for the canonical input order.
    pub(crate) fn book_weight(&self) -> u64 {
        u64::from(self.modifier.level) * u64::from(self.book_multiplier)
    }
}

/// Result of a search, with node ids already assigned.
#[derive(Debug)]
pub(crate) struct SearchOutcome {
    /// The winning tree, or the bare target leaf when nothing was feasible.
    pub(crate) tree: OpNode,
    /// Sum of the step costs; 0 when nothing was feasible.
    pub(crate) total: u32,
    pub(crate) feasible: bool,
    pub(crate) orderings: usize,
    pub(crate) feasible_orderings: usize,
}

struct SearchContext<'a> {
    candidates: &'a [Candidate],
    target_label: &'a str,
    cost_cap: u32,
}

/// An item on the anvil during one candidate ordering.
struct WorkItem {
    /// Indices into the candidate list.
    modifiers: Vec<usize>,
    prior_work: u32,
    is_target: bool,
    node: OpNode,
}

struct Evaluated {
    total: u32,
    result: WorkItem,
}

/// Find the cheapest tree for `candidates`, which must already be in
/// canonical order.
pub(crate) fn search(candidates: &[Candidate], target_label: &str, cost_cap: u32) -> SearchOutcome {
    let ctx = SearchContext {
        candidates,
        target_label,
        cost_cap,
    };

    if candidates.is_empty() {
        return SearchOutcome {
            tree: ctx.target().node,
            total: 0,
            feasible: true,
            orderings: 1,
            feasible_orderings: 1,
        };
    }

    let (best, orderings, feasible_orderings) = evaluate_all(&ctx);

    match &best {
        Some(best) => log::debug!(
            "{target_label}: {orderings} orderings, {feasible_orderings} feasible, best total {}",
            best.total
        ),
        None => log::debug!(
            "{target_label}: {orderings} orderings, none within cost cap {cost_cap}"
        ),
    }

    let (mut tree, total, feasible) = match best {
        Some(best) => (best.result.node, best.total, true),
        None => (ctx.target().node, 0, false),
    };
    tree.assign_ids();

    SearchOutcome {
        tree,
        total,
        feasible,
        orderings,
        feasible_orderings,
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all(ctx: &SearchContext<'_>) -> (Option<Evaluated>, usize, usize) {
    select_best(Permutations::new(ctx.candidates.len()).map(|order| evaluate(ctx, &order)))
}

#[cfg(feature = "parallel")]
fn evaluate_all(ctx: &SearchContext<'_>) -> (Option<Evaluated>, usize, usize) {
    use rayon::prelude::*;

    let orders: Vec<Vec<usize>> = Permutations::new(ctx.candidates.len()).collect();
    // collect keeps permutation order, so ties still go to the first seen
    let results: Vec<Option<Evaluated>> =
        orders.par_iter().map(|order| evaluate(ctx, order)).collect();
    select_best(results.into_iter())
}

/// Strictly lower total wins; ties keep the earlier ordering.
fn select_best(
    results: impl Iterator<Item = Option<Evaluated>>,
) -> (Option<Evaluated>, usize, usize) {
    let mut best: Option<Evaluated> = None;
    let mut orderings = 0;
    let mut feasible = 0;
    for result in results {
        orderings += 1;
        let Some(candidate) = result else {
            continue;
        };
        feasible += 1;
        if best.as_ref().map_or(true, |b| candidate.total < b.total) {
            best = Some(candidate);
        }
    }
    (best, orderings, feasible)
}

fn evaluate(ctx: &SearchContext<'_>, order: &[usize]) -> Option<Evaluated> {
    let mut items: Vec<WorkItem> = order.iter().map(|&i| ctx.carrier(i)).collect();
    let mut total = 0_u64;

    while items.len() > 1 {
        let mut next = Vec::with_capacity(items.len().div_ceil(2));
        let mut iter = items.into_iter();
        while let Some(kept) = iter.next() {
            match iter.next() {
                Some(consumed) => {
                    let (merged, cost) = ctx.combine(kept, consumed)?;
                    total += u64::from(cost);
                    next.push(merged);
                }
                None => next.push(kept),
            }
        }
        items = next;
    }

    let carrier = items.pop()?;
    let (result, cost) = ctx.combine(ctx.target(), carrier)?;
    total += u64::from(cost);
    // a total that does not fit the reported level count is not a plan
    let total = u32::try_from(total).ok()?;
    Some(Evaluated { total, result })
}

impl SearchContext<'_> {
    fn target(&self) -> WorkItem {
        WorkItem {
            modifiers: Vec::new(),
            prior_work: 0,
            is_target: true,
            node: OpNode::Leaf(Leaf {
                id: NodeId::default(),
                label: self.target_label.to_owned(),
                item: LeafItem::Target,
            }),
        }
    }

    fn carrier(&self, index: usize) -> WorkItem {
        let modifier = self.candidates[index].modifier.clone();
        WorkItem {
            modifiers: vec![index],
            prior_work: 0,
            is_target: false,
            node: OpNode::Leaf(Leaf {
                id: NodeId::default(),
                label: modifier.book_label(),
                item: LeafItem::Book(modifier),
            }),
        }
    }

    fn step_cost(&self, kept: &WorkItem, consumed: &WorkItem) -> u64 {
        let transferred: u64 = consumed
            .modifiers
            .iter()
            .map(|&i| {
                let c = &self.candidates[i];
                let multiplier = if consumed.is_target {
                    c.item_multiplier
                } else {
                    c.book_multiplier
                };
                u64::from(c.modifier.level) * u64::from(multiplier)
            })
            .fold(0, u64::saturating_add);
        xp::penalty(kept.prior_work)
            .saturating_add(xp::penalty(consumed.prior_work))
            .saturating_add(transferred)
    }

    /// Merge `consumed` into `kept`, or `None` if the step is over the cap.
    fn combine(&self, kept: WorkItem, consumed: WorkItem) -> Option<(WorkItem, u32)> {
        let cost = self.step_cost(&kept, &consumed);
        if cost > u64::from(self.cost_cap) {
            return None;
        }
        let cost = u32::try_from(cost).ok()?;

        let mut modifiers = kept.modifiers;
        modifiers.extend_from_slice(&consumed.modifiers);
        let prior_work = kept.prior_work.max(consumed.prior_work) + 1;
        let label = if kept.is_target {
            kept.node.label().to_owned()
        } else {
            "Book".to_owned()
        };
        let names = modifiers
            .iter()
            .map(|&i| self.candidates[i].modifier.to_string())
            .collect();

        let node = OpNode::Combine(Combine {
            id: NodeId::default(),
            kept: Box::new(kept.node),
            consumed: Box::new(consumed.node),
            cost,
            points: xp::points_for_level(cost),
            prior_work,
            label,
            modifiers: names,
        });

        Some((
            WorkItem {
                modifiers,
                prior_work,
                is_target: kept.is_target,
                node,
            },
            cost,
        ))
    }
}

/// Lexicographic permutations of `0..n`, starting from the identity.
pub(crate) struct Permutations {
    next: Option<Vec<usize>>,
}

impl Permutations {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            next: Some((0..n).collect()),
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let mut following = current.clone();
        if advance(&mut following) {
            self.next = Some(following);
        }
        Some(current)
    }
}

/// Rearrange into the next lexicographic permutation; false when `perm` was
/// the last one.
fn advance(perm: &mut [usize]) -> bool {
    if perm.len() < 2 {
        return false;
    }
    let mut i = perm.len() - 1;
    while i > 0 && perm[i - 1] >= perm[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = perm.len() - 1;
    while perm[j] <= perm[i - 1] {
        j -= 1;
    }
    perm.swap(i - 1, j);
    perm[i..].reverse();
    true
}
