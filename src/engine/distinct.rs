//! Assignment of approvals to the groups of an `and-distinct` rule.
//!
//! Each group is expanded into one slot per required approval. An approval
//! may fill at most one slot, and only a slot whose candidates include it.

/// A group of candidate logins and how many distinct approvals it needs.
#[derive(Debug, Clone)]
pub struct DistinctGroup {
    pub candidates: Vec<String>,
    pub min_approvals: usize,
}

fn expand_slots(groups: &[DistinctGroup]) -> Vec<&[String]> {
    groups
        .iter()
        .flat_map(|group| std::iter::repeat_n(group.candidates.as_slice(), group.min_approvals))
        .collect()
}

/// True if every slot of every group can be filled by a different approval.
pub fn can_assign(groups: &[DistinctGroup], approvals: &[String]) -> bool {
    let slots = expand_slots(groups);
    if slots.is_empty() {
        return true;
    }
    if slots.len() > approvals.len() {
        return false;
    }

    if rotation_search(&slots, approvals) {
        tracing::debug!("Found a distinct assignment by rotating the approvals");
        return true;
    }

    let matched = augmenting_match(&slots, approvals);
    if matched {
        tracing::debug!("Found a distinct assignment by augmenting paths");
    }
    matched
}

/// Walk the approvals ring from every offset, letting each approval take the
/// first open slot that accepts it.
fn rotation_search(slots: &[&[String]], approvals: &[String]) -> bool {
    let n = approvals.len();
    for offset in 0..n {
        let mut open = vec![true; slots.len()];
        let mut remaining = slots.len();
        for step in 0..n {
            let approval = &approvals[(offset + step) % n];
            let slot = (0..slots.len()).find(|&i| open[i] && slots[i].contains(approval));
            if let Some(i) = slot {
                open[i] = false;
                remaining -= 1;
                if remaining == 0 {
                    return true;
                }
            }
        }
    }
    false
}

/// Maximum bipartite matching between slots and approvals.
fn augmenting_match(slots: &[&[String]], approvals: &[String]) -> bool {
    // owner[a] is the slot approval `a` currently fills
    let mut owner: Vec<Option<usize>> = vec![None; approvals.len()];
    for slot in 0..slots.len() {
        let mut visited = vec![false; approvals.len()];
        if !try_fill(slot, slots, approvals, &mut visited, &mut owner) {
            return false;
        }
    }
    true
}

fn try_fill(
    slot: usize,
    slots: &[&[String]],
    approvals: &[String],
    visited: &mut [bool],
    owner: &mut [Option<usize>],
) -> bool {
    for (a, approval) in approvals.iter().enumerate() {
        if visited[a] || !slots[slot].contains(approval) {
            continue;
        }
        visited[a] = true;
        let free = match owner[a] {
            None => true,
            Some(other) => try_fill(other, slots, approvals, visited, owner),
        };
        if free {
            owner[a] = Some(slot);
            return true;
        }
    }
    false
}
