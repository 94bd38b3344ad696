// ============================================================================
// Directory Core - Menu Tree Assembler
// File: crates/directory-core/src/services/menu_tree.rs
// Description: Flat menu rows -> sorted display forest, plus a lint pass
// ============================================================================
//! Turns the flat rows of one location into a forest of [`DisplayMenuItem`].
//!
//! Assembly never fails. Rows whose parent cannot be resolved (missing,
//! self-referencing, or caught in a parent cycle) are placed at the root
//! level instead, so every input row appears in the output exactly once.
//! [`lint_items`] reports those rows for admin tooling. Rows nested below
//! `MAX_MENU_DEPTH` are lifted to the root level as well.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use directory_shared::constants::MAX_MENU_DEPTH;

use crate::domain::{DisplayMenuItem, MenuItem};

/// Build the display forest for one location.
///
/// The caller pre-filters `items` by location. Siblings are sorted by
/// `order` (missing = 0), then by `id`.
pub fn build_tree(items: &[MenuItem]) -> Vec<DisplayMenuItem> {
    if items.is_empty() {
        return Vec::new();
    }

    // Pass 1: index rows by id. First occurrence wins on duplicate ids.
    let mut index: HashMap<Uuid, usize> = HashMap::with_capacity(items.len());
    for (pos, item) in items.iter().enumerate() {
        if let Entry::Vacant(slot) = index.entry(item.id) {
            slot.insert(pos);
        } else {
            warn!("Duplicate menu item id {} in assembler input", item.id);
        }
    }

    // Pass 2: attach each row to its parent or make it a root.
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots: Vec<usize> = Vec::new();
    for (pos, item) in items.iter().enumerate() {
        match resolve_parent(item, pos, &index) {
            Some(parent_pos) => children.entry(parent_pos).or_default().push(pos),
            None => roots.push(pos),
        }
    }

    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| compare_rows(items, *a, *b));
    }
    roots.sort_by(|a, b| compare_rows(items, *a, *b));

    let mut visited = vec![false; items.len()];
    let mut deferred: Vec<usize> = Vec::new();
    let mut forest: Vec<DisplayMenuItem> = roots
        .iter()
        .filter_map(|&root| assemble(root, 1, items, &children, &mut visited, &mut deferred))
        .collect();
    let mut promoted = lift_deferred(&mut forest, items, &children, &mut visited, &mut deferred);

    // Rows still unvisited only hang off each other (parent cycles). Break
    // each cycle at its smallest member and attach the rest beneath it.
    let mut parents: Option<HashMap<Uuid, Option<Uuid>>> = None;
    while let Some(pos) = next_cycle_break(items, &visited, &mut parents) {
        warn!(
            "Menu item {} is part of a parent cycle, promoting it to root",
            items[pos].id
        );
        if let Some(node) = assemble(pos, 1, items, &children, &mut visited, &mut deferred) {
            forest.push(node);
        }
        lift_deferred(&mut forest, items, &children, &mut visited, &mut deferred);
        promoted = true;
    }

    if promoted {
        forest.sort_by(compare_display);
    }

    forest
}

/// Assemble rows that sat below `MAX_MENU_DEPTH` as new roots.
fn lift_deferred(
    forest: &mut Vec<DisplayMenuItem>,
    items: &[MenuItem],
    children: &HashMap<usize, Vec<usize>>,
    visited: &mut [bool],
    deferred: &mut Vec<usize>,
) -> bool {
    let mut lifted = false;
    while let Some(pos) = deferred.pop() {
        warn!(
            "Menu item {} is nested deeper than {} levels, lifting it to root",
            items[pos].id, MAX_MENU_DEPTH
        );
        if let Some(node) = assemble(pos, 1, items, children, visited, deferred) {
            forest.push(node);
            lifted = true;
        }
    }
    lifted
}

fn next_cycle_break(
    items: &[MenuItem],
    visited: &[bool],
    parents: &mut Option<HashMap<Uuid, Option<Uuid>>>,
) -> Option<usize> {
    let unvisited: Vec<usize> = (0..items.len()).filter(|&pos| !visited[pos]).collect();
    if unvisited.is_empty() {
        return None;
    }

    let parents = parents.get_or_insert_with(|| {
        let mut map = HashMap::with_capacity(items.len());
        for item in items {
            map.entry(item.id).or_insert(item.parent_id);
        }
        map
    });

    let parents: &HashMap<Uuid, Option<Uuid>> = parents;
    unvisited
        .iter()
        .copied()
        .filter(|&pos| is_on_cycle(items[pos].id, parents))
        .min_by(|a, b| compare_rows(items, *a, *b))
        .or_else(|| {
            unvisited
                .iter()
                .copied()
                .min_by(|a, b| compare_rows(items, *a, *b))
        })
}

fn resolve_parent(item: &MenuItem, pos: usize, index: &HashMap<Uuid, usize>) -> Option<usize> {
    let parent_id = item.parent_id?;
    if parent_id == item.id {
        warn!("Menu item {} references itself as parent, treating as root", item.id);
        return None;
    }
    match index.get(&parent_id) {
        Some(&parent_pos) if parent_pos != pos => Some(parent_pos),
        _ => {
            debug!(
                "Menu item {} has unknown parent {}, treating as root",
                item.id, parent_id
            );
            None
        }
    }
}

/// Depth-first assembly; recursion stops at `MAX_MENU_DEPTH` and the rows
/// below are queued on `deferred` instead.
fn assemble(
    pos: usize,
    depth: usize,
    items: &[MenuItem],
    children: &HashMap<usize, Vec<usize>>,
    visited: &mut [bool],
    deferred: &mut Vec<usize>,
) -> Option<DisplayMenuItem> {
    if visited[pos] {
        return None;
    }
    visited[pos] = true;

    let mut node = DisplayMenuItem::from(&items[pos]);
    if let Some(kids) = children.get(&pos) {
        if depth >= MAX_MENU_DEPTH {
            deferred.extend(kids.iter().copied().filter(|&kid| !visited[kid]));
        } else {
            node.children = kids
                .iter()
                .filter_map(|&kid| assemble(kid, depth + 1, items, children, visited, deferred))
                .collect();
        }
    }
    Some(node)
}

fn compare_rows(items: &[MenuItem], a: usize, b: usize) -> Ordering {
    let (left, right) = (&items[a], &items[b]);
    left.effective_order()
        .cmp(&right.effective_order())
        .then_with(|| left.id.cmp(&right.id))
        .then_with(|| a.cmp(&b))
}

fn compare_display(a: &DisplayMenuItem, b: &DisplayMenuItem) -> Ordering {
    a.effective_order()
        .cmp(&b.effective_order())
        .then_with(|| a.id.cmp(&b.id))
}

/// A row the assembler had to demote or could not place as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MenuItemIssue {
    /// Parent id does not match any row of the same location.
    Orphan { item_id: Uuid, missing_parent_id: Uuid },
    SelfParent { item_id: Uuid },
    /// Row sits on a parent cycle (A -> B -> A).
    Cycle { item_id: Uuid },
    DuplicateId { item_id: Uuid },
}

impl MenuItemIssue {
    pub fn item_id(&self) -> Uuid {
        match self {
            MenuItemIssue::Orphan { item_id, .. }
            | MenuItemIssue::SelfParent { item_id }
            | MenuItemIssue::Cycle { item_id }
            | MenuItemIssue::DuplicateId { item_id } => *item_id,
        }
    }
}

/// Report every row `build_tree` would silently degrade. Never mutates.
pub fn lint_items(items: &[MenuItem]) -> Vec<MenuItemIssue> {
    let mut issues = Vec::new();
    let mut seen: HashSet<Uuid> = HashSet::with_capacity(items.len());
    let mut parents: HashMap<Uuid, Option<Uuid>> = HashMap::with_capacity(items.len());

    for item in items {
        if !seen.insert(item.id) {
            issues.push(MenuItemIssue::DuplicateId { item_id: item.id });
            continue;
        }
        parents.insert(item.id, item.parent_id);
    }

    for item in items {
        let Some(parent_id) = item.parent_id else {
            continue;
        };
        if parent_id == item.id {
            issues.push(MenuItemIssue::SelfParent { item_id: item.id });
        } else if !parents.contains_key(&parent_id) {
            issues.push(MenuItemIssue::Orphan {
                item_id: item.id,
                missing_parent_id: parent_id,
            });
        } else if is_on_cycle(item.id, &parents) {
            issues.push(MenuItemIssue::Cycle { item_id: item.id });
        }
    }

    issues
}

/// True when walking parent links from `id` leads back to `id`.
fn is_on_cycle(id: Uuid, parents: &HashMap<Uuid, Option<Uuid>>) -> bool {
    let mut current = parents.get(&id).copied().flatten();
    // A chain longer than the row count has already looped elsewhere.
    for _ in 0..parents.len() {
        match current {
            Some(next) if next == id => return true,
            Some(next) => {
                let parent = parents.get(&next).copied().flatten();
                if parent == Some(next) {
                    return false;
                }
                current = parent;
            }
            None => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn row(n: u128, parent: Option<u128>, order: Option<i32>, label: &str) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: id(n),
            menu_id: id(1000),
            parent_id: parent.map(id),
            label: label.to_string(),
            url: "#".to_string(),
            target: None,
            order,
            created_at: now,
            updated_at: now,
        }
    }

    fn collect_ids(forest: &[DisplayMenuItem], out: &mut Vec<Uuid>) {
        for node in forest {
            out.push(node.id);
            collect_ids(&node.children, out);
        }
    }

    fn labels(forest: &[DisplayMenuItem]) -> Vec<&str> {
        forest.iter().map(|n| n.label.as_str()).collect()
    }

    #[test]
    fn test_empty_input_builds_empty_forest() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn test_every_item_appears_exactly_once() {
        let items = vec![
            row(1, None, Some(0), "Home"),
            row(2, Some(1), Some(2), "About"),
            row(3, Some(1), Some(1), "Team"),
            row(4, Some(3), None, "Careers"),
            row(5, None, Some(1), "Contact"),
            row(6, Some(42), Some(3), "Orphan"),
        ];
        let forest = build_tree(&items);

        let mut ids = Vec::new();
        collect_ids(&forest, &mut ids);
        assert_eq!(ids.len(), items.len());
        let unique: HashSet<Uuid> = ids.iter().copied().collect();
        assert_eq!(unique.len(), items.len());
        assert_eq!(forest.iter().map(DisplayMenuItem::node_count).sum::<usize>(), 6);
    }

    #[test]
    fn test_orphan_is_demoted_to_root() {
        let items = vec![row(1, None, Some(0), "Home"), row(2, Some(99), Some(1), "Lost")];
        let forest = build_tree(&items);

        assert_eq!(labels(&forest), vec!["Home", "Lost"]);
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn test_siblings_sorted_by_order() {
        let items = vec![
            row(1, None, Some(0), "Root"),
            row(2, Some(1), Some(3), "Three"),
            row(3, Some(1), Some(1), "One"),
            row(4, Some(1), Some(2), "Two"),
        ];
        let forest = build_tree(&items);

        let orders: Vec<Option<i32>> = forest[0].children.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_missing_order_sorts_as_zero() {
        let items = vec![
            row(1, None, Some(1), "One"),
            row(2, None, None, "Unordered"),
            row(3, None, Some(-1), "Negative"),
        ];
        let forest = build_tree(&items);

        assert_eq!(labels(&forest), vec!["Negative", "Unordered", "One"]);
    }

    #[test]
    fn test_equal_order_breaks_ties_by_id() {
        let items = vec![
            row(30, None, Some(0), "C"),
            row(10, None, None, "A"),
            row(20, None, Some(0), "B"),
        ];
        let forest = build_tree(&items);

        assert_eq!(labels(&forest), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_self_parent_becomes_root() {
        let items = vec![row(1, Some(1), Some(0), "Loop"), row(2, Some(1), Some(0), "Child")];
        let forest = build_tree(&items);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].label, "Loop");
        assert_eq!(labels(&forest[0].children), vec!["Child"]);
    }

    #[test]
    fn test_parent_cycle_is_broken_without_dropping_items() {
        let items = vec![
            row(1, None, Some(5), "Home"),
            row(2, Some(3), Some(1), "A"),
            row(3, Some(2), Some(2), "B"),
            row(4, Some(3), Some(0), "Under B"),
        ];
        let forest = build_tree(&items);

        let mut ids = Vec::new();
        collect_ids(&forest, &mut ids);
        assert_eq!(ids.len(), 4);

        // A has the smaller order, so the cycle is cut above it.
        assert_eq!(labels(&forest), vec!["A", "Home"]);
        assert_eq!(labels(&forest[0].children), vec!["B"]);
        assert_eq!(labels(&forest[0].children[0].children), vec!["Under B"]);
    }

    fn max_depth(forest: &[DisplayMenuItem]) -> usize {
        forest
            .iter()
            .map(|node| 1 + max_depth(&node.children))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_deep_chain_is_lifted_in_segments() {
        let len = 10_000u128;
        let items: Vec<MenuItem> = (1..=len)
            .map(|n| row(n, (n > 1).then(|| n - 1), Some(0), "Level"))
            .collect();
        let forest = build_tree(&items);

        let segment = MAX_MENU_DEPTH as u128;
        let expected_roots: Vec<Uuid> = (0..len).step_by(MAX_MENU_DEPTH).map(|k| id(k + 1)).collect();
        let roots: Vec<Uuid> = forest.iter().map(|node| node.id).collect();
        assert_eq!(roots, expected_roots);
        assert_eq!(forest[1].id, id(segment + 1));

        assert_eq!(max_depth(&forest), MAX_MENU_DEPTH);
        let mut ids = Vec::new();
        collect_ids(&forest, &mut ids);
        assert_eq!(ids.len(), items.len());
    }

    #[test]
    fn test_chain_at_max_depth_stays_nested() {
        let items: Vec<MenuItem> = (1..=MAX_MENU_DEPTH as u128)
            .map(|n| row(n, (n > 1).then(|| n - 1), None, "Level"))
            .collect();
        let forest = build_tree(&items);

        assert_eq!(forest.len(), 1);
        assert_eq!(max_depth(&forest), MAX_MENU_DEPTH);
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let items = vec![row(1, None, Some(0), "First"), row(1, None, Some(1), "Second")];
        let forest = build_tree(&items);

        assert_eq!(labels(&forest), vec!["First", "Second"]);
    }

    #[test]
    fn test_nested_levels_sorted_independently() {
        let items = vec![
            row(1, None, Some(1), "Services"),
            row(2, None, Some(0), "Home"),
            row(3, Some(1), Some(2), "Hosting"),
            row(4, Some(1), Some(1), "Design"),
            row(5, Some(4), Some(9), "Logos"),
            row(6, Some(4), Some(3), "Web"),
        ];
        let forest = build_tree(&items);

        assert_eq!(labels(&forest), vec!["Home", "Services"]);
        assert_eq!(labels(&forest[1].children), vec!["Design", "Hosting"]);
        assert_eq!(labels(&forest[1].children[0].children), vec!["Web", "Logos"]);
    }

    #[test]
    fn test_lint_reports_degraded_rows() {
        let items = vec![
            row(1, None, Some(0), "Home"),
            row(2, Some(77), Some(0), "Orphan"),
            row(3, Some(3), Some(0), "Self"),
            row(4, Some(5), Some(0), "Cycle A"),
            row(5, Some(4), Some(0), "Cycle B"),
            row(6, Some(4), Some(0), "Below cycle"),
            row(1, None, Some(1), "Duplicate"),
        ];
        let issues = lint_items(&items);

        assert!(issues.contains(&MenuItemIssue::Orphan {
            item_id: id(2),
            missing_parent_id: id(77),
        }));
        assert!(issues.contains(&MenuItemIssue::SelfParent { item_id: id(3) }));
        assert!(issues.contains(&MenuItemIssue::Cycle { item_id: id(4) }));
        assert!(issues.contains(&MenuItemIssue::Cycle { item_id: id(5) }));
        assert!(issues.contains(&MenuItemIssue::DuplicateId { item_id: id(1) }));
        assert!(!issues.iter().any(|issue| issue.item_id() == id(6)));
        assert_eq!(issues.len(), 5);
    }

    #[test]
    fn test_lint_clean_menu_has_no_issues() {
        let items = vec![row(1, None, Some(0), "Home"), row(2, Some(1), Some(0), "About")];
        assert!(lint_items(&items).is_empty());
    }

    #[test]
    fn test_issue_serializes_with_kind_tag() {
        let issue = MenuItemIssue::Orphan {
            item_id: id(2),
            missing_parent_id: id(3),
        };
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(json["kind"], "orphan");
        assert!(json.get("missingParentId").is_some());
    }
}
