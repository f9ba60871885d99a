// Copyright 2018-2026 the Deno authors. MIT license.

use std::collections::BTreeSet;
use std::collections::HashSet;

use crate::PackageId;
use crate::PackageName;

use super::graph::NodeId;
use super::graph::WorkGraph;
use super::priorities::HoistPriorities;

/// The outcome of asking whether a dependency of the node at the end of a
/// path may be lifted to an ancestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
  /// Lift the child to `path[new_parent_index]`.
  Yes { new_parent_index: usize },
  /// The child will never be hoistable along this path.
  No,
  /// Retry once the drain reaches the given priority depth.
  Later { priority_depth: usize },
  /// Hoistable only together with the named peer siblings (a peer cycle
  /// under joint evaluation).
  Depends {
    on: BTreeSet<PackageName>,
    new_parent_index: usize,
  },
}

/// Decides whether `dep_name` of the parent at the end of `path` can be
/// lifted, and how far. `priority_depth` is the queue depth currently being
/// drained (0 during the initial pass). `group` names sibling dependencies
/// under joint peer-cycle evaluation; peers inside it are assumed to move
/// along with the candidate.
pub fn compute_verdict(
  graph: &WorkGraph,
  priorities: &HoistPriorities,
  path: &[NodeId],
  dep_name: &PackageName,
  priority_depth: usize,
  group: &BTreeSet<PackageName>,
) -> Verdict {
  let parent_index = path.len() - 1;
  let parent = path[parent_index];
  let Some(&dep_node) = graph.node(parent).dependencies.get(dep_name) else {
    return Verdict::No;
  };
  let dep_id = graph.node(dep_node).id.clone();
  let rank = priorities.rank(&dep_id);

  // Slots above the deepest ancestor binding this name to another package
  // are unreachable: lifting there would shadow that binding for the
  // subtree hanging below it.
  let mut floor = None;
  for i in 0..parent_index {
    let ancestor = graph.node(path[i]);
    if ancestor.workspaces.contains_key(dep_name) {
      floor = Some(i);
      continue;
    }
    if let Some(&occupant) = ancestor.dependencies.get(dep_name) {
      if graph.node(occupant).id != dep_id {
        floor = Some(i);
      }
    }
  }
  let scan_start = floor.map_or(0, |i| i + 1);

  let mut scan_index = None;
  for i in scan_start..parent_index {
    if !graph.node(path[i]).dependencies.contains_key(dep_name)
      && rank > priority_depth
    {
      // a better ranked candidate for this name is still expected here
      return Verdict::Later {
        priority_depth: rank,
      };
    }
    if path_still_uses(graph, path, i, dep_name, &dep_id)
      && subtree_keeps_bindings(graph, path, i, dep_node)
    {
      scan_index = Some(i);
      break;
    }
  }
  let Some(scan_index) = scan_index else {
    return Verdict::No;
  };

  let parent_node = graph.node(parent);
  let dep = graph.node(dep_node);
  let mut new_parent_index = scan_index;
  let mut later_depth: Option<usize> = None;
  let mut depends_on = BTreeSet::new();
  for peer_name in &dep.peer_names {
    if *peer_name == dep.name {
      continue;
    }
    if let Some(&peer) = parent_node.dependencies.get(peer_name) {
      if group.contains(peer_name) {
        depends_on.insert(peer_name.clone());
        continue;
      }
      // The peer is still co-located at the parent. At or below its own
      // priority depth it has already had its chance to leave and did not,
      // which pins both packages to the parent for good.
      let peer_rank = priorities.rank(&graph.node(peer).id);
      if peer_rank <= priority_depth {
        return Verdict::No;
      }
      later_depth =
        Some(later_depth.map_or(peer_rank, |depth| depth.max(peer_rank)));
    } else {
      let holder = if let Some(&owner) = parent_node.hoisted_to.get(peer_name)
      {
        match resolve_holder(graph, owner, peer_name) {
          Some((holder, _)) => Some(holder),
          None => return Verdict::No,
        }
      } else {
        resolve_from(graph, path, parent_index - 1, peer_name)
          .map(|(index, _)| path[index])
      };
      // the lift may not rise past the peer's provider
      if let Some(holder) = holder {
        match path.iter().position(|&node| node == holder) {
          Some(index) => new_parent_index = new_parent_index.max(index),
          None => return Verdict::No,
        }
      }
    }
  }
  if let Some(priority_depth) = later_depth {
    return Verdict::Later { priority_depth };
  }
  if !depends_on.is_empty() {
    return Verdict::Depends {
      on: depends_on,
      new_parent_index,
    };
  }
  if new_parent_index != scan_index {
    // a peer capped the lift below the scanned slot; find the highest slot
    // at or below the cap that still takes the package
    for i in new_parent_index..parent_index {
      if hoistable_at(graph, path, dep_name, i, group) {
        return Verdict::Yes {
          new_parent_index: i,
        };
      }
    }
    return Verdict::No;
  }
  if !peers_visible_at(graph, path, scan_index, dep_node, group) {
    return Verdict::No;
  }
  Verdict::Yes {
    new_parent_index: scan_index,
  }
}

/// Whether the dependency can be committed at exactly `target`, with every
/// require-promise guard applied. Used for the capped re-scan and for
/// committing peer-cycle groups to their common slot.
pub fn hoistable_at(
  graph: &WorkGraph,
  path: &[NodeId],
  dep_name: &PackageName,
  target: usize,
  group: &BTreeSet<PackageName>,
) -> bool {
  let parent_index = path.len() - 1;
  let parent = path[parent_index];
  let Some(&dep_node) = graph.node(parent).dependencies.get(dep_name) else {
    return false;
  };
  let dep_id = graph.node(dep_node).id.clone();
  for i in target..parent_index {
    let ancestor = graph.node(path[i]);
    if ancestor.workspaces.contains_key(dep_name) {
      return false;
    }
    if let Some(&occupant) = ancestor.dependencies.get(dep_name) {
      if graph.node(occupant).id != dep_id {
        return false;
      }
    }
  }
  path_still_uses(graph, path, target, dep_name, &dep_id)
    && subtree_keeps_bindings(graph, path, target, dep_node)
    && peers_visible_at(graph, path, target, dep_node, group)
}

/// Chases `hoisted_to` redirections from a recorded owner to the node that
/// currently holds a slot for `name`, returning the holder and the bound
/// child.
fn resolve_holder(
  graph: &WorkGraph,
  start: NodeId,
  name: &PackageName,
) -> Option<(NodeId, NodeId)> {
  let mut visited = HashSet::new();
  let mut current = start;
  loop {
    if !visited.insert(current) {
      return None;
    }
    let node = graph.node(current);
    if let Some(&child) = node.dependencies.get(name) {
      return Some((current, child));
    }
    current = *node.hoisted_to.get(name)?;
  }
}

/// The nearest node at or above `path[top]` holding a dependency slot for
/// `name`.
fn resolve_from(
  graph: &WorkGraph,
  path: &[NodeId],
  top: usize,
  name: &PackageName,
) -> Option<(usize, NodeId)> {
  (0..=top).rev().find_map(|index| {
    graph
      .node(path[index])
      .dependencies
      .get(name)
      .map(|&child| (index, child))
  })
}

/// Nodes from the candidate slot down to the parent may have had this name
/// lifted away from them earlier; the lift is refused when any of them
/// would end up resolving the name to a different package.
fn path_still_uses(
  graph: &WorkGraph,
  path: &[NodeId],
  candidate: usize,
  dep_name: &PackageName,
  dep_id: &PackageId,
) -> bool {
  for &node_id in &path[candidate..] {
    if let Some(&owner) = graph.node(node_id).hoisted_to.get(dep_name) {
      match resolve_holder(graph, owner, dep_name) {
        Some((_, bound)) if graph.node(bound).id == *dep_id => {}
        _ => return false,
      }
    }
  }
  true
}

/// The lifted package and its reachable subtree keep every binding they
/// gave away to the path segment being abandoned: a `hoisted_to` entry
/// pointing between the candidate slot and the current parent must
/// re-resolve to the same package from the candidate slot.
fn subtree_keeps_bindings(
  graph: &WorkGraph,
  path: &[NodeId],
  candidate: usize,
  dep_node: NodeId,
) -> bool {
  let abandoned = path[candidate + 1..].iter().copied().collect::<HashSet<_>>();
  let dep_name = graph.node(dep_node).name.clone();
  let dep_id = graph.node(dep_node).id.clone();
  let mut pending = vec![dep_node];
  let mut visited = HashSet::new();
  while let Some(current) = pending.pop() {
    if !visited.insert(current) {
      continue;
    }
    let node = graph.node(current);
    for (name, &owner) in &node.hoisted_to {
      let Some((holder, bound)) = resolve_holder(graph, owner, name) else {
        return false;
      };
      if !abandoned.contains(&holder) {
        continue;
      }
      let bound_id = &graph.node(bound).id;
      if *name == dep_name && *bound_id == dep_id {
        // the lifted package keeps providing its own name at the new slot
        continue;
      }
      match resolve_from(graph, path, candidate, name) {
        Some((_, new_bound)) if graph.node(new_bound).id == *bound_id => {}
        _ => return false,
      }
    }
    pending.extend(node.dependencies.values().copied());
    pending.extend(node.workspaces.values().copied());
  }
  true
}

/// Every peer of the lifted package must still bind to the same package
/// when resolved from the target slot. Peers inside the joint group move
/// along with the candidate and are skipped.
fn peers_visible_at(
  graph: &WorkGraph,
  path: &[NodeId],
  target: usize,
  dep_node: NodeId,
  group: &BTreeSet<PackageName>,
) -> bool {
  let parent_index = path.len() - 1;
  let parent_node = graph.node(path[parent_index]);
  let dep = graph.node(dep_node);
  for peer_name in &dep.peer_names {
    if *peer_name == dep.name || group.contains(peer_name) {
      continue;
    }
    if parent_node.dependencies.contains_key(peer_name) {
      // a peer still sitting at the parent pins the package there
      return false;
    }
    let expected = if let Some(&owner) = parent_node.hoisted_to.get(peer_name)
    {
      resolve_holder(graph, owner, peer_name)
        .map(|(_, bound)| graph.node(bound).id.clone())
    } else {
      resolve_from(graph, path, parent_index - 1, peer_name)
        .map(|(_, bound)| graph.node(bound).id.clone())
    };
    let Some(expected) = expected else {
      continue;
    };
    match resolve_from(graph, path, target, peer_name) {
      Some((_, bound)) if graph.node(bound).id == expected => {}
      _ => return false,
    }
  }
  true
}
