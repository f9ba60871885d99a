// Copyright 2018-2026 the Deno authors. MIT license.

use std::collections::HashMap;
use std::collections::HashSet;

use indexmap::IndexMap;
use indexmap::IndexSet;

use crate::PackageId;
use crate::PackageName;
use crate::tree::PackageType;

use super::graph::NodeId;
use super::graph::WorkGraph;

#[derive(Debug, Default)]
struct Occurrence {
  /// Distinct direct parent ids across all occurrences, including usages
  /// induced by peer dependencies that resolve to this package.
  parents: IndexSet<PackageId>,
  placement_class: u8,
}

/// Ranked hoist candidates per package name. The index of an id within its
/// name group is its priority depth: depth 0 is the id most desired to
/// occupy that name at ancestor slots.
#[derive(Debug)]
pub struct HoistPriorities {
  by_name: HashMap<PackageName, Vec<PackageId>>,
  ranks: HashMap<PackageId, usize>,
  max_depth: usize,
}

impl HoistPriorities {
  /// Computes the ranking over the whole graph. Candidates sort by
  /// descending placement class (portal children first, workspace children
  /// next), then descending popularity, then descending id.
  pub fn analyze(graph: &WorkGraph) -> Self {
    fn visit(
      graph: &WorkGraph,
      node_id: NodeId,
      path: &mut Vec<NodeId>,
      seen: &mut HashSet<NodeId>,
      occurrences: &mut IndexMap<PackageId, Occurrence>,
      names: &mut IndexMap<PackageName, IndexSet<PackageId>>,
    ) {
      if !seen.insert(node_id) {
        return;
      }
      path.push(node_id);
      let node = graph.node(node_id);
      for peer_name in &node.peer_names {
        // a peer resolves to the nearest provider up the ancestor chain
        for &ancestor in path[..path.len() - 1].iter().rev() {
          if let Some(&provider) =
            graph.node(ancestor).dependencies.get(peer_name)
          {
            occurrences
              .entry(graph.node(provider).id.clone())
              .or_default()
              .parents
              .insert(node.id.clone());
            break;
          }
        }
      }
      for (workspace_edge, children) in
        [(false, &node.dependencies), (true, &node.workspaces)]
      {
        for &child_id in children.values() {
          let child = graph.node(child_id);
          names
            .entry(child.name.clone())
            .or_default()
            .insert(child.id.clone());
          let occurrence = occurrences.entry(child.id.clone()).or_default();
          occurrence.parents.insert(node.id.clone());
          let placement_class =
            if node.package_type == Some(PackageType::Portal) {
              2
            } else if workspace_edge {
              1
            } else {
              0
            };
          occurrence.placement_class =
            occurrence.placement_class.max(placement_class);
          visit(graph, child_id, path, seen, occurrences, names);
        }
      }
      path.pop();
    }

    let mut occurrences = IndexMap::new();
    let mut names = IndexMap::new();
    visit(
      graph,
      graph.root(),
      &mut Vec::new(),
      &mut HashSet::new(),
      &mut occurrences,
      &mut names,
    );

    let mut by_name = HashMap::with_capacity(names.len());
    let mut ranks = HashMap::new();
    let mut max_depth = 1;
    for (name, ids) in names {
      let mut group = ids
        .into_iter()
        .map(|id| {
          let occurrence = &occurrences[&id];
          (occurrence.placement_class, occurrence.parents.len(), id)
        })
        .collect::<Vec<_>>();
      group.sort_by(|a, b| b.cmp(a));
      let ordered = group.into_iter().map(|(_, _, id)| id).collect::<Vec<_>>();
      for (index, id) in ordered.iter().enumerate() {
        ranks.insert(id.clone(), index);
      }
      max_depth = max_depth.max(ordered.len());
      by_name.insert(name, ordered);
    }
    Self {
      by_name,
      ranks,
      max_depth,
    }
  }

  /// The priority depth of an id within its name group.
  pub fn rank(&self, id: &PackageId) -> usize {
    self.ranks.get(id).copied().unwrap_or(0)
  }

  pub fn candidates(&self, name: &PackageName) -> &[PackageId] {
    self
      .by_name
      .get(name)
      .map(|ids| ids.as_slice())
      .unwrap_or(&[])
  }

  /// One past the deepest priority depth in use; bounds the drain queue.
  pub fn max_depth(&self) -> usize {
    self.max_depth
  }
}

#[cfg(test)]
mod test {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::DefaultNameResolver;
  use crate::tree::TestPackageTreeBuilder;

  fn analyze(builder: &TestPackageTreeBuilder) -> HoistPriorities {
    let graph =
      WorkGraph::from_tree(&builder.build(), &DefaultNameResolver).unwrap();
    HoistPriorities::analyze(&graph)
  }

  fn ids(ids: &[&str]) -> Vec<PackageId> {
    ids.iter().map(|id| PackageId::from(*id)).collect()
  }

  #[test]
  fn ranks_by_popularity() {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "A");
    builder.add_dependency(".", "B@Y");
    builder.add_dependency(".", "C");
    builder.add_dependency(".", "D");
    builder.add_dependency("A", "B@X");
    builder.add_dependency("B@X", "E@X");
    builder.add_dependency("C", "E@Y");
    builder.add_dependency("D", "E@Y");
    let priorities = analyze(&builder);
    assert_eq!(
      priorities.candidates(&PackageName::from("E")),
      ids(&["E@Y", "E@X"])
    );
    assert_eq!(priorities.rank(&PackageId::from("E@Y")), 0);
    assert_eq!(priorities.rank(&PackageId::from("E@X")), 1);
    // a popularity tie breaks on the descending id
    assert_eq!(
      priorities.candidates(&PackageName::from("B")),
      ids(&["B@Y", "B@X"])
    );
    assert_eq!(priorities.max_depth(), 2);
  }

  #[test]
  fn portal_children_take_the_top_class() {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "P");
    builder.set_package_type("P", PackageType::Portal);
    builder.add_dependency("P", "X@1");
    builder.add_dependency(".", "c1");
    builder.add_dependency(".", "c2");
    builder.add_dependency("c1", "X@2");
    builder.add_dependency("c2", "X@2");
    let priorities = analyze(&builder);
    assert_eq!(
      priorities.candidates(&PackageName::from("X")),
      ids(&["X@1", "X@2"])
    );
  }

  #[test]
  fn workspace_children_beat_regular_dependencies() {
    let builder = TestPackageTreeBuilder::new();
    builder.add_workspace(".", "W@1");
    builder.add_dependency(".", "c1");
    builder.add_dependency(".", "c2");
    builder.add_dependency("c1", "W@2");
    builder.add_dependency("c2", "W@2");
    let priorities = analyze(&builder);
    assert_eq!(
      priorities.candidates(&PackageName::from("W")),
      ids(&["W@1", "W@2"])
    );
  }

  #[test]
  fn peer_usages_count_toward_popularity() {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "A");
    builder.add_dependency(".", "D@Y");
    builder.add_dependency("A", "B");
    builder.add_dependency("A", "D@X");
    builder.add_peer("B", "D");
    let priorities = analyze(&builder);
    // B resolves its peer to D@X at A, so D@X counts two dependants and
    // outranks the root's D@Y
    assert_eq!(
      priorities.candidates(&PackageName::from("D")),
      ids(&["D@X", "D@Y"])
    );
  }

  #[test]
  fn cyclic_graphs_are_analyzed_once() {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "a@1.0.0");
    builder.add_dependency("a@1.0.0", "b@1.0.0");
    builder.add_dependency("b@1.0.0", "a@1.0.0");
    let priorities = analyze(&builder);
    assert_eq!(priorities.rank(&PackageId::from("a@1.0.0")), 0);
    assert_eq!(priorities.rank(&PackageId::from("b@1.0.0")), 0);
  }
}
