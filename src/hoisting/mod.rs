// Copyright 2018-2026 the Deno authors. MIT license.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;

use log::debug;
use thiserror::Error;

use crate::DefaultNameResolver;
use crate::NameResolver;
use crate::PackageId;
use crate::PackageName;
use crate::tree::PackageTree;

pub mod checker;
mod graph;
mod priorities;
mod verdict;

use graph::NodeId;
use graph::WorkGraph;
use priorities::HoistPriorities;
use verdict::Verdict;
use verdict::compute_verdict;
use verdict::hoistable_at;

/// The only failures hoisting can surface. A dependency that cannot be
/// lifted for semantic reasons is not a failure; its edge is simply left in
/// place.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HoistError {
  /// The input tree binds one name twice under the same parent.
  #[error(
    "Found the duplicate package name '{name}' among the children of '{parent_id}'."
  )]
  DuplicateName {
    parent_id: PackageId,
    name: PackageName,
  },
  /// A deferred hoist could not locate its package again. This indicates a
  /// bug in the hoister rather than bad input.
  #[error(
    "Could not locate '{name}' along the path '{path}' when draining the hoist queue."
  )]
  Unreachable { name: PackageName, path: String },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HoistOptions {
  /// Emit a human readable trace of verdicts, hoists and the final tree to
  /// the log.
  pub dump: bool,
  /// Re-validate the require promise on the hoisted tree and log any
  /// violation at error level.
  pub check: bool,
}

/// Hoists `tree` using the npm id convention for package names.
pub fn hoist(
  tree: &PackageTree,
  options: HoistOptions,
) -> Result<PackageTree, HoistError> {
  Hoister::new(&DefaultNameResolver, options).hoist(tree)
}

/// The hoisting transformation bound to a name oracle.
pub struct Hoister<'a, TNameResolver: NameResolver> {
  name_resolver: &'a TNameResolver,
  options: HoistOptions,
}

impl<'a, TNameResolver: NameResolver> Hoister<'a, TNameResolver> {
  pub fn new(name_resolver: &'a TNameResolver, options: HoistOptions) -> Self {
    Self {
      name_resolver,
      options,
    }
  }

  /// Rewrites the tree into its hoisted form. The input is not mutated.
  pub fn hoist(&self, tree: &PackageTree) -> Result<PackageTree, HoistError> {
    let mut graph = WorkGraph::from_tree(tree, self.name_resolver)?;
    let priorities = HoistPriorities::analyze(&graph);
    let queue = (0..priorities.max_depth()).map(|_| Vec::new()).collect();
    {
      let mut driver = HoistDriver {
        graph: &mut graph,
        priorities,
        queue,
        name_resolver: self.name_resolver,
        dump: self.options.dump,
      };
      driver.run()?;
    }
    if self.options.dump {
      debug!("hoisted tree:\n{}", graph.dump_tree());
    }
    let hoisted = graph.to_tree();
    if self.options.check {
      for violation in checker::self_check(tree, &hoisted, self.name_resolver)
      {
        log::error!("hoist self check: {violation}");
      }
    }
    Ok(hoisted)
  }
}

#[derive(Debug)]
struct QueueItem {
  path_ids: Vec<PackageId>,
  dep_name: PackageName,
}

struct HoistDriver<'a, TNameResolver: NameResolver> {
  graph: &'a mut WorkGraph,
  priorities: HoistPriorities,
  /// Deferred lifts indexed by priority depth, drained in insertion order.
  queue: Vec<Vec<QueueItem>>,
  name_resolver: &'a TNameResolver,
  dump: bool,
}

impl<'a, TNameResolver: NameResolver> HoistDriver<'a, TNameResolver> {
  fn run(&mut self) -> Result<(), HoistError> {
    let root = self.graph.root();
    let mut path = vec![root];
    let mut path_ids = vec![self.graph.node(root).id.clone()];
    self.visit_children(&mut path, &mut path_ids);
    self.drain_queue()
  }

  /// Recurses into the current tail's workspaces and dependencies. The
  /// child list is re-read after every recursion because hoisting can add
  /// children to a node that is still being visited.
  fn visit_children(
    &mut self,
    path: &mut Vec<NodeId>,
    path_ids: &mut Vec<PackageId>,
  ) {
    let parent = *path.last().unwrap();
    let mut visited = HashSet::new();
    loop {
      let next = {
        let node = self.graph.node(parent);
        node
          .workspaces
          .iter()
          .map(|(name, &child)| (true, name.clone(), child))
          .chain(
            node
              .dependencies
              .iter()
              .map(|(name, &child)| (false, name.clone(), child)),
          )
          .find(|(_, _, child)| !visited.contains(child))
      };
      let Some((workspace, name, child)) = next else {
        break;
      };
      visited.insert(child);
      let child_id = self.graph.node(child).id.clone();
      if path_ids.contains(&child_id) {
        // a cycle back to a package already on the path is not re-entered
        continue;
      }
      let child = self.graph.decouple_child(parent, &name, workspace);
      visited.insert(child);
      path.push(child);
      path_ids.push(child_id);
      self.process_node(path, path_ids);
      path_ids.pop();
      path.pop();
    }
  }

  fn process_node(
    &mut self,
    path: &mut Vec<NodeId>,
    path_ids: &mut Vec<PackageId>,
  ) {
    if path.len() >= 2 {
      self.hoist_dependencies(path, path_ids, 0);
    }
    self.visit_children(path, path_ids);
  }

  fn hoist_dependencies(
    &mut self,
    path: &[NodeId],
    path_ids: &[PackageId],
    priority_depth: usize,
  ) {
    let parent = *path.last().unwrap();
    for scc in sibling_peer_sccs(self.graph, parent) {
      self.process_group(path, path_ids, &scc, priority_depth);
    }
  }

  fn process_group(
    &mut self,
    path: &[NodeId],
    path_ids: &[PackageId],
    names: &[PackageName],
    priority_depth: usize,
  ) {
    let parent = *path.last().unwrap();
    if let [name] = names {
      if !self.graph.node(parent).dependencies.contains_key(name) {
        return;
      }
      let group = BTreeSet::new();
      let verdict = compute_verdict(
        self.graph,
        &self.priorities,
        path,
        name,
        priority_depth,
        &group,
      );
      if self.dump {
        debug!(
          "verdict for '{}' under '{}': {:?}",
          name,
          self.graph.node(parent).id,
          verdict
        );
      }
      match verdict {
        Verdict::Yes { new_parent_index } => {
          self.commit_hoist(path, name, new_parent_index)
        }
        Verdict::Later { priority_depth: depth } => {
          self.enqueue(path_ids, name, depth, priority_depth)
        }
        Verdict::No | Verdict::Depends { .. } => {}
      }
      return;
    }

    // a peer cycle: the members lift to a common slot or stay together
    let group = names.iter().cloned().collect::<BTreeSet<_>>();
    let mut members = Vec::new();
    let mut target = 0;
    let mut later_depth: Option<usize> = None;
    for name in names {
      if !self.graph.node(parent).dependencies.contains_key(name) {
        continue;
      }
      let verdict = compute_verdict(
        self.graph,
        &self.priorities,
        path,
        name,
        priority_depth,
        &group,
      );
      if self.dump {
        debug!(
          "verdict for '{}' under '{}' (with {:?}): {:?}",
          name,
          self.graph.node(parent).id,
          group,
          verdict
        );
      }
      match verdict {
        Verdict::Yes { new_parent_index }
        | Verdict::Depends {
          new_parent_index, ..
        } => {
          target = target.max(new_parent_index);
          members.push(name.clone());
        }
        Verdict::Later { priority_depth: depth } => {
          later_depth = Some(later_depth.map_or(depth, |d| d.max(depth)));
          members.push(name.clone());
        }
        // one pinned member pins the whole cycle
        Verdict::No => return,
      }
    }
    if let Some(depth) = later_depth {
      for name in &members {
        self.enqueue(path_ids, name, depth, priority_depth);
      }
      return;
    }
    for name in &members {
      if !hoistable_at(self.graph, path, name, target, &group) {
        return;
      }
    }
    for name in &members {
      self.commit_hoist(path, name, target);
    }
  }

  fn commit_hoist(
    &mut self,
    path: &[NodeId],
    dep_name: &PackageName,
    target_index: usize,
  ) {
    let parent = *path.last().unwrap();
    let target = path[target_index];
    let Some(dep_node) =
      self.graph.node_mut(parent).dependencies.remove(dep_name)
    else {
      return;
    };
    self
      .graph
      .node_mut(parent)
      .hoisted_to
      .insert(dep_name.clone(), target);
    self
      .graph
      .node_mut(target)
      .dependencies
      .entry(dep_name.clone())
      .or_insert(dep_node);
    if self.dump {
      debug!(
        "hoisted '{}' from '{}' into '{}'",
        self.graph.node(dep_node).id,
        self.graph.node(parent).id,
        self.graph.node(target).id
      );
    }
  }

  fn enqueue(
    &mut self,
    path_ids: &[PackageId],
    dep_name: &PackageName,
    depth: usize,
    current_depth: usize,
  ) {
    debug_assert!(depth > current_depth);
    debug_assert!(depth < self.queue.len());
    self.queue[depth].push(QueueItem {
      path_ids: path_ids.to_vec(),
      dep_name: dep_name.clone(),
    });
  }

  fn drain_queue(&mut self) -> Result<(), HoistError> {
    for depth in 1..self.queue.len() {
      let mut index = 0;
      while index < self.queue[depth].len() {
        let entry = &self.queue[depth][index];
        let item = QueueItem {
          path_ids: entry.path_ids.clone(),
          dep_name: entry.dep_name.clone(),
        };
        index += 1;
        self.drain_item(&item, depth)?;
      }
    }
    Ok(())
  }

  fn drain_item(
    &mut self,
    item: &QueueItem,
    priority_depth: usize,
  ) -> Result<(), HoistError> {
    let (path, path_ids) = self.reconstruct_path(&item.path_ids)?;
    let parent = *path.last().unwrap();
    if !self.graph.node(parent).dependencies.contains_key(&item.dep_name) {
      if self.graph.node(parent).hoisted_to.contains_key(&item.dep_name) {
        // another drain already lifted it
        return Ok(());
      }
      return Err(HoistError::Unreachable {
        name: item.dep_name.clone(),
        path: format_path(&item.path_ids),
      });
    }
    let group = sibling_peer_sccs(self.graph, parent)
      .into_iter()
      .find(|scc| scc.contains(&item.dep_name))
      .unwrap_or_else(|| vec![item.dep_name.clone()]);
    self.process_group(&path, &path_ids, &group, priority_depth);
    Ok(())
  }

  /// Rebuilds the current graph path for a queue item recorded as a
  /// sequence of package ids. Whenever the expected package no longer sits
  /// at the expected slot the walk follows the `hoisted_to` redirection
  /// back up and retries from there.
  fn reconstruct_path(
    &self,
    recorded: &[PackageId],
  ) -> Result<(Vec<NodeId>, Vec<PackageId>), HoistError> {
    let mut path = vec![self.graph.root()];
    for expected in &recorded[1..] {
      let name = self.name_resolver.name_of(expected);
      loop {
        let current = *path.last().unwrap();
        let node = self.graph.node(current);
        if let Some(&child) = node.dependencies.get(&name) {
          if self.graph.node(child).id == *expected {
            path.push(child);
            break;
          }
        }
        if let Some(&child) = node.workspaces.get(&name) {
          if self.graph.node(child).id == *expected {
            path.push(child);
            break;
          }
        }
        let Some(&owner) = node.hoisted_to.get(&name) else {
          return Err(HoistError::Unreachable {
            name,
            path: format_path(recorded),
          });
        };
        let position = path.iter().position(|&ancestor| ancestor == owner);
        match position {
          Some(position) if position + 1 < path.len() => {
            path.truncate(position + 1);
          }
          _ => {
            return Err(HoistError::Unreachable {
              name,
              path: format_path(recorded),
            });
          }
        }
      }
    }
    let ids = path
      .iter()
      .map(|&node| self.graph.node(node).id.clone())
      .collect();
    Ok((path, ids))
  }
}

/// Groups a parent's dependencies into strongly connected components of
/// the sibling peer digraph, sink components first, so that a dependency
/// which is another sibling's peer is considered before its dependants and
/// peer cycles come out as one group for joint resolution.
fn sibling_peer_sccs(
  graph: &WorkGraph,
  parent: NodeId,
) -> Vec<Vec<PackageName>> {
  let parent_node = graph.node(parent);
  let names = parent_node.dependencies.keys().cloned().collect::<Vec<_>>();
  let index_of = names
    .iter()
    .enumerate()
    .map(|(index, name)| (name.clone(), index))
    .collect::<HashMap<_, _>>();
  let mut adjacency = vec![Vec::new(); names.len()];
  for (index, name) in names.iter().enumerate() {
    let child = parent_node.dependencies[name];
    for peer_name in &graph.node(child).peer_names {
      if let Some(&peer_index) = index_of.get(peer_name) {
        if peer_index != index {
          adjacency[index].push(peer_index);
        }
      }
    }
  }
  tarjan_scc(&adjacency)
    .into_iter()
    .map(|scc| scc.into_iter().map(|index| names[index].clone()).collect())
    .collect()
}

/// Tarjan's strongly connected components algorithm.
///
/// Returns SCCs in reverse topological order (sink components first).
fn tarjan_scc(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
  struct TarjanState {
    index_counter: usize,
    stack: Vec<usize>,
    on_stack: Vec<bool>,
    indices: Vec<Option<usize>>,
    lowlinks: Vec<usize>,
    result: Vec<Vec<usize>>,
  }

  fn strongconnect(
    node: usize,
    adjacency: &[Vec<usize>],
    state: &mut TarjanState,
  ) {
    state.indices[node] = Some(state.index_counter);
    state.lowlinks[node] = state.index_counter;
    state.index_counter += 1;
    state.stack.push(node);
    state.on_stack[node] = true;

    for &neighbor in &adjacency[node] {
      if state.indices[neighbor].is_none() {
        strongconnect(neighbor, adjacency, state);
        state.lowlinks[node] =
          state.lowlinks[node].min(state.lowlinks[neighbor]);
      } else if state.on_stack[neighbor] {
        let neighbor_index = state.indices[neighbor].unwrap();
        state.lowlinks[node] = state.lowlinks[node].min(neighbor_index);
      }
    }

    if Some(state.lowlinks[node]) == state.indices[node] {
      let mut scc = Vec::new();
      loop {
        let member = state.stack.pop().unwrap();
        state.on_stack[member] = false;
        scc.push(member);
        if member == node {
          break;
        }
      }
      state.result.push(scc);
    }
  }

  let mut state = TarjanState {
    index_counter: 0,
    stack: Vec::new(),
    on_stack: vec![false; adjacency.len()],
    indices: vec![None; adjacency.len()],
    lowlinks: vec![0; adjacency.len()],
    result: Vec::new(),
  };
  for node in 0..adjacency.len() {
    if state.indices[node].is_none() {
      strongconnect(node, adjacency, &mut state);
    }
  }
  state.result
}

fn format_path(path_ids: &[PackageId]) -> String {
  path_ids
    .iter()
    .map(|id| id.as_str())
    .collect::<Vec<_>>()
    .join(" > ")
}

#[cfg(test)]
mod test {
  use std::collections::BTreeSet;
  use std::rc::Rc;

  use pretty_assertions::assert_eq;

  use super::checker::self_check;
  use super::*;
  use crate::tree::TestPackageTreeBuilder;

  fn render(tree: &PackageTree) -> Vec<String> {
    fn walk(
      tree: &PackageTree,
      prefix: &str,
      depth: usize,
      out: &mut Vec<String>,
    ) {
      out.push(format!("{}{}{}", "  ".repeat(depth), prefix, tree.id));
      for child in tree.workspaces.borrow().iter() {
        walk(child, "workspace ", depth + 1, out);
      }
      for child in tree.dependencies.borrow().iter() {
        walk(child, "", depth + 1, out);
      }
    }
    let mut out = Vec::new();
    walk(tree, "", 0, &mut out);
    out
  }

  fn basic_chain() -> Rc<PackageTree> {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "A");
    builder.add_dependency("A", "B");
    builder.build()
  }

  fn version_conflicts() -> Rc<PackageTree> {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "A");
    builder.add_dependency(".", "C@Y");
    builder.add_dependency(".", "D@Y");
    builder.add_dependency("A", "C@X");
    builder.add_dependency("C@X", "D@X");
    builder.add_dependency("C@X", "E");
    builder.build()
  }

  fn popularity_ranking() -> Rc<PackageTree> {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "A");
    builder.add_dependency(".", "B@Y");
    builder.add_dependency(".", "C");
    builder.add_dependency(".", "D");
    builder.add_dependency("A", "B@X");
    builder.add_dependency("B@X", "E@X");
    builder.add_dependency("C", "E@Y");
    builder.add_dependency("D", "E@Y");
    builder.build()
  }

  fn pinned_peer() -> Rc<PackageTree> {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "A");
    builder.add_dependency(".", "D@Y");
    builder.add_dependency("A", "B");
    builder.add_dependency("A", "D@X");
    builder.add_peer("B", "D");
    builder.build()
  }

  fn peer_triangle() -> Rc<PackageTree> {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "D");
    builder.add_dependency("D", "A");
    builder.add_dependency("D", "B");
    builder.add_dependency("D", "C");
    builder.add_peer("A", "B");
    builder.add_peer("B", "C");
    builder.add_peer("C", "A");
    builder.build()
  }

  fn unlocked_peer() -> Rc<PackageTree> {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "A");
    builder.add_dependency("A", "B");
    builder.add_dependency("A", "D@X");
    builder.add_peer("B", "D");
    builder.build()
  }

  fn dependency_cycle() -> Rc<PackageTree> {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "b@2");
    builder.add_dependency(".", "x");
    builder.add_dependency("x", "b@1");
    builder.add_dependency("b@1", "c@1");
    builder.add_dependency("c@1", "b@1");
    builder.build()
  }

  fn shared_subtree() -> Rc<PackageTree> {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "a@1");
    builder.add_dependency(".", "b@1");
    builder.add_dependency("a@1", "c@1");
    builder.add_dependency("b@1", "c@1");
    builder.add_dependency("c@1", "d@1");
    builder.build()
  }

  fn scenario_trees() -> Vec<Rc<PackageTree>> {
    vec![
      basic_chain(),
      version_conflicts(),
      popularity_ranking(),
      pinned_peer(),
      peer_triangle(),
      unlocked_peer(),
      dependency_cycle(),
      shared_subtree(),
    ]
  }

  #[test]
  fn hoists_a_basic_chain() {
    let hoisted = hoist(&basic_chain(), HoistOptions::default()).unwrap();
    assert_eq!(render(&hoisted), vec![".", "  A", "  B"]);
  }

  #[test]
  fn keeps_conflicting_versions_nested() {
    let hoisted =
      hoist(&version_conflicts(), HoistOptions::default()).unwrap();
    assert_eq!(
      render(&hoisted),
      vec![
        ".", "  A", "    C@X", "    D@X", "  C@Y", "  D@Y", "  E"
      ]
    );
  }

  #[test]
  fn popularity_decides_the_root_slot() {
    let hoisted =
      hoist(&popularity_ranking(), HoistOptions::default()).unwrap();
    assert_eq!(
      render(&hoisted),
      vec![
        ".", "  A", "    B@X", "    E@X", "  B@Y", "  C", "  D", "  E@Y"
      ]
    );
  }

  #[test]
  fn keeps_a_package_with_its_pinned_peer() {
    let hoisted = hoist(&pinned_peer(), HoistOptions::default()).unwrap();
    assert_eq!(
      render(&hoisted),
      vec![".", "  A", "    B", "    D@X", "  D@Y"]
    );
  }

  #[test]
  fn flattens_a_peer_cycle_as_one_group() {
    let hoisted = hoist(&peer_triangle(), HoistOptions::default()).unwrap();
    assert_eq!(render(&hoisted), vec![".", "  A", "  B", "  C", "  D"]);
  }

  #[test]
  fn a_hoisted_peer_unlocks_its_dependant() {
    let hoisted = hoist(&unlocked_peer(), HoistOptions::default()).unwrap();
    assert_eq!(render(&hoisted), vec![".", "  A", "  B", "  D@X"]);
  }

  #[test]
  fn converges_on_dependency_cycles() {
    let hoisted =
      hoist(&dependency_cycle(), HoistOptions::default()).unwrap();
    // c@1 rises to the root while both copies of b@1 stay nested below the
    // root's b@2; the cycle's back edge coalesces into the hoisted c@1
    assert_eq!(
      render(&hoisted),
      vec![".", "  b@2", "  c@1", "    b@1", "  x", "    b@1"]
    );
  }

  #[test]
  fn deduplicates_a_shared_subtree() {
    let hoisted = hoist(&shared_subtree(), HoistOptions::default()).unwrap();
    assert_eq!(
      render(&hoisted),
      vec![".", "  a@1", "  b@1", "  c@1", "  d@1"]
    );
  }

  #[test]
  fn scenarios_keep_the_require_promise() {
    for tree in scenario_trees() {
      let hoisted = hoist(&tree, HoistOptions::default()).unwrap();
      assert_eq!(
        self_check(&tree, &hoisted, &DefaultNameResolver),
        Vec::new(),
        "require promise broken for {:?}",
        render(&tree)
      );
    }
  }

  #[test]
  fn hoisting_is_idempotent() {
    for tree in scenario_trees() {
      let once = hoist(&tree, HoistOptions::default()).unwrap();
      let twice = hoist(&once, HoistOptions::default()).unwrap();
      assert_eq!(render(&twice), render(&once));
    }
  }

  #[test]
  fn hoisting_is_deterministic() {
    for tree in scenario_trees() {
      let first = hoist(&tree, HoistOptions::default()).unwrap();
      let second = hoist(&tree, HoistOptions::default()).unwrap();
      assert_eq!(first, second);
    }
  }

  #[test]
  fn no_new_packages_are_introduced() {
    fn collect(
      tree: &PackageTree,
      resolver: &DefaultNameResolver,
      out: &mut BTreeSet<(PackageName, PackageId)>,
      on_path: &mut Vec<PackageId>,
    ) {
      if on_path.contains(&tree.id) {
        return;
      }
      on_path.push(tree.id.clone());
      out.insert((resolver.name_of(&tree.id), tree.id.clone()));
      for child in tree
        .dependencies
        .borrow()
        .iter()
        .chain(tree.workspaces.borrow().iter())
      {
        collect(child, resolver, out, on_path);
      }
      on_path.pop();
    }

    for tree in scenario_trees() {
      let hoisted = hoist(&tree, HoistOptions::default()).unwrap();
      let mut input = BTreeSet::new();
      let mut output = BTreeSet::new();
      collect(&tree, &DefaultNameResolver, &mut input, &mut Vec::new());
      collect(&hoisted, &DefaultNameResolver, &mut output, &mut Vec::new());
      assert!(output.is_subset(&input));
    }
  }

  #[test]
  fn dump_and_check_modes_do_not_change_the_result() {
    let options = HoistOptions {
      dump: true,
      check: true,
    };
    for tree in scenario_trees() {
      let traced = hoist(&tree, options).unwrap();
      let plain = hoist(&tree, HoistOptions::default()).unwrap();
      assert_eq!(traced, plain);
    }
  }

  #[test]
  fn duplicate_names_fail_the_import() {
    let builder = TestPackageTreeBuilder::new();
    builder.add_dependency(".", "a@1.0.0");
    builder.add_dependency(".", "a@2.0.0");
    let err = hoist(&builder.build(), HoistOptions::default()).unwrap_err();
    assert!(matches!(err, HoistError::DuplicateName { .. }));
  }

  #[test]
  fn workspaces_are_traversed_but_never_hoisted() {
    let builder = TestPackageTreeBuilder::new();
    builder.add_workspace(".", "w@1");
    builder.add_dependency("w@1", "a@1");
    builder.add_dependency("a@1", "b@1");
    let hoisted = hoist(&builder.build(), HoistOptions::default()).unwrap();
    // a and b rise out of the workspace, the workspace itself stays put
    assert_eq!(
      render(&hoisted),
      vec![".", "  workspace w@1", "  a@1", "  b@1"]
    );
  }

  #[test]
  fn workspace_slots_block_conflicting_lifts() {
    let builder = TestPackageTreeBuilder::new();
    builder.add_workspace(".", "a@1");
    builder.add_dependency(".", "x@1");
    builder.add_dependency("x@1", "a@2");
    let hoisted = hoist(&builder.build(), HoistOptions::default()).unwrap();
    assert_eq!(
      render(&hoisted),
      vec![".", "  workspace a@1", "  x@1", "    a@2"]
    );
  }
}
