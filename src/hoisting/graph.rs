// Copyright 2018-2026 the Deno authors. MIT license.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::rc::Rc;

use crate::NameResolver;
use crate::PackageId;
use crate::PackageName;
use crate::tree::PackageTree;
use crate::tree::PackageType;

use super::HoistError;

/// A unique identifier to a node in the working graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
  fn index(self) -> usize {
    self.0 as usize
  }
}

/// A package occurrence in the working graph. Slot maps are keyed by
/// package name because a directory layout can hold at most one child per
/// name. We use `BTreeMap`s for some determinism when traversing and when
/// emitting the final tree.
#[derive(Debug, Clone)]
pub struct Node {
  pub id: PackageId,
  pub name: PackageName,
  pub dependencies: BTreeMap<PackageName, NodeId>,
  pub workspaces: BTreeMap<PackageName, NodeId>,
  pub peer_names: BTreeSet<PackageName>,
  pub package_type: Option<PackageType>,
  /// The name to id bindings this node had at import time. The hoister
  /// never reads these; they exist for the self check.
  pub original_dependencies: BTreeMap<PackageName, PackageId>,
  /// For each dependency lifted away from this node, the ancestor that now
  /// owns the canonical copy.
  pub hoisted_to: BTreeMap<PackageName, NodeId>,
  /// Whether this node is exclusively owned by its current parent slot.
  /// Shared nodes are cloned before the first mutation through a parent.
  pub decoupled: bool,
}

/// The mutable working form of a package tree: an arena of nodes addressed
/// by index, with sharing expressed as multiple parents holding the same
/// index.
#[derive(Debug)]
pub struct WorkGraph {
  nodes: Vec<Node>,
  root: NodeId,
}

impl WorkGraph {
  pub fn from_tree<TNameResolver: NameResolver>(
    tree: &PackageTree,
    name_resolver: &TNameResolver,
  ) -> Result<Self, HoistError> {
    fn import_node<TNameResolver: NameResolver>(
      graph: &mut WorkGraph,
      tree: &PackageTree,
      name_resolver: &TNameResolver,
      seen: &mut HashMap<*const PackageTree, NodeId>,
    ) -> Result<NodeId, HoistError> {
      let ptr = tree as *const PackageTree;
      if let Some(&node_id) = seen.get(&ptr) {
        return Ok(node_id);
      }
      let node_id = graph.create_node(
        tree.id.clone(),
        name_resolver.name_of(&tree.id),
        tree.peer_names.borrow().clone(),
        tree.package_type.get(),
      );
      seen.insert(ptr, node_id);

      let mut dependencies = BTreeMap::new();
      let mut original_dependencies = BTreeMap::new();
      for child in tree.dependencies.borrow().iter() {
        let name = name_resolver.name_of(&child.id);
        let child_id = if Rc::as_ptr(child) == ptr {
          node_id
        } else {
          import_node(graph, child, name_resolver, seen)?
        };
        if let Some(previous) = dependencies.insert(name.clone(), child_id) {
          // the resolver may list the exact same instance twice
          if previous != child_id {
            return Err(HoistError::DuplicateName {
              parent_id: tree.id.clone(),
              name,
            });
          }
        }
        original_dependencies.insert(name, child.id.clone());
      }
      let mut workspaces = BTreeMap::new();
      for child in tree.workspaces.borrow().iter() {
        let name = name_resolver.name_of(&child.id);
        let child_id = import_node(graph, child, name_resolver, seen)?;
        if dependencies.contains_key(&name)
          || workspaces.insert(name.clone(), child_id).is_some()
        {
          return Err(HoistError::DuplicateName {
            parent_id: tree.id.clone(),
            name,
          });
        }
      }

      let node = graph.node_mut(node_id);
      node.dependencies = dependencies;
      node.workspaces = workspaces;
      node.original_dependencies = original_dependencies;
      Ok(node_id)
    }

    let mut graph = WorkGraph {
      nodes: Vec::new(),
      root: NodeId(0),
    };
    let mut seen = HashMap::new();
    graph.root = import_node(&mut graph, tree, name_resolver, &mut seen)?;
    graph.node_mut(graph.root).decoupled = true;
    Ok(graph)
  }

  pub fn root(&self) -> NodeId {
    self.root
  }

  pub fn node(&self, node_id: NodeId) -> &Node {
    &self.nodes[node_id.index()]
  }

  pub fn node_mut(&mut self, node_id: NodeId) -> &mut Node {
    &mut self.nodes[node_id.index()]
  }

  fn create_node(
    &mut self,
    id: PackageId,
    name: PackageName,
    peer_names: BTreeSet<PackageName>,
    package_type: Option<PackageType>,
  ) -> NodeId {
    let node_id = NodeId(self.nodes.len() as u32);
    self.nodes.push(Node {
      id,
      name,
      dependencies: Default::default(),
      workspaces: Default::default(),
      peer_names,
      package_type,
      original_dependencies: Default::default(),
      hoisted_to: Default::default(),
      decoupled: false,
    });
    node_id
  }

  /// Copy-on-write decoupling. The graph may hold a node under multiple
  /// parents; the first mutating visit through a given parent clones the
  /// node and rewires that parent's slot to the clone so other owners keep
  /// observing the pre-hoist state until they are visited themselves.
  pub fn decouple_child(
    &mut self,
    parent: NodeId,
    name: &PackageName,
    workspace: bool,
  ) -> NodeId {
    let child = if workspace {
      self.node(parent).workspaces[name]
    } else {
      self.node(parent).dependencies[name]
    };
    if self.node(child).decoupled {
      return child;
    }
    let clone_id = NodeId(self.nodes.len() as u32);
    let mut clone = self.node(child).clone();
    clone.decoupled = true;
    // keep a self referential slot pointing at the clone itself
    if let Some(self_slot) = clone.dependencies.get_mut(&clone.name) {
      if self.node(*self_slot).id == clone.id {
        *self_slot = clone_id;
      }
    }
    self.nodes.push(clone);
    let slots = if workspace {
      &mut self.node_mut(parent).workspaces
    } else {
      &mut self.node_mut(parent).dependencies
    };
    slots.insert(name.clone(), clone_id);
    clone_id
  }

  /// Emits the external nested tree. Children are sorted by id; a node is
  /// emitted fully at the first path on which it appears and shared from
  /// there on, while a node already on the current emission path (a
  /// residual cycle) becomes a shallow stub carrying only its id.
  pub fn to_tree(&self) -> PackageTree {
    let mut exported = HashMap::new();
    let mut on_path = HashSet::from([self.root]);
    self.export_children(self.root, &mut exported, &mut on_path)
  }

  fn export_node(
    &self,
    node_id: NodeId,
    exported: &mut HashMap<NodeId, Rc<PackageTree>>,
    on_path: &mut HashSet<NodeId>,
  ) -> Rc<PackageTree> {
    if let Some(tree) = exported.get(&node_id) {
      return tree.clone();
    }
    if !on_path.insert(node_id) {
      return Rc::new(PackageTree::new(self.node(node_id).id.clone()));
    }
    let tree = Rc::new(self.export_children(node_id, exported, on_path));
    on_path.remove(&node_id);
    exported.insert(node_id, tree.clone());
    tree
  }

  fn export_children(
    &self,
    node_id: NodeId,
    exported: &mut HashMap<NodeId, Rc<PackageTree>>,
    on_path: &mut HashSet<NodeId>,
  ) -> PackageTree {
    let mut dependencies = self
      .node(node_id)
      .dependencies
      .values()
      .map(|&child| self.export_node(child, exported, on_path))
      .collect::<Vec<_>>();
    dependencies.sort_by(|a, b| a.id.cmp(&b.id));
    let mut workspaces = self
      .node(node_id)
      .workspaces
      .values()
      .map(|&child| self.export_node(child, exported, on_path))
      .collect::<Vec<_>>();
    workspaces.sort_by(|a, b| a.id.cmp(&b.id));
    let node = self.node(node_id);
    PackageTree {
      id: node.id.clone(),
      dependencies: RefCell::new(dependencies),
      workspaces: RefCell::new(workspaces),
      peer_names: RefCell::new(node.peer_names.clone()),
      package_type: Cell::new(node.package_type),
    }
  }

  /// Renders the current graph as an indented id listing for the dump
  /// trace. Workspace children are prefixed, cycle back edges are cut.
  pub fn dump_tree(&self) -> String {
    fn walk(
      graph: &WorkGraph,
      node_id: NodeId,
      prefix: &str,
      depth: usize,
      on_path: &mut HashSet<NodeId>,
      out: &mut String,
    ) {
      out.push_str(&"  ".repeat(depth));
      out.push_str(prefix);
      out.push_str(graph.node(node_id).id.as_str());
      out.push('\n');
      if !on_path.insert(node_id) {
        return;
      }
      for &child in graph.node(node_id).workspaces.values() {
        walk(graph, child, "workspace ", depth + 1, on_path, out);
      }
      for &child in graph.node(node_id).dependencies.values() {
        walk(graph, child, "", depth + 1, on_path, out);
      }
      on_path.remove(&node_id);
    }

    let mut out = String::new();
    walk(self, self.root, "", 0, &mut HashSet::new(), &mut out);
    out
  }
}
