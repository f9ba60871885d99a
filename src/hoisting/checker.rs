// Copyright 2018-2026 the Deno authors. MIT license.

//! Validation of a hoisted tree against the original it came from: every
//! package must keep resolving its dependencies and peers to the same
//! packages, and no parent may bind one name twice. Hoisting keeps these
//! invariants by construction; the checker exists as a diagnostic for the
//! `check` option and for tests.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;

use crate::NameResolver;
use crate::PackageId;
use crate::PackageName;
use crate::tree::PackageTree;

/// A broken invariant found by [`self_check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoistViolation {
  /// A package resolves a dependency or peer to a different package than
  /// it did in the original tree.
  BrokenRequire {
    path: Vec<PackageId>,
    dependency: PackageName,
    expected: Option<PackageId>,
    found: Option<PackageId>,
  },
  /// Two children of one parent occupy the same name.
  NameCollision {
    path: Vec<PackageId>,
    name: PackageName,
  },
}

impl std::fmt::Display for HoistViolation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      HoistViolation::BrokenRequire {
        path,
        dependency,
        expected,
        found,
      } => {
        write!(
          f,
          "the package at '{}' resolves '{}' to {} but the original tree resolves it to {}",
          format_path(path),
          dependency,
          format_binding(found),
          format_binding(expected),
        )
      }
      HoistViolation::NameCollision { path, name } => {
        write!(
          f,
          "the package at '{}' holds more than one child under the name '{}'",
          format_path(path),
          name
        )
      }
    }
  }
}

fn format_path(path: &[PackageId]) -> String {
  path
    .iter()
    .map(|id| id.as_str())
    .collect::<Vec<_>>()
    .join(" > ")
}

fn format_binding(binding: &Option<PackageId>) -> String {
  match binding {
    Some(id) => format!("'{id}'"),
    None => "nothing".to_string(),
  }
}

/// Walks `hoisted` and reports every place where it no longer honors the
/// bindings packages had in `original`.
pub fn self_check<TNameResolver: NameResolver>(
  original: &PackageTree,
  hoisted: &PackageTree,
  name_resolver: &TNameResolver,
) -> Vec<HoistViolation> {
  let mut original_deps = HashMap::new();
  let mut original_peers = HashMap::new();
  collect_original(
    original,
    name_resolver,
    &mut Vec::new(),
    &mut HashSet::new(),
    &mut original_deps,
    &mut original_peers,
  );
  let mut check = Check {
    name_resolver,
    original_deps,
    original_peers,
    violations: Vec::new(),
  };
  check.check_node(
    hoisted,
    &mut Vec::new(),
    &mut Vec::new(),
    &mut HashSet::new(),
  );
  check.violations
}

fn dependency_bindings<TNameResolver: NameResolver>(
  tree: &PackageTree,
  name_resolver: &TNameResolver,
) -> BTreeMap<PackageName, PackageId> {
  tree
    .dependencies
    .borrow()
    .iter()
    .map(|child| (name_resolver.name_of(&child.id), child.id.clone()))
    .collect()
}

fn collect_original<TNameResolver: NameResolver>(
  tree: &PackageTree,
  name_resolver: &TNameResolver,
  frames: &mut Vec<BTreeMap<PackageName, PackageId>>,
  seen: &mut HashSet<*const PackageTree>,
  deps: &mut HashMap<PackageId, BTreeMap<PackageName, PackageId>>,
  peers: &mut HashMap<PackageId, BTreeMap<PackageName, PackageId>>,
) {
  if !seen.insert(tree as *const PackageTree) {
    return;
  }
  let bindings = dependency_bindings(tree, name_resolver);
  let entry = deps.entry(tree.id.clone()).or_default();
  if entry.is_empty() {
    *entry = bindings.clone();
  }
  let peer_map = peers.entry(tree.id.clone()).or_default();
  for peer_name in tree.peer_names.borrow().iter() {
    if let Some(id) =
      frames.iter().rev().find_map(|frame| frame.get(peer_name))
    {
      peer_map.entry(peer_name.clone()).or_insert_with(|| id.clone());
    }
  }
  frames.push(bindings);
  for child in tree
    .dependencies
    .borrow()
    .iter()
    .chain(tree.workspaces.borrow().iter())
  {
    collect_original(child, name_resolver, frames, seen, deps, peers);
  }
  frames.pop();
}

struct Check<'a, TNameResolver: NameResolver> {
  name_resolver: &'a TNameResolver,
  original_deps: HashMap<PackageId, BTreeMap<PackageName, PackageId>>,
  original_peers: HashMap<PackageId, BTreeMap<PackageName, PackageId>>,
  violations: Vec<HoistViolation>,
}

impl<'a, TNameResolver: NameResolver> Check<'a, TNameResolver> {
  fn check_node(
    &mut self,
    tree: &PackageTree,
    frames: &mut Vec<BTreeMap<PackageName, PackageId>>,
    path: &mut Vec<PackageId>,
    on_path: &mut HashSet<*const PackageTree>,
  ) {
    let ptr = tree as *const PackageTree;
    if !on_path.insert(ptr) {
      return;
    }
    path.push(tree.id.clone());
    let dependencies = tree.dependencies.borrow();
    let workspaces = tree.workspaces.borrow();

    let mut names = HashSet::new();
    for child in dependencies.iter().chain(workspaces.iter()) {
      let name = self.name_resolver.name_of(&child.id);
      if !names.insert(name.clone()) {
        self
          .violations
          .push(HoistViolation::NameCollision {
            path: path.clone(),
            name,
          });
      }
    }

    let own = dependency_bindings(tree, self.name_resolver);
    // a residual cycle stub (its package appears again above it on the
    // emission path) carries no children and asserts nothing
    let is_stub = dependencies.is_empty()
      && workspaces.is_empty()
      && path[..path.len() - 1].contains(&tree.id);
    if !is_stub {
      let expected_bindings =
        self.original_deps.get(&tree.id).cloned().unwrap_or_default();
      for (name, expected) in &expected_bindings {
        let found = own
          .get(name)
          .or_else(|| frames.iter().rev().find_map(|frame| frame.get(name)));
        if found != Some(expected) {
          self.violations.push(HoistViolation::BrokenRequire {
            path: path.clone(),
            dependency: name.clone(),
            expected: Some(expected.clone()),
            found: found.cloned(),
          });
        }
      }
      for peer_name in tree.peer_names.borrow().iter() {
        let expected = self
          .original_peers
          .get(&tree.id)
          .and_then(|bindings| bindings.get(peer_name))
          .cloned();
        let Some(expected) = expected else {
          continue;
        };
        let found =
          frames.iter().rev().find_map(|frame| frame.get(peer_name));
        if found != Some(&expected) {
          self.violations.push(HoistViolation::BrokenRequire {
            path: path.clone(),
            dependency: peer_name.clone(),
            expected: Some(expected),
            found: found.cloned(),
          });
        }
      }
    }

    frames.push(own);
    for child in dependencies.iter().chain(workspaces.iter()) {
      self.check_node(child, frames, path, on_path);
    }
    frames.pop();
    path.pop();
    on_path.remove(&ptr);
  }
}
