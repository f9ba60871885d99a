// Copyright 2018-2026 the Deno authors. MIT license.

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::PackageId;
use crate::PackageName;

/// Tag a resolver may attach to a package. Portal children take the top
/// placement class when ranking hoist candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageType {
  #[serde(rename = "PORTAL")]
  Portal,
}

/// A node in the nested package tree a resolver produces; the root node
/// represents the project itself.
///
/// The resolver reuses one instance for deduplicated packages, so children
/// are held behind `Rc` and instance identity is meaningful. Child lists
/// are `RefCell`-wired so shared instances (and cycles) can be expressed
/// when building a tree in memory. The JSON-equivalent form of the tree
/// serializes through serde, with empty fields omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageTree {
  pub id: PackageId,
  #[serde(default, skip_serializing_if = "children_is_empty")]
  pub dependencies: RefCell<Vec<Rc<PackageTree>>>,
  #[serde(default, skip_serializing_if = "children_is_empty")]
  pub workspaces: RefCell<Vec<Rc<PackageTree>>>,
  #[serde(default, skip_serializing_if = "peer_names_is_empty")]
  pub peer_names: RefCell<BTreeSet<PackageName>>,
  #[serde(default, skip_serializing_if = "package_type_is_none")]
  pub package_type: Cell<Option<PackageType>>,
}

fn children_is_empty(children: &RefCell<Vec<Rc<PackageTree>>>) -> bool {
  children.borrow().is_empty()
}

fn peer_names_is_empty(peer_names: &RefCell<BTreeSet<PackageName>>) -> bool {
  peer_names.borrow().is_empty()
}

fn package_type_is_none(package_type: &Cell<Option<PackageType>>) -> bool {
  package_type.get().is_none()
}

impl PackageTree {
  pub fn new(id: impl Into<PackageId>) -> Self {
    Self {
      id: id.into(),
      dependencies: RefCell::new(Vec::new()),
      workspaces: RefCell::new(Vec::new()),
      peer_names: RefCell::new(BTreeSet::new()),
      package_type: Cell::new(None),
    }
  }
}

/// Builds package trees the way a resolver would: referencing the same id
/// twice yields the same shared instance.
#[derive(Debug, Default)]
pub struct TestPackageTreeBuilder {
  nodes: RefCell<IndexMap<PackageId, Rc<PackageTree>>>,
}

impl TestPackageTreeBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn ensure_package(&self, id: &str) -> Rc<PackageTree> {
    self
      .nodes
      .borrow_mut()
      .entry(PackageId::from(id))
      .or_insert_with(|| Rc::new(PackageTree::new(id)))
      .clone()
  }

  pub fn add_dependency(&self, parent_id: &str, child_id: &str) {
    let parent = self.ensure_package(parent_id);
    let child = self.ensure_package(child_id);
    parent.dependencies.borrow_mut().push(child);
  }

  pub fn add_workspace(&self, parent_id: &str, child_id: &str) {
    let parent = self.ensure_package(parent_id);
    let child = self.ensure_package(child_id);
    parent.workspaces.borrow_mut().push(child);
  }

  pub fn add_peer(&self, id: &str, peer_name: &str) {
    self
      .ensure_package(id)
      .peer_names
      .borrow_mut()
      .insert(PackageName::from(peer_name));
  }

  pub fn set_package_type(&self, id: &str, package_type: PackageType) {
    self.ensure_package(id).package_type.set(Some(package_type));
  }

  /// Returns the root of the built tree (the package with the id `.`).
  pub fn build(&self) -> Rc<PackageTree> {
    self.ensure_package(PackageId::ROOT)
  }
}
