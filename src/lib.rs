// Copyright 2018-2026 the Deno authors. MIT license.

//! A pure transformation that flattens a rooted package dependency graph
//! into an equivalent, hoisted graph suitable for a nested-directory
//! installation layout.
//!
//! The input is the nested tree a resolver produces ([`PackageTree`], with
//! instance sharing expressed through shared `Rc`s). The output is the same
//! shape with transitive dependencies lifted as close to the root as the
//! require promise allows: every package must keep resolving each of its
//! dependencies and peer dependencies to the exact instance it resolved to
//! in the input.
//!
//! ```
//! use npm_hoist::HoistOptions;
//! use npm_hoist::TestPackageTreeBuilder;
//!
//! let builder = TestPackageTreeBuilder::new();
//! builder.add_dependency(".", "a@1.0.0");
//! builder.add_dependency("a@1.0.0", "b@1.0.0");
//! let hoisted =
//!   npm_hoist::hoist(&builder.build(), HoistOptions::default()).unwrap();
//! // b@1.0.0 now sits at the root next to a@1.0.0
//! assert_eq!(hoisted.dependencies.borrow().len(), 2);
//! ```

use serde::Deserialize;
use serde::Serialize;

mod hoisting;
mod tree;

pub use hoisting::HoistError;
pub use hoisting::HoistOptions;
pub use hoisting::Hoister;
pub use hoisting::checker::HoistViolation;
pub use hoisting::checker::self_check;
pub use hoisting::hoist;
pub use tree::PackageTree;
pub use tree::PackageType;
pub use tree::TestPackageTreeBuilder;

/// An opaque package identifier as produced by a resolver (ex. `b@1.0.0`).
/// The root of a project tree is the distinguished id `.`.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PackageId(String);

impl PackageId {
  pub const ROOT: &'static str = ".";

  pub fn root() -> Self {
    Self(Self::ROOT.to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn is_root(&self) -> bool {
    self.0 == Self::ROOT
  }
}

impl From<&str> for PackageId {
  fn from(value: &str) -> Self {
    Self(value.to_string())
  }
}

impl From<String> for PackageId {
  fn from(value: String) -> Self {
    Self(value)
  }
}

impl std::fmt::Display for PackageId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// The name a package occupies a directory slot under. Two ids may share a
/// name (different versions of the same package).
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for PackageName {
  fn from(value: &str) -> Self {
    Self(value.to_string())
  }
}

impl From<String> for PackageName {
  fn from(value: String) -> Self {
    Self(value)
  }
}

impl std::fmt::Display for PackageName {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

/// External oracle that derives a [`PackageName`] from a [`PackageId`].
/// The hoister never inspects ids itself; it resolves every name through
/// this trait.
pub trait NameResolver {
  fn name_of(&self, id: &PackageId) -> PackageName;
}

/// Derives names with the npm id convention: a trailing `@version` is
/// stripped while a leading `@scope/` is kept (ex. `@scope/a@1.0.0` has the
/// name `@scope/a`).
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNameResolver;

impl NameResolver for DefaultNameResolver {
  fn name_of(&self, id: &PackageId) -> PackageName {
    let text = id.as_str();
    match text.rfind('@') {
      Some(index) if index > 0 => PackageName::from(&text[..index]),
      _ => PackageName::from(text),
    }
  }
}
