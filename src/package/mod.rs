//! Package repositories.
//!
//! This module provides the package query service the table model is built
//! on: version ordering, package definitions, discovery of families and
//! versions on disk, and a caching filesystem implementation of
//! [`PackageQuery`].

mod discovery;
mod meta;
mod query;
mod reference;
mod repository;
mod version;

pub use discovery::{find_families, find_versions};
pub use meta::{PACKAGE_FILE, PackageMeta};
pub use query::PackageQuery;
pub use reference::PackageRef;
pub use repository::FsPackageRepository;
pub use version::Version;

#[cfg(test)]
pub use query::MockPackageQuery;
