// src/db/models/mod.rs

//! Data models for catalog entities

mod package;

pub use package::{BUILD_DESCRIPTOR, LICENSE_FILE, NO_DESCRIPTION, Package, PackageFields};
