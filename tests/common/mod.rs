//! Shared utilities for admin API integration tests.

use std::sync::Arc;

use metaplane::ops::AdminServices;
use metaplane::store::{FileConfigStore, InMemoryConfigStore};

pub const ADMIN_USER: &str = "garygeeke";

/// Admin services over a throwaway in-memory store.
pub fn admin_services() -> AdminServices {
    AdminServices::with_defaults(Arc::new(InMemoryConfigStore::new()))
}

/// Admin services over a file store rooted at `dir`, so a second call
/// with the same directory sees the same documents.
#[allow(dead_code)]
pub fn admin_services_on_disk(dir: &std::path::Path) -> AdminServices {
    AdminServices::with_defaults(Arc::new(FileConfigStore::new(dir.to_path_buf())))
}

/// Minimal activatable configuration: default repository services only.
#[allow(dead_code)]
pub fn configure_minimal_server(admin: &AdminServices, server: &str) {
    admin
        .set_default_repository_services(ADMIN_USER, server)
        .expect("default repository services");
}
