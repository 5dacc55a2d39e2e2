//! Shared provisioning context.
//!
//! Groups the host description, directory layout, catalog and I/O seams that
//! every pipeline step needs, so they are built once in `main` and passed by
//! reference.

use std::fmt;
use std::sync::Arc;

use crate::catalog::ReleaseCatalog;
use crate::host::Host;
use crate::io::process::CommandRunner;
use crate::paths::Layout;
use crate::reporter::Reporter;

/// Groups common state used during provisioning operations.
#[derive(Clone)]
pub struct Context {
    /// Detected host toolchain.
    pub host: Host,
    /// On-disk layout under the boostup home.
    pub layout: Layout,
    /// Release catalog service.
    pub catalog: ReleaseCatalog,
    /// Executes bootstrap and build commands.
    pub runner: Arc<dyn CommandRunner>,
    /// Progress sink.
    pub reporter: Arc<dyn Reporter>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("host", &self.host)
            .field("layout", &self.layout)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Bundle the provisioning collaborators.
    pub fn new(
        host: Host,
        layout: Layout,
        catalog: ReleaseCatalog,
        runner: Arc<dyn CommandRunner>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            host,
            layout,
            catalog,
            runner,
            reporter,
        }
    }
}
