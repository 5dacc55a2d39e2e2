//! I/O seams of the provisioning pipeline: HTTP, archives and child processes.

pub mod extract;
pub mod fetch;
pub mod process;
