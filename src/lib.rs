//! NomadNet release sync
//!
//! Mirrors the releases of a GitHub-hosted application into the file layout
//! a NomadNet node serves: downloads matching assets, keeps a stable
//! "latest" alias, installs bundled presentation pages, and writes a JSON
//! summary for the node's pages to consume. All GitHub access goes through
//! the `gh` CLI.

pub mod config;
pub mod github;
pub mod install;
pub mod logging;
pub mod paths;
pub mod sync;
