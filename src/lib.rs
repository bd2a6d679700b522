//! layerconf library
//!
//! Layered settings resolution for a web application: an environment
//! reader, a base configuration, named overlays and a typed settings view.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod logger;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
