//! Workspace for the build script: the JSON catalog's data model and the
//! generator that turns it into `src/catalog`'s static descriptor tables.
pub mod conf;
pub mod domain;
pub mod errors;
pub mod gen_catalog;
