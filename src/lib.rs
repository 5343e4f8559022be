//! Predata DDL synthesis for Greenplum metadata backups
//!
//! Takes a snapshot of catalog rows (tables, partitions, sequences, views,
//! functions, types, constraints, text search objects and their ACLs) and
//! renders the schema-creation script a restore replays before any data is
//! loaded, in an order that restores without dependency errors.
//!
//! ```no_run
//! use gp_predata::{backup_predata, config::BackupConfig, PredataCatalog};
//!
//! # fn main() -> gp_predata::BackupResult<()> {
//! let catalog = PredataCatalog::from_json(&std::fs::read_to_string("catalog.json").unwrap_or_default())?;
//! let backup = backup_predata(catalog, &BackupConfig::default())?;
//! for statement in &backup.statements {
//!     println!("{}", statement.statement);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod catalog;
pub mod config;
pub mod ddl;
pub mod dependency;
pub mod metadata;
pub mod parser;
pub mod partition;
pub mod predata;
pub mod utils;
pub mod validation;

pub use error::{BackupError, BackupResult};
pub use predata::{backup_predata, PredataBackup, PredataCatalog};
