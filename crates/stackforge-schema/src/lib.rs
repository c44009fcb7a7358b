//! Shared schema layer for Stackforge.
//!
//! This crate defines the vocabulary the other crates agree on: string newtypes for
//! stack, engine, resource and watch identifiers, the resource and stack
//! action/status enums consulted by attribute resolution and alarm dispatch, the
//! persisted watch rule definition (`WatchRuleSpec`), and the TOML engine
//! configuration (`EngineConfig`).

pub mod config;
pub mod resource;
pub mod types;
pub mod watch;

pub use config::{
    parse_config_file, parse_config_str, ConfigError, EngineConfig, LockSection, StoreSection,
    TemplateSection,
};
pub use resource::{ResourceAction, ResourceStatus, StackStatus};
pub use types::{EngineId, ResourceName, StackId, WatchName};
pub use watch::{
    ComparisonOperator, MetricData, MetricSample, Statistic, WatchRuleSpec, WatchState,
};
