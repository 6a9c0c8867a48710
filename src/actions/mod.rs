//! Acting on rule-engine decisions.
//!
//! Deletion only happens through a [`DeletionPlan`], which refuses to
//! remove the last copy of a duplicate set.

pub mod delete;

pub use delete::{
    BatchDeleteResult, DeleteConfig, DeleteError, DeletedFile, DeletionPlan, Disposal,
};
