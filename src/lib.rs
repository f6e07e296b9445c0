//! Rowbatch - Batch UPDATE/DELETE SQL compilation for ORM-mapped entities
//!
//! This crate compiles typed predicate and assignment descriptions into single
//! batch `UPDATE`/`DELETE` statements that run entirely inside the database,
//! without materializing matched rows into application memory:
//! - Per-engine dialect profiles (identifier quoting, alias form, row limits,
//!   parameter placeholders, predicate complexity)
//! - Entity metadata resolution with shadow properties and value converters
//! - Predicate and assignment translation to parameterized SQL fragments
//! - Statement assembly with a stable, diffable clause ordering
//! - Async execution through a caller-supplied connection handle

pub mod batch;
pub mod catalog;
pub mod dialect;
pub mod executor;
pub mod expr;
pub mod sql_generator;
