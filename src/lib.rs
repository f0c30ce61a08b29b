//! hexpager
//!
//! Interactive terminal pager for binary files and raw block devices.
//!
//! The library follows a pure core / impure shell split. [`page`], [`search`], [`expr`]
//! and [`state`] are plain functions over data and byte sources; [`view`] owns the
//! terminal, and [`source`], [`sparse`] and [`platform`] talk to the operating system.

pub mod config;
pub mod expr;
pub mod history;
pub mod logging;
pub mod model;
pub mod monitor;
pub mod page;
pub mod platform;
pub mod search;
pub mod source;
pub mod sparse;
pub mod state;
pub mod view;
