//! Matter bridge supervisor library.
//!
//! Owns commissioning topology, plugin lifecycle, persistent storage and
//! the Matter runtime adapter; `main.rs` is a thin shell around
//! [`supervisor::Supervisor`].

#![allow(dead_code)]
#![allow(unexpected_cfgs)]
#![recursion_limit = "256"]

pub mod cli;
pub mod config;
pub mod error;
pub mod frontend;
pub mod instance_lock;
pub mod matter;
pub mod pairing;
pub mod plugin;
pub mod registry;
pub mod store;
pub mod subscription;
pub mod supervisor;
pub mod topology;
