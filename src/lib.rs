//! Host-side bridge exposing two capability surfaces — an image-capture
//! device and a constrained process-execution facility — to a remote caller
//! across a request/response channel.
//!
//! The caller sends named commands with typed arguments; the bridge performs
//! the operation against a live resource (a camera session or an OS process)
//! and returns a structured result or a typed error. Transport framing is out
//! of scope: [`CommandDispatcher::handle`] consumes one [`Request`] and
//! produces exactly one [`Reply`], and the host wires that to whatever
//! channel it speaks.

pub mod camera;
pub mod dispatcher;
pub mod error;
pub mod files;
pub mod permissions;
pub mod process;
pub mod rpc;

pub use dispatcher::CommandDispatcher;
pub use error::BridgeError;
pub use rpc::{Reply, Request};
