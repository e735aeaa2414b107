//! Embedded snapshot trees
//!
//! A snapshot is a tree of [`node::Node`] values built by the packer and keyed
//! by call site in a [`index::TreeIndex`].

pub mod builder;
pub mod index;
pub mod node;
pub mod path;
pub mod walker;
