//! This module contains [`Bytes`], the owned byte region backing every bitmap
//! in this crate.
mod bytes;

pub use bytes::Bytes;
