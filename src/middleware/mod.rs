//! Middleware for the TuneHub proxy
//!
//! This module contains middleware applied to every route.

pub mod cors;
