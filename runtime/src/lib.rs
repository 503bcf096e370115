// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! pagetext runtime library: plain text from rendered web pages and
//! YouTube captions.
//!
//! This library crate exposes the core modules for integration testing.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod renderer;
pub mod rest;
pub mod transcript;
pub mod validate;
