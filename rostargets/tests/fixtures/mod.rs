// SPDX-License-Identifier: GPL-3.0-or-later

//! Test fixtures and infrastructure for the integration tests.

pub mod infrastructure;

pub use infrastructure::*;
