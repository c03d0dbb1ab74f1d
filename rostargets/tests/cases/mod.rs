// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration test cases.
//!
//! - `scenarios`: end-to-end analysis of small packages, common directives
//! - `ros1` and `ros2`: the directives only one generation understands
//! - `cli`: the binary, its modes, configuration and exit codes

pub mod cli;
pub mod ros1;
pub mod ros2;
pub mod scenarios;
