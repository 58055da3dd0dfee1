// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for contact form abuse simulation.
//!
//! This module provides utilities for simulating bot and flood traffic
//! against the validator and rate limiter.

pub mod generators;
pub mod metrics;
