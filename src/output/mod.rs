// Copyright (c) 2025-2026 the rulesync contributors
// SPDX-License-Identifier: Apache-2.0

pub mod writer;

pub use writer::{OutputFile, OutputResult, WriteOptions};
