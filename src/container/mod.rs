// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! OpenTOSCA container access
//!
//! - `client`: link-following operations on the container REST API
//! - `model`: resource types as they appear on the wire
//! - `payload`: reserved plan parameters and URL helpers
//! - `poll`: interval polling with a deadline

pub mod client;
pub mod error;
pub mod model;
pub mod payload;
pub mod poll;

pub use client::ContainerClient;
pub use error::{ContainerError, ContainerResult};
pub use model::{CsarUpload, InputParameter, OutputParameter, PlanInstance, PlanLogEntry};
pub use poll::{poll_until, PollSettings};
