// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Mesh wiring and diagnostics
//!
//! Deployment-time tooling: load a mesh config, bring each chain's adapter
//! in line with it, and read back what an adapter would do for a given
//! destination.

pub mod diagnostics;
pub mod mesh_config;
pub mod wire;

pub use diagnostics::{diagnose_ccip, diagnose_lz, Diagnosis, Issue};
pub use mesh_config::{
    selector_variable, CcipMeshConfig, Connection, LzMeshConfig, MeshConfig, MeshPoint, Pathway,
    ResolvedPoint,
};
pub use wire::{wire_ccip, wire_lz, WireAction, WirePlan};
