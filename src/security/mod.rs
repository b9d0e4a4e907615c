// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response integrity checks applied by the network layer

mod integrity;

pub use integrity::{IntegrityEntry, IntegrityMetadata, SriAlgorithm};
