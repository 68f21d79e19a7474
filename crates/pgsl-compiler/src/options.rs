// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Compiler options.

use pgsl_transpile::TranspileConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Parse the build-in prelude (enums and build-in aliases) before the source.
    pub include_prelude: bool,
    pub transpile: TranspileConfig,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            include_prelude: true,
            transpile: TranspileConfig::default(),
        }
    }
}
