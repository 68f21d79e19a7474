// SPDX-License-Identifier: (MIT OR Apache-2.0)

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileConfig {
    pub indent_width: usize,
    /// Separate top-level declarations with an empty line.
    pub blank_line_between_declarations: bool,
}

impl Default for TranspileConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            blank_line_between_declarations: true,
        }
    }
}
