// Builder configuration.

/// Default upper bound on key length, in characters.
pub const DEFAULT_MAX_KEY_LENGTH: usize = 1024;

/// Configuration for [`crate::FstBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Longest accepted key, in characters. The draft path is preallocated
    /// to `max_key_length + 1` nodes and longer keys are rejected.
    pub max_key_length: usize,
    /// Share structurally equal suffixes. With `false` the builder emits a
    /// plain prefix tree, which is mostly useful for comparisons.
    pub minimize: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
            minimize: true,
        }
    }
}

impl BuilderConfig {
    pub fn with_max_key_length(mut self, max_key_length: usize) -> Self {
        self.max_key_length = max_key_length;
        self
    }

    pub fn with_minimize(mut self, minimize: bool) -> Self {
        self.minimize = minimize;
        self
    }
}
