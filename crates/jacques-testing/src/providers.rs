//! Provider definitions for testing logic.
//!
//! Abstracts over the two adapters `jacques-parser` ships, so a test can
//! say "put a Claude session here" without hardcoding directory layout.

/// Supported test providers, mirroring `jacques_parser::registry`'s adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestProvider {
    Claude,
    Cursor,
}

impl TestProvider {
    /// Provider id as used by `jacques_parser::create_adapter`.
    pub fn id(&self) -> &'static str {
        match self {
            TestProvider::Claude => "claude_code",
            TestProvider::Cursor => "cursor",
        }
    }

    /// Default log directory name, relative to a fake `$HOME`.
    pub fn default_log_dir_name(&self) -> &'static str {
        match self {
            TestProvider::Claude => ".claude",
            TestProvider::Cursor => ".cursor",
        }
    }

    pub fn all() -> &'static [TestProvider] {
        &[TestProvider::Claude, TestProvider::Cursor]
    }
}

impl std::fmt::Display for TestProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_parser_registry() {
        assert_eq!(TestProvider::Claude.id(), "claude_code");
        assert_eq!(TestProvider::Cursor.id(), "cursor");
    }
}
