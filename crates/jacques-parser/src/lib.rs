// Error types
pub mod error;

// Trait-based architecture (public API)
pub mod traits;

// Provider implementations
pub mod claude;
pub mod cursor;

// Provider registry
pub mod registry;

// Traits
pub use traits::{LogProvider, ProbeResult, ProviderAdapter, SessionIndex, SessionParser, ToolMapper};

// Provider normalize functions
pub use claude::normalize_claude_file;

// Registry
pub use registry::{
    create_adapter, create_all_adapters, detect_adapter_from_path, get_all_providers,
    get_default_log_paths, get_provider_metadata, get_provider_names,
};

// Error types
pub use error::{Error, Result};
