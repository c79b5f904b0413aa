//! Logging targets.
//!
//! Classwright logs through the `tracing` crate and installs no subscriber
//! of its own. Editors or tools embedding it choose where logs go:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Completion service target.
    pub const SERVICE: &str = "classwright::service";
    /// Package discovery target.
    pub const PACKAGE: &str = "classwright::package";
    /// Markup scanning target.
    pub const MARKUP: &str = "classwright::markup";
    /// Configuration loading target.
    pub const CONFIG: &str = "classwright::config";
    /// Stylesheet loading target, owned by `classwright-style`.
    pub const LOADER: &str = "classwright_style::loader";
}
