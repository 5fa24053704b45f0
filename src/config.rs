/// Application-level constants
pub const APP_NAME: &str = "CareView";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "careview=info"
}

/// Disclaimer shown when the producing service omitted one.
///
/// Every rendered report carries a disclaimer; payloads that lack the field
/// fall back to this fixed string.
pub const DEFAULT_DISCLAIMER: &str = "This assessment is generated by an AI assistant and is for \
informational purposes only. It is not a substitute for professional medical advice, diagnosis, \
or treatment. Always consult a qualified healthcare provider about your health.";
