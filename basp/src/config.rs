//! Instance configuration.

/// Configuration for a BASP instance.
///
/// The application identifier acts as a shared secret of sorts: peers
/// whose identifiers differ refuse to complete a handshake, which keeps
/// unrelated actor systems from accidentally wiring up to each other.
#[derive(Clone, Debug)]
pub struct InstanceConfig {
    /// Application identifier exchanged during handshakes.
    pub app_identifier: String,

    /// Maximum accepted payload size in bytes.
    ///
    /// Frames declaring a larger payload are treated as malformed and
    /// close the connection.
    pub max_payload_len: usize,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            app_identifier: "basp".to_string(),
            max_payload_len: 1024 * 1024,
        }
    }
}

impl InstanceConfig {
    /// Create a configuration with the given application identifier.
    pub fn new(app_identifier: impl Into<String>) -> Self {
        Self {
            app_identifier: app_identifier.into(),
            ..Self::default()
        }
    }

    /// Set the maximum accepted payload size.
    pub fn with_max_payload_len(mut self, max: usize) -> Self {
        self.max_payload_len = max;
        self
    }
}
