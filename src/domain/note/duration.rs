//! Recording duration math

/// Maximum recording duration (10 minutes). Recording auto-stops here.
pub const MAX_RECORDING_SECS: u64 = 600;

/// Render an elapsed duration as a zero-padded `mm:ss` label.
pub fn duration_label(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
