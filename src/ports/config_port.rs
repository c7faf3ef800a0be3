//! Configuration access port trait.

/// Raw string access; typed parsing lives in `config_validation` so that a
/// malformed value is an error rather than a default.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// All `(key, raw value)` pairs of a section, sorted by key. Empty when
    /// the section is absent.
    fn section_entries(&self, section: &str) -> Vec<(String, String)>;
}
