use std::fmt;

use chrono::Utc;

use crate::shared::validation::STORAGE_KEY_REGEX;

/// Object-store key of an uploaded blob: `{epoch-millis}_{original-file-name}`
///
/// The millisecond prefix keeps two uploads of the same name apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key for `file_name` stamped with the current time
    pub fn generate(file_name: &str) -> Self {
        Self::at(Utc::now().timestamp_millis(), file_name)
    }

    pub fn at(epoch_millis: i64, file_name: &str) -> Self {
        Self(format!("{}_{}", epoch_millis, file_name))
    }

    /// Split a key into its timestamp and original file name
    pub fn parse(key: &str) -> Option<(i64, String)> {
        let caps = STORAGE_KEY_REGEX.captures(key)?;
        let millis = caps.get(1)?.as_str().parse::<i64>().ok()?;
        let name = caps.get(2)?.as_str().to_string();
        Some((millis, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let key = StorageKey::at(1_717_171_717_171, "Q1 Report.pdf");
        assert_eq!(key.as_str(), "1717171717171_Q1 Report.pdf");
    }

    #[test]
    fn test_generate_prefixes_current_millis() {
        let before = Utc::now().timestamp_millis();
        let key = StorageKey::generate("notes.txt");
        let after = Utc::now().timestamp_millis();

        let (millis, name) = StorageKey::parse(key.as_str()).unwrap();
        assert!(millis >= before && millis <= after);
        assert_eq!(name, "notes.txt");
    }

    #[test]
    fn test_parse_keeps_underscores_in_name() {
        assert_eq!(
            StorageKey::parse("42_2024_budget.xlsx"),
            Some((42, "2024_budget.xlsx".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_foreign_keys() {
        assert_eq!(StorageKey::parse("notes.txt"), None);
        assert_eq!(StorageKey::parse("99999999999999999999999_overflow.txt"), None);
    }
}
