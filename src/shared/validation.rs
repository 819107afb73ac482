use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for storage keys generated for uploaded blobs
    /// Format is `{epoch-millis}_{original-file-name}`
    /// - Valid: "1717171717171_report.pdf", "1_a b.txt"
    /// - Invalid: "report.pdf", "_report.pdf", "1717171717171_"
    pub static ref STORAGE_KEY_REGEX: Regex = Regex::new(r"^(\d+)_(?s)(.+)$").unwrap();
}
