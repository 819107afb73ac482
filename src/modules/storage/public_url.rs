/// Builds and parses `<endpoint>/<bucket>/<key>` addresses
#[derive(Debug, Clone)]
pub struct PublicUrlBuilder {
    public_endpoint: String,
    endpoint: String,
    bucket: String,
}

impl PublicUrlBuilder {
    pub fn new(public_endpoint: &str, endpoint: &str, bucket: &str) -> Self {
        Self {
            public_endpoint: public_endpoint.trim_end_matches('/').to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
        }
    }

    /// Public URL for `key`; the key is percent-encoded as one path segment
    pub fn url_for(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_endpoint,
            self.bucket,
            urlencoding::encode(key)
        )
    }

    /// Extract the key from a URL on the public or the internal endpoint
    pub fn key_from(&self, url: &str) -> Option<String> {
        [&self.public_endpoint, &self.endpoint]
            .into_iter()
            .find_map(|base| url.strip_prefix(&format!("{}/{}/", base, self.bucket)))
            .filter(|encoded| !encoded.is_empty())
            .and_then(|encoded| urlencoding::decode(encoded).ok())
            .map(|key| key.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> PublicUrlBuilder {
        PublicUrlBuilder::new(
            "https://cdn.example.com/",
            "http://minio:9000",
            "file-uploads",
        )
    }

    #[test]
    fn test_url_for_uses_public_endpoint_and_bucket() {
        assert_eq!(
            builder().url_for("1700000000000_notes.txt"),
            "https://cdn.example.com/file-uploads/1700000000000_notes.txt"
        );
    }

    #[test]
    fn test_url_for_encodes_key() {
        assert_eq!(
            builder().url_for("1700000000000_Q1 Report.pdf"),
            "https://cdn.example.com/file-uploads/1700000000000_Q1%20Report.pdf"
        );
    }

    #[test]
    fn test_key_from_reverses_url_for() {
        let b = builder();
        let key = "1700000000000_Q1 Report (final).pdf";
        assert_eq!(b.key_from(&b.url_for(key)).as_deref(), Some(key));
    }

    #[test]
    fn test_key_from_accepts_internal_endpoint() {
        assert_eq!(
            builder()
                .key_from("http://minio:9000/file-uploads/1_a.png")
                .as_deref(),
            Some("1_a.png")
        );
    }

    #[test]
    fn test_key_from_rejects_foreign_urls() {
        let b = builder();
        assert!(b.key_from("https://elsewhere.com/file-uploads/1_a.png").is_none());
        assert!(b.key_from("https://cdn.example.com/other-bucket/1_a.png").is_none());
        assert!(b.key_from("https://cdn.example.com/file-uploads/").is_none());
    }
}
