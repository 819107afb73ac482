//! MinIO/S3-compatible blob store
//!
//! Uses the rust-s3 crate for object operations. The anonymous-read bucket
//! policy is applied with a hand-signed (AWS Signature v4) request because
//! rust-s3 does not expose bucket policies.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::core::config::MinIOConfig;
use crate::modules::storage::{BlobStore, PublicUrlBuilder};
use crate::modules::{StoreError, StoreResult};

type HmacSha256 = Hmac<Sha256>;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    urls: PublicUrlBuilder,
    endpoint: String,
    access_key: String,
    secret_key: String,
    region_name: String,
    /// HTTP client for bucket policy operations
    http_client: Client,
}

impl MinIOClient {
    /// Connect to the configured bucket, creating it and opening it for
    /// anonymous reads when needed.
    pub async fn new(config: MinIOConfig) -> StoreResult<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StoreError::Storage(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| StoreError::Storage(format!("Failed to open MinIO bucket: {}", e)))?;

        // MinIO serves http://endpoint/bucket rather than http://bucket.endpoint
        bucket.set_path_style();

        let http_client = Client::builder()
            .build()
            .map_err(|e| StoreError::Storage(format!("Failed to create HTTP client: {}", e)))?;

        let client = Self {
            urls: PublicUrlBuilder::new(&config.public_endpoint, &config.endpoint, &config.bucket),
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            access_key: config.access_key,
            secret_key: config.secret_key,
            region_name: config.region,
            http_client,
        };

        client.ensure_bucket_exists().await;
        client.allow_public_reads().await;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}",
            client.endpoint,
            client.bucket.name()
        );

        Ok(client)
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// Create the bucket if it is missing. Never fails startup.
    async fn ensure_bucket_exists(&self) {
        let name = self.bucket.name();
        let result = Bucket::create_with_path_style(
            &name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(response) if response.success() => {
                info!("Bucket '{}' created successfully", name)
            }
            Ok(response) if response.response_code == 409 => {
                debug!("Bucket '{}' already exists", name)
            }
            Ok(response) => warn!(
                "Could not create bucket '{}' (status {}): {}. Assuming it exists.",
                name, response.response_code, response.response_text
            ),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                {
                    debug!("Bucket '{}' already exists", name);
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        name, e
                    );
                }
            }
        }
    }

    /// Grant anonymous `s3:GetObject` on the whole bucket so public URLs resolve
    async fn allow_public_reads(&self) {
        let bucket_name = self.bucket.name();
        let policy = json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Principal": {"AWS": "*"},
                    "Action": ["s3:GetObject"],
                    "Resource": [format!("arn:aws:s3:::{bucket_name}/*")]
                }
            ]
        })
        .to_string();

        match self.put_bucket_policy(&bucket_name, &policy).await {
            Ok(()) => info!("Set public read policy for {}/*", bucket_name),
            Err(e) => warn!(
                "Failed to set bucket policy for '{}': {}. \
                Set it manually with: mc anonymous set download minio/{}",
                bucket_name, e, bucket_name
            ),
        }
    }

    async fn put_bucket_policy(&self, bucket_name: &str, policy: &str) -> StoreResult<()> {
        let endpoint_url = Url::parse(&self.endpoint)
            .map_err(|e| StoreError::Storage(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| StoreError::Storage("Endpoint URL has no host".to_string()))?;
        let host_header = match endpoint_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let signed = self.sign_policy_request(Utc::now(), &host_header, bucket_name, policy)?;

        let response = self
            .http_client
            .put(format!("{}/{}?policy", self.endpoint, bucket_name))
            .header("Host", &host_header)
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header("Authorization", &signed.authorization)
            .header("Content-Type", "application/json")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to send policy request: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(StoreError::Storage(format!(
            "Failed to set bucket policy: {} - {}",
            status, body
        )))
    }

    /// Build the SigV4 headers for `PUT /{bucket}?policy`
    fn sign_policy_request(
        &self,
        now: DateTime<Utc>,
        host_header: &str,
        bucket_name: &str,
        policy: &str,
    ) -> StoreResult<SignedRequest> {
        const ALGORITHM: &str = "AWS4-HMAC-SHA256";
        const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = hex::encode(Sha256::digest(policy.as_bytes()));

        let canonical_request = [
            "PUT".to_string(),
            format!("/{}", bucket_name),
            "policy=".to_string(),
            format!(
                "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
                host_header, payload_hash, amz_date
            ),
            SIGNED_HEADERS.to_string(),
            payload_hash.clone(),
        ]
        .join("\n");

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region_name);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            credential_scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let scope_parts: [&[u8]; 4] = [
            date_stamp.as_bytes(),
            self.region_name.as_bytes(),
            b"s3",
            b"aws4_request",
        ];
        let mut key = format!("AWS4{}", self.secret_key).into_bytes();
        for part in scope_parts {
            key = hmac_sha256(&key, part)?;
        }
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

        Ok(SignedRequest {
            authorization: format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                ALGORITHM, self.access_key, credential_scope, SIGNED_HEADERS, signature
            ),
            amz_date,
            payload_hash,
        })
    }
}

struct SignedRequest {
    authorization: String,
    amz_date: String,
    payload_hash: String,
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> StoreResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StoreError::Storage(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[async_trait]
impl BlobStore for MinIOClient {
    async fn put_blob(&self, key: &str, data: Vec<u8>, content_type: &str) -> StoreResult<()> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to upload '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StoreError::Storage(format!(
                "Failed to upload '{}': status {}",
                key, status
            )));
        }

        debug!(
            "Uploaded '{}' ({} bytes) to bucket '{}'",
            key,
            data.len(),
            self.bucket.name()
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.urls.url_for(key)
    }

    async fn delete_blob(&self, key: &str) -> StoreResult<()> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to delete '{}': {}", key, e)))?;

        // S3 answers 204 for missing keys too, 404 is tolerated from stricter gateways
        let status = response.status_code();
        if !(200..300).contains(&status) && status != 404 {
            return Err(StoreError::Storage(format!(
                "Failed to delete '{}': status {}",
                key, status
            )));
        }

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        self.urls.key_from(url)
    }
}
