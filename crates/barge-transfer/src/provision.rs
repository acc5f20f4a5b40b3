//! Idempotent destination bucket provisioning.

use tracing::{debug, info};

use crate::data::BucketDescriptor;
use crate::error::ProvisionError;
use crate::store::ObjectStore;

/// Region for which S3 rejects an explicit location constraint.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Ensures the destination bucket exists before any transfer starts.
///
/// Never deletes or mutates an existing bucket; a second `ensure` on the
/// same descriptor is a head-only no-op.
pub struct BucketProvisioner<S> {
    store: S,
}

impl<S: ObjectStore> BucketProvisioner<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn ensure(&self, bucket: &BucketDescriptor) -> Result<(), ProvisionError> {
        let exists = self
            .store
            .bucket_exists(&bucket.name)
            .await
            .map_err(|source| ProvisionError::Check {
                bucket: bucket.name.clone(),
                source,
            })?;

        if exists {
            debug!(bucket = %bucket.name, "bucket already exists");
            return Ok(());
        }

        let location = (bucket.region != DEFAULT_REGION).then_some(bucket.region.as_str());
        self.store
            .create_bucket(&bucket.name, location)
            .await
            .map_err(|source| ProvisionError::Create {
                bucket: bucket.name.clone(),
                source,
            })?;

        info!(bucket = %bucket.name, region = %bucket.region, "created bucket");
        Ok(())
    }
}
