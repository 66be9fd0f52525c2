use anyhow::Result;
use async_trait::async_trait;

/// Byte content plus declared content-type of a fetched object.
pub struct StoredObject {
  pub data: Vec<u8>,
  pub content_type: String,
}

/// Fetch outcome. A missing object is an expected case, not an error.
pub enum GetObjectResult {
  Found(StoredObject),
  NotFound,
}

#[async_trait]
pub trait Storage: Send + Sync {
  async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectResult>;

  async fn put_object(
    &self,
    bucket: &str,
    key: &str,
    data: Vec<u8>,
    content_type: &str,
  ) -> Result<()>;
}
