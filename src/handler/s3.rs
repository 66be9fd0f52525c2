use crate::handler::storage::{GetObjectResult, Storage, StoredObject};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

pub struct Client {
  s3_client: aws_sdk_s3::Client,
}

impl Client {
  pub fn new(s3_client: aws_sdk_s3::Client) -> Self {
    Self { s3_client }
  }
}

#[async_trait]
impl Storage for Client {
  async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectResult> {
    debug!("downloading object: {} from bucket: {}", key, bucket);

    let object = match self
      .s3_client
      .get_object()
      .bucket(bucket)
      .key(key)
      .send()
      .await
    {
      Ok(object) => object,
      Err(err) => {
        // NoSuchKey is an expected outcome; anything else propagates
        let service_err = err.into_service_error();
        if service_err.is_no_such_key() {
          return Ok(GetObjectResult::NotFound);
        }
        return Err(anyhow::Error::new(service_err).context("failed to download object"));
      }
    };

    let content_type = object
      .content_type()
      .unwrap_or("application/octet-stream")
      .to_owned();

    let data = object
      .body
      .collect()
      .await
      .context("failed to read object body")?
      .into_bytes()
      .to_vec();

    Ok(GetObjectResult::Found(StoredObject { data, content_type }))
  }

  async fn put_object(
    &self,
    bucket: &str,
    key: &str,
    data: Vec<u8>,
    content_type: &str,
  ) -> Result<()> {
    debug!("uploading object: {} to bucket: {}", key, bucket);

    let body = ByteStream::from(data);
    self
      .s3_client
      .put_object()
      .bucket(bucket)
      .key(key)
      .body(body)
      .content_type(content_type)
      .send()
      .await
      .context("failed to upload object")?;

    Ok(())
  }
}
