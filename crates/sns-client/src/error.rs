use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Both an access key id and a secret access key are required for static credentials")]
    IncompleteCredentials,

    #[error("No AWS region configured; set --aws-region or AWS_REGION")]
    MissingRegion,
}

pub type Result<T> = std::result::Result<T, Error>;
