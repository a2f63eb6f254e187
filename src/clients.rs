pub mod secrets;
pub use secrets::{AwsSecretsProvider, SecretsProvider};
pub mod parameter_store;
pub use parameter_store::{ParameterStore, PutParameter, SsmParameterStore};
pub mod cluster;
pub use cluster::{ClusterApi, EcsClusterApi, DESCRIBE_BATCH_LIMIT};
pub mod ingest;
pub use ingest::IngestClient;
