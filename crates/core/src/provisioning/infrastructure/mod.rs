pub mod artifact_provisioner;
pub mod http_artifact_source;
pub mod tool_release;
mod zip_unpacker;
