pub mod artifact;
pub mod digest;

pub use artifact::Artifact;
pub use digest::{Digest, DigestError};
