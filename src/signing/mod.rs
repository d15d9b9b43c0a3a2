//! Request signing
//!
//! The search endpoint only answers queries that carry a valid signature.
//! The crawl core treats signing as an opaque capability: it hands over the
//! plain parameters and sends whatever comes back.

mod wbi;

pub use wbi::{WbiKeys, WbiSigner};

use crate::SigningError;
use async_trait::async_trait;

/// Ordered query parameters
pub type Params = Vec<(String, String)>;

/// Turns plain query parameters into a signed parameter list
#[async_trait]
pub trait RequestSigner: Send + Sync {
    /// Signs `params`, returning the parameters to send (including any
    /// timestamp and signature fields the platform expects)
    async fn sign(&self, params: Params) -> Result<Params, SigningError>;
}
