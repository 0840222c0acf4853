//! Transaction submission boundary.
//!
//! Signing and wallet lifecycle live outside this bot; the submitter hands
//! the encoded entry-function call to a fullnode-compatible endpoint and
//! reports what came back.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::RouterError;
use crate::executor::encoder::EncodedCall;

/// Outcome reported by the submission endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionReceipt {
    pub hash: String,
    pub success: bool,
}

/// Accepts an encoded call plus a sender and returns a submission result.
pub trait TransactionSubmitter {
    fn submit(
        &self,
        call: &EncodedCall,
        sender: &str,
    ) -> impl std::future::Future<Output = Result<SubmissionReceipt, RouterError>> + Send;
}

/// Entry-function payload in the shape the fullnode API expects. Scalar
/// arguments go over the wire as strings.
#[derive(Debug, Clone, Serialize)]
pub struct EntryFunctionPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<String>,
}

impl EntryFunctionPayload {
    pub fn from_call(call: &EncodedCall) -> Self {
        Self {
            kind: "entry_function_payload",
            function: call.function_id(),
            type_arguments: call.type_args.clone(),
            arguments: call.args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Posts encoded calls to a fullnode transaction endpoint.
pub struct HttpSubmitter {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpSubmitter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl TransactionSubmitter for HttpSubmitter {
    async fn submit(
        &self,
        call: &EncodedCall,
        sender: &str,
    ) -> Result<SubmissionReceipt, RouterError> {
        let url = format!("{}/transactions", self.endpoint);
        let body = json!({
            "sender": sender,
            "payload": EntryFunctionPayload::from_call(call),
        });

        info!("Submitting {} for {}", call.function_id(), sender);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RouterError::Source(format!("POST {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(RouterError::Source(format!(
                "POST {}: HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .json::<SubmissionReceipt>()
            .await
            .map_err(|e| RouterError::Source(format!("decoding receipt: {}", e)))
    }
}
