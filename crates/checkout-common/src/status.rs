//! Payment status polling types

use serde::{Deserialize, Serialize};

/// Result codes that mean the payment is still being processed
const NON_FINAL_RESULT_CODES: [&str; 2] = ["pending", "received"];

/// Status request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    /// Payment data of the pending action
    pub payment_data: String,
}

/// Status response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Response type
    #[serde(rename = "type", default)]
    pub response_type: Option<String>,
    /// Payload to send to the details call once final
    #[serde(default)]
    pub payload: Option<String>,
    /// Result code
    #[serde(default)]
    pub result_code: Option<String>,
}

impl StatusResponse {
    /// Whether the status carries a verdict and polling can stop
    pub fn is_final_result(&self) -> bool {
        match self.result_code.as_deref() {
            Some(code) => !NON_FINAL_RESULT_CODES.contains(&code),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(result_code: Option<&str>) -> StatusResponse {
        StatusResponse {
            response_type: Some("complete".to_string()),
            payload: Some("payload".to_string()),
            result_code: result_code.map(str::to_string),
        }
    }

    #[test]
    fn test_is_final_result() {
        assert!(response(Some("authorised")).is_final_result());
        assert!(response(Some("refused")).is_final_result());
        assert!(!response(Some("pending")).is_final_result());
        assert!(!response(Some("received")).is_final_result());
        assert!(!response(None).is_final_result());
    }

    #[test]
    fn test_status_response_deserialization() {
        let json = r#"{"type":"complete","payload":"Ab02b4c0","resultCode":"authorised"}"#;
        let response: StatusResponse = serde_json::from_str(json).expect("valid json");

        assert_eq!(response.response_type.as_deref(), Some("complete"));
        assert_eq!(response.payload.as_deref(), Some("Ab02b4c0"));
        assert!(response.is_final_result());
    }
}
