//! Request/response types for step-up endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct StepUpRequest {
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct StepUpResponse {
    pub success: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyCodeRequest {
    pub code: String,
    /// Document the caller intends to download once verified.
    pub document_id: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyCodeResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn verify_response_omits_absent_token() -> Result<()> {
        let response = VerifyCodeResponse {
            success: false,
            message: "Invalid or expired code".to_string(),
            download_token: None,
        };
        let value = serde_json::to_value(&response)?;
        assert!(value.get("download_token").is_none());
        Ok(())
    }

    #[test]
    fn verify_request_round_trips() -> Result<()> {
        let request = VerifyCodeRequest {
            code: "123456".to_string(),
            document_id: "d6a4f0f6-8bb0-4edd-a6b3-111111111111".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let decoded: VerifyCodeRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.code, "123456");
        Ok(())
    }
}
