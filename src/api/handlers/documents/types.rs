use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadDocumentRequest {
    pub name: String,
    pub category: String,
    pub content_type: String,
    #[serde(default)]
    pub secure: bool,
    /// Document bytes, standard base64.
    pub data_base64: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub content_type: String,
    pub secure: bool,
    pub size_bytes: i64,
    pub created_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentResponse>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_secure_defaults_to_false() {
        let request: UploadDocumentRequest = serde_json::from_str(
            r#"{"name":"transcript.pdf","category":"transcripts","content_type":"application/pdf","data_base64":"aGVsbG8="}"#,
        )
        .unwrap();
        assert!(!request.secure);
        assert_eq!(request.category, "transcripts");
    }

    #[test]
    fn list_response_serializes_documents_key() {
        let json = serde_json::to_string(&DocumentListResponse { documents: vec![] }).unwrap();
        assert_eq!(json, r#"{"documents":[]}"#);
    }
}
