use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Body returned by every document write endpoint.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct WriteStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WriteStatus {
    pub fn success() -> Self {
        Self { status: "success", message: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: "error", message: Some(message.into()) }
    }
}
