use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// Every field has a default suitable for local development; override via
/// environment variables (or a `.env` file) in deployment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins from comma-separated `CORS_ORIGINS`; `*`
    /// allows any origin (default).
    pub cors_origins: Vec<String>,
    /// Directory uploaded videos are written to (default: `uploads`).
    pub upload_dir: PathBuf,
    /// Root of the labeled dataset videos (default: `dataset`).
    pub dataset_dir: PathBuf,
    /// Directory holding the ONNX models and label table (default: `models`).
    pub model_dir: PathBuf,
    /// Generation endpoint of the local LLM server
    /// (default: `http://localhost:11434/api/generate`).
    pub llm_endpoint: String,
    /// Model name sent with every generation request
    /// (default: `mistral:instruct`).
    pub llm_model: String,
    /// Fixed sequence length the classifier was trained on (default: `117`).
    pub max_frames: usize,
    /// Upper bound on request bodies in mebibytes (default: `256`).
    pub max_upload_mb: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let upload_dir = PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));
        let dataset_dir =
            PathBuf::from(std::env::var("DATASET_DIR").unwrap_or_else(|_| "dataset".into()));
        let model_dir = PathBuf::from(std::env::var("MODEL_DIR").unwrap_or_else(|_| "models".into()));

        let llm_endpoint = std::env::var("LLM_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:11434/api/generate".into());
        let llm_model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "mistral:instruct".into());

        let max_frames: usize = std::env::var("MAX_FRAMES")
            .unwrap_or_else(|_| "117".into())
            .parse()
            .expect("MAX_FRAMES must be a valid usize");

        let max_upload_mb: usize = std::env::var("MAX_UPLOAD_MB")
            .unwrap_or_else(|_| "256".into())
            .parse()
            .expect("MAX_UPLOAD_MB must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            upload_dir,
            dataset_dir,
            model_dir,
            llm_endpoint,
            llm_model,
            max_frames,
            max_upload_mb,
        }
    }
}
