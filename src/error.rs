pub type RenderResult<T> = Result<T, RenderError>;

/// Every failure a render operation can end with.
///
/// All of them are terminal: the render loop never retries and never
/// emits a partial result after one of these is raised.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("write error: {0}")]
    Write(#[from] std::io::Error),

    #[error("cache commit error for key `{key}`: {source}")]
    CacheCommit {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("node renderer error: {0}")]
    Renderer(anyhow::Error),

    #[error("render protocol violation: {0}")]
    Protocol(String),

    #[error("render operation already finished")]
    Finished,
}

impl RenderError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn renderer(err: impl Into<anyhow::Error>) -> Self {
        Self::Renderer(err.into())
    }
}
