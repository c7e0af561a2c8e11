/// 错误类型 (Error types)
///
/// One enum for the whole library. Binaries wrap it in `anyhow` at the edges.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A camera or ROI entry is unusable (missing videoSource, no ROIs, ...)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration response matched neither the typed nor the legacy layout
    #[error("unrecognised camera schema for '{camera}'")]
    Schema { camera: String },

    /// HTTP failure or non-2xx status
    #[error("transport error: {0}")]
    Transport(String),

    /// Media could not be opened or decoded
    #[error("media error: {0}")]
    Media(String),

    /// Confirming a polygon with fewer than 3 points
    #[error("not enough points to create a polygon ({0} < 3)")]
    NotEnoughPoints(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<ureq::Error> for Error {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, response) => {
                Error::Transport(format!("{} responded with {}", response.get_url(), code))
            }
            ureq::Error::Transport(t) => Error::Transport(t.to_string()),
        }
    }
}
