use thiserror::Error as ThisError;

/// Domain failures. Operations return `anyhow::Result`; these travel inside
/// it and can be recovered with `downcast_ref`.
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum TrackerError {
    #[error("wrong passcode")]
    WrongPasscode,
    #[error("session was not issued by this tracker")]
    ForeignSession,
    #[error("csv is missing required column `{0}`")]
    MissingColumn(String),
    #[error("csv has unexpected column `{0}`")]
    UnexpectedColumn(String),
    #[error("unknown table `{0}`")]
    UnknownTable(String),
    #[error("unknown program day `{0}`")]
    UnknownProgramDay(String),
    #[error("invalid set scheme `{0}`")]
    InvalidScheme(String),
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("photo payload is not valid base64: {0}")]
    Payload(#[from] base64::DecodeError),
}
