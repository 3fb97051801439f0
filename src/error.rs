/// Failures that abort a single iteration of the reporting loop.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Raised by [`crate::monitor::Sampler`] implementations whose collection can fail as a
    /// whole. [`crate::monitor::ResourceSampler`] reports section failures inside the sample.
    #[error("failed to collect sample: {0}")]
    Sample(String),
    #[error("failed to write report: {0}")]
    Write(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ResultOkLogExt<T, E> {
    fn ok_log(self) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }
}
