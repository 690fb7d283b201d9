use station_traits::Metric;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("bus fault reading {0}")]
    Bus(Metric),
    #[error("{0} timed out")]
    Timeout(&'static str),
    #[error("ingestion service answered {0}")]
    Status(u16),
    #[error("http: {0}")]
    Http(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
