use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid bar series: {0}")]
    InvalidBarSeries(String),
}

pub type Result<T> = std::result::Result<T, Error>;
