use crate::data::dimensions::DimensionsError;

/// Errors that can occur while processing a related set of
/// grid exports, either from the filesystem (the
/// `IOError` variant) or the contents of the files themselves
/// (e.g. malformed tokens or inconsistent shapes).
#[derive(Debug)]
pub enum DatasetError {
    FormatError(String),
    DimensionsError(DimensionsError),
    IOError(std::io::Error),
    EmptyDataset,
}

impl From<DimensionsError> for DatasetError {
    fn from(err : DimensionsError) -> Self {
        DatasetError::DimensionsError(err)
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err : std::io::Error) -> Self {
        DatasetError::IOError(err)
    }
}

impl std::error::Error for DatasetError {}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DatasetError::FormatError(err) => {
                write!(f, "FormatError: {}", err)
            },
            DatasetError::DimensionsError(err) => {
                write!(f, "DimensionsError: {}", err)
            },
            DatasetError::IOError(err) => {
                write!(f, "IOError: {}", err)
            },
            DatasetError::EmptyDataset => {
                write!(f, "No related quantity files were found")
            }
        }
    }
}
