use thiserror::Error;

/// datadict errors
#[derive(Error, Debug)]
pub enum DataDictError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to database: {0}")]
    Connection(String),

    #[error("Failed to read catalog of database '{database}': {message}")]
    Catalog { database: String, message: String },

    #[error("Failed to inspect table '{database}.{table}': {message}")]
    Inspection {
        database: String,
        table: String,
        message: String,
    },

    #[error("Report rendering failed for table '{table}': {message}")]
    Render { table: String, message: String },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl DataDictError {
    /// Whether the run must stop instead of moving on to the next table
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(DataDictError::Config("DB_USER".to_string()).is_fatal());
        assert!(DataDictError::Connection("refused".to_string()).is_fatal());
        assert!(!DataDictError::Catalog {
            database: "shop".to_string(),
            message: "denied".to_string(),
        }
        .is_fatal());
        assert!(!DataDictError::Output(std::io::Error::other("disk full")).is_fatal());
    }

    #[test]
    fn test_inspection_message_names_table() {
        let err = DataDictError::Inspection {
            database: "shop".to_string(),
            table: "users".to_string(),
            message: "SELECT command denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to inspect table 'shop.users': SELECT command denied"
        );
    }
}
