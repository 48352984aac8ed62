use thiserror::Error;
use xs_auth::AuthError;

#[derive(Debug, Error)]
pub enum CliError {
    /// Usage text was printed instead of running the command. Not a failure.
    #[error("help requested")]
    HelpRequested,

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,

    #[error("login '{0}' is already in use")]
    LoginTaken(String),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("failed to hash password: {0}")]
    Hashing(String),

    #[error("failed to read input: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::HelpRequested => 0,
            _ => 1,
        }
    }
}
