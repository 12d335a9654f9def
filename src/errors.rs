#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Native context creation failed")]
    ContextCreateFailed,

    #[error("Engine context has been destroyed")]
    ContextDestroyed,

    #[error("Unknown test: {0}")]
    UnknownTest(String),

    #[error("Duplicate test name: {0}")]
    DuplicateTest(String),

    #[error("Invalid test name: {0}")]
    InvalidTestName(String),

    #[error("Internal engine error")]
    Internal,
}
