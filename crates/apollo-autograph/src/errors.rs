use apollo_compiler::{Schema, validation::WithErrors};

/// An error in operation synthesis
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("No operation named {0} in the schema")]
    UnknownOperation(String),

    #[error("Missing required argument {argument} for {operation}")]
    MissingArgument { operation: String, argument: String },

    #[error("No such argument {argument} on {operation}")]
    UnknownArgument { operation: String, argument: String },

    #[error("No serialization strategy for type {ty} at {path}")]
    UnsupportedType { path: String, ty: String },

    #[error("Value at {path} does not match declared type {ty}: {reason}")]
    MalformedInput {
        path: String,
        ty: String,
        reason: String,
    },
}

/// An error in schema mirror construction
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Could not parse GraphQL schema: {0}")]
    GraphQLSchema(Box<WithErrors<Schema>>),

    #[error("invalid custom_scalar_config: {0}")]
    CustomScalarConfig(serde_json::Error),

    #[error("invalid custom scalar shape: {0}")]
    CustomScalarShape(serde_json::Value),

    #[error("Could not open file: {0}")]
    ReadFile(#[from] std::io::Error),
}

/// An error in operation execution
///
/// Client errors pass through transparently so callers can tell a synthesis
/// failure from a failure reported by their own client.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError<E>
where
    E: std::error::Error,
{
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Client(E),
}
