//! A client mirror of a GraphQL schema's executable operations
//!
//! [`Autograph`] walks the schema's query and mutation root types once and
//! builds an executable template per root field, so tests can invoke any
//! operation by field name with typed JSON arguments instead of hand-writing
//! operation text.

use apollo_compiler::{Schema, ast::OperationType, validation::Valid};
use serde_json::{Map, Value};

use crate::{
    custom_scalar_map::CustomScalarMap,
    errors::{ExecuteError, SchemaError, SynthesisError},
    graphql::{GraphqlClient, Request},
    operations::{GeneratedOperation, OperationTemplate},
};

pub struct Autograph {
    schema: Valid<Schema>,
    custom_scalars: Option<CustomScalarMap>,
    templates: Vec<OperationTemplate>,
}

impl Autograph {
    /// Mirror every query and mutation root field of the schema.
    /// Subscription root fields are skipped.
    pub fn new(schema: Valid<Schema>) -> Self {
        let mut templates = Vec::new();
        for operation_type in [OperationType::Query, OperationType::Mutation] {
            templates.extend(root_fields(&schema, operation_type));
        }
        Self {
            schema,
            custom_scalars: None,
            templates,
        }
    }

    /// Parse and validate SDL, then mirror it
    pub fn parse(source_text: &str, path: &str) -> Result<Self, SchemaError> {
        let schema = Schema::parse_and_validate(source_text, path)
            .map_err(|e| SchemaError::GraphQLSchema(Box::new(e)))?;
        Ok(Self::new(schema))
    }

    /// Register the JSON shapes accepted for custom scalar values
    pub fn with_custom_scalars(mut self, custom_scalars: CustomScalarMap) -> Self {
        self.custom_scalars = Some(custom_scalars);
        self
    }

    pub fn schema(&self) -> &Valid<Schema> {
        &self.schema
    }

    /// The template for a root field, queries first on a name collision
    pub fn operation(&self, name: &str) -> Option<&OperationTemplate> {
        self.templates
            .iter()
            .find(|template| template.name() == name)
    }

    /// Signatures of every mirrored operation, queries before mutations
    pub fn operations(&self) -> Vec<String> {
        self.templates
            .iter()
            .map(OperationTemplate::signature)
            .collect()
    }

    /// Synthesize an operation document and variables mapping for a root
    /// field from bound argument values
    pub fn synthesize(
        &self,
        field: &str,
        bound: &Map<String, Value>,
    ) -> Result<GeneratedOperation, SynthesisError> {
        let template = self
            .operation(field)
            .ok_or_else(|| SynthesisError::UnknownOperation(field.to_string()))?;
        template.synthesize(&self.schema, self.custom_scalars.as_ref(), bound)
    }

    /// Synthesize an operation and execute it through the supplied client,
    /// returning the client's result unmodified
    pub async fn execute<C: GraphqlClient>(
        &self,
        field: &str,
        bound: &Map<String, Value>,
        client: &C,
    ) -> Result<Value, ExecuteError<C::Error>> {
        let operation = self.synthesize(field, bound)?;
        client
            .execute(Request {
                query: &operation.query,
                operation_name: &operation.operation_name,
                variables: &operation.variables,
            })
            .await
            .map_err(ExecuteError::Client)
    }
}

fn root_fields(schema: &Schema, operation_type: OperationType) -> Vec<OperationTemplate> {
    schema
        .root_operation(operation_type)
        .and_then(|root_name| schema.get_object(root_name))
        .map(|root| {
            root.fields
                .iter()
                .map(|(_, field)| OperationTemplate::new(operation_type, field.node.clone()))
                .collect()
        })
        .unwrap_or_default()
}
