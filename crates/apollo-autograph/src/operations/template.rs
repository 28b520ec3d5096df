//! Executable operation templates
//!
//! One template per schema root field. A template synthesizes a complete
//! operation document and variables mapping from caller-supplied argument
//! values, without touching the network.

use std::fmt;

use apollo_compiler::{
    Node, Schema,
    ast::{FieldDefinition, OperationType, Type},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{custom_scalar_map::CustomScalarMap, errors::SynthesisError};

use super::{selection, variables};

/// A synthesized GraphQL operation, ready to hand to an execution client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedOperation {
    pub operation_name: String,
    pub query: String,
    pub variables: Map<String, Value>,
}

/// An executable operation mirroring one root field of the schema
#[derive(Debug, Clone)]
pub struct OperationTemplate {
    operation_type: OperationType,
    field: Node<FieldDefinition>,
}

impl OperationTemplate {
    pub(crate) fn new(operation_type: OperationType, field: Node<FieldDefinition>) -> Self {
        Self {
            operation_type,
            field,
        }
    }

    pub fn name(&self) -> &str {
        self.field.name.as_str()
    }

    pub fn operation_type(&self) -> OperationType {
        self.operation_type
    }

    /// The operation keyword, name, and argument names, e.g.
    /// `mutation cookEgg(eggOp)`
    pub fn signature(&self) -> String {
        let keyword = keyword(self.operation_type);
        let args = self
            .field
            .arguments
            .iter()
            .map(|argument| argument.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        if args.is_empty() {
            format!("{keyword} {}", self.name())
        } else {
            format!("{keyword} {}({args})", self.name())
        }
    }

    /// Synthesize an operation document and variables mapping from bound
    /// argument values.
    ///
    /// Validation happens up front: no text is assembled until every bound
    /// value has been checked against its declared type.
    pub(crate) fn synthesize(
        &self,
        schema: &Schema,
        custom_scalars: Option<&CustomScalarMap>,
        bound: &Map<String, Value>,
    ) -> Result<GeneratedOperation, SynthesisError> {
        if let Some(unknown) = bound.keys().find(|key| {
            !self
                .field
                .arguments
                .iter()
                .any(|argument| argument.name.as_str() == key.as_str())
        }) {
            return Err(SynthesisError::UnknownArgument {
                operation: self.name().to_string(),
                argument: unknown.clone(),
            });
        }

        let mut params = Vec::new();
        let mut field_args = Vec::new();
        let mut variables_map = Map::new();
        for argument in &self.field.arguments {
            let name = argument.name.as_str();
            match bound.get(name) {
                Some(value) => {
                    let coerced =
                        variables::coerce(value, &argument.ty, schema, custom_scalars, name)?;
                    params.push(format!("${name}: {}", variable_type(&argument.ty, &coerced)));
                    field_args.push(format!("{name}: ${name}"));
                    variables_map.insert(name.to_string(), coerced);
                }
                None if argument.is_required() => {
                    return Err(SynthesisError::MissingArgument {
                        operation: self.name().to_string(),
                        argument: name.to_string(),
                    });
                }
                // Unbound optional arguments are omitted entirely
                None => {}
            }
        }

        let keyword = keyword(self.operation_type);
        let header = if params.is_empty() {
            format!("{keyword} {}", self.name())
        } else {
            format!("{keyword} {}({})", self.name(), params.join(", "))
        };
        let field_line = if field_args.is_empty() {
            self.name().to_string()
        } else {
            format!("{}({})", self.name(), field_args.join(", "))
        };
        let body = match selection::render(schema, &self.field.ty, 2) {
            Some(selection) => format!(" {{\n{selection}\n  }}"),
            None => String::new(),
        };
        let query = format!("{header} {{\n  {field_line}{body}\n}}");
        debug!(operation = %self.name(), "synthesized operation\n{query}");

        Ok(GeneratedOperation {
            operation_name: self.name().to_string(),
            query,
            variables: variables_map,
        })
    }
}

impl fmt::Display for OperationTemplate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.signature())
    }
}

/// Promote a nullable declared type to non-null when the bound value is known
/// present, so the document mirrors what the caller actually supplied.
fn variable_type(declared: &Type, value: &Value) -> String {
    let text = variables::type_text(declared);
    if declared.is_non_null() || value.is_null() {
        text
    } else {
        format!("{text}!")
    }
}

fn keyword(operation_type: OperationType) -> &'static str {
    match operation_type {
        OperationType::Query => "query",
        OperationType::Mutation => "mutation",
        OperationType::Subscription => "subscription",
    }
}
