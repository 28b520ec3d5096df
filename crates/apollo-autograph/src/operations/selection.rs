//! Response selection synthesis
//!
//! A generated operation selects the full response shape of its root field:
//! leaf fields directly, nested objects and interfaces recursively, union
//! members as `... on Member` inline fragments. Fields that declare required
//! arguments cannot be bound automatically and are skipped, as are fields
//! whose type is already being expanded on the current path.

use apollo_compiler::{
    Name, Schema,
    ast::{FieldDefinition, Type},
    schema::{Component, ExtendedType},
};
use tracing::{debug, warn};

/// Render the selection block for a field of the given type, indented by
/// `indent` two-space levels, or None when the type is a leaf needing no
/// selection.
pub(super) fn render(schema: &Schema, ty: &Type, indent: usize) -> Option<String> {
    let root = ty.inner_named_type();
    let mut visited = vec![root.clone()];
    let lines = composite_lines(schema, root, indent, &mut visited)?;
    if lines.is_empty() {
        return Some(format!("{}__typename", pad(indent)));
    }
    Some(lines.join("\n"))
}

fn composite_lines(
    schema: &Schema,
    name: &Name,
    indent: usize,
    visited: &mut Vec<Name>,
) -> Option<Vec<String>> {
    match schema.types.get(name.as_str()) {
        Some(ExtendedType::Object(object)) => {
            Some(field_lines(schema, object.fields.iter(), indent, visited))
        }
        Some(ExtendedType::Interface(interface)) => {
            Some(field_lines(schema, interface.fields.iter(), indent, visited))
        }
        Some(ExtendedType::Union(union_type)) => {
            let mut lines = vec![format!("{}__typename", pad(indent))];
            for member in &union_type.members {
                let member_name = &member.name;
                if visited.contains(member_name) {
                    debug!(member = %member_name, "skipping cyclic union member");
                    continue;
                }
                visited.push(member_name.clone());
                let nested =
                    composite_lines(schema, member_name, indent + 1, visited).unwrap_or_default();
                visited.pop();

                lines.push(format!("{}... on {member_name} {{", pad(indent)));
                if nested.is_empty() {
                    lines.push(format!("{}__typename", pad(indent + 1)));
                } else {
                    lines.extend(nested);
                }
                lines.push(format!("{}}}", pad(indent)));
            }
            Some(lines)
        }
        Some(ExtendedType::Scalar(_) | ExtendedType::Enum(_)) => None,
        _ => {
            warn!(name = %name, "Type not found in schema");
            None
        }
    }
}

fn field_lines<'schema>(
    schema: &Schema,
    fields: impl Iterator<Item = (&'schema Name, &'schema Component<FieldDefinition>)>,
    indent: usize,
    visited: &mut Vec<Name>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (field_name, field) in fields {
        if field.arguments.iter().any(|arg| arg.is_required()) {
            debug!(field = %field_name, "skipping field with required arguments");
            continue;
        }

        let inner = field.ty.inner_named_type();
        match schema.types.get(inner.as_str()) {
            Some(ExtendedType::Scalar(_) | ExtendedType::Enum(_)) => {
                lines.push(format!("{}{field_name}", pad(indent)));
            }
            Some(_) => {
                if visited.contains(inner) {
                    debug!(field = %field_name, ty = %inner, "skipping cyclic field");
                    continue;
                }
                visited.push(inner.clone());
                let nested =
                    composite_lines(schema, inner, indent + 1, visited).unwrap_or_default();
                visited.pop();

                lines.push(format!("{}{field_name} {{", pad(indent)));
                if nested.is_empty() {
                    lines.push(format!("{}__typename", pad(indent + 1)));
                } else {
                    lines.extend(nested);
                }
                lines.push(format!("{}}}", pad(indent)));
            }
            None => {
                warn!(name = %inner, "Type not found in schema");
            }
        }
    }
    lines
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}
