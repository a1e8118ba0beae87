use serde_json::{json, Value};

/// Generate a JSON schema from a Rust type name and description.
///
/// Covers the argument types the filesystem tools take. Unknown type names
/// fall back to a described string.
pub fn generate_schema_from_type(type_name: &str, description: &str) -> Value {
    match type_name {
        "String" | "str" | "&str" => json!({
            "type": "string",
            "description": description
        }),
        "i32" | "i64" | "u32" | "u64" | "isize" | "usize" => json!({
            "type": "integer",
            "description": description
        }),
        "bool" => json!({
            "type": "boolean",
            "description": description
        }),
        "Vec<String>" => json!({
            "type": "array",
            "items": { "type": "string" },
            "description": description
        }),
        _ => json!({
            "type": "string",
            "description": format!("{} ({})", description, type_name)
        }),
    }
}

/// Generate a JSON schema for a struct field.
///
/// Optional fields are widened to accept `null`.
pub fn generate_field_schema(
    field_name: &str,
    field_type: &str,
    description: Option<&str>,
    required: bool,
) -> Value {
    let desc = description.unwrap_or(field_name);
    let schema = generate_schema_from_type(field_type, desc);

    if required {
        return schema;
    }

    json!({
        "oneOf": [
            schema,
            {"type": "null"}
        ]
    })
}

/// Generate a complete JSON schema for tool parameters from field definitions.
pub fn generate_parameters_schema(
    properties: Vec<(&str, &str, Option<&str>, bool)>, // (name, type, description, required)
) -> Value {
    let mut schema_properties = serde_json::Map::new();
    let mut required = Vec::new();

    for (name, field_type, description, is_required) in properties {
        let field_schema = generate_field_schema(name, field_type, description, is_required);
        schema_properties.insert(name.to_string(), field_schema);

        if is_required {
            required.push(name.to_string());
        }
    }

    json!({
        "type": "object",
        "properties": schema_properties,
        "required": required
    })
}
