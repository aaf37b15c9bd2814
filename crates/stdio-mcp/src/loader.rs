use std::collections::HashMap;

use serde_json::Value;

use crate::types::{McpError, Prompt, PropertyMeta, Resource, SchemaMeta, SchemaRequirementSet, Tool};

/// Parse tool definitions from raw JSON bytes.
pub fn parse_tools(data: &[u8]) -> Result<Vec<Tool>, McpError> {
    let raw: Vec<Value> = serde_json::from_slice(data)?;
    let mut tools = Vec::with_capacity(raw.len());

    for val in raw {
        let name = val["name"].as_str().unwrap_or_default().to_string();
        if name.is_empty() {
            return Err(McpError::Validation("tool definition without a name".into()));
        }
        let description = val["description"].as_str().unwrap_or_default().to_string();
        let input_schema = val["inputSchema"].clone();

        // Parse schema metadata for validation.
        let schema_meta = parse_schema_meta(&input_schema);

        tools.push(Tool {
            name,
            description,
            input_schema,
            schema_meta,
        });
    }

    Ok(tools)
}

/// Parse resource definitions from raw JSON bytes.
pub fn parse_resources(data: &[u8]) -> Result<Vec<Resource>, McpError> {
    let resources: Vec<Resource> = serde_json::from_slice(data)?;
    Ok(resources)
}

/// Parse prompt definitions from raw JSON bytes.
pub fn parse_prompts(data: &[u8]) -> Result<Vec<Prompt>, McpError> {
    let prompts: Vec<Prompt> = serde_json::from_slice(data)?;
    Ok(prompts)
}

/// Extract validation metadata from a JSON Schema object.
fn parse_schema_meta(schema: &Value) -> SchemaMeta {
    let mut meta = SchemaMeta::default();

    if let Some(arr) = schema.get("required").and_then(|v| v.as_array()) {
        meta.required = string_list(arr);
    }

    if let Some(arr) = schema.get("oneOf").and_then(|v| v.as_array()) {
        meta.one_of = arr
            .iter()
            .filter_map(|v| {
                v.get("required")
                    .and_then(|r| r.as_array())
                    .map(|reqs| SchemaRequirementSet {
                        required: string_list(reqs),
                    })
            })
            .collect();
    }

    if let Some(obj) = schema.get("dependencies").and_then(|v| v.as_object()) {
        let mut deps = HashMap::new();
        for (key, val) in obj {
            if let Some(arr) = val.as_array() {
                deps.insert(key.clone(), string_list(arr));
            }
        }
        meta.dependencies = deps;
    }

    if let Some(obj) = schema.get("properties").and_then(|v| v.as_object()) {
        meta.properties = obj
            .iter()
            .map(|(key, prop)| (key.clone(), parse_property(prop)))
            .collect();
    }

    meta
}

fn parse_property(prop: &Value) -> PropertyMeta {
    PropertyMeta {
        kind: prop.get("type").and_then(|v| v.as_str()).map(String::from),
        allowed: prop
            .get("enum")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default(),
        min_length: prop
            .get("minLength")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize),
        default: prop.get("default").cloned(),
    }
}

fn string_list(arr: &[Value]) -> Vec<String> {
    arr.iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect()
}
