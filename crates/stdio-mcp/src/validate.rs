use serde_json::{Map, Value};

use crate::types::{PropertyMeta, Tool};

impl Tool {
    /// Validate arguments against the tool's input schema metadata.
    ///
    /// Returns the arguments with schema defaults filled in for absent
    /// optional properties.
    pub fn validate_arguments(&self, args: &Value) -> Result<Value, String> {
        let mut obj = match args {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => return Err("arguments must be an object".into()),
        };
        let meta = &self.schema_meta;

        // Fill defaults before required checks so a defaulted field counts as present.
        for (field, prop) in &meta.properties {
            if let Some(default) = &prop.default {
                if obj.get(field).is_none_or(Value::is_null) {
                    obj.insert(field.clone(), default.clone());
                }
            }
        }

        // Check required fields.
        for field in &meta.required {
            if !obj.contains_key(field) {
                return Err(format!("missing required field \"{}\"", field));
            }
        }

        // Check oneOf: at least one set of required fields must be satisfied.
        if !meta.one_of.is_empty() {
            let satisfied = meta
                .one_of
                .iter()
                .any(|set| set.required.iter().all(|f| obj.contains_key(f)));
            if !satisfied {
                return Err("arguments must satisfy oneOf requirements".into());
            }
        }

        // Check dependencies: if field A is present, fields B must also be present.
        for (field, deps) in &meta.dependencies {
            if obj.contains_key(field) {
                for dep in deps {
                    if !obj.contains_key(dep) {
                        return Err(format!(
                            "field \"{}\" requires \"{}\" to also be present",
                            field, dep
                        ));
                    }
                }
            }
        }

        for (field, value) in &obj {
            if let Some(prop) = meta.properties.get(field) {
                check_property(field, prop, value)?;
            }
        }

        Ok(Value::Object(obj))
    }
}

fn check_property(field: &str, prop: &PropertyMeta, value: &Value) -> Result<(), String> {
    if let Some(kind) = prop.kind.as_deref() {
        let ok = match kind {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        };
        if !ok {
            return Err(format!("field \"{}\" must be of type {}", field, kind));
        }
    }

    if !prop.allowed.is_empty() && !prop.allowed.contains(value) {
        let allowed: Vec<String> = prop.allowed.iter().map(|v| v.to_string()).collect();
        return Err(format!(
            "field \"{}\" must be one of [{}]",
            field,
            allowed.join(", ")
        ));
    }

    if let (Some(min), Some(s)) = (prop.min_length, value.as_str()) {
        if s.chars().count() < min {
            return Err(format!(
                "field \"{}\" must be at least {} characters",
                field, min
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_tools;
    use serde_json::json;

    fn make_tool(schema_json: &str) -> Tool {
        let json = format!(
            r#"[{{"name":"test","description":"test","inputSchema":{}}}]"#,
            schema_json
        );
        let tools = parse_tools(json.as_bytes()).unwrap();
        tools.into_iter().next().unwrap()
    }

    #[test]
    fn test_validate_required_present() {
        let tool = make_tool(r#"{"type":"object","properties":{},"required":["name"]}"#);
        let args = json!({"name": "hello"});
        assert!(tool.validate_arguments(&args).is_ok());
    }

    #[test]
    fn test_validate_required_missing() {
        let tool = make_tool(r#"{"type":"object","properties":{},"required":["name"]}"#);
        let err = tool.validate_arguments(&json!({})).unwrap_err();
        assert!(err.contains("missing required field"));
    }

    #[test]
    fn test_validate_non_object_arguments() {
        let tool = make_tool(r#"{"type":"object","properties":{}}"#);
        let err = tool.validate_arguments(&json!([1, 2])).unwrap_err();
        assert!(err.contains("object"));
    }

    #[test]
    fn test_validate_one_of_none_match() {
        let tool = make_tool(
            r#"{"type":"object","properties":{},"oneOf":[{"required":["phone"]},{"required":["email"]}]}"#,
        );
        let err = tool.validate_arguments(&json!({})).unwrap_err();
        assert!(err.contains("oneOf"));
        assert!(tool.validate_arguments(&json!({"email": "a@b.c"})).is_ok());
    }

    #[test]
    fn test_validate_dependencies_missing() {
        let tool =
            make_tool(r#"{"type":"object","properties":{},"dependencies":{"lat":["lon"]}}"#);
        let err = tool.validate_arguments(&json!({"lat": 1.0})).unwrap_err();
        assert!(err.contains("requires"));
        assert!(tool.validate_arguments(&json!({"lat": 1.0, "lon": 2.0})).is_ok());
    }

    #[test]
    fn test_validate_type_mismatch() {
        let tool = make_tool(
            r#"{"type":"object","properties":{"num1":{"type":"number"}},"required":["num1"]}"#,
        );
        let err = tool.validate_arguments(&json!({"num1": "3"})).unwrap_err();
        assert!(err.contains("type number"));
        assert!(tool.validate_arguments(&json!({"num1": 3})).is_ok());
        assert!(tool.validate_arguments(&json!({"num1": 2.5})).is_ok());
    }

    #[test]
    fn test_validate_enum() {
        let tool = make_tool(
            r#"{"type":"object","properties":{"operator":{"type":"string","enum":["+","-","*","/"]}},"required":["operator"]}"#,
        );
        assert!(tool.validate_arguments(&json!({"operator": "*"})).is_ok());
        let err = tool.validate_arguments(&json!({"operator": "%"})).unwrap_err();
        assert!(err.contains("must be one of"));
    }

    #[test]
    fn test_validate_min_length() {
        let tool = make_tool(
            r#"{"type":"object","properties":{"name":{"type":"string","minLength":1}},"required":["name"]}"#,
        );
        assert!(tool.validate_arguments(&json!({"name": ""})).is_err());
        assert!(tool.validate_arguments(&json!({"name": "민수"})).is_ok());
    }

    #[test]
    fn test_validate_fills_default() {
        let tool = make_tool(
            r#"{"type":"object","properties":{"timezone":{"type":"string","default":"Asia/Seoul"}}}"#,
        );
        let args = tool.validate_arguments(&Value::Null).unwrap();
        assert_eq!(args["timezone"], "Asia/Seoul");

        let args = tool.validate_arguments(&json!({"timezone": "UTC"})).unwrap();
        assert_eq!(args["timezone"], "UTC");
    }
}
