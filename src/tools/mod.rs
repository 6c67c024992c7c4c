//! Declarative Mixpanel tool table.
//!
//! Each entry pairs a tool name and JSON input schema with the client
//! operation it runs. Arguments are deserialized into the operation's typed
//! parameter struct and validated before any request is built.

/// Declare a [`ToolSpec`](crate::mcp::registry::ToolSpec).
///
/// `params: P => method` runs `client.method(&P)` after parsing the arguments
/// into `P`; `handler: f` uses a hand-written handler instead.
macro_rules! tool {
    (
        name: $name:literal,
        description: $description:literal,
        params: $params:ty => $method:ident,
        schema: $schema:tt $(,)?
    ) => {{
        fn handler(
            client: &$crate::mixpanel::MixpanelClient,
            args: ::serde_json::Value,
        ) -> $crate::mcp::registry::ToolFuture<'_> {
            Box::pin(async move {
                let params: $params = $crate::mixpanel::parse_params(args)?;
                client.$method(&params).await
            })
        }
        tool!(@spec $name, $description, handler, $schema)
    }};
    (
        name: $name:literal,
        description: $description:literal,
        handler: $handler:path,
        schema: $schema:tt $(,)?
    ) => {{
        tool!(@spec $name, $description, $handler, $schema)
    }};
    (@spec $name:literal, $description:literal, $handler:path, $schema:tt) => {{
        fn schema() -> ::serde_json::Value {
            ::serde_json::json!($schema)
        }
        $crate::mcp::registry::ToolSpec {
            name: $name,
            description: $description,
            schema,
            handler: $handler,
        }
    }};
}

mod engage;
mod ingestion;
mod management;
mod query;
mod reports;
mod schema;

use crate::mcp::registry::ToolSpec;

/// Every tool, grouped by API area.
pub fn all() -> Vec<ToolSpec> {
    let mut tools = Vec::new();
    tools.extend(query::tools());
    tools.extend(reports::tools());
    tools.extend(ingestion::tools());
    tools.extend(engage::tools());
    tools.extend(management::tools());
    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tool_names_are_unique() {
        let tools = all();
        let names: HashSet<&str> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), tools.len());
        assert_eq!(tools.len(), 58);
    }

    #[test]
    fn test_schemas_are_objects_with_known_required_fields() {
        for tool in all() {
            let schema = (tool.schema)();
            assert_eq!(schema["type"], "object", "{}", tool.name);
            let properties = schema["properties"]
                .as_object()
                .unwrap_or_else(|| panic!("{} has no properties", tool.name));
            if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
                for field in required {
                    let field = field.as_str().unwrap();
                    assert!(
                        properties.contains_key(field),
                        "{} requires undeclared {field}",
                        tool.name
                    );
                }
            }
            assert!(!tool.description.is_empty(), "{}", tool.name);
        }
    }
}
