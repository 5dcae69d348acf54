//! MCP message payloads used by this server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name and version of a peer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// Params of `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    pub client_info: Implementation,
}

/// Result of `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
}

/// Capabilities advertised by the server. Only tools are offered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

impl ServerCapabilities {
    pub fn tools_only() -> Self {
        Self {
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// One entry of `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListToolsResult {
    pub tools: Vec<ToolDefinition>,
}

/// Params of `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initialize_params_camel_case() {
        let params: InitializeParams = serde_json::from_value(json!({
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": {"name": "inspector", "version": "0.1.0"}
        }))
        .unwrap();

        assert_eq!(params.protocol_version, "2025-03-26");
        assert_eq!(params.client_info.name, "inspector");
    }

    #[test]
    fn test_initialize_result_shape() {
        let result = InitializeResult {
            protocol_version: "2025-03-26".to_string(),
            capabilities: ServerCapabilities::tools_only(),
            server_info: Implementation {
                name: "caffeinate-mcp".to_string(),
                version: "0.1.0".to_string(),
            },
        };

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["protocolVersion"], "2025-03-26");
        assert_eq!(value["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(value["serverInfo"]["name"], "caffeinate-mcp");
    }

    #[test]
    fn test_call_params_without_arguments() {
        let params: CallToolParams =
            serde_json::from_value(json!({"name": "caffeinate_list"})).unwrap();
        assert_eq!(params.name, "caffeinate_list");
        assert!(params.arguments.is_none());
    }

    #[test]
    fn test_call_params_rejects_non_object_arguments() {
        let result: Result<CallToolParams, _> =
            serde_json::from_value(json!({"name": "caffeinate_stop", "arguments": [1, 2]}));
        assert!(result.is_err());
    }

    #[test]
    fn test_tool_definition_input_schema_key() {
        let definition = ToolDefinition {
            name: "caffeinate_list".to_string(),
            description: None,
            input_schema: json!({"type": "object"}),
        };
        let value = serde_json::to_value(definition).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("description").is_none());
    }
}
