pub mod calculator;
pub mod greeting;
pub mod image;
pub mod time;

use std::sync::Arc;

use crate::imagegen::{ImageApi, ImageError};

/// Shared dependencies for tool handlers.
pub struct Deps {
    pub images: Arc<dyn ImageApi>,
    pub hf_token: Option<String>,
}

/// Business failures. Each one reaches the caller as an error-flagged
/// text result, never as a protocol error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("오류: 0으로 나눌 수 없습니다.")]
    DivisionByZero,
    #[error("잘못된 시간대입니다: {0}")]
    InvalidTimezone(String),
    #[error("HF_TOKEN 환경 변수가 설정되지 않았습니다.")]
    MissingCredential,
    #[error("이미지 생성 중 오류가 발생했습니다: {0}")]
    Image(#[from] ImageError),
}

/// Register all tool handlers on the given MCP server.
pub fn register_all(srv: &mut stdio_mcp::Server, deps: Arc<Deps>) {
    greeting::register(srv);
    calculator::register(srv);
    time::register(srv);
    image::register(srv, deps);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagegen::mock::MockImageApi;
    use crate::imagegen::ImageOutput;
    use stdio_mcp::types::ERR_CODE_BAD_PARAMS;
    use stdio_mcp::{JsonRpcRequest, JsonRpcResponse, ToolResult};
    use serde_json::{json, Value};

    fn setup(token: Option<&str>, output: ImageOutput) -> (stdio_mcp::Server, Arc<MockImageApi>) {
        let api = Arc::new(MockImageApi::new(output));
        let deps = Arc::new(Deps {
            images: api.clone(),
            hf_token: token.map(String::from),
        });
        (crate::build_server(deps), api)
    }

    fn setup_server() -> stdio_mcp::Server {
        setup(None, ImageOutput::Bytes(Vec::new())).0
    }

    async fn rpc(srv: &stdio_mcp::Server, method: &str, params: Value) -> JsonRpcResponse {
        let req = JsonRpcRequest {
            jsonrpc: "2.0".into(),
            id: Some(json!(1)),
            method: method.into(),
            params: Some(params),
        };
        srv.handle(req).await
    }

    async fn call_tool(srv: &stdio_mcp::Server, name: &str, args: Value) -> ToolResult {
        let resp = rpc(srv, "tools/call", json!({"name": name, "arguments": args})).await;
        assert!(resp.error.is_none(), "unexpected protocol error: {:?}", resp.error);
        serde_json::from_value(resp.result.unwrap()).unwrap()
    }

    async fn call_rejected(srv: &stdio_mcp::Server, name: &str, args: Value) -> i32 {
        let resp = rpc(srv, "tools/call", json!({"name": name, "arguments": args})).await;
        resp.error.expect("expected a protocol error").code
    }

    fn text(result: &ToolResult) -> &str {
        assert_eq!(result.content.len(), 1);
        result.content[0].as_text().unwrap()
    }

    // ─── Greeting ───

    #[tokio::test]
    async fn test_greeting_all_languages() {
        let srv = setup_server();
        for lang in greeting::Language::ALL {
            let result = call_tool(&srv, "greeting", json!({"name": "Kim", "language": lang.code()})).await;
            assert!(!result.is_error);
            assert_eq!(text(&result), lang.greet("Kim"));
        }
    }

    #[tokio::test]
    async fn test_greeting_unsupported_language_rejected() {
        let srv = setup_server();
        let code = call_rejected(&srv, "greeting", json!({"name": "Kim", "language": "german"})).await;
        assert_eq!(code, ERR_CODE_BAD_PARAMS);
    }

    #[tokio::test]
    async fn test_greeting_empty_name_rejected() {
        let srv = setup_server();
        let code = call_rejected(&srv, "greeting", json!({"name": "", "language": "english"})).await;
        assert_eq!(code, ERR_CODE_BAD_PARAMS);
    }

    // ─── Calculator ───

    #[tokio::test]
    async fn test_calculator_operations() {
        let srv = setup_server();
        let cases = [
            ("+", "덧셈 결과: 6 + 3 = 9"),
            ("-", "뺄셈 결과: 6 - 3 = 3"),
            ("*", "곱셈 결과: 6 * 3 = 18"),
            ("/", "나눗셈 결과: 6 / 3 = 2"),
        ];
        for (op, expected) in cases {
            let result = call_tool(&srv, "calculator", json!({"num1": 6, "num2": 3, "operator": op})).await;
            assert!(!result.is_error);
            assert_eq!(text(&result), expected);
        }
    }

    #[tokio::test]
    async fn test_calculator_division_by_zero_flagged() {
        let srv = setup_server();
        let result = call_tool(&srv, "calculator", json!({"num1": 1, "num2": 0, "operator": "/"})).await;
        assert!(result.is_error);
        assert!(text(&result).contains("0으로 나눌 수 없습니다"));
    }

    #[tokio::test]
    async fn test_calculator_bad_operator_rejected() {
        let srv = setup_server();
        let code = call_rejected(&srv, "calculator", json!({"num1": 1, "num2": 2, "operator": "%"})).await;
        assert_eq!(code, ERR_CODE_BAD_PARAMS);
        let code = call_rejected(&srv, "calculator", json!({"num1": "1", "num2": 2, "operator": "+"})).await;
        assert_eq!(code, ERR_CODE_BAD_PARAMS);
    }

    // ─── Current time ───

    #[tokio::test]
    async fn test_current_time_valid_zone() {
        let srv = setup_server();
        let result = call_tool(&srv, "getCurrentTime", json!({"timezone": "Europe/London"})).await;
        assert!(!result.is_error);
        assert!(text(&result).contains("Europe/London"));
    }

    #[tokio::test]
    async fn test_current_time_default_zone() {
        let srv = setup_server();
        let result = call_tool(&srv, "getCurrentTime", json!({})).await;
        assert!(!result.is_error);
        assert!(text(&result).starts_with("현재 시간 (Asia/Seoul): "));

        let explicit = call_tool(&srv, "getCurrentTime", json!({"timezone": "Asia/Seoul"})).await;
        assert!(text(&explicit).starts_with("현재 시간 (Asia/Seoul): "));
    }

    #[tokio::test]
    async fn test_current_time_invalid_zone() {
        let srv = setup_server();
        let result = call_tool(&srv, "getCurrentTime", json!({"timezone": "Not/AZone"})).await;
        assert!(result.is_error);
        assert!(text(&result).contains("잘못된 시간대"));
        assert!(text(&result).contains("Not/AZone"));
    }

    // ─── Image generation ───

    #[tokio::test]
    async fn test_generate_image_without_token() {
        let (srv, api) = setup(None, ImageOutput::Bytes(b"png".to_vec()));
        let result = call_tool(&srv, "generateImage", json!({"prompt": "a lighthouse"})).await;
        assert!(result.is_error);
        assert!(text(&result).contains("HF_TOKEN"));
        assert_eq!(api.generate_calls(), 0);
        assert_eq!(api.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_image_wire_shape() {
        let (srv, api) = setup(Some("hf_x"), ImageOutput::Bytes(b"png".to_vec()));
        let resp = rpc(&srv, "tools/call", json!({"name": "generateImage", "arguments": {"prompt": "a lighthouse"}})).await;
        let result = resp.result.unwrap();
        let block = &result["content"][0];
        assert_eq!(block["type"], "image");
        assert_eq!(block["mimeType"], "image/png");
        assert!(!block["data"].as_str().unwrap().is_empty());
        assert_eq!(block["annotations"]["audience"], json!(["user"]));
        assert_eq!(block["annotations"]["priority"], 0.9);
        assert!(result.get("isError").is_none());
        assert_eq!(api.generate_calls(), 1);
    }

    #[tokio::test]
    async fn test_generate_image_url_single_fetch() {
        let (srv, api) = setup(Some("hf_x"), ImageOutput::Url("https://cdn.example.com/x.png".into()));
        let result = call_tool(&srv, "generateImage", json!({"prompt": "a lighthouse"})).await;
        assert!(!result.is_error);
        assert_eq!(api.generate_calls(), 1);
        assert_eq!(api.fetch_calls(), 1);
    }

    // ─── Listings ───

    #[tokio::test]
    async fn test_tools_list_declares_four_tools() {
        let srv = setup_server();
        assert_eq!(
            srv.tool_names(),
            vec!["greeting", "calculator", "getCurrentTime", "generateImage"]
        );
        let resp = rpc(&srv, "tools/list", json!({})).await;
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().len();
        assert_eq!(tools, 4);
    }
}
