use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use stdio_mcp::{ContentBlock, McpError, PromptHandler, PromptMessage, PromptResult, Role, Server};

/// Review sections, in the order they appear in the prompt.
pub const REVIEW_FOCUS_AREAS: [(&str, &str); 8] = [
    ("코드 품질과 가독성", "명명 규칙, 구조, 주석이 적절한지"),
    ("성능", "불필요한 연산, 비효율적인 자료구조나 알고리즘이 없는지"),
    ("보안", "입력 검증, 민감 정보 노출, 취약점이 없는지"),
    ("버그와 오류 처리", "잠재적 버그, 경계 조건, 예외 처리가 충분한지"),
    ("모범 사례", "언어와 프레임워크의 관례를 따르는지"),
    ("테스트 용이성", "단위 테스트를 작성하기 쉬운 구조인지"),
    ("유지보수성", "변경과 확장이 쉬운지, 중복이 없는지"),
    ("개선 제안", "구체적인 수정 코드와 함께 제안"),
];

/// Render the review request. Empty optional values count as absent.
pub fn render_code_review(code: &str, language: Option<&str>, context: Option<&str>) -> String {
    let language = language.unwrap_or_default();
    let mut out = String::from("다음 코드를 리뷰해 주세요.\n\n");

    out.push_str(&format!("```{}\n{}\n```\n\n", language, code));

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        out.push_str(&format!("추가 컨텍스트: {}\n\n", context));
    }

    out.push_str("다음 관점에서 분석해 주세요:\n\n");
    for (i, (title, detail)) in REVIEW_FOCUS_AREAS.iter().enumerate() {
        out.push_str(&format!("{}. **{}**: {}\n", i + 1, title, detail));
    }
    out.push_str("\n각 항목마다 발견한 문제와 근거를 설명하고, 심각도 순으로 정리해 주세요.");
    out
}

struct CodeReviewPrompt;

#[async_trait]
impl PromptHandler for CodeReviewPrompt {
    async fn call(&self, args: HashMap<String, String>) -> Result<PromptResult, McpError> {
        let code = args
            .get("code")
            .ok_or_else(|| McpError::Validation("code required".into()))?;
        let text = render_code_review(
            code,
            args.get("language").map(String::as_str),
            args.get("context").map(String::as_str),
        );
        Ok(PromptResult {
            description: Some("Structured code review request".into()),
            messages: vec![PromptMessage {
                role: Role::User,
                content: ContentBlock::text(text),
            }],
        })
    }
}

pub fn register(srv: &mut Server) {
    srv.handle_prompt("code_review", Arc::new(CodeReviewPrompt));
}
