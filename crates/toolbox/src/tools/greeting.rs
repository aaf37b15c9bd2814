use serde::Deserialize;
use stdio_mcp::{text_result, Server, ToolResult, TypedToolHandler};

use super::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Korean,
    English,
    Japanese,
    Chinese,
    Spanish,
    French,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Korean,
        Language::English,
        Language::Japanese,
        Language::Chinese,
        Language::Spanish,
        Language::French,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::Korean => "korean",
            Language::English => "english",
            Language::Japanese => "japanese",
            Language::Chinese => "chinese",
            Language::Spanish => "spanish",
            Language::French => "french",
        }
    }

    /// Greeting template; `{name}` is the substitution point.
    fn template(self) -> &'static str {
        match self {
            Language::Korean => "안녕하세요, {name}님! 만나서 반갑습니다.",
            Language::English => "Hello, {name}! Nice to meet you.",
            Language::Japanese => "こんにちは、{name}さん！お会いできて嬉しいです。",
            Language::Chinese => "你好，{name}！很高兴见到你。",
            Language::Spanish => "¡Hola, {name}! Encantado de conocerte.",
            Language::French => "Bonjour, {name}! Ravi de vous rencontrer.",
        }
    }

    pub fn greet(self, name: &str) -> String {
        self.template().replace("{name}", name)
    }
}

#[derive(Debug, Deserialize)]
pub struct GreetingArgs {
    pub name: String,
    pub language: Language,
}

pub fn register(srv: &mut Server) {
    srv.handle_tool(
        "greeting",
        TypedToolHandler::new(|args: GreetingArgs| async move { handle_greeting(args) }),
    );
}

fn handle_greeting(args: GreetingArgs) -> Result<ToolResult, ToolError> {
    tracing::debug!(language = args.language.code(), "greeting");
    Ok(text_result(args.language.greet(&args.name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_interpolates_name() {
        for lang in Language::ALL {
            let text = lang.greet("Mina");
            assert!(text.contains("Mina"), "{}: {}", lang.code(), text);
            assert!(!text.contains("{name}"));
        }
    }

    #[test]
    fn test_codes_round_trip_through_serde() {
        for lang in Language::ALL {
            let parsed: Language = serde_json::from_value(lang.code().into()).unwrap();
            assert_eq!(parsed, lang);
        }
        assert!(serde_json::from_value::<Language>("german".into()).is_err());
    }

    #[test]
    fn test_korean_template() {
        assert_eq!(
            Language::Korean.greet("민수"),
            "안녕하세요, 민수님! 만나서 반갑습니다."
        );
    }
}
