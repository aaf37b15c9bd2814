use chrono::{DateTime, Locale, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use stdio_mcp::{text_result, Server, ToolResult, TypedToolHandler};

use super::ToolError;

pub const DEFAULT_TIMEZONE: &str = "Asia/Seoul";

const LONG_FORMAT: &str = "%Y년 %B %-d일 %A %H:%M:%S";

#[derive(Debug, Deserialize)]
pub struct TimeArgs {
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.into()
}

pub fn register(srv: &mut Server) {
    srv.handle_tool(
        "getCurrentTime",
        TypedToolHandler::new(|args: TimeArgs| async move { handle_current_time(args, Utc::now()) }),
    );
}

fn handle_current_time(args: TimeArgs, now: DateTime<Utc>) -> Result<ToolResult, ToolError> {
    let formatted = format_in_zone(now, &args.timezone)?;
    Ok(text_result(format!("현재 시간 ({}): {}", args.timezone, formatted)))
}

/// Long-form Korean rendering of `now` in the named IANA zone.
pub fn format_in_zone(now: DateTime<Utc>, zone: &str) -> Result<String, ToolError> {
    let tz: Tz = zone
        .parse()
        .map_err(|_| ToolError::InvalidTimezone(zone.to_string()))?;
    Ok(now
        .with_timezone(&tz)
        .format_localized(LONG_FORMAT, Locale::ko_KR)
        .to_string())
}
