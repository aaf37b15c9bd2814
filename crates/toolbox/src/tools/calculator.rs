use serde::Deserialize;
use stdio_mcp::{text_result, Server, ToolResult, TypedToolHandler};

use super::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    /// Korean name of the operation, used as the result prefix.
    pub fn label(self) -> &'static str {
        match self {
            Operator::Add => "덧셈",
            Operator::Subtract => "뺄셈",
            Operator::Multiply => "곱셈",
            Operator::Divide => "나눗셈",
        }
    }

    /// Plain IEEE-754 arithmetic. Overflow is not an error: it yields `inf`,
    /// which renders as such in the result text.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, ToolError> {
        match self {
            Operator::Add => Ok(a + b),
            Operator::Subtract => Ok(a - b),
            Operator::Multiply => Ok(a * b),
            Operator::Divide if b == 0.0 => Err(ToolError::DivisionByZero),
            Operator::Divide => Ok(a / b),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CalculatorArgs {
    pub num1: f64,
    pub num2: f64,
    pub operator: Operator,
}

pub fn register(srv: &mut Server) {
    srv.handle_tool(
        "calculator",
        TypedToolHandler::new(|args: CalculatorArgs| async move { handle_calculator(args) }),
    );
}

fn handle_calculator(args: CalculatorArgs) -> Result<ToolResult, ToolError> {
    let result = args.operator.apply(args.num1, args.num2)?;
    Ok(text_result(format!(
        "{} 결과: {} {} {} = {}",
        args.operator.label(),
        args.num1,
        args.operator.symbol(),
        args.num2,
        result
    )))
}
