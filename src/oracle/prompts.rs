//! Prompt text for the chat-completion oracles

pub const REASONING_SYSTEM: &str = "You are a Python programmer. Analyze the problem technically, considering:
- Input/Output specifications
- Edge cases and potential failure points
- Performance considerations
- Implementation constraints
If previous attempts are provided, study their failures and avoid repeating them.";

pub const CODE_SYSTEM: &str = "You are a Python programmer. Generate clean, efficient, and well-commented code based on the given reasoning and requirements.
The code has to execute without asking for any user input.
Follow these output guidelines:
- Print test results in a clean, structured way
- Avoid printing intermediate results unless necessary
- If using assertions, catch AssertionError and print a clean summary
- Format the output to be easily readable
IMPORTANT: Do not include markdown formatting or ```python blocks. Provide only the raw Python code.";

pub const EVALUATOR_SYSTEM: &str = r#"You are a technical code reviewer. Evaluate the code implementation and output.
Return a JSON object with the following structure:
{
    "success": boolean,
    "feedback": {
        "technical_analysis": "Detailed technical analysis of the implementation",
        "failure_points": ["List of specific technical issues if any"],
        "suggestions": ["Specific technical improvements"],
        "performance_notes": "Notes about code efficiency and performance",
        "edge_cases": ["Edge cases that might cause issues"]
    }
}
Focus on technical aspects like algorithm choice, error handling, edge cases, and performance."#;

/// User prompt for the planning call. `context` is the rendered history,
/// empty on the first attempt.
pub fn reasoning_prompt(instruction: &str, context: &str) -> String {
    let mut prompt = format!(
        "Technically analyze this problem and provide a detailed solution approach: {}",
        instruction
    );
    if !context.is_empty() {
        prompt.push_str("\n\n");
        prompt.push_str(context);
        prompt.push_str("\nConsider this history while planning the solution.");
    }
    prompt
}

pub fn code_prompt(instruction: &str, reasoning: &str) -> String {
    format!(
        "Based on this reasoning:\n{}\n\nGenerate Python code that: {}",
        reasoning, instruction
    )
}

pub fn evaluation_prompt(instruction: &str, code: &str, output: &str) -> String {
    format!(
        "Instruction: {}\nCode:\n{}\nOutput:\n{}\n\nProvide a technical evaluation of this implementation.",
        instruction, code, output
    )
}
