//! The executable form handed to a [`ScriptEngine`](super::ScriptEngine).

use serde::{Deserialize, Serialize};

/// Identifier the wrapped program assigns its component to.
pub const OUTPUT_SLOT: &str = "__vibeComponent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledProgram {
    pub component_name: String,
    /// Plain script: no types, no JSX, no module syntax.
    pub code: String,
}

impl CompiledProgram {
    /// The slot ends up `undefined` when the body never declares
    /// `component_name`.
    pub(crate) fn wrap(body: &str, component_name: &str) -> Self {
        let code = format!(
            "var {OUTPUT_SLOT} = (function () {{\n{body}\nreturn typeof {component_name} === \"undefined\" ? undefined : {component_name};\n}})();\n"
        );
        Self {
            component_name: component_name.to_string(),
            code,
        }
    }

    pub fn output_slot(&self) -> &'static str {
        OUTPUT_SLOT
    }

    /// Body of the function an engine builds with the scope's keys as its
    /// formal parameters.
    pub fn function_body(&self) -> String {
        format!("\"use strict\";\n{}return {OUTPUT_SLOT};\n", self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_assigns_output_slot() {
        let program = CompiledProgram::wrap("function A() {}", "A");
        assert!(program.code.starts_with("var __vibeComponent = (function () {\n"));
        assert!(program
            .code
            .contains("return typeof A === \"undefined\" ? undefined : A;\n})();"));
    }

    #[test]
    fn test_function_body_returns_slot() {
        let program = CompiledProgram::wrap("", "App");
        let body = program.function_body();
        assert!(body.starts_with("\"use strict\";"));
        assert!(body.ends_with("return __vibeComponent;\n"));
    }
}
