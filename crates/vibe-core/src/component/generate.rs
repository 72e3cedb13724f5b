//! Intent to component source, checked by [`transform`] before it is
//! accepted.
//!
//! A reply that does not compile is retried with the compiler's complaint
//! appended to the prompt, up to [`MAX_GENERATION_ATTEMPTS`] calls. Rate
//! limiting ends the loop at once; any other gateway failure counts as a
//! failed attempt.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use vibe_gateway::{ModelCallError, ModelGateway};

use super::compiler::transform;
use crate::council::{extract_program, first_json_object};
use crate::{metrics::METRICS, obs};

pub const MAX_GENERATION_ATTEMPTS: u32 = 3;

const GENERATE_SYSTEM: &str = "You generate React components. Write ONE complete, \
self-contained functional component that implements every feature the user asks for.\n\
\n\
- Use the shadcn/ui primitives (Card, Button, Input, Tabs, Progress, Badge, Alert, Select, \
Dialog, Table, ...), lucide-react icons and Tailwind classes.\n\
- Keep local state in useState and make controls interactive.\n\
- Include realistic mock data.\n\
- Avoid top-level type or interface declarations; inline annotations only.\n\
- Export the main component with `export default`.\n\
- Close every string, brace, parenthesis and bracket. Never cut the code short.\n\
\n\
Reply with a single JSON object: {\"appName\": string, \"description\": string, \
\"imports\": [string], \"componentCode\": string, \"mockData\": string}.";

const MODIFY_SYSTEM: &str = "You modify React components. Keep the existing structure, \
apply ONLY the requested change, preserve everything else and keep the same component \
library and style.\n\
\n\
Reply with a single JSON object: {\"updatedCode\": string, \"changes\": [string]} where \
updatedCode is the complete updated component.";

/// What to ask the model for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationRequest {
    /// A new component for `intent`, optionally driven by a VibeCode program.
    Generate {
        intent: String,
        #[serde(default)]
        vibe_code: Option<String>,
    },
    /// Change `current_code` as `modification` describes.
    Modify {
        current_code: String,
        modification: String,
    },
}

impl GenerationRequest {
    pub fn generate(intent: impl Into<String>) -> Self {
        GenerationRequest::Generate {
            intent: intent.into(),
            vibe_code: None,
        }
    }

    pub fn with_vibe_code(intent: impl Into<String>, vibe_code: impl Into<String>) -> Self {
        GenerationRequest::Generate {
            intent: intent.into(),
            vibe_code: Some(vibe_code.into()),
        }
    }

    pub fn modify(current_code: impl Into<String>, modification: impl Into<String>) -> Self {
        GenerationRequest::Modify {
            current_code: current_code.into(),
            modification: modification.into(),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            GenerationRequest::Generate { intent, .. } => intent.trim().is_empty(),
            GenerationRequest::Modify {
                current_code,
                modification,
            } => current_code.trim().is_empty() || modification.trim().is_empty(),
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            GenerationRequest::Generate { .. } => GENERATE_SYSTEM,
            GenerationRequest::Modify { .. } => MODIFY_SYSTEM,
        }
    }

    fn user_prompt(&self) -> String {
        match self {
            GenerationRequest::Generate { intent, vibe_code } => {
                let mut prompt = format!("User intent:\n{}\n", intent.trim());
                if let Some(program) = vibe_code.as_deref().filter(|p| !p.trim().is_empty()) {
                    prompt.push_str(&format!(
                        "\nVibeCode (app states):\n```\n{}\n```\n\nUse these states \
                         (CANDIDATE, RUNNING, COOLING, DONE, ERROR) to drive the UI.\n",
                        program.trim()
                    ));
                }
                prompt.push_str(
                    "\nBuild a complete app: an overview, a section per feature, forms for \
                     input, lists or cards for output and alerts. Before answering, check that \
                     every string and bracket is closed and that the component returns JSX and \
                     is exported by default.",
                );
                prompt
            }
            GenerationRequest::Modify {
                current_code,
                modification,
            } => format!(
                "Current code:\n```tsx\n{}\n```\n\nRequested change:\n{}\n\nApply the change \
                 and keep the rest of the code.",
                current_code.trim(),
                modification.trim()
            ),
        }
    }
}

/// An accepted component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedComponent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    pub component_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_data: Option<String>,
    /// Modify mode only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<String>,
    /// Name the compiler detected.
    pub component_name: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("nothing to generate: the request is empty")]
    EmptyRequest,

    #[error("model call failed: {0}")]
    Gateway(ModelCallError),

    /// Every attempt produced code that did not compile. The last code, if
    /// any, is kept so a host can still show it.
    #[error("no valid component after {attempts} attempt(s): {last_error}")]
    Exhausted {
        attempts: u32,
        last_error: String,
        code: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Reply {
    app_name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    imports: Vec<String>,
    component_code: Option<String>,
    updated_code: Option<String>,
    mock_data: Option<String>,
    #[serde(default)]
    changes: Vec<String>,
}

impl Reply {
    fn code(&self, request: &GenerationRequest) -> Option<&str> {
        let code = match request {
            GenerationRequest::Generate { .. } => self.component_code.as_deref(),
            GenerationRequest::Modify { .. } => self.updated_code.as_deref(),
        };
        code.filter(|c| !c.trim().is_empty())
    }
}

/// Structured reply if the model sent one, else the fenced (or raw) code.
fn read_reply(reply: &str, request: &GenerationRequest) -> Result<(Reply, String), String> {
    if let Some(parsed) = first_json_object(reply)
        .and_then(|json| serde_json::from_str::<Reply>(json).ok())
    {
        if let Some(code) = parsed.code(request) {
            let code = code.to_string();
            return Ok((parsed, code));
        }
    }

    let code = extract_program(reply);
    if code.is_empty() {
        return Err("reply did not contain any code".to_string());
    }
    Ok((Reply::default(), code))
}

fn retry_note(attempt: u32, last_error: &str) -> String {
    format!(
        "\n\nAttempt {attempt}: the previous code was rejected ({last_error}). Return COMPLETE, \
         VALID code and check every string, brace and parenthesis."
    )
}

/// Ask the model for a component until one compiles or the attempts run out.
pub async fn generate_component(
    gateway: &dyn ModelGateway,
    request: &GenerationRequest,
) -> Result<GeneratedComponent, GenerateError> {
    if request.is_blank() {
        return Err(GenerateError::EmptyRequest);
    }

    let system = request.system_prompt();
    let base_prompt = request.user_prompt();
    let mut last_error: Option<String> = None;
    let mut last_code: Option<String> = None;

    for attempt in 1..=MAX_GENERATION_ATTEMPTS {
        let prompt = match &last_error {
            Some(err) => format!("{base_prompt}{}", retry_note(attempt, err)),
            None => base_prompt.clone(),
        };

        let reply = match gateway.complete(system, &prompt).await {
            Ok(reply) => reply,
            Err(err @ ModelCallError::RateLimited { .. }) => {
                return Err(GenerateError::Gateway(err))
            }
            Err(err) if attempt == MAX_GENERATION_ATTEMPTS => {
                return Err(GenerateError::Gateway(err))
            }
            Err(err) => {
                obs::emit_generation_rejected(attempt, &err);
                METRICS.inc_generation_retries();
                last_error = Some(err.to_string());
                continue;
            }
        };

        let (parsed, code) = match read_reply(&reply, request) {
            Ok(read) => read,
            Err(reason) => {
                obs::emit_generation_rejected(attempt, &reason);
                METRICS.inc_generation_retries();
                last_error = Some(reason);
                continue;
            }
        };

        match transform(&code) {
            Ok(program) => {
                info!(
                    component = %program.component_name,
                    attempts = attempt,
                    "component generated"
                );
                return Ok(GeneratedComponent {
                    app_name: parsed.app_name,
                    description: parsed.description,
                    imports: parsed.imports,
                    component_code: code,
                    mock_data: parsed.mock_data,
                    changes: parsed.changes,
                    component_name: program.component_name,
                    attempts: attempt,
                });
            }
            Err(err) => {
                obs::emit_generation_rejected(attempt, &err);
                METRICS.inc_generation_retries();
                last_error = Some(err.to_string());
                last_code = Some(code);
            }
        }
    }

    let last_error = last_error.unwrap_or_else(|| "no attempt was made".to_string());
    warn!(attempts = MAX_GENERATION_ATTEMPTS, error = %last_error, "component generation gave up");
    Err(GenerateError::Exhausted {
        attempts: MAX_GENERATION_ATTEMPTS,
        last_error,
        code: last_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_reply_preferred() {
        let reply = r#"Sure: {"appName": "Timer", "description": "d",
            "componentCode": "function Timer() { return null; }"}"#;
        let (parsed, code) = read_reply(reply, &GenerationRequest::generate("timer")).unwrap();
        assert_eq!(parsed.app_name.as_deref(), Some("Timer"));
        assert_eq!(code, "function Timer() { return null; }");
    }

    #[test]
    fn test_fenced_code_accepted_without_json() {
        let reply = "```tsx\nconst App = () => <div />;\n```";
        let (parsed, code) = read_reply(reply, &GenerationRequest::generate("x")).unwrap();
        assert!(parsed.app_name.is_none());
        assert_eq!(code, "const App = () => <div />;");
    }

    #[test]
    fn test_modify_reads_updated_code() {
        let request = GenerationRequest::modify("function A() {}", "add a title");
        let reply = r#"{"updatedCode": "function A() { return 1; }", "changes": ["title"]}"#;
        let (parsed, code) = read_reply(reply, &request).unwrap();
        assert_eq!(code, "function A() { return 1; }");
        assert_eq!(parsed.changes, vec!["title"]);
        assert!(request.user_prompt().contains("Requested change:\nadd a title"));
    }

    #[test]
    fn test_vibe_code_is_included_in_prompt() {
        let request = GenerationRequest::with_vibe_code("a timer", "set state = RUNNING");
        let prompt = request.user_prompt();
        assert!(prompt.contains("```\nset state = RUNNING\n```"));
        assert!(!GenerationRequest::generate("a timer")
            .user_prompt()
            .contains("VibeCode"));
    }

    #[test]
    fn test_blank_requests() {
        assert!(GenerationRequest::generate("  ").is_blank());
        assert!(GenerationRequest::modify("code", "").is_blank());
        assert!(!GenerationRequest::modify("code", "more").is_blank());
    }
}
