//! Compiler, cache and render boundary working together.

use std::sync::Arc;

use serde_json::json;
use vibe_core::component::fakes::{RenderBehavior, ScriptedEngine};
use vibe_core::component::{EngineLimits, JsEngine, FALLBACK_COMPONENT, OUTPUT_SLOT};
use vibe_core::{
    render_isolated, render_or_panel, CompileError, ComponentCache, ComponentCompiler, ErrorPanel,
    RenderTree, Scope,
};

const COUNTER: &str = r#"import { useState } from "react";
import { Card, CardContent } from "@/components/ui/card";

type Props = { start?: number };

const Counter = ({ start = 0 }: Props) => {
  const [n, setN] = useState(start);
  return (
    <Card>
      <CardContent onClick={() => setN(n + 1)}>{n}</CardContent>
    </Card>
  );
};

export default Counter;
"#;

fn compiler(engine: Arc<ScriptedEngine>, capacity: usize) -> ComponentCompiler {
    ComponentCompiler::new(engine, Scope::default_ui(), ComponentCache::new(capacity))
}

#[test]
fn identical_source_is_compiled_once() {
    let engine = Arc::new(ScriptedEngine::new());
    let compiler = compiler(engine.clone(), 8);

    let first = compiler.compile(COUNTER).unwrap();
    let second = compiler.compile(COUNTER).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.instantiations(), 1);
    assert_eq!(first.name(), "Counter");

    let program = engine.last_program().unwrap();
    assert!(program.code.starts_with(&format!("var {OUTPUT_SLOT} = ")));
    assert!(!program.code.contains("Props"));
    assert!(program.code.contains("React.createElement(Card, null"));
}

#[test]
fn engine_receives_scope_keys_as_parameters() {
    let engine = Arc::new(ScriptedEngine::new());
    let scope = Scope::empty()
        .with("React", vibe_core::component::Capability::Runtime)
        .with("useState", vibe_core::component::Capability::Hook);
    let compiler = ComponentCompiler::new(engine.clone(), scope, ComponentCache::new(4));

    compiler.compile("function App() { return <p>x</p>; }").unwrap();
    assert_eq!(engine.last_parameters(), vec!["React", "useState"]);
}

#[test]
fn failures_are_not_cached() {
    let engine = Arc::new(ScriptedEngine::failing(CompileError::Engine {
        message: "ReferenceError: Chart is not defined (3:10)".into(),
    }));
    let compiler = compiler(engine.clone(), 8);
    let source = "function App() {\n  return (\n    <Chart />\n  );\n}";

    let err = compiler.compile(source).unwrap_err();
    let panel = ErrorPanel::from_compile(&err, source);
    assert_eq!(panel.line, Some(3));
    assert_eq!(panel.column, Some(10));
    assert_eq!(panel.source_line.as_deref(), Some("    <Chart />"));
    assert!(compiler.cache().is_empty());

    engine.succeed_with(RenderBehavior::Echo);
    let component = compiler.compile(source).unwrap();
    assert_eq!(component.name(), "App");
    assert_eq!(engine.instantiations(), 2);
    assert_eq!(compiler.cache().len(), 1);
}

#[test]
fn syntax_errors_never_reach_the_engine() {
    let engine = Arc::new(ScriptedEngine::new());
    let compiler = compiler(engine.clone(), 8);

    let err = compiler.compile("const App = () => (<div>hi</div>;").unwrap_err();
    assert!(matches!(err, CompileError::Syntax { .. }));
    assert_eq!(engine.instantiations(), 0);
}

#[test]
fn least_recently_used_component_is_evicted() {
    let engine = Arc::new(ScriptedEngine::new());
    let compiler = compiler(engine.clone(), 2);
    let a = "function A() { return null; }";
    let b = "function B() { return null; }";
    let c = "function C() { return null; }";

    compiler.compile(a).unwrap();
    compiler.compile(b).unwrap();
    compiler.compile(a).unwrap();
    compiler.compile(c).unwrap();

    assert!(compiler.cache().contains(a));
    assert!(!compiler.cache().contains(b));
    assert_eq!(engine.instantiations(), 3);
}

#[test]
fn anonymous_default_export_is_bound_to_app() {
    let engine = Arc::new(ScriptedEngine::new());
    let compiler = compiler(engine.clone(), 2);
    let component = compiler.compile("export default () => <div />;").unwrap();
    assert_eq!(component.name(), FALLBACK_COMPONENT);

    let code = engine.last_program().unwrap().code;
    assert!(code.contains("var App = () => React.createElement(\"div\", null)"));
    assert!(code.contains("? undefined : App;"));
}

#[test]
fn panicking_component_is_contained() {
    let engine = Arc::new(ScriptedEngine::rendering(RenderBehavior::Panic(
        "Cannot read properties of undefined".into(),
    )));
    let component = compiler(engine, 2)
        .compile("function Broken() { return null; }")
        .unwrap();

    let err = render_isolated(component.as_ref(), &json!({})).unwrap_err();
    assert!(err.panicked);
    assert_eq!(err.component, "Broken");

    let tree = render_or_panel(component.as_ref(), &json!({}));
    assert!(matches!(tree, RenderTree::Element { ref tag, .. } if tag == "div"));
    assert!(tree.text_content().contains("Cannot read properties of undefined"));
}

#[test]
fn healthy_component_renders_props() {
    let engine = Arc::new(ScriptedEngine::new());
    let component = compiler(engine, 2).compile(COUNTER).unwrap();
    let tree = render_isolated(component.as_ref(), &json!({"start": 3})).unwrap();
    assert!(tree.text_content().contains("\"start\":3"));
}

fn js_compiler() -> ComponentCompiler {
    ComponentCompiler::new(
        Arc::new(JsEngine::new()),
        Scope::default_ui(),
        ComponentCache::new(8),
    )
}

#[test]
fn js_engine_renders_counter_with_props() {
    let component = js_compiler().compile(COUNTER).unwrap();
    assert_eq!(component.name(), "Counter");

    let tree = render_isolated(component.as_ref(), &json!({"start": 2})).unwrap();
    let RenderTree::Element { tag, children, .. } = &tree else {
        panic!("expected an element, got {tree:?}");
    };
    assert_eq!(tag, "Card");
    assert!(matches!(&children[0], RenderTree::Element { tag, .. } if tag == "CardContent"));
    assert_eq!(tree.text_content().trim(), "2");
}

#[test]
fn js_engine_renders_lists_and_drops_handlers() {
    let source = r#"interface TodoProps {
  items: string[];
}

function TodoList({ items }: TodoProps) {
  const [filter] = useState("all");
  return (
    <ul className="list" data-filter={filter} onClick={() => {}}>
      {items.map((item) => <li key={item}>{item}</li>)}
    </ul>
  );
}"#;
    let component = js_compiler().compile(source).unwrap();
    let tree = render_isolated(component.as_ref(), &json!({"items": ["a", "b"]})).unwrap();

    let RenderTree::Element { tag, props, .. } = &tree else {
        panic!("expected an element, got {tree:?}");
    };
    assert_eq!(tag, "ul");
    assert_eq!(props, &json!({"className": "list", "data-filter": "all"}));
    assert_eq!(tree.text_content().trim(), "ab");
}

#[test]
fn js_engine_rejects_source_without_component() {
    let compiler = js_compiler();

    let err = compiler.compile("const total = 3;").unwrap_err();
    assert_eq!(
        err,
        CompileError::NotAComponent {
            found: "undefined".into()
        }
    );

    let err = compiler.compile("const App = 42;").unwrap_err();
    assert_eq!(
        err,
        CompileError::NotAComponent {
            found: "number".into()
        }
    );
    assert!(compiler.cache().is_empty());
}

#[test]
fn js_engine_reports_top_level_throw_as_engine_error() {
    let err = js_compiler()
        .compile("throw new Error(\"top\");\nfunction App() { return null; }")
        .unwrap_err();
    assert!(matches!(err, CompileError::Engine { .. }));
}

#[test]
fn js_engine_contains_thrown_render_error() {
    let component = js_compiler()
        .compile("function Boom() {\n  throw new Error(\"boom\");\n}")
        .unwrap();

    let err = render_isolated(component.as_ref(), &json!({})).unwrap_err();
    assert!(!err.panicked);
    assert_eq!(err.component, "Boom");
    assert_eq!(err.message, "Error: boom");

    let tree = render_or_panel(component.as_ref(), &json!({}));
    assert!(tree.text_content().contains("Error: boom"));
}

#[test]
fn js_engine_aborts_runaway_loops() {
    let compiler = ComponentCompiler::new(
        Arc::new(JsEngine::with_limits(EngineLimits {
            loop_iterations: 10_000,
            ..EngineLimits::default()
        })),
        Scope::default_ui(),
        ComponentCache::new(2),
    );
    let component = compiler
        .compile("function Spin() {\n  while (true) {}\n}")
        .unwrap();

    assert!(render_isolated(component.as_ref(), &json!({})).is_err());
}
