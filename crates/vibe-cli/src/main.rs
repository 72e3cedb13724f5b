//! Vibe Council CLI
//!
//! The `vibe` command runs the council against a configured model provider
//! and exposes the language and compiler tooling offline.
//!
//! ## Commands
//!
//! - `council`: four personas, cross-evaluation, chairman synthesis
//! - `direct`: a single generation in the council's response shape
//! - `validate`: grammar check of a VibeCode file
//! - `interpret`: drive the state machine through a list of steps
//! - `transpile`: compile UI component source to plain script
//! - `render`: compile and render a component to a JSON tree
//! - `generate`: ask the model for a component that compiles

use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};
use vibe_core::component::{
    generate_component, render_isolated, transform, ComponentCache, ComponentCompiler, ErrorPanel,
    GenerationRequest, JsEngine, Scope, DEFAULT_CACHE_CAPACITY,
};
use vibe_core::{Council, CouncilConfig, GenerationMode, Mode, METRICS};
use vibe_gateway::{HttpModelGateway, ModelGateway};
use vibe_lang::{GrammarProfile, Interpreter, InterpreterError, State};
use vibe_store::{CouncilStore, SurrealCouncilStore};

#[derive(Parser)]
#[command(name = "vibe")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vibe Council: intent to interactive UI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full council pipeline for an intent
    Council {
        /// Intent text, or `-` to read it from stdin
        intent: String,

        #[command(flatten)]
        run: RunArgs,

        /// Call all personas at once instead of one after another
        #[arg(long, env = "COUNCIL_PARALLEL")]
        parallel: bool,

        /// Pause between sequential persona calls
        #[arg(long, env = "COUNCIL_PERSONA_DELAY_MS")]
        delay_ms: Option<u64>,
    },

    /// Generate a single program without evaluation or synthesis
    Direct {
        /// Intent text, or `-` to read it from stdin
        intent: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Validate a VibeCode file
    Validate {
        /// Path to the program, or `-` for stdin
        file: PathBuf,

        /// Grammar profile (fractional | event_blocks)
        #[arg(short, long, env = "VIBE_PROFILE", default_value = "fractional")]
        profile: GrammarProfile,
    },

    /// Run a VibeCode program through a sequence of interpreter steps
    Interpret {
        /// Path to the program, or `-` for stdin
        file: PathBuf,

        /// Grammar profile (fractional | event_blocks)
        #[arg(short, long, env = "VIBE_PROFILE", default_value = "fractional")]
        profile: GrammarProfile,

        /// Steps: a state name, `friction=<n>`, `increase=<n>` or `reset`
        #[arg(short, long = "step")]
        steps: Vec<Step>,
    },

    /// Compile UI component source (TSX/JSX) to plain script
    Transpile {
        /// Path to the component source, or `-` for stdin
        file: PathBuf,

        /// Print the compiled program as JSON
        #[arg(long)]
        as_json: bool,
    },

    /// Compile a component and print its rendered tree
    Render {
        /// Path to the component source, or `-` for stdin
        file: PathBuf,

        /// Props passed to the component, as a JSON object
        #[arg(long, default_value = "{}")]
        props: String,
    },

    /// Generate a UI component for an intent
    Generate {
        /// Intent text (the requested change with --modify), or `-` for stdin
        intent: String,

        /// VibeCode program whose states should drive the UI
        #[arg(long)]
        vibe: Option<PathBuf>,

        /// Existing component source to modify instead of starting fresh
        #[arg(long, conflicts_with = "vibe")]
        modify: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Grammar profile (fractional | event_blocks)
    #[arg(short, long, env = "VIBE_PROFILE")]
    profile: Option<GrammarProfile>,

    /// Keep results in memory instead of `SURREALDB_URL`
    #[arg(long)]
    ephemeral: bool,
}

/// One interpreter action.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Transition(State),
    SetFriction(f64),
    IncreaseFriction(f64),
    Reset,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let number = |raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| format!("not a number: {raw}"))
        };
        if s.eq_ignore_ascii_case("reset") {
            return Ok(Step::Reset);
        }
        if let Some(raw) = s.strip_prefix("friction=") {
            return number(raw).map(Step::SetFriction);
        }
        if let Some(raw) = s.strip_prefix("increase=") {
            return number(raw).map(Step::IncreaseFriction);
        }
        s.parse::<State>()
            .map(Step::Transition)
            .map_err(|e| e.to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    vibe_core::telemetry::init_tracing(cli.json, level);

    let result = match cli.command {
        Commands::Council {
            intent,
            run,
            parallel,
            delay_ms,
        } => {
            let generation = match (parallel, delay_ms) {
                (true, _) => Some(GenerationMode::Parallel),
                (false, Some(delay_ms)) => Some(GenerationMode::Sequential { delay_ms }),
                (false, None) => None,
            };
            cmd_run(&intent, Mode::Council, &run, generation).await
        }
        Commands::Direct { intent, run } => cmd_run(&intent, Mode::Direct, &run, None).await,
        Commands::Validate { file, profile } => cmd_validate(&file, profile),
        Commands::Interpret {
            file,
            profile,
            steps,
        } => cmd_interpret(&file, profile, &steps),
        Commands::Transpile { file, as_json } => cmd_transpile(&file, as_json),
        Commands::Render { file, props } => cmd_render(&file, &props),
        Commands::Generate {
            intent,
            vibe,
            modify,
        } => cmd_generate(&intent, vibe.as_deref(), modify.as_deref()).await,
    };

    METRICS.flush();
    result
}

async fn cmd_run(
    intent: &str,
    mode: Mode,
    args: &RunArgs,
    generation: Option<GenerationMode>,
) -> Result<()> {
    let intent = if intent == "-" {
        read_input(Path::new("-"))?
    } else {
        intent.to_string()
    };

    let mut config = CouncilConfig::from_env().context("Invalid council configuration")?;
    if let Some(profile) = args.profile {
        config = config.with_profile(profile);
    }
    if let Some(generation) = generation {
        config = config.with_generation(generation);
    }

    let gateway: Arc<dyn ModelGateway> =
        Arc::new(HttpModelGateway::from_env().context("Failed to configure model gateway")?);
    let store = open_store(args.ephemeral).await?;
    info!(gateway = %gateway.describe(), mode = %mode, "starting council run");

    let response = Council::new(gateway, store, config)
        .run(&intent, mode)
        .await
        .context("Council run rejected")?;
    print_json(&response)
}

async fn open_store(ephemeral: bool) -> Result<Arc<dyn CouncilStore>> {
    let store = if ephemeral {
        SurrealCouncilStore::in_memory().await
    } else {
        SurrealCouncilStore::from_env().await
    }
    .context("Failed to open conversation store")?;
    Ok(Arc::new(store))
}

fn cmd_validate(file: &Path, profile: GrammarProfile) -> Result<()> {
    let source = read_input(file)?;
    let validation = vibe_lang::validate_with(&source, profile);
    print_json(&validation)?;
    if !validation.valid {
        bail!("{} grammar error(s)", validation.errors.len());
    }
    Ok(())
}

#[derive(Serialize)]
struct StepOutcome {
    step: String,
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection: Option<String>,
    state: State,
    friction: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InterpretReport {
    valid: bool,
    errors: Vec<String>,
    steps: Vec<StepOutcome>,
    state: State,
    friction: f64,
    opacity: f64,
    color: &'static str,
    available_transitions: Vec<State>,
    history_len: usize,
}

fn cmd_interpret(file: &Path, profile: GrammarProfile, steps: &[Step]) -> Result<()> {
    let source = read_input(file)?;
    let mut interpreter = Interpreter::from_source_with(&source, profile);
    let outcomes = steps
        .iter()
        .map(|step| apply_step(&mut interpreter, step))
        .collect();
    print_json(&report(&interpreter, outcomes))
}

fn apply_step(interpreter: &mut Interpreter, step: &Step) -> StepOutcome {
    let result: Result<(), InterpreterError> = match step {
        Step::Transition(state) => interpreter.try_transition_to(*state),
        Step::SetFriction(value) => interpreter.try_set_friction(*value),
        Step::IncreaseFriction(delta) => {
            if interpreter.increase_friction(*delta) {
                Ok(())
            } else {
                interpreter.last_rejection().cloned().map_or(Ok(()), Err)
            }
        }
        Step::Reset => {
            interpreter.reset();
            Ok(())
        }
    };
    StepOutcome {
        step: format!("{step:?}"),
        accepted: result.is_ok(),
        rejection: result.err().map(|e| e.to_string()),
        state: interpreter.state(),
        friction: interpreter.friction(),
    }
}

fn report(interpreter: &Interpreter, steps: Vec<StepOutcome>) -> InterpretReport {
    let parsed = interpreter.parsed();
    InterpretReport {
        valid: parsed.is_valid,
        errors: parsed.errors.clone(),
        steps,
        state: interpreter.state(),
        friction: interpreter.friction(),
        opacity: interpreter.friction_opacity(),
        color: interpreter.state_color(),
        available_transitions: interpreter.available_transitions(),
        history_len: interpreter.context().history().len(),
    }
}

fn cmd_transpile(file: &Path, as_json: bool) -> Result<()> {
    let source = read_input(file)?;
    match transform(&source) {
        Ok(program) if as_json => print_json(&program),
        Ok(program) => {
            print!("{}", program.code);
            Ok(())
        }
        Err(err) => {
            print_json(&ErrorPanel::from_compile(&err, &source))?;
            Err(err).context("Component source did not compile")
        }
    }
}

fn cmd_render(file: &Path, props: &str) -> Result<()> {
    let source = read_input(file)?;
    let props: serde_json::Value =
        serde_json::from_str(props).context("--props must be a JSON object")?;
    let compiler = ComponentCompiler::new(
        Arc::new(JsEngine::new()),
        Scope::default_ui(),
        ComponentCache::new(DEFAULT_CACHE_CAPACITY),
    );

    let component = match compiler.compile(&source) {
        Ok(component) => component,
        Err(err) => {
            print_json(&ErrorPanel::from_compile(&err, &source))?;
            return Err(err).context("Component source did not compile");
        }
    };
    match render_isolated(component.as_ref(), &props) {
        Ok(tree) => print_json(&tree),
        Err(err) => {
            print_json(&ErrorPanel::from(&err))?;
            Err(err).context("Component failed to render")
        }
    }
}

async fn cmd_generate(intent: &str, vibe: Option<&Path>, modify: Option<&Path>) -> Result<()> {
    let intent = if intent == "-" {
        read_input(Path::new("-"))?
    } else {
        intent.to_string()
    };
    let request = match (modify, vibe) {
        (Some(current), _) => GenerationRequest::modify(read_input(current)?, intent),
        (None, Some(program)) => GenerationRequest::with_vibe_code(intent, read_input(program)?),
        (None, None) => GenerationRequest::generate(intent),
    };

    let gateway = HttpModelGateway::from_env().context("Failed to configure model gateway")?;
    info!(gateway = %gateway.describe(), "generating component");
    let generated = generate_component(&gateway, &request)
        .await
        .context("Component generation failed")?;
    print_json(&generated)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}
