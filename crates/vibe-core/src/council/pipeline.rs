//! Council orchestration: Stage 1 -> Stage 2 -> Stage 3, or direct mode.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::Instrument;
use vibe_gateway::ModelGateway;
use vibe_store::{ConversationId, ConversationStatus, CouncilStore, Stage};

use super::error::{CouncilError, CouncilResult};
use super::evaluation::run_stage2;
use super::generation::{generate_one, run_stage1};
use super::personas::Persona;
use super::synthesis::run_stage3;
use super::types::{CouncilResponse, Generation, Mode, Stage2Result, Stage3Result};
use crate::config::CouncilConfig;
use crate::metrics::METRICS;
use crate::obs;

pub const DIRECT_RECOMMENDATION: &str = "No evaluation performed (direct mode)";

/// Drives one intent through the council.
///
/// Model and storage failures degrade the result but never abort a run;
/// only an empty intent is refused.
pub struct Council {
    gateway: Arc<dyn ModelGateway>,
    store: Arc<dyn CouncilStore>,
    personas: Vec<Persona>,
    chairman: Persona,
    config: CouncilConfig,
}

impl Council {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        store: Arc<dyn CouncilStore>,
        config: CouncilConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            personas: Persona::council(),
            chairman: Persona::chairman(config.chairman_id.clone()),
            config,
        }
    }

    pub fn with_personas(mut self, personas: Vec<Persona>) -> Self {
        self.personas = personas;
        self
    }

    pub fn with_chairman(mut self, chairman: Persona) -> Self {
        self.chairman = chairman;
        self
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn config(&self) -> &CouncilConfig {
        &self.config
    }

    pub async fn run(&self, intent: &str, mode: Mode) -> CouncilResult<CouncilResponse> {
        let intent = intent.trim();
        if intent.is_empty() {
            return Err(CouncilError::EmptyIntent);
        }

        let mut recorder = Recorder::open(self.store.as_ref(), intent).await;
        let span = obs::run_span(recorder.id.as_str());
        self.run_recorded(intent, mode, &mut recorder)
            .instrument(span)
            .await
    }

    async fn run_recorded(
        &self,
        intent: &str,
        mode: Mode,
        recorder: &mut Recorder<'_>,
    ) -> CouncilResult<CouncilResponse> {
        let started = Instant::now();
        obs::emit_run_started(recorder.id.as_str(), mode.as_str(), intent.len());
        METRICS.inc_pipeline_runs();

        let (stage1, stage2, stage3) = match mode {
            Mode::Council => self.council_stages(intent, recorder).await,
            Mode::Direct => self.direct_stages(intent, recorder).await,
        };

        recorder.finish().await;
        obs::emit_run_finished(
            recorder.id.as_str(),
            elapsed_ms(started),
            &stage3.chairman,
            stage3.validation.valid,
        );

        Ok(CouncilResponse {
            conversation_id: recorder.id.0.clone(),
            stage1,
            stage2,
            stage3,
            mode,
        })
    }

    async fn council_stages(
        &self,
        intent: &str,
        recorder: &mut Recorder<'_>,
    ) -> (Vec<Generation>, Stage2Result, Stage3Result) {
        let profile = self.config.profile;

        let t = Instant::now();
        let stage1 = run_stage1(
            Arc::clone(&self.gateway),
            &self.personas,
            intent,
            profile,
            self.config.generation,
        )
        .await;
        let valid = stage1.iter().filter(|g| g.is_valid()).count();
        obs::emit_stage_finished("stage1", stage1.len(), valid, elapsed_ms(t));
        recorder
            .save(Stage::Stage1, &json!({ "generations": &stage1 }))
            .await;

        let t = Instant::now();
        let stage2 = run_stage2(self.gateway.as_ref(), intent, &stage1).await;
        obs::emit_stage_finished("stage2", stage2.ranking.len(), valid, elapsed_ms(t));
        recorder.save(Stage::Stage2, &stage2).await;

        let t = Instant::now();
        let stage3 = run_stage3(
            self.gateway.as_ref(),
            &self.chairman,
            intent,
            &stage1,
            &stage2,
            profile,
        )
        .await;
        obs::emit_stage_finished(
            "stage3",
            1,
            usize::from(stage3.validation.valid),
            elapsed_ms(t),
        );
        recorder.save(Stage::Stage3, &stage3).await;

        (stage1, stage2, stage3)
    }

    /// One generation wrapped into the council's response shape.
    async fn direct_stages(
        &self,
        intent: &str,
        recorder: &mut Recorder<'_>,
    ) -> (Vec<Generation>, Stage2Result, Stage3Result) {
        let persona = Persona::direct();

        let t = Instant::now();
        let generation =
            generate_one(self.gateway.as_ref(), &persona, intent, self.config.profile).await;
        obs::emit_stage_finished(
            "direct",
            1,
            usize::from(generation.is_valid()),
            elapsed_ms(t),
        );

        let stage2 = Stage2Result {
            evaluations: Vec::new(),
            ranking: vec![0],
            recommendation: DIRECT_RECOMMENDATION.to_string(),
        };
        let stage3 = Stage3Result {
            final_code: generation.code.clone(),
            validation: generation.validation.clone(),
            chairman: persona.id.clone(),
            reasoning: "Direct generation without council review.".to_string(),
            timestamp: Utc::now(),
        };
        let stage1 = vec![generation];

        recorder
            .save(Stage::Stage1, &json!({ "generations": &stage1 }))
            .await;
        recorder.save(Stage::Stage2, &stage2).await;
        recorder.save(Stage::Stage3, &stage3).await;

        (stage1, stage2, stage3)
    }
}

/// Write-sink wrapper. Storage errors are logged and counted, and turn the
/// final status into `failed`; they never reach the caller.
struct Recorder<'a> {
    store: Option<&'a dyn CouncilStore>,
    id: ConversationId,
    degraded: bool,
}

impl<'a> Recorder<'a> {
    async fn open(store: &'a dyn CouncilStore, intent: &str) -> Recorder<'a> {
        match store.create_conversation(intent).await {
            Ok(id) => Recorder {
                store: Some(store),
                id,
                degraded: false,
            },
            Err(err) => {
                persistence_failed("conversation", &err);
                Recorder {
                    store: None,
                    id: ConversationId::new(),
                    degraded: true,
                }
            }
        }
    }

    async fn save<T: Serialize>(&mut self, stage: Stage, results: &T) {
        let Some(store) = self.store else {
            return;
        };
        let outcome = match serde_json::to_value(results) {
            Ok(value) => store
                .insert_stage(&self.id, stage, value)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(err) = outcome {
            persistence_failed(stage.as_str(), &err);
            self.degraded = true;
        }
    }

    async fn finish(&mut self) {
        let Some(store) = self.store else {
            return;
        };
        let status = if self.degraded {
            ConversationStatus::Failed
        } else {
            ConversationStatus::Completed
        };
        if let Err(err) = store.set_status(&self.id, status).await {
            persistence_failed("status", &err);
        }
    }
}

fn persistence_failed(what: &str, err: &dyn std::fmt::Display) {
    obs::emit_persistence_failed(what, err);
    METRICS.inc_persistence_failures();
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}
