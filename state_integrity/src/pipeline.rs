//! The lifecycle driver: detection, migration, validation and repair in a
//! fixed order, ending in a trusted document or the fallback document.
//!
//! ```text
//! Unknown -> Detected -> Migrated -> Validated -> Repaired -> Ready
//!                                                         \-> Fallback
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use state_rules::{character_speed, derive_character, CanonicalDocument, DerivedAttributes, SpeedResult};

use crate::config::IntegrityConfig;
use crate::error::Diagnostics;
use crate::migrator::{MigrationReport, Migrator};
use crate::repair::{defaults, Repairer};
use crate::schema::{detect, Detection};
use crate::validator::{validate, ValidationReport};

/// Where a document is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LifecycleState {
    Unknown,
    Detected { canonical: bool },
    Migrated,
    Validated { valid: bool },
    Repaired,
    /// Valid after repair and readable through the typed view.
    Ready,
    /// Replaced with the minimal default document.
    Fallback,
}

impl LifecycleState {
    /// Whether the lifecycle has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Fallback)
    }
}

/// End of the lifecycle for one repaired document.
#[derive(Debug, Clone)]
pub struct Settled {
    pub state: LifecycleState,
    pub document: Value,
    pub canonical: Option<CanonicalDocument>,
    pub validation: ValidationReport,
}

/// Everything one pass through the lifecycle produced.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub state: LifecycleState,
    /// Every state visited, in order, ending with `state`.
    pub transitions: Vec<LifecycleState>,
    pub document: Value,
    /// Typed view of `document`; present unless fallback was disabled and
    /// the repaired document still failed validation.
    pub canonical: Option<CanonicalDocument>,
    pub detection: Detection,
    pub migration: MigrationReport,
    /// Advisory check of the migrated document, before repair.
    pub pre_repair: ValidationReport,
    /// Check of the repaired document that decided between ready and
    /// fallback.
    pub post_repair: ValidationReport,
    pub repairs: Diagnostics,
}

impl Outcome {
    pub fn is_ready(&self) -> bool {
        self.state == LifecycleState::Ready
    }

    pub fn is_fallback(&self) -> bool {
        self.state == LifecycleState::Fallback
    }

    /// Derived attributes and progression speed of the player character.
    pub fn derive(&self, environment_bonus: f64) -> Option<Derivation> {
        let character = &self.canonical.as_ref()?.character;
        Some(Derivation {
            attributes: derive_character(character),
            speed: character_speed(character, environment_bonus),
        })
    }
}

/// Numbers computed from a trusted document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derivation {
    pub attributes: DerivedAttributes,
    pub speed: SpeedResult,
}

/// Runs documents through the lifecycle. Holds no document state; every
/// call works on its own copy.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: IntegrityConfig,
    migrator: Migrator,
    repairer: Repairer,
}

impl Pipeline {
    pub fn new(config: IntegrityConfig) -> Self {
        Self {
            migrator: Migrator::new(config.clone()),
            repairer: Repairer::new(config.clone()),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(IntegrityConfig::default())
    }

    pub fn config(&self) -> &IntegrityConfig {
        &self.config
    }

    /// Take `document` through the whole lifecycle. `document` itself is
    /// never modified.
    ///
    /// 1. Detect the schema generation
    /// 2. Migrate to the canonical shape
    /// 3. Validate the migrated document (advisory)
    /// 4. Repair
    /// 5. Validate again and settle on the repaired or the fallback document
    pub fn process(&self, document: &Value, now: DateTime<Utc>) -> Outcome {
        let mut transitions = vec![LifecycleState::Unknown];

        // Step 1: Detect
        let detection = detect(document);
        transitions.push(LifecycleState::Detected {
            canonical: detection.is_canonical,
        });
        debug!(generation = ?detection.generation, "schema detected");

        // Step 2: Migrate
        let migration = self.migrator.migrate(document, now);
        transitions.push(LifecycleState::Migrated);

        // Step 3: Advisory validation
        let pre_repair = validate(&migration.document);
        transitions.push(LifecycleState::Validated {
            valid: pre_repair.valid,
        });
        if !pre_repair.valid {
            debug!(errors = pre_repair.errors.len(), "migrated document needs repair");
        }

        // Step 4: Repair
        let repair = self.repairer.repair(&migration.document, now);
        transitions.push(LifecycleState::Repaired);

        // Step 5: Settle
        let settled = self.settle(repair.document, now);
        if settled.state != LifecycleState::Repaired {
            transitions.push(settled.state);
        }

        info!(
            state = ?settled.state,
            migrated = migration.report.migrated,
            repairs = repair.diagnostics.len(),
            "lifecycle complete"
        );

        Outcome {
            state: settled.state,
            transitions,
            document: settled.document,
            canonical: settled.canonical,
            detection,
            migration: migration.report,
            pre_repair,
            post_repair: settled.validation,
            repairs: repair.diagnostics,
        }
    }

    /// Validate a repaired document and decide its final state. A document
    /// that fails is replaced with the minimal default document, unless
    /// fallback is disabled, in which case it stays `Repaired` without a
    /// typed view.
    pub fn settle(&self, repaired: Value, now: DateTime<Utc>) -> Settled {
        let validation = validate(&repaired);
        if validation.valid {
            if let Ok(canonical) = CanonicalDocument::from_value(&repaired) {
                return Settled {
                    state: LifecycleState::Ready,
                    document: repaired,
                    canonical: Some(canonical),
                    validation,
                };
            }
        }

        warn!(
            errors = validation.errors.len(),
            fallback = self.config.fallback_on_invalid,
            "repaired document failed validation"
        );
        if !self.config.fallback_on_invalid {
            return Settled {
                state: LifecycleState::Repaired,
                document: repaired,
                canonical: None,
                validation,
            };
        }

        let document = defaults::minimal_document(&self.config, now);
        let canonical = CanonicalDocument::from_value(&document).ok();
        Settled {
            state: LifecycleState::Fallback,
            document,
            canonical,
            validation,
        }
    }
}
