//! Runs validation rules over a semantic manifest.
//!
//! Validation is exhaustive: every rule runs and every issue is returned,
//! regardless of earlier findings. A rule that panics is reported as an
//! error issue instead of aborting the pass. The manifest is never modified.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};

use crate::error::*;
use crate::rules::{SemanticManifestValidationRule, default_rules};
use crate::types::SemanticManifest;

/// Validate `manifest` with the default rule set, sequentially.
pub fn validate(manifest: &SemanticManifest) -> SemanticManifestValidationResults {
    SemanticManifestValidator::with_default_rules().validate(manifest)
}

/// A configured set of rules plus an optional worker pool.
pub struct SemanticManifestValidator {
    rules: Vec<Arc<dyn SemanticManifestValidationRule>>,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl SemanticManifestValidator {
    /// Build a validator over `rules`, run in the given order.
    ///
    /// # Errors
    ///
    /// [`ValidatorConfigError::EmptyRuleSet`] if `rules` is empty.
    pub fn new(
        rules: Vec<Arc<dyn SemanticManifestValidationRule>>,
    ) -> Result<Self, ValidatorConfigError> {
        if rules.is_empty() {
            return Err(ValidatorConfigError::EmptyRuleSet);
        }
        Ok(Self::from_rules(rules))
    }

    pub fn with_default_rules() -> Self {
        Self::from_rules(default_rules())
    }

    fn from_rules(rules: Vec<Arc<dyn SemanticManifestValidationRule>>) -> Self {
        Self {
            rules,
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    /// Run rules on up to `max_workers` threads. One or fewer runs them on the
    /// calling thread.
    ///
    /// Without the `parallel` feature rules always run on the calling thread.
    ///
    /// # Errors
    ///
    /// [`ValidatorConfigError::WorkerPool`] if the thread pool can't be built.
    pub fn with_max_workers(mut self, max_workers: usize) -> Result<Self, ValidatorConfigError> {
        #[cfg(feature = "parallel")]
        {
            self.pool = if max_workers > 1 {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(max_workers)
                    .thread_name(|i| format!("manifest-validation-{}", i))
                    .build()
                    .map_err(|e| ValidatorConfigError::WorkerPool(e.to_string()))?;
                Some(pool)
            } else {
                None
            };
        }
        #[cfg(not(feature = "parallel"))]
        if max_workers > 1 {
            tracing::warn!(
                max_workers,
                "`parallel` feature disabled; validation rules run sequentially"
            );
        }
        Ok(self)
    }

    pub fn rules(&self) -> &[Arc<dyn SemanticManifestValidationRule>] {
        &self.rules
    }

    /// Run every rule and collect every issue, in rule order.
    pub fn validate(&self, manifest: &SemanticManifest) -> SemanticManifestValidationResults {
        let per_rule = self.run_rules(manifest);
        let results =
            SemanticManifestValidationResults::from_issues(per_rule.into_iter().flatten().collect());

        tracing::info!(
            rules = self.rules.len(),
            errors = results.errors().len(),
            warnings = results.warnings().len(),
            future_errors = results.future_errors().len(),
            "semantic manifest validation finished"
        );
        results
    }

    /// Validate a private copy of `manifest` and fail on any blocking issue.
    ///
    /// # Errors
    ///
    /// [`SemanticManifestValidationError`] carrying every issue found, when at
    /// least one is an error.
    pub fn checked_validate(
        &self,
        manifest: &SemanticManifest,
    ) -> Result<SemanticManifestValidationResults, SemanticManifestValidationError> {
        let snapshot = manifest.clone();
        let results = self.validate(&snapshot);
        if results.has_blocking_issues() {
            Err(SemanticManifestValidationError { results })
        } else {
            Ok(results)
        }
    }

    fn run_rules(&self, manifest: &SemanticManifest) -> Vec<Vec<ValidationIssue>> {
        #[cfg(feature = "parallel")]
        {
            if let Some(pool) = &self.pool {
                use rayon::prelude::*;
                return pool.install(|| {
                    self.rules
                        .par_iter()
                        .map(|rule| run_rule(rule.as_ref(), manifest))
                        .collect()
                });
            }
        }
        self.rules
            .iter()
            .map(|rule| run_rule(rule.as_ref(), manifest))
            .collect()
    }
}

impl Default for SemanticManifestValidator {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

// ─── Panic capture ──────────────────────────────────────────────────────────

struct PanicTrace {
    location: String,
    backtrace: Backtrace,
}

thread_local! {
    /// `Some` while a rule runs on this thread; filled in by the panic hook.
    static PANIC_TRACE: RefCell<Option<Option<PanicTrace>>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chain a process-wide hook that records where a rule panicked. Panics
/// outside a rule go to the previous hook unchanged.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let captured = PANIC_TRACE
                .try_with(|slot| match slot.try_borrow_mut() {
                    Ok(mut slot) => match slot.as_mut() {
                        Some(trace) => {
                            *trace = Some(PanicTrace {
                                location: info
                                    .location()
                                    .map_or_else(|| "<unknown>".to_string(), ToString::to_string),
                                backtrace: Backtrace::force_capture(),
                            });
                            true
                        }
                        None => false,
                    },
                    Err(_) => false,
                })
                .unwrap_or(false);
            if !captured {
                previous(info);
            }
        }));
    });
}

fn run_rule(rule: &dyn SemanticManifestValidationRule, manifest: &SemanticManifest) -> Vec<ValidationIssue> {
    install_panic_hook();
    tracing::debug!(rule = rule.name(), "running validation rule");

    PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(None));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.validate(manifest)));
    let trace = PANIC_TRACE.with(|slot| slot.borrow_mut().take().flatten());

    match outcome {
        Ok(issues) => {
            tracing::debug!(rule = rule.name(), issues = issues.len(), "validation rule finished");
            issues
        }
        Err(payload) => {
            let cause = panic_message(payload.as_ref());
            let mut detail = format!("rule `{}` panicked: {}", rule.name(), cause);
            if let Some(trace) = trace {
                tracing::warn!(rule = rule.name(), %cause, location = %trace.location, "validation rule panicked");
                detail.push_str(&format!(
                    "\n  at {}\n\nbacktrace:\n{}",
                    trace.location, trace.backtrace
                ));
            } else {
                tracing::warn!(rule = rule.name(), %cause, "validation rule panicked");
            }
            vec![
                generate_exception_issue(
                    &format!("running validation rule `{}`", rule.name()),
                    &cause,
                    None,
                )
                .with_extra_detail(detail),
            ]
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
