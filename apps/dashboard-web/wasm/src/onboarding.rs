//! Onboarding wizard bindings
//!
//! The wizard shares its context with `AppState`, so answers survive the
//! step pages being torn down and rebuilt.

use std::cell::RefCell;
use std::rc::Rc;

use portfolio_engine::{
    OnboardingContext, OnboardingData, OnboardingPatch, OnboardingStep, RoleDefinition, UserRole,
    ValidationErrors,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::bridge::{from_js, js_error, to_js};

/// Everything a step page needs to render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardView {
    pub step: OnboardingStep,
    pub step_index: usize,
    pub route: String,
    pub progress_pct: f64,
    pub completed: Vec<OnboardingStep>,
    pub show_quantity_fields: bool,
    pub can_go_back: bool,
    pub data: OnboardingData,
}

pub fn wizard_view(context: &OnboardingContext) -> WizardView {
    let step = context.current();
    WizardView {
        step,
        step_index: step.index(),
        route: step.route(),
        progress_pct: context.progress_pct(),
        completed: OnboardingStep::ALL
            .into_iter()
            .filter(|s| context.is_step_complete(*s))
            .collect(),
        show_quantity_fields: context.show_quantity_fields(),
        can_go_back: step.previous().is_some(),
        data: context.data().clone(),
    }
}

#[derive(Debug, Serialize)]
struct StepOutcome {
    success: bool,
    view: WizardView,
    errors: ValidationErrors,
}

#[wasm_bindgen]
pub struct OnboardingWizard {
    pub(crate) context: Rc<RefCell<OnboardingContext>>,
}

impl OnboardingWizard {
    pub(crate) fn new(context: Rc<RefCell<OnboardingContext>>) -> Self {
        Self { context }
    }
}

#[wasm_bindgen]
impl OnboardingWizard {
    pub fn view(&self) -> Result<JsValue, JsValue> {
        to_js(&wizard_view(&self.context.borrow()))
    }

    /// Role cards for the first step
    pub fn roles(&self) -> Result<JsValue, JsValue> {
        let roles: Vec<RoleDefinition> = UserRole::ALL.iter().map(|r| r.definition()).collect();
        to_js(&roles)
    }

    /// Merge a partial form update; absent fields are left alone
    pub fn update(&self, patch: JsValue) -> Result<JsValue, JsValue> {
        let patch: OnboardingPatch = from_js(patch)?;
        let mut context = self.context.borrow_mut();
        context.update(patch);
        to_js(&wizard_view(&context))
    }

    /// Validate the current step and advance. Errors come back per field.
    pub fn next(&self) -> Result<JsValue, JsValue> {
        let mut context = self.context.borrow_mut();
        let errors = match context.next() {
            Ok(_) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        to_js(&StepOutcome {
            success: errors.is_empty(),
            view: wizard_view(&context),
            errors,
        })
    }

    pub fn back(&self) -> Result<JsValue, JsValue> {
        let mut context = self.context.borrow_mut();
        context.back();
        to_js(&wizard_view(&context))
    }

    /// Jump via the progress bar. Returns false when the step is not reachable yet.
    #[wasm_bindgen(js_name = goTo)]
    pub fn go_to(&self, step: &str) -> Result<bool, JsValue> {
        let step: OnboardingStep = from_js(JsValue::from_str(step))?;
        Ok(self.context.borrow_mut().go_to(step))
    }

    /// The collected answers, once every step validates
    pub fn finish(&self) -> Result<JsValue, JsValue> {
        let data = self.context.borrow().finish().map_err(js_error)?;
        to_js(&data)
    }

    #[wasm_bindgen(getter, js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.context.borrow().is_complete()
    }
}
