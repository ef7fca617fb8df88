//! Sign-in and sign-up for the dashboard
//!
//! Accounts are local to the page session: a form that validates signs the
//! user in. Nothing is stored between visits.

use std::cell::RefCell;
use std::rc::Rc;

use portfolio_engine::{SignInForm, SignUpForm, ValidationErrors};
use serde::{Deserialize, Serialize};
use tracing::info;
use wasm_bindgen::prelude::*;

use crate::bridge::{from_js, to_js};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    user: Option<CurrentUser>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn sign_in(&mut self, form: &SignInForm) -> Result<CurrentUser, ValidationErrors> {
        form.validate()?;

        let email = form.email.trim().to_lowercase();
        let display_name = email
            .split_once('@')
            .map(|(local, _)| local.to_string())
            .unwrap_or_else(|| email.clone());
        Ok(self.establish(CurrentUser {
            email,
            display_name,
        }))
    }

    pub fn sign_up(&mut self, form: &SignUpForm) -> Result<CurrentUser, ValidationErrors> {
        form.validate()?;

        Ok(self.establish(CurrentUser {
            email: form.email.trim().to_lowercase(),
            display_name: form.full_name.trim().to_string(),
        }))
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            info!(email = %user.email, "Signed out");
        }
    }

    fn establish(&mut self, user: CurrentUser) -> CurrentUser {
        info!(email = %user.email, "Signed in");
        self.user = Some(user.clone());
        user
    }
}

/// Result shape handed to the auth forms
#[derive(Debug, Serialize)]
struct AuthOutcome {
    success: bool,
    user: Option<CurrentUser>,
    errors: ValidationErrors,
}

impl From<Result<CurrentUser, ValidationErrors>> for AuthOutcome {
    fn from(result: Result<CurrentUser, ValidationErrors>) -> Self {
        match result {
            Ok(user) => AuthOutcome {
                success: true,
                user: Some(user),
                errors: ValidationErrors::new(),
            },
            Err(errors) => AuthOutcome {
                success: false,
                user: None,
                errors,
            },
        }
    }
}

/// JS handle on the shared auth context
#[wasm_bindgen]
pub struct AuthSession {
    context: Rc<RefCell<AuthContext>>,
}

impl AuthSession {
    pub(crate) fn new(context: Rc<RefCell<AuthContext>>) -> Self {
        Self { context }
    }
}

#[wasm_bindgen]
impl AuthSession {
    /// Returns `{ success, user, errors: { fields } }`
    #[wasm_bindgen(js_name = signIn)]
    pub fn sign_in_js(&self, form: JsValue) -> Result<JsValue, JsValue> {
        let form: SignInForm = from_js(form)?;
        let outcome = AuthOutcome::from(self.context.borrow_mut().sign_in(&form));
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = signUp)]
    pub fn sign_up_js(&self, form: JsValue) -> Result<JsValue, JsValue> {
        let form: SignUpForm = from_js(form)?;
        let outcome = AuthOutcome::from(self.context.borrow_mut().sign_up(&form));
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = signOut)]
    pub fn sign_out_js(&self) {
        self.context.borrow_mut().sign_out();
    }

    #[wasm_bindgen(js_name = currentUser)]
    pub fn current_user_js(&self) -> Result<JsValue, JsValue> {
        to_js(&self.context.borrow().current_user())
    }

    #[wasm_bindgen(getter, js_name = isSignedIn)]
    pub fn is_signed_in_js(&self) -> bool {
        self.context.borrow().is_signed_in()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sign_in_sets_user() {
        let mut auth = AuthContext::new();
        let user = auth
            .sign_in(&SignInForm {
                email: " Dana@Example.com ".to_string(),
                password: "hunter22".to_string(),
            })
            .unwrap();

        assert_eq!(user.email, "dana@example.com");
        assert_eq!(user.display_name, "dana");
        assert!(auth.is_signed_in());
    }

    #[test]
    fn test_sign_in_errors_are_per_field() {
        let mut auth = AuthContext::new();
        let errors = auth
            .sign_in(&SignInForm {
                email: "not-an-email".to_string(),
                password: String::new(),
            })
            .unwrap_err();

        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
        assert!(!auth.is_signed_in());
    }

    #[test]
    fn test_sign_up_then_out() {
        let mut auth = AuthContext::new();
        let user = auth
            .sign_up(&SignUpForm {
                full_name: "Dana Reyes".to_string(),
                email: "dana@example.com".to_string(),
                password: "longenough".to_string(),
                confirm_password: "longenough".to_string(),
            })
            .unwrap();
        assert_eq!(user.display_name, "Dana Reyes");

        auth.sign_out();
        assert_eq!(auth.current_user(), None);
    }

    #[test]
    fn test_sign_up_mismatch_keeps_user_signed_out() {
        let mut auth = AuthContext::new();
        let errors = auth
            .sign_up(&SignUpForm {
                full_name: "Dana Reyes".to_string(),
                email: "dana@example.com".to_string(),
                password: "longenough".to_string(),
                confirm_password: "different".to_string(),
            })
            .unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("Passwords do not match"));
        assert!(!auth.is_signed_in());
    }
}
