//! Landing page rendering.

use minijinja::{context, Environment};

use crate::config::CREDENTIAL_ENV_VAR;
use crate::error::Error;

const TEMPLATE_NAME: &str = "index.html";
const TEMPLATE_SOURCE: &str = include_str!("../../templates/index.html");

/// Pre-compiled landing page template.
pub struct LandingPage {
    env: Environment<'static>,
}

impl LandingPage {
    pub fn new() -> Result<Self, Error> {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, TEMPLATE_SOURCE)
            .map_err(|e| Error::Internal(format!("Invalid landing template: {}", e)))?;
        Ok(Self { env })
    }

    /// Render the page; `env_ok` toggles the missing-credential warning.
    pub fn render(&self, env_ok: bool) -> Result<String, Error> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| Error::Internal(e.to_string()))?;
        template
            .render(context! {
                env_ok => env_ok,
                credential_var => CREDENTIAL_ENV_VAR,
            })
            .map_err(|e| Error::Internal(format!("Failed to render landing page: {}", e)))
    }
}
