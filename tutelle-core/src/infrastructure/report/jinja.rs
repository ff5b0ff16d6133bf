// tutelle-core/src/infrastructure/report/jinja.rs

// Markdown rendering of access reports through minijinja.

use crate::application::ports::TemplateEngine;
use crate::error::TutelleError;
use crate::infrastructure::error::InfrastructureError;
use minijinja::Environment;

pub struct JinjaRenderer<'a> {
    env: Environment<'a>,
}

impl<'a> JinjaRenderer<'a> {
    pub fn new() -> Self {
        let mut env = Environment::new();

        // full_access -> "✅ full", used in matrix cells
        env.add_filter("badge", |kind: &str| -> String {
            match kind {
                "full_access" => "✅ full".to_string(),
                "redacted" => "🟡 redacted".to_string(),
                "denied" => "⛔ denied".to_string(),
                other => other.to_string(),
            }
        });

        // Pipes would break a Markdown table cell
        env.add_filter("cell", |value: &str| -> String { value.replace('|', "\\|") });

        Self { env }
    }
}

impl<'a> Default for JinjaRenderer<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TemplateEngine for JinjaRenderer<'a> {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, TutelleError> {
        self.env
            .render_str(template, context)
            .map_err(|e| TutelleError::Infrastructure(InfrastructureError::TemplateError(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_badge_filter() -> Result<()> {
        let renderer = JinjaRenderer::new();
        let out = renderer.render(
            "{{ a | badge }} / {{ b | badge }} / {{ c | badge }}",
            &json!({"a": "full_access", "b": "redacted", "c": "denied"}),
        )?;
        assert_eq!(out, "✅ full / 🟡 redacted / ⛔ denied");
        Ok(())
    }

    #[test]
    fn test_cell_filter_escapes_pipes() -> Result<()> {
        let renderer = JinjaRenderer::new();
        let out = renderer.render("| {{ v | cell }} |", &json!({"v": "a|b"}))?;
        assert_eq!(out, "| a\\|b |");
        Ok(())
    }

    #[test]
    fn test_syntax_error_is_a_template_error() {
        let renderer = JinjaRenderer::new();
        let err = renderer.render("{% for x in %}", &json!({}));
        assert!(matches!(
            err,
            Err(TutelleError::Infrastructure(InfrastructureError::TemplateError(_)))
        ));
    }
}
