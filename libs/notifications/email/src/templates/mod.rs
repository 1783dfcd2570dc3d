//! Handlebars templates for outgoing mail

use crate::error::{EmailError, EmailResult};
use handlebars::Handlebars;
use serde::Serialize;
use std::collections::HashMap;

pub const PASSWORD_RESET: &str = "password_reset";

/// Rendered subject and bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

#[derive(Clone, Debug)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Data for the password reset template
#[derive(Debug, Serialize)]
pub struct PasswordResetData<'a> {
    pub reset_url: &'a str,
}

/// Each template registers as `<name>_subject`, `<name>_text` and `<name>_html`.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    templates: HashMap<String, EmailTemplate>,
}

impl TemplateEngine {
    /// Engine with the built-in templates registered
    pub fn new() -> EmailResult<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        let mut engine = Self {
            handlebars,
            templates: HashMap::new(),
        };
        engine.register_defaults()?;
        Ok(engine)
    }

    pub fn register(&mut self, template: EmailTemplate) -> EmailResult<()> {
        self.handlebars
            .register_template_string(&format!("{}_subject", template.name), &template.subject)?;

        if let Some(text) = &template.body_text {
            self.handlebars
                .register_template_string(&format!("{}_text", template.name), text)?;
        }
        if let Some(html) = &template.body_html {
            self.handlebars
                .register_template_string(&format!("{}_html", template.name), html)?;
        }

        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> EmailResult<RenderedTemplate> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| EmailError::Template(format!("template not found: {}", name)))?;

        let subject = self.handlebars.render(&format!("{}_subject", name), data)?;
        let body_text = template
            .body_text
            .as_ref()
            .map(|_| self.handlebars.render(&format!("{}_text", name), data))
            .transpose()?;
        let body_html = template
            .body_html
            .as_ref()
            .map(|_| self.handlebars.render(&format!("{}_html", name), data))
            .transpose()?;

        Ok(RenderedTemplate {
            subject,
            body_text,
            body_html,
        })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn register_defaults(&mut self) -> EmailResult<()> {
        self.register(EmailTemplate {
            name: PASSWORD_RESET.to_string(),
            subject: "Password Reset".to_string(),
            body_text: Some("Click this link to reset your password: {{reset_url}}".to_string()),
            body_html: Some(
                r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1 style="color: #2563eb;">Password Reset</h1>
    <p>Click this link to reset your password:</p>
    <p><a href="{{reset_url}}">{{reset_url}}</a></p>
    <p style="color: #666; font-size: 14px;">The link expires in one hour.</p>
</body>
</html>"#
                    .to_string(),
            ),
        })
    }
}
