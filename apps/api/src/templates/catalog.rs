use std::collections::BTreeMap;

use tracing::info;

use crate::errors::FieldError;
use crate::models::template::{Template, TemplateId};

/// The user's message templates, keyed by their letter.
/// Only letters from the configured set may be saved.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    allowed: Vec<TemplateId>,
    body_max: usize,
    templates: BTreeMap<TemplateId, Template>,
}

impl TemplateCatalog {
    pub fn new(allowed: Vec<TemplateId>, body_max: usize) -> Self {
        TemplateCatalog {
            allowed,
            body_max,
            templates: BTreeMap::new(),
        }
    }

    pub fn allowed_ids(&self) -> &[TemplateId] {
        &self.allowed
    }

    pub fn body_max(&self) -> usize {
        self.body_max
    }

    pub fn get(&self, id: TemplateId) -> Option<&Template> {
        self.templates.get(&id)
    }

    pub fn contains(&self, id: TemplateId) -> bool {
        self.templates.contains_key(&id)
    }

    /// Templates in letter order.
    pub fn list(&self) -> Vec<&Template> {
        self.templates.values().collect()
    }

    /// Creates or replaces a template. Nothing is stored unless every
    /// field passes.
    pub fn save(&mut self, template: Template) -> Result<&Template, Vec<FieldError>> {
        let mut errors = Vec::new();
        if !self.allowed.contains(&template.id) {
            let allowed: Vec<String> = self.allowed.iter().map(|id| id.to_string()).collect();
            errors.push(FieldError::new(
                "id",
                format!("Template id must be one of {}", allowed.join(", ")),
            ));
        }
        if let Err(field_errors) = template.validate(self.body_max) {
            errors.extend(field_errors);
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let id = template.id;
        info!("Saved template {id} ({} chars)", template.body.chars().count());
        self.templates.insert(id, template);
        Ok(&self.templates[&id])
    }
}
