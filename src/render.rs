use std::path::Path;

use log::{debug, warn};
use tera::{Context, Tera};
use thiserror::Error;

use crate::prefix::{prefix_len_filter, PREFIX_LEN_FILTER};
use crate::types::{Device, TEMPLATE_MAP};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template '{0}' not found in templates directory")]
    TemplateNotFound(&'static str),
    #[error("Loading template '{name}'")]
    Load { name: &'static str, source: tera::Error },
    #[error("Rendering template '{name}' for {hostname}")]
    Render {
        name: &'static str,
        hostname: String,
        source: tera::Error,
    },
}

/// Renders validated devices through the template mapped to their device type.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Load every mapped template present in `templates_dir`.
    ///
    /// Absent templates are not an error here; rendering a device that needs one is.
    pub fn new(templates_dir: &Path) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter(PREFIX_LEN_FILTER, prefix_len_filter);

        for (device_type, name) in TEMPLATE_MAP {
            let path = templates_dir.join(name);
            if !path.is_file() {
                warn!("Template for {device_type} is missing: {path:?}");
                continue;
            }

            debug!("Loading template {path:?}");
            tera.add_template_file(&path, Some(name))
                .map_err(|source| RenderError::Load { name, source })?;
        }

        Ok(Renderer { tera })
    }

    pub fn render(&self, device: &Device) -> Result<String, RenderError> {
        let name = device.device_type.template_name();

        if !self.tera.get_template_names().any(|loaded| loaded == name) {
            return Err(RenderError::TemplateNotFound(name));
        }

        let mut context = Context::new();
        context.insert("device", device);

        self.tera
            .render(name, &context)
            .map_err(|source| RenderError::Render {
                name,
                hostname: device.hostname.clone(),
                source,
            })
    }
}
