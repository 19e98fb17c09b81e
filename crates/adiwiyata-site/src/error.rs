use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    #[error("template parse error: {0}")]
    TemplateParse(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tera::Error> for SiteError {
    fn from(e: tera::Error) -> Self {
        SiteError::TemplateRender(e.to_string())
    }
}
