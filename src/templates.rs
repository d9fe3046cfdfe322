use handlebars::{Handlebars, TemplateError};
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

pub fn build_handlebars() -> Result<Hbs, TemplateError> {
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);

    hb.register_template_file("pages/dashboard", "templates/pages/dashboard.hbs")?;

    Ok(Arc::new(hb))
}
