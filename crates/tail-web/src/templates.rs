//! Page templates, embedded in the binary and rendered with minijinja.

use minijinja::{default_auto_escape_callback, Environment, Value};

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(embedded_template_loader);
        Self { env }
    }

    pub fn render(&self, name: &str, context: Value) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(context)
    }
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}

fn embedded_template_loader(name: &str) -> Result<Option<String>, minijinja::Error> {
    let source = match name {
        "layout.html" => Some(include_str!("../templates/layout.html")),
        "nav.html"    => Some(include_str!("../templates/nav.html")),
        "map.html"    => Some(include_str!("../templates/map.html")),
        "list.html"   => Some(include_str!("../templates/list.html")),
        _ => None,
    };
    Ok(source.map(str::to_string))
}
