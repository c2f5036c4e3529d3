use anyhow::{Context, Result};
use mustache::Template;
use tracing::debug;

use crate::context::{expand_home, RenderContext};
use crate::TransformConfig;

/// Renders every template of `config`, in order, against the one shared context.
pub fn render<F: FnMut(&str) -> Result<()>>(
    config: &TransformConfig,
    context: &RenderContext,
    mut out: F,
) -> Result<()> {
    for template in &config.templates {
        debug!("rendering template: {}", template);
        let output = render_template(template, context)?;
        out(output.as_str())
            .with_context(|| format!("Failed to write output of template '{}'", template))?;
    }
    Ok(())
}

/// Partials (`{{> name}}`) resolve next to the template, with the template's extension.
fn compile(template: &str) -> Result<Template> {
    let path = expand_home(template);
    mustache::compile_path(&path)
        .with_context(|| format!("Failed to compile template '{}'", template))
}

fn render_template(template: &str, context: &RenderContext) -> Result<String> {
    let compiled = compile(template)?;
    let mut buf = Vec::new();
    compiled.render(&mut buf, context).with_context(|| {
        format!(
            "Failed to render template: {}\nwith context keys: {:?}",
            template,
            context.keys().collect::<Vec<_>>()
        )
    })?;
    String::from_utf8(buf)
        .with_context(|| format!("Template '{}' rendered invalid UTF-8", template))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;

    fn context(value: Value) -> RenderContext {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn render_to_string(config: &TransformConfig, ctx: &RenderContext) -> Result<String> {
        let mut buf = String::new();
        render(config, ctx, |s| {
            buf.push_str(s);
            Ok(())
        })?;
        Ok(buf)
    }

    fn template(dir: &TempDir, name: &str, text: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn render_one(text: &str, ctx: Value) -> String {
        let dir = TempDir::new().unwrap();
        let t = template(&dir, "t.mustache", text);
        render_to_string(&TransformConfig::new(vec![t]), &context(ctx)).unwrap()
    }

    #[test]
    fn list_section_with_implicit_iterator() {
        let out = render_one(
            "{{#fileNames}}[{{.}}]{{/fileNames}}",
            json!({"fileNames": ["a", "b"]}),
        );
        assert_eq!(out, "[a][b]");
    }

    #[test]
    fn truthy_and_falsy_sections() {
        let ctx = json!({"on": true, "off": false, "owner": {"name": "ops"}});
        assert_eq!(render_one("{{#on}}yes{{/on}}{{#off}}no{{/off}}", ctx.clone()), "yes");
        assert_eq!(render_one("{{#owner}}by {{name}}{{/owner}}", ctx), "by ops");
    }

    #[test]
    fn inverted_sections() {
        let ctx = json!({"fileNames": [], "on": true});
        assert_eq!(
            render_one(
                "{{^missing}}none{{/missing}}{{^fileNames}} empty{{/fileNames}}{{^on}}!{{/on}}",
                ctx
            ),
            "none empty"
        );
    }

    #[test]
    fn missing_key_renders_empty() {
        assert_eq!(render_one("a{{nope}}b", json!({})), "ab");
    }

    #[test]
    fn escapes_html_unless_triple_mustache() {
        let ctx = json!({"in": "<b>"});
        assert_eq!(render_one("{{in}}", ctx.clone()), "&lt;b&gt;");
        assert_eq!(render_one("{{{in}}}|{{&in}}", ctx), "<b>|<b>");
    }

    #[test]
    fn set_delimiter() {
        assert_eq!(render_one("{{=<% %>=}}<%in%>", json!({"in": "x"})), "x");
    }

    #[test]
    fn partials_load_next_to_template() {
        let dir = TempDir::new().unwrap();
        template(&dir, "footer.mustache", "-- {{author}}");
        let t = template(&dir, "page.mustache", "{{in}} {{> footer}}");
        let config = TransformConfig::new(vec![t]);
        let out = render_to_string(&config, &context(json!({"in": "body", "author": "ops"})));
        assert_eq!(out.unwrap(), "body -- ops");
    }

    #[test]
    fn syntax_error_names_template() {
        let dir = TempDir::new().unwrap();
        let t = template(&dir, "broken.mustache", "{{#open}}unclosed");
        let config = TransformConfig::new(vec![t.clone()]);
        let err = render_to_string(&config, &context(json!({"open": true}))).unwrap_err();
        assert!(err.to_string().contains(&t));
    }

    #[test]
    fn sink_failure_stops_rendering() {
        let dir = TempDir::new().unwrap();
        let first = template(&dir, "1.mustache", "one");
        let second = template(&dir, "2.mustache", "two");
        let config = TransformConfig::new(vec![first.clone(), second]);
        let mut calls = 0;
        let result = render(&config, &context(json!({})), |_| {
            calls += 1;
            Err(anyhow::Error::msg("closed"))
        });
        assert!(result.unwrap_err().to_string().contains(&first));
        assert_eq!(calls, 1);
    }
}
