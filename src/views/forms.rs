// Form widgets
use super::escape;
use crate::forms::FormErrors;

pub fn field_errors(errors: &FormErrors, field: &str) -> String {
    let messages = errors.get(field);
    if messages.is_empty() {
        return String::new();
    }
    let items: String = messages
        .iter()
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    format!(r#"<ul class="field-errors">{}</ul>"#, items)
}

pub fn input(kind: &str, name: &str, label: &str, value: &str, errors: &FormErrors) -> String {
    let class = if errors.has(name) { " invalid" } else { "" };
    format!(
        r#"<div class="field{class}"><label for="{name}">{label}</label><input type="{kind}" id="{name}" name="{name}" value="{value}">{errors}</div>"#,
        class = class,
        name = name,
        label = escape(label),
        kind = kind,
        value = escape(value),
        errors = field_errors(errors, name),
    )
}

/// `<select>`; with `multiple` set the field posts one value per selection.
pub fn select(
    name: &str,
    label: &str,
    options: &[(String, String)],
    selected: &[String],
    multiple: bool,
    errors: &FormErrors,
) -> String {
    let class = if errors.has(name) { " invalid" } else { "" };
    let options: String = options
        .iter()
        .map(|(value, text)| {
            let mark = if selected.contains(value) { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape(value),
                mark,
                escape(text)
            )
        })
        .collect();
    format!(
        r#"<div class="field{class}"><label for="{name}">{label}</label><select id="{name}" name="{name}"{multiple}>{options}</select>{errors}</div>"#,
        class = class,
        name = name,
        label = escape(label),
        multiple = if multiple { " multiple" } else { "" },
        options = options,
        errors = field_errors(errors, name),
    )
}

pub fn form(action: &str, fields: &[String], submit: &str) -> String {
    format!(
        r#"<form method="post" action="{}">{}<button type="submit">{}</button></form>"#,
        escape(action),
        fields.concat(),
        escape(submit)
    )
}

pub fn alert(message: &str) -> String {
    format!(r#"<p class="alert">{}</p>"#, escape(message))
}
