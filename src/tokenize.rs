use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Matches a well-formed `{name}` placeholder; the name excludes braces.
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| {
        Regex::new(r"\{([^{}]+)\}").expect("placeholder regex is a valid static pattern")
    })
}

/// Result of filling a template with positional arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Tokenized {
    pub message: String,
    /// Placeholder name to bound value, in first-occurrence order.
    pub fields: Map<String, Value>,
}

/// Fill `template` with `args`.
///
/// Each distinct placeholder name takes the next unconsumed argument the
/// first time it is seen; repeats reuse that value. Names left without an
/// argument bind to `null`. Malformed brace sequences are copied through
/// untouched and never produce a field.
pub(crate) fn tokenize(template: Option<&str>, args: &[Value]) -> Tokenized {
    let template = match template {
        Some(t) if !t.is_empty() => t,
        _ => return Tokenized::default(),
    };

    let regex = placeholder_regex();
    let mut fields = Map::new();
    let mut remaining = args.iter();

    for caps in regex.captures_iter(template) {
        let name = &caps[1];
        if !fields.contains_key(name) {
            let value = remaining.next().cloned().unwrap_or(Value::Null);
            fields.insert(name.to_string(), value);
        }
    }

    if fields.is_empty() {
        return Tokenized {
            message: template.to_string(),
            fields,
        };
    }

    let message = regex
        .replace_all(template, |caps: &Captures| {
            fields.get(&caps[1]).map(display_value).unwrap_or_default()
        })
        .into_owned();

    Tokenized { message, fields }
}

/// Distinct placeholder names of `template`, in first-occurrence order.
pub(crate) fn placeholder_names(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for caps in placeholder_regex().captures_iter(template) {
        if let Some(name) = caps.get(1).map(|m| m.as_str()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Text inserted into the message for a bound value: strings raw, anything
/// else as compact JSON (`null` included).
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_template_yields_nothing() {
        let res = tokenize(None, &[json!(1)]);
        assert_eq!(res.message, "");
        assert!(res.fields.is_empty());

        let res = tokenize(Some(""), &[]);
        assert_eq!(res.message, "");
        assert!(res.fields.is_empty());
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        let res = tokenize(Some("text1"), &[json!("unused")]);
        assert_eq!(res.message, "text1");
        assert!(res.fields.is_empty());
    }

    #[test]
    fn binds_arguments_in_order() {
        let res = tokenize(
            Some("my {name} has {count} times {NaMe} spelled"),
            &[json!("Przemek"), json!(15), json!("gwóźdź")],
        );
        assert_eq!(res.message, "my Przemek has 15 times gwóźdź spelled");
        assert_eq!(res.fields["name"], json!("Przemek"));
        assert_eq!(res.fields["count"], json!(15));
        assert_eq!(res.fields["NaMe"], json!("gwóźdź"));
        let keys: Vec<&str> = res.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["name", "count", "NaMe"]);
    }

    #[test]
    fn repeated_name_reuses_first_argument() {
        let res = tokenize(Some("{a}-{b}-{a}"), &[json!(1), json!(2), json!(3)]);
        assert_eq!(res.message, "1-2-1");
        assert_eq!(Value::Object(res.fields), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn missing_arguments_become_null() {
        let res = tokenize(Some("{x}-{y}"), &[json!(5)]);
        assert_eq!(res.message, "5-null");
        assert_eq!(res.fields["x"], json!(5));
        assert_eq!(res.fields["y"], Value::Null);

        let res = tokenize(Some("my {name} has {count} times {name} spelled"), &[json!("Imię")]);
        assert_eq!(res.message, "my Imię has null times Imię spelled");
        assert_eq!(res.fields["count"], Value::Null);
    }

    #[test]
    fn malformed_braces_pass_through() {
        let res = tokenize(Some("my count} {name{ is"), &[json!("Imię")]);
        assert_eq!(res.message, "my count} {name{ is");
        assert!(res.fields.is_empty());

        let res = tokenize(Some("a} {b{ c"), &[json!(1), json!(2)]);
        assert_eq!(res.message, "a} {b{ c");
        assert!(res.fields.is_empty());
    }

    #[test]
    fn only_the_well_formed_span_after_a_gap_matches() {
        let res = tokenize(Some("my {name is {where} there"), &[json!("Imię"), json!("over")]);
        assert_eq!(res.message, "my {name is Imię there");
        assert_eq!(res.fields["where"], json!("Imię"));
        assert!(!res.fields.contains_key("name"));
        assert!(!res.fields.contains_key("name is "));
    }

    #[test]
    fn empty_braces_are_not_placeholders() {
        let res = tokenize(Some("set {} and {k}"), &[json!(true)]);
        assert_eq!(res.message, "set {} and true");
        assert_eq!(res.fields.len(), 1);
    }

    #[test]
    fn lists_distinct_names_in_order() {
        assert_eq!(
            placeholder_names("job {state} for {id}, again {state} {bad{"),
            ["state", "id"]
        );
        assert!(placeholder_names("no {} names").is_empty());
    }

    #[test]
    fn structured_values_render_as_json() {
        let res = tokenize(Some("{obj} {list}"), &[json!({"k": 1}), json!([1, "a"])]);
        assert_eq!(res.message, r#"{"k":1} [1,"a"]"#);
        assert_eq!(res.fields["obj"], json!({"k": 1}));
    }
}
