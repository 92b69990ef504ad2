//! XPath 1.0 core function library.
//!
//! Covers what generated locators and hand-written probes need:
//! `position`, `last`, `count`, `string`, `concat`, `starts-with`,
//! `contains`, `substring`, `substring-before`, `substring-after`,
//! `string-length`, `normalize-space`, `boolean`, `not`, `true`,
//! `false`, and `number`. Anything else is an error, not an empty
//! result.

use super::eval::EvalContext;
use super::value::XPathValue;
use crate::dom::Document;

pub fn call(
    name: &str,
    args: Vec<XPathValue>,
    ctx: &EvalContext<'_>,
) -> Result<XPathValue, String> {
    let doc = ctx.doc;
    match name {
        "position" => Ok(XPathValue::Number(ctx.context_position as f64)),
        "last" => Ok(XPathValue::Number(ctx.context_size as f64)),
        "count" => {
            let [XPathValue::NodeSet(nodes)] = args.as_slice() else {
                return Err("count() takes exactly one node-set argument".to_string());
            };
            Ok(XPathValue::Number(nodes.len() as f64))
        }

        "string" => Ok(XPathValue::String(subject(&args, ctx, "string")?)),
        "concat" => {
            if args.len() < 2 {
                return Err("concat() takes at least two arguments".to_string());
            }
            let joined: String = args.iter().map(|a| string_of(a, doc)).collect();
            Ok(XPathValue::String(joined))
        }
        "starts-with" => {
            let (s, prefix) = two_strings(&args, doc, "starts-with")?;
            Ok(XPathValue::Boolean(s.starts_with(&prefix)))
        }
        "contains" => {
            let (s, needle) = two_strings(&args, doc, "contains")?;
            Ok(XPathValue::Boolean(s.contains(&needle)))
        }
        "substring" => substring(&args, doc),
        "substring-before" => {
            let (s, mark) = two_strings(&args, doc, "substring-before")?;
            let cut = s.find(&mark).map(|at| s[..at].to_string());
            Ok(XPathValue::String(cut.unwrap_or_default()))
        }
        "substring-after" => {
            let (s, mark) = two_strings(&args, doc, "substring-after")?;
            let cut = s.find(&mark).map(|at| s[at + mark.len()..].to_string());
            Ok(XPathValue::String(cut.unwrap_or_default()))
        }
        "string-length" => {
            let s = subject(&args, ctx, "string-length")?;
            Ok(XPathValue::Number(s.chars().count() as f64))
        }
        "normalize-space" => {
            let s = subject(&args, ctx, "normalize-space")?;
            let folded = s.split_whitespace().collect::<Vec<_>>().join(" ");
            Ok(XPathValue::String(folded))
        }

        "boolean" => {
            let [arg] = args.as_slice() else {
                return Err("boolean() takes exactly one argument".to_string());
            };
            Ok(XPathValue::Boolean(arg.to_boolean()))
        }
        "not" => {
            let [arg] = args.as_slice() else {
                return Err("not() takes exactly one argument".to_string());
            };
            Ok(XPathValue::Boolean(!arg.to_boolean()))
        }
        "true" => Ok(XPathValue::Boolean(true)),
        "false" => Ok(XPathValue::Boolean(false)),

        "number" => {
            let value = match args.as_slice() {
                [] => {
                    let s = ctx.doc.string_value(ctx.context_node);
                    s.trim().parse().unwrap_or(f64::NAN)
                }
                [arg] => arg.to_number(),
                _ => return Err("number() takes at most one argument".to_string()),
            };
            Ok(XPathValue::Number(value))
        }

        other => Err(format!("unknown function {other}()")),
    }
}

/// The optional-argument string functions default to the context node
/// when called with no argument.
fn subject(args: &[XPathValue], ctx: &EvalContext<'_>, name: &str) -> Result<String, String> {
    match args {
        [] => Ok(ctx.doc.string_value(ctx.context_node)),
        [arg] => Ok(string_of(arg, ctx.doc)),
        _ => Err(format!("{name}() takes at most one argument")),
    }
}

fn two_strings(
    args: &[XPathValue],
    doc: &Document,
    name: &str,
) -> Result<(String, String), String> {
    let [a, b] = args else {
        return Err(format!("{name}() takes exactly two arguments"));
    };
    Ok((string_of(a, doc), string_of(b, doc)))
}

/// substring() counts characters, not bytes, and is 1-indexed.
fn substring(args: &[XPathValue], doc: &Document) -> Result<XPathValue, String> {
    let (s, start, len) = match args {
        [s, from] => (string_of(s, doc), from.to_number(), None),
        [s, from, n] => (string_of(s, doc), from.to_number(), Some(n.to_number())),
        _ => return Err("substring() takes two or three arguments".to_string()),
    };
    let chars: Vec<char> = s.chars().collect();
    let begin = ((start.round() as i64 - 1).max(0) as usize).min(chars.len());
    let end = match len {
        Some(n) => begin.saturating_add(n.round() as usize).min(chars.len()),
        None => chars.len(),
    };
    Ok(XPathValue::String(chars[begin..end].iter().collect()))
}

/// String-value of an argument. For a node-set this is the string-value
/// of its first node in document order, which needs the document and so
/// cannot live on `XPathValue` itself.
fn string_of(value: &XPathValue, doc: &Document) -> String {
    match value {
        XPathValue::NodeSet(nodes) => nodes
            .first()
            .map(|&n| doc.string_value(n))
            .unwrap_or_default(),
        other => other.to_string_value(),
    }
}
