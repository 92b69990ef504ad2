//! Stack machine for compiled XPath programs.
//!
//! Values live on a small stack; each op pops its inputs and pushes one
//! result. Node-set results stay deduplicated and sorted by node id,
//! which is document order in the arena.

use std::collections::HashSet;

use super::axes::{navigate, test_node};
use super::compiler::{CompiledExpr, Op, StepPredicate, StepTest};
use super::functions;
use super::parser::{Axis, BinaryOp};
use super::value::XPathValue;
use crate::dom::{Document, NodeId};

/// Evaluation context
pub struct EvalContext<'a> {
    pub doc: &'a Document,
    pub context_node: NodeId,
    pub context_position: usize,
    pub context_size: usize,
}

/// Parse, compile, and evaluate `xpath` against the whole document.
#[must_use = "XPath evaluation result should be used"]
pub fn evaluate(doc: &Document, xpath: &str) -> Result<XPathValue, String> {
    let compiled = super::compiler::compile(xpath)?;
    evaluate_compiled(&compiled, &root_context(doc))
}

/// Parse, compile, and evaluate `xpath` with `origin` as the context node.
#[must_use = "XPath evaluation result should be used"]
pub fn evaluate_from_node(
    doc: &Document,
    origin: NodeId,
    xpath: &str,
) -> Result<XPathValue, String> {
    let compiled = super::compiler::compile(xpath)?;
    let ctx = EvalContext {
        doc,
        context_node: origin,
        context_position: 1,
        context_size: 1,
    };
    evaluate_compiled(&compiled, &ctx)
}

/// Context for whole-document evaluation. Relative paths resolve against
/// the root element; absolute ones restart at the document node anyway.
pub fn root_context(doc: &Document) -> EvalContext<'_> {
    EvalContext {
        doc,
        context_node: doc.root_element().unwrap_or(0),
        context_position: 1,
        context_size: 1,
    }
}

/// Run a compiled program to completion and return the final value.
pub fn evaluate_compiled(expr: &CompiledExpr, ctx: &EvalContext<'_>) -> Result<XPathValue, String> {
    let mut machine = Machine {
        ctx,
        stack: Vec::new(),
    };
    for op in &expr.ops {
        machine.step(op)?;
    }
    Ok(machine.stack.pop().unwrap_or(XPathValue::empty_nodeset()))
}

struct Machine<'e, 'a> {
    ctx: &'e EvalContext<'a>,
    stack: Vec<XPathValue>,
}

impl Machine<'_, '_> {
    fn step(&mut self, op: &Op) -> Result<(), String> {
        match op {
            Op::Root => {
                let document = self.ctx.doc.document_node();
                self.stack.push(XPathValue::single_node(document));
            }
            Op::Current => {
                self.stack.push(XPathValue::single_node(self.ctx.context_node));
            }
            Op::Parent => {
                let doc = self.ctx.doc;
                let origins = self.pop_origins();
                let mut seen = HashSet::with_capacity(origins.len());
                let mut parents: Vec<NodeId> = origins
                    .into_iter()
                    .filter_map(|n| doc.parent(n))
                    .filter(|&p| seen.insert(p))
                    .collect();
                parents.sort_unstable();
                self.stack.push(XPathValue::NodeSet(parents));
            }
            Op::Navigate(axis, test, predicates) => {
                let origins = self.pop_origins();
                let value = if *axis == Axis::Attribute {
                    read_attributes(self.ctx.doc, &origins, test)
                } else {
                    XPathValue::NodeSet(self.expand_step(&origins, *axis, test, predicates)?)
                };
                self.stack.push(value);
            }
            Op::Filter(inner) => {
                let nodes = match self.stack.pop() {
                    Some(XPathValue::NodeSet(nodes)) => nodes,
                    _ => Vec::new(),
                };
                let kept = filter_by_predicate(self.ctx.doc, inner, &nodes)?;
                self.stack.push(XPathValue::NodeSet(kept));
            }
            Op::Union => {
                let right = self.stack.pop().unwrap_or(XPathValue::empty_nodeset());
                let left = self.stack.pop().unwrap_or(XPathValue::empty_nodeset());
                let (XPathValue::NodeSet(mut merged), XPathValue::NodeSet(extra)) = (left, right)
                else {
                    return Err("union requires node-sets on both sides".to_string());
                };
                let mut seen: HashSet<NodeId> = merged.iter().copied().collect();
                merged.extend(extra.into_iter().filter(|&n| seen.insert(n)));
                merged.sort_unstable();
                self.stack.push(XPathValue::NodeSet(merged));
            }
            Op::Number(n) => self.stack.push(XPathValue::Number(*n)),
            Op::Literal(s) => self.stack.push(XPathValue::String(s.clone())),
            Op::Neg => {
                let value = self.stack.pop().unwrap_or(XPathValue::Number(0.0));
                self.stack.push(XPathValue::Number(-value.to_number()));
            }
            Op::Binary(op) => {
                let right = self.stack.pop().unwrap_or(XPathValue::Number(0.0));
                let left = self.stack.pop().unwrap_or(XPathValue::Number(0.0));
                self.stack.push(self.binary(*op, left, right));
            }
            Op::Call(name, arity) => {
                let mut args: Vec<XPathValue> = Vec::with_capacity(*arity);
                for _ in 0..*arity {
                    let arg = self.stack.pop().unwrap_or(XPathValue::String(String::new()));
                    args.push(arg);
                }
                args.reverse();
                let result = functions::call(name, args, self.ctx)?;
                self.stack.push(result);
            }
        }
        Ok(())
    }

    /// Pop the step input. An empty stack stands for the context node;
    /// a non-node value yields no origins.
    fn pop_origins(&mut self) -> Vec<NodeId> {
        match self.stack.pop() {
            None => vec![self.ctx.context_node],
            Some(XPathValue::NodeSet(nodes)) => nodes,
            Some(_) => Vec::new(),
        }
    }

    /// Expand one non-attribute step across all origins. Candidates are
    /// filtered per origin before the merge: [k] means the k-th candidate
    /// of each origin, which is what positional climbs count on when an
    /// anchor matches more than one node.
    fn expand_step(
        &self,
        origins: &[NodeId],
        axis: Axis,
        test: &StepTest,
        predicates: &[StepPredicate],
    ) -> Result<Vec<NodeId>, String> {
        let doc = self.ctx.doc;
        let mut seen = HashSet::with_capacity(origins.len());
        let mut merged = Vec::with_capacity(origins.len());
        for &origin in origins {
            let mut candidates: Vec<NodeId> = navigate(doc, origin, axis)
                .into_iter()
                .filter(|&c| test_node(doc, c, test))
                .collect();
            for pred in predicates {
                if candidates.is_empty() {
                    break;
                }
                candidates = narrow(doc, pred, candidates)?;
            }
            merged.extend(candidates.into_iter().filter(|&c| seen.insert(c)));
        }
        // Node ids are assigned in document order
        merged.sort_unstable();
        Ok(merged)
    }

    fn binary(&self, op: BinaryOp, left: XPathValue, right: XPathValue) -> XPathValue {
        match op {
            BinaryOp::Or => XPathValue::Boolean(left.to_boolean() || right.to_boolean()),
            BinaryOp::And => XPathValue::Boolean(left.to_boolean() && right.to_boolean()),
            BinaryOp::Eq => equality(self.ctx.doc, &left, &right, |a, b| a == b),
            BinaryOp::Ne => equality(self.ctx.doc, &left, &right, |a, b| a != b),
            BinaryOp::Lt => numeric(&left, &right, |a, b| a < b),
            BinaryOp::Le => numeric(&left, &right, |a, b| a <= b),
            BinaryOp::Gt => numeric(&left, &right, |a, b| a > b),
            BinaryOp::Ge => numeric(&left, &right, |a, b| a >= b),
            BinaryOp::Add => arith(&left, &right, |a, b| a + b),
            BinaryOp::Sub => arith(&left, &right, |a, b| a - b),
            BinaryOp::Mul => arith(&left, &right, |a, b| a * b),
            BinaryOp::Div => arith(&left, &right, |a, b| a / b),
            BinaryOp::Mod => arith(&left, &right, |a, b| a % b),
        }
    }
}

/// Keep the candidates for which `pred` holds. A numeric outcome selects
/// by position; anything else converts to boolean. Positions count in the
/// order the candidates arrive.
fn filter_by_predicate(
    doc: &Document,
    pred: &CompiledExpr,
    candidates: &[NodeId],
) -> Result<Vec<NodeId>, String> {
    let size = candidates.len();
    let mut kept = Vec::new();
    for (index, &node) in candidates.iter().enumerate() {
        let ctx = EvalContext {
            doc,
            context_node: node,
            context_position: index + 1,
            context_size: size,
        };
        let outcome = evaluate_compiled(pred, &ctx)?;
        let keep = match outcome {
            XPathValue::Number(n) => n == (index + 1) as f64,
            other => other.to_boolean(),
        };
        if keep {
            kept.push(node);
        }
    }
    Ok(kept)
}

/// Narrow one origin's candidate list by a single step predicate.
fn narrow(
    doc: &Document,
    pred: &StepPredicate,
    candidates: Vec<NodeId>,
) -> Result<Vec<NodeId>, String> {
    match pred {
        StepPredicate::Position(k) => {
            let picked = k.checked_sub(1).and_then(|i| candidates.get(i));
            Ok(picked.map_or_else(Vec::new, |&node| vec![node]))
        }
        StepPredicate::AttrEq(name, value) => Ok(candidates
            .into_iter()
            .filter(|&c| doc.attribute(c, name) == Some(value.as_str()))
            .collect()),
        StepPredicate::General(expr) => filter_by_predicate(doc, expr, &candidates),
    }
}

/// Attribute steps produce strings, not nodes. Step predicates never
/// attach to them in generated locators and are ignored here.
fn read_attributes(doc: &Document, origins: &[NodeId], test: &StepTest) -> XPathValue {
    let mut values: Vec<String> = Vec::new();
    for &origin in origins {
        match test {
            StepTest::Named(name) => {
                if let Some(value) = doc.attribute(origin, name) {
                    values.push(value.to_string());
                }
            }
            StepTest::Wildcard => {
                values.extend(doc.attributes(origin).map(|(_, v)| v.to_string()));
            }
            _ => {}
        }
    }
    match values.len() {
        0 => XPathValue::empty_nodeset(),
        1 => XPathValue::String(values.remove(0)),
        _ => XPathValue::StringList(values),
    }
}

/// XPath 1.0 equality. Node-sets compare by the string-values of their
/// member nodes, so the document is needed here.
fn equality<F>(doc: &Document, left: &XPathValue, right: &XPathValue, cmp: F) -> XPathValue
where
    F: Fn(&str, &str) -> bool,
{
    let outcome = match (left, right) {
        (XPathValue::NodeSet(ln), XPathValue::NodeSet(rn)) => ln.iter().any(|&l| {
            let ls = doc.string_value(l);
            rn.iter().any(|&r| cmp(&ls, &doc.string_value(r)))
        }),
        (XPathValue::NodeSet(nodes), other) | (other, XPathValue::NodeSet(nodes)) => {
            let probe = other.to_string_value();
            nodes.iter().any(|&n| cmp(&doc.string_value(n), &probe))
        }
        (XPathValue::Boolean(_), _) | (_, XPathValue::Boolean(_)) => cmp(
            &left.to_boolean().to_string(),
            &right.to_boolean().to_string(),
        ),
        (XPathValue::Number(_), _) | (_, XPathValue::Number(_)) => {
            cmp(&left.to_number().to_string(), &right.to_number().to_string())
        }
        _ => cmp(&left.to_string_value(), &right.to_string_value()),
    };
    XPathValue::Boolean(outcome)
}

fn numeric<F>(left: &XPathValue, right: &XPathValue, cmp: F) -> XPathValue
where
    F: Fn(f64, f64) -> bool,
{
    XPathValue::Boolean(cmp(left.to_number(), right.to_number()))
}

fn arith<F>(left: &XPathValue, right: &XPathValue, op: F) -> XPathValue
where
    F: Fn(f64, f64) -> f64,
{
    XPathValue::Number(op(left.to_number(), right.to_number()))
}
