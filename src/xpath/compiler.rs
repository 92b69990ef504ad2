//! Locator compiler: expression trees to flat op programs.
//!
//! The evaluator is a small stack machine; flattening the tree into a
//! linear program up front is what makes the compile cache worth having.
//! Predicates written on a step stay attached to its `Navigate` op so the
//! evaluator can apply them per origin node: `[k]` selects the k-th
//! candidate of each origin, not the k-th of the merged set. The two
//! predicate shapes induced locators actually contain, `[k]` and
//! `[@name='value']`, lower to dedicated variants the evaluator tests
//! without running a sub-program.

use super::parser::{self, Axis, BinaryOp, Expr, LocationStep, NodeTest};

/// Compile a locator string into an op program.
pub fn compile(xpath: &str) -> Result<CompiledExpr, String> {
    let tree = parser::parse(xpath)?;
    Ok(compile_tree(&tree))
}

pub fn compile_tree(tree: &Expr) -> CompiledExpr {
    let mut assembler = Assembler { ops: Vec::new() };
    assembler.emit(tree);
    CompiledExpr { ops: assembler.ops }
}

#[derive(Debug, Clone)]
pub struct CompiledExpr {
    pub ops: Vec<Op>,
}

#[derive(Debug, Clone)]
pub enum Op {
    /// Push the document node.
    Root,
    /// Push the context node.
    Current,
    /// Replace the node set on the stack with its parents.
    Parent,
    /// Walk an axis from every node on the stack top, filtering by node
    /// test and step predicates.
    Navigate(Axis, StepTest, Vec<StepPredicate>),
    /// Filter the stack top through a predicate program.
    Filter(Box<CompiledExpr>),
    /// Merge the two node sets on the stack top.
    Union,
    Number(f64),
    Literal(String),
    /// Core-library call taking this many already-pushed arguments.
    Call(String, usize),
    Binary(BinaryOp),
    Neg,
}

#[derive(Debug, Clone)]
pub enum StepTest {
    Named(String),
    Wildcard,
    Node,
    Text,
    Comment,
}

#[derive(Debug, Clone)]
pub enum StepPredicate {
    /// `[k]`: keep each origin's k-th candidate, 1-based, in axis order.
    Position(usize),
    /// `[@name='value']`.
    AttrEq(String, String),
    /// Anything else, evaluated as a sub-program per candidate.
    General(Box<CompiledExpr>),
}

struct Assembler {
    ops: Vec<Op>,
}

impl Assembler {
    fn emit(&mut self, expr: &Expr) {
        match expr {
            Expr::Root => self.ops.push(Op::Root),
            Expr::Current => self.ops.push(Op::Current),
            Expr::Parent => self.ops.push(Op::Parent),
            Expr::Number(value) => self.ops.push(Op::Number(*value)),
            Expr::Literal(value) => self.ops.push(Op::Literal(value.clone())),
            Expr::Neg(inner) => {
                self.emit(inner);
                self.ops.push(Op::Neg);
            }
            Expr::Binary(left, op, right) => {
                self.emit(left);
                self.emit(right);
                self.ops.push(Op::Binary(*op));
            }
            Expr::Union(left, right) => {
                self.emit(left);
                self.emit(right);
                self.ops.push(Op::Union);
            }
            Expr::Path(base, step) => {
                self.emit(base);
                self.emit_step(step);
            }
            Expr::Filter(base, predicate) => {
                self.emit(base);
                self.ops.push(Op::Filter(Box::new(compile_tree(predicate))));
            }
            Expr::Step(step) => {
                self.ops.push(Op::Current);
                self.emit_step(step);
            }
            Expr::Call(name, args) => {
                for arg in args {
                    self.emit(arg);
                }
                self.ops.push(Op::Call(name.clone(), args.len()));
            }
        }
    }

    fn emit_step(&mut self, step: &LocationStep) {
        let test = match &step.test {
            NodeTest::Named(name) => StepTest::Named(name.clone()),
            NodeTest::Wildcard => StepTest::Wildcard,
            NodeTest::Node => StepTest::Node,
            NodeTest::Text => StepTest::Text,
            NodeTest::Comment => StepTest::Comment,
        };
        let predicates = step.predicates.iter().map(lower_predicate).collect();
        self.ops.push(Op::Navigate(step.axis, test, predicates));
    }
}

/// Pick the dedicated form where one applies, else fall back to a
/// sub-program.
fn lower_predicate(predicate: &Expr) -> StepPredicate {
    if let Expr::Number(value) = predicate {
        if value.fract() == 0.0 && *value >= 1.0 {
            return StepPredicate::Position(*value as usize);
        }
    }
    if let Expr::Binary(left, BinaryOp::Eq, right) = predicate {
        if let Some((name, value)) = attr_eq(left, right).or_else(|| attr_eq(right, left)) {
            return StepPredicate::AttrEq(name, value);
        }
    }
    StepPredicate::General(Box::new(compile_tree(predicate)))
}

/// The `@name = 'value'` shape with the attribute step on `attr_side`.
fn attr_eq(attr_side: &Expr, literal_side: &Expr) -> Option<(String, String)> {
    let Expr::Step(step) = attr_side else {
        return None;
    };
    let Expr::Literal(value) = literal_side else {
        return None;
    };
    if step.axis != Axis::Attribute || !step.predicates.is_empty() {
        return None;
    }
    match &step.test {
        NodeTest::Named(name) => Some((name.clone(), value.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_predicates(compiled: &CompiledExpr) -> Vec<&[StepPredicate]> {
        compiled
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Navigate(_, _, predicates) => Some(predicates.as_slice()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_absolute_path_opens_with_root() {
        let compiled = compile("/HTML").unwrap();
        assert!(matches!(compiled.ops[0], Op::Root));
        assert_eq!(compiled.ops.len(), 2);
    }

    #[test]
    fn test_descendant_shorthand_compiles() {
        let compiled = compile("//DIV").unwrap();
        let navigates = compiled
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Navigate(..)))
            .count();
        // The descendant-or-self wrapper plus the DIV step
        assert_eq!(navigates, 2);
    }

    #[test]
    fn test_position_predicate_lowers_to_dedicated_form() {
        let compiled = compile("/HTML[1]").unwrap();
        assert!(step_predicates(&compiled)
            .iter()
            .any(|p| matches!(p, [StepPredicate::Position(1)])));
    }

    #[test]
    fn test_attr_predicate_lowers_to_dedicated_form() {
        let compiled = compile("//DIV[@id='p']").unwrap();
        let found = step_predicates(&compiled).iter().any(|p| {
            matches!(p, [StepPredicate::AttrEq(name, value)] if name == "id" && value == "p")
        });
        assert!(found, "no AttrEq predicate in {:?}", compiled.ops);
    }

    #[test]
    fn test_reversed_attr_equality_lowers_too() {
        let compiled = compile("//DIV['p'=@id]").unwrap();
        let found = step_predicates(&compiled)
            .iter()
            .any(|p| matches!(p, [StepPredicate::AttrEq(..)]));
        assert!(found);
    }

    #[test]
    fn test_contains_predicate_stays_general() {
        let compiled = compile("//P[contains(text(),'pivot')]").unwrap();
        assert!(step_predicates(&compiled)
            .iter()
            .any(|p| matches!(p, [StepPredicate::General(_)])));
    }
}
