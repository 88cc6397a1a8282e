use super::{ConditionEntry, ConditionalScript, DemoScript, OperationScript};
use crate::id::WorkKind;
use crate::operand::Operand;
use std::fmt;

const MAX_DISPLAY_DEPTH: usize = 32;

/// Renders a script as a tree: operations in execution order, their
/// conditions in evaluation order, and the work each condition triggers.
pub struct DisplayScript<'a> {
    pub script: &'a DemoScript,
}

impl<'a> fmt::Display for DisplayScript<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "DemoScript ({} operations, {} steps)",
            self.script.operations.len(),
            self.script.steps.len()
        )?;
        let count = self.script.operation_order.len();
        for (i, uid) in self.script.operation_order.iter().enumerate() {
            self.fmt_operation(f, uid, "", i + 1 == count, 0)?;
        }
        Ok(())
    }
}

impl<'a> DisplayScript<'a> {
    fn fmt_operation(
        &self,
        f: &mut fmt::Formatter<'_>,
        uid: &str,
        prefix: &str,
        is_last: bool,
        depth: usize,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;
        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        if depth > MAX_DISPLAY_DEPTH {
            return writeln!(f, "{} <nesting too deep>", uid);
        }

        match self.script.operations.get(uid) {
            None => writeln!(f, "{} <Unknown Operation>", uid),
            Some(OperationScript::Unsupported(op)) => {
                writeln!(f, "{} (unsupported: {})", uid, op.operation_type)
            }
            Some(OperationScript::Conditional(script)) => {
                let critical = if script.critical { ", critical" } else { "" };
                writeln!(f, "{} (conditional{})", uid, critical)?;
                let count = script.order.len();
                for (i, cond_id) in script.order.iter().enumerate() {
                    let keyword = if i == 0 { "if" } else { "elif" };
                    self.fmt_condition(
                        f,
                        script,
                        cond_id,
                        keyword,
                        &child_prefix,
                        i + 1 == count,
                        depth,
                    )?;
                }
                Ok(())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn fmt_condition(
        &self,
        f: &mut fmt::Formatter<'_>,
        script: &ConditionalScript,
        cond_id: &str,
        keyword: &str,
        prefix: &str,
        is_last: bool,
        depth: usize,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        let Some(entry) = script.conditions.get(cond_id) else {
            return writeln!(f, "{}{}{} <Unknown Condition>", prefix, node_marker, cond_id);
        };

        if entry.is_else() {
            writeln!(f, "{}{}else", prefix, node_marker)?;
        } else {
            writeln!(
                f,
                "{}{}{} {}",
                prefix,
                node_marker,
                keyword,
                self.describe(script, entry, depth)
            )?;
        }

        match &entry.work {
            Some(work) => self.fmt_work(f, work, &child_prefix, depth + 1),
            None => Ok(()),
        }
    }

    fn fmt_work(
        &self,
        f: &mut fmt::Formatter<'_>,
        uid: &str,
        prefix: &str,
        depth: usize,
    ) -> fmt::Result {
        match WorkKind::of(uid) {
            Some(WorkKind::Operation) => self.fmt_operation(f, uid, prefix, true, depth),
            _ => match self.script.steps.get(uid) {
                Some(step) => match &step.description {
                    Some(description) => writeln!(
                        f,
                        "{}└── Step {} [{}] \"{}\"",
                        prefix, uid, step.context, description
                    ),
                    None => writeln!(f, "{}└── Step {} [{}]", prefix, uid, step.context),
                },
                None => writeln!(f, "{}└── {} <Unknown Work>", prefix, uid),
            },
        }
    }

    /// Renders the comparison of an entry, inlining nested sub-conditions.
    fn describe(&self, script: &ConditionalScript, entry: &ConditionEntry, depth: usize) -> String {
        let a = self.describe_operand(script, entry.value_a.as_ref(), depth);
        match entry.operator {
            None => a,
            Some(op) if op.is_unary() => format!("{} {}", op, a),
            Some(op) => {
                let b = self.describe_operand(script, entry.value_b.as_ref(), depth);
                format!("{} {} {}", a, op, b)
            }
        }
    }

    fn describe_operand(
        &self,
        script: &ConditionalScript,
        operand: Option<&Operand>,
        depth: usize,
    ) -> String {
        match operand {
            None => "null".to_string(),
            Some(Operand::Internal { owner_id, .. })
                if WorkKind::of(owner_id) == Some(WorkKind::Condition)
                    && depth < MAX_DISPLAY_DEPTH =>
            {
                match script.conditions.get(owner_id) {
                    Some(nested) => format!("({})", self.describe(script, nested, depth + 1)),
                    None => format!("${}", owner_id),
                }
            }
            Some(operand) => operand.to_string(),
        }
    }
}
