//! Formula evaluation against named series.
//!
//! Every operand is gap-filled before it is combined, so a derived signal
//! never carries missing cells. If any operand name cannot be resolved the
//! formula yields no result at all rather than a partial signal.

use crate::domain::{Series, SeriesSource};
use crate::error::SignalError;
use crate::formula::parser::{Operand, OperationNode, parse};
use crate::signal::gapfill;

/// Parse and evaluate `text` against `source`.
///
/// Returns `Ok(None)` when an operand is not present in `source`. The result
/// is named after the formula and carries the unit of its first operand.
pub fn evaluate<S>(text: &str, source: &S) -> Result<Option<Series>, SignalError>
where
    S: SeriesSource + ?Sized,
{
    let node = parse(text)?;
    evaluate_node(&node, source)
}

/// Evaluate an already parsed formula.
pub fn evaluate_node<S>(node: &OperationNode, source: &S) -> Result<Option<Series>, SignalError>
where
    S: SeriesSource + ?Sized,
{
    let missing: Vec<&str> = node
        .leaves()
        .into_iter()
        .filter(|name| source.series(name).is_none())
        .collect();
    if !missing.is_empty() {
        log::warn!("formula '{node}' references unknown series: {}", missing.join(", "));
        return Ok(None);
    }

    let mut result = exec(node, source)?;
    result.name = node.to_string();
    Ok(Some(result))
}

fn resolve<'a, S>(source: &'a S, name: &str) -> Result<&'a Series, SignalError>
where
    S: SeriesSource + ?Sized,
{
    source
        .series(name)
        .ok_or_else(|| SignalError::malformed(format!("unknown series '{name}'")))
}

fn exec<S>(node: &OperationNode, source: &S) -> Result<Series, SignalError>
where
    S: SeriesSource + ?Sized,
{
    let left = match &node.left {
        Operand::Leaf(name) => gapfill::fix(resolve(source, name)?),
        Operand::Node(inner) => gapfill::fix(&exec(inner, source)?),
    };
    let right = gapfill::fix(resolve(source, &node.right)?);

    if left.len() != right.len() {
        return Err(SignalError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }

    let samples = left
        .samples
        .iter()
        .zip(right.samples.iter())
        .map(|(l, r)| match (l, r) {
            (Some(l), Some(r)) => Some(node.operator.apply(*l, *r)),
            _ => None,
        })
        .collect();

    Ok(Series {
        name: left.name,
        unit: left.unit,
        samples,
    })
}

/// A named signal computed from a formula over other signals.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSignal {
    pub name: String,
    formula: OperationNode,
}

impl DerivedSignal {
    pub fn new(name: impl Into<String>, formula_text: &str) -> Result<Self, SignalError> {
        Ok(Self {
            name: name.into(),
            formula: parse(formula_text)?,
        })
    }

    pub fn formula(&self) -> &OperationNode {
        &self.formula
    }

    pub fn compute<S>(&self, source: &S) -> Result<Option<Series>, SignalError>
    where
        S: SeriesSource + ?Sized,
    {
        Ok(evaluate_node(&self.formula, source)?.map(|s| s.renamed(self.name.clone())))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn data(entries: &[(&str, &str, Vec<Option<f64>>)]) -> HashMap<String, Series> {
        entries
            .iter()
            .map(|(name, unit, samples)| (name.to_string(), Series::new(*name, *unit, samples.clone())))
            .collect()
    }

    fn all(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn evaluates_left_to_right() {
        let d = data(&[
            ("A", "W", all(&[1.0, 1.0, 1.0])),
            ("B", "W", all(&[6.0, 6.0, 6.0])),
            ("C", "W", all(&[3.0, 3.0, 3.0])),
        ]);
        let out = evaluate("A + B - C", &d).unwrap().unwrap();
        assert_eq!(out.samples, all(&[4.0, 4.0, 4.0]));
        assert_eq!(out.name, "A + B - C");

        let out = evaluate("A - B + C", &d).unwrap().unwrap();
        assert_eq!(out.samples, all(&[-2.0, -2.0, -2.0]));
    }

    #[test]
    fn operands_are_gap_filled() {
        let d = data(&[
            ("A", "W", vec![Some(1.0), None, Some(3.0)]),
            ("B", "W", vec![None, Some(10.0), None]),
        ]);
        // B's missing ends look at each other and fall back to zero.
        let out = evaluate("A + B", &d).unwrap().unwrap();
        assert_eq!(out.samples, all(&[1.0, 12.0, 3.0]));
    }

    #[test]
    fn unit_comes_from_first_operand() {
        let d = data(&[
            ("A", "kW", all(&[1.0])),
            ("B", "W", all(&[2.0])),
            ("C", "Wh", all(&[3.0])),
        ]);
        let out = evaluate("A + B - C", &d).unwrap().unwrap();
        assert_eq!(out.unit, "kW");
    }

    #[test]
    fn unknown_operand_yields_no_result() {
        let d = data(&[("A", "W", all(&[1.0]))]);
        assert_eq!(evaluate("A + NOPE", &d).unwrap(), None);
    }

    #[test]
    fn malformed_formula_is_an_error() {
        let d = data(&[("A", "W", all(&[1.0]))]);
        assert!(matches!(
            evaluate("A +", &d),
            Err(SignalError::MalformedInput(_))
        ));
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let d = data(&[("A", "W", all(&[1.0, 2.0])), ("B", "W", all(&[1.0]))]);
        assert_eq!(
            evaluate("A - B", &d),
            Err(SignalError::LengthMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn derived_signal_carries_its_own_name() {
        let d = data(&[
            ("SOLAR", "W", all(&[1.0, 1.0])),
            ("PROD", "W", all(&[6.0, 6.0])),
            ("USAGE", "W", all(&[3.0, 3.0])),
            ("OTHER", "W", all(&[12.0, 12.0])),
        ]);
        let derived = DerivedSignal::new("consumption", "SOLAR - PROD + USAGE -  OTHER").unwrap();
        let out = derived.compute(&d).unwrap().unwrap();
        assert_eq!(out.name, "consumption");
        assert_eq!(out.samples, all(&[-14.0, -14.0]));
        assert_eq!(derived.formula().leaves().len(), 4);
    }
}
