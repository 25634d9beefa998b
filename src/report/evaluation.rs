//! Classification metrics on the held-out split

use std::fmt;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use serde::{Deserialize, Serialize};

use crate::pipeline::target::CreditClass;

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class and averaged metrics plus the confusion matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Rows are true classes, columns predicted classes, both in code order
    pub confusion: [[usize; 3]; 3],
    pub per_class: [ClassMetrics; 3],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// Score predictions against the truth. Undefined ratios count as 0.
pub fn evaluate(
    y_true: &[CreditClass],
    y_pred: &[CreditClass],
) -> anyhow::Result<ClassificationReport> {
    if y_true.len() != y_pred.len() {
        anyhow::bail!(
            "Cannot evaluate {} predictions against {} labels",
            y_pred.len(),
            y_true.len()
        );
    }

    let mut confusion = [[0usize; 3]; 3];
    for (t, p) in y_true.iter().zip(y_pred) {
        confusion[t.code()][p.code()] += 1;
    }

    let total = y_true.len();
    let correct: usize = (0..3).map(|k| confusion[k][k]).sum();

    let per_class: [ClassMetrics; 3] = std::array::from_fn(|k| {
        let tp = confusion[k][k];
        let predicted: usize = (0..3).map(|r| confusion[r][k]).sum();
        let support: usize = confusion[k].iter().sum();

        let precision = ratio(tp, predicted);
        let recall = ratio(tp, support);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassMetrics {
            precision,
            recall,
            f1,
            support,
        }
    });

    let macro_avg = ClassMetrics {
        precision: per_class.iter().map(|m| m.precision).sum::<f64>() / 3.0,
        recall: per_class.iter().map(|m| m.recall).sum::<f64>() / 3.0,
        f1: per_class.iter().map(|m| m.f1).sum::<f64>() / 3.0,
        support: total,
    };

    let weighted = |f: fn(&ClassMetrics) -> f64| {
        if total == 0 {
            0.0
        } else {
            per_class
                .iter()
                .map(|m| f(m) * m.support as f64)
                .sum::<f64>()
                / total as f64
        }
    };
    let weighted_avg = ClassMetrics {
        precision: weighted(|m| m.precision),
        recall: weighted(|m| m.recall),
        f1: weighted(|m| m.f1),
        support: total,
    };

    Ok(ClassificationReport {
        confusion,
        per_class,
        accuracy: ratio(correct, total),
        macro_avg,
        weighted_avg,
    })
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl ClassificationReport {
    /// Metrics table in the familiar precision/recall/f1/support layout
    pub fn metrics_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Class").add_attribute(Attribute::Bold),
            Cell::new("Precision").add_attribute(Attribute::Bold),
            Cell::new("Recall").add_attribute(Attribute::Bold),
            Cell::new("F1").add_attribute(Attribute::Bold),
            Cell::new("Support").add_attribute(Attribute::Bold),
        ]);

        let row = |name: String, m: &ClassMetrics, color: Color| {
            vec![
                Cell::new(name).fg(color),
                Cell::new(format!("{:.3}", m.precision)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.3}", m.recall)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.3}", m.f1)).set_alignment(CellAlignment::Right),
                Cell::new(m.support).set_alignment(CellAlignment::Right),
            ]
        };

        for class in CreditClass::ALL {
            table.add_row(row(
                class.label().to_string(),
                &self.per_class[class.code()],
                Color::White,
            ));
        }
        table.add_row(row("macro avg".to_string(), &self.macro_avg, Color::Cyan));
        table.add_row(row("weighted avg".to_string(), &self.weighted_avg, Color::Cyan));
        table
    }

    /// Confusion matrix with true classes as rows
    pub fn confusion_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);

        let mut header = vec![Cell::new("true \\ pred").add_attribute(Attribute::Bold)];
        header.extend(
            CreditClass::ALL
                .iter()
                .map(|c| Cell::new(c.label()).add_attribute(Attribute::Bold)),
        );
        table.set_header(header);

        for class in CreditClass::ALL {
            let mut cells = vec![Cell::new(class.label())];
            for (col, count) in self.confusion[class.code()].iter().enumerate() {
                let cell = Cell::new(count).set_alignment(CellAlignment::Right);
                cells.push(if col == class.code() {
                    cell.fg(Color::Green).add_attribute(Attribute::Bold)
                } else {
                    cell
                });
            }
            table.add_row(cells);
        }
        table
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f, "{}", self.metrics_table())?;
        write!(f, "{}", self.confusion_table())
    }
}
