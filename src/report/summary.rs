//! Training summary report

use std::path::PathBuf;
use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use super::evaluation::ClassificationReport;
use crate::pipeline::target::CreditClass;

/// What a training run did, collected step by step
#[derive(Debug, Default)]
pub struct TrainingSummary {
    pub loaded_rows: usize,
    pub dropped_rows: usize,
    pub class_counts: [usize; 3],
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_count: usize,
    pub rounds: usize,
    pub accuracy: Option<f64>,
    pub macro_f1: Option<f64>,
    pub artifact: Option<PathBuf>,
    pub load_time: Duration,
    pub train_time: Duration,
    pub save_time: Duration,
}

impl TrainingSummary {
    pub fn new(loaded_rows: usize) -> Self {
        Self {
            loaded_rows,
            ..Default::default()
        }
    }

    pub fn set_labels(&mut self, class_counts: [usize; 3], dropped_rows: usize) {
        self.class_counts = class_counts;
        self.dropped_rows = dropped_rows;
    }

    pub fn set_split(&mut self, train_rows: usize, test_rows: usize) {
        self.train_rows = train_rows;
        self.test_rows = test_rows;
    }

    pub fn set_model(&mut self, feature_count: usize, rounds: usize) {
        self.feature_count = feature_count;
        self.rounds = rounds;
    }

    pub fn set_report(&mut self, report: &ClassificationReport) {
        self.accuracy = Some(report.accuracy);
        self.macro_f1 = Some(report.macro_avg.f1);
    }

    pub fn set_artifact(&mut self, path: PathBuf) {
        self.artifact = Some(path);
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_train_time(&mut self, elapsed: Duration) {
        self.train_time = elapsed;
    }

    pub fn set_save_time(&mut self, elapsed: Duration) {
        self.save_time = elapsed;
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.train_time + self.save_time
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Rows loaded"), Cell::new(self.loaded_rows)]);
        table.add_row(vec![
            Cell::new("🗑️  Dropped (no label)"),
            Cell::new(self.dropped_rows).fg(if self.dropped_rows == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        for class in CreditClass::ALL {
            table.add_row(vec![
                Cell::new(format!("   {}", class.label())),
                Cell::new(self.class_counts[class.code()]),
            ]);
        }

        table.add_row(vec![
            Cell::new("✂️  Train / Test"),
            Cell::new(format!("{} / {}", self.train_rows, self.test_rows)),
        ]);
        table.add_row(vec![Cell::new("🧮 Features"), Cell::new(self.feature_count)]);
        table.add_row(vec![Cell::new("🌲 Boosting rounds"), Cell::new(self.rounds)]);

        if let Some(accuracy) = self.accuracy {
            let color = if accuracy >= 0.75 {
                Color::Green
            } else if accuracy >= 0.6 {
                Color::Yellow
            } else {
                Color::Red
            };
            table.add_row(vec![
                Cell::new("🎯 Test accuracy"),
                Cell::new(format!("{:.4}", accuracy))
                    .fg(color)
                    .add_attribute(Attribute::Bold),
            ]);
        }
        if let Some(f1) = self.macro_f1 {
            table.add_row(vec![Cell::new("📐 Macro F1"), Cell::new(format!("{:.4}", f1))]);
        }
        if let Some(path) = &self.artifact {
            table.add_row(vec![
                Cell::new("💾 Model"),
                Cell::new(path.display()).fg(Color::Green),
            ]);
        }
        table.add_row(vec![
            Cell::new("⏱️  Total time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64())),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("TRAINING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        for line in self.to_table().to_string().lines() {
            println!("    {}", line);
        }
    }
}
