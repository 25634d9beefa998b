//! The `train` command: load, fit, evaluate and save

use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use super::args::TrainArgs;
use super::prompts::confirm_overwrite;
use crate::pipeline::loader::{load_dataset, schema_length};
use crate::pipeline::runner::{prepare_training_frame, train_on_frame};
use crate::report::TrainingSummary;
use crate::utils::{
    create_progress_bar, create_spinner, finish_with_success, print_banner, print_completion,
    print_config, print_info, print_step_header, print_step_time, print_success,
};

pub fn run_train(args: &TrainArgs) -> Result<()> {
    if args.output.exists() && !args.no_confirm && !confirm_overwrite(&args.output)? {
        println!("Cancelled by user.");
        return Ok(());
    }

    let config = args.to_config();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&args.input, &args.output, &config);

    // Step 1: load
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading dataset...");
    let df = load_dataset(&args.input, schema_length(args.infer_schema_length))?;
    finish_with_success(&spinner, "Dataset loaded");

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", df.height());
    println!("      Columns: {}", df.width());

    let mut summary = TrainingSummary::new(df.height());
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    // Step 2: labels
    print_step_header(2, "Map Credit Score Labels");
    let frame = prepare_training_frame(&df, &config.columns)?;
    summary.set_labels(frame.class_counts, frame.dropped_rows);
    if frame.dropped_rows == 0 {
        print_success("Every row has a valid label");
    } else {
        print_info(&format!(
            "Dropped {} row(s) with missing or unknown labels",
            style(frame.dropped_rows).yellow().bold()
        ));
    }
    drop(df);

    // Step 3: fit and evaluate
    print_step_header(3, "Fit Pipeline and Classifier");
    let step_start = Instant::now();
    let progress = create_progress_bar(config.gbdt.n_estimators as u64, "    Boosting");
    let outcome = train_on_frame(&frame, &config, &progress)?;
    finish_with_success(&progress, "Classifier trained");

    summary.set_split(outcome.train_rows, outcome.test_rows);
    summary.set_model(
        outcome.pipeline.feature_columns().len(),
        outcome.pipeline.classifier().n_rounds(),
    );
    summary.set_report(&outcome.report);

    let imputer = outcome.pipeline.chain().imputer();
    log::info!(
        "Median age {}, global balance median {:?}, {} occupation group(s)",
        outcome.pipeline.chain().capper().median_age(),
        imputer.global_median(),
        imputer.group_medians().len()
    );

    println!();
    println!("    {}", style(format!("Accuracy: {:.4}", outcome.report.accuracy)).bold());
    for line in outcome.report.metrics_table().to_string().lines() {
        println!("    {}", line);
    }
    println!();
    for line in outcome.report.confusion_table().to_string().lines() {
        println!("    {}", line);
    }

    let train_elapsed = step_start.elapsed();
    summary.set_train_time(train_elapsed);
    print_step_time(train_elapsed);

    // Step 4: save
    print_step_header(4, "Save Model");
    let step_start = Instant::now();
    let spinner = create_spinner("Writing model artifact...");
    outcome
        .pipeline
        .save(&args.output)
        .with_context(|| format!("Saving model to {} failed", args.output.display()))?;
    finish_with_success(&spinner, &format!("Saved to {}", args.output.display()));
    summary.set_artifact(args.output.clone());

    let save_elapsed = step_start.elapsed();
    summary.set_save_time(save_elapsed);
    print_step_time(save_elapsed);

    summary.display();
    print_completion();

    Ok(())
}
