//! `classify` and `encode` subcommands.

use std::process::ExitCode;

use anyhow::Context;
use chrono::Utc;
use paddyscan_ai::{OnnxEngine, OnnxOptions, Pipeline, encode_blocking, load_pixels};
use paddyscan_core::{Channel, ClassificationResult, ScanRecord};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{ClassifyArgs, EncodeArgs};

/// Classify every image in turn; a failed image is logged and skipped.
pub async fn classify(args: ClassifyArgs) -> anyhow::Result<ExitCode> {
    let labels = args.labels.load()?;
    let engine = OnnxEngine::load(
        &args.model,
        OnnxOptions {
            input_type: args.input_type,
            input_size: args.size,
        },
    )
    .with_context(|| format!("loading model {}", args.model.display()))?;
    let pipeline = Pipeline::new(engine, labels);
    let model = args.model.display().to_string();

    let mut failed = 0usize;
    for image in &args.images {
        let source = image.display().to_string();
        let outcome = if args.top > 1 {
            pipeline
                .rank_path_async(image.clone(), args.top)
                .await
                .map_err(anyhow::Error::from)
                .and_then(best_of)
        } else {
            pipeline
                .classify_path_async(image.clone())
                .await
                .map(|best| (best, Vec::new()))
                .map_err(anyhow::Error::from)
        };

        match outcome {
            Ok((best, ranking)) => {
                info!(
                    image = %source,
                    class = %best.class_name,
                    confidence = best.confidence_percent,
                    "classified image"
                );
                let record = ScanRecord::new(&best, source, model.as_str(), Utc::now().to_rfc3339())
                    .with_ranking(ranking);
                print_json(&record, args.pretty)?;
            }
            Err(e) => {
                failed += 1;
                error!(image = %source, error = %e, "classification failed");
            }
        }
    }

    if failed > 0 {
        warn!(failed, total = args.images.len(), "some images could not be classified");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Split a ranking into its winner and the full list.
fn best_of(
    ranked: Vec<ClassificationResult>,
) -> anyhow::Result<(ClassificationResult, Vec<ClassificationResult>)> {
    let best = ranked.first().cloned().context("ranking came back empty")?;
    Ok((best, ranked))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TensorSummary {
    image: String,
    size: u32,
    input_type: String,
    len: usize,
    red_mean: f64,
    green_mean: f64,
    blue_mean: f64,
}

/// Print what the encoder produces for one image.
pub async fn encode_image(args: EncodeArgs) -> anyhow::Result<ExitCode> {
    let pixels = load_pixels(&args.image, args.size)
        .with_context(|| format!("reading {}", args.image.display()))?;
    let tensor = encode_blocking(pixels, args.input_type).await?;

    let summary = TensorSummary {
        image: args.image.display().to_string(),
        size: args.size,
        input_type: tensor.tensor_type().to_string(),
        len: tensor.len(),
        red_mean: tensor.plane_mean(Channel::Red),
        green_mean: tensor.plane_mean(Channel::Green),
        blue_mean: tensor.plane_mean(Channel::Blue),
    };
    print_json(&summary, true)?;
    Ok(ExitCode::SUCCESS)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
