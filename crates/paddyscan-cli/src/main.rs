mod scan;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use paddyscan_ai::DEFAULT_INPUT_SIZE;
use paddyscan_core::{LabelTable, TensorType};

/// Rice-leaf nutrient deficiency classifier.
#[derive(Parser, Debug)]
#[command(name = "paddyscan", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify one or more leaf images, printing one JSON record per image
    Classify(ClassifyArgs),
    /// Print the label table in class-index order
    Labels(LabelArgs),
    /// Encode an image and print tensor statistics
    Encode(EncodeArgs),
}

#[derive(Args, Debug)]
struct LabelArgs {
    /// JSON label table (array, or object keyed by class index); defaults to the rice NPK classes
    #[arg(long, env = "PADDYSCAN_LABELS", value_name = "FILE")]
    labels: Option<PathBuf>,
}

impl LabelArgs {
    fn load(&self) -> anyhow::Result<LabelTable> {
        match &self.labels {
            Some(path) => LabelTable::from_file(path)
                .with_context(|| format!("loading labels from {}", path.display())),
            None => Ok(LabelTable::rice_npk()),
        }
    }
}

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// ONNX model file
    #[arg(long, env = "PADDYSCAN_MODEL", value_name = "FILE")]
    model: PathBuf,

    #[command(flatten)]
    labels: LabelArgs,

    /// Model input type (float32 or uint8)
    #[arg(long, env = "PADDYSCAN_INPUT_TYPE", default_value_t = TensorType::Float32)]
    input_type: TensorType,

    /// Square input size, used when the model's input shape is dynamic
    #[arg(long, env = "PADDYSCAN_SIZE", default_value_t = DEFAULT_INPUT_SIZE)]
    size: u32,

    /// Include the K best classes in each record
    #[arg(long, default_value_t = 1, value_name = "K")]
    top: usize,

    /// Pretty-print JSON records
    #[arg(long)]
    pretty: bool,

    #[arg(required = true, value_name = "IMAGE")]
    images: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct EncodeArgs {
    #[arg(long, env = "PADDYSCAN_INPUT_TYPE", default_value_t = TensorType::Float32)]
    input_type: TensorType,

    #[arg(long, env = "PADDYSCAN_SIZE", default_value_t = DEFAULT_INPUT_SIZE)]
    size: u32,

    #[arg(value_name = "IMAGE")]
    image: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt::init();
    tracing::debug!("paddyscan v{}", env!("CARGO_PKG_VERSION"));

    match Cli::parse().command {
        Command::Classify(args) => scan::classify(args).await,
        Command::Labels(args) => {
            for (index, name) in args.load()?.iter() {
                println!("{index}\t{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Encode(args) => scan::encode_image(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn classify_defaults() {
        let cli = Cli::try_parse_from([
            "paddyscan",
            "classify",
            "--model",
            "rice.onnx",
            "leaf.jpg",
        ])
        .unwrap();
        let Command::Classify(args) = cli.command else {
            panic!("expected classify");
        };
        assert_eq!(args.model, PathBuf::from("rice.onnx"));
        assert_eq!(args.input_type, TensorType::Float32);
        assert_eq!(args.size, DEFAULT_INPUT_SIZE);
        assert_eq!(args.top, 1);
        assert_eq!(args.images, vec![PathBuf::from("leaf.jpg")]);
    }

    #[test]
    fn classify_options() {
        let cli = Cli::try_parse_from([
            "paddyscan",
            "classify",
            "--model",
            "rice.onnx",
            "--input-type",
            "uint8",
            "--size",
            "128",
            "--top",
            "3",
            "a.jpg",
            "b.jpg",
        ])
        .unwrap();
        let Command::Classify(args) = cli.command else {
            panic!("expected classify");
        };
        assert_eq!(args.input_type, TensorType::Uint8);
        assert_eq!(args.size, 128);
        assert_eq!(args.top, 3);
        assert_eq!(args.images.len(), 2);
    }

    #[test]
    fn classify_requires_an_image() {
        assert!(Cli::try_parse_from(["paddyscan", "classify", "--model", "m.onnx"]).is_err());
    }

    #[test]
    fn rejects_unknown_input_type() {
        assert!(
            Cli::try_parse_from([
                "paddyscan",
                "encode",
                "--input-type",
                "int16",
                "leaf.jpg"
            ])
            .is_err()
        );
    }

    #[test]
    fn labels_default_to_rice_npk() {
        let args = LabelArgs { labels: None };
        assert_eq!(args.load().unwrap(), LabelTable::rice_npk());
    }
}
