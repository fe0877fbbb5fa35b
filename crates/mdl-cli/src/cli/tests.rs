//! CLI parsing tests.

use super::{Cli, CliCommand};
use clap::Parser;

#[test]
fn get_parses_urls_and_flags() {
    let cli = Cli::try_parse_from([
        "mdl",
        "get",
        "http://h/a.bin",
        "http://h/b.bin",
        "--output",
        "/tmp/dl",
        "-c",
        "8",
    ])
    .unwrap();
    match cli.command {
        CliCommand::Get {
            urls,
            file,
            output,
            concurrency,
        } => {
            assert_eq!(urls.len(), 2);
            assert!(file.is_none());
            assert_eq!(output.unwrap().to_str(), Some("/tmp/dl"));
            assert_eq!(concurrency, 8);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn get_accepts_url_file() {
    let cli = Cli::try_parse_from(["mdl", "get", "--file", "urls.txt"]).unwrap();
    match cli.command {
        CliCommand::Get { urls, file, .. } => {
            assert!(urls.is_empty());
            assert_eq!(file.unwrap().to_str(), Some("urls.txt"));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn hf_defaults() {
    let cli = Cli::try_parse_from(["mdl", "hf", "Qwen/Qwen3-8B-GGUF"]).unwrap();
    match cli.command {
        CliCommand::Hf {
            repo,
            gguf,
            concurrency,
            ..
        } => {
            assert_eq!(repo, "Qwen/Qwen3-8B-GGUF");
            assert!(!gguf);
            assert_eq!(concurrency, 4);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn hf_gguf_flag() {
    let cli = Cli::try_parse_from(["mdl", "hf", "x/y", "--gguf"]).unwrap();
    matches!(cli.command, CliCommand::Hf { gguf: true, .. })
        .then_some(())
        .expect("gguf flag set");
}

#[test]
fn model_requires_alias() {
    assert!(Cli::try_parse_from(["mdl", "model"]).is_err());
    let cli = Cli::try_parse_from(["mdl", "model", "qwen3-8b"]).unwrap();
    matches!(cli.command, CliCommand::Model { .. })
        .then_some(())
        .expect("model command");
}

#[test]
fn llama_variant_default_is_cpu() {
    let cli = Cli::try_parse_from(["mdl", "llama"]).unwrap();
    match cli.command {
        CliCommand::Llama { variant, .. } => assert_eq!(variant, "cpu"),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["mdl"]).is_err());
}
