//! Command line front end
//!
//! ```text
//! section-run run <input.json|input.r2t> [-o <output>] [--format json|csv] [-q|--quiet]
//! section-run info <input.json|input.r2t>
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};

use rc_section::io::{run_request, AnalysisRequest, SectionProperties};

const USAGE: &str = "usage:
  section-run run <input.json|input.r2t> [-o <output>] [--format json|csv] [-q|--quiet]
  section-run info <input.json|input.r2t>";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Json,
    Csv,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }
}

struct RunArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    format: Format,
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("run") => run(parse_run_args(&args[1..])?),
        Some("info") => info(Path::new(args.get(1).context(USAGE)?)),
        Some("-h") | Some("--help") | None => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => bail!("unknown command `{}`\n{}", other, USAGE),
    }
}

fn parse_run_args(args: &[String]) -> anyhow::Result<RunArgs> {
    let mut input = None;
    let mut output = None;
    let mut format = Format::Json;
    let mut quiet = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                output = Some(PathBuf::from(iter.next().context("-o needs a file name")?));
            }
            "--format" => {
                format = match iter.next().map(String::as_str) {
                    Some("json") => Format::Json,
                    Some("csv") => Format::Csv,
                    Some(other) => bail!("unknown format `{}` (expected json or csv)", other),
                    None => bail!("--format needs a value"),
                };
            }
            "-q" | "--quiet" => quiet = true,
            other if other.starts_with('-') => {
                bail!("unexpected argument `{}`\n{}", other, USAGE)
            }
            other if input.is_none() => input = Some(PathBuf::from(other)),
            other => bail!("unexpected argument `{}`\n{}", other, USAGE),
        }
    }

    Ok(RunArgs {
        input: input.context(USAGE)?,
        output,
        format,
        quiet,
    })
}

/// `<stem>_results.<ext>` next to the input
fn default_output(input: &Path, format: Format) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "section".to_string());
    input.with_file_name(format!("{}_results.{}", stem, format.extension()))
}

fn run(args: RunArgs) -> anyhow::Result<()> {
    let input = args.input.as_path();
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(input, args.format));

    let request = AnalysisRequest::from_file(input)
        .with_context(|| format!("reading {}", input.display()))?;

    let start = Instant::now();
    let mut report = run_request(&request)?;
    let elapsed = start.elapsed().as_secs_f64();
    report.metadata.computation_time = Some(elapsed);

    let text = match args.format {
        Format::Json => serde_json::to_string_pretty(&report)?,
        Format::Csv => report.results.to_csv(report.metadata.analysis_type),
    };
    std::fs::write(&output, text).with_context(|| format!("writing {}", output.display()))?;

    if args.quiet {
        return Ok(());
    }
    let summary = &report.results.summary;
    println!("Analysis: {}", report.metadata.analysis_type.as_str());
    println!(
        "Points:   {} ({} converged)",
        summary.total_points, summary.converged_points
    );
    if let Some(ultimate) = summary.ultimate {
        println!("Ultimate: {:.3}", ultimate);
    }
    if let Some(mode) = summary.failure_mode {
        println!("Failure:  {}", mode);
    }
    println!("Time:     {:.3} s", elapsed);
    println!("Results written to {}", output.display());
    Ok(())
}

fn info(input: &Path) -> anyhow::Result<()> {
    let request = AnalysisRequest::from_file(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let section = request.build_section()?;
    let props = SectionProperties::of(&section);

    println!("Section properties ({})", input.display());
    println!("  Units:             {}", request.units);
    println!("  Height:            {:.1} mm", props.height_mm);
    println!("  Gross area:        {:.0} mm²", props.gross_area_mm2);
    println!("  Centroid:          {:.1} mm", props.centroid_y_mm);
    println!("  Ig:                {:.4e} mm⁴", props.gross_ig_mm4);
    println!("  Transformed area:  {:.0} mm²", props.transformed_area_mm2);
    println!("  Rebar area:        {:.0} mm²", props.total_rebar_area_mm2);
    println!("  Steel ratio:       {:.4}", props.reinforcement_ratio);
    println!(
        "  Layers / bars / tendons: {} / {} / {}",
        props.n_concrete_layers, props.n_rebars, props.n_tendons
    );
    println!("  Analysis:          {}", request.analysis.analysis_type.as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_run_flags() {
        let args = parse_run_args(&strings(&["beam.r2t", "--format", "csv", "-q"])).unwrap();
        assert_eq!(args.input, PathBuf::from("beam.r2t"));
        assert_eq!(args.format, Format::Csv);
        assert!(args.quiet);
        assert!(args.output.is_none());
        assert_eq!(
            default_output(&args.input, args.format),
            PathBuf::from("beam_results.csv")
        );

        let args = parse_run_args(&strings(&["--quiet", "-o", "out.json", "beam.json"])).unwrap();
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
        assert_eq!(args.format, Format::Json);
    }

    #[test]
    fn test_bad_run_flags() {
        assert!(parse_run_args(&strings(&[])).is_err());
        assert!(parse_run_args(&strings(&["beam.json", "--format", "xml"])).is_err());
        assert!(parse_run_args(&strings(&["beam.json", "--format"])).is_err());
        assert!(parse_run_args(&strings(&["a.json", "b.json"])).is_err());
        assert!(parse_run_args(&strings(&["beam.json", "--verbose"])).is_err());
    }
}
