//! Application wiring for the `phonofit` binary.
//!
//! `main.rs` only maps errors to exit codes; the work happens here. A run
//! parses arguments, loads a spectra CSV (or synthesizes one), fits every
//! mode, prints the peak reports, drives the figure renderers, and writes
//! any requested exports.

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs};
use crate::domain::{FitConfig, ReportStyle, SampleConfig};
use crate::error::AppError;
use crate::plot::{AsciiRenderer, PeakFigure, PngRenderer, Renderer};

pub mod pipeline;

/// Entry point for the `phonofit` binary.
pub fn run() -> Result<(), AppError> {
    // `phonofit` and `phonofit -n 600` should behave like `phonofit fit ...`,
    // but clap insists on a subcommand name, so the argv list is patched
    // before it reaches the parser.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => fit_and_render(args, false),
        Command::View(args) => fit_and_render(args, true),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Shared body of `fit` and `view`; the two differ only in whether the
/// interactive browser joins the renderer stack.
fn fit_and_render(args: FitArgs, interactive: bool) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    print_reports(&run, &config);

    let mut renderers = build_renderers(&config, interactive);
    drive_renderers(&mut renderers, &run.figures)?;

    write_exports(&run, &config)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let results = crate::io::results::read_results_json(&args.results)?;
    let style = ReportStyle {
        unit: results.unit.clone(),
        ..ReportStyle::default()
    };

    let figures: Vec<PeakFigure> = results
        .peaks
        .iter()
        .map(|record| crate::plot::figure_from_record(record, &results.frequencies, &style))
        .collect();

    let mut renderer: Box<dyn Renderer> = match &args.png_dir {
        Some(dir) => Box::new(PngRenderer::new(dir.clone(), args.png_width, args.png_height)),
        None => Box::new(AsciiRenderer::new(args.width, args.height)),
    };
    for figure in &figures {
        renderer.draw_peak(figure)?;
    }
    renderer.present()
}

fn print_reports(run: &pipeline::RunOutput, config: &FitConfig) {
    print!(
        "{}",
        crate::report::format_run_summary(&run.data, &run.stats, &run.analysis, &config.style)
    );
    print!("{}", crate::report::format_report(&run.analysis, &config.style));
}

/// Assemble the renderer stack for one run.
///
/// ASCII goes first (it prints), PNG second (it writes files and logs), and
/// the TUI last because its `present` blocks until the viewer quits.
fn build_renderers(config: &FitConfig, tui: bool) -> Vec<Box<dyn Renderer>> {
    let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();
    if config.ascii && !tui {
        renderers.push(Box::new(AsciiRenderer::new(config.plot_width, config.plot_height)));
    }
    if let Some(dir) = &config.png_dir {
        renderers.push(Box::new(PngRenderer::new(dir.clone(), config.png_width, config.png_height)));
    }
    if tui {
        renderers.push(Box::new(crate::tui::TuiRenderer::new()));
    }
    renderers
}

fn drive_renderers(renderers: &mut [Box<dyn Renderer>], figures: &[PeakFigure]) -> Result<(), AppError> {
    for renderer in renderers.iter_mut() {
        for figure in figures {
            renderer.draw_peak(figure)?;
        }
        renderer.present()?;
    }
    Ok(())
}

fn write_exports(run: &pipeline::RunOutput, config: &FitConfig) -> Result<(), AppError> {
    if config.export_csv.is_none() && config.export_results.is_none() {
        return Ok(());
    }

    let records = crate::io::results::build_peak_records(&run.analysis, &run.data.frequencies);
    if let Some(path) = &config.export_csv {
        crate::io::export::write_peaks_csv(path, &records, &config.style)?;
    }
    if let Some(path) = &config.export_results {
        crate::io::results::write_results_json(path, &records, &run.data.frequencies, &config.style)?;
    }

    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        spectra_path: args.spectra.clone(),
        sample: SampleConfig {
            modes: args.modes,
            samples: args.samples,
            seed: args.seed,
            freq_min: args.freq_min,
            freq_max: args.freq_max,
            noise: args.noise,
        },
        hwhm_guess: args.hwhm_guess,
        offset_guess: args.offset_guess,
        max_iterations: args.max_iterations,
        ascii: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        png_dir: args.png_dir.clone(),
        png_width: args.png_width,
        png_height: args.png_height,
        export_csv: args.export.clone(),
        export_results: args.export_results.clone(),
        style: ReportStyle {
            unit: args.unit.clone(),
            decimals: args.decimals,
            annotation_decimals: 4,
        },
    }
}

/// Rewrite argv so `phonofit` defaults to `phonofit fit`.
///
/// Rules:
/// - `phonofit`                      -> `phonofit fit`
/// - `phonofit -n 600 ...`           -> `phonofit fit -n 600 ...`
/// - `phonofit --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let first = match argv.get(1) {
        Some(arg) => arg.clone(),
        None => {
            argv.push("fit".to_string());
            return argv;
        }
    };

    let passthrough = matches!(
        first.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help" | "fit" | "view" | "plot"
    );
    if !passthrough && first.starts_with('-') {
        // A leading flag is shorthand for `fit` with those flags.
        argv.insert(1, "fit".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_becomes_fit() {
        assert_eq!(rewrite_args(argv(&["phonofit"])), argv(&["phonofit", "fit"]));
        assert_eq!(
            rewrite_args(argv(&["phonofit", "-n", "600"])),
            argv(&["phonofit", "fit", "-n", "600"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["phonofit", "view"])),
            argv(&["phonofit", "view"])
        );
        assert_eq!(
            rewrite_args(argv(&["phonofit", "--help"])),
            argv(&["phonofit", "--help"])
        );
        assert_eq!(
            rewrite_args(argv(&["phonofit", "plot", "--results", "run.json"])),
            argv(&["phonofit", "plot", "--results", "run.json"])
        );
    }

    #[test]
    fn args_map_onto_the_fit_config() {
        let cli = crate::cli::Cli::parse_from([
            "phonofit",
            "fit",
            "-m",
            "3",
            "--seed",
            "11",
            "--no-plot",
            "--unit",
            "meV",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit command");
        };

        let config = fit_config_from_args(&args);
        assert_eq!(config.sample.modes, 3);
        assert_eq!(config.sample.seed, 11);
        assert!(!config.ascii);
        assert_eq!(config.style.unit, "meV");
        assert_eq!(config.style.decimals, 6);
        assert!(config.spectra_path.is_none());
    }
}
