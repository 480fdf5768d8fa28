mod cli;

use std::{fs::File, io::BufReader, path::Path, process::ExitCode};

use clap::Parser;
use wavcheck::{
    ERR_UNREADABLE,
    analysers::{Analyser, defects::DefectScanner, loudness::LoudnessAnalyser, run},
    config::Config,
    decoder::SampleStream,
    header::AudioFormat,
    inputs::collect_inputs,
    json::{build_json, json_path, write_json},
    output,
    output::{Output, fmt_number},
    report::{FileSummary, append_table_row, write_info, write_markers},
};

use cli::Cli;

const READ_BUFFER_SIZE: usize = 1 << 20;

fn print_format(format: &AudioFormat) {
    output!("[+] sample rate:      {}", format.sample_rate);
    output!("[+] channels:         {}", format.channels);
    output!("[+] bits per sample:  {}", format.bits_per_sample());
    output!("[+] total samples:    {}", format.sample_count());
    output!("[+] duration:         {} s", fmt_number(format.duration()));
}

fn analyse(args: &Cli, config: &Config, path: &Path) -> u8 {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Could not open file {}: {}", path.display(), err);
            return ERR_UNREADABLE;
        }
    };
    let file_size = file.metadata().map(|meta| meta.len()).unwrap_or(0);

    let mut stream = match SampleStream::open(BufReader::with_capacity(READ_BUFFER_SIZE, file)) {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("Could not read {}: {}", path.display(), err);
            return ERR_UNREADABLE;
        }
    };
    let format = *stream.format();
    print_format(&format);

    let mut scanner = DefectScanner::new(config.detector.clone(), &format);
    let mut loudness = if args.loudness {
        match LoudnessAnalyser::new(&format) {
            Ok(analyser) => Some(analyser),
            Err(err) => {
                output!("Warning: loudness measurement unavailable: {:?}", err);
                None
            }
        }
    } else {
        None
    };

    let mut return_code = 0;
    let progress = Output::new(!args.no_progress, format.sample_count());
    {
        let mut analysers: Vec<&mut dyn Analyser> = Vec::new();
        analysers.push(&mut scanner);
        if let Some(analyser) = loudness.as_mut() {
            analysers.push(analyser);
        }

        if let Err(err) = run(&mut stream, &mut analysers, &progress) {
            eprintln!(
                "{}: {} (keeping results of the first {} frames)",
                path.display(),
                err,
                stream.frames_read()
            );
            return_code |= ERR_UNREADABLE;
        }
        progress.finish();

        for analyser in analysers.iter_mut() {
            return_code |= analyser.finish();
        }
    }

    let scan = scanner.report();
    if let Some(summary) = loudness.as_ref().and_then(LoudnessAnalyser::summary) {
        output!(
            "Loudness:\t{} LUFS\t{} LU",
            fmt_number(summary.integrated),
            fmt_number(summary.range)
        );
    }
    let (peak_frame, peak_channel) = match scan.peak.location {
        Some(location) => (location.frame as i64, location.channel as i64 + 1),
        None => (-1, 0),
    };
    output!(
        "Peak value:\t{}\t{}\t{}",
        fmt_number(scan.peak.level_dbfs.unwrap_or(f64::NEG_INFINITY)),
        peak_frame,
        peak_channel
    );

    if !args.no_reports {
        let summary = FileSummary {
            path,
            file_size,
            format: &format,
            scan: &scan,
        };
        if let Err(err) = append_table_row(&config.report.table_path, &summary) {
            eprintln!(
                "Could not write {}: {}",
                config.report.table_path.display(),
                err
            );
        }
        if let Err(err) = write_info(&summary) {
            eprintln!("Could not write info file for {}: {}", path.display(), err);
        }
        match write_markers(&summary, &config.report) {
            Ok(Some(markers)) => output!("Wrote markers to {}", markers.display()),
            Ok(None) => {}
            Err(err) => eprintln!("Could not write markers for {}: {}", path.display(), err),
        }
    }

    if args.json {
        let mut sections: Vec<&dyn Analyser> = Vec::new();
        sections.push(&scanner);
        if let Some(analyser) = loudness.as_ref() {
            sections.push(analyser);
        }
        let json_file = json_path(path);
        match write_json(&json_file, &build_json(&format, &sections)) {
            Ok(()) => output!("Wrote JSON output to {}", json_file.display()),
            Err(err) => eprintln!("Could not write {}: {}", json_file.display(), err),
        }
    }

    return_code
}

fn main() -> ExitCode {
    let args = Cli::parse();
    output::init(args.quiet, args.debug);

    let config = match args.load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::from(ERR_UNREADABLE);
        }
    };

    output!("wavcheck v{}", env!("CARGO_PKG_VERSION"));
    if config.report.is_partial() {
        let end = config
            .report
            .end_position
            .map(|end| format!("{} sec before the end", fmt_number(end as f64)))
            .unwrap_or_else(|| "the end".to_string());
        output!(
            "Partial MRK result : {} sec to {}",
            fmt_number(config.report.start_position as f64),
            end
        );
    }

    let files = collect_inputs(&args.inputs);
    if files.is_empty() {
        eprintln!("No wav files to analyse.");
        return ExitCode::from(ERR_UNREADABLE);
    }

    let mut code = 0;
    for path in &files {
        output!("{}", path.display());
        code |= analyse(&args, &config, path);
    }
    ExitCode::from(code)
}
