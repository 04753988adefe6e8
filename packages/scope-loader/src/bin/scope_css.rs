use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use glob::glob;
use rayon::prelude::*;
use scope_loader::{
    FilePattern, ScopeLoader, ScopeLoaderOptions, SourceMap, StageContext, StageInput,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    env_logger::init();

    let matches = Command::new("scope-css")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scope stylesheet selectors under a fixed ancestor selector")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("JSON options file (files / selector / sourceMap)"),
        )
        .arg(
            Arg::new("selector")
                .short('s')
                .long("selector")
                .value_name("SELECTOR")
                .help("Scope selector prepended to matched rules"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("PATTERN")
                .action(ArgAction::Append)
                .help("File pattern the loader applies to: a substring, or re:<regex>"),
        )
        .arg(
            Arg::new("source-map")
                .long("source-map")
                .action(ArgAction::SetTrue)
                .help("Emit a .map file next to each output"),
        )
        .arg(
            Arg::new("out-dir")
                .short('o')
                .long("out-dir")
                .value_name("DIR")
                .help("Directory for transformed stylesheets; stdout when omitted"),
        )
        .arg(
            Arg::new("inputs")
                .value_name("GLOB")
                .action(ArgAction::Append)
                .required(true)
                .help("Input stylesheets, as paths or glob patterns"),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("scope-css: {:#}", err);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let options = load_options(matches)?;
    if options.files.is_empty() {
        log::warn!("no file patterns configured; every stylesheet passes through unscoped");
    }
    let source_map = options.source_map;

    let out_dir = matches.get_one::<String>("out-dir").map(PathBuf::from);
    if let Some(dir) = &out_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let patterns: Vec<&String> = matches
        .get_many::<String>("inputs")
        .map(|values| values.collect())
        .unwrap_or_default();
    let inputs = resolve_inputs(&patterns)?;
    if inputs.is_empty() {
        bail!("no input files matched");
    }

    let loader = ScopeLoader::new(options);

    // Writing to files is order-independent; stdout output stays sequential.
    let results: Vec<Result<()>> = match &out_dir {
        Some(dir) => inputs
            .par_iter()
            .map(|path| process_file(&loader, path, Some(dir.as_path()), source_map))
            .collect(),
        None => inputs
            .iter()
            .map(|path| process_file(&loader, path, None, source_map))
            .collect(),
    };

    let mut failures = 0usize;
    for result in &results {
        if let Err(err) = result {
            eprintln!("scope-css: {:#}", err);
            failures += 1;
        }
    }
    if failures > 0 {
        bail!("{} of {} file(s) failed", failures, inputs.len());
    }
    Ok(())
}

fn load_options(matches: &ArgMatches) -> Result<ScopeLoaderOptions> {
    let mut options = match matches.get_one::<String>("config") {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading options file {}", path))?;
            ScopeLoaderOptions::from_json(&json)
                .with_context(|| format!("parsing options file {}", path))?
        }
        None => ScopeLoaderOptions::default(),
    };

    if let Some(selector) = matches.get_one::<String>("selector") {
        options.selector = selector.clone();
    }
    if let Some(patterns) = matches.get_many::<String>("file") {
        let mut files = Vec::new();
        for pattern in patterns {
            files.push(match pattern.strip_prefix("re:") {
                Some(regex) => FilePattern::regex(regex)?,
                None => FilePattern::literal(pattern.clone()),
            });
        }
        options.files = files;
    }
    if matches.get_flag("source-map") {
        options.source_map = true;
    }
    Ok(options)
}

fn resolve_inputs(patterns: &[&String]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        for entry in
            glob(pattern).with_context(|| format!("invalid glob pattern {}", pattern))?
        {
            let path = entry.with_context(|| format!("reading glob entry for {}", pattern))?;
            if path.is_file() {
                inputs.push(path);
                matched = true;
            }
        }
        if !matched {
            // A plain path whose name happens to contain glob metacharacters
            let path = PathBuf::from(pattern.as_str());
            if path.is_file() {
                inputs.push(path);
            } else {
                log::warn!("no files matched {}", pattern);
            }
        }
    }
    inputs.sort();
    inputs.dedup();
    Ok(inputs)
}

fn process_file(
    loader: &ScopeLoader,
    path: &Path,
    out_dir: Option<&Path>,
    source_map: bool,
) -> Result<()> {
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let input_map = if source_map {
        read_sibling_map(path)?
    } else {
        None
    };

    // The read above is stage 0 of this little pipeline.
    let context = StageContext::new(path, 1);
    let output = loader
        .run(
            &context,
            StageInput {
                source,
                source_map: input_map,
                meta: None,
            },
        )
        .with_context(|| format!("processing {}", path.display()))?;

    match out_dir {
        Some(dir) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("{} has no file name", path.display()))?;
            let out_path = dir.join(file_name);
            fs::write(&out_path, &output.source)
                .with_context(|| format!("writing {}", out_path.display()))?;
            if let Some(map) = &output.source_map {
                let map_path = PathBuf::from(format!("{}.map", out_path.display()));
                let json = serde_json::to_string(map).context("serializing source map")?;
                fs::write(&map_path, json)
                    .with_context(|| format!("writing {}", map_path.display()))?;
            }
            log::info!("{} -> {}", path.display(), out_path.display());
        }
        None => {
            if output.source_map.is_some() {
                log::warn!("{}: discarding source map on stdout output", path.display());
            }
            print!("{}", output.source);
        }
    }
    Ok(())
}

fn read_sibling_map(path: &Path) -> Result<Option<SourceMap>> {
    let map_path = PathBuf::from(format!("{}.map", path.display()));
    if !map_path.is_file() {
        return Ok(None);
    }
    let json = fs::read_to_string(&map_path)
        .with_context(|| format!("reading {}", map_path.display()))?;
    let map = serde_json::from_str(&json)
        .with_context(|| format!("parsing {}", map_path.display()))?;
    Ok(Some(map))
}
