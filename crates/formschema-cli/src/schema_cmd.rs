use std::path::{Path, PathBuf};

use formschema::{
    AnthropicConfig, AnthropicEnricher, FieldEnricher, HeuristicEnricher, LabelMatchOptions,
    ProcessingOptions, SchemaPipeline, default_output_path, schema_to_json, write_schema,
};

use crate::cli::SchemaArgs;
use crate::shared::open_form;

pub fn run(args: &SchemaArgs) -> Result<(), i32> {
    let doc = open_form(&args.file)?;
    let enricher = build_enricher(args)?;

    let options = ProcessingOptions {
        max_retries: args.max_retries,
        label_match: LabelMatchOptions {
            max_distance: args.max_distance,
            top_k: args.top_k,
            ..LabelMatchOptions::default()
        },
        ..ProcessingOptions::default()
    };
    let pipeline = SchemaPipeline::new(enricher).with_options(options);

    let source = file_name(&args.file);
    let stem = args
        .file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let schema = pipeline.build(&doc, &source, &stem);

    match args.output.as_deref() {
        Some(path) if path == Path::new("-") => {
            let json = schema_to_json(&schema, args.pretty).map_err(|e| {
                eprintln!("Error: {e}");
                1
            })?;
            println!("{json}");
        }
        output => {
            let path: PathBuf = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| default_output_path(&args.file));
            write_schema(&schema, &path).map_err(|e| {
                eprintln!("Error: failed to write {}: {e}", path.display());
                1
            })?;
            eprintln!(
                "Wrote {} fields in {} sections to {} ({} failed)",
                schema.total_fields,
                schema.sections.len(),
                path.display(),
                schema.metadata.failed_fields,
            );
        }
    }
    Ok(())
}

fn build_enricher(args: &SchemaArgs) -> Result<Box<dyn FieldEnricher>, i32> {
    if args.offline {
        return Ok(Box::new(HeuristicEnricher::new()));
    }

    let mut config = AnthropicConfig::from_env().map_err(|e| {
        eprintln!("Error: {e} (use --offline to label fields without the API)");
        1
    })?;
    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }
    let enricher = AnthropicEnricher::new(config).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    Ok(Box::new(enricher))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
