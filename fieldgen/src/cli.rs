//! Command-line flags and request construction.

use anyhow::{Context, bail};
use clap::parser::ValueSource;
use clap::{ArgMatches, FromArgMatches, Parser};
use fieldgen_codegen::{GenerationRequest, NamingOptions, OutputTarget, Style, base_name};
use fieldgen_schema::SourceLocation;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fieldgen")]
#[command(about = "Generates constants from record schema fields")]
#[command(version)]
pub struct Cli {
    /// Accepts all the top level flags in a string, allowing multiple
    /// generate commands to be specified
    #[arg(long = "gen", allow_hyphen_values = true)]
    pub r#gen: Vec<String>,

    #[command(flatten)]
    pub opts: GenerateOpts,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GenerateOpts {
    /// The record to use as the source for code generation. REQUIRED
    #[arg(long = "struct")]
    pub record: Option<String>,

    /// The directory containing the record's schema files. Defaults to the
    /// current directory
    #[arg(long = "src-dir", default_value = ".")]
    pub src_dir: PathBuf,

    /// The name of the package in which the source record resides
    #[arg(long)]
    pub package: Option<String>,

    /// If true, schema files for tests will be included. This flag will
    /// often need to be used along with the --package flag
    #[arg(long)]
    pub tests: bool,

    /// If provided, the provided tag will be parsed for each field on the
    /// record. If the tag is missing, the field's name is used. Otherwise,
    /// the first attribute in the tag is used as the name
    #[arg(long)]
    pub tag: Option<String>,

    /// This flag requires the --tag flag be provided as well. The provided
    /// regex will be tested on the specified tag contents for each field.
    /// The first capture group will be used as the value for the generated
    /// constant. If the regex does not match the tag contents, the field's
    /// name will be used instead
    #[arg(long = "tag-regex")]
    pub tag_regex: Option<String>,

    /// A value to prepend to the generated const names. Defaults to
    /// [tag]Field
    #[arg(long)]
    pub prefix: Option<String>,

    /// Specifies the style of constants desired. Valid options are: alias,
    /// typed, generic
    #[arg(long)]
    pub style: Option<String>,

    /// If true, the generated constants will be exported
    #[arg(long)]
    pub export: bool,

    /// If true, the generated constants will be prefixed with the source
    /// record name
    #[arg(long = "include-struct-name")]
    pub include_struct_name: bool,

    /// If true, the generated constants will include fields that are not
    /// exported on the record
    #[arg(long = "include-unexported-fields")]
    pub include_unexported_fields: bool,

    /// If true, an All() method will be generated for the type, which
    /// returns an array of all the values generated
    #[arg(long)]
    pub iter: bool,

    /// The directory in which to place the generated file. Defaults to the
    /// current directory
    #[arg(long = "out-dir", default_value = ".")]
    pub out_dir: PathBuf,

    /// The file to write generated output to. Defaults to
    /// [--struct]_[prefix]_generated.go
    #[arg(long = "out-file")]
    pub out_file: Option<String>,

    /// The package the generated code should belong to. Defaults to the
    /// package containing the go:generate directive
    #[arg(long = "out-pkg")]
    pub out_pkg: Option<String>,

    /// If true, no output file will be written to, but instead results will
    /// be written to stdout
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// A fully built generation request plus the flags only the binary acts on.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// The request handed to the core.
    pub request: GenerationRequest,
    /// Whether the result is printed instead of written.
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
#[command(name = "fieldgen")]
struct GenCommand {
    #[command(flatten)]
    opts: GenerateOpts,
}

/// Builds the request list from parsed flags. `--gen` values each carry a
/// complete flag string and may not be mixed with top-level generation
/// flags.
pub fn requests(matches: &ArgMatches) -> anyhow::Result<Vec<RequestSpec>> {
    let cli = Cli::from_arg_matches(matches)?;
    if cli.r#gen.is_empty() {
        return Ok(vec![build_request(&cli.opts)?]);
    }

    // A flag counts as mixed when it was written on the command line, even
    // if it repeats its default value.
    let mixed = matches.ids().any(|id| {
        id.as_str() != "gen"
            && matches.value_source(id.as_str()) == Some(ValueSource::CommandLine)
    });
    if mixed {
        bail!("if --gen flags are used, only --gen flags may be provided");
    }

    let mut specs = Vec::with_capacity(cli.r#gen.len());
    for command in &cli.r#gen {
        let args = split_args(command)
            .with_context(|| format!("failed to parse flag string {command:?}"))?;
        let parsed = GenCommand::try_parse_from(
            std::iter::once("fieldgen".to_string()).chain(args),
        )
        .with_context(|| format!("failed to parse flags in {command:?}"))?;
        specs.push(build_request(&parsed.opts)?);
    }
    Ok(specs)
}

/// Builds one request from one set of flags, applying defaults.
fn build_request(opts: &GenerateOpts) -> anyhow::Result<RequestSpec> {
    let record = match &opts.record {
        Some(record) if !record.is_empty() => record.clone(),
        _ => bail!("--struct is required"),
    };

    let style = match &opts.style {
        Some(value) => Some(
            Style::parse(value)
                .with_context(|| format!("--style must be one of alias, typed, generic, got {value:?}"))?,
        ),
        None => None,
    };

    let src_dir = std::path::absolute(&opts.src_dir)
        .with_context(|| format!("failed to resolve source dir {}", opts.src_dir.display()))?;
    let location = SourceLocation {
        dir: src_dir,
        package: opts.package.clone(),
        include_tests: opts.tests,
    };

    let naming = NamingOptions {
        prefix: opts.prefix.clone(),
        include_record_name: opts.include_struct_name,
        export: opts.export,
    };

    let tag = opts.tag.clone();
    let base = base_name(&naming, tag.as_deref().unwrap_or(""), &record);
    let out_file = match &opts.out_file {
        Some(file) => file.clone(),
        None => format!(
            "{}_{}_generated.go",
            record.to_lowercase(),
            base.to_lowercase()
        ),
    };
    let out_dir = std::path::absolute(&opts.out_dir)
        .with_context(|| format!("failed to resolve out dir {}", opts.out_dir.display()))?;

    let package = opts
        .out_pkg
        .clone()
        .or_else(|| std::env::var("GOPACKAGE").ok())
        .unwrap_or_default();

    let request = GenerationRequest {
        location,
        record,
        tag,
        tag_pattern: opts.tag_regex.clone(),
        naming,
        style,
        iter: opts.iter,
        include_unexported: opts.include_unexported_fields,
        output: OutputTarget {
            path: out_dir.join(out_file),
            package,
        },
    };
    request.validate()?;

    Ok(RequestSpec {
        request,
        dry_run: opts.dry_run,
    })
}

/// Splits one `--gen` value into arguments, honoring single and double
/// quotes and backslash escapes.
pub fn split_args(input: &str) -> anyhow::Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                } else if c == '\\' && q == '"' {
                    match chars.next() {
                        Some(escaped) => current.push(escaped),
                        None => bail!("trailing backslash"),
                    }
                } else {
                    current.push(c);
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    in_word = true;
                }
                '\\' => match chars.next() {
                    Some(escaped) => {
                        current.push(escaped);
                        in_word = true;
                    }
                    None => bail!("trailing backslash"),
                },
                c if c.is_whitespace() => {
                    if in_word {
                        args.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if quote.is_some() {
        bail!("unterminated quote");
    }
    if in_word {
        args.push(current);
    }
    Ok(args)
}
