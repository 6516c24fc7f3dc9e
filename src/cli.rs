//! CLI: declarations → (generated Rust | Avro IDL | schema dump)
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::codegen::CodeConfig;
use crate::docs::DocCommentResolver;
use crate::extract::Extractor;
use crate::frontend::{Frontend, Manifest, RustSource};
use crate::generate::{GenerateOptions, IdlOptions};
use crate::idl::IdlFieldNaming;
use crate::ir::QualifiedName;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate attribute exporters and Avro IDL from telemetry record declarations
#[derive(Parser, Debug)]
#[command(name = "telemetry-codegen", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate the records and write the generated files
    Generate(GenerateOut),
    /// validate one record and print its extracted schema as JSON
    Inspect(InspectOut),
}

#[derive(Args, Debug, Clone)]
struct LoaderSettings {
    /// Record to process; a bare name is looked up in `--module`. Repeatable.
    #[arg(long = "type", short = 't', num_args = 1.., required = true)]
    types: Vec<String>,

    /// module declaring the bare `--type` names
    #[arg(long, default_value = QualifiedName::CRATE_ROOT)]
    module: String,

    /// crate source directory holding lib.rs or main.rs
    #[arg(long, env = "TELEMETRY_CODEGEN_SOURCE_ROOT", conflicts_with = "manifest")]
    source_root: Option<PathBuf>,

    /// TOML/JSON declaration manifests; literal paths or quoted glob patterns
    #[arg(long, env = "TELEMETRY_CODEGEN_MANIFEST", num_args = 1.., value_delimiter = ',')]
    manifest: Vec<String>,

    /// enabled cargo features: filter `#[cfg(feature)]` items and gate the generated code
    #[arg(long, value_delimiter = ',')]
    cfg_features: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    loader_settings: LoaderSettings,

    /// skip the generated Rust file
    #[arg(long)]
    no_code: bool,

    /// value of the leading `dataType` attribute (defaults to --scheme-df-datatype)
    #[arg(long)]
    data_type: Option<String>,

    /// path the generated code uses to reach the runtime types
    #[arg(long, default_value = "::telemetry_codegen")]
    runtime_path: String,

    /// output directory
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// also generate the Avro IDL file
    #[arg(long, requires_all = ["scheme_namespace", "scheme_protocol", "scheme_df_datatype"])]
    scheme: bool,

    /// IDL namespace
    #[arg(long, requires = "scheme")]
    scheme_namespace: Option<String>,

    /// IDL protocol name
    #[arg(long, requires = "scheme")]
    scheme_protocol: Option<String>,

    /// IDL data fabric data type tag
    #[arg(long, requires = "scheme")]
    scheme_df_datatype: Option<String>,

    /// spelling of IDL field names
    #[arg(long, value_enum, default_value_t = IdlFieldNaming::default())]
    scheme_field_case: IdlFieldNaming,
}

#[derive(clap::Parser, Debug)]
struct InspectOut {
    #[command(flatten)]
    loader_settings: LoaderSettings,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl LoaderSettings {
    fn targets(&self) -> Vec<QualifiedName> {
        self.types
            .iter()
            .map(|ty| if ty.contains("::") { QualifiedName::parse(ty) } else { QualifiedName::new(&self.module, ty) })
            .collect()
    }

    fn frontend(&self) -> anyhow::Result<Frontend> {
        if !self.manifest.is_empty() {
            let manifest = Manifest::load_patterns(&self.manifest).context("failed to load manifest")?;
            tracing::debug!(records = manifest.len(), "manifest loaded");
            return Ok(Frontend::Manifest(manifest));
        }
        let root = self.source_root.clone().unwrap_or_else(|| PathBuf::from("src"));
        Ok(Frontend::Rust(RustSource::new(root).with_features(&self.cfg_features)))
    }
}

impl GenerateOut {
    fn options(&self) -> GenerateOptions {
        let idl = match (&self.scheme_namespace, &self.scheme_protocol, &self.scheme_df_datatype) {
            (Some(namespace), Some(protocol), Some(data_fabric_type)) if self.scheme => Some(IdlOptions {
                namespace: namespace.clone(),
                protocol: protocol.clone(),
                data_fabric_type: data_fabric_type.clone(),
                naming: self.scheme_field_case,
            }),
            _ => None,
        };
        let code = (!self.no_code).then(|| CodeConfig {
            runtime_path: self.runtime_path.clone(),
            data_type: self
                .data_type
                .clone()
                .or_else(|| idl.as_ref().map(|idl| idl.data_fabric_type.clone())),
            cfg_features: self.loader_settings.cfg_features.clone(),
        });
        GenerateOptions {
            targets: self.loader_settings.targets(),
            code,
            idl,
            out_dir: self.out_dir.clone(),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let options = target.options();
                let frontend = target.loader_settings.frontend()?;
                tracing::info!(targets = options.targets.len(), out_dir = %options.out_dir.display(), "generating");
                options.run(&frontend)?;
            }
            Command::Inspect(target) => {
                let frontend = target.loader_settings.frontend()?;
                let docs = DocCommentResolver::new(&frontend);
                let extractor = Extractor::new(&frontend, &docs);
                for record in target.loader_settings.targets() {
                    let schema = extractor
                        .extract(&record)
                        .with_context(|| format!("failed to parse struct {record}"))?;
                    println!("{}", serde_json::to_string_pretty(&schema)?);
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(args: &[&str]) -> Result<GenerateOut, clap::Error> {
        let argv = ["telemetry-codegen", "generate"].iter().chain(args);
        let cli = CommandLineInterface::try_parse_from(argv)?;
        match cli.cmd {
            Command::Generate(out) => Ok(out),
            Command::Inspect(_) => panic!("expected generate"),
        }
    }

    #[test]
    fn bare_types_resolve_against_module() {
        let out = generate(&["--type", "Data", "--type", "crate::other::Base", "--module", "crate::telemetry"]).unwrap();
        let names: Vec<String> = out.options().targets.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["crate::telemetry::Data", "crate::other::Base"]);
    }

    #[test]
    fn code_only_by_default() {
        let options = generate(&["--type", "Data"]).unwrap().options();
        assert!(options.idl.is_none());
        let code = options.code.unwrap();
        assert_eq!(code.runtime_path, "::telemetry_codegen");
        assert_eq!(code.data_type, None);
    }

    #[test]
    fn scheme_flags_are_all_or_none() {
        assert!(generate(&["--type", "Data", "--scheme"]).is_err());
        assert!(generate(&["--type", "Data", "--scheme-namespace", "ns"]).is_err());
        assert!(
            generate(&["--type", "Data", "--scheme", "--scheme-namespace", "ns", "--scheme-protocol", "P"]).is_err()
        );
    }

    #[test]
    fn discriminator_falls_back_to_scheme_tag() {
        let scheme = [
            "--type",
            "Data",
            "--scheme",
            "--scheme-namespace",
            "ns",
            "--scheme-protocol",
            "P",
            "--scheme-df-datatype",
            "tag",
        ];
        let options = generate(&scheme).unwrap().options();
        assert_eq!(options.code.unwrap().data_type.as_deref(), Some("tag"));
        let idl = options.idl.unwrap();
        assert_eq!(idl.naming, IdlFieldNaming::LowerFirst);

        let mut explicit = scheme.to_vec();
        explicit.extend(["--data-type", "explicit", "--scheme-field-case", "verbatim"]);
        let options = generate(&explicit).unwrap().options();
        assert_eq!(options.code.unwrap().data_type.as_deref(), Some("explicit"));
        assert_eq!(options.idl.unwrap().naming, IdlFieldNaming::Verbatim);
    }

    #[test]
    fn no_code_and_features() {
        let options = generate(&["--type", "Data", "--no-code", "--cfg-features", "a,b"]).unwrap().options();
        assert!(options.code.is_none());

        let out = generate(&["--type", "Data", "--cfg-features", "a,b"]).unwrap();
        assert_eq!(out.options().code.unwrap().cfg_features, ["a", "b"]);
    }

    #[test]
    fn source_root_conflicts_with_manifest() {
        assert!(generate(&["--type", "Data", "--source-root", "src", "--manifest", "m.toml"]).is_err());
    }
}
